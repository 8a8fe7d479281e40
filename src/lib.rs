pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod queries;
pub mod realtime;
pub mod services;
pub mod state;
pub mod validation;
pub mod workers;

pub use config::Config;
pub use database::{DbConn, DbPool};
pub use error::{Error, Result};

/// Load configuration from environment variables
pub fn load_config() -> Result<Config> {
    Ok(Config::load()?)
}
