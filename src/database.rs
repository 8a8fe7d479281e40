use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use crate::config::DatabaseConfig;
use crate::error::Result;

/// Database connection pool type
pub type DbPool = sqlx::SqlitePool;

/// Database connection type - supports both pool connections and transactions
/// Use `&mut conn` for pool connections, `&mut tx` for transactions
pub type DbConn = sqlx::SqliteConnection;

/// Embedded schema migrations from `./migrations`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Opens a connection pool with foreign-key enforcement enabled.
pub async fn connect(config: &DatabaseConfig) -> Result<DbPool> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .foreign_keys(true)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Applies every pending migration.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}
