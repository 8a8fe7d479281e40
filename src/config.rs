use serde::{Deserialize, Serialize};

use std::fmt;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite connection url, e.g. `sqlite://taskboard.db?mode=rwc`
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory uploaded attachment files are written to
    pub base_path: String,
    /// Prefix prepended to stored names to build attachment urls
    pub public_url_prefix: String,
    /// Largest accepted upload, in bytes
    pub max_upload_bytes: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    /// Cards due within this many hours trigger a DUE_DATE_SOON notification
    pub due_soon_hours: i64,
    /// Period of the due-date reminder sweep
    pub reminder_interval_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables, with defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            // Override with environment variables using `TASKBOARD__` prefix and `__` separator
            // e.g., TASKBOARD__DATABASE__URL="sqlite://other.db"
            .add_source(
                config::Environment::with_prefix("TASKBOARD")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://taskboard.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_path: "./uploads".to_string(),
            public_url_prefix: "/uploads".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            due_soon_hours: 24,
            reminder_interval_seconds: 900,
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Use serde to serialize to pretty JSON
        match serde_json::to_string_pretty(&self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "Error serializing config"),
        }
    }
}
