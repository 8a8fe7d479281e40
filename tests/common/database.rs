use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};
use std::str::FromStr;
use taskboard::database::MIGRATOR;

/// Private in-memory database for one test.
///
/// The pool holds exactly one connection that never expires, so every
/// `get_connection` call sees the same migrated database. Hold at most one
/// connection at a time.
pub struct TestDb {
    pub pool: SqlitePool,
    test_prefix: String,
}

impl TestDb {
    /// Creates a fresh database. `test_name` should be the test function name;
    /// it prefixes generated fixture data for easier debugging.
    pub async fn new(test_name: &str) -> Self {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("valid sqlite url")
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .expect("Failed to open in-memory database");

        MIGRATOR.run(&pool).await.expect("Failed to run migrations");

        Self {
            pool,
            test_prefix: format!("test_{}", test_name),
        }
    }

    pub async fn get_connection(&self) -> PoolConnection<Sqlite> {
        self.pool
            .acquire()
            .await
            .expect("Failed to get database connection")
    }

    pub fn test_prefix(&self) -> &str {
        &self.test_prefix
    }
}
