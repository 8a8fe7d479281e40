use crate::{config::Config, database::DbPool, realtime::BoardEvents, services::storage::FileStore};
use std::sync::Arc;

/// Shared resources handed to whatever transport sits on top of the services
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub pool: DbPool,
    /// Attachment file store
    pub storage: Arc<dyn FileStore>,
    /// Board-scoped realtime hub
    pub events: Arc<BoardEvents>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: DbPool, storage: Arc<dyn FileStore>, config: Config) -> Self {
        Self {
            pool,
            storage,
            events: Arc::new(BoardEvents::default()),
            config: Arc::new(config),
        }
    }
}
