use std::sync::Arc;

use taskboard::{
    database, load_config,
    services::storage::LocalFileStore,
    state::AppState,
    workers::due_date_reminder_worker,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config()?;
    tracing::info!("Loaded configuration:\n{}", config);

    let pool = database::connect(&config.database).await?;
    database::run_migrations(&pool).await?;
    tracing::info!("Database ready");

    let storage = LocalFileStore::new(&config.storage.base_path);
    storage.init().await?;

    let state = AppState::new(pool, Arc::new(storage), config);

    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);
    let reminder = tokio::spawn(due_date_reminder_worker(
        state.pool.clone(),
        state.config.notifications.clone(),
        shutdown_tx.subscribe(),
    ));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    let _ = shutdown_tx.send(());
    if let Err(e) = reminder.await {
        tracing::error!("Due date worker ended abnormally: {}", e);
    }
    state.pool.close().await;

    Ok(())
}
