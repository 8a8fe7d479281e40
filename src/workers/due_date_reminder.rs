use crate::config::NotificationConfig;
use crate::database::DbPool;
use crate::error::Result;
use crate::models::notifications::{NewNotification, NotificationType};
use crate::queries::{cards, notifications};
use crate::DbConn;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info};

/// Background worker that reminds assignees of cards that are due soon
///
/// Each open, assigned card whose due date falls inside the window gets a
/// single DUE_DATE_SOON notification, no matter how many sweeps see it.
pub async fn due_date_reminder_worker(
    pool: DbPool,
    config: NotificationConfig,
    mut shutdown_rx: tokio::sync::broadcast::Receiver<()>,
) {
    let mut sweep_interval = interval(Duration::from_secs(config.reminder_interval_seconds.max(1)));

    info!(
        "[DueDateWorker] Started (every {}s, window {}h)",
        config.reminder_interval_seconds, config.due_soon_hours
    );

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("[DueDateWorker] Shutting down");
                break;
            }
            _ = sweep_interval.tick() => {
                let mut conn = match pool.acquire().await {
                    Ok(conn) => conn,
                    Err(e) => {
                        error!("[DueDateWorker] Failed to acquire connection: {}", e);
                        continue;
                    }
                };

                match run_due_date_sweep(&mut conn, config.due_soon_hours, Utc::now()).await {
                    Ok(0) => {}
                    Ok(count) => info!("[DueDateWorker] Sent {} due date reminders", count),
                    Err(e) => error!("[DueDateWorker] Sweep failed: {}", e),
                }
            }
        }
    }

    info!("[DueDateWorker] Stopped");
}

/// Notifies assignees of cards due in `(now, now + due_soon_hours]`. Returns
/// the number of notifications created.
pub async fn run_due_date_sweep(conn: &mut DbConn, due_soon_hours: i64, now: DateTime<Utc>) -> Result<usize> {
    let horizon = now + ChronoDuration::hours(due_soon_hours);
    let due = cards::list_cards_due_between(&mut *conn, now, horizon).await?;

    let mut sent = 0;
    for card in due {
        if notifications::exists_for_card(&mut *conn, card.assignee_id, card.id, NotificationType::DueDateSoon).await? {
            continue;
        }

        let message = format!(
            "\"{}\" is due {}",
            card.title,
            card.due_date.format("%Y-%m-%d %H:%M UTC")
        );
        notifications::create_notification(
            &mut *conn,
            NewNotification::for_card(card.assignee_id, NotificationType::DueDateSoon, message, card.id),
        )
        .await?;
        sent += 1;
    }

    Ok(sent)
}
