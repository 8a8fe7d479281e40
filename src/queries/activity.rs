use crate::{
    error::{Error, Result},
    models::{
        activity::{ActivityDetails, ActivityLogEntry, ActivityWithUser},
        users::UserSummary,
    },
};
use chrono::Utc;
use sqlx::{FromRow, types::Json};
use uuid::Uuid;

use crate::DbConn;

#[derive(FromRow)]
struct ActivityRow {
    #[sqlx(flatten)]
    entry: ActivityLogEntry,
    user_email: String,
    user_full_name: Option<String>,
    user_avatar_url: Option<String>,
}

/// Appends an entry to a card's activity log.
pub async fn insert_activity(
    conn: &mut DbConn,
    card_id: Uuid,
    user_id: Uuid,
    details: &ActivityDetails,
) -> Result<ActivityLogEntry> {
    let entry = sqlx::query_as::<_, ActivityLogEntry>(
        r#"
        INSERT INTO activity_logs (id, card_id, user_id, action_type, details, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, card_id, user_id, action_type, details, created_at
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(card_id)
    .bind(user_id)
    .bind(details.action_type())
    .bind(Json(details))
    .bind(Utc::now())
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(entry)
}

/// Lists a card's activity, newest first.
pub async fn list_activities_by_card(conn: &mut DbConn, card_id: Uuid) -> Result<Vec<ActivityWithUser>> {
    let rows = sqlx::query_as::<_, ActivityRow>(
        r#"
        SELECT a.id, a.card_id, a.user_id, a.action_type, a.details, a.created_at,
               u.email AS user_email, u.full_name AS user_full_name, u.avatar_url AS user_avatar_url
        FROM activity_logs a
        JOIN users u ON u.id = a.user_id
        WHERE a.card_id = $1
        ORDER BY a.id DESC
        "#,
    )
    .bind(card_id)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let user = UserSummary {
                id: row.entry.user_id,
                email: row.user_email,
                full_name: row.user_full_name,
                avatar_url: row.user_avatar_url,
            };
            ActivityWithUser {
                entry: row.entry,
                user,
            }
        })
        .collect())
}
