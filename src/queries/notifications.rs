use crate::{
    error::{Error, Result},
    models::notifications::{NewNotification, Notification, NotificationType, NotificationWithContext},
};
use chrono::Utc;
use uuid::Uuid;

use crate::DbConn;

pub async fn create_notification(conn: &mut DbConn, new_notification: NewNotification) -> Result<Notification> {
    let notification = sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications (id, user_id, notification_type, message, card_id,
                                   workspace_invitation_id, is_read, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, 0, $7)
        RETURNING id, user_id, notification_type, message, card_id, workspace_invitation_id,
                  is_read, created_at
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(new_notification.user_id)
    .bind(new_notification.notification_type)
    .bind(&new_notification.message)
    .bind(new_notification.card_id)
    .bind(new_notification.workspace_invitation_id)
    .bind(Utc::now())
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(notification)
}

/// Lists a user's notifications newest first, with card and invitation context.
pub async fn list_notifications_for_user(
    conn: &mut DbConn,
    user_id: Uuid,
    unread_only: bool,
    limit: i64,
) -> Result<Vec<NotificationWithContext>> {
    let notifications = sqlx::query_as::<_, NotificationWithContext>(
        r#"
        SELECT n.id, n.user_id, n.notification_type, n.message, n.card_id,
               n.workspace_invitation_id, n.is_read, n.created_at,
               c.title AS card_title,
               col.board_id AS board_id,
               wi.status AS invitation_status,
               wi.workspace_id AS invitation_workspace_id,
               w.name AS invitation_workspace_name
        FROM notifications n
        LEFT JOIN cards c ON c.id = n.card_id
        LEFT JOIN board_columns col ON col.id = c.column_id
        LEFT JOIN workspace_invitations wi ON wi.id = n.workspace_invitation_id
        LEFT JOIN workspaces w ON w.id = wi.workspace_id
        WHERE n.user_id = $1 AND ($2 = 0 OR n.is_read = 0)
        ORDER BY n.id DESC
        LIMIT $3
        "#,
    )
    .bind(user_id)
    .bind(unread_only)
    .bind(limit)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(notifications)
}

/// Marks one of the user's notifications as read. Returns `None` when the
/// notification does not exist or belongs to someone else.
pub async fn mark_as_read(conn: &mut DbConn, id: Uuid, user_id: Uuid) -> Result<Option<Notification>> {
    let notification = sqlx::query_as::<_, Notification>(
        r#"
        UPDATE notifications
        SET is_read = 1
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, notification_type, message, card_id, workspace_invitation_id,
                  is_read, created_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(notification)
}

pub async fn mark_all_as_read(conn: &mut DbConn, user_id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = $1 AND is_read = 0")
        .bind(user_id)
        .execute(conn)
        .await
        .map_err(Error::Sqlx)?
        .rows_affected();

    Ok(rows_affected)
}

pub async fn delete_notification(conn: &mut DbConn, id: Uuid, user_id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(conn)
        .await
        .map_err(Error::Sqlx)?
        .rows_affected();

    Ok(rows_affected)
}

pub async fn count_unread(conn: &mut DbConn, user_id: Uuid) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = 0",
    )
    .bind(user_id)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(count)
}

/// Whether the user was already notified of the given kind for this card.
pub async fn exists_for_card(
    conn: &mut DbConn,
    user_id: Uuid,
    card_id: Uuid,
    notification_type: NotificationType,
) -> Result<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM notifications
        WHERE user_id = $1 AND card_id = $2 AND notification_type = $3
        "#,
    )
    .bind(user_id)
    .bind(card_id)
    .bind(notification_type)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(count > 0)
}
