//! Notification creation, fan-out rules and the recipient's inbox operations.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use crate::DbConn;
use crate::{
    auth::AuthenticatedUser,
    error::{Error, Result},
    models::{
        cards::Card,
        notifications::{NewNotification, Notification, NotificationType, NotificationWithContext},
    },
    queries::{notifications, workspace_members},
};

/// Upper bound on the rows a single inbox read returns.
pub const MAX_NOTIFICATIONS: i64 = 50;

static MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@([0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12})")
        .expect("valid regex")
});

/// Extracts `@<uuid>` mentions in order of first appearance, without duplicates.
pub fn parse_mentions(content: &str) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    MENTION
        .captures_iter(content)
        .filter_map(|caps| Uuid::parse_str(&caps[1]).ok())
        .filter(|id| seen.insert(*id))
        .collect()
}

pub async fn create_notification(conn: &mut DbConn, new_notification: NewNotification) -> Result<Notification> {
    let notification = notifications::create_notification(conn, new_notification).await?;

    tracing::debug!(
        notification_id = %notification.id,
        user_id = %notification.user_id,
        notification_type = %notification.notification_type,
        "Notification created"
    );

    Ok(notification)
}

/// ASSIGNED to the new assignee unless they assigned themselves.
pub async fn notify_assignment(
    conn: &mut DbConn,
    card: &Card,
    assignee_id: Uuid,
    actor: &AuthenticatedUser,
) -> Result<Option<Notification>> {
    if assignee_id == actor.id {
        return Ok(None);
    }
    let message = format!("{} assigned you to \"{}\"", actor.display_name(), card.title);
    let notification = create_notification(
        conn,
        NewNotification::for_card(assignee_id, NotificationType::Assigned, message, card.id),
    )
    .await?;
    Ok(Some(notification))
}

/// MENTIONED to every mentioned workspace member other than the author.
pub async fn notify_mentions(
    conn: &mut DbConn,
    workspace_id: Uuid,
    card: &Card,
    mentions: &[Uuid],
    author: &AuthenticatedUser,
) -> Result<Vec<Notification>> {
    let candidates: Vec<Uuid> = mentions.iter().copied().filter(|id| *id != author.id).collect();
    let recipients = workspace_members::filter_workspace_members(&mut *conn, workspace_id, &candidates).await?;

    let mut created = Vec::with_capacity(recipients.len());
    for user_id in recipients {
        let message = format!("{} mentioned you on \"{}\"", author.display_name(), card.title);
        let notification = create_notification(
            &mut *conn,
            NewNotification::for_card(user_id, NotificationType::Mentioned, message, card.id),
        )
        .await?;
        created.push(notification);
    }
    Ok(created)
}

/// Fan-out for a new comment: mentions first, then COMMENT_ADDED to the
/// assignee when they are neither the author nor mentioned.
pub async fn notify_comment_added(
    conn: &mut DbConn,
    workspace_id: Uuid,
    card: &Card,
    mentions: &[Uuid],
    author: &AuthenticatedUser,
) -> Result<Vec<Notification>> {
    let mut created = notify_mentions(&mut *conn, workspace_id, card, mentions, author).await?;

    if let Some(assignee_id) = card.assignee_id
        && assignee_id != author.id
        && !mentions.contains(&assignee_id)
    {
        let message = format!("{} commented on \"{}\"", author.display_name(), card.title);
        let notification = create_notification(
            conn,
            NewNotification::for_card(assignee_id, NotificationType::CommentAdded, message, card.id),
        )
        .await?;
        created.push(notification);
    }

    Ok(created)
}

/// CARD_MOVED to the assignee when someone else moved the card.
pub async fn notify_card_moved(
    conn: &mut DbConn,
    card: &Card,
    column_title: &str,
    actor: &AuthenticatedUser,
) -> Result<Option<Notification>> {
    let Some(assignee_id) = card.assignee_id else {
        return Ok(None);
    };
    if assignee_id == actor.id {
        return Ok(None);
    }
    let message = format!("{} moved \"{}\" to {}", actor.display_name(), card.title, column_title);
    let notification = create_notification(
        conn,
        NewNotification::for_card(assignee_id, NotificationType::CardMoved, message, card.id),
    )
    .await?;
    Ok(Some(notification))
}

/// The caller's notifications, newest first, at most `limit` rows.
///
/// `limit` is clamped to `1..=MAX_NOTIFICATIONS`.
pub async fn get_user_notifications(
    conn: &mut DbConn,
    actor: &AuthenticatedUser,
    unread_only: bool,
    limit: i64,
) -> Result<Vec<NotificationWithContext>> {
    let limit = limit.clamp(1, MAX_NOTIFICATIONS);
    notifications::list_notifications_for_user(conn, actor.id, unread_only, limit).await
}

pub async fn mark_as_read(conn: &mut DbConn, actor: &AuthenticatedUser, notification_id: Uuid) -> Result<Notification> {
    notifications::mark_as_read(conn, notification_id, actor.id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Notification {} not found", notification_id)))
}

pub async fn mark_all_as_read(conn: &mut DbConn, actor: &AuthenticatedUser) -> Result<u64> {
    let updated = notifications::mark_all_as_read(conn, actor.id).await?;
    tracing::debug!(user_id = %actor.id, updated, "Notifications marked as read");
    Ok(updated)
}

pub async fn delete_notification(conn: &mut DbConn, actor: &AuthenticatedUser, notification_id: Uuid) -> Result<()> {
    let deleted = notifications::delete_notification(conn, notification_id, actor.id).await?;
    if deleted == 0 {
        return Err(Error::NotFound(format!("Notification {} not found", notification_id)));
    }
    Ok(())
}

pub async fn get_unread_count(conn: &mut DbConn, actor: &AuthenticatedUser) -> Result<i64> {
    notifications::count_unread(conn, actor.id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mentions_dedupes_in_order() {
        let content = "hi @11111111-1111-1111-1111-111111111111 and @22222222-2222-2222-2222-222222222222! \
                       again @11111111-1111-1111-1111-111111111111";
        let mentions = parse_mentions(content);
        assert_eq!(
            mentions,
            vec![
                Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap(),
                Uuid::parse_str("22222222-2222-2222-2222-222222222222").unwrap(),
            ]
        );
    }

    #[test]
    fn test_parse_mentions_ignores_non_uuid_tokens() {
        assert!(parse_mentions("ping @alice or email bob@example.com").is_empty());
        assert!(parse_mentions("@1234-not-a-uuid").is_empty());
    }

    #[test]
    fn test_parse_mentions_accepts_uppercase() {
        let id = Uuid::now_v7();
        let content = format!("cc @{}", id.to_string().to_uppercase());
        assert_eq!(parse_mentions(&content), vec![id]);
    }
}
