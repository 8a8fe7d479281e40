use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::models::invitations::InvitationStatus;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, sqlx::Type,
)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    Assigned,
    Mentioned,
    CommentAdded,
    DueDateSoon,
    CardMoved,
    WorkspaceInvitation,
}

/// A row from the `notifications` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notification_type: NotificationType,
    pub message: String,
    pub card_id: Option<Uuid>,
    pub workspace_invitation_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub notification_type: NotificationType,
    pub message: String,
    pub card_id: Option<Uuid>,
    pub workspace_invitation_id: Option<Uuid>,
}

impl NewNotification {
    pub fn for_card(
        user_id: Uuid,
        notification_type: NotificationType,
        message: impl Into<String>,
        card_id: Uuid,
    ) -> Self {
        Self {
            user_id,
            notification_type,
            message: message.into(),
            card_id: Some(card_id),
            workspace_invitation_id: None,
        }
    }
}

/// Notification with the card and invitation identity the client renders.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationWithContext {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub notification: Notification,
    pub card_title: Option<String>,
    pub board_id: Option<Uuid>,
    pub invitation_status: Option<InvitationStatus>,
    pub invitation_workspace_id: Option<Uuid>,
    pub invitation_workspace_name: Option<String>,
}
