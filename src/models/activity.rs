use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::models::users::UserSummary;

/// Kinds of card events recorded in the activity log.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, sqlx::Type,
)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    CreateCard,
    UpdateTitle,
    UpdateDescription,
    MoveCard,
    ArchiveCard,
    UnarchiveCard,
    CompleteCard,
    ReopenCard,
    CopyCard,
    AssignUser,
    UnassignUser,
    SetDueDate,
    RemoveDueDate,
    UpdateLabels,
    AddLabel,
    RemoveLabel,
    AddComment,
    UpdateComment,
    DeleteComment,
    AddAttachment,
    RemoveAttachment,
    AddChecklistItem,
    ToggleChecklistItem,
    RemoveChecklistItem,
}

/// Action-specific payload of an activity entry.
///
/// Serialized with an `action` tag matching [`ActivityType`], so the stored
/// JSON is self-describing and each kind only carries its own fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityDetails {
    CreateCard { title: String, column_id: Uuid },
    UpdateTitle { old_title: String, new_title: String },
    UpdateDescription {},
    MoveCard { from_column_id: Uuid, to_column_id: Uuid, position: i64 },
    ArchiveCard {},
    UnarchiveCard {},
    CompleteCard {},
    ReopenCard {},
    CopyCard { source_card_id: Uuid },
    AssignUser { assignee_id: Uuid },
    UnassignUser { previous_assignee_id: Uuid },
    SetDueDate { due_date: DateTime<Utc> },
    RemoveDueDate {},
    UpdateLabels { labels: Vec<String> },
    AddLabel { label_id: Uuid, label_name: String },
    RemoveLabel { label_id: Uuid, label_name: String },
    AddComment { comment_id: Uuid },
    UpdateComment { comment_id: Uuid },
    DeleteComment { comment_id: Uuid },
    AddAttachment { attachment_id: Uuid, filename: String },
    RemoveAttachment { attachment_id: Uuid, filename: String },
    AddChecklistItem { item_id: Uuid, content: String },
    ToggleChecklistItem { item_id: Uuid, is_completed: bool },
    RemoveChecklistItem { item_id: Uuid },
}

impl ActivityDetails {
    pub fn action_type(&self) -> ActivityType {
        match self {
            ActivityDetails::CreateCard { .. } => ActivityType::CreateCard,
            ActivityDetails::UpdateTitle { .. } => ActivityType::UpdateTitle,
            ActivityDetails::UpdateDescription {} => ActivityType::UpdateDescription,
            ActivityDetails::MoveCard { .. } => ActivityType::MoveCard,
            ActivityDetails::ArchiveCard {} => ActivityType::ArchiveCard,
            ActivityDetails::UnarchiveCard {} => ActivityType::UnarchiveCard,
            ActivityDetails::CompleteCard {} => ActivityType::CompleteCard,
            ActivityDetails::ReopenCard {} => ActivityType::ReopenCard,
            ActivityDetails::CopyCard { .. } => ActivityType::CopyCard,
            ActivityDetails::AssignUser { .. } => ActivityType::AssignUser,
            ActivityDetails::UnassignUser { .. } => ActivityType::UnassignUser,
            ActivityDetails::SetDueDate { .. } => ActivityType::SetDueDate,
            ActivityDetails::RemoveDueDate {} => ActivityType::RemoveDueDate,
            ActivityDetails::UpdateLabels { .. } => ActivityType::UpdateLabels,
            ActivityDetails::AddLabel { .. } => ActivityType::AddLabel,
            ActivityDetails::RemoveLabel { .. } => ActivityType::RemoveLabel,
            ActivityDetails::AddComment { .. } => ActivityType::AddComment,
            ActivityDetails::UpdateComment { .. } => ActivityType::UpdateComment,
            ActivityDetails::DeleteComment { .. } => ActivityType::DeleteComment,
            ActivityDetails::AddAttachment { .. } => ActivityType::AddAttachment,
            ActivityDetails::RemoveAttachment { .. } => ActivityType::RemoveAttachment,
            ActivityDetails::AddChecklistItem { .. } => ActivityType::AddChecklistItem,
            ActivityDetails::ToggleChecklistItem { .. } => ActivityType::ToggleChecklistItem,
            ActivityDetails::RemoveChecklistItem { .. } => ActivityType::RemoveChecklistItem,
        }
    }
}

/// A row of the append-only `activity_logs` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityLogEntry {
    pub id: Uuid,
    pub card_id: Uuid,
    pub user_id: Uuid,
    pub action_type: ActivityType,
    #[sqlx(json)]
    pub details: ActivityDetails,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityWithUser {
    #[serde(flatten)]
    pub entry: ActivityLogEntry,
    pub user: UserSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_details_tag_matches_action_type() {
        let details = ActivityDetails::UpdateTitle {
            old_title: "Draft".to_string(),
            new_title: "Final".to_string(),
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["action"], "UPDATE_TITLE");
        assert_eq!(json["old_title"], "Draft");
        assert_eq!(details.action_type().to_string(), "UPDATE_TITLE");
    }

    #[test]
    fn test_empty_variant_serializes_tag_only() {
        let json = serde_json::to_value(ActivityDetails::ArchiveCard {}).unwrap();
        assert_eq!(json, serde_json::json!({ "action": "ARCHIVE_CARD" }));

        let parsed: ActivityDetails =
            serde_json::from_value(serde_json::json!({ "action": "REOPEN_CARD" })).unwrap();
        assert_eq!(parsed.action_type(), ActivityType::ReopenCard);
    }

    #[test]
    fn test_activity_type_parse() {
        assert_eq!(
            ActivityType::from_str("MOVE_CARD").unwrap(),
            ActivityType::MoveCard
        );
        assert!(ActivityType::from_str("move_card").is_err());
    }
}
