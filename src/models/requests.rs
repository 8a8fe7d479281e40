use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::models::workspace_members::WorkspaceRole;

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Request for creating a workspace; the caller becomes its owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkspaceRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Request to update workspace details
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateWorkspaceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMemberRoleRequest {
    pub role: WorkspaceRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBoardRequest {
    pub workspace_id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBoardRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateColumnRequest {
    pub board_id: Uuid,
    pub title: String,
    /// Explicit ordering key; appended after the last column when absent
    pub position: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateColumnRequest {
    pub title: Option<String>,
    pub position: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCardRequest {
    pub column_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Explicit ordering key; appended after the last card when absent
    pub position: Option<i64>,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Partial card update. For the nullable fields, an explicit `null` clears
/// the value while an absent field leaves it untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCardRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub assignee_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub labels: Option<Vec<String>>,
    pub is_completed: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveCardRequest {
    pub column_id: Uuid,
    pub position: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub card_id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLabelRequest {
    pub board_id: Uuid,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLabelRequest {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// An uploaded file as handed over by the transport layer.
#[derive(Debug, Clone)]
pub struct UploadAttachmentRequest {
    pub card_id: Uuid,
    pub filename: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChecklistItemRequest {
    pub card_id: Uuid,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_card_distinguishes_null_from_absent() {
        let absent: UpdateCardRequest = serde_json::from_str(r#"{"title":"New"}"#).unwrap();
        assert_eq!(absent.title.as_deref(), Some("New"));
        assert!(absent.assignee_id.is_none());
        assert!(absent.due_date.is_none());

        let cleared: UpdateCardRequest =
            serde_json::from_str(r#"{"assignee_id":null,"due_date":null}"#).unwrap();
        assert_eq!(cleared.assignee_id, Some(None));
        assert_eq!(cleared.due_date, Some(None));
        assert!(cleared.description.is_none());
    }

    #[test]
    fn test_create_card_labels_default_to_empty() {
        let request: CreateCardRequest = serde_json::from_str(&format!(
            r#"{{"column_id":"{}","title":"Write docs"}}"#,
            Uuid::now_v7()
        ))
        .unwrap();
        assert!(request.labels.is_empty());
        assert!(request.position.is_none());
    }
}
