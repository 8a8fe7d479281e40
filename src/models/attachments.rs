use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::users::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attachment {
    pub id: Uuid,
    /// Name the file was uploaded with
    pub filename: String,
    /// Name the file is stored under on disk
    pub stored_name: String,
    pub mime_type: String,
    pub size: i64,
    pub url: String,
    pub card_id: Uuid,
    pub uploaded_by_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAttachment {
    pub filename: String,
    pub stored_name: String,
    pub mime_type: String,
    pub size: i64,
    pub url: String,
    pub card_id: Uuid,
    pub uploaded_by_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttachmentScope {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub attachment: Attachment,
    pub board_id: Uuid,
    pub workspace_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentWithUploader {
    #[serde(flatten)]
    pub attachment: Attachment,
    pub uploaded_by: UserSummary,
}
