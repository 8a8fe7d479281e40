use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::users::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub card_id: Uuid,
    pub author_id: Uuid,
    /// User ids parsed from `@<uuid>` tokens in the content
    #[sqlx(json)]
    pub mentions: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub content: String,
    pub card_id: Uuid,
    pub author_id: Uuid,
    pub mentions: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommentScope {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub comment: Comment,
    pub board_id: Uuid,
    pub workspace_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: UserSummary,
}
