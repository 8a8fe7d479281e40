use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{labels::Label, users::UserSummary};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Card {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Ordering key within the column. Not unique: duplicates are tolerated.
    pub position: i64,
    pub column_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub creator_id: Uuid,
    pub due_date: Option<DateTime<Utc>>,
    /// Legacy free-text labels, kept alongside the relational labels.
    #[sqlx(json)]
    pub labels: Vec<String>,
    pub is_completed: bool,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCard {
    pub title: String,
    pub description: Option<String>,
    pub position: i64,
    pub column_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub creator_id: Uuid,
    pub due_date: Option<DateTime<Utc>>,
    pub labels: Vec<String>,
}

/// A card with its column, board and workspace resolved.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CardScope {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub card: Card,
    pub board_id: Uuid,
    pub workspace_id: Uuid,
}

/// Card detail view rendered by the card modal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardDetails {
    #[serde(flatten)]
    pub card: Card,
    pub board_id: Uuid,
    pub creator: Option<UserSummary>,
    pub assignee: Option<UserSummary>,
    pub card_labels: Vec<Label>,
    pub comment_count: i64,
    pub attachment_count: i64,
}

/// Cards whose due date is approaching, as seen by the reminder sweep.
#[derive(Debug, Clone, FromRow)]
pub struct DueCard {
    pub id: Uuid,
    pub title: String,
    pub assignee_id: Uuid,
    pub due_date: DateTime<Utc>,
}
