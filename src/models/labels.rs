use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Label {
    pub id: Uuid,
    pub name: String,
    /// `#RRGGBB`
    pub color: String,
    pub board_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLabel {
    pub name: String,
    pub color: String,
    pub board_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LabelScope {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub label: Label,
    pub workspace_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CardLabel {
    pub card_id: Uuid,
    pub label_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Outcome of applying a label to a card. Applying twice is not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelAssignment {
    pub label: Label,
    pub added: bool,
    pub message: String,
}
