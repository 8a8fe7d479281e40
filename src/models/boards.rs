use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{cards::Card, columns::Column, labels::Label};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Board {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub workspace_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBoard {
    pub name: String,
    pub description: Option<String>,
    pub workspace_id: Uuid,
}

/// A column together with its visible (non-archived) cards, in board order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnWithCards {
    #[serde(flatten)]
    pub column: Column,
    pub cards: Vec<Card>,
}

/// Everything the board screen renders in one payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardDetails {
    #[serde(flatten)]
    pub board: Board,
    pub columns: Vec<ColumnWithCards>,
    pub labels: Vec<Label>,
}
