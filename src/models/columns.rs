use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Column {
    pub id: Uuid,
    pub title: String,
    /// Ordering key within the board. Not unique: duplicates are tolerated.
    pub position: i64,
    pub board_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewColumn {
    pub title: String,
    pub position: i64,
    pub board_id: Uuid,
}

/// A column with the workspace it resolves to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ColumnScope {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub column: Column,
    pub workspace_id: Uuid,
}
