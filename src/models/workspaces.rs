use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::workspace_members::WorkspaceRole;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkspace {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateWorkspace {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// A workspace as seen by one of its members.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkspaceWithRole {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub workspace: Workspace,
    pub role: WorkspaceRole,
}
