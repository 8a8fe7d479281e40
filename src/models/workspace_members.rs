use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::models::users::UserSummary;

/// Role hierarchy inside a workspace: Owner > Admin > Member.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, sqlx::Type,
)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkspaceRole {
    Owner,
    Admin,
    Member,
}

/// Roles allowed to manage members, invitations and workspace settings.
pub const MANAGER_ROLES: &[WorkspaceRole] = &[WorkspaceRole::Owner, WorkspaceRole::Admin];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkspaceMember {
    pub workspace_id: Uuid,
    pub user_id: Uuid,
    pub role: WorkspaceRole,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkspaceMember {
    pub workspace_id: Uuid,
    pub user_id: Uuid,
    pub role: WorkspaceRole,
}

/// Member row joined with the member's safe profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceMemberDetailed {
    pub workspace_id: Uuid,
    pub role: WorkspaceRole,
    pub joined_at: DateTime<Utc>,
    pub user: UserSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_role_string_forms() {
        assert_eq!(WorkspaceRole::Owner.to_string(), "OWNER");
        assert_eq!(WorkspaceRole::from_str("ADMIN").unwrap(), WorkspaceRole::Admin);
        assert!(WorkspaceRole::from_str("viewer").is_err());
        assert_eq!(
            serde_json::to_string(&WorkspaceRole::Member).unwrap(),
            "\"MEMBER\""
        );
    }
}
