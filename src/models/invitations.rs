use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::models::workspace_members::{WorkspaceMember, WorkspaceRole};

/// Invitation lifecycle: PENDING moves to ACCEPTED or REJECTED, both terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, sqlx::Type,
)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl InvitationStatus {
    /// Whether the invitee may still answer.
    pub fn is_open(&self) -> bool {
        matches!(self, InvitationStatus::Pending)
    }

    /// Validates a transition out of `self`.
    pub fn can_transition_to(&self, next: InvitationStatus) -> bool {
        matches!(
            (self, next),
            (InvitationStatus::Pending, InvitationStatus::Accepted)
                | (InvitationStatus::Pending, InvitationStatus::Rejected)
        )
    }
}

/// Workspace invitation entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkspaceInvitation {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub invited_user_id: Uuid,
    pub invited_by_id: Uuid,
    pub role: WorkspaceRole,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

/// New workspace invitation entity for creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkspaceInvitation {
    pub workspace_id: Uuid,
    pub invited_user_id: Uuid,
    pub invited_by_id: Uuid,
    pub role: WorkspaceRole,
}

/// Request to invite a user by email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteMemberRequest {
    pub email: String,
    pub role: WorkspaceRole,
}

/// Response after accepting an invitation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptInvitationResponse {
    pub invitation: WorkspaceInvitation,
    pub workspace_member: WorkspaceMember,
}

/// Invitation joined with the names the invitee needs to decide
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InvitationSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub invitation: WorkspaceInvitation,
    pub workspace_name: String,
    pub invited_by_email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_invitation_status_strings() {
        assert_eq!(InvitationStatus::Pending.to_string(), "PENDING");
        assert_eq!(
            InvitationStatus::from_str("REJECTED").unwrap(),
            InvitationStatus::Rejected
        );
        assert!(InvitationStatus::from_str("expired").is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(InvitationStatus::Pending.can_transition_to(InvitationStatus::Accepted));
        assert!(InvitationStatus::Pending.can_transition_to(InvitationStatus::Rejected));
        assert!(!InvitationStatus::Accepted.can_transition_to(InvitationStatus::Rejected));
        assert!(!InvitationStatus::Rejected.can_transition_to(InvitationStatus::Accepted));
        assert!(!InvitationStatus::Accepted.can_transition_to(InvitationStatus::Accepted));
        assert!(!InvitationStatus::Pending.can_transition_to(InvitationStatus::Pending));
        assert!(InvitationStatus::Pending.is_open());
        assert!(!InvitationStatus::Accepted.is_open());
    }
}
