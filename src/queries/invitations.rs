use crate::{
    error::{Error, Result},
    models::invitations::{InvitationStatus, InvitationSummary, NewWorkspaceInvitation, WorkspaceInvitation},
};
use chrono::Utc;
use uuid::Uuid;

use crate::DbConn;

const INVITATION_COLUMNS: &str =
    "id, workspace_id, invited_user_id, invited_by_id, role, status, created_at, responded_at";

/// Creates a new PENDING workspace invitation.
pub async fn create_invitation(conn: &mut DbConn, new_invitation: NewWorkspaceInvitation) -> Result<WorkspaceInvitation> {
    let query = format!(
        r#"
        INSERT INTO workspace_invitations (id, workspace_id, invited_user_id, invited_by_id, role, status, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {INVITATION_COLUMNS}
        "#
    );
    let invitation = sqlx::query_as::<_, WorkspaceInvitation>(&query)
        .bind(Uuid::now_v7())
        .bind(new_invitation.workspace_id)
        .bind(new_invitation.invited_user_id)
        .bind(new_invitation.invited_by_id)
        .bind(new_invitation.role)
        .bind(InvitationStatus::Pending)
        .bind(Utc::now())
        .fetch_one(conn)
        .await
        .map_err(|e| {
            if e.to_string().to_lowercase().contains("unique") {
                Error::Conflict("A pending invitation already exists for this user".to_string())
            } else {
                Error::Sqlx(e)
            }
        })?;

    Ok(invitation)
}

/// Gets an invitation by ID. The invitation may not exist.
pub async fn get_invitation_by_id_optional(conn: &mut DbConn, id: Uuid) -> Result<Option<WorkspaceInvitation>> {
    let query = format!("SELECT {INVITATION_COLUMNS} FROM workspace_invitations WHERE id = $1");
    let invitation = sqlx::query_as::<_, WorkspaceInvitation>(&query)
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(invitation)
}

/// Checks whether an open invitation exists for the user in the workspace.
pub async fn has_pending_invitation(conn: &mut DbConn, workspace_id: Uuid, user_id: Uuid) -> Result<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM workspace_invitations
        WHERE workspace_id = $1 AND invited_user_id = $2 AND status = $3
        "#,
    )
    .bind(workspace_id)
    .bind(user_id)
    .bind(InvitationStatus::Pending)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(count > 0)
}

/// Lists every invitation of a workspace, newest first.
pub async fn list_invitations_by_workspace(conn: &mut DbConn, workspace_id: Uuid) -> Result<Vec<WorkspaceInvitation>> {
    let query = format!(
        "SELECT {INVITATION_COLUMNS} FROM workspace_invitations WHERE workspace_id = $1 ORDER BY id DESC"
    );
    let invitations = sqlx::query_as::<_, WorkspaceInvitation>(&query)
        .bind(workspace_id)
        .fetch_all(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(invitations)
}

/// Lists the open invitations addressed to a user, newest first.
pub async fn list_pending_invitations_for_user(conn: &mut DbConn, user_id: Uuid) -> Result<Vec<InvitationSummary>> {
    let invitations = sqlx::query_as::<_, InvitationSummary>(
        r#"
        SELECT i.id, i.workspace_id, i.invited_user_id, i.invited_by_id, i.role, i.status,
               i.created_at, i.responded_at,
               w.name AS workspace_name,
               u.email AS invited_by_email
        FROM workspace_invitations i
        JOIN workspaces w ON w.id = i.workspace_id
        JOIN users u ON u.id = i.invited_by_id
        WHERE i.invited_user_id = $1 AND i.status = $2
        ORDER BY i.id DESC
        "#,
    )
    .bind(user_id)
    .bind(InvitationStatus::Pending)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(invitations)
}

/// Moves an open invitation to a terminal status.
///
/// The `status = PENDING` guard makes the transition a compare-and-set:
/// `None` means the invitation was answered in the meantime.
pub async fn respond_to_invitation(conn: &mut DbConn, id: Uuid, status: InvitationStatus) -> Result<Option<WorkspaceInvitation>> {
    if !InvitationStatus::Pending.can_transition_to(status) {
        return Err(Error::BadRequest(format!("Cannot move an invitation to {}", status)));
    }

    let query = format!(
        r#"
        UPDATE workspace_invitations
        SET status = $1, responded_at = $2
        WHERE id = $3 AND status = $4
        RETURNING {INVITATION_COLUMNS}
        "#
    );
    let invitation = sqlx::query_as::<_, WorkspaceInvitation>(&query)
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .bind(InvitationStatus::Pending)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(invitation)
}
