//! Workspace invitations: PENDING moves to ACCEPTED or REJECTED exactly once.

use sqlx::Connection;
use uuid::Uuid;

use crate::DbConn;
use crate::{
    auth::AuthenticatedUser,
    error::{Error, Result},
    models::{
        invitations::{
            AcceptInvitationResponse, InvitationStatus, InvitationSummary, InviteMemberRequest,
            NewWorkspaceInvitation, WorkspaceInvitation,
        },
        notifications::{NewNotification, NotificationType},
        workspace_members::{MANAGER_ROLES, NewWorkspaceMember, WorkspaceRole},
    },
    queries::{invitations, users, workspace_members, workspaces},
    services::{access, notifications},
    validation::validate_email,
};

/// Invites an existing user by email. The invitee gets a WORKSPACE_INVITATION notification.
pub async fn invite_member(
    conn: &mut DbConn,
    actor: &AuthenticatedUser,
    workspace_id: Uuid,
    request: InviteMemberRequest,
) -> Result<WorkspaceInvitation> {
    let workspace = workspaces::get_workspace_by_id(&mut *conn, workspace_id).await?;
    access::require_role(&mut *conn, workspace_id, actor.id, MANAGER_ROLES).await?;

    if request.role == WorkspaceRole::Owner {
        return Err(Error::validation("role", "Invitations cannot grant the OWNER role"));
    }

    let email = validate_email(&request.email)?;
    let invitee = users::get_user_by_email(&mut *conn, &email)
        .await?
        .ok_or_else(|| Error::NotFound(format!("No user with email {}", email)))?;

    if workspace_members::is_workspace_member(&mut *conn, workspace_id, invitee.id).await? {
        return Err(Error::Conflict("User is already a member of this workspace".to_string()));
    }

    if invitations::has_pending_invitation(&mut *conn, workspace_id, invitee.id).await? {
        return Err(Error::Conflict("A pending invitation already exists for this user".to_string()));
    }

    let invitation = invitations::create_invitation(
        &mut *conn,
        NewWorkspaceInvitation {
            workspace_id,
            invited_user_id: invitee.id,
            invited_by_id: actor.id,
            role: request.role,
        },
    )
    .await?;

    notifications::create_notification(
        conn,
        NewNotification {
            user_id: invitee.id,
            notification_type: NotificationType::WorkspaceInvitation,
            message: format!("{} invited you to join {}", actor.display_name(), workspace.name),
            card_id: None,
            workspace_invitation_id: Some(invitation.id),
        },
    )
    .await?;

    tracing::info!(
        operation = "invite_member",
        workspace_id = %workspace_id,
        invitation_id = %invitation.id,
        invited_user_id = %invitee.id,
        role = %invitation.role,
        actor_id = %actor.id,
        "Workspace invitation created"
    );

    Ok(invitation)
}

/// Loads an invitation the actor may answer.
async fn open_invitation_for(
    conn: &mut DbConn,
    actor: &AuthenticatedUser,
    invitation_id: Uuid,
) -> Result<WorkspaceInvitation> {
    let invitation = invitations::get_invitation_by_id_optional(conn, invitation_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Invitation {} not found", invitation_id)))?;

    if invitation.invited_user_id != actor.id {
        return Err(Error::Forbidden("This invitation is addressed to another user".to_string()));
    }

    if !invitation.status.is_open() {
        return Err(Error::Conflict(format!(
            "Invitation has already been {}",
            invitation.status.to_string().to_lowercase()
        )));
    }

    Ok(invitation)
}

/// Accepts an invitation and creates the membership in one transaction.
pub async fn accept_invitation(
    conn: &mut DbConn,
    actor: &AuthenticatedUser,
    invitation_id: Uuid,
) -> Result<AcceptInvitationResponse> {
    let invitation = open_invitation_for(&mut *conn, actor, invitation_id).await?;

    let mut tx = conn.begin().await.map_err(Error::Sqlx)?;

    let invitation = invitations::respond_to_invitation(&mut tx, invitation.id, InvitationStatus::Accepted)
        .await?
        .ok_or_else(|| Error::Conflict("Invitation has already been answered".to_string()))?;

    let workspace_member = workspace_members::create_workspace_member(
        &mut tx,
        NewWorkspaceMember {
            workspace_id: invitation.workspace_id,
            user_id: actor.id,
            role: invitation.role,
        },
    )
    .await?;

    tx.commit().await.map_err(Error::Sqlx)?;

    tracing::info!(
        operation = "accept_invitation",
        invitation_id = %invitation.id,
        workspace_id = %invitation.workspace_id,
        user_id = %actor.id,
        "Invitation accepted"
    );

    Ok(AcceptInvitationResponse {
        invitation,
        workspace_member,
    })
}

pub async fn reject_invitation(
    conn: &mut DbConn,
    actor: &AuthenticatedUser,
    invitation_id: Uuid,
) -> Result<WorkspaceInvitation> {
    let invitation = open_invitation_for(&mut *conn, actor, invitation_id).await?;

    let invitation = invitations::respond_to_invitation(conn, invitation.id, InvitationStatus::Rejected)
        .await?
        .ok_or_else(|| Error::Conflict("Invitation has already been answered".to_string()))?;

    tracing::info!(
        operation = "reject_invitation",
        invitation_id = %invitation.id,
        workspace_id = %invitation.workspace_id,
        user_id = %actor.id,
        "Invitation rejected"
    );

    Ok(invitation)
}

/// Every invitation of a workspace, newest first. OWNER/ADMIN only.
pub async fn list_workspace_invitations(
    conn: &mut DbConn,
    actor: &AuthenticatedUser,
    workspace_id: Uuid,
) -> Result<Vec<WorkspaceInvitation>> {
    workspaces::get_workspace_by_id(&mut *conn, workspace_id).await?;
    access::require_role(&mut *conn, workspace_id, actor.id, MANAGER_ROLES).await?;
    invitations::list_invitations_by_workspace(conn, workspace_id).await
}

/// Open invitations addressed to the caller.
pub async fn list_pending_invitations(conn: &mut DbConn, actor: &AuthenticatedUser) -> Result<Vec<InvitationSummary>> {
    invitations::list_pending_invitations_for_user(conn, actor.id).await
}
