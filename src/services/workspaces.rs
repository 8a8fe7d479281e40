use sqlx::Connection;
use uuid::Uuid;

use crate::DbConn;
use crate::{
    auth::AuthenticatedUser,
    error::{Error, Result},
    models::{
        requests::{CreateWorkspaceRequest, UpdateWorkspaceRequest},
        workspace_members::{MANAGER_ROLES, NewWorkspaceMember, WorkspaceMember, WorkspaceMemberDetailed, WorkspaceRole},
        workspaces::{NewWorkspace, UpdateWorkspace, Workspace, WorkspaceWithRole},
    },
    queries::{attachments, workspace_members, workspaces},
    services::{
        access,
        storage::{FileStore, remove_files_best_effort},
    },
    validation::{MAX_CONTENT_LENGTH, MAX_NAME_LENGTH, validate_optional_text, validate_required_text},
};

/// Creates a workspace with the caller as its single OWNER.
pub async fn create_workspace(
    conn: &mut DbConn,
    actor: &AuthenticatedUser,
    request: CreateWorkspaceRequest,
) -> Result<WorkspaceWithRole> {
    let name = validate_required_text(&request.name, "name", MAX_NAME_LENGTH)?;
    let description = validate_optional_text(request.description, "description", MAX_CONTENT_LENGTH)?;

    let mut tx = conn.begin().await.map_err(Error::Sqlx)?;

    let workspace = workspaces::create_workspace(&mut tx, NewWorkspace { name, description }).await?;
    let owner = workspace_members::create_workspace_member(
        &mut tx,
        NewWorkspaceMember {
            workspace_id: workspace.id,
            user_id: actor.id,
            role: WorkspaceRole::Owner,
        },
    )
    .await?;

    tx.commit().await.map_err(Error::Sqlx)?;

    tracing::info!(
        operation = "create_workspace",
        workspace_id = %workspace.id,
        owner_id = %actor.id,
        "Workspace created"
    );

    Ok(WorkspaceWithRole {
        workspace,
        role: owner.role,
    })
}

/// Workspaces the caller belongs to, with their role in each.
pub async fn list_user_workspaces(conn: &mut DbConn, actor: &AuthenticatedUser) -> Result<Vec<WorkspaceWithRole>> {
    workspaces::list_workspaces_for_user(conn, actor.id).await
}

pub async fn get_workspace(conn: &mut DbConn, actor: &AuthenticatedUser, workspace_id: Uuid) -> Result<WorkspaceWithRole> {
    let workspace = workspaces::get_workspace_by_id(&mut *conn, workspace_id).await?;
    let member = access::require_membership(conn, workspace_id, actor.id).await?;
    Ok(WorkspaceWithRole {
        workspace,
        role: member.role,
    })
}

pub async fn update_workspace(
    conn: &mut DbConn,
    actor: &AuthenticatedUser,
    workspace_id: Uuid,
    request: UpdateWorkspaceRequest,
) -> Result<Workspace> {
    workspaces::get_workspace_by_id(&mut *conn, workspace_id).await?;
    access::require_role(&mut *conn, workspace_id, actor.id, MANAGER_ROLES).await?;

    let name = request
        .name
        .map(|name| validate_required_text(&name, "name", MAX_NAME_LENGTH))
        .transpose()?;
    let description = validate_optional_text(request.description, "description", MAX_CONTENT_LENGTH)?;

    let workspace = workspaces::update_workspace(conn, workspace_id, UpdateWorkspace { name, description }).await?;

    tracing::info!(operation = "update_workspace", workspace_id = %workspace_id, actor_id = %actor.id, "Workspace updated");

    Ok(workspace)
}

/// Deletes a workspace and everything under it. OWNER only.
pub async fn delete_workspace(
    conn: &mut DbConn,
    store: &dyn FileStore,
    actor: &AuthenticatedUser,
    workspace_id: Uuid,
) -> Result<()> {
    workspaces::get_workspace_by_id(&mut *conn, workspace_id).await?;
    access::require_role(&mut *conn, workspace_id, actor.id, &[WorkspaceRole::Owner]).await?;

    let stored_names = attachments::list_stored_names_by_workspace(&mut *conn, workspace_id).await?;
    workspaces::delete_workspace(conn, workspace_id).await?;
    remove_files_best_effort(store, &stored_names).await;

    tracing::info!(
        operation = "delete_workspace",
        workspace_id = %workspace_id,
        actor_id = %actor.id,
        removed_files = stored_names.len(),
        "Workspace deleted"
    );

    Ok(())
}

pub async fn list_members(
    conn: &mut DbConn,
    actor: &AuthenticatedUser,
    workspace_id: Uuid,
) -> Result<Vec<WorkspaceMemberDetailed>> {
    workspaces::get_workspace_by_id(&mut *conn, workspace_id).await?;
    access::require_membership(&mut *conn, workspace_id, actor.id).await?;
    workspace_members::list_workspace_members(conn, workspace_id).await
}

/// Changes a member's role. The OWNER role can neither be changed nor granted.
pub async fn update_member_role(
    conn: &mut DbConn,
    actor: &AuthenticatedUser,
    workspace_id: Uuid,
    target_user_id: Uuid,
    role: WorkspaceRole,
) -> Result<WorkspaceMember> {
    access::require_role(&mut *conn, workspace_id, actor.id, MANAGER_ROLES).await?;

    if role == WorkspaceRole::Owner {
        return Err(Error::validation("role", "The OWNER role cannot be granted"));
    }

    let target = access::resolve_membership(&mut *conn, workspace_id, target_user_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User {} is not a member of this workspace", target_user_id)))?;

    if target.role == WorkspaceRole::Owner {
        return Err(Error::Forbidden("The workspace owner's role cannot be changed".to_string()));
    }

    let member = workspace_members::update_workspace_member_role(conn, workspace_id, target_user_id, role).await?;

    tracing::info!(
        operation = "update_member_role",
        workspace_id = %workspace_id,
        user_id = %target_user_id,
        role = %role,
        actor_id = %actor.id,
        "Member role updated"
    );

    Ok(member)
}

/// Removes a member. The OWNER cannot be removed this way.
pub async fn remove_member(
    conn: &mut DbConn,
    actor: &AuthenticatedUser,
    workspace_id: Uuid,
    target_user_id: Uuid,
) -> Result<()> {
    access::require_role(&mut *conn, workspace_id, actor.id, MANAGER_ROLES).await?;

    let target = access::resolve_membership(&mut *conn, workspace_id, target_user_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User {} is not a member of this workspace", target_user_id)))?;

    if target.role == WorkspaceRole::Owner {
        return Err(Error::Forbidden("The workspace owner cannot be removed".to_string()));
    }

    workspace_members::delete_workspace_member(conn, workspace_id, target_user_id).await?;

    tracing::info!(
        operation = "remove_member",
        workspace_id = %workspace_id,
        user_id = %target_user_id,
        actor_id = %actor.id,
        "Member removed"
    );

    Ok(())
}
