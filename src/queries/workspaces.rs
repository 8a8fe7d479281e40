use crate::{
    error::{Error, Result},
    models::workspaces::{NewWorkspace, UpdateWorkspace, Workspace, WorkspaceWithRole},
};
use chrono::Utc;
use uuid::Uuid;

use crate::DbConn;

/// Creates a new workspace in the database.
pub async fn create_workspace(conn: &mut DbConn, new_workspace: NewWorkspace) -> Result<Workspace> {
    let now = Utc::now();
    let workspace = sqlx::query_as::<_, Workspace>(
        r#"
        INSERT INTO workspaces (id, name, description, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $4)
        RETURNING id, name, description, created_at, updated_at
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(&new_workspace.name)
    .bind(&new_workspace.description)
    .bind(now)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(workspace)
}

/// Gets a single workspace by its ID. The workspace may not exist.
pub async fn get_workspace_by_id_optional(conn: &mut DbConn, id: Uuid) -> Result<Option<Workspace>> {
    let workspace = sqlx::query_as::<_, Workspace>(
        r#"
        SELECT id, name, description, created_at, updated_at
        FROM workspaces
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(workspace)
}

/// Gets a single workspace by its ID. Expects the workspace to exist.
pub async fn get_workspace_by_id(conn: &mut DbConn, id: Uuid) -> Result<Workspace> {
    get_workspace_by_id_optional(conn, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Workspace {} not found", id)))
}

/// Lists the workspaces a user belongs to, with the user's role in each.
pub async fn list_workspaces_for_user(conn: &mut DbConn, user_id: Uuid) -> Result<Vec<WorkspaceWithRole>> {
    let workspaces = sqlx::query_as::<_, WorkspaceWithRole>(
        r#"
        SELECT w.id, w.name, w.description, w.created_at, w.updated_at, m.role
        FROM workspaces w
        JOIN workspace_members m ON m.workspace_id = w.id
        WHERE m.user_id = $1
        ORDER BY w.id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(workspaces)
}

/// Updates an existing workspace's details.
pub async fn update_workspace(conn: &mut DbConn, id: Uuid, update: UpdateWorkspace) -> Result<Workspace> {
    let workspace = sqlx::query_as::<_, Workspace>(
        r#"
        UPDATE workspaces
        SET name = COALESCE($1, name),
            description = COALESCE($2, description),
            updated_at = $3
        WHERE id = $4
        RETURNING id, name, description, created_at, updated_at
        "#,
    )
    .bind(update.name)
    .bind(update.description)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?
    .ok_or_else(|| Error::NotFound(format!("Workspace {} not found", id)))?;

    Ok(workspace)
}

/// Deletes a workspace by its ID. Boards, members and invitations cascade.
pub async fn delete_workspace(conn: &mut DbConn, id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query(
        r#"
        DELETE FROM workspaces
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    Ok(rows_affected)
}
