use crate::{
    error::{Error, Result},
    models::{
        users::UserSummary,
        workspace_members::{NewWorkspaceMember, WorkspaceMember, WorkspaceMemberDetailed, WorkspaceRole},
    },
};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::DbConn;

#[derive(FromRow)]
struct MemberRow {
    workspace_id: Uuid,
    role: WorkspaceRole,
    joined_at: DateTime<Utc>,
    #[sqlx(flatten)]
    user: UserSummary,
}

/// Creates a new workspace member in the database.
pub async fn create_workspace_member(conn: &mut DbConn, new_member: NewWorkspaceMember) -> Result<WorkspaceMember> {
    let member = sqlx::query_as::<_, WorkspaceMember>(
        r#"
        INSERT INTO workspace_members (workspace_id, user_id, role, joined_at)
        VALUES ($1, $2, $3, $4)
        RETURNING workspace_id, user_id, role, joined_at
        "#,
    )
    .bind(new_member.workspace_id)
    .bind(new_member.user_id)
    .bind(new_member.role)
    .bind(Utc::now())
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(member)
}

/// Gets a single workspace member by workspace ID and user ID. The member may not exist.
pub async fn get_workspace_member_optional(conn: &mut DbConn, workspace_id: Uuid, user_id: Uuid) -> Result<Option<WorkspaceMember>> {
    let member = sqlx::query_as::<_, WorkspaceMember>(
        r#"
        SELECT workspace_id, user_id, role, joined_at
        FROM workspace_members
        WHERE workspace_id = $1 AND user_id = $2
        "#,
    )
    .bind(workspace_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(member)
}

/// Lists all members in a specific workspace with their profiles, in join order.
pub async fn list_workspace_members(conn: &mut DbConn, workspace_id: Uuid) -> Result<Vec<WorkspaceMemberDetailed>> {
    let rows = sqlx::query_as::<_, MemberRow>(
        r#"
        SELECT m.workspace_id, m.role, m.joined_at,
               u.id, u.email, u.full_name, u.avatar_url
        FROM workspace_members m
        JOIN users u ON u.id = m.user_id
        WHERE m.workspace_id = $1
        ORDER BY m.rowid ASC
        "#,
    )
    .bind(workspace_id)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(rows
        .into_iter()
        .map(|row| WorkspaceMemberDetailed {
            workspace_id: row.workspace_id,
            role: row.role,
            joined_at: row.joined_at,
            user: row.user,
        })
        .collect())
}

/// Returns the subset of `user_ids` that are members of the workspace.
pub async fn filter_workspace_members(conn: &mut DbConn, workspace_id: Uuid, user_ids: &[Uuid]) -> Result<Vec<Uuid>> {
    let mut members = Vec::with_capacity(user_ids.len());
    for user_id in user_ids {
        if is_workspace_member(&mut *conn, workspace_id, *user_id).await? {
            members.push(*user_id);
        }
    }
    Ok(members)
}

/// Updates an existing workspace member's role.
pub async fn update_workspace_member_role(conn: &mut DbConn, workspace_id: Uuid, user_id: Uuid, role: WorkspaceRole) -> Result<WorkspaceMember> {
    let member = sqlx::query_as::<_, WorkspaceMember>(
        r#"
        UPDATE workspace_members
        SET role = $1
        WHERE workspace_id = $2 AND user_id = $3
        RETURNING workspace_id, user_id, role, joined_at
        "#,
    )
    .bind(role)
    .bind(workspace_id)
    .bind(user_id)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(member)
}

/// Deletes a workspace member by workspace ID and user ID.
pub async fn delete_workspace_member(conn: &mut DbConn, workspace_id: Uuid, user_id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query(
        r#"
        DELETE FROM workspace_members
        WHERE workspace_id = $1 AND user_id = $2
        "#,
    )
    .bind(workspace_id)
    .bind(user_id)
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    Ok(rows_affected)
}

/// Counts members holding a given role.
pub async fn count_members_with_role(conn: &mut DbConn, workspace_id: Uuid, role: WorkspaceRole) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM workspace_members
        WHERE workspace_id = $1 AND role = $2
        "#,
    )
    .bind(workspace_id)
    .bind(role)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(count)
}

/// Checks if a user is a member of a workspace.
pub async fn is_workspace_member(conn: &mut DbConn, workspace_id: Uuid, user_id: Uuid) -> Result<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM workspace_members
        WHERE workspace_id = $1 AND user_id = $2
        "#,
    )
    .bind(workspace_id)
    .bind(user_id)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(count > 0)
}
