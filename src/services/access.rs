//! Membership resolution and the per-entity guards built on it.
//!
//! Every guard loads the entity joined up to its workspace, fails with
//! `NotFound` when the entity itself is missing, then requires workspace
//! membership. The loaded entity is handed back so callers never refetch.

use uuid::Uuid;

use crate::DbConn;
use crate::{
    auth::AuthenticatedUser,
    error::{Error, Result},
    models::{
        attachments::AttachmentScope,
        boards::Board,
        cards::CardScope,
        columns::ColumnScope,
        comments::CommentScope,
        labels::LabelScope,
        workspace_members::{WorkspaceMember, WorkspaceRole},
    },
    queries::{attachments, boards, cards, columns, comments, labels, workspace_members},
};

pub const NOT_A_MEMBER: &str = "not a member of this workspace";
pub const INSUFFICIENT_PERMISSIONS: &str = "insufficient permissions";

/// An entity that passed its guard, with the caller's membership.
#[derive(Debug, Clone)]
pub struct Scoped<T> {
    pub entity: T,
    pub member: WorkspaceMember,
}

impl<T> Scoped<T> {
    pub fn has_role(&self, allowed_roles: &[WorkspaceRole]) -> bool {
        allowed_roles.contains(&self.member.role)
    }
}

/// Looks up the membership of a user in a workspace.
pub async fn resolve_membership(conn: &mut DbConn, workspace_id: Uuid, user_id: Uuid) -> Result<Option<WorkspaceMember>> {
    workspace_members::get_workspace_member_optional(conn, workspace_id, user_id).await
}

/// Fails with `Forbidden` unless the user belongs to the workspace.
pub async fn require_membership(conn: &mut DbConn, workspace_id: Uuid, user_id: Uuid) -> Result<WorkspaceMember> {
    resolve_membership(conn, workspace_id, user_id)
        .await?
        .ok_or_else(|| Error::Forbidden(NOT_A_MEMBER.to_string()))
}

/// Fails with `Forbidden` unless the user belongs to the workspace with one of `allowed_roles`.
pub async fn require_role(
    conn: &mut DbConn,
    workspace_id: Uuid,
    user_id: Uuid,
    allowed_roles: &[WorkspaceRole],
) -> Result<WorkspaceMember> {
    let member = require_membership(conn, workspace_id, user_id).await?;
    if !allowed_roles.contains(&member.role) {
        return Err(Error::Forbidden(INSUFFICIENT_PERMISSIONS.to_string()));
    }
    Ok(member)
}

pub async fn board_access(conn: &mut DbConn, actor: &AuthenticatedUser, board_id: Uuid) -> Result<Scoped<Board>> {
    let board = boards::get_board_by_id_optional(&mut *conn, board_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Board {} not found", board_id)))?;
    let member = require_membership(conn, board.workspace_id, actor.id).await?;
    Ok(Scoped { entity: board, member })
}

pub async fn column_access(conn: &mut DbConn, actor: &AuthenticatedUser, column_id: Uuid) -> Result<Scoped<ColumnScope>> {
    let column = columns::get_column_scope(&mut *conn, column_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Column {} not found", column_id)))?;
    let member = require_membership(conn, column.workspace_id, actor.id).await?;
    Ok(Scoped { entity: column, member })
}

pub async fn card_access(conn: &mut DbConn, actor: &AuthenticatedUser, card_id: Uuid) -> Result<Scoped<CardScope>> {
    let card = cards::get_card_scope(&mut *conn, card_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Card {} not found", card_id)))?;
    let member = require_membership(conn, card.workspace_id, actor.id).await?;
    Ok(Scoped { entity: card, member })
}

pub async fn comment_access(conn: &mut DbConn, actor: &AuthenticatedUser, comment_id: Uuid) -> Result<Scoped<CommentScope>> {
    let comment = comments::get_comment_scope(&mut *conn, comment_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Comment {} not found", comment_id)))?;
    let member = require_membership(conn, comment.workspace_id, actor.id).await?;
    Ok(Scoped { entity: comment, member })
}

pub async fn label_access(conn: &mut DbConn, actor: &AuthenticatedUser, label_id: Uuid) -> Result<Scoped<LabelScope>> {
    let label = labels::get_label_scope(&mut *conn, label_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Label {} not found", label_id)))?;
    let member = require_membership(conn, label.workspace_id, actor.id).await?;
    Ok(Scoped { entity: label, member })
}

pub async fn attachment_access(
    conn: &mut DbConn,
    actor: &AuthenticatedUser,
    attachment_id: Uuid,
) -> Result<Scoped<AttachmentScope>> {
    let attachment = attachments::get_attachment_scope(&mut *conn, attachment_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Attachment {} not found", attachment_id)))?;
    let member = require_membership(conn, attachment.workspace_id, actor.id).await?;
    Ok(Scoped { entity: attachment, member })
}
