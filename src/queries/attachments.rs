use crate::{
    error::{Error, Result},
    models::{
        attachments::{Attachment, AttachmentScope, AttachmentWithUploader, NewAttachment},
        users::UserSummary,
    },
};
use chrono::Utc;
use sqlx::FromRow;
use uuid::Uuid;

use crate::DbConn;

#[derive(FromRow)]
struct AttachmentRow {
    #[sqlx(flatten)]
    attachment: Attachment,
    uploader_email: String,
    uploader_full_name: Option<String>,
    uploader_avatar_url: Option<String>,
}

impl From<AttachmentRow> for AttachmentWithUploader {
    fn from(row: AttachmentRow) -> Self {
        let uploaded_by = UserSummary {
            id: row.attachment.uploaded_by_id,
            email: row.uploader_email,
            full_name: row.uploader_full_name,
            avatar_url: row.uploader_avatar_url,
        };
        AttachmentWithUploader {
            attachment: row.attachment,
            uploaded_by,
        }
    }
}

pub async fn create_attachment(conn: &mut DbConn, new_attachment: NewAttachment) -> Result<Attachment> {
    let attachment = sqlx::query_as::<_, Attachment>(
        r#"
        INSERT INTO attachments (id, filename, stored_name, mime_type, size, url, card_id, uploaded_by_id, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, filename, stored_name, mime_type, size, url, card_id, uploaded_by_id, created_at
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(&new_attachment.filename)
    .bind(&new_attachment.stored_name)
    .bind(&new_attachment.mime_type)
    .bind(new_attachment.size)
    .bind(&new_attachment.url)
    .bind(new_attachment.card_id)
    .bind(new_attachment.uploaded_by_id)
    .bind(Utc::now())
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(attachment)
}

pub async fn get_attachment_scope(conn: &mut DbConn, id: Uuid) -> Result<Option<AttachmentScope>> {
    let scope = sqlx::query_as::<_, AttachmentScope>(
        r#"
        SELECT a.id, a.filename, a.stored_name, a.mime_type, a.size, a.url, a.card_id,
               a.uploaded_by_id, a.created_at, col.board_id, b.workspace_id
        FROM attachments a
        JOIN cards c ON c.id = a.card_id
        JOIN board_columns col ON col.id = c.column_id
        JOIN boards b ON b.id = col.board_id
        WHERE a.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(scope)
}

/// Lists a card's attachments, newest first.
pub async fn list_attachments_by_card(conn: &mut DbConn, card_id: Uuid) -> Result<Vec<AttachmentWithUploader>> {
    let rows = sqlx::query_as::<_, AttachmentRow>(
        r#"
        SELECT a.id, a.filename, a.stored_name, a.mime_type, a.size, a.url, a.card_id,
               a.uploaded_by_id, a.created_at,
               u.email AS uploader_email, u.full_name AS uploader_full_name,
               u.avatar_url AS uploader_avatar_url
        FROM attachments a
        JOIN users u ON u.id = a.uploaded_by_id
        WHERE a.card_id = $1
        ORDER BY a.id DESC
        "#,
    )
    .bind(card_id)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn delete_attachment(conn: &mut DbConn, id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query("DELETE FROM attachments WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await
        .map_err(Error::Sqlx)?
        .rows_affected();

    Ok(rows_affected)
}

/// Stored file names under a card, collected before a cascading delete.
pub async fn list_stored_names_by_card(conn: &mut DbConn, card_id: Uuid) -> Result<Vec<String>> {
    let names = sqlx::query_scalar::<_, String>("SELECT stored_name FROM attachments WHERE card_id = $1")
        .bind(card_id)
        .fetch_all(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(names)
}

pub async fn list_stored_names_by_column(conn: &mut DbConn, column_id: Uuid) -> Result<Vec<String>> {
    let names = sqlx::query_scalar::<_, String>(
        r#"
        SELECT a.stored_name
        FROM attachments a
        JOIN cards c ON c.id = a.card_id
        WHERE c.column_id = $1
        "#,
    )
    .bind(column_id)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(names)
}

pub async fn list_stored_names_by_board(conn: &mut DbConn, board_id: Uuid) -> Result<Vec<String>> {
    let names = sqlx::query_scalar::<_, String>(
        r#"
        SELECT a.stored_name
        FROM attachments a
        JOIN cards c ON c.id = a.card_id
        JOIN board_columns col ON col.id = c.column_id
        WHERE col.board_id = $1
        "#,
    )
    .bind(board_id)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(names)
}

pub async fn list_stored_names_by_workspace(conn: &mut DbConn, workspace_id: Uuid) -> Result<Vec<String>> {
    let names = sqlx::query_scalar::<_, String>(
        r#"
        SELECT a.stored_name
        FROM attachments a
        JOIN cards c ON c.id = a.card_id
        JOIN board_columns col ON col.id = c.column_id
        JOIN boards b ON b.id = col.board_id
        WHERE b.workspace_id = $1
        "#,
    )
    .bind(workspace_id)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(names)
}
