use crate::{
    error::{Error, Result},
    models::{
        comments::{Comment, CommentScope, CommentWithAuthor, NewComment},
        users::UserSummary,
    },
};
use chrono::Utc;
use sqlx::{FromRow, types::Json};
use uuid::Uuid;

use crate::DbConn;

const COMMENT_FIELDS: &str = "id, content, card_id, author_id, mentions, created_at, updated_at";

#[derive(FromRow)]
struct CommentRow {
    #[sqlx(flatten)]
    comment: Comment,
    author_email: String,
    author_full_name: Option<String>,
    author_avatar_url: Option<String>,
}

impl From<CommentRow> for CommentWithAuthor {
    fn from(row: CommentRow) -> Self {
        let author = UserSummary {
            id: row.comment.author_id,
            email: row.author_email,
            full_name: row.author_full_name,
            avatar_url: row.author_avatar_url,
        };
        CommentWithAuthor {
            comment: row.comment,
            author,
        }
    }
}

pub async fn create_comment(conn: &mut DbConn, new_comment: NewComment) -> Result<Comment> {
    let query = format!(
        r#"
        INSERT INTO comments (id, content, card_id, author_id, mentions, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        RETURNING {COMMENT_FIELDS}
        "#
    );
    let comment = sqlx::query_as::<_, Comment>(&query)
        .bind(Uuid::now_v7())
        .bind(&new_comment.content)
        .bind(new_comment.card_id)
        .bind(new_comment.author_id)
        .bind(Json(&new_comment.mentions))
        .bind(Utc::now())
        .fetch_one(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(comment)
}

/// Loads a comment with the board and workspace its card belongs to.
pub async fn get_comment_scope(conn: &mut DbConn, id: Uuid) -> Result<Option<CommentScope>> {
    let scope = sqlx::query_as::<_, CommentScope>(
        r#"
        SELECT cm.id, cm.content, cm.card_id, cm.author_id, cm.mentions, cm.created_at, cm.updated_at,
               col.board_id, b.workspace_id
        FROM comments cm
        JOIN cards c ON c.id = cm.card_id
        JOIN board_columns col ON col.id = c.column_id
        JOIN boards b ON b.id = col.board_id
        WHERE cm.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(scope)
}

pub async fn get_comment_with_author(conn: &mut DbConn, id: Uuid) -> Result<Option<CommentWithAuthor>> {
    let row = sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT cm.id, cm.content, cm.card_id, cm.author_id, cm.mentions, cm.created_at, cm.updated_at,
               u.email AS author_email, u.full_name AS author_full_name, u.avatar_url AS author_avatar_url
        FROM comments cm
        JOIN users u ON u.id = cm.author_id
        WHERE cm.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(row.map(Into::into))
}

/// Lists a card's comments, newest first.
pub async fn list_comments_by_card(conn: &mut DbConn, card_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
    let rows = sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT cm.id, cm.content, cm.card_id, cm.author_id, cm.mentions, cm.created_at, cm.updated_at,
               u.email AS author_email, u.full_name AS author_full_name, u.avatar_url AS author_avatar_url
        FROM comments cm
        JOIN users u ON u.id = cm.author_id
        WHERE cm.card_id = $1
        ORDER BY cm.id DESC
        "#,
    )
    .bind(card_id)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn update_comment(conn: &mut DbConn, id: Uuid, content: &str, mentions: &[Uuid]) -> Result<Comment> {
    let query = format!(
        r#"
        UPDATE comments
        SET content = $1, mentions = $2, updated_at = $3
        WHERE id = $4
        RETURNING {COMMENT_FIELDS}
        "#
    );
    let comment = sqlx::query_as::<_, Comment>(&query)
        .bind(content)
        .bind(Json(mentions))
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?
        .ok_or_else(|| Error::NotFound(format!("Comment {} not found", id)))?;

    Ok(comment)
}

pub async fn delete_comment(conn: &mut DbConn, id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await
        .map_err(Error::Sqlx)?
        .rows_affected();

    Ok(rows_affected)
}
