use crate::{
    error::{Error, Result},
    models::{
        columns::{Column, ColumnScope, NewColumn},
        requests::UpdateColumnRequest,
    },
};
use chrono::Utc;
use uuid::Uuid;

use crate::DbConn;

pub async fn create_column(conn: &mut DbConn, new_column: NewColumn) -> Result<Column> {
    let column = sqlx::query_as::<_, Column>(
        r#"
        INSERT INTO board_columns (id, title, position, board_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        RETURNING id, title, position, board_id, created_at, updated_at
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(&new_column.title)
    .bind(new_column.position)
    .bind(new_column.board_id)
    .bind(Utc::now())
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(column)
}

/// Loads a column joined up to its workspace.
pub async fn get_column_scope(conn: &mut DbConn, id: Uuid) -> Result<Option<ColumnScope>> {
    let scope = sqlx::query_as::<_, ColumnScope>(
        r#"
        SELECT col.id, col.title, col.position, col.board_id, col.created_at, col.updated_at,
               b.workspace_id
        FROM board_columns col
        JOIN boards b ON b.id = col.board_id
        WHERE col.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(scope)
}

/// Lists the columns of a board by ascending position; ties fall back to creation order.
pub async fn list_columns_by_board(conn: &mut DbConn, board_id: Uuid) -> Result<Vec<Column>> {
    let columns = sqlx::query_as::<_, Column>(
        r#"
        SELECT id, title, position, board_id, created_at, updated_at
        FROM board_columns
        WHERE board_id = $1
        ORDER BY position ASC, id ASC
        "#,
    )
    .bind(board_id)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(columns)
}

/// Highest position among a board's columns, `None` for an empty board.
pub async fn max_column_position(conn: &mut DbConn, board_id: Uuid) -> Result<Option<i64>> {
    let max = sqlx::query_scalar::<_, Option<i64>>(
        "SELECT MAX(position) FROM board_columns WHERE board_id = $1",
    )
    .bind(board_id)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(max)
}

pub async fn update_column(conn: &mut DbConn, id: Uuid, update: UpdateColumnRequest) -> Result<Column> {
    let column = sqlx::query_as::<_, Column>(
        r#"
        UPDATE board_columns
        SET title = COALESCE($1, title),
            position = COALESCE($2, position),
            updated_at = $3
        WHERE id = $4
        RETURNING id, title, position, board_id, created_at, updated_at
        "#,
    )
    .bind(update.title)
    .bind(update.position)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?
    .ok_or_else(|| Error::NotFound(format!("Column {} not found", id)))?;

    Ok(column)
}

/// Deletes a column. Its cards cascade.
pub async fn delete_column(conn: &mut DbConn, id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query("DELETE FROM board_columns WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await
        .map_err(Error::Sqlx)?
        .rows_affected();

    Ok(rows_affected)
}
