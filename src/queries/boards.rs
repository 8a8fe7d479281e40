use crate::{
    error::{Error, Result},
    models::{boards::{Board, NewBoard}, requests::UpdateBoardRequest},
};
use chrono::Utc;
use uuid::Uuid;

use crate::DbConn;

pub async fn create_board(conn: &mut DbConn, new_board: NewBoard) -> Result<Board> {
    let board = sqlx::query_as::<_, Board>(
        r#"
        INSERT INTO boards (id, name, description, workspace_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        RETURNING id, name, description, workspace_id, created_at, updated_at
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(&new_board.name)
    .bind(&new_board.description)
    .bind(new_board.workspace_id)
    .bind(Utc::now())
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(board)
}

pub async fn get_board_by_id_optional(conn: &mut DbConn, id: Uuid) -> Result<Option<Board>> {
    let board = sqlx::query_as::<_, Board>(
        r#"
        SELECT id, name, description, workspace_id, created_at, updated_at
        FROM boards
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(board)
}

/// Lists the boards of a workspace in creation order.
pub async fn list_boards_by_workspace(conn: &mut DbConn, workspace_id: Uuid) -> Result<Vec<Board>> {
    let boards = sqlx::query_as::<_, Board>(
        r#"
        SELECT id, name, description, workspace_id, created_at, updated_at
        FROM boards
        WHERE workspace_id = $1
        ORDER BY id ASC
        "#,
    )
    .bind(workspace_id)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(boards)
}

pub async fn update_board(conn: &mut DbConn, id: Uuid, update: UpdateBoardRequest) -> Result<Board> {
    let board = sqlx::query_as::<_, Board>(
        r#"
        UPDATE boards
        SET name = COALESCE($1, name),
            description = COALESCE($2, description),
            updated_at = $3
        WHERE id = $4
        RETURNING id, name, description, workspace_id, created_at, updated_at
        "#,
    )
    .bind(update.name)
    .bind(update.description)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?
    .ok_or_else(|| Error::NotFound(format!("Board {} not found", id)))?;

    Ok(board)
}

/// Deletes a board. Columns, cards and labels cascade.
pub async fn delete_board(conn: &mut DbConn, id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query("DELETE FROM boards WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await
        .map_err(Error::Sqlx)?
        .rows_affected();

    Ok(rows_affected)
}
