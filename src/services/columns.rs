use uuid::Uuid;

use crate::DbConn;
use crate::{
    auth::AuthenticatedUser,
    error::{Error, Result},
    models::{
        columns::{Column, NewColumn},
        requests::{CreateColumnRequest, UpdateColumnRequest},
    },
    queries::{attachments, columns},
    realtime::BoardEvents,
    services::{
        access, ordering,
        storage::{FileStore, remove_files_best_effort},
    },
    validation::{MAX_TITLE_LENGTH, validate_position, validate_required_text},
};

pub async fn create_column(
    conn: &mut DbConn,
    events: &BoardEvents,
    actor: &AuthenticatedUser,
    request: CreateColumnRequest,
) -> Result<Column> {
    access::board_access(&mut *conn, actor, request.board_id).await?;

    let title = validate_required_text(&request.title, "title", MAX_TITLE_LENGTH)?;
    let position = ordering::column_position(&mut *conn, request.board_id, request.position).await?;

    let column = columns::create_column(
        conn,
        NewColumn {
            title,
            position,
            board_id: request.board_id,
        },
    )
    .await?;

    events.emit("column.created", column.board_id, &column);
    tracing::info!(
        operation = "create_column",
        column_id = %column.id,
        board_id = %column.board_id,
        position = column.position,
        actor_id = %actor.id,
        "Column created"
    );

    Ok(column)
}

/// Columns of a board by ascending position.
pub async fn list_columns(conn: &mut DbConn, actor: &AuthenticatedUser, board_id: Uuid) -> Result<Vec<Column>> {
    access::board_access(&mut *conn, actor, board_id).await?;
    columns::list_columns_by_board(conn, board_id).await
}

pub async fn get_column(conn: &mut DbConn, actor: &AuthenticatedUser, column_id: Uuid) -> Result<Column> {
    Ok(access::column_access(conn, actor, column_id).await?.entity.column)
}

/// Renames and/or repositions a column. Siblings keep their positions.
pub async fn update_column(
    conn: &mut DbConn,
    events: &BoardEvents,
    actor: &AuthenticatedUser,
    column_id: Uuid,
    request: UpdateColumnRequest,
) -> Result<Column> {
    access::column_access(&mut *conn, actor, column_id).await?;

    let title = request
        .title
        .map(|title| validate_required_text(&title, "title", MAX_TITLE_LENGTH))
        .transpose()?;
    let position = request.position.map(validate_position).transpose()?;

    let column = columns::update_column(conn, column_id, UpdateColumnRequest { title, position }).await?;

    events.emit("column.updated", column.board_id, &column);
    tracing::info!(operation = "update_column", column_id = %column_id, actor_id = %actor.id, "Column updated");

    Ok(column)
}

/// Deletes a column and its cards.
pub async fn delete_column(
    conn: &mut DbConn,
    events: &BoardEvents,
    store: &dyn FileStore,
    actor: &AuthenticatedUser,
    column_id: Uuid,
) -> Result<()> {
    let column = access::column_access(&mut *conn, actor, column_id).await?.entity.column;

    let stored_names = attachments::list_stored_names_by_column(&mut *conn, column_id).await?;
    let deleted = columns::delete_column(conn, column_id).await?;
    if deleted == 0 {
        return Err(Error::NotFound(format!("Column {} not found", column_id)));
    }
    remove_files_best_effort(store, &stored_names).await;

    events.emit("column.deleted", column.board_id, &serde_json::json!({ "id": column_id }));
    tracing::info!(operation = "delete_column", column_id = %column_id, actor_id = %actor.id, "Column deleted");

    Ok(())
}
