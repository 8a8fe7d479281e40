use std::collections::HashMap;

use uuid::Uuid;

use crate::DbConn;
use crate::{
    auth::AuthenticatedUser,
    error::{Error, Result},
    models::{
        boards::{Board, BoardDetails, ColumnWithCards, NewBoard},
        cards::Card,
        requests::{CreateBoardRequest, UpdateBoardRequest},
    },
    queries::{attachments, boards, cards, columns, labels, workspaces},
    services::{
        access,
        storage::{FileStore, remove_files_best_effort},
    },
    validation::{MAX_CONTENT_LENGTH, MAX_NAME_LENGTH, validate_optional_text, validate_required_text},
};

pub async fn create_board(conn: &mut DbConn, actor: &AuthenticatedUser, request: CreateBoardRequest) -> Result<Board> {
    workspaces::get_workspace_by_id(&mut *conn, request.workspace_id).await?;
    access::require_membership(&mut *conn, request.workspace_id, actor.id).await?;

    let name = validate_required_text(&request.name, "name", MAX_NAME_LENGTH)?;
    let description = validate_optional_text(request.description, "description", MAX_CONTENT_LENGTH)?;

    let board = boards::create_board(
        conn,
        NewBoard {
            name,
            description,
            workspace_id: request.workspace_id,
        },
    )
    .await?;

    tracing::info!(
        operation = "create_board",
        board_id = %board.id,
        workspace_id = %board.workspace_id,
        actor_id = %actor.id,
        "Board created"
    );

    Ok(board)
}

pub async fn list_boards(conn: &mut DbConn, actor: &AuthenticatedUser, workspace_id: Uuid) -> Result<Vec<Board>> {
    workspaces::get_workspace_by_id(&mut *conn, workspace_id).await?;
    access::require_membership(&mut *conn, workspace_id, actor.id).await?;
    boards::list_boards_by_workspace(conn, workspace_id).await
}

/// The board with its ordered columns, their visible cards and the board's labels.
pub async fn get_board(conn: &mut DbConn, actor: &AuthenticatedUser, board_id: Uuid) -> Result<BoardDetails> {
    let board = access::board_access(&mut *conn, actor, board_id).await?.entity;

    let board_columns = columns::list_columns_by_board(&mut *conn, board_id).await?;
    let mut cards_by_column: HashMap<Uuid, Vec<Card>> = HashMap::new();
    for card in cards::list_visible_cards_by_board(&mut *conn, board_id).await? {
        cards_by_column.entry(card.column_id).or_default().push(card);
    }
    let board_labels = labels::list_labels_by_board(conn, board_id).await?;

    let columns = board_columns
        .into_iter()
        .map(|column| {
            let cards = cards_by_column.remove(&column.id).unwrap_or_default();
            ColumnWithCards { column, cards }
        })
        .collect();

    Ok(BoardDetails {
        board,
        columns,
        labels: board_labels,
    })
}

pub async fn update_board(
    conn: &mut DbConn,
    actor: &AuthenticatedUser,
    board_id: Uuid,
    request: UpdateBoardRequest,
) -> Result<Board> {
    access::board_access(&mut *conn, actor, board_id).await?;

    let name = request
        .name
        .map(|name| validate_required_text(&name, "name", MAX_NAME_LENGTH))
        .transpose()?;
    let description = validate_optional_text(request.description, "description", MAX_CONTENT_LENGTH)?;

    let board = boards::update_board(conn, board_id, UpdateBoardRequest { name, description }).await?;

    tracing::info!(operation = "update_board", board_id = %board_id, actor_id = %actor.id, "Board updated");

    Ok(board)
}

/// Deletes a board; columns, cards and labels cascade.
pub async fn delete_board(
    conn: &mut DbConn,
    store: &dyn FileStore,
    actor: &AuthenticatedUser,
    board_id: Uuid,
) -> Result<()> {
    access::board_access(&mut *conn, actor, board_id).await?;

    let stored_names = attachments::list_stored_names_by_board(&mut *conn, board_id).await?;
    let deleted = boards::delete_board(conn, board_id).await?;
    if deleted == 0 {
        return Err(Error::NotFound(format!("Board {} not found", board_id)));
    }
    remove_files_best_effort(store, &stored_names).await;

    tracing::info!(operation = "delete_board", board_id = %board_id, actor_id = %actor.id, "Board deleted");

    Ok(())
}
