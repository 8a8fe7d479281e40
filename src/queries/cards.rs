use crate::{
    error::{Error, Result},
    models::cards::{Card, CardScope, DueCard, NewCard},
};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use crate::DbConn;

const CARD_FIELDS: &str = "id, title, description, position, column_id, assignee_id, creator_id, \
     due_date, labels, is_completed, is_archived, created_at, updated_at";

const CARD_COLUMNS: &str = "c.id, c.title, c.description, c.position, c.column_id, c.assignee_id, \
     c.creator_id, c.due_date, c.labels, c.is_completed, c.is_archived, c.created_at, c.updated_at";

/// Inserts a card. The caller has already resolved its position.
pub async fn create_card(conn: &mut DbConn, new_card: NewCard) -> Result<Card> {
    let query = format!(
        r#"
        INSERT INTO cards (id, title, description, position, column_id, assignee_id, creator_id,
                           due_date, labels, is_completed, is_archived, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0, 0, $10, $10)
        RETURNING {CARD_FIELDS}
        "#
    );
    let card = sqlx::query_as::<_, Card>(&query)
        .bind(Uuid::now_v7())
        .bind(&new_card.title)
        .bind(&new_card.description)
        .bind(new_card.position)
        .bind(new_card.column_id)
        .bind(new_card.assignee_id)
        .bind(new_card.creator_id)
        .bind(new_card.due_date)
        .bind(Json(&new_card.labels))
        .bind(Utc::now())
        .fetch_one(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(card)
}

pub async fn get_card_by_id_optional(conn: &mut DbConn, id: Uuid) -> Result<Option<Card>> {
    let query = format!("SELECT {CARD_COLUMNS} FROM cards c WHERE c.id = $1");
    let card = sqlx::query_as::<_, Card>(&query)
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(card)
}

/// Loads a card joined up through its column and board to the workspace.
pub async fn get_card_scope(conn: &mut DbConn, id: Uuid) -> Result<Option<CardScope>> {
    let query = format!(
        r#"
        SELECT {CARD_COLUMNS}, col.board_id, b.workspace_id
        FROM cards c
        JOIN board_columns col ON col.id = c.column_id
        JOIN boards b ON b.id = col.board_id
        WHERE c.id = $1
        "#
    );
    let scope = sqlx::query_as::<_, CardScope>(&query)
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(scope)
}

/// Lists the non-archived cards of a column by ascending position.
pub async fn list_cards_by_column(conn: &mut DbConn, column_id: Uuid) -> Result<Vec<Card>> {
    let query = format!(
        r#"
        SELECT {CARD_COLUMNS}
        FROM cards c
        WHERE c.column_id = $1 AND c.is_archived = 0
        ORDER BY c.position ASC, c.id ASC
        "#
    );
    let cards = sqlx::query_as::<_, Card>(&query)
        .bind(column_id)
        .fetch_all(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(cards)
}

/// Lists the non-archived cards of every column of a board, ordered by position within each column.
pub async fn list_visible_cards_by_board(conn: &mut DbConn, board_id: Uuid) -> Result<Vec<Card>> {
    let query = format!(
        r#"
        SELECT {CARD_COLUMNS}
        FROM cards c
        JOIN board_columns col ON col.id = c.column_id
        WHERE col.board_id = $1 AND c.is_archived = 0
        ORDER BY c.position ASC, c.id ASC
        "#
    );
    let cards = sqlx::query_as::<_, Card>(&query)
        .bind(board_id)
        .fetch_all(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(cards)
}

/// Lists the archived cards of a board, most recently created first.
pub async fn list_archived_cards_by_board(conn: &mut DbConn, board_id: Uuid) -> Result<Vec<Card>> {
    let query = format!(
        r#"
        SELECT {CARD_COLUMNS}
        FROM cards c
        JOIN board_columns col ON col.id = c.column_id
        WHERE col.board_id = $1 AND c.is_archived = 1
        ORDER BY c.id DESC
        "#
    );
    let cards = sqlx::query_as::<_, Card>(&query)
        .bind(board_id)
        .fetch_all(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(cards)
}

/// Highest position among a column's cards, archived ones included.
pub async fn max_card_position(conn: &mut DbConn, column_id: Uuid) -> Result<Option<i64>> {
    let max = sqlx::query_scalar::<_, Option<i64>>(
        "SELECT MAX(position) FROM cards WHERE column_id = $1",
    )
    .bind(column_id)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(max)
}

/// Writes back every mutable field of a card.
pub async fn update_card(conn: &mut DbConn, card: &Card) -> Result<Card> {
    let query = format!(
        r#"
        UPDATE cards
        SET title = $1,
            description = $2,
            position = $3,
            column_id = $4,
            assignee_id = $5,
            due_date = $6,
            labels = $7,
            is_completed = $8,
            is_archived = $9,
            updated_at = $10
        WHERE id = $11
        RETURNING {CARD_FIELDS}
        "#
    );
    let updated = sqlx::query_as::<_, Card>(&query)
        .bind(&card.title)
        .bind(&card.description)
        .bind(card.position)
        .bind(card.column_id)
        .bind(card.assignee_id)
        .bind(card.due_date)
        .bind(Json(&card.labels))
        .bind(card.is_completed)
        .bind(card.is_archived)
        .bind(Utc::now())
        .bind(card.id)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?
        .ok_or_else(|| Error::NotFound(format!("Card {} not found", card.id)))?;

    Ok(updated)
}

/// Deletes a card; comments, attachments, checklist items and activity cascade.
pub async fn delete_card(conn: &mut DbConn, id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query("DELETE FROM cards WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await
        .map_err(Error::Sqlx)?
        .rows_affected();

    Ok(rows_affected)
}

/// Open, assigned cards due in `(after, until]`, soonest first.
pub async fn list_cards_due_between(
    conn: &mut DbConn,
    after: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Result<Vec<DueCard>> {
    let cards = sqlx::query_as::<_, DueCard>(
        r#"
        SELECT id, title, assignee_id, due_date
        FROM cards
        WHERE due_date > $1
          AND due_date <= $2
          AND assignee_id IS NOT NULL
          AND is_completed = 0
          AND is_archived = 0
        ORDER BY due_date
        "#,
    )
    .bind(after)
    .bind(until)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(cards)
}

pub async fn count_comments(conn: &mut DbConn, card_id: Uuid) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE card_id = $1")
        .bind(card_id)
        .fetch_one(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(count)
}

pub async fn count_attachments(conn: &mut DbConn, card_id: Uuid) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attachments WHERE card_id = $1")
        .bind(card_id)
        .fetch_one(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(count)
}
