use crate::{
    error::{Error, Result},
    models::labels::{Label, LabelScope, NewLabel},
    models::requests::UpdateLabelRequest,
};
use chrono::Utc;
use uuid::Uuid;

use crate::DbConn;

pub async fn create_label(conn: &mut DbConn, new_label: NewLabel) -> Result<Label> {
    let label = sqlx::query_as::<_, Label>(
        r#"
        INSERT INTO labels (id, name, color, board_id, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, color, board_id, created_at
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(&new_label.name)
    .bind(&new_label.color)
    .bind(new_label.board_id)
    .bind(Utc::now())
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(label)
}

pub async fn get_label_scope(conn: &mut DbConn, id: Uuid) -> Result<Option<LabelScope>> {
    let scope = sqlx::query_as::<_, LabelScope>(
        r#"
        SELECT l.id, l.name, l.color, l.board_id, l.created_at, b.workspace_id
        FROM labels l
        JOIN boards b ON b.id = l.board_id
        WHERE l.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(scope)
}

/// Lists a board's labels in creation order.
pub async fn list_labels_by_board(conn: &mut DbConn, board_id: Uuid) -> Result<Vec<Label>> {
    let labels = sqlx::query_as::<_, Label>(
        r#"
        SELECT id, name, color, board_id, created_at
        FROM labels
        WHERE board_id = $1
        ORDER BY id ASC
        "#,
    )
    .bind(board_id)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(labels)
}

pub async fn update_label(conn: &mut DbConn, id: Uuid, update: UpdateLabelRequest) -> Result<Label> {
    let label = sqlx::query_as::<_, Label>(
        r#"
        UPDATE labels
        SET name = COALESCE($1, name),
            color = COALESCE($2, color)
        WHERE id = $3
        RETURNING id, name, color, board_id, created_at
        "#,
    )
    .bind(update.name)
    .bind(update.color)
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?
    .ok_or_else(|| Error::NotFound(format!("Label {} not found", id)))?;

    Ok(label)
}

pub async fn delete_label(conn: &mut DbConn, id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query("DELETE FROM labels WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await
        .map_err(Error::Sqlx)?
        .rows_affected();

    Ok(rows_affected)
}

/// Attaches a label to a card. Returns `false` when the pair already existed.
pub async fn add_card_label(conn: &mut DbConn, card_id: Uuid, label_id: Uuid) -> Result<bool> {
    let rows_affected = sqlx::query(
        r#"
        INSERT INTO card_labels (card_id, label_id, created_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (card_id, label_id) DO NOTHING
        "#,
    )
    .bind(card_id)
    .bind(label_id)
    .bind(Utc::now())
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    Ok(rows_affected > 0)
}

/// Detaches a label from a card. Returns `false` when it was not attached.
pub async fn remove_card_label(conn: &mut DbConn, card_id: Uuid, label_id: Uuid) -> Result<bool> {
    let rows_affected = sqlx::query("DELETE FROM card_labels WHERE card_id = $1 AND label_id = $2")
        .bind(card_id)
        .bind(label_id)
        .execute(conn)
        .await
        .map_err(Error::Sqlx)?
        .rows_affected();

    Ok(rows_affected > 0)
}

/// Labels attached to a card, in the order they were attached.
pub async fn list_labels_by_card(conn: &mut DbConn, card_id: Uuid) -> Result<Vec<Label>> {
    let labels = sqlx::query_as::<_, Label>(
        r#"
        SELECT l.id, l.name, l.color, l.board_id, l.created_at
        FROM card_labels cl
        JOIN labels l ON l.id = cl.label_id
        WHERE cl.card_id = $1
        ORDER BY cl.rowid ASC
        "#,
    )
    .bind(card_id)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(labels)
}

/// Copies every label of `source_card_id` onto `target_card_id`.
pub async fn copy_card_labels(conn: &mut DbConn, source_card_id: Uuid, target_card_id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query(
        r#"
        INSERT INTO card_labels (card_id, label_id, created_at)
        SELECT $1, label_id, $2 FROM card_labels WHERE card_id = $3
        ON CONFLICT (card_id, label_id) DO NOTHING
        "#,
    )
    .bind(target_card_id)
    .bind(Utc::now())
    .bind(source_card_id)
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    Ok(rows_affected)
}
