use crate::{
    error::{Error, Result},
    models::checklists::{ChecklistItem, NewChecklistItem},
};
use chrono::Utc;
use uuid::Uuid;

use crate::DbConn;

const ITEM_FIELDS: &str = "id, card_id, content, is_completed, position, created_at, updated_at";

pub async fn create_item(conn: &mut DbConn, new_item: NewChecklistItem) -> Result<ChecklistItem> {
    let query = format!(
        r#"
        INSERT INTO checklist_items (id, card_id, content, is_completed, position, created_at, updated_at)
        VALUES ($1, $2, $3, 0, $4, $5, $5)
        RETURNING {ITEM_FIELDS}
        "#
    );
    let item = sqlx::query_as::<_, ChecklistItem>(&query)
        .bind(Uuid::now_v7())
        .bind(new_item.card_id)
        .bind(&new_item.content)
        .bind(new_item.position)
        .bind(Utc::now())
        .fetch_one(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(item)
}

pub async fn get_item_optional(conn: &mut DbConn, id: Uuid) -> Result<Option<ChecklistItem>> {
    let query = format!("SELECT {ITEM_FIELDS} FROM checklist_items WHERE id = $1");
    let item = sqlx::query_as::<_, ChecklistItem>(&query)
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(item)
}

pub async fn list_items_by_card(conn: &mut DbConn, card_id: Uuid) -> Result<Vec<ChecklistItem>> {
    let query = format!(
        "SELECT {ITEM_FIELDS} FROM checklist_items WHERE card_id = $1 ORDER BY position ASC, id ASC"
    );
    let items = sqlx::query_as::<_, ChecklistItem>(&query)
        .bind(card_id)
        .fetch_all(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(items)
}

pub async fn max_item_position(conn: &mut DbConn, card_id: Uuid) -> Result<Option<i64>> {
    let max = sqlx::query_scalar::<_, Option<i64>>(
        "SELECT MAX(position) FROM checklist_items WHERE card_id = $1",
    )
    .bind(card_id)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(max)
}

pub async fn update_item_content(conn: &mut DbConn, id: Uuid, content: &str) -> Result<ChecklistItem> {
    let query = format!(
        r#"
        UPDATE checklist_items
        SET content = $1, updated_at = $2
        WHERE id = $3
        RETURNING {ITEM_FIELDS}
        "#
    );
    let item = sqlx::query_as::<_, ChecklistItem>(&query)
        .bind(content)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?
        .ok_or_else(|| Error::NotFound(format!("Checklist item {} not found", id)))?;

    Ok(item)
}

pub async fn set_item_completed(conn: &mut DbConn, id: Uuid, is_completed: bool) -> Result<ChecklistItem> {
    let query = format!(
        r#"
        UPDATE checklist_items
        SET is_completed = $1, updated_at = $2
        WHERE id = $3
        RETURNING {ITEM_FIELDS}
        "#
    );
    let item = sqlx::query_as::<_, ChecklistItem>(&query)
        .bind(is_completed)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?
        .ok_or_else(|| Error::NotFound(format!("Checklist item {} not found", id)))?;

    Ok(item)
}

pub async fn delete_item(conn: &mut DbConn, id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query("DELETE FROM checklist_items WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await
        .map_err(Error::Sqlx)?
        .rows_affected();

    Ok(rows_affected)
}
