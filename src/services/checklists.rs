use uuid::Uuid;

use crate::DbConn;
use crate::{
    auth::AuthenticatedUser,
    error::{Error, Result},
    models::{
        activity::ActivityDetails,
        checklists::{ChecklistItem, NewChecklistItem},
        requests::CreateChecklistItemRequest,
    },
    queries::checklists,
    services::{access, activity, ordering},
    validation::{MAX_TITLE_LENGTH, validate_required_text},
};

/// Loads a checklist item and checks access through its card.
async fn item_access(conn: &mut DbConn, actor: &AuthenticatedUser, item_id: Uuid) -> Result<ChecklistItem> {
    let item = checklists::get_item_optional(&mut *conn, item_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Checklist item {} not found", item_id)))?;
    access::card_access(conn, actor, item.card_id).await?;
    Ok(item)
}

pub async fn create_item(
    conn: &mut DbConn,
    actor: &AuthenticatedUser,
    request: CreateChecklistItemRequest,
) -> Result<ChecklistItem> {
    access::card_access(&mut *conn, actor, request.card_id).await?;

    let content = validate_required_text(&request.content, "content", MAX_TITLE_LENGTH)?;
    let position = ordering::checklist_position(&mut *conn, request.card_id).await?;

    let item = checklists::create_item(
        &mut *conn,
        NewChecklistItem {
            card_id: request.card_id,
            content,
            position,
        },
    )
    .await?;

    activity::log_activity(
        conn,
        item.card_id,
        actor.id,
        ActivityDetails::AddChecklistItem {
            item_id: item.id,
            content: item.content.clone(),
        },
    )
    .await?;

    tracing::info!(operation = "create_checklist_item", item_id = %item.id, card_id = %item.card_id, actor_id = %actor.id, "Checklist item created");

    Ok(item)
}

pub async fn list_items(conn: &mut DbConn, actor: &AuthenticatedUser, card_id: Uuid) -> Result<Vec<ChecklistItem>> {
    access::card_access(&mut *conn, actor, card_id).await?;
    checklists::list_items_by_card(conn, card_id).await
}

pub async fn update_item_content(
    conn: &mut DbConn,
    actor: &AuthenticatedUser,
    item_id: Uuid,
    content: &str,
) -> Result<ChecklistItem> {
    item_access(&mut *conn, actor, item_id).await?;
    let content = validate_required_text(content, "content", MAX_TITLE_LENGTH)?;
    let item = checklists::update_item_content(conn, item_id, &content).await?;

    tracing::info!(operation = "update_checklist_item", item_id = %item_id, actor_id = %actor.id, "Checklist item updated");

    Ok(item)
}

pub async fn toggle_item(conn: &mut DbConn, actor: &AuthenticatedUser, item_id: Uuid) -> Result<ChecklistItem> {
    let item = item_access(&mut *conn, actor, item_id).await?;
    let item = checklists::set_item_completed(&mut *conn, item_id, !item.is_completed).await?;

    activity::log_activity(
        conn,
        item.card_id,
        actor.id,
        ActivityDetails::ToggleChecklistItem {
            item_id,
            is_completed: item.is_completed,
        },
    )
    .await?;

    Ok(item)
}

pub async fn delete_item(conn: &mut DbConn, actor: &AuthenticatedUser, item_id: Uuid) -> Result<()> {
    let item = item_access(&mut *conn, actor, item_id).await?;
    checklists::delete_item(&mut *conn, item_id).await?;

    activity::log_activity(conn, item.card_id, actor.id, ActivityDetails::RemoveChecklistItem { item_id }).await?;

    tracing::info!(operation = "delete_checklist_item", item_id = %item_id, actor_id = %actor.id, "Checklist item deleted");

    Ok(())
}
