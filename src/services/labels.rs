use uuid::Uuid;

use crate::DbConn;
use crate::{
    auth::AuthenticatedUser,
    error::{Error, Result},
    models::{
        activity::ActivityDetails,
        labels::{Label, LabelAssignment, NewLabel},
        requests::{CreateLabelRequest, UpdateLabelRequest},
    },
    queries::labels,
    services::{access, activity},
    validation::{MAX_NAME_LENGTH, validate_color, validate_required_text},
};

pub async fn create_label(conn: &mut DbConn, actor: &AuthenticatedUser, request: CreateLabelRequest) -> Result<Label> {
    access::board_access(&mut *conn, actor, request.board_id).await?;

    let name = validate_required_text(&request.name, "name", MAX_NAME_LENGTH)?;
    let color = validate_color(&request.color)?;

    let label = labels::create_label(
        conn,
        NewLabel {
            name,
            color,
            board_id: request.board_id,
        },
    )
    .await?;

    tracing::info!(operation = "create_label", label_id = %label.id, board_id = %label.board_id, actor_id = %actor.id, "Label created");

    Ok(label)
}

pub async fn list_labels(conn: &mut DbConn, actor: &AuthenticatedUser, board_id: Uuid) -> Result<Vec<Label>> {
    access::board_access(&mut *conn, actor, board_id).await?;
    labels::list_labels_by_board(conn, board_id).await
}

pub async fn get_label(conn: &mut DbConn, actor: &AuthenticatedUser, label_id: Uuid) -> Result<Label> {
    Ok(access::label_access(conn, actor, label_id).await?.entity.label)
}

pub async fn update_label(
    conn: &mut DbConn,
    actor: &AuthenticatedUser,
    label_id: Uuid,
    request: UpdateLabelRequest,
) -> Result<Label> {
    access::label_access(&mut *conn, actor, label_id).await?;

    let name = request
        .name
        .map(|name| validate_required_text(&name, "name", MAX_NAME_LENGTH))
        .transpose()?;
    let color = request.color.map(|color| validate_color(&color)).transpose()?;

    let label = labels::update_label(conn, label_id, UpdateLabelRequest { name, color }).await?;

    tracing::info!(operation = "update_label", label_id = %label_id, actor_id = %actor.id, "Label updated");

    Ok(label)
}

pub async fn delete_label(conn: &mut DbConn, actor: &AuthenticatedUser, label_id: Uuid) -> Result<()> {
    access::label_access(&mut *conn, actor, label_id).await?;
    labels::delete_label(conn, label_id).await?;

    tracing::info!(operation = "delete_label", label_id = %label_id, actor_id = %actor.id, "Label deleted");

    Ok(())
}

/// Resolves a card and a label of the same board, both accessible to the actor.
async fn card_and_label(
    conn: &mut DbConn,
    actor: &AuthenticatedUser,
    card_id: Uuid,
    label_id: Uuid,
) -> Result<Label> {
    let card = access::card_access(&mut *conn, actor, card_id).await?.entity;
    let label = access::label_access(&mut *conn, actor, label_id).await?.entity.label;
    if label.board_id != card.board_id {
        return Err(Error::BadRequest("Label belongs to a different board".to_string()));
    }
    Ok(label)
}

/// Applies a label to a card. Applying an already applied label is a no-op.
pub async fn add_label_to_card(
    conn: &mut DbConn,
    actor: &AuthenticatedUser,
    card_id: Uuid,
    label_id: Uuid,
) -> Result<LabelAssignment> {
    let label = card_and_label(&mut *conn, actor, card_id, label_id).await?;

    let added = labels::add_card_label(&mut *conn, card_id, label_id).await?;
    if !added {
        return Ok(LabelAssignment {
            label,
            added: false,
            message: "Label already added".to_string(),
        });
    }

    activity::log_activity(
        conn,
        card_id,
        actor.id,
        ActivityDetails::AddLabel {
            label_id,
            label_name: label.name.clone(),
        },
    )
    .await?;

    tracing::info!(operation = "add_label_to_card", card_id = %card_id, label_id = %label_id, actor_id = %actor.id, "Label added to card");

    Ok(LabelAssignment {
        label,
        added: true,
        message: "Label added".to_string(),
    })
}

pub async fn remove_label_from_card(
    conn: &mut DbConn,
    actor: &AuthenticatedUser,
    card_id: Uuid,
    label_id: Uuid,
) -> Result<()> {
    let label = card_and_label(&mut *conn, actor, card_id, label_id).await?;

    if !labels::remove_card_label(&mut *conn, card_id, label_id).await? {
        return Err(Error::NotFound("Label is not applied to this card".to_string()));
    }

    activity::log_activity(
        conn,
        card_id,
        actor.id,
        ActivityDetails::RemoveLabel {
            label_id,
            label_name: label.name,
        },
    )
    .await?;

    tracing::info!(operation = "remove_label_from_card", card_id = %card_id, label_id = %label_id, actor_id = %actor.id, "Label removed from card");

    Ok(())
}

pub async fn list_card_labels(conn: &mut DbConn, actor: &AuthenticatedUser, card_id: Uuid) -> Result<Vec<Label>> {
    access::card_access(&mut *conn, actor, card_id).await?;
    labels::list_labels_by_card(conn, card_id).await
}
