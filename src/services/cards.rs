//! Card lifecycle. Every mutation records its typed activity and emits a
//! `card.*` realtime event to the card's board.

use uuid::Uuid;

use crate::DbConn;
use crate::{
    auth::AuthenticatedUser,
    error::{Error, Result},
    models::{
        activity::ActivityDetails,
        cards::{Card, CardDetails, NewCard},
        requests::{CreateCardRequest, MoveCardRequest, UpdateCardRequest},
    },
    queries::{attachments, cards, labels, users, workspace_members},
    realtime::BoardEvents,
    services::{
        access, activity, notifications, ordering,
        storage::{FileStore, remove_files_best_effort},
    },
    validation::{MAX_CONTENT_LENGTH, MAX_NAME_LENGTH, MAX_TITLE_LENGTH, validate_optional_text, validate_position, validate_required_text},
};

/// Trims, drops blanks and removes duplicates, keeping first occurrences.
fn normalize_labels(labels: Vec<String>) -> Result<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let label = label.trim();
        if label.is_empty() || normalized.iter().any(|existing| existing == label) {
            continue;
        }
        if label.chars().count() > MAX_NAME_LENGTH {
            return Err(Error::validation("labels", format!("Labels must be at most {} characters", MAX_NAME_LENGTH)));
        }
        normalized.push(label.to_string());
    }
    Ok(normalized)
}

async fn require_assignable(conn: &mut DbConn, workspace_id: Uuid, assignee_id: Uuid) -> Result<()> {
    if !workspace_members::is_workspace_member(conn, workspace_id, assignee_id).await? {
        return Err(Error::validation("assignee_id", "Assignee must be a member of this workspace"));
    }
    Ok(())
}

pub async fn create_card(
    conn: &mut DbConn,
    events: &BoardEvents,
    actor: &AuthenticatedUser,
    request: CreateCardRequest,
) -> Result<Card> {
    let column = access::column_access(&mut *conn, actor, request.column_id).await?.entity;

    let title = validate_required_text(&request.title, "title", MAX_TITLE_LENGTH)?;
    let description = validate_optional_text(request.description, "description", MAX_CONTENT_LENGTH)?;
    let labels = normalize_labels(request.labels)?;
    if let Some(assignee_id) = request.assignee_id {
        require_assignable(&mut *conn, column.workspace_id, assignee_id).await?;
    }
    let position = ordering::card_position(&mut *conn, column.column.id, request.position).await?;

    let card = cards::create_card(
        &mut *conn,
        NewCard {
            title,
            description,
            position,
            column_id: column.column.id,
            assignee_id: request.assignee_id,
            creator_id: actor.id,
            due_date: request.due_date,
            labels,
        },
    )
    .await?;

    activity::log_activity(
        &mut *conn,
        card.id,
        actor.id,
        ActivityDetails::CreateCard {
            title: card.title.clone(),
            column_id: card.column_id,
        },
    )
    .await?;

    if let Some(assignee_id) = card.assignee_id {
        notifications::notify_assignment(conn, &card, assignee_id, actor).await?;
    }

    events.emit("card.created", column.column.board_id, &card);
    tracing::info!(
        operation = "create_card",
        card_id = %card.id,
        column_id = %card.column_id,
        position = card.position,
        actor_id = %actor.id,
        "Card created"
    );

    Ok(card)
}

/// Card with creator, assignee, relational labels and comment/attachment counts.
pub async fn get_card(conn: &mut DbConn, actor: &AuthenticatedUser, card_id: Uuid) -> Result<CardDetails> {
    let scope = access::card_access(&mut *conn, actor, card_id).await?.entity;
    let card = scope.card;

    let creator = users::get_user_summary(&mut *conn, card.creator_id).await?;
    let assignee = match card.assignee_id {
        Some(assignee_id) => users::get_user_summary(&mut *conn, assignee_id).await?,
        None => None,
    };
    let card_labels = labels::list_labels_by_card(&mut *conn, card_id).await?;
    let comment_count = cards::count_comments(&mut *conn, card_id).await?;
    let attachment_count = cards::count_attachments(conn, card_id).await?;

    Ok(CardDetails {
        card,
        board_id: scope.board_id,
        creator,
        assignee,
        card_labels,
        comment_count,
        attachment_count,
    })
}

/// Non-archived cards of a column by ascending position.
pub async fn list_cards(conn: &mut DbConn, actor: &AuthenticatedUser, column_id: Uuid) -> Result<Vec<Card>> {
    access::column_access(&mut *conn, actor, column_id).await?;
    cards::list_cards_by_column(conn, column_id).await
}

pub async fn list_archived_cards(conn: &mut DbConn, actor: &AuthenticatedUser, board_id: Uuid) -> Result<Vec<Card>> {
    access::board_access(&mut *conn, actor, board_id).await?;
    cards::list_archived_cards_by_board(conn, board_id).await
}

/// Applies a partial update and logs one activity entry per changed field.
pub async fn update_card(
    conn: &mut DbConn,
    events: &BoardEvents,
    actor: &AuthenticatedUser,
    card_id: Uuid,
    request: UpdateCardRequest,
) -> Result<Card> {
    let scope = access::card_access(&mut *conn, actor, card_id).await?.entity;
    let mut card = scope.card.clone();
    let mut changes: Vec<ActivityDetails> = Vec::new();
    let mut newly_assigned = None;

    if let Some(title) = request.title {
        let title = validate_required_text(&title, "title", MAX_TITLE_LENGTH)?;
        if title != card.title {
            changes.push(ActivityDetails::UpdateTitle {
                old_title: card.title.clone(),
                new_title: title.clone(),
            });
            card.title = title;
        }
    }

    if let Some(description) = request.description {
        let description = validate_optional_text(description, "description", MAX_CONTENT_LENGTH)?;
        if description != card.description {
            changes.push(ActivityDetails::UpdateDescription {});
            card.description = description;
        }
    }

    if let Some(assignee_id) = request.assignee_id
        && assignee_id != card.assignee_id
    {
        match (assignee_id, card.assignee_id) {
            (Some(new_assignee), _) => {
                require_assignable(&mut *conn, scope.workspace_id, new_assignee).await?;
                changes.push(ActivityDetails::AssignUser { assignee_id: new_assignee });
                newly_assigned = Some(new_assignee);
            }
            (None, Some(previous)) => {
                changes.push(ActivityDetails::UnassignUser { previous_assignee_id: previous });
            }
            (None, None) => {}
        }
        card.assignee_id = assignee_id;
    }

    if let Some(due_date) = request.due_date
        && due_date != card.due_date
    {
        match due_date {
            Some(due_date) => changes.push(ActivityDetails::SetDueDate { due_date }),
            None => changes.push(ActivityDetails::RemoveDueDate {}),
        }
        card.due_date = due_date;
    }

    if let Some(labels) = request.labels {
        let labels = normalize_labels(labels)?;
        if labels != card.labels {
            changes.push(ActivityDetails::UpdateLabels { labels: labels.clone() });
            card.labels = labels;
        }
    }

    if let Some(is_completed) = request.is_completed
        && is_completed != card.is_completed
    {
        changes.push(if is_completed {
            ActivityDetails::CompleteCard {}
        } else {
            ActivityDetails::ReopenCard {}
        });
        card.is_completed = is_completed;
    }

    if changes.is_empty() {
        return Ok(scope.card);
    }

    let card = cards::update_card(&mut *conn, &card).await?;

    for details in changes {
        activity::log_activity(&mut *conn, card.id, actor.id, details).await?;
    }
    if let Some(assignee_id) = newly_assigned {
        notifications::notify_assignment(conn, &card, assignee_id, actor).await?;
    }

    events.emit("card.updated", scope.board_id, &card);
    tracing::info!(operation = "update_card", card_id = %card_id, actor_id = %actor.id, "Card updated");

    Ok(card)
}

/// Hard-deletes a card and everything it owns.
pub async fn delete_card(
    conn: &mut DbConn,
    events: &BoardEvents,
    store: &dyn FileStore,
    actor: &AuthenticatedUser,
    card_id: Uuid,
) -> Result<()> {
    let scope = access::card_access(&mut *conn, actor, card_id).await?.entity;

    let stored_names = attachments::list_stored_names_by_card(&mut *conn, card_id).await?;
    let deleted = cards::delete_card(conn, card_id).await?;
    if deleted == 0 {
        return Err(Error::NotFound(format!("Card {} not found", card_id)));
    }
    remove_files_best_effort(store, &stored_names).await;

    events.emit(
        "card.deleted",
        scope.board_id,
        &serde_json::json!({ "id": card_id, "column_id": scope.card.column_id }),
    );
    tracing::info!(operation = "delete_card", card_id = %card_id, actor_id = %actor.id, "Card deleted");

    Ok(())
}

/// Places a card at an explicit column and position on the same board.
/// Sibling positions are left untouched.
pub async fn move_card(
    conn: &mut DbConn,
    events: &BoardEvents,
    actor: &AuthenticatedUser,
    card_id: Uuid,
    request: MoveCardRequest,
) -> Result<Card> {
    let scope = access::card_access(&mut *conn, actor, card_id).await?.entity;
    let target = access::column_access(&mut *conn, actor, request.column_id).await?.entity;

    if target.column.board_id != scope.board_id {
        return Err(Error::BadRequest("Cards can only be moved within their board".to_string()));
    }
    let position = validate_position(request.position)?;

    let from_column_id = scope.card.column_id;
    let mut card = scope.card;
    card.column_id = target.column.id;
    card.position = position;
    let card = cards::update_card(&mut *conn, &card).await?;

    activity::log_activity(
        &mut *conn,
        card.id,
        actor.id,
        ActivityDetails::MoveCard {
            from_column_id,
            to_column_id: card.column_id,
            position,
        },
    )
    .await?;

    if from_column_id != card.column_id {
        notifications::notify_card_moved(conn, &card, &target.column.title, actor).await?;
    }

    events.emit(
        "card.moved",
        scope.board_id,
        &serde_json::json!({
            "card": &card,
            "from_column_id": from_column_id,
            "to_column_id": card.column_id,
        }),
    );
    tracing::info!(
        operation = "move_card",
        card_id = %card_id,
        from_column_id = %from_column_id,
        to_column_id = %card.column_id,
        position,
        actor_id = %actor.id,
        "Card moved"
    );

    Ok(card)
}

async fn set_archived(
    conn: &mut DbConn,
    events: &BoardEvents,
    actor: &AuthenticatedUser,
    card_id: Uuid,
    is_archived: bool,
) -> Result<Card> {
    let scope = access::card_access(&mut *conn, actor, card_id).await?.entity;
    if scope.card.is_archived == is_archived {
        return Ok(scope.card);
    }

    let mut card = scope.card;
    card.is_archived = is_archived;
    let card = cards::update_card(&mut *conn, &card).await?;

    let details = if is_archived {
        ActivityDetails::ArchiveCard {}
    } else {
        ActivityDetails::UnarchiveCard {}
    };
    activity::log_activity(conn, card.id, actor.id, details).await?;

    events.emit("card.updated", scope.board_id, &card);
    tracing::info!(operation = "set_archived", card_id = %card_id, is_archived, actor_id = %actor.id, "Card archive flag changed");

    Ok(card)
}

/// Hides a card from its column. It stays listed among the board's archived cards.
pub async fn archive_card(conn: &mut DbConn, events: &BoardEvents, actor: &AuthenticatedUser, card_id: Uuid) -> Result<Card> {
    set_archived(conn, events, actor, card_id, true).await
}

pub async fn unarchive_card(conn: &mut DbConn, events: &BoardEvents, actor: &AuthenticatedUser, card_id: Uuid) -> Result<Card> {
    set_archived(conn, events, actor, card_id, false).await
}

pub async fn toggle_completed(
    conn: &mut DbConn,
    events: &BoardEvents,
    actor: &AuthenticatedUser,
    card_id: Uuid,
) -> Result<Card> {
    let scope = access::card_access(&mut *conn, actor, card_id).await?.entity;

    let mut card = scope.card;
    card.is_completed = !card.is_completed;
    let card = cards::update_card(&mut *conn, &card).await?;

    let details = if card.is_completed {
        ActivityDetails::CompleteCard {}
    } else {
        ActivityDetails::ReopenCard {}
    };
    activity::log_activity(conn, card.id, actor.id, details).await?;

    events.emit("card.updated", scope.board_id, &card);
    tracing::info!(
        operation = "toggle_completed",
        card_id = %card_id,
        is_completed = card.is_completed,
        actor_id = %actor.id,
        "Card completion toggled"
    );

    Ok(card)
}

/// Duplicates title, description and labels into a new card appended to the
/// same column. Comments, attachments, checklist items, assignee and due date
/// are not copied.
pub async fn copy_card(conn: &mut DbConn, events: &BoardEvents, actor: &AuthenticatedUser, card_id: Uuid) -> Result<Card> {
    let scope = access::card_access(&mut *conn, actor, card_id).await?.entity;
    let source = scope.card;

    let position = ordering::card_position(&mut *conn, source.column_id, None).await?;
    let copy = cards::create_card(
        &mut *conn,
        NewCard {
            title: source.title.clone(),
            description: source.description.clone(),
            position,
            column_id: source.column_id,
            assignee_id: None,
            creator_id: actor.id,
            due_date: None,
            labels: source.labels.clone(),
        },
    )
    .await?;
    labels::copy_card_labels(&mut *conn, source.id, copy.id).await?;

    activity::log_activity(conn, copy.id, actor.id, ActivityDetails::CopyCard { source_card_id: source.id }).await?;

    events.emit("card.created", scope.board_id, &copy);
    tracing::info!(
        operation = "copy_card",
        card_id = %copy.id,
        source_card_id = %source.id,
        actor_id = %actor.id,
        "Card copied"
    );

    Ok(copy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_labels() {
        let labels = vec![" bug ".to_string(), "".to_string(), "ui".to_string(), "bug".to_string()];
        assert_eq!(normalize_labels(labels).unwrap(), vec!["bug".to_string(), "ui".to_string()]);
    }

    #[test]
    fn test_normalize_labels_rejects_long_label() {
        assert!(normalize_labels(vec!["x".repeat(MAX_NAME_LENGTH + 1)]).is_err());
    }
}
