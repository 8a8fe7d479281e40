use uuid::Uuid;

use crate::DbConn;
use crate::{
    auth::AuthenticatedUser,
    error::{Error, Result},
    models::{
        activity::ActivityDetails,
        comments::{CommentWithAuthor, NewComment},
        requests::CreateCommentRequest,
    },
    queries::{cards, comments},
    services::{access, activity, notifications},
    validation::{MAX_CONTENT_LENGTH, validate_required_text},
};

/// Posts a comment, then fans out MENTIONED and COMMENT_ADDED notifications.
pub async fn create_comment(
    conn: &mut DbConn,
    actor: &AuthenticatedUser,
    request: CreateCommentRequest,
) -> Result<CommentWithAuthor> {
    let scope = access::card_access(&mut *conn, actor, request.card_id).await?.entity;

    let content = validate_required_text(&request.content, "content", MAX_CONTENT_LENGTH)?;
    let mentions = notifications::parse_mentions(&content);

    let comment = comments::create_comment(
        &mut *conn,
        NewComment {
            content,
            card_id: scope.card.id,
            author_id: actor.id,
            mentions: mentions.clone(),
        },
    )
    .await?;

    activity::log_activity(&mut *conn, scope.card.id, actor.id, ActivityDetails::AddComment { comment_id: comment.id }).await?;
    let sent = notifications::notify_comment_added(&mut *conn, scope.workspace_id, &scope.card, &mentions, actor).await?;

    tracing::info!(
        operation = "create_comment",
        comment_id = %comment.id,
        card_id = %scope.card.id,
        mentions = mentions.len(),
        notifications = sent.len(),
        actor_id = %actor.id,
        "Comment created"
    );

    comments::get_comment_with_author(conn, comment.id)
        .await?
        .ok_or_else(|| Error::Internal("Created comment could not be reloaded".to_string()))
}

/// A card's comments, newest first.
pub async fn list_comments(conn: &mut DbConn, actor: &AuthenticatedUser, card_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
    access::card_access(&mut *conn, actor, card_id).await?;
    comments::list_comments_by_card(conn, card_id).await
}

/// Edits a comment. Only the author may edit; only newly mentioned users are notified.
pub async fn update_comment(
    conn: &mut DbConn,
    actor: &AuthenticatedUser,
    comment_id: Uuid,
    content: &str,
) -> Result<CommentWithAuthor> {
    let scope = access::comment_access(&mut *conn, actor, comment_id).await?.entity;
    if scope.comment.author_id != actor.id {
        return Err(Error::Forbidden("Only the author can edit this comment".to_string()));
    }

    let content = validate_required_text(content, "content", MAX_CONTENT_LENGTH)?;
    let mentions = notifications::parse_mentions(&content);
    let newly_mentioned: Vec<Uuid> = mentions
        .iter()
        .copied()
        .filter(|id| !scope.comment.mentions.contains(id))
        .collect();

    let comment = comments::update_comment(&mut *conn, comment_id, &content, &mentions).await?;
    activity::log_activity(&mut *conn, comment.card_id, actor.id, ActivityDetails::UpdateComment { comment_id }).await?;

    if !newly_mentioned.is_empty() {
        let card = cards::get_card_by_id_optional(&mut *conn, comment.card_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Card {} not found", comment.card_id)))?;
        notifications::notify_mentions(&mut *conn, scope.workspace_id, &card, &newly_mentioned, actor).await?;
    }

    tracing::info!(operation = "update_comment", comment_id = %comment_id, actor_id = %actor.id, "Comment updated");

    comments::get_comment_with_author(conn, comment_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Comment {} not found", comment_id)))
}

/// Deletes a comment. Only the author may delete.
pub async fn delete_comment(conn: &mut DbConn, actor: &AuthenticatedUser, comment_id: Uuid) -> Result<()> {
    let scope = access::comment_access(&mut *conn, actor, comment_id).await?.entity;
    if scope.comment.author_id != actor.id {
        return Err(Error::Forbidden("Only the author can delete this comment".to_string()));
    }

    let deleted = comments::delete_comment(&mut *conn, comment_id).await?;
    if deleted == 0 {
        return Err(Error::NotFound(format!("Comment {} not found", comment_id)));
    }
    activity::log_activity(conn, scope.comment.card_id, actor.id, ActivityDetails::DeleteComment { comment_id }).await?;

    tracing::info!(operation = "delete_comment", comment_id = %comment_id, actor_id = %actor.id, "Comment deleted");

    Ok(())
}
