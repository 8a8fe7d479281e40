mod common;

use common::{TestDb, add_member, create_test_user, setup_board};
use taskboard::{
    Error,
    models::{
        activity::ActivityType,
        notifications::NotificationType,
        requests::{CreateCardRequest, CreateCommentRequest},
        workspace_members::WorkspaceRole,
    },
    realtime::BoardEvents,
    services::{activity, cards, comments, notifications},
};

fn comment(card_id: uuid::Uuid, content: String) -> CreateCommentRequest {
    CreateCommentRequest { card_id, content }
}

#[tokio::test]
async fn test_comment_fans_out_mentions_and_assignee() {
    let test_db = TestDb::new("test_comment_fans_out").await;
    let mut conn = test_db.get_connection().await;
    let events = BoardEvents::default();

    let author = create_test_user(&mut conn, test_db.test_prefix(), "Author").await;
    let mentioned = create_test_user(&mut conn, test_db.test_prefix(), "Mentioned").await;
    let assignee = create_test_user(&mut conn, test_db.test_prefix(), "Assignee").await;
    let fixture = setup_board(&mut conn, &events, &author).await;
    add_member(&mut conn, fixture.workspace_id, &author, &mentioned, WorkspaceRole::Member).await;
    add_member(&mut conn, fixture.workspace_id, &author, &assignee, WorkspaceRole::Member).await;

    let card = cards::create_card(
        &mut conn,
        &events,
        &author,
        CreateCardRequest {
            column_id: fixture.column_id,
            title: "Review".to_string(),
            assignee_id: Some(assignee.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    notifications::mark_all_as_read(&mut conn, &mentioned).await.unwrap();
    notifications::mark_all_as_read(&mut conn, &assignee).await.unwrap();

    let posted = comments::create_comment(&mut conn, &author, comment(card.id, format!("@{} check this", mentioned.id)))
        .await
        .unwrap();
    assert_eq!(posted.comment.mentions, vec![mentioned.id]);
    assert_eq!(posted.author.id, author.id);

    let mentioned_inbox = notifications::get_user_notifications(&mut conn, &mentioned, true, 50).await.unwrap();
    assert_eq!(mentioned_inbox.len(), 1);
    assert_eq!(mentioned_inbox[0].notification.notification_type, NotificationType::Mentioned);
    assert_eq!(mentioned_inbox[0].notification.card_id, Some(card.id));

    let assignee_inbox = notifications::get_user_notifications(&mut conn, &assignee, true, 50).await.unwrap();
    assert_eq!(assignee_inbox.len(), 1);
    assert_eq!(assignee_inbox[0].notification.notification_type, NotificationType::CommentAdded);

    assert_eq!(notifications::get_unread_count(&mut conn, &author).await.unwrap(), 0);

    let history = activity::get_card_activities(&mut conn, &author, card.id).await.unwrap();
    assert_eq!(history[0].entry.action_type, ActivityType::AddComment);
}

#[tokio::test]
async fn test_mentioned_assignee_gets_single_notification() {
    let test_db = TestDb::new("test_mentioned_assignee").await;
    let mut conn = test_db.get_connection().await;
    let events = BoardEvents::default();

    let author = create_test_user(&mut conn, test_db.test_prefix(), "Author").await;
    let assignee = create_test_user(&mut conn, test_db.test_prefix(), "Assignee").await;
    let outsider = create_test_user(&mut conn, test_db.test_prefix(), "Outsider").await;
    let fixture = setup_board(&mut conn, &events, &author).await;
    add_member(&mut conn, fixture.workspace_id, &author, &assignee, WorkspaceRole::Member).await;

    let card = cards::create_card(
        &mut conn,
        &events,
        &author,
        CreateCardRequest {
            column_id: fixture.column_id,
            title: "Review".to_string(),
            assignee_id: Some(assignee.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    notifications::mark_all_as_read(&mut conn, &assignee).await.unwrap();

    // Self and non-member mentions are recorded but not notified
    let content = format!("@{} @{} @{} @{}", assignee.id, assignee.id, author.id, outsider.id);
    let posted = comments::create_comment(&mut conn, &author, comment(card.id, content)).await.unwrap();
    assert_eq!(posted.comment.mentions, vec![assignee.id, author.id, outsider.id]);

    let inbox = notifications::get_user_notifications(&mut conn, &assignee, true, 50).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].notification.notification_type, NotificationType::Mentioned);

    assert_eq!(notifications::get_unread_count(&mut conn, &author).await.unwrap(), 0);
    assert_eq!(notifications::get_unread_count(&mut conn, &outsider).await.unwrap(), 0);
}

#[tokio::test]
async fn test_comment_edit_and_delete() {
    let test_db = TestDb::new("test_comment_edit_and_delete").await;
    let mut conn = test_db.get_connection().await;
    let events = BoardEvents::default();

    let author = create_test_user(&mut conn, test_db.test_prefix(), "Author").await;
    let first = create_test_user(&mut conn, test_db.test_prefix(), "First").await;
    let second = create_test_user(&mut conn, test_db.test_prefix(), "Second").await;
    let fixture = setup_board(&mut conn, &events, &author).await;
    add_member(&mut conn, fixture.workspace_id, &author, &first, WorkspaceRole::Member).await;
    add_member(&mut conn, fixture.workspace_id, &author, &second, WorkspaceRole::Member).await;
    notifications::mark_all_as_read(&mut conn, &first).await.unwrap();
    notifications::mark_all_as_read(&mut conn, &second).await.unwrap();

    let card = common::create_card(&mut conn, &events, &author, fixture.column_id, "Design review").await;
    let posted = comments::create_comment(&mut conn, &author, comment(card.id, format!("ping @{}", first.id)))
        .await
        .unwrap();
    assert_eq!(notifications::get_unread_count(&mut conn, &first).await.unwrap(), 1);

    let err = comments::update_comment(&mut conn, &first, posted.comment.id, "hijack").await.unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));
    let err = comments::delete_comment(&mut conn, &first, posted.comment.id).await.unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    let edited = comments::update_comment(
        &mut conn,
        &author,
        posted.comment.id,
        &format!("ping @{} and @{}", first.id, second.id),
    )
    .await
    .unwrap();
    assert_eq!(edited.comment.mentions, vec![first.id, second.id]);
    assert!(edited.comment.content.contains("and"));

    // Only the newly mentioned user hears about the edit
    assert_eq!(notifications::get_unread_count(&mut conn, &first).await.unwrap(), 1);
    assert_eq!(notifications::get_unread_count(&mut conn, &second).await.unwrap(), 1);

    let err = comments::update_comment(&mut conn, &author, posted.comment.id, "  ").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let second_comment = comments::create_comment(&mut conn, &first, comment(card.id, "newer".to_string()))
        .await
        .unwrap();
    let listed = comments::list_comments(&mut conn, &second, card.id).await.unwrap();
    let ids: Vec<_> = listed.iter().map(|c| c.comment.id).collect();
    assert_eq!(ids, vec![second_comment.comment.id, posted.comment.id]);
    assert_eq!(listed[0].author.id, first.id);

    comments::delete_comment(&mut conn, &author, posted.comment.id).await.unwrap();
    assert_eq!(comments::list_comments(&mut conn, &author, card.id).await.unwrap().len(), 1);

    // A second delete finds nothing and logs nothing
    let err = comments::delete_comment(&mut conn, &author, posted.comment.id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    let removed = taskboard::queries::comments::delete_comment(&mut conn, posted.comment.id).await.unwrap();
    assert_eq!(removed, 0);

    let history = activity::get_card_activities(&mut conn, &author, card.id).await.unwrap();
    let kinds: Vec<_> = history.iter().map(|a| a.entry.action_type).collect();
    assert_eq!(
        kinds,
        vec![
            ActivityType::DeleteComment,
            ActivityType::AddComment,
            ActivityType::UpdateComment,
            ActivityType::AddComment,
            ActivityType::CreateCard,
        ]
    );
}
