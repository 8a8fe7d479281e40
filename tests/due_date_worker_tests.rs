mod common;

use chrono::{DateTime, Duration, Utc};
use common::{TestDb, add_member, create_test_user, setup_board};
use taskboard::{
    DbConn,
    auth::AuthenticatedUser,
    models::{
        cards::Card,
        notifications::NotificationType,
        requests::{CreateCardRequest, UpdateCardRequest},
        workspace_members::WorkspaceRole,
    },
    realtime::BoardEvents,
    services::{cards, notifications},
    workers::run_due_date_sweep,
};
use uuid::Uuid;

#[allow(clippy::too_many_arguments)]
async fn make_card(
    conn: &mut DbConn,
    events: &BoardEvents,
    actor: &AuthenticatedUser,
    column_id: Uuid,
    now: DateTime<Utc>,
    title: &str,
    due_in: Option<Duration>,
    assignee_id: Option<Uuid>,
) -> Card {
    cards::create_card(
        conn,
        events,
        actor,
        CreateCardRequest {
            column_id,
            title: title.to_string(),
            assignee_id,
            due_date: due_in.map(|offset| now + offset),
            ..Default::default()
        },
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_due_date_sweep_notifies_once_inside_window() {
    let test_db = TestDb::new("test_due_date_sweep").await;
    let mut conn = test_db.get_connection().await;
    let events = BoardEvents::default();

    let owner = create_test_user(&mut conn, test_db.test_prefix(), "Owner").await;
    let member = create_test_user(&mut conn, test_db.test_prefix(), "Member").await;
    let fixture = setup_board(&mut conn, &events, &owner).await;
    add_member(&mut conn, fixture.workspace_id, &owner, &member, WorkspaceRole::Member).await;
    notifications::mark_all_as_read(&mut conn, &member).await.unwrap();

    let now = Utc::now();
    let soon = make_card(&mut conn, &events, &owner, fixture.column_id, now, "Soon", Some(Duration::hours(2)), Some(member.id)).await;
    let completed = make_card(&mut conn, &events, &owner, fixture.column_id, now, "Done already", Some(Duration::hours(3)), Some(member.id)).await;
    make_card(&mut conn, &events, &owner, fixture.column_id, now, "Later", Some(Duration::hours(48)), Some(member.id)).await;
    make_card(&mut conn, &events, &owner, fixture.column_id, now, "Overdue", Some(Duration::hours(-1)), Some(member.id)).await;
    make_card(&mut conn, &events, &owner, fixture.column_id, now, "Unassigned", Some(Duration::hours(1)), None).await;
    make_card(&mut conn, &events, &owner, fixture.column_id, now, "No date", None, Some(member.id)).await;

    cards::update_card(
        &mut conn,
        &events,
        &owner,
        completed.id,
        UpdateCardRequest {
            is_completed: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    notifications::mark_all_as_read(&mut conn, &member).await.unwrap();

    let sent = run_due_date_sweep(&mut conn, 24, now).await.unwrap();
    assert_eq!(sent, 1);

    let unread = notifications::get_user_notifications(&mut conn, &member, true, 50).await.unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].notification.notification_type, NotificationType::DueDateSoon);
    assert_eq!(unread[0].notification.card_id, Some(soon.id));
    assert!(unread[0].notification.message.starts_with("\"Soon\" is due "));

    // A second sweep does not repeat the reminder
    let sent = run_due_date_sweep(&mut conn, 24, now + Duration::minutes(15)).await.unwrap();
    assert_eq!(sent, 0);
    assert_eq!(notifications::get_unread_count(&mut conn, &member).await.unwrap(), 1);
}

#[tokio::test]
async fn test_due_date_sweep_window_bounds() {
    let test_db = TestDb::new("test_due_date_window_bounds").await;
    let mut conn = test_db.get_connection().await;
    let events = BoardEvents::default();

    let owner = create_test_user(&mut conn, test_db.test_prefix(), "Owner").await;
    let member = create_test_user(&mut conn, test_db.test_prefix(), "Member").await;
    let fixture = setup_board(&mut conn, &events, &owner).await;
    add_member(&mut conn, fixture.workspace_id, &owner, &member, WorkspaceRole::Member).await;

    let now = Utc::now();
    make_card(&mut conn, &events, &owner, fixture.column_id, now, "Due now", Some(Duration::zero()), Some(member.id)).await;
    let edge = make_card(&mut conn, &events, &owner, fixture.column_id, now, "Window edge", Some(Duration::hours(6)), Some(member.id)).await;
    make_card(&mut conn, &events, &owner, fixture.column_id, now, "Just past", Some(Duration::hours(6) + Duration::seconds(1)), Some(member.id)).await;
    notifications::mark_all_as_read(&mut conn, &member).await.unwrap();

    let sent = run_due_date_sweep(&mut conn, 6, now).await.unwrap();
    assert_eq!(sent, 1);

    let unread = notifications::get_user_notifications(&mut conn, &member, true, 50).await.unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].notification.card_id, Some(edge.id));
}
