mod common;

use common::{TestDb, add_member, count_rows, create_card, create_test_user, setup_board};
use taskboard::{
    Error,
    models::{
        requests::{CreateBoardRequest, CreateColumnRequest, CreateLabelRequest, UpdateBoardRequest, UpdateColumnRequest},
        workspace_members::WorkspaceRole,
    },
    realtime::BoardEvents,
    services::{boards, cards, columns, labels, storage::LocalFileStore},
};

fn column_request(board_id: uuid::Uuid, title: &str, position: Option<i64>) -> CreateColumnRequest {
    CreateColumnRequest {
        board_id,
        title: title.to_string(),
        position,
    }
}

#[tokio::test]
async fn test_columns_append_and_keep_explicit_positions() {
    let test_db = TestDb::new("test_columns_append").await;
    let mut conn = test_db.get_connection().await;
    let events = BoardEvents::default();

    let owner = create_test_user(&mut conn, test_db.test_prefix(), "Owner").await;
    let fixture = setup_board(&mut conn, &events, &owner).await;

    let doing = columns::create_column(&mut conn, &events, &owner, column_request(fixture.board_id, "Doing", None))
        .await
        .unwrap();
    let done = columns::create_column(&mut conn, &events, &owner, column_request(fixture.board_id, "Done", None))
        .await
        .unwrap();
    assert_eq!(doing.position, 1);
    assert_eq!(done.position, 2);

    // Explicit positions are stored as given; siblings are not renumbered
    let backlog = columns::create_column(&mut conn, &events, &owner, column_request(fixture.board_id, "Backlog", Some(0)))
        .await
        .unwrap();
    assert_eq!(backlog.position, 0);

    let listed = columns::list_columns(&mut conn, &owner, fixture.board_id).await.unwrap();
    let positions: Vec<_> = listed.iter().map(|c| (c.title.as_str(), c.position)).collect();
    assert_eq!(
        positions,
        vec![("To do", 0), ("Backlog", 0), ("Doing", 1), ("Done", 2)]
    );

    let err = columns::create_column(&mut conn, &events, &owner, column_request(fixture.board_id, "Broken", Some(-1)))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let err = columns::create_column(&mut conn, &events, &owner, column_request(fixture.board_id, "   ", None))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let moved = columns::update_column(
        &mut conn,
        &events,
        &owner,
        done.id,
        UpdateColumnRequest {
            title: Some("Shipped".to_string()),
            position: Some(5),
        },
    )
    .await
    .unwrap();
    assert_eq!(moved.title, "Shipped");
    assert_eq!(moved.position, 5);

    let unchanged = columns::get_column(&mut conn, &owner, doing.id).await.unwrap();
    assert_eq!(unchanged.position, 1);
}

#[tokio::test]
async fn test_get_board_groups_visible_cards() {
    let test_db = TestDb::new("test_get_board_groups").await;
    let mut conn = test_db.get_connection().await;
    let events = BoardEvents::default();

    let owner = create_test_user(&mut conn, test_db.test_prefix(), "Owner").await;
    let member = create_test_user(&mut conn, test_db.test_prefix(), "Member").await;
    let outsider = create_test_user(&mut conn, test_db.test_prefix(), "Outsider").await;
    let fixture = setup_board(&mut conn, &events, &owner).await;
    add_member(&mut conn, fixture.workspace_id, &owner, &member, WorkspaceRole::Member).await;

    let done = columns::create_column(&mut conn, &events, &owner, column_request(fixture.board_id, "Done", None))
        .await
        .unwrap();
    let first = create_card(&mut conn, &events, &owner, fixture.column_id, "First").await;
    let second = create_card(&mut conn, &events, &member, fixture.column_id, "Second").await;
    let archived = create_card(&mut conn, &events, &owner, done.id, "Old").await;
    cards::archive_card(&mut conn, &events, &owner, archived.id).await.unwrap();
    labels::create_label(
        &mut conn,
        &owner,
        CreateLabelRequest {
            board_id: fixture.board_id,
            name: "Urgent".to_string(),
            color: "#ff8800".to_string(),
        },
    )
    .await
    .unwrap();

    let details = boards::get_board(&mut conn, &member, fixture.board_id).await.unwrap();
    assert_eq!(details.board.id, fixture.board_id);
    assert_eq!(details.columns.len(), 2);
    assert_eq!(details.columns[0].column.id, fixture.column_id);
    let titles: Vec<_> = details.columns[0].cards.iter().map(|c| c.id).collect();
    assert_eq!(titles, vec![first.id, second.id]);
    assert!(details.columns[1].cards.is_empty());
    assert_eq!(details.labels.len(), 1);
    assert_eq!(details.labels[0].color, "#ff8800");

    let err = boards::get_board(&mut conn, &outsider, fixture.board_id).await.unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    let listed = boards::list_boards(&mut conn, &member, fixture.workspace_id).await.unwrap();
    assert_eq!(listed.len(), 1);

    let err = boards::create_board(
        &mut conn,
        &outsider,
        CreateBoardRequest {
            workspace_id: fixture.workspace_id,
            name: "Intrusion".to_string(),
            description: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    let renamed = boards::update_board(
        &mut conn,
        &member,
        fixture.board_id,
        UpdateBoardRequest {
            name: Some("Roadmap 2025".to_string()),
            description: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(renamed.name, "Roadmap 2025");
}

#[tokio::test]
async fn test_delete_board_cascades() {
    let test_db = TestDb::new("test_delete_board_cascades").await;
    let mut conn = test_db.get_connection().await;
    let events = BoardEvents::default();
    let store = LocalFileStore::new(std::env::temp_dir().join(format!("taskboard-board-{}", uuid::Uuid::new_v4())));

    let owner = create_test_user(&mut conn, test_db.test_prefix(), "Owner").await;
    let fixture = setup_board(&mut conn, &events, &owner).await;
    let card = create_card(&mut conn, &events, &owner, fixture.column_id, "Doomed").await;
    cards::toggle_completed(&mut conn, &events, &owner, card.id).await.unwrap();

    assert_eq!(count_rows(&mut conn, "cards").await, 1);
    assert_eq!(count_rows(&mut conn, "activity_logs").await, 2);

    boards::delete_board(&mut conn, &store, &owner, fixture.board_id).await.unwrap();

    assert_eq!(count_rows(&mut conn, "boards").await, 0);
    assert_eq!(count_rows(&mut conn, "board_columns").await, 0);
    assert_eq!(count_rows(&mut conn, "cards").await, 0);
    assert_eq!(count_rows(&mut conn, "activity_logs").await, 0);

    let err = boards::get_board(&mut conn, &owner, fixture.board_id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_board_events_reach_board_subscribers() {
    let test_db = TestDb::new("test_board_events").await;
    let mut conn = test_db.get_connection().await;
    let events = BoardEvents::default();

    let owner = create_test_user(&mut conn, test_db.test_prefix(), "Owner").await;
    let fixture = setup_board(&mut conn, &events, &owner).await;
    let other = setup_board(&mut conn, &events, &owner).await;

    let mut subscription = events.subscribe(fixture.board_id);
    assert!(subscription.try_recv().is_none());

    create_card(&mut conn, &events, &owner, other.column_id, "Elsewhere").await;
    let card = create_card(&mut conn, &events, &owner, fixture.column_id, "Here").await;

    let event = subscription.try_recv().expect("card.created event");
    assert_eq!(event.event, "card.created");
    assert_eq!(event.board_id, fixture.board_id);
    assert_eq!(event.payload["title"], "Here");
    assert!(subscription.try_recv().is_none());

    cards::toggle_completed(&mut conn, &events, &owner, card.id).await.unwrap();
    let event = subscription.try_recv().expect("card.updated event");
    assert_eq!(event.event, "card.updated");
    assert_eq!(event.payload["is_completed"], true);
}
