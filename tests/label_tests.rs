mod common;

use common::{TestDb, count_rows, create_card, create_test_user, setup_board};
use taskboard::{
    Error,
    models::{
        activity::{ActivityDetails, ActivityType},
        requests::{CreateLabelRequest, UpdateLabelRequest},
    },
    realtime::BoardEvents,
    services::{activity, labels},
};

fn label_request(board_id: uuid::Uuid, name: &str, color: &str) -> CreateLabelRequest {
    CreateLabelRequest {
        board_id,
        name: name.to_string(),
        color: color.to_string(),
    }
}

#[tokio::test]
async fn test_add_label_is_idempotent() {
    let test_db = TestDb::new("test_add_label_idempotent").await;
    let mut conn = test_db.get_connection().await;
    let events = BoardEvents::default();

    let owner = create_test_user(&mut conn, test_db.test_prefix(), "Owner").await;
    let fixture = setup_board(&mut conn, &events, &owner).await;
    let card = create_card(&mut conn, &events, &owner, fixture.column_id, "Crash on save").await;
    let label = labels::create_label(&mut conn, &owner, label_request(fixture.board_id, "Bug", "#D93F0B"))
        .await
        .unwrap();

    let first = labels::add_label_to_card(&mut conn, &owner, card.id, label.id).await.unwrap();
    assert!(first.added);
    assert_eq!(first.label.id, label.id);

    let second = labels::add_label_to_card(&mut conn, &owner, card.id, label.id).await.unwrap();
    assert!(!second.added);
    assert_eq!(second.message, "Label already added");
    assert_eq!(count_rows(&mut conn, "card_labels").await, 1);

    let history = activity::get_card_activities(&mut conn, &owner, card.id).await.unwrap();
    let added: Vec<_> = history
        .iter()
        .filter(|a| a.entry.action_type == ActivityType::AddLabel)
        .collect();
    assert_eq!(added.len(), 1);
    assert_eq!(
        added[0].entry.details,
        ActivityDetails::AddLabel {
            label_id: label.id,
            label_name: "Bug".to_string(),
        }
    );

    let on_card = labels::list_card_labels(&mut conn, &owner, card.id).await.unwrap();
    assert_eq!(on_card.len(), 1);

    labels::remove_label_from_card(&mut conn, &owner, card.id, label.id).await.unwrap();
    assert_eq!(count_rows(&mut conn, "card_labels").await, 0);
    let err = labels::remove_label_from_card(&mut conn, &owner, card.id, label.id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_label_validation_and_board_scope() {
    let test_db = TestDb::new("test_label_validation").await;
    let mut conn = test_db.get_connection().await;
    let events = BoardEvents::default();

    let owner = create_test_user(&mut conn, test_db.test_prefix(), "Owner").await;
    let fixture = setup_board(&mut conn, &events, &owner).await;
    let other = setup_board(&mut conn, &events, &owner).await;
    let card = create_card(&mut conn, &events, &owner, fixture.column_id, "Card").await;

    for color in ["red", "#12345", "#GGGGGG", "123456"] {
        let err = labels::create_label(&mut conn, &owner, label_request(fixture.board_id, "Bad", color))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "{} should be rejected", color);
    }

    let foreign = labels::create_label(&mut conn, &owner, label_request(other.board_id, "Elsewhere", "#000000"))
        .await
        .unwrap();
    let err = labels::add_label_to_card(&mut conn, &owner, card.id, foreign.id).await.unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));

    let updated = labels::update_label(
        &mut conn,
        &owner,
        foreign.id,
        UpdateLabelRequest {
            name: None,
            color: Some("#ABCDEF".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.name, "Elsewhere");
    assert_eq!(updated.color, "#ABCDEF");

    let err = labels::update_label(
        &mut conn,
        &owner,
        foreign.id,
        UpdateLabelRequest {
            name: None,
            color: Some("blue".to_string()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let listed = labels::list_labels(&mut conn, &owner, other.board_id).await.unwrap();
    assert_eq!(listed.len(), 1);

    labels::delete_label(&mut conn, &owner, foreign.id).await.unwrap();
    let err = labels::get_label(&mut conn, &owner, foreign.id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_deleting_label_detaches_it_from_cards() {
    let test_db = TestDb::new("test_deleting_label_detaches").await;
    let mut conn = test_db.get_connection().await;
    let events = BoardEvents::default();

    let owner = create_test_user(&mut conn, test_db.test_prefix(), "Owner").await;
    let fixture = setup_board(&mut conn, &events, &owner).await;
    let card = create_card(&mut conn, &events, &owner, fixture.column_id, "Card").await;
    let label = labels::create_label(&mut conn, &owner, label_request(fixture.board_id, "Later", "#CCCCCC"))
        .await
        .unwrap();
    labels::add_label_to_card(&mut conn, &owner, card.id, label.id).await.unwrap();

    labels::delete_label(&mut conn, &owner, label.id).await.unwrap();
    assert!(labels::list_card_labels(&mut conn, &owner, card.id).await.unwrap().is_empty());
}
