mod helpers;

use helpers::{insert_card, t0, test_db};
use flashdeck::review::store::{
    create_flashcard, delete_flashcard, get_flashcard, list_flashcards, update_flashcard, StoreError,
};
use flashdeck::review::analytics::{list_for_user, record_analytics, NewAnalyticsRecord};
use flashdeck::review::types::FlashcardUpdate;

#[test]
fn list_filters_by_subject() {
    let conn = test_db();
    insert_card(&conn, "a", "math");
    insert_card(&conn, "b", "history");
    insert_card(&conn, "c", "math");

    let page = list_flashcards(&conn, Some("math"), 1, 10).unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.total_pages, 1);
    assert!(page.flashcards.iter().all(|c| c.subject == "math"));

    let all = list_flashcards(&conn, None, 1, 10).unwrap();
    assert_eq!(all.total, 3);
}

#[test]
fn list_paginates() {
    let conn = test_db();
    for i in 0..5 {
        insert_card(&conn, &format!("q{i}"), "math");
    }

    let first = list_flashcards(&conn, None, 1, 2).unwrap();
    assert_eq!(first.flashcards.len(), 2);
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.current_page, 1);

    let last = list_flashcards(&conn, None, 3, 2).unwrap();
    assert_eq!(last.flashcards.len(), 1);

    let beyond = list_flashcards(&conn, None, 4, 2).unwrap();
    assert!(beyond.flashcards.is_empty());
}

#[test]
fn list_clamps_page_and_limit() {
    let conn = test_db();
    insert_card(&conn, "a", "math");

    let page = list_flashcards(&conn, None, 0, 0).unwrap();
    assert_eq!(page.current_page, 1);
    assert_eq!(page.flashcards.len(), 1);
}

#[test]
fn empty_list_has_zero_pages() {
    let conn = test_db();
    let page = list_flashcards(&conn, None, 1, 10).unwrap();
    assert_eq!(page.total_pages, 0);
    assert!(page.flashcards.is_empty());
}

#[test]
fn update_changes_content_but_not_review_state() {
    let mut conn = test_db();
    let card = insert_card(&conn, "old", "math");

    let update = FlashcardUpdate {
        question: Some("new".into()),
        ..Default::default()
    };
    let updated = update_flashcard(&mut conn, &card.id, &update, t0()).unwrap().unwrap();

    assert_eq!(updated.question, "new");
    assert_eq!(updated.subject, "math");
    assert_eq!(updated.review.difficulty_rating, card.review.difficulty_rating);
    assert_eq!(updated.version, card.version + 1);
}

#[test]
fn update_validates_merged_content() {
    let mut conn = test_db();
    let card = insert_card(&conn, "q", "math");

    let update = FlashcardUpdate {
        options: Some(vec!["only".into()]),
        correct_answer: Some(2),
        ..Default::default()
    };
    let err = update_flashcard(&mut conn, &card.id, &update, t0()).unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    let unchanged = get_flashcard(&conn, &card.id).unwrap().unwrap();
    assert_eq!(unchanged.options.len(), 3);
}

#[test]
fn update_missing_returns_none() {
    let mut conn = test_db();
    let result = update_flashcard(&mut conn, "missing", &FlashcardUpdate::default(), t0()).unwrap();
    assert!(result.is_none());
}

#[test]
fn delete_removes_card_but_keeps_analytics() {
    let conn = test_db();
    let card = insert_card(&conn, "q", "math");
    record_analytics(
        &conn,
        &NewAnalyticsRecord {
            user_id: "alice".into(),
            flashcard_id: card.id.clone(),
            interaction_timestamp: t0(),
            response_time: 100.0,
            correctness: true,
        },
    )
    .unwrap();

    assert!(delete_flashcard(&conn, &card.id).unwrap());
    assert!(get_flashcard(&conn, &card.id).unwrap().is_none());
    assert!(!delete_flashcard(&conn, &card.id).unwrap());

    assert_eq!(list_for_user(&conn, "alice").unwrap().len(), 1);
}

#[test]
fn baseline_difficulty_is_applied_on_create() {
    let conn = test_db();
    let card = create_flashcard(&conn, &helpers::new_card("q", "math"), 3, t0()).unwrap();
    let stored = get_flashcard(&conn, &card.id).unwrap().unwrap();
    assert_eq!(stored.review.difficulty_rating, 3);
    assert_eq!(stored.review.consecutive_correct_responses, 0);
    assert_eq!(stored.review.confidence_level, None);
    assert!(stored.review.is_due(t0()));
}
