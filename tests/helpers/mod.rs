#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use flashdeck::db;
use flashdeck::review::store;
use flashdeck::review::types::{Flashcard, NewFlashcard};
use rusqlite::Connection;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "foreign_keys", "ON").unwrap();
    db::schema::init_schema(&conn).unwrap();
    db::migrations::run_migrations(&conn).unwrap();
    conn
}

/// Fixed reference time, whole seconds so it survives any timestamp encoding.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn new_card(question: &str, subject: &str) -> NewFlashcard {
    NewFlashcard {
        question: question.to_string(),
        options: vec!["yes".into(), "no".into(), "maybe".into()],
        correct_answer: 0,
        subject: subject.to_string(),
    }
}

/// Insert a test flashcard at baseline difficulty 1. Returns the stored card.
pub fn insert_card(conn: &Connection, question: &str, subject: &str) -> Flashcard {
    store::create_flashcard(conn, &new_card(question, subject), 1, t0()).unwrap()
}

/// Force a card's difficulty and streak, bypassing the engine.
pub fn set_review(conn: &Connection, id: &str, difficulty: i64, streak: i64) {
    conn.execute(
        "UPDATE flashcards SET difficulty_rating = ?1, consecutive_correct_responses = ?2 WHERE id = ?3",
        rusqlite::params![difficulty, streak, id],
    )
    .unwrap();
}
