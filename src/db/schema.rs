//! SQL DDL for all flashdeck tables.
//!
//! Defines the `flashcards`, `analytics`, and `schema_meta` tables. All DDL uses
//! `IF NOT EXISTS` for idempotent initialization. Review-state columns are nullable
//! so rows written by older builds can still be read.

use rusqlite::Connection;

/// All schema DDL statements for the v1 tables.
const SCHEMA_SQL: &str = r#"
-- Flashcards and their spaced-repetition state
CREATE TABLE IF NOT EXISTS flashcards (
    id TEXT PRIMARY KEY,
    question TEXT NOT NULL,
    options TEXT NOT NULL,
    correct_answer INTEGER NOT NULL CHECK(correct_answer >= 0),
    subject TEXT NOT NULL,
    consecutive_correct_responses INTEGER DEFAULT 0,
    difficulty_rating INTEGER DEFAULT 1,
    response_time REAL DEFAULT 0,
    confidence_level INTEGER DEFAULT 0,
    session_context TEXT DEFAULT '',
    next_presentation_at TEXT,
    last_updated TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_flashcards_subject ON flashcards(subject);

-- Raw interaction audit trail. No FK: entries outlive deleted flashcards.
CREATE TABLE IF NOT EXISTS analytics (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    flashcard_id TEXT NOT NULL,
    interaction_timestamp TEXT NOT NULL,
    response_time REAL NOT NULL CHECK(response_time >= 0),
    correctness INTEGER NOT NULL CHECK(correctness IN (0, 1))
);

CREATE INDEX IF NOT EXISTS idx_analytics_flashcard ON analytics(flashcard_id);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"flashcards".to_string()));
        assert!(tables.contains(&"analytics".to_string()));
        assert!(tables.contains(&"schema_meta".to_string()));
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap(); // second call should not error
    }

    #[test]
    fn new_rows_get_review_defaults() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO flashcards (id, question, options, correct_answer, subject, created_at, updated_at) \
             VALUES ('a', 'q', '[\"x\"]', 0, 's', 't', 't')",
            [],
        )
        .unwrap();

        let (streak, difficulty, confidence, context): (i64, i64, i64, String) = conn
            .query_row(
                "SELECT consecutive_correct_responses, difficulty_rating, confidence_level, session_context \
                 FROM flashcards WHERE id = 'a'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .unwrap();
        assert_eq!(streak, 0);
        assert_eq!(difficulty, 1);
        assert_eq!(confidence, 0);
        assert_eq!(context, "");
    }
}
