//! Flashcard persistence and the interaction write path.
//!
//! CRUD over the `flashcards` table plus [`record_interaction`], which runs the whole
//! interaction pipeline inside one IMMEDIATE transaction: load state → compute the
//! next state → version-checked save → analytics entry. Every write bumps the row's
//! `version`, so a writer that loaded stale state gets
//! [`StoreError::VersionConflict`] instead of silently overwriting a newer state.

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde::Serialize;
use thiserror::Error;

use super::analytics::{self, NewAnalyticsRecord};
use super::engine::{self, MetricsError};
use super::types::{Flashcard, FlashcardUpdate, InteractionEvent, NewFlashcard, ReviewState, StoredReviewState};
use crate::db::{format_timestamp, parse_timestamp};

/// Largest page size accepted by [`list_flashcards`].
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("flashcard not found: {0}")]
    NotFound(String),
    #[error("invalid flashcard: {0}")]
    Validation(String),
    #[error("flashcard {id} was modified concurrently (expected version {expected})")]
    VersionConflict { id: String, expected: i64 },
    #[error(transparent)]
    Metrics(#[from] MetricsError),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One page of [`list_flashcards`].
#[derive(Debug, Serialize)]
pub struct FlashcardPage {
    pub flashcards: Vec<Flashcard>,
    pub total_pages: u64,
    pub current_page: u32,
    pub total: u64,
}

/// Result of [`record_interaction`]. Carries both states so callers can log the change.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionOutcome {
    pub flashcard_id: String,
    pub previous: ReviewState,
    pub updated: ReviewState,
    pub version: i64,
    pub analytics_id: String,
}

const SELECT_COLUMNS: &str = "id, question, options, correct_answer, subject, \
     consecutive_correct_responses, difficulty_rating, response_time, confidence_level, \
     session_context, next_presentation_at, last_updated, version, created_at, updated_at";

/// Raw row before JSON decoding and state normalization.
struct FlashcardRow {
    id: String,
    question: String,
    options: String,
    correct_answer: i64,
    subject: String,
    stored: StoredReviewState,
    version: i64,
    created_at: String,
    updated_at: String,
}

/// Review columns come from loosely typed legacy imports; coerce what can be read
/// and leave the rest to [`StoredReviewState::normalize`].
fn value_to_i64(value: Value) -> Option<i64> {
    match value {
        Value::Integer(i) => Some(i),
        Value::Real(f) if f.is_finite() => Some(f.round() as i64),
        Value::Text(t) => t
            .trim()
            .parse::<i64>()
            .ok()
            .or_else(|| value_to_i64(Value::Real(t.trim().parse().ok()?))),
        _ => None,
    }
}

fn value_to_f64(value: Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(i as f64),
        Value::Real(f) => Some(f),
        Value::Text(t) => t.trim().parse().ok(),
        _ => None,
    }
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Text(t) => Some(t),
        _ => None,
    }
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FlashcardRow> {
    let next = value_to_string(row.get(10)?);
    let last = value_to_string(row.get(11)?);
    Ok(FlashcardRow {
        id: row.get(0)?,
        question: row.get(1)?,
        options: row.get(2)?,
        correct_answer: row.get(3)?,
        subject: row.get(4)?,
        stored: StoredReviewState {
            consecutive_correct_responses: value_to_i64(row.get(5)?),
            difficulty_rating: value_to_i64(row.get(6)?),
            response_time: value_to_f64(row.get(7)?),
            confidence_level: value_to_i64(row.get(8)?),
            session_context: value_to_string(row.get(9)?),
            next_presentation_timestamp: next.as_deref().and_then(parse_timestamp),
            last_updated: last.as_deref().and_then(parse_timestamp),
        },
        version: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

impl FlashcardRow {
    fn into_flashcard(self) -> StoreResult<Flashcard> {
        let created_at = parse_timestamp(&self.created_at).unwrap_or_else(|| {
            tracing::warn!(id = %self.id, value = %self.created_at, "unparseable created_at");
            DateTime::<Utc>::default()
        });
        let updated_at = parse_timestamp(&self.updated_at).unwrap_or_else(|| {
            tracing::warn!(id = %self.id, value = %self.updated_at, "unparseable updated_at");
            created_at
        });
        Ok(Flashcard {
            options: serde_json::from_str(&self.options)?,
            correct_answer: self.correct_answer.max(0) as usize,
            review: self.stored.normalize(updated_at),
            id: self.id,
            question: self.question,
            subject: self.subject,
            version: self.version,
            created_at,
            updated_at,
        })
    }
}

fn validate_content(
    question: &str,
    options: &[String],
    correct_answer: usize,
    subject: &str,
) -> StoreResult<()> {
    if question.trim().is_empty() {
        return Err(StoreError::Validation("question must not be empty".into()));
    }
    if subject.trim().is_empty() {
        return Err(StoreError::Validation("subject must not be empty".into()));
    }
    if options.is_empty() {
        return Err(StoreError::Validation("options must not be empty".into()));
    }
    if correct_answer >= options.len() {
        return Err(StoreError::Validation(format!(
            "correct_answer {correct_answer} is out of range for {} options",
            options.len()
        )));
    }
    Ok(())
}

/// Insert a new flashcard with a fresh review state at `baseline_difficulty`.
pub fn create_flashcard(
    conn: &Connection,
    card: &NewFlashcard,
    baseline_difficulty: u8,
    now: DateTime<Utc>,
) -> StoreResult<Flashcard> {
    validate_content(&card.question, &card.options, card.correct_answer, &card.subject)?;

    let id = uuid::Uuid::now_v7().to_string();
    let review = ReviewState::initial(baseline_difficulty, now);
    let ts = format_timestamp(&now);

    conn.execute(
        "INSERT INTO flashcards (id, question, options, correct_answer, subject, \
         consecutive_correct_responses, difficulty_rating, response_time, confidence_level, \
         session_context, next_presentation_at, last_updated, version, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, 0, 0, '', ?7, ?7, 0, ?7, ?7)",
        params![
            id,
            card.question,
            serde_json::to_string(&card.options)?,
            card.correct_answer as i64,
            card.subject,
            review.difficulty_rating,
            ts,
        ],
    )?;

    tracing::info!(id = %id, subject = %card.subject, "flashcard created");

    Ok(Flashcard {
        id,
        question: card.question.clone(),
        options: card.options.clone(),
        correct_answer: card.correct_answer,
        subject: card.subject.clone(),
        review,
        version: 0,
        created_at: now,
        updated_at: now,
    })
}

pub fn get_flashcard(conn: &Connection, id: &str) -> StoreResult<Option<Flashcard>> {
    conn.query_row(
        &format!("SELECT {SELECT_COLUMNS} FROM flashcards WHERE id = ?1"),
        params![id],
        read_row,
    )
    .optional()?
    .map(FlashcardRow::into_flashcard)
    .transpose()
}

/// List flashcards, optionally filtered by subject. `page` is 1-based; `limit` is
/// clamped to `1..=MAX_PAGE_SIZE`.
pub fn list_flashcards(
    conn: &Connection,
    subject: Option<&str>,
    page: u32,
    limit: u32,
) -> StoreResult<FlashcardPage> {
    let page = page.max(1);
    let limit = limit.clamp(1, MAX_PAGE_SIZE);
    let offset = (page as i64 - 1) * limit as i64;

    let (total, rows): (i64, Vec<FlashcardRow>) = match subject {
        Some(s) => {
            let total = conn.query_row(
                "SELECT COUNT(*) FROM flashcards WHERE subject = ?1",
                params![s],
                |row| row.get(0),
            )?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM flashcards WHERE subject = ?1 \
                 ORDER BY created_at, id LIMIT ?2 OFFSET ?3"
            ))?;
            let rows = stmt
                .query_map(params![s, limit, offset], read_row)?
                .collect::<Result<Vec<_>, _>>()?;
            (total, rows)
        }
        None => {
            let total = conn.query_row("SELECT COUNT(*) FROM flashcards", [], |row| row.get(0))?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM flashcards ORDER BY created_at, id LIMIT ?1 OFFSET ?2"
            ))?;
            let rows = stmt
                .query_map(params![limit, offset], read_row)?
                .collect::<Result<Vec<_>, _>>()?;
            (total, rows)
        }
    };

    let flashcards = rows
        .into_iter()
        .map(FlashcardRow::into_flashcard)
        .collect::<StoreResult<Vec<_>>>()?;

    tracing::debug!(count = flashcards.len(), total, page, "flashcards fetched");

    Ok(FlashcardPage {
        flashcards,
        total_pages: (total as u64).div_ceil(limit as u64),
        current_page: page,
        total: total as u64,
    })
}

/// Apply a content update. Returns `None` if the flashcard does not exist.
pub fn update_flashcard(
    conn: &mut Connection,
    id: &str,
    update: &FlashcardUpdate,
    now: DateTime<Utc>,
) -> StoreResult<Option<Flashcard>> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let Some(existing) = get_flashcard(&tx, id)? else {
        return Ok(None);
    };

    let question = update.question.clone().unwrap_or(existing.question);
    let options = update.options.clone().unwrap_or(existing.options);
    let correct_answer = update.correct_answer.unwrap_or(existing.correct_answer);
    let subject = update.subject.clone().unwrap_or(existing.subject);
    validate_content(&question, &options, correct_answer, &subject)?;

    tx.execute(
        "UPDATE flashcards SET question = ?1, options = ?2, correct_answer = ?3, subject = ?4, \
         version = version + 1, updated_at = ?5 WHERE id = ?6",
        params![
            question,
            serde_json::to_string(&options)?,
            correct_answer as i64,
            subject,
            format_timestamp(&now),
            id,
        ],
    )?;

    let updated = get_flashcard(&tx, id)?;
    tx.commit()?;

    tracing::info!(id = %id, "flashcard updated");
    Ok(updated)
}

/// Delete a flashcard and its review state. Analytics entries are kept.
pub fn delete_flashcard(conn: &Connection, id: &str) -> StoreResult<bool> {
    let deleted = conn.execute("DELETE FROM flashcards WHERE id = ?1", params![id])?;
    if deleted > 0 {
        tracing::info!(id = %id, "flashcard deleted");
    }
    Ok(deleted > 0)
}

/// Load the raw stored review state and its version.
pub fn load_review_state(
    conn: &Connection,
    id: &str,
) -> StoreResult<Option<(StoredReviewState, i64)>> {
    let row = conn
        .query_row(
            &format!("SELECT {SELECT_COLUMNS} FROM flashcards WHERE id = ?1"),
            params![id],
            read_row,
        )
        .optional()?;
    Ok(row.map(|r| (r.stored, r.version)))
}

/// Persist `state` if the row is still at `expected_version`. Returns the new version.
pub fn save_review_state(
    conn: &Connection,
    id: &str,
    state: &ReviewState,
    expected_version: i64,
) -> StoreResult<i64> {
    let last_updated = format_timestamp(&state.last_updated);
    let changed = conn.execute(
        "UPDATE flashcards SET consecutive_correct_responses = ?1, difficulty_rating = ?2, \
         response_time = ?3, confidence_level = ?4, session_context = ?5, \
         next_presentation_at = ?6, last_updated = ?7, updated_at = ?7, version = version + 1 \
         WHERE id = ?8 AND version = ?9",
        params![
            state.consecutive_correct_responses as i64,
            state.difficulty_rating,
            state.response_time,
            state.confidence_level.unwrap_or(0),
            state.session_context,
            format_timestamp(&state.next_presentation_timestamp),
            last_updated,
            id,
            expected_version,
        ],
    )?;

    if changed == 0 {
        let exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM flashcards WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(StoreError::NotFound(id.to_string()));
        }
        tracing::warn!(id = %id, expected_version, "review state version conflict");
        return Err(StoreError::VersionConflict {
            id: id.to_string(),
            expected: expected_version,
        });
    }

    Ok(expected_version + 1)
}

/// Apply one interaction to a flashcard and record it in analytics, atomically.
///
/// Invalid input is rejected before anything is written.
pub fn record_interaction(
    conn: &mut Connection,
    flashcard_id: &str,
    user_id: &str,
    event: &InteractionEvent,
    now: DateTime<Utc>,
) -> StoreResult<InteractionOutcome> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let (stored, version) = load_review_state(&tx, flashcard_id)?
        .ok_or_else(|| StoreError::NotFound(flashcard_id.to_string()))?;
    let previous = stored.normalize(now);
    let updated = engine::compute_next_state(event, &previous, now)?;

    let version = save_review_state(&tx, flashcard_id, &updated, version)?;

    let record = analytics::record_analytics(
        &tx,
        &NewAnalyticsRecord {
            user_id: user_id.to_string(),
            flashcard_id: flashcard_id.to_string(),
            interaction_timestamp: event.timestamp,
            response_time: event.response_time,
            correctness: event.response_correctness,
        },
    )?;

    tx.commit()?;

    tracing::info!(
        id = %flashcard_id,
        user = %user_id,
        correct = event.response_correctness,
        difficulty_from = previous.difficulty_rating,
        difficulty_to = updated.difficulty_rating,
        next = %updated.next_presentation_timestamp,
        "interaction recorded"
    );

    Ok(InteractionOutcome {
        flashcard_id: flashcard_id.to_string(),
        previous,
        updated,
        version,
        analytics_id: record.id,
    })
}
