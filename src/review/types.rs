//! Core review type definitions.
//!
//! Defines [`ReviewState`] (a flashcard's spaced-repetition record),
//! [`StoredReviewState`] (the same record as read back from storage, tolerant of
//! legacy rows), [`InteractionEvent`] (one learner response), and [`Flashcard`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Easiest difficulty rung.
pub const MIN_DIFFICULTY: u8 = 1;
/// Hardest difficulty rung.
pub const MAX_DIFFICULTY: u8 = 5;
/// Valid range for self-reported confidence.
pub const CONFIDENCE_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// Clamp any integer difficulty onto the `1..=5` ladder.
pub fn clamp_difficulty(value: i64) -> u8 {
    value.clamp(MIN_DIFFICULTY as i64, MAX_DIFFICULTY as i64) as u8
}

/// Keep a confidence value only if it lies in `1..=5`.
pub fn valid_confidence(value: Option<i64>) -> Option<u8> {
    value
        .and_then(|v| u8::try_from(v).ok())
        .filter(|v| CONFIDENCE_RANGE.contains(v))
}

/// Spaced-repetition state of one flashcard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    /// Correct answers in a row since the last miss.
    pub consecutive_correct_responses: u32,
    /// 1 (easiest) to 5 (hardest). Drives the review interval.
    pub difficulty_rating: u8,
    /// Latency of the most recent response, in milliseconds.
    pub response_time: f64,
    /// Self-reported confidence for the most recent response, if given.
    pub confidence_level: Option<u8>,
    /// Free-form annotation of the review session.
    pub session_context: String,
    /// When the flashcard becomes due again.
    pub next_presentation_timestamp: DateTime<Utc>,
    /// When this state was computed.
    pub last_updated: DateTime<Utc>,
}

impl ReviewState {
    /// State for a freshly created flashcard. Due immediately.
    pub fn initial(baseline_difficulty: u8, now: DateTime<Utc>) -> Self {
        Self {
            consecutive_correct_responses: 0,
            difficulty_rating: clamp_difficulty(baseline_difficulty as i64),
            response_time: 0.0,
            confidence_level: None,
            session_context: String::new(),
            next_presentation_timestamp: now,
            last_updated: now,
        }
    }

    /// Whether the flashcard should be shown again at `at`.
    pub fn is_due(&self, at: DateTime<Utc>) -> bool {
        self.next_presentation_timestamp <= at
    }
}

/// Review state as persisted. Every field may be missing in legacy rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredReviewState {
    pub consecutive_correct_responses: Option<i64>,
    pub difficulty_rating: Option<i64>,
    pub response_time: Option<f64>,
    pub confidence_level: Option<i64>,
    pub session_context: Option<String>,
    pub next_presentation_timestamp: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl StoredReviewState {
    /// Fill in documented defaults for missing or out-of-domain fields.
    ///
    /// Missing counters become zero, a missing (or legacy `0`) difficulty becomes 1,
    /// a confidence outside `1..=5` becomes absent, and missing timestamps fall back
    /// to `now`.
    pub fn normalize(&self, now: DateTime<Utc>) -> ReviewState {
        let difficulty = match self.difficulty_rating {
            Some(d) if d >= MIN_DIFFICULTY as i64 => clamp_difficulty(d),
            _ => MIN_DIFFICULTY,
        };
        let streak = self
            .consecutive_correct_responses
            .unwrap_or(0)
            .clamp(0, u32::MAX as i64) as u32;
        let response_time = self
            .response_time
            .filter(|t| t.is_finite() && *t >= 0.0)
            .unwrap_or(0.0);

        ReviewState {
            consecutive_correct_responses: streak,
            difficulty_rating: difficulty,
            response_time,
            confidence_level: valid_confidence(self.confidence_level),
            session_context: self.session_context.clone().unwrap_or_default(),
            next_presentation_timestamp: self.next_presentation_timestamp.unwrap_or(now),
            last_updated: self.last_updated.unwrap_or(now),
        }
    }
}

impl From<&ReviewState> for StoredReviewState {
    fn from(state: &ReviewState) -> Self {
        Self {
            consecutive_correct_responses: Some(state.consecutive_correct_responses as i64),
            difficulty_rating: Some(state.difficulty_rating as i64),
            response_time: Some(state.response_time),
            confidence_level: state.confidence_level.map(i64::from),
            session_context: Some(state.session_context.clone()),
            next_presentation_timestamp: Some(state.next_presentation_timestamp),
            last_updated: Some(state.last_updated),
        }
    }
}

/// One learner response to one flashcard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub response_correctness: bool,
    /// Milliseconds taken to answer.
    pub response_time: f64,
    pub confidence_level: Option<u8>,
    pub timestamp: DateTime<Utc>,
}

impl InteractionEvent {
    pub fn new(response_correctness: bool, response_time: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            response_correctness,
            response_time,
            confidence_level: None,
            timestamp,
        }
    }

    pub fn with_confidence(mut self, confidence_level: u8) -> Self {
        self.confidence_level = Some(confidence_level);
        self
    }
}

/// A flashcard with its review state, matching the `flashcards` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flashcard {
    /// UUID v7 primary key.
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options` of the right answer.
    pub correct_answer: usize,
    pub subject: String,
    pub review: ReviewState,
    /// Bumped on every write; used for optimistic concurrency.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a flashcard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFlashcard {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub subject: String,
}

/// Partial content update. Review state is never edited through this path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashcardUpdate {
    pub question: Option<String>,
    pub options: Option<Vec<String>>,
    pub correct_answer: Option<usize>,
    pub subject: Option<String>,
}
