//! Spaced-repetition metrics engine.
//!
//! [`compute_next_state`] is a pure function: given a flashcard's current
//! [`ReviewState`], one [`InteractionEvent`] and the current time, it returns the
//! next state. Difficulty moves along a five-rung ladder (down one on a correct
//! answer, up one on a miss, saturating at both ends) and the next presentation is
//! scheduled `2^difficulty * 4` hours after the interaction:
//!
//! | Difficulty | Delay |
//! |------------|-------|
//! | 1 | 8h |
//! | 2 | 16h |
//! | 3 | 32h |
//! | 4 | 64h |
//! | 5 | 128h |
//!
//! No I/O, no clock reads, no logging. Callers pass `now` in.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use super::types::{
    clamp_difficulty, valid_confidence, InteractionEvent, ReviewState, StoredReviewState,
    MAX_DIFFICULTY, MIN_DIFFICULTY,
};

/// Base interval multiplied by `2^difficulty`.
const BASE_DELAY_HOURS: i64 = 4;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        field: &'static str,
        reason: String,
    },
}

/// Delay before a card at `difficulty` is shown again. Out-of-range input is clamped.
pub fn presentation_delay(difficulty: u8) -> Duration {
    let d = clamp_difficulty(difficulty as i64);
    Duration::hours((1i64 << d) * BASE_DELAY_HOURS)
}

/// Compute the review state that follows `event`.
///
/// Fails only when `event.response_time` is negative or not finite, or when the
/// scheduled timestamp would fall outside the representable range. On failure
/// nothing is produced; `current` is never modified.
pub fn compute_next_state(
    event: &InteractionEvent,
    current: &ReviewState,
    now: DateTime<Utc>,
) -> Result<ReviewState, MetricsError> {
    validate_response_time(event.response_time)?;

    let difficulty = clamp_difficulty(current.difficulty_rating as i64);
    let (streak, difficulty) = if event.response_correctness {
        (
            current.consecutive_correct_responses.saturating_add(1),
            difficulty.saturating_sub(1).max(MIN_DIFFICULTY),
        )
    } else {
        (0, (difficulty + 1).min(MAX_DIFFICULTY))
    };

    let next_presentation_timestamp = event
        .timestamp
        .checked_add_signed(presentation_delay(difficulty))
        .ok_or_else(|| MetricsError::InvalidInput {
            field: "timestamp",
            reason: "next presentation falls outside the supported time range".into(),
        })?;

    Ok(ReviewState {
        consecutive_correct_responses: streak,
        difficulty_rating: difficulty,
        response_time: event.response_time,
        confidence_level: valid_confidence(event.confidence_level.map(i64::from)),
        session_context: format!("Updated on {}", now.to_rfc3339()),
        next_presentation_timestamp,
        last_updated: now,
    })
}

/// Normalize a possibly-legacy stored state, then compute the next state.
pub fn compute_next_state_from_stored(
    event: &InteractionEvent,
    stored: &StoredReviewState,
    now: DateTime<Utc>,
) -> Result<ReviewState, MetricsError> {
    compute_next_state(event, &stored.normalize(now), now)
}

fn validate_response_time(response_time: f64) -> Result<(), MetricsError> {
    if !response_time.is_finite() {
        return Err(MetricsError::InvalidInput {
            field: "response_time",
            reason: format!("must be a finite number, got {response_time}"),
        });
    }
    if response_time < 0.0 {
        return Err(MetricsError::InvalidInput {
            field: "response_time",
            reason: format!("must not be negative, got {response_time}"),
        });
    }
    Ok(())
}
