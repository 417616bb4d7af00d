//! Interaction audit trail and per-user summaries.
//!
//! Analytics entries are raw facts (who answered which card, when, how fast, whether
//! correctly). They are written alongside every interaction and never derived from
//! review state.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::store::{StoreError, StoreResult};
use crate::db::{format_timestamp, parse_timestamp};

/// One analytics row, matching the `analytics` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsRecord {
    pub id: String,
    pub user_id: String,
    pub flashcard_id: String,
    pub interaction_timestamp: DateTime<Utc>,
    /// Milliseconds.
    pub response_time: f64,
    pub correctness: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAnalyticsRecord {
    pub user_id: String,
    pub flashcard_id: String,
    pub interaction_timestamp: DateTime<Utc>,
    pub response_time: f64,
    pub correctness: bool,
}

/// Per-flashcard slice of an [`AnalyticsSummary`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlashcardBreakdown {
    pub interactions: u64,
    pub correct: u64,
    pub mean_response_time: f64,
}

/// Aggregate view of a user's interactions (dashboard data).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    pub user_id: String,
    pub total_interactions: u64,
    pub correct_interactions: u64,
    /// Fraction in `[0, 1]`; zero when there are no interactions.
    pub accuracy: f64,
    pub mean_response_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_interaction: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_interaction: Option<DateTime<Utc>>,
    pub by_flashcard: BTreeMap<String, FlashcardBreakdown>,
}

/// Insert an analytics entry.
pub fn record_analytics(conn: &Connection, record: &NewAnalyticsRecord) -> StoreResult<AnalyticsRecord> {
    if record.user_id.trim().is_empty() {
        return Err(StoreError::Validation("user_id must not be empty".into()));
    }
    if record.flashcard_id.trim().is_empty() {
        return Err(StoreError::Validation("flashcard_id must not be empty".into()));
    }
    if !record.response_time.is_finite() || record.response_time < 0.0 {
        return Err(StoreError::Validation(format!(
            "response_time must be a finite, non-negative number, got {}",
            record.response_time
        )));
    }

    let id = uuid::Uuid::now_v7().to_string();
    conn.execute(
        "INSERT INTO analytics (id, user_id, flashcard_id, interaction_timestamp, response_time, correctness) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id,
            record.user_id,
            record.flashcard_id,
            format_timestamp(&record.interaction_timestamp),
            record.response_time,
            record.correctness,
        ],
    )?;

    tracing::debug!(
        id = %id,
        user = %record.user_id,
        flashcard = %record.flashcard_id,
        "analytics recorded"
    );

    Ok(AnalyticsRecord {
        id,
        user_id: record.user_id.clone(),
        flashcard_id: record.flashcard_id.clone(),
        interaction_timestamp: record.interaction_timestamp,
        response_time: record.response_time,
        correctness: record.correctness,
    })
}

fn read_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<AnalyticsRecord> {
    let id: String = row.get(0)?;
    let ts: String = row.get(3)?;
    let interaction_timestamp = parse_timestamp(&ts).unwrap_or_else(|| {
        tracing::warn!(id = %id, value = %ts, "unparseable interaction_timestamp");
        DateTime::<Utc>::default()
    });
    Ok(AnalyticsRecord {
        id,
        user_id: row.get(1)?,
        flashcard_id: row.get(2)?,
        interaction_timestamp,
        response_time: row.get(4)?,
        correctness: row.get(5)?,
    })
}

/// All of a user's entries, oldest first.
pub fn list_for_user(conn: &Connection, user_id: &str) -> StoreResult<Vec<AnalyticsRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, flashcard_id, interaction_timestamp, response_time, correctness \
         FROM analytics WHERE user_id = ?1 ORDER BY interaction_timestamp, id",
    )?;
    let records = stmt
        .query_map(params![user_id], read_record)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

/// Every entry in the database, oldest first.
pub fn list_all(conn: &Connection) -> StoreResult<Vec<AnalyticsRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, flashcard_id, interaction_timestamp, response_time, correctness \
         FROM analytics ORDER BY interaction_timestamp, id",
    )?;
    let records = stmt
        .query_map([], read_record)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

/// Aggregate a user's entries.
pub fn user_summary(conn: &Connection, user_id: &str) -> StoreResult<AnalyticsSummary> {
    Ok(summarize(user_id, &list_for_user(conn, user_id)?))
}

/// Pure aggregation over already-loaded records.
pub fn summarize(user_id: &str, records: &[AnalyticsRecord]) -> AnalyticsSummary {
    let total = records.len() as u64;
    let correct = records.iter().filter(|r| r.correctness).count() as u64;
    let time_sum: f64 = records.iter().map(|r| r.response_time).sum();

    let mut sums: BTreeMap<String, (FlashcardBreakdown, f64)> = BTreeMap::new();
    for r in records {
        let (entry, sum) = sums.entry(r.flashcard_id.clone()).or_default();
        entry.interactions += 1;
        if r.correctness {
            entry.correct += 1;
        }
        *sum += r.response_time;
    }
    let by_flashcard = sums
        .into_iter()
        .map(|(id, (mut b, sum))| {
            b.mean_response_time = sum / b.interactions as f64;
            (id, b)
        })
        .collect();

    AnalyticsSummary {
        user_id: user_id.to_string(),
        total_interactions: total,
        correct_interactions: correct,
        accuracy: if total == 0 { 0.0 } else { correct as f64 / total as f64 },
        mean_response_time: if total == 0 { 0.0 } else { time_sum / total as f64 },
        first_interaction: records.iter().map(|r| r.interaction_timestamp).min(),
        last_interaction: records.iter().map(|r| r.interaction_timestamp).max(),
        by_flashcard,
    }
}
