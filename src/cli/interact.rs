//! CLI `interact` command: record one answer and print the resulting schedule.

use anyhow::Result;
use chrono::Utc;

use flashdeck::config::FlashdeckConfig;
use flashdeck::review::store;
use flashdeck::review::types::{valid_confidence, InteractionEvent};

pub fn interact(
    config: &FlashdeckConfig,
    id: &str,
    correct: bool,
    response_time: f64,
    confidence: Option<i64>,
    user: &str,
) -> Result<()> {
    let db_path = config.resolved_db_path();
    let mut conn = flashdeck::db::open_database(&db_path)?;

    let now = Utc::now();
    let mut event = InteractionEvent::new(correct, response_time, now);
    event.confidence_level = valid_confidence(confidence);
    if confidence.is_some() && event.confidence_level.is_none() {
        eprintln!("Ignoring confidence outside 1-5.");
    }

    let outcome = store::record_interaction(&mut conn, id, user, &event, now)?;
    let before = &outcome.previous;
    let after = &outcome.updated;

    println!("Flashcard {id}");
    println!(
        "  Difficulty:    {} -> {}",
        before.difficulty_rating, after.difficulty_rating
    );
    println!(
        "  Streak:        {} -> {}",
        before.consecutive_correct_responses, after.consecutive_correct_responses
    );
    println!("  Next review:   {}", after.next_presentation_timestamp.to_rfc3339());

    Ok(())
}
