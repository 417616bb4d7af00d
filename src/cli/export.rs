use anyhow::Result;
use serde::Serialize;

use flashdeck::config::FlashdeckConfig;
use flashdeck::review::analytics::{self, AnalyticsRecord};
use flashdeck::review::store::{self, MAX_PAGE_SIZE};
use flashdeck::review::types::Flashcard;

/// Export format: wraps all flashcards and analytics entries.
#[derive(Debug, Serialize)]
struct ExportData {
    flashcards: Vec<Flashcard>,
    analytics: Vec<AnalyticsRecord>,
}

/// Export all flashcards and analytics as JSON to stdout.
pub fn export(config: &FlashdeckConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = flashdeck::db::open_database(&db_path)?;

    let mut flashcards = Vec::new();
    let mut page = 1;
    loop {
        let batch = store::list_flashcards(&conn, None, page, MAX_PAGE_SIZE)?;
        flashcards.extend(batch.flashcards);
        if u64::from(page) >= batch.total_pages {
            break;
        }
        page += 1;
    }

    let data = ExportData {
        flashcards,
        analytics: analytics::list_all(&conn)?,
    };

    let json = serde_json::to_string_pretty(&data)?;
    println!("{json}");

    eprintln!(
        "Exported {} flashcards and {} analytics entries.",
        data.flashcards.len(),
        data.analytics.len()
    );

    Ok(())
}
