//! CLI `doctor` command: run database diagnostics and print a health report.

use anyhow::{Context, Result};

use flashdeck::config::FlashdeckConfig;
use flashdeck::db;

/// Run database diagnostics and print a health report.
pub fn doctor(config: &FlashdeckConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Run `flashdeck serve` to initialize.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path)
        .map(|m| m.len())
        .unwrap_or(0);

    let conn = db::open_database(&db_path)
        .context("failed to open database (may be corrupt)")?;

    let report = db::check_database_health(&conn)
        .context("failed to run health check")?;

    println!("Flashdeck Health Report");
    println!("=======================");
    println!();
    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!(
        "Schema version:    {} (expected {})",
        report.schema_version,
        db::migrations::CURRENT_SCHEMA_VERSION
    );
    println!();
    println!("Row counts:");
    println!("  Flashcards:      {}", report.flashcard_count);
    println!("  Analytics:       {}", report.analytics_count);
    println!();
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
        println!();
        println!("Recovery steps:");
        println!("  1. Restore from a backup: cp backup.db ~/.flashdeck/flashdeck.db");
        println!("  2. Or export what is still readable: flashdeck export > backup.json");
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
