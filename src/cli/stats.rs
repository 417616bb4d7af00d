use anyhow::Result;

use flashdeck::config::FlashdeckConfig;

/// Display a user's interaction statistics in the terminal.
pub fn stats(config: &FlashdeckConfig, user: &str) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = flashdeck::db::open_database(&db_path)?;

    let summary = flashdeck::review::analytics::user_summary(&conn, user)?;

    println!("Interaction Statistics for {user}");
    println!("{}", "=".repeat(40));
    println!("  Interactions:        {}", summary.total_interactions);
    println!("  Correct:             {}", summary.correct_interactions);
    println!("  Accuracy:            {:.1}%", summary.accuracy * 100.0);
    println!("  Mean response:       {:.0} ms", summary.mean_response_time);
    println!();

    if let Some(ref first) = summary.first_interaction {
        println!("First interaction:     {}", first.to_rfc3339());
    }
    if let Some(ref last) = summary.last_interaction {
        println!("Last interaction:      {}", last.to_rfc3339());
    }

    if !summary.by_flashcard.is_empty() {
        println!();
        println!("By Flashcard:");
        for (id, b) in &summary.by_flashcard {
            println!(
                "  {:<38} {:>4} answered  {:>4} correct  {:>7.0} ms",
                id, b.interactions, b.correct, b.mean_response_time
            );
        }
    }

    Ok(())
}
