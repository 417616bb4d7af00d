mod cli;

use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use flashdeck::{config, server};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flashdeck", version, about = "Flashcard study service with spaced repetition")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the JSON API server
    Serve,
    /// Record one answer to a flashcard and print the new schedule
    #[command(group(ArgGroup::new("outcome").required(true).args(["correct", "incorrect"])))]
    Interact {
        /// Flashcard id
        id: String,
        /// The answer was right
        #[arg(long)]
        correct: bool,
        /// The answer was wrong
        #[arg(long)]
        incorrect: bool,
        /// Time taken to answer, in milliseconds
        #[arg(long)]
        response_time: f64,
        /// Self-reported confidence (1-5)
        #[arg(long)]
        confidence: Option<i64>,
        /// User recorded in analytics
        #[arg(long, default_value = "cli")]
        user: String,
    },
    /// Show interaction statistics for a user
    Stats {
        #[arg(long)]
        user: String,
    },
    /// Export all flashcards and analytics as JSON to stdout
    Export,
    /// Check database health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = config::FlashdeckConfig::load()?;

    // Log to stderr so stdout stays clean for `export`.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => {
            server::serve_http(config).await?;
        }
        Command::Interact {
            id,
            correct,
            incorrect: _,
            response_time,
            confidence,
            user,
        } => {
            cli::interact::interact(&config, &id, correct, response_time, confidence, &user)?;
        }
        Command::Stats { user } => cli::stats::stats(&config, &user)?,
        Command::Export => cli::export::export(&config)?,
        Command::Doctor => cli::doctor::doctor(&config)?,
    }

    Ok(())
}
