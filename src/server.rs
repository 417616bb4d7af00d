//! HTTP server initialization.
//!
//! [`serve_http`] opens the database, builds the API router and runs it until
//! ctrl-c.

use anyhow::{Context, Result};

use crate::api::{self, AppState};
use crate::config::FlashdeckConfig;
use crate::db;

/// Shared setup: open DB and wrap it with the config for the handlers.
pub fn setup_state(config: FlashdeckConfig) -> Result<AppState> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");
    Ok(AppState::new(conn, config))
}

/// Start the JSON API over HTTP.
pub async fn serve_http(config: FlashdeckConfig) -> Result<()> {
    let bind_addr = config.bind_addr();
    tracing::info!(addr = %bind_addr, "starting flashdeck HTTP server");

    let state = setup_state(config)?;
    let router = api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "listening at http://{bind_addr}/api");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    Ok(())
}
