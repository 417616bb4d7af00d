//! Flashcard study service with a spaced-repetition metrics engine.
//!
//! Learners answer flashcards; each answer is fed through the metrics engine, which
//! moves the card along a five-rung difficulty ladder and schedules its next
//! presentation:
//!
//! | Outcome | Streak | Difficulty |
//! |---------|--------|------------|
//! | Correct | +1 | one rung easier (min 1) |
//! | Incorrect | reset to 0 | one rung harder (max 5) |
//!
//! The next presentation is `2^difficulty * 4` hours after the interaction.
//!
//! # Modules
//!
//! - [`review`]: the engine, review types, flashcard storage and analytics
//! - [`db`]: SQLite initialization, schema, migrations, and health checks
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`api`]: axum handlers for the JSON API
//! - [`server`]: HTTP server startup

pub mod api;
pub mod config;
pub mod db;
pub mod review;
pub mod server;
