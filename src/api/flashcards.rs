use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiJson, ApiQuery, AppState, UserId};
use crate::review::store::{self, FlashcardPage};
use crate::review::types::{valid_confidence, Flashcard, FlashcardUpdate, InteractionEvent, NewFlashcard};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub subject: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Body of `POST /api/flashcards/{id}/interact`.
#[derive(Debug, Deserialize)]
pub struct InteractParams {
    pub response_correctness: bool,
    /// Milliseconds.
    pub response_time: f64,
    /// 1-5. Anything else is ignored.
    pub confidence_level: Option<i64>,
    /// Defaults to the time the request was received.
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct InteractResponse {
    pub message: &'static str,
    pub correct: bool,
    pub difficulty_rating: u8,
    pub consecutive_correct_responses: u32,
    pub next_presentation_timestamp: DateTime<Utc>,
}

pub async fn create_flashcard(
    State(state): State<AppState>,
    _user: UserId,
    ApiJson(card): ApiJson<NewFlashcard>,
) -> Result<(StatusCode, Json<Flashcard>), ApiError> {
    let baseline = state.config.review.baseline();
    let created = state
        .with_db(move |conn| store::create_flashcard(conn, &card, baseline, Utc::now()))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_flashcards(
    State(state): State<AppState>,
    _user: UserId,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<FlashcardPage>, ApiError> {
    let page = params.page.unwrap_or(1);
    let limit = params.limit.unwrap_or(state.config.review.page_size);
    let subject = params.subject.filter(|s| !s.is_empty());
    let result = state
        .with_db(move |conn| store::list_flashcards(conn, subject.as_deref(), page, limit))
        .await?;
    Ok(Json(result))
}

pub async fn get_flashcard(
    State(state): State<AppState>,
    _user: UserId,
    Path(id): Path<String>,
) -> Result<Json<Flashcard>, ApiError> {
    let lookup = id.clone();
    state
        .with_db(move |conn| store::get_flashcard(conn, &lookup))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("flashcard not found: {id}")))
}

pub async fn update_flashcard(
    State(state): State<AppState>,
    _user: UserId,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<FlashcardUpdate>,
) -> Result<Json<Flashcard>, ApiError> {
    let lookup = id.clone();
    state
        .with_db(move |conn| store::update_flashcard(conn, &lookup, &update, Utc::now()))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("flashcard not found: {id}")))
}

pub async fn delete_flashcard(
    State(state): State<AppState>,
    _user: UserId,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let lookup = id.clone();
    let deleted = state
        .with_db(move |conn| store::delete_flashcard(conn, &lookup))
        .await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("flashcard not found: {id}")))
    }
}

pub async fn interact(
    State(state): State<AppState>,
    UserId(user): UserId,
    Path(id): Path<String>,
    ApiJson(params): ApiJson<InteractParams>,
) -> Result<Json<InteractResponse>, ApiError> {
    let received = Utc::now();
    let event = InteractionEvent {
        response_correctness: params.response_correctness,
        response_time: params.response_time,
        confidence_level: valid_confidence(params.confidence_level),
        timestamp: params.timestamp.unwrap_or(received),
    };

    tracing::info!(id = %id, user = %user, correct = event.response_correctness, "interact called");

    let outcome = state
        .with_db(move |conn| store::record_interaction(conn, &id, &user, &event, received))
        .await?;

    Ok(Json(InteractResponse {
        message: "Flashcard interaction recorded successfully",
        correct: params.response_correctness,
        difficulty_rating: outcome.updated.difficulty_rating,
        consecutive_correct_responses: outcome.updated.consecutive_correct_responses,
        next_presentation_timestamp: outcome.updated.next_presentation_timestamp,
    }))
}
