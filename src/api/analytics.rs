use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiJson, AppState, UserId};
use crate::review::analytics::{self, AnalyticsRecord, AnalyticsSummary, NewAnalyticsRecord};

/// Body of `POST /api/analytics`. The user comes from the request identity.
#[derive(Debug, Deserialize)]
pub struct RecordAnalyticsParams {
    pub flashcard_id: String,
    pub response_time: f64,
    pub correctness: bool,
    pub interaction_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsList {
    pub analytics: Vec<AnalyticsRecord>,
}

pub async fn record_analytics(
    State(state): State<AppState>,
    UserId(user): UserId,
    ApiJson(params): ApiJson<RecordAnalyticsParams>,
) -> Result<(StatusCode, Json<AnalyticsRecord>), ApiError> {
    let record = NewAnalyticsRecord {
        user_id: user,
        flashcard_id: params.flashcard_id,
        interaction_timestamp: params.interaction_timestamp.unwrap_or_else(Utc::now),
        response_time: params.response_time,
        correctness: params.correctness,
    };
    let stored = state
        .with_db(move |conn| analytics::record_analytics(conn, &record))
        .await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

pub async fn list_analytics(
    State(state): State<AppState>,
    UserId(user): UserId,
) -> Result<Json<AnalyticsList>, ApiError> {
    let records = state
        .with_db(move |conn| analytics::list_for_user(conn, &user))
        .await?;
    Ok(Json(AnalyticsList { analytics: records }))
}

pub async fn summary(
    State(state): State<AppState>,
    UserId(user): UserId,
) -> Result<Json<AnalyticsSummary>, ApiError> {
    let summary = state
        .with_db(move |conn| analytics::user_summary(conn, &user))
        .await?;
    Ok(Json(summary))
}
