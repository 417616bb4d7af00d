//! JSON HTTP API.
//!
//! [`router`] builds the axum [`Router`] over an [`AppState`] (shared database
//! connection and config). Database work runs on the blocking pool behind a mutex,
//! which also serializes read-modify-write cycles on review state within a process.
//!
//! Authentication is handled upstream: the learner identity arrives in the
//! `x-user-id` header.

pub mod analytics;
pub mod flashcards;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::config::FlashdeckConfig;
use crate::review::{MetricsError, StoreError};

/// Header carrying the authenticated learner's id.
pub const USER_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: Arc<FlashdeckConfig>,
}

impl AppState {
    pub fn new(conn: Connection, config: FlashdeckConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            config: Arc::new(config),
        }
    }

    /// Run `f` against the database on the blocking pool.
    pub async fn with_db<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let mut conn = db
                .lock()
                .map_err(|e| ApiError::Internal(format!("db lock poisoned: {e}")))?;
            f(&mut *conn).map_err(ApiError::from)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("db task failed: {e}")))?
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/flashcards",
            post(flashcards::create_flashcard).get(flashcards::list_flashcards),
        )
        .route(
            "/api/flashcards/{id}",
            get(flashcards::get_flashcard)
                .put(flashcards::update_flashcard)
                .delete(flashcards::delete_flashcard),
        )
        .route("/api/flashcards/{id}/interact", post(flashcards::interact))
        .route(
            "/api/analytics",
            post(analytics::record_analytics).get(analytics::list_analytics),
        )
        .route("/api/analytics/summary", get(analytics::summary))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Authenticated learner id, taken from [`USER_HEADER`].
#[derive(Debug, Clone)]
pub struct UserId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for UserId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| UserId(v.to_string()))
            .ok_or(ApiError::Unauthorized)
    }
}

/// JSON body extractor whose rejections are reported as [`ApiError::BadRequest`].
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

/// Query-string extractor whose rejections are reported as [`ApiError::BadRequest`].
#[derive(Debug, Clone)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(ApiQuery(value))
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("user authentication required")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::NotFound(err.to_string()),
            StoreError::Validation(_) | StoreError::Metrics(MetricsError::InvalidInput { .. }) => {
                ApiError::BadRequest(err.to_string())
            }
            StoreError::VersionConflict { .. } => ApiError::Conflict(err.to_string()),
            StoreError::Database(_) | StoreError::Serialization(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }
        // Internal details stay in the log
        let message = match &self {
            ApiError::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
