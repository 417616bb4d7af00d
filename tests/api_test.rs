mod helpers;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use flashdeck::api::{router, AppState, USER_HEADER};
use flashdeck::config::FlashdeckConfig;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    router(AppState::new(helpers::test_db(), FlashdeckConfig::default()))
}

fn request(method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(USER_HEADER, user);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create(app: &Router, subject: &str) -> String {
    let body = json!({
        "question": "Largest planet?",
        "options": ["Mars", "Jupiter"],
        "correct_answer": 1,
        "subject": subject,
    });
    let (status, value) = send(app, request("POST", "/api/flashcards", Some("alice"), Some(body))).await;
    assert_eq!(status, StatusCode::CREATED);
    value["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_open() {
    let (status, value) = send(&app(), request("GET", "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["status"], "ok");
}

#[tokio::test]
async fn missing_user_is_unauthorized() {
    let (status, value) = send(&app(), request("GET", "/api/flashcards", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(value["error"].is_string());
}

#[tokio::test]
async fn create_then_fetch() {
    let app = app();
    let id = create(&app, "astronomy").await;

    let (status, value) =
        send(&app, request("GET", &format!("/api/flashcards/{id}"), Some("alice"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["subject"], "astronomy");
    assert_eq!(value["review"]["difficulty_rating"], 1);
    assert_eq!(value["review"]["consecutive_correct_responses"], 0);
}

#[tokio::test]
async fn create_with_bad_answer_index_is_bad_request() {
    let body = json!({
        "question": "q",
        "options": ["a"],
        "correct_answer": 3,
        "subject": "s",
    });
    let (status, _) = send(&app(), request("POST", "/api/flashcards", Some("alice"), Some(body))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_filters_and_paginates() {
    let app = app();
    create(&app, "math").await;
    create(&app, "math").await;
    create(&app, "art").await;

    let (status, value) = send(
        &app,
        request("GET", "/api/flashcards?subject=math&page=1&limit=1", Some("alice"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["flashcards"].as_array().unwrap().len(), 1);
    assert_eq!(value["total_pages"], 2);
    assert_eq!(value["current_page"], 1);
}

#[tokio::test]
async fn update_and_delete() {
    let app = app();
    let id = create(&app, "math").await;
    let uri = format!("/api/flashcards/{id}");

    let (status, value) = send(
        &app,
        request("PUT", &uri, Some("alice"), Some(json!({ "subject": "physics" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["subject"], "physics");

    let (status, _) = send(&app, request("DELETE", &uri, Some("alice"), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, request("GET", &uri, Some("alice"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, request("DELETE", &uri, Some("alice"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn interact_schedules_and_records_analytics() {
    let app = app();
    let id = create(&app, "astronomy").await;

    let body = json!({
        "response_correctness": false,
        "response_time": 2500,
        "confidence_level": 2,
        "timestamp": "2024-03-01T12:00:00Z",
    });
    let (status, value) = send(
        &app,
        request("POST", &format!("/api/flashcards/{id}/interact"), Some("alice"), Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["correct"], false);
    assert_eq!(value["difficulty_rating"], 2);
    assert_eq!(value["consecutive_correct_responses"], 0);

    let next: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(value["next_presentation_timestamp"].clone()).unwrap();
    assert_eq!(next, helpers::t0() + chrono::Duration::hours(16));

    let (status, value) = send(&app, request("GET", "/api/analytics", Some("alice"), None)).await;
    assert_eq!(status, StatusCode::OK);
    let records = value["analytics"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["flashcard_id"], id.as_str());
    assert_eq!(records[0]["correctness"], false);

    // Another user sees nothing
    let (_, value) = send(&app, request("GET", "/api/analytics", Some("bob"), None)).await;
    assert!(value["analytics"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn interact_rejects_negative_response_time() {
    let app = app();
    let id = create(&app, "astronomy").await;

    let body = json!({ "response_correctness": true, "response_time": -1 });
    let (status, value) = send(
        &app,
        request("POST", &format!("/api/flashcards/{id}/interact"), Some("alice"), Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(value["error"].as_str().unwrap().contains("response_time"));
}

#[tokio::test]
async fn interact_with_unknown_card_is_not_found() {
    let body = json!({ "response_correctness": true, "response_time": 100 });
    let (status, _) = send(
        &app(),
        request("POST", "/api/flashcards/missing/interact", Some("alice"), Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn analytics_post_and_summary() {
    let app = app();
    for (ms, correct) in [(100, true), (300, false)] {
        let body = json!({ "flashcard_id": "c1", "response_time": ms, "correctness": correct });
        let (status, value) =
            send(&app, request("POST", "/api/analytics", Some("alice"), Some(body))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(value["user_id"], "alice");
    }

    let (status, value) =
        send(&app, request("GET", "/api/analytics/summary", Some("alice"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["total_interactions"], 2);
    assert_eq!(value["correct_interactions"], 1);
    assert_eq!(value["accuracy"], 0.5);
    assert_eq!(value["mean_response_time"], 200.0);
}

#[tokio::test]
async fn interact_with_missing_field_is_bad_request() {
    let app = app();
    let id = create(&app, "astronomy").await;

    let body = json!({ "response_correctness": true });
    let (status, value) = send(
        &app,
        request("POST", &format!("/api/flashcards/{id}/interact"), Some("alice"), Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(value["error"].as_str().unwrap().contains("response_time"));
}

#[tokio::test]
async fn malformed_json_body_is_bad_request() {
    let app = app();
    let req = Request::builder()
        .method("POST")
        .uri("/api/flashcards")
        .header(USER_HEADER, "alice")
        .header("content-type", "application/json")
        .body(Body::from("{\"question\": "))
        .unwrap();
    let (status, value) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(value["error"].is_string());
}

#[tokio::test]
async fn negative_page_is_bad_request() {
    let (status, value) =
        send(&app(), request("GET", "/api/flashcards?page=-1", Some("alice"), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(value["error"].is_string());
}

#[tokio::test]
async fn interact_drops_out_of_range_confidence() {
    let app = app();
    let id = create(&app, "astronomy").await;

    let body = json!({
        "response_correctness": true,
        "response_time": 900.0,
        "confidence_level": 9,
    });
    let (status, value) = send(
        &app,
        request("POST", &format!("/api/flashcards/{id}/interact"), Some("alice"), Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["consecutive_correct_responses"], 1);

    let (status, value) =
        send(&app, request("GET", &format!("/api/flashcards/{id}"), Some("alice"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(value["review"]["confidence_level"].is_null());
    assert_eq!(value["review"]["consecutive_correct_responses"], 1);
}
