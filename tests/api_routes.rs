mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use calendar_assistant::calendar::EventStore;
use common::{app, event_at, seeded_store, utc, FailingStore, ScriptedProvider};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn send(app: Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if body.is_some() {
        request = request.header(header::CONTENT_TYPE, "application/json");
    }
    let request = request
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

#[tokio::test]
async fn test_health_route() {
    let (status, body) = send(app(seeded_store(vec![]), ScriptedProvider::new(&[])), "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("Server is running! Try /api/events"));
}

#[tokio::test]
async fn test_chat_create_echoes_message_and_action() {
    let store = seeded_store(vec![]);
    let provider = ScriptedProvider::new(&[
        r#"{"message": "Added!", "action": {"type": "create", "title": "Dentist", "description": "", "start": "2025-01-02T20:00:00Z", "end": "2025-01-02T21:00:00Z"}}"#,
    ]);

    let (status, body) = send(
        app(Arc::clone(&store), provider),
        "POST",
        "/api/chat",
        Some(r#"{"message": "Book a dentist appointment tomorrow at 3pm", "timezone": "EST"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "message": "Added!",
            "action": {
                "type": "create",
                "title": "Dentist",
                "description": "",
                "start": "2025-01-02T20:00:00Z",
                "end": "2025-01-02T21:00:00Z"
            }
        })
    );

    let events = store.list_events().await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].start, utc(2025, 1, 2, 20, 0));
}

#[tokio::test]
async fn test_chat_plain_text_omits_action() {
    let (status, body) = send(
        app(seeded_store(vec![]), ScriptedProvider::new(&["Nothing planned."])),
        "POST",
        "/api/chat",
        Some(r#"{"message": "Anything tomorrow?"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Nothing planned." }));
}

#[tokio::test]
async fn test_chat_rejects_bad_body() {
    for body in ["not json", r#"{"timezone": "EST"}"#] {
        let (status, value) = send(
            app(seeded_store(vec![]), ScriptedProvider::new(&[])),
            "POST",
            "/api/chat",
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
        assert_eq!(value["error"], "Invalid request body");
    }
}

#[tokio::test]
async fn test_chat_not_found_keeps_message() {
    let provider = ScriptedProvider::new(&[
        r#"{"message": "Moved it", "action": {"type": "update", "event_id": "ghost", "title": "X"}}"#,
    ]);

    let (status, body) = send(
        app(seeded_store(vec![]), provider),
        "POST",
        "/api/chat",
        Some(r#"{"message": "Move ghost"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Event not found: ghost");
    assert_eq!(body["message"], "Moved it");
}

#[tokio::test]
async fn test_chat_provider_failure_is_500() {
    let (status, body) = send(
        app(seeded_store(vec![]), ScriptedProvider::new(&[])),
        "POST",
        "/api/chat",
        Some(r#"{"message": "Hello"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("no scripted reply left"));
    assert!(body.get("message").is_none());
}

#[tokio::test]
async fn test_event_crud_round() {
    let store = seeded_store(vec![event_at("Standup", "Daily sync", 9)]);
    let provider = ScriptedProvider::new(&[]);
    let router = app(Arc::clone(&store), provider);

    let (status, body) = send(router.clone(), "GET", "/api/events", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Standup");
    assert!(body[0].get("createdAt").is_some());

    let (status, created) = send(
        router.clone(),
        "POST",
        "/api/events",
        Some(r#"{"id": "ignored", "title": "Lunch", "start": "2025-01-01T12:00:00Z", "end": "2025-01-01T13:00:00Z"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(created["id"], "ignored");
    assert_eq!(created["color"], "var(--tokyo-purple)");
    assert_eq!(created["description"], "");
    let id = created["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        router.clone(),
        "PUT",
        &format!("/api/events/{}", id),
        Some(r#"{"title": "Long lunch", "color": "var(--tokyo-green)"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Long lunch");
    assert_eq!(updated["color"], "var(--tokyo-green)");
    assert_eq!(updated["start"], "2025-01-01T12:00:00Z");

    let (status, _) = send(router.clone(), "DELETE", &format!("/api/events/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(router.clone(), "DELETE", &format!("/api/events/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Event not found");

    let (_, body) = send(router, "GET", "/api/events", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(store.all_rows().await.len(), 2);
}

#[tokio::test]
async fn test_event_update_errors() {
    let router = app(seeded_store(vec![]), ScriptedProvider::new(&[]));

    let (status, _) = send(router.clone(), "PUT", "/api/events/missing", Some(r#"{"title": "X"}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(router, "POST", "/api/events", Some(r#"{"title": "No times"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Failed to parse request body");
}

#[tokio::test]
async fn test_chat_store_failure_is_500_without_message() {
    let provider = ScriptedProvider::new(&[
        r#"{"message": "Gone!", "action": {"type": "delete", "event_id": "abc"}}"#,
    ]);

    let (status, body) = send(
        app(FailingStore::writes(), provider),
        "POST",
        "/api/chat",
        Some(r#"{"message": "Cancel abc"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Event store error: disk full");
    assert!(body.get("message").is_none());
}

#[tokio::test]
async fn test_event_routes_surface_store_failure() {
    let router = app(FailingStore::everything(), ScriptedProvider::new(&[]));

    let (status, body) = send(router.clone(), "GET", "/api/events", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Event store error: connection refused");

    let (status, _) = send(router, "DELETE", "/api/events/abc", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
