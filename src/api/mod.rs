pub mod chat;
pub mod events;

use crate::assistant::Assistant;
use crate::calendar::EventStore;
use crate::error::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Chat bridge to the language model
    pub assistant: Assistant,
    /// Event storage used by the CRUD endpoints
    pub store: Arc<dyn EventStore>,
}

impl AppState {
    pub fn new(assistant: Assistant, store: Arc<dyn EventStore>) -> Self {
        Self { assistant, store }
    }
}

/// Build the HTTP router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/api/chat", post(chat::chat_handler))
        .route(
            "/api/events",
            get(events::list_events_handler).post(events::create_event_handler),
        )
        .route(
            "/api/events/{id}",
            put(events::update_event_handler).delete(events::delete_event_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handler for the liveness check
pub async fn health_handler() -> &'static str {
    "Server is running! Try /api/events"
}

/// Standard API error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Assistant text that accompanied a failed action, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// An error that renders as `{ "error": ... }` with a status code
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: error.into(),
                message: None,
            },
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error)
    }

    /// Attach the assistant's message to the error body
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.body.message = Some(message.into());
        self
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        error!("Request failed: {}", err);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
