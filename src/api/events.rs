use super::{ApiError, AppState};
use crate::calendar::{Event, EventChanges, DEFAULT_EVENT_COLOR};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

/// Body of `POST /api/events`. Any client-supplied id is ignored.
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub color: Option<String>,
}

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|e| {
        warn!("Rejected event request: {}", e);
        ApiError::bad_request("Failed to parse request body")
    })
}

/// GET /api/events - List live events
pub async fn list_events_handler(State(state): State<AppState>) -> Result<Json<Vec<Event>>, ApiError> {
    let events = state.store.list_events().await?;
    info!("Fetched {} events", events.len());
    Ok(Json(events))
}

/// POST /api/events - Create an event
pub async fn create_event_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let request = parse_body(payload)?;

    let event = Event::new(
        request.title,
        request.description,
        request.start,
        request.end,
        request.color.unwrap_or_else(|| DEFAULT_EVENT_COLOR.to_string()),
    );
    state.store.insert(event.clone()).await?;

    info!("Created event {}", event.id);
    Ok((StatusCode::CREATED, Json(event)))
}

/// PUT /api/events/{id} - Change some fields of an event
pub async fn update_event_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<EventChanges>, JsonRejection>,
) -> Result<Json<Event>, ApiError> {
    let changes = parse_body(payload)?;

    if state.store.update_fields(&id, changes).await? == 0 {
        return Err(ApiError::not_found("Event not found"));
    }

    // Deleted in between; report it like any other missing event
    let event = state
        .store
        .get_event(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;

    Ok(Json(event))
}

/// DELETE /api/events/{id} - Soft-delete an event
pub async fn delete_event_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.store.soft_delete(&id).await? == 0 {
        return Err(ApiError::not_found("Event not found"));
    }

    info!("Deleted event {}", id);
    Ok(StatusCode::NO_CONTENT)
}
