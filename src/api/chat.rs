use super::{ApiError, AppState};
use crate::assistant::{ActionOutcome, CalendarAction};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Body of `POST /api/chat`
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Successful chat reply
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<CalendarAction>,
}

/// Handler for one chat turn
pub async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        warn!("Rejected chat request: {}", e);
        ApiError::bad_request("Invalid request body")
    })?;

    info!(
        "Chat turn via {} (timezone: {:?})",
        state.assistant.provider_name(),
        request.timezone
    );

    let turn = state
        .assistant
        .query(&request.message, request.timezone.as_deref())
        .await?;

    if let Some(ActionOutcome::NotFound { event_id }) = &turn.outcome {
        warn!("Assistant targeted missing event {}", event_id);
        return Err(ApiError::not_found(format!("Event not found: {}", event_id))
            .with_message(turn.reply.message));
    }

    Ok(Json(ChatResponse {
        message: turn.reply.message,
        action: turn.reply.action,
    }))
}
