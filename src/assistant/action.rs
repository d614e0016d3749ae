use crate::error::{AppResult, Error};
use crate::utils::time::parse_utc;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Action object as the model writes it: a `type` tag plus loose fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionPayload {
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Tag written as `kind`; read only when `type` is missing
    #[serde(rename = "kind", default, skip_serializing)]
    pub fallback_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

/// Details for an event the assistant wants to create
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A validated instruction extracted from model output.
///
/// Serializes back to the same `{"type": ...}` shape the model produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "ActionPayload")]
pub enum CalendarAction {
    /// Message only, no calendar change
    Response,
    Create(NewEvent),
    Update {
        event_id: String,
        title: Option<String>,
        description: Option<String>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    },
    Delete {
        event_id: String,
    },
}

impl CalendarAction {
    /// The wire tag for this action
    pub fn kind(&self) -> &'static str {
        match self {
            CalendarAction::Response => "response",
            CalendarAction::Create(_) => "create",
            CalendarAction::Update { .. } => "update",
            CalendarAction::Delete { .. } => "delete",
        }
    }
}

impl TryFrom<ActionPayload> for CalendarAction {
    type Error = Error;

    fn try_from(payload: ActionPayload) -> AppResult<Self> {
        let tag = match payload.kind.trim() {
            "" => payload.fallback_kind.as_deref().unwrap_or_default().trim(),
            tag => tag,
        }
        .to_ascii_lowercase();

        match tag.as_str() {
            "response" => Ok(CalendarAction::Response),
            "create" => Ok(CalendarAction::Create(NewEvent {
                title: payload.title.unwrap_or_default(),
                description: payload.description.unwrap_or_default(),
                start: required_time("start", payload.start.as_deref())?,
                end: required_time("end", payload.end.as_deref())?,
            })),
            "update" => Ok(CalendarAction::Update {
                event_id: target(payload.event_id, "update")?,
                title: payload.title,
                description: payload.description,
                start: optional_time("start", payload.start.as_deref())?,
                end: optional_time("end", payload.end.as_deref())?,
            }),
            "delete" => Ok(CalendarAction::Delete {
                event_id: target(payload.event_id, "delete")?,
            }),
            _ => Err(Error::UnknownActionKind(tag.clone())),
        }
    }
}

impl From<CalendarAction> for ActionPayload {
    fn from(action: CalendarAction) -> Self {
        let kind = action.kind().to_string();
        match action {
            CalendarAction::Response => ActionPayload {
                kind,
                ..Default::default()
            },
            CalendarAction::Create(event) => ActionPayload {
                kind,
                title: Some(event.title),
                description: Some(event.description),
                start: Some(rfc3339(&event.start)),
                end: Some(rfc3339(&event.end)),
                event_id: None,
                fallback_kind: None,
            },
            CalendarAction::Update {
                event_id,
                title,
                description,
                start,
                end,
            } => ActionPayload {
                kind,
                title,
                description,
                start: start.as_ref().map(rfc3339),
                end: end.as_ref().map(rfc3339),
                event_id: Some(event_id),
                fallback_kind: None,
            },
            CalendarAction::Delete { event_id } => ActionPayload {
                kind,
                event_id: Some(event_id),
                ..Default::default()
            },
        }
    }
}

fn rfc3339(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn target(event_id: Option<String>, kind: &'static str) -> AppResult<String> {
    event_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or(Error::MissingTarget(kind))
}

fn required_time(field: &str, value: Option<&str>) -> AppResult<DateTime<Utc>> {
    optional_time(field, value)?
        .ok_or_else(|| Error::InvalidAction(format!("missing '{}' time", field)))
}

fn optional_time(field: &str, value: Option<&str>) -> AppResult<Option<DateTime<Utc>>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => parse_utc(raw).map(Some).ok_or_else(|| {
            Error::InvalidAction(format!("'{}' is not an RFC 3339 time: {}", field, raw))
        }),
        None => Ok(None),
    }
}
