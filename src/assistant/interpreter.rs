use super::action::{ActionPayload, CalendarAction};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Marker some local models put before their chain of thought
pub const REASONING_START: &str = "<think>";
/// Marker closing the chain of thought
pub const REASONING_END: &str = "</think>";
/// Shown when the model produced nothing usable at all
pub const EMPTY_REPLY_FALLBACK: &str =
    "Sorry, I couldn't come up with a response. Please try again.";

/// Parsed result of one model invocation
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantReply {
    /// Markdown text for the user, never empty
    pub message: String,
    pub action: Option<CalendarAction>,
}

/// The two-field object the model is asked to produce
#[derive(Debug, Deserialize)]
struct RawReply {
    message: String,
    #[serde(default)]
    action: Option<Value>,
}

/// Turn raw model text into a reply. Never fails: anything that does not
/// parse becomes a plain message without an action.
pub fn interpret(raw: &str) -> AssistantReply {
    let trimmed = raw.trim();

    for candidate in json_candidates(trimmed) {
        match serde_json::from_str::<RawReply>(candidate) {
            Ok(reply) => {
                return AssistantReply {
                    message: non_empty(reply.message),
                    action: reply.action.and_then(convert_action),
                };
            }
            Err(e) => debug!("Candidate did not parse as a reply: {}", e),
        }
    }

    warn!("Failed to parse JSON response, using raw text");
    debug!("Attempted to parse: {}", trimmed);

    AssistantReply {
        message: fallback_message(trimmed),
        action: None,
    }
}

/// Slices of the text worth trying as JSON, most likely first
fn json_candidates(text: &str) -> Vec<&str> {
    let mut candidates = Vec::with_capacity(4);

    // Whatever follows the closing marker comes first; braces written while
    // reasoning would otherwise open the span too early
    if let Some(pos) = text.rfind(REASONING_END) {
        let tail = strip_code_fence(text[pos + REASONING_END.len()..].trim());
        push_with_span(&mut candidates, tail);
    }

    let unfenced = strip_code_fence(text);
    if text.starts_with(REASONING_START) {
        // With a reasoning preamble only the braced span can be JSON
        if let Some(span) = brace_span(unfenced) {
            push_unique(&mut candidates, span);
        }
    } else {
        push_with_span(&mut candidates, unfenced);
    }

    candidates
}

fn push_with_span<'a>(candidates: &mut Vec<&'a str>, text: &'a str) {
    if !text.is_empty() {
        push_unique(candidates, text);
    }
    if let Some(span) = brace_span(text) {
        push_unique(candidates, span);
    }
}

fn push_unique<'a>(candidates: &mut Vec<&'a str>, text: &'a str) {
    if !candidates.contains(&text) {
        candidates.push(text);
    }
}

/// Text between the first `{` and the last `}`, inclusive
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Remove a surrounding ```json ... ``` or ``` ... ``` fence
fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```").and_then(|t| t.strip_suffix("```")) else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.trim()
}

/// Validate the action object; anything unusable is dropped with a warning
fn convert_action(value: Value) -> Option<CalendarAction> {
    let payload: ActionPayload = match serde_json::from_value(value) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Ignoring malformed action: {}", e);
            return None;
        }
    };

    match CalendarAction::try_from(payload) {
        Ok(action) => Some(action),
        Err(e) => {
            warn!("Ignoring action from model: {}", e);
            None
        }
    }
}

fn fallback_message(trimmed: &str) -> String {
    let text = trimmed.strip_prefix(REASONING_START).unwrap_or(trimmed);
    let text = text.strip_suffix(REASONING_END).unwrap_or(text).trim();
    non_empty(text.to_string())
}

fn non_empty(message: String) -> String {
    if message.trim().is_empty() {
        EMPTY_REPLY_FALLBACK.to_string()
    } else {
        message
    }
}
