use super::models::Event;
use super::store::EventStore;
use crate::error::AppResult;
use crate::utils::time::{format_in_zone, resolve_timezone, DIGEST_END_FORMAT, DIGEST_START_FORMAT};
use std::fmt::Write;

/// First line of every schedule digest
pub const DIGEST_HEADER: &str = "Here are the current events:";

/// Read every live event and render the digest handed to the model.
///
/// Always hits the store; the digest is never cached between chat turns.
pub async fn schedule_digest(store: &dyn EventStore, timezone: Option<&str>) -> AppResult<String> {
    let events = store.list_events().await?;
    Ok(render_schedule(&events, timezone))
}

/// Render events as one line each, in the order given.
///
/// Times are shown in the caller's zone when the label is recognised,
/// otherwise in UTC.
pub fn render_schedule(events: &[Event], timezone: Option<&str>) -> String {
    let zone = resolve_timezone(timezone);

    let mut digest = String::with_capacity(64 + events.len() * 64);
    digest.push_str(DIGEST_HEADER);
    digest.push('\n');

    for event in events {
        // Writing to a String cannot fail
        let _ = writeln!(
            digest,
            "- {}: {} to {} ({})",
            event.title,
            format_in_zone(&event.start, zone, DIGEST_START_FORMAT),
            format_in_zone(&event.end, zone, DIGEST_END_FORMAT),
            event.description
        );
    }

    digest
}
