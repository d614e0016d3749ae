use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;

/// Day and time format used for the start of an event in the schedule digest
pub const DIGEST_START_FORMAT: &str = "%a %b %-d %-I:%M %p";
/// Clock-only format used for the end of an event in the schedule digest
pub const DIGEST_END_FORMAT: &str = "%-I:%M %p";

/// Resolve a caller-supplied timezone label such as `Europe/Helsinki` or `EST`
pub fn resolve_timezone(label: Option<&str>) -> Option<Tz> {
    let label = label?.trim();
    if label.is_empty() {
        return None;
    }
    label.parse::<Tz>().ok()
}

/// Format a UTC timestamp in the given zone, or in UTC when there is none
pub fn format_in_zone(dt: &DateTime<Utc>, zone: Option<Tz>, format: &str) -> String {
    match zone {
        Some(tz) => dt.with_timezone(&tz).format(format).to_string(),
        None => dt.format(format).to_string(),
    }
}

/// Parse an RFC 3339 timestamp and normalise it to UTC
pub fn parse_utc(value: &str) -> Option<DateTime<Utc>> {
    DateTime::<FixedOffset>::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
