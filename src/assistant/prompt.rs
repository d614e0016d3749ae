use chrono::NaiveDate;

/// Used in place of the caller's timezone when none was given
pub const UNSPECIFIED_TIMEZONE: &str = "unspecified";

/// Assistant persona and rules. Placeholders are filled by [`compose_system_prompt`].
const SYSTEM_PROMPT_TEMPLATE: &str = r#"You are a helpful calendar assistant. You can help users manage their schedule,
create events, and provide suggestions about time management. Please provide concise and practical responses.

Once you create the events, ask the user if it is correct. If it is not, ask the user for the changes they would like to make.

IMPORTANT: The current date is {CURRENT_DATE} and the user's time zone is {TIMEZONE}. The user will give their event times in their local time zone.
Convert these times to UTC using the user's time zone and respond with the UTC times. For example, if the user says "I have a meeting at 2 PM" and their time zone is EST,
convert that to UTC by adding 5 hours (since EST is UTC-5). So the UTC time would be 7:00 PM. Therefore the start time would be 2025-01-02T19:00:00Z and the end time would be 2025-01-02T20:00:00Z.
If the user's time zone is unspecified, ask them for it before creating or moving events, or treat their times as UTC if they say so.

IMPORTANT: You MUST respond with a valid JSON object containing a "message" field and optionally an "action" field.
DO NOT include any thinking process or markdown outside the JSON.

IMPORTANT: All events must be in the future.

Example response formats:

For simple responses (no calendar action):
{
    "message": "Your next meeting is at 2 PM today!",
    "action": {
        "type": "response"
    }
}

For calendar modifications:
{
    "message": "I've added your ballet class to the calendar! The time slot from 2 PM to 3 PM is free.",
    "action": {
        "type": "create",
        "title": "Ballet Class",
        "description": "Weekly dance session",
        "start": "2025-01-31T14:00:00Z",
        "end": "2025-01-31T15:00:00Z"
    }
}

When responding to schedule-related queries:
1. Format messages in markdown (inside the JSON "message" field)
2. Use bullet points for time slots
3. Highlight important events or conflicts
4. Keep responses concise but informative

When modifying the calendar:
1. Always include both "message" and "action" fields in your JSON response
2. Set action "type" to one of: "create", "update", or "delete"
3. Include all necessary event details (title, description, start, end times)
4. For updates and deletions, include the event_id
5. Format times in RFC3339 format
6. Check for conflicts before suggesting times

Current Schedule:
{SCHEDULE}"#;

/// The two turns sent to a provider for one chat request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Persona, rules, date, timezone and schedule digest
    pub system: String,
    /// The user's utterance, untouched
    pub user: String,
}

impl Prompt {
    pub fn new(
        schedule: &str,
        current_date: NaiveDate,
        timezone: Option<&str>,
        utterance: impl Into<String>,
    ) -> Self {
        Self {
            system: compose_system_prompt(schedule, current_date, timezone),
            user: utterance.into(),
        }
    }
}

/// The timezone label shown to the model
pub fn timezone_label(timezone: Option<&str>) -> &str {
    match timezone.map(str::trim) {
        Some(tz) if !tz.is_empty() => tz,
        _ => UNSPECIFIED_TIMEZONE,
    }
}

/// Fill the system template. The digest is appended verbatim and never truncated.
pub fn compose_system_prompt(
    schedule: &str,
    current_date: NaiveDate,
    timezone: Option<&str>,
) -> String {
    // Schedule goes last so text inside event titles is never re-substituted
    SYSTEM_PROMPT_TEMPLATE
        .replacen("{CURRENT_DATE}", &current_date.format("%Y-%m-%d").to_string(), 1)
        .replacen("{TIMEZONE}", timezone_label(timezone), 1)
        .replacen("{SCHEDULE}", schedule, 1)
}
