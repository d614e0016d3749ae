use super::action::CalendarAction;
use crate::calendar::{Event, EventChanges, EventStore, DEFAULT_EVENT_COLOR};
use crate::error::AppResult;
use tracing::{error, info};

/// What applying an action did to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// `response` action, nothing written
    NoChange,
    Created { event_id: String },
    Updated { event_id: String },
    Deleted { event_id: String },
    /// Update or delete matched zero rows
    NotFound { event_id: String },
}

impl ActionOutcome {
    fn from_rows(rows: u64, event_id: &str, found: fn(String) -> ActionOutcome) -> Self {
        if rows == 0 {
            ActionOutcome::NotFound {
                event_id: event_id.to_string(),
            }
        } else {
            found(event_id.to_string())
        }
    }
}

/// Apply a single action to the event store
pub async fn execute_action(
    store: &dyn EventStore,
    action: &CalendarAction,
) -> AppResult<ActionOutcome> {
    info!("Executing calendar action: {:?}", action);

    match action {
        CalendarAction::Response => Ok(ActionOutcome::NoChange),

        CalendarAction::Create(new_event) => {
            let event = Event::new(
                new_event.title.clone(),
                new_event.description.clone(),
                new_event.start,
                new_event.end,
                DEFAULT_EVENT_COLOR,
            );
            let event_id = event.id.clone();

            if let Err(e) = store.insert(event).await {
                error!("Error creating event: {}", e);
                return Err(e);
            }

            info!("Successfully created event with ID: {}", event_id);
            Ok(ActionOutcome::Created { event_id })
        }

        CalendarAction::Update {
            event_id,
            title,
            description,
            start,
            end,
        } => {
            // Color, identifier and creation time are never touched here
            let changes = EventChanges {
                title: title.clone(),
                description: description.clone(),
                start: *start,
                end: *end,
                color: None,
            };

            let rows = store.update_fields(event_id, changes).await.map_err(|e| {
                error!("Error updating event {}: {}", event_id, e);
                e
            })?;

            info!("Updated event {}. Rows affected: {}", event_id, rows);
            Ok(ActionOutcome::from_rows(rows, event_id, |event_id| {
                ActionOutcome::Updated { event_id }
            }))
        }

        CalendarAction::Delete { event_id } => {
            let rows = store.soft_delete(event_id).await.map_err(|e| {
                error!("Error deleting event {}: {}", event_id, e);
                e
            })?;

            info!("Deleted event {}. Rows affected: {}", event_id, rows);
            Ok(ActionOutcome::from_rows(rows, event_id, |event_id| {
                ActionOutcome::Deleted { event_id }
            }))
        }
    }
}
