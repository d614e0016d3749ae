use super::models::{Event, EventChanges};
use crate::error::AppResult;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

/// Persistent storage for calendar events.
///
/// Every method is a single-row operation and must be atomic on its own.
/// Nothing here spans several calls, so callers that read and later write
/// can race with other writers.
#[async_trait]
pub trait EventStore: Send + Sync + 'static {
    /// All events that are not soft-deleted, in the store's natural order
    async fn list_events(&self) -> AppResult<Vec<Event>>;

    /// A single live event by identifier
    async fn get_event(&self, id: &str) -> AppResult<Option<Event>>;

    /// Insert a new event
    async fn insert(&self, event: Event) -> AppResult<()>;

    /// Overwrite the given fields. Returns the number of rows affected.
    async fn update_fields(&self, id: &str, changes: EventChanges) -> AppResult<u64>;

    /// Mark an event deleted. Returns the number of rows affected.
    async fn soft_delete(&self, id: &str) -> AppResult<u64>;
}

/// In-memory implementation of the event store (for testing and as a fallback)
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: RwLock<Vec<Event>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with events
    pub fn with_events(events: Vec<Event>) -> Self {
        Self {
            events: RwLock::new(events),
        }
    }

    /// Every stored row, including soft-deleted ones
    pub async fn all_rows(&self) -> Vec<Event> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn list_events(&self) -> AppResult<Vec<Event>> {
        let events = self.events.read().await;
        Ok(events.iter().filter(|e| !e.is_deleted()).cloned().collect())
    }

    async fn get_event(&self, id: &str) -> AppResult<Option<Event>> {
        let events = self.events.read().await;
        Ok(events.iter().find(|e| e.id == id && !e.is_deleted()).cloned())
    }

    async fn insert(&self, event: Event) -> AppResult<()> {
        let mut events = self.events.write().await;
        events.push(event);
        Ok(())
    }

    async fn update_fields(&self, id: &str, changes: EventChanges) -> AppResult<u64> {
        let mut events = self.events.write().await;
        match events.iter_mut().find(|e| e.id == id && !e.is_deleted()) {
            Some(event) => {
                event.apply(&changes);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn soft_delete(&self, id: &str) -> AppResult<u64> {
        let mut events = self.events.write().await;
        match events.iter_mut().find(|e| e.id == id && !e.is_deleted()) {
            Some(event) => {
                event.deleted_at = Some(Utc::now());
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
