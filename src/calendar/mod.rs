pub mod models;
pub mod redis_store;
pub mod schedule;
pub mod store;

pub use models::{Event, EventChanges, DEFAULT_EVENT_COLOR};
pub use redis_store::RedisEventStore;
pub use schedule::{render_schedule, schedule_digest};
pub use store::{EventStore, InMemoryEventStore};
