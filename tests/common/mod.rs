#![allow(dead_code)]

use async_trait::async_trait;
use calendar_assistant::api::{router, AppState};
use calendar_assistant::assistant::{Assistant, Prompt, Provider};
use calendar_assistant::calendar::{
    Event, EventChanges, EventStore, InMemoryEventStore, DEFAULT_EVENT_COLOR,
};
use calendar_assistant::error::{provider_error, store_error, AppResult};
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Provider that hands out canned replies and records every prompt it gets
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<Prompt>>,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    pub fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
            delay: None,
        })
    }

    /// A provider that sleeps before answering
    pub fn slow(reply: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::from([reply.to_string()])),
            prompts: Mutex::new(Vec::new()),
            delay: Some(delay),
        })
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn complete(&self, prompt: &Prompt) -> AppResult<String> {
        self.prompts.lock().unwrap().push(prompt.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.replies.lock().unwrap().pop_front();
        next.ok_or_else(|| provider_error("no scripted reply left"))
    }
}

/// Store whose reads or writes fail with a store error
pub struct FailingStore {
    fail_reads: bool,
}

impl FailingStore {
    /// Listing works (empty calendar), every write fails
    pub fn writes() -> Arc<Self> {
        Arc::new(Self { fail_reads: false })
    }

    /// Nothing works
    pub fn everything() -> Arc<Self> {
        Arc::new(Self { fail_reads: true })
    }

    fn read<T>(&self, value: T) -> AppResult<T> {
        if self.fail_reads {
            Err(store_error("connection refused"))
        } else {
            Ok(value)
        }
    }
}

#[async_trait]
impl EventStore for FailingStore {
    async fn list_events(&self) -> AppResult<Vec<Event>> {
        self.read(Vec::new())
    }

    async fn get_event(&self, _id: &str) -> AppResult<Option<Event>> {
        self.read(None)
    }

    async fn insert(&self, _event: Event) -> AppResult<()> {
        Err(store_error("disk full"))
    }

    async fn update_fields(&self, _id: &str, _changes: EventChanges) -> AppResult<u64> {
        Err(store_error("disk full"))
    }

    async fn soft_delete(&self, _id: &str) -> AppResult<u64> {
        Err(store_error("disk full"))
    }
}

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// An event starting at the given hour on 2025-01-01 and lasting one hour
pub fn event_at(title: &str, description: &str, hour: u32) -> Event {
    Event::new(
        title,
        description,
        utc(2025, 1, 1, hour, 0),
        utc(2025, 1, 1, hour + 1, 0),
        DEFAULT_EVENT_COLOR,
    )
}

pub fn seeded_store(events: Vec<Event>) -> Arc<InMemoryEventStore> {
    Arc::new(InMemoryEventStore::with_events(events))
}

pub fn assistant(store: Arc<InMemoryEventStore>, provider: Arc<ScriptedProvider>) -> Assistant {
    Assistant::new(store, provider, Duration::from_secs(5))
}

/// Full application router over the given store and provider
pub fn app<S: EventStore>(store: Arc<S>, provider: Arc<ScriptedProvider>) -> Router {
    let shared: Arc<dyn EventStore> = store;
    let assistant = Assistant::new(Arc::clone(&shared), provider, Duration::from_secs(5));
    router(AppState::new(assistant, shared))
}
