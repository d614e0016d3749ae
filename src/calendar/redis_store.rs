use super::models::{Event, EventChanges};
use super::store::EventStore;
use crate::error::{store_error, AppResult};
use async_trait::async_trait;
use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client as RedisClient};
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

// Redis key constants
pub mod keys {
    /// Hash of event id -> event JSON
    pub const CALENDAR_EVENTS: &str = "calendar:events";
    /// List of event ids in insertion order
    pub const CALENDAR_EVENT_ORDER: &str = "calendar:event_order";
}

/// Commands that can be sent to the Redis actor
enum StoreCommand {
    List(oneshot::Sender<AppResult<Vec<Event>>>),
    Get(String, oneshot::Sender<AppResult<Option<Event>>>),
    Insert(Event, oneshot::Sender<AppResult<()>>),
    Update(String, EventChanges, oneshot::Sender<AppResult<u64>>),
    SoftDelete(String, oneshot::Sender<AppResult<u64>>),
    Shutdown,
}

/// The Redis actor owns the connection and applies commands one at a time,
/// so read-modify-write updates never interleave within this process.
pub struct RedisActor {
    conn: ConnectionManager,
    command_rx: mpsc::Receiver<StoreCommand>,
}

/// Handle for communicating with the Redis actor
#[derive(Clone)]
pub struct RedisEventStore {
    command_tx: mpsc::Sender<StoreCommand>,
}

impl RedisEventStore {
    /// Connect to Redis and spawn the actor task
    pub async fn spawn(redis_url: &str) -> AppResult<Self> {
        let (actor, handle) = RedisActor::connect(redis_url).await?;
        tokio::spawn(actor.run());
        Ok(handle)
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AppResult<()> {
        let _ = self.command_tx.send(StoreCommand::Shutdown).await;
        Ok(())
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<AppResult<T>>) -> StoreCommand,
    ) -> AppResult<T> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(build(response_tx))
            .await
            .map_err(|e| store_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .await
            .map_err(|_| store_error("Response channel closed"))?
    }
}

#[async_trait]
impl EventStore for RedisEventStore {
    async fn list_events(&self) -> AppResult<Vec<Event>> {
        self.request(StoreCommand::List).await
    }

    async fn get_event(&self, id: &str) -> AppResult<Option<Event>> {
        let id = id.to_string();
        self.request(|tx| StoreCommand::Get(id, tx)).await
    }

    async fn insert(&self, event: Event) -> AppResult<()> {
        self.request(|tx| StoreCommand::Insert(event, tx)).await
    }

    async fn update_fields(&self, id: &str, changes: EventChanges) -> AppResult<u64> {
        let id = id.to_string();
        self.request(|tx| StoreCommand::Update(id, changes, tx)).await
    }

    async fn soft_delete(&self, id: &str) -> AppResult<u64> {
        let id = id.to_string();
        self.request(|tx| StoreCommand::SoftDelete(id, tx)).await
    }
}

impl RedisActor {
    /// Open a managed connection and return the actor with its handle
    pub async fn connect(redis_url: &str) -> AppResult<(Self, RedisEventStore)> {
        info!("Connecting to Redis at {}", redis_url);

        let client = RedisClient::open(redis_url)
            .map_err(|e| store_error(&format!("Failed to create Redis client: {}", e)))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| store_error(&format!("Failed to connect to Redis: {}", e)))?;

        let (command_tx, command_rx) = mpsc::channel(32);
        Ok((Self { conn, command_rx }, RedisEventStore { command_tx }))
    }

    /// Start the actor's processing loop
    pub async fn run(mut self) {
        info!("Redis actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                StoreCommand::List(response_tx) => {
                    let _ = response_tx.send(self.list_events().await);
                }
                StoreCommand::Get(id, response_tx) => {
                    let _ = response_tx.send(self.load_live(&id).await);
                }
                StoreCommand::Insert(event, response_tx) => {
                    let _ = response_tx.send(self.insert(event).await);
                }
                StoreCommand::Update(id, changes, response_tx) => {
                    let result = self
                        .modify(&id, |event| event.apply(&changes))
                        .await;
                    let _ = response_tx.send(result);
                }
                StoreCommand::SoftDelete(id, response_tx) => {
                    let result = self
                        .modify(&id, |event| event.deleted_at = Some(Utc::now()))
                        .await;
                    let _ = response_tx.send(result);
                }
                StoreCommand::Shutdown => {
                    info!("Redis actor shutting down");
                    break;
                }
            }
        }

        info!("Redis actor shut down");
    }

    async fn list_events(&mut self) -> AppResult<Vec<Event>> {
        let ids: Vec<String> = self.conn.lrange(keys::CALENDAR_EVENT_ORDER, 0, -1).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<Option<String>> = redis::cmd("HMGET")
            .arg(keys::CALENDAR_EVENTS)
            .arg(&ids)
            .query_async(&mut self.conn)
            .await?;

        live_in_order(&ids, rows)
    }

    async fn load_live(&mut self, id: &str) -> AppResult<Option<Event>> {
        let json: Option<String> = self.conn.hget(keys::CALENDAR_EVENTS, id).await?;
        decode_live(json.as_deref())
    }

    async fn insert(&mut self, event: Event) -> AppResult<()> {
        let json = serde_json::to_string(&event)?;

        redis::pipe()
            .atomic()
            .hset(keys::CALENDAR_EVENTS, &event.id, json)
            .ignore()
            .rpush(keys::CALENDAR_EVENT_ORDER, &event.id)
            .ignore()
            .query_async::<()>(&mut self.conn)
            .await?;

        Ok(())
    }

    /// Load a live event, change it and write it back; 0 rows if absent
    async fn modify(&mut self, id: &str, change: impl FnOnce(&mut Event)) -> AppResult<u64> {
        let Some(mut event) = self.load_live(id).await? else {
            return Ok(0);
        };

        change(&mut event);
        let json = serde_json::to_string(&event)?;
        () = self.conn.hset(keys::CALENDAR_EVENTS, id, json).await?;

        Ok(1)
    }
}

/// Decode a stored row, hiding soft-deleted events
fn decode_live(json: Option<&str>) -> AppResult<Option<Event>> {
    match json {
        Some(json) => {
            let event: Event = serde_json::from_str(json)?;
            Ok((!event.is_deleted()).then_some(event))
        }
        None => Ok(None),
    }
}

/// Pair the order index with the HMGET rows, keeping live events in order
fn live_in_order(ids: &[String], rows: Vec<Option<String>>) -> AppResult<Vec<Event>> {
    let mut events = Vec::with_capacity(rows.len());
    for (id, row) in ids.iter().zip(rows) {
        if row.is_none() {
            warn!("Event {} is listed in the order index but has no data", id);
        }
        if let Some(event) = decode_live(row.as_deref())? {
            events.push(event);
        }
    }
    Ok(events)
}
