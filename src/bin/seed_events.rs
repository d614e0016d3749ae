//! Fill the configured event store with a handful of sample events.

use calendar_assistant::calendar::{Event, EventStore, InMemoryEventStore, RedisEventStore};
use calendar_assistant::config::Config;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Title, description, days from today, start hour, length in hours, color
const SAMPLES: [(&str, &str, i64, u32, i64, &str); 5] = [
    (
        "Meeting with Don Vito",
        "Discuss the family business",
        0,
        10,
        1,
        "var(--tokyo-red)",
    ),
    (
        "Lunch at Luigi's",
        "Try the cannoli",
        0,
        12,
        1,
        "var(--tokyo-blue)",
    ),
    (
        "Check on the merchandise",
        "Olive oil shipment at the docks",
        1,
        9,
        2,
        "var(--tokyo-purple)",
    ),
    (
        "Meeting with the Families",
        "Bring a peace offering",
        2,
        14,
        3,
        "var(--tokyo-green)",
    ),
    (
        "Visit Uncle Sal",
        "He has a few things to say",
        3,
        18,
        2,
        "var(--tokyo-cyan)",
    ),
];

fn at_hour(days: i64, hour: u32) -> DateTime<Utc> {
    let date = Utc::now().date_naive() + Duration::days(days);
    let time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
    date.and_time(time).and_utc()
}

/// The sample events, anchored to the current day
pub fn sample_events() -> Vec<Event> {
    SAMPLES
        .iter()
        .map(|(title, description, days, hour, hours, color)| {
            let start = at_hour(*days, *hour);
            Event::new(*title, *description, start, start + Duration::hours(*hours), *color)
        })
        .collect()
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set up logging: {}", e);
    }

    let config = Config::load()?;

    let (store, redis): (Arc<dyn EventStore>, Option<RedisEventStore>) = match &config.redis_url {
        Some(url) => {
            let redis = RedisEventStore::spawn(url).await?;
            (Arc::new(redis.clone()), Some(redis))
        }
        None => {
            info!("No REDIS_URL set, seeding an in-memory store (nothing will persist)");
            (Arc::new(InMemoryEventStore::new()), None)
        }
    };

    for event in sample_events() {
        let title = event.title.clone();
        if let Err(e) = store.insert(event).await {
            error!("Failed to insert '{}': {}", title, e);
            return Err(e.into());
        }
        info!("Inserted '{}'", title);
    }

    info!("Seeded {} events", store.list_events().await?.len());

    if let Some(redis) = redis {
        redis.shutdown().await?;
    }

    Ok(())
}
