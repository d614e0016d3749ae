use crate::shutdown;
use axum::http::{header, HeaderValue, Method};
use calendar_assistant::api::{router, AppState};
use calendar_assistant::assistant::{build_provider, Assistant};
use calendar_assistant::calendar::{EventStore, InMemoryEventStore, RedisEventStore};
use calendar_assistant::config::{Config, ProviderConfig};
use calendar_assistant::error::{config_error, Error};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| config_error(&format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Open the configured event store, falling back to memory if Redis is down
async fn open_store(config: &Config) -> (Arc<dyn EventStore>, Option<RedisEventStore>) {
    let Some(url) = &config.redis_url else {
        info!("No REDIS_URL set, keeping events in memory");
        return (Arc::new(InMemoryEventStore::new()), None);
    };

    match RedisEventStore::spawn(url).await {
        Ok(store) => {
            info!("Connected to Redis successfully");
            (Arc::new(store.clone()), Some(store))
        }
        Err(e) => {
            error!("Failed to connect to Redis: {}", e);
            info!("Using in-memory event store as fallback");
            (Arc::new(InMemoryEventStore::new()), None)
        }
    }
}

fn cors_layer(origin: &str) -> miette::Result<CorsLayer> {
    let origin = HeaderValue::from_str(origin)
        .map_err(|_| config_error(&format!("Invalid CORS origin: {}", origin)))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

/// Wire everything together and serve until a shutdown signal arrives
pub async fn start_server(config: Config) -> miette::Result<()> {
    let (store, redis) = open_store(&config).await;

    let provider = build_provider(&config.provider)?;
    match &config.provider {
        ProviderConfig::OpenAi { model, .. } => {
            info!("Using OpenAI model {} (API key present)", model)
        }
        ProviderConfig::Ollama { base_url, model } => {
            info!("Using Ollama model {} at {}", model, base_url)
        }
    }

    let assistant = Assistant::new(Arc::clone(&store), provider, config.provider_timeout);
    let app = router(AppState::new(assistant, store)).layer(cors_layer(&config.cors_origin)?);

    let addr = format!("{}:{}", config.bind_addr, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(Error::from)?;
    info!("Listening on {}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::wait_for_signal())
        .await
        .map_err(Error::from);

    if let Some(redis) = redis {
        shutdown::close_store(redis).await;
    }

    served?;
    info!("Server stopped");
    Ok(())
}
