use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(calendar_assistant::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(calendar_assistant::config))]
    Config(String),

    #[error("HTTP request failed: {0}")]
    #[diagnostic(code(calendar_assistant::http))]
    Http(#[from] reqwest::Error),

    #[error("{provider} returned status {status}: {body}")]
    #[diagnostic(code(calendar_assistant::provider_status))]
    ProviderStatus {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("No response from {0}")]
    #[diagnostic(code(calendar_assistant::empty_completion))]
    EmptyCompletion(&'static str),

    #[error("{provider} did not answer within {seconds} seconds")]
    #[diagnostic(code(calendar_assistant::provider_timeout))]
    ProviderTimeout { provider: &'static str, seconds: u64 },

    #[error("Provider error: {0}")]
    #[diagnostic(code(calendar_assistant::provider))]
    Provider(String),

    #[error("Event store error: {0}")]
    #[diagnostic(code(calendar_assistant::store))]
    Store(String),

    #[error("Redis error: {0}")]
    #[diagnostic(code(calendar_assistant::redis))]
    Redis(#[from] redis::RedisError),

    #[error("Unknown action type: {0}")]
    #[diagnostic(code(calendar_assistant::unknown_action))]
    UnknownActionKind(String),

    #[error("Action '{0}' requires an event_id")]
    #[diagnostic(code(calendar_assistant::missing_target))]
    MissingTarget(&'static str),

    #[error("Invalid action: {0}")]
    #[diagnostic(code(calendar_assistant::invalid_action))]
    InvalidAction(String),

    #[error(transparent)]
    #[diagnostic(code(calendar_assistant::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(calendar_assistant::serialization))]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Invalid environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create provider errors
pub fn provider_error(message: &str) -> Error {
    Error::Provider(message.to_string())
}

/// Helper to create event store errors
pub fn store_error(message: &str) -> Error {
    Error::Store(message.to_string())
}
