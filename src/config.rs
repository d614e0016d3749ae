use crate::error::{config_error, env_error, AppResult};
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::time::Duration;
use url::Url;

/// Default location of the optional settings file
pub const DEFAULT_CONFIG_PATH: &str = "config/assistant.toml";
/// Placeholder shipped in example `.env` files; treated as "no key"
pub const OPENAI_KEY_PLACEHOLDER: &str = "your_api_key_here";

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_OPENAI_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://127.0.0.1:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "deepseek-r1:8b";
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 120;

/// Which language model backend answers chat turns
#[derive(Clone, PartialEq)]
pub enum ProviderConfig {
    /// Hosted chat-completions API
    OpenAi {
        base_url: String,
        model: String,
        api_key: String,
        temperature: f32,
    },
    /// Local Ollama server with streaming generate
    Ollama { base_url: String, model: String },
}

impl ProviderConfig {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderConfig::OpenAi { .. } => "openai",
            ProviderConfig::Ollama { .. } => "ollama",
        }
    }
}

// Keeps the API key out of logs
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderConfig::OpenAi {
                base_url,
                model,
                temperature,
                ..
            } => f
                .debug_struct("OpenAi")
                .field("base_url", base_url)
                .field("model", model)
                .field("api_key", &"<redacted>")
                .field("temperature", temperature)
                .finish(),
            ProviderConfig::Ollama { base_url, model } => f
                .debug_struct("Ollama")
                .field("base_url", base_url)
                .field("model", model)
                .finish(),
        }
    }
}

/// Main configuration structure for the server
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Port the HTTP server listens on
    pub port: u16,
    /// Redis connection string; `None` keeps events in memory
    pub redis_url: Option<String>,
    /// Selected language model backend
    pub provider: ProviderConfig,
    /// Upper bound for a single model call
    pub provider_timeout: Duration,
    /// Origin allowed to call the API from a browser
    pub cors_origin: String,
}

/// Optional settings read from the TOML file. Environment variables win.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub bind_addr: Option<String>,
    pub port: Option<u16>,
    pub redis_url: Option<String>,
    pub openai_base_url: Option<String>,
    pub openai_model: Option<String>,
    pub openai_temperature: Option<f32>,
    pub ollama_base_url: Option<String>,
    pub ollama_model: Option<String>,
    pub provider_timeout_secs: Option<u64>,
    pub cors_origin: Option<String>,
}

impl FileConfig {
    /// Read the settings file, returning defaults if it does not exist
    pub fn read(path: &str) -> AppResult<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Config {
    /// Load configuration from `.env`, the environment and the settings file
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let path = env::var("ASSISTANT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let file = FileConfig::read(&path)?;

        Self::from_sources(file, |key| env::var(key).ok())
    }

    /// Build a config from file settings and a variable lookup
    pub fn from_sources<F>(file: FileConfig, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = var("BIND_ADDR")
            .or(file.bind_addr)
            .unwrap_or_else(|| "127.0.0.1".to_string());

        let port = match var("PORT") {
            Some(p) => p.parse::<u16>().map_err(|_| env_error("PORT"))?,
            None => file.port.unwrap_or(8080),
        };

        let redis_url = var("REDIS_URL").or(file.redis_url);

        let provider_timeout_secs = match var("PROVIDER_TIMEOUT_SECS") {
            Some(s) => s
                .parse::<u64>()
                .map_err(|_| env_error("PROVIDER_TIMEOUT_SECS"))?,
            None => file
                .provider_timeout_secs
                .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECS),
        };
        if provider_timeout_secs == 0 {
            return Err(config_error("provider timeout must be at least one second"));
        }

        let cors_origin = var("CORS_ORIGIN")
            .or(file.cors_origin)
            .unwrap_or_else(|| "http://localhost:3000".to_string());

        let provider = match var("OPENAI_API_KEY").filter(|k| k != OPENAI_KEY_PLACEHOLDER) {
            Some(api_key) => {
                let base_url = var("OPENAI_BASE_URL")
                    .or(file.openai_base_url)
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());
                let temperature = match var("OPENAI_TEMPERATURE") {
                    Some(t) => t
                        .parse::<f32>()
                        .map_err(|_| env_error("OPENAI_TEMPERATURE"))?,
                    None => file
                        .openai_temperature
                        .unwrap_or(DEFAULT_OPENAI_TEMPERATURE),
                };
                ProviderConfig::OpenAi {
                    base_url: validate_base_url(&base_url)?,
                    model: var("OPENAI_MODEL")
                        .or(file.openai_model)
                        .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                    api_key,
                    temperature,
                }
            }
            None => {
                let base_url = var("OLLAMA_BASE_URL")
                    .or(file.ollama_base_url)
                    .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.to_string());
                ProviderConfig::Ollama {
                    base_url: validate_base_url(&base_url)?,
                    model: var("OLLAMA_MODEL")
                        .or(file.ollama_model)
                        .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
                }
            }
        };

        Ok(Config {
            bind_addr,
            port,
            redis_url,
            provider,
            provider_timeout: Duration::from_secs(provider_timeout_secs),
            cors_origin,
        })
    }
}

/// Check that a base URL is absolute http(s) and drop any trailing slash
fn validate_base_url(raw: &str) -> AppResult<String> {
    let url = Url::parse(raw).map_err(|e| config_error(&format!("invalid URL '{}': {}", raw, e)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(config_error(&format!("unsupported URL scheme in '{}'", raw)));
    }
    Ok(raw.trim_end_matches('/').to_string())
}
