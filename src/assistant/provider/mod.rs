mod ollama;
mod openai;

pub use ollama::{OllamaProvider, StreamDecoder, MAX_LINE_BYTES, MAX_RESPONSE_BYTES};
pub use openai::OpenAiProvider;

use super::prompt::Prompt;
use crate::config::ProviderConfig;
use crate::error::AppResult;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// A language model backend.
///
/// Implementations only move text: they return the model's raw output and
/// leave parsing to the shared interpreter.
#[async_trait]
pub trait Provider: Send + Sync + 'static {
    /// Short name used in logs and errors
    fn name(&self) -> &'static str;

    /// Send the prompt and return the complete raw model text
    async fn complete(&self, prompt: &Prompt) -> AppResult<String>;
}

/// Build the provider selected in the configuration
pub fn build_provider(config: &ProviderConfig) -> AppResult<Arc<dyn Provider>> {
    let client = Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    let provider: Arc<dyn Provider> = match config {
        ProviderConfig::OpenAi {
            base_url,
            model,
            api_key,
            temperature,
        } => Arc::new(OpenAiProvider::new(
            client,
            base_url.clone(),
            model.clone(),
            api_key.clone(),
            *temperature,
        )),
        ProviderConfig::Ollama { base_url, model } => {
            Arc::new(OllamaProvider::new(client, base_url.clone(), model.clone()))
        }
    };

    Ok(provider)
}
