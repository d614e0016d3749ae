use super::Provider;
use crate::assistant::prompt::Prompt;
use crate::error::{AppResult, Error};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const PROVIDER_NAME: &str = "OpenAI";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Hosted chat-completions API, answered in a single non-streaming call
pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
}

impl OpenAiProvider {
    pub fn new(
        client: Client,
        base_url: String,
        model: String,
        api_key: String,
        temperature: f32,
    ) -> Self {
        Self {
            client,
            base_url,
            model,
            api_key,
            temperature,
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn complete(&self, prompt: &Prompt) -> AppResult<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: self.temperature,
        };

        info!("Querying {} model {}", PROVIDER_NAME, self.model);
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header(header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(Error::ProviderStatus {
                provider: PROVIDER_NAME,
                status,
                body,
            });
        }

        let response: ChatCompletionResponse = res.json().await?;
        let text = response
            .choices
            .into_iter()
            .next()
            .ok_or(Error::EmptyCompletion(PROVIDER_NAME))?
            .message
            .content
            .unwrap_or_default();

        debug!("Full response received: {}", text);
        Ok(text)
    }
}
