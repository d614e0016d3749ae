pub mod action;
pub mod executor;
pub mod interpreter;
pub mod prompt;
pub mod provider;

pub use action::{ActionPayload, CalendarAction, NewEvent};
pub use executor::{execute_action, ActionOutcome};
pub use interpreter::{interpret, AssistantReply};
pub use prompt::Prompt;
pub use provider::{build_provider, OllamaProvider, OpenAiProvider, Provider};

use crate::calendar::{schedule_digest, EventStore};
use crate::error::{AppResult, Error};
use crate::utils::time::resolve_timezone;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Result of one chat turn
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub reply: AssistantReply,
    /// Present when the reply carried an action and it was applied
    pub outcome: Option<ActionOutcome>,
}

/// Connects the event store to a language model.
///
/// A turn reads the schedule, asks the model, then applies at most one
/// action. No lock is held while the model runs, so another writer can
/// change the calendar between the read and the write.
#[derive(Clone)]
pub struct Assistant {
    store: Arc<dyn EventStore>,
    provider: Arc<dyn Provider>,
    timeout: Duration,
}

impl Assistant {
    pub fn new(store: Arc<dyn EventStore>, provider: Arc<dyn Provider>, timeout: Duration) -> Self {
        Self {
            store,
            provider,
            timeout,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Run a chat turn dated today in the caller's timezone (UTC if unknown)
    pub async fn query(&self, utterance: &str, timezone: Option<&str>) -> AppResult<ChatTurn> {
        let now = Utc::now();
        let today = match resolve_timezone(timezone) {
            Some(tz) => now.with_timezone(&tz).date_naive(),
            None => now.date_naive(),
        };
        self.query_on(utterance, timezone, today).await
    }

    /// Run a chat turn with an explicit current date
    pub async fn query_on(
        &self,
        utterance: &str,
        timezone: Option<&str>,
        today: NaiveDate,
    ) -> AppResult<ChatTurn> {
        let schedule = schedule_digest(self.store.as_ref(), timezone).await?;
        let prompt = Prompt::new(&schedule, today, timezone, utterance);

        let raw = tokio::time::timeout(self.timeout, self.provider.complete(&prompt))
            .await
            .map_err(|_| Error::ProviderTimeout {
                provider: self.provider.name(),
                seconds: self.timeout.as_secs(),
            })??;
        debug!("Raw model output: {}", raw);

        let reply = interpret(&raw);

        let outcome = match &reply.action {
            Some(action) => Some(execute_action(self.store.as_ref(), action).await?),
            None => {
                info!("No calendar action in AI response");
                None
            }
        };

        Ok(ChatTurn { reply, outcome })
    }
}
