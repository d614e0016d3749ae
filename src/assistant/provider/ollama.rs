use super::Provider;
use crate::assistant::prompt::Prompt;
use crate::error::{provider_error, AppResult, Error};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const PROVIDER_NAME: &str = "Ollama";

/// Longest single line accepted from the stream
pub const MAX_LINE_BYTES: usize = 1024 * 1024;
/// Most generated text kept for one answer
pub const MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

/// Request body for the generate endpoint
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

/// One line of the newline-delimited response stream
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StreamLine {
    Chunk {
        response: String,
        done: bool,
        #[serde(default)]
        done_reason: Option<String>,
    },
    Failure {
        error: String,
    },
}

/// Local model served by Ollama, answered through a streamed generate call
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(client: Client, base_url: String, model: String) -> Self {
        Self {
            client,
            base_url,
            model,
        }
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn complete(&self, prompt: &Prompt) -> AppResult<String> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: &self.model,
            prompt: &prompt.user,
            system: &prompt.system,
            stream: true,
        };

        info!("Querying {} model {}", PROVIDER_NAME, self.model);
        let res = self.client.post(&url).json(&request).send().await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(Error::ProviderStatus {
                provider: PROVIDER_NAME,
                status,
                body,
            });
        }

        let mut decoder = StreamDecoder::new();
        let mut stream = res.bytes_stream();
        while let Some(chunk) = stream.next().await {
            if decoder.feed(&chunk?)? {
                break;
            }
        }

        let text = decoder.finish()?;
        debug!("Full response received: {}", text);
        Ok(text)
    }
}

/// Reassembles the model's text from newline-delimited JSON chunks.
///
/// Lines that are not chunk records are skipped. Both the pending line and
/// the collected text are capped.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    pending: Vec<u8>,
    text: String,
    done: bool,
    skipped: usize,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes. Returns true once the terminal chunk has been seen.
    pub fn feed(&mut self, bytes: &[u8]) -> AppResult<bool> {
        self.pending.extend_from_slice(bytes);

        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.handle_line(&line)?;
            if self.done {
                return Ok(true);
            }
        }

        if self.pending.len() > MAX_LINE_BYTES {
            return Err(provider_error(&format!(
                "stream line exceeded {} bytes",
                MAX_LINE_BYTES
            )));
        }

        Ok(false)
    }

    /// Number of lines dropped because they did not parse
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Finish the stream and return the concatenated text
    pub fn finish(mut self) -> AppResult<String> {
        if !self.done && !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            self.handle_line(&line)?;
        }

        if self.skipped > 0 {
            warn!("Skipped {} malformed stream lines", self.skipped);
        }

        if !self.done {
            if self.text.is_empty() {
                return Err(provider_error("stream ended before the model finished"));
            }
            warn!("Stream ended without a final chunk, using partial output");
        }

        Ok(self.text)
    }

    fn handle_line(&mut self, line: &[u8]) -> AppResult<()> {
        let line = line.trim_ascii();
        if line.is_empty() {
            return Ok(());
        }

        match serde_json::from_slice::<StreamLine>(line) {
            Ok(StreamLine::Chunk {
                response,
                done,
                done_reason,
            }) => {
                if self.text.len() + response.len() > MAX_RESPONSE_BYTES {
                    return Err(provider_error(&format!(
                        "model output exceeded {} bytes",
                        MAX_RESPONSE_BYTES
                    )));
                }
                self.text.push_str(&response);
                if done {
                    debug!("Stream finished, reason: {:?}", done_reason);
                    self.done = true;
                }
            }
            Ok(StreamLine::Failure { error }) => {
                return Err(provider_error(&format!("{} error: {}", PROVIDER_NAME, error)));
            }
            Err(e) => {
                debug!("Skipping stream line: {}", e);
                self.skipped += 1;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concatenates_until_done() {
        let mut decoder = StreamDecoder::new();
        assert!(!decoder
            .feed(b"{\"response\":\"{\\\"mess\",\"done\":false}\n{\"response\":\"age\\\": \\\"hi\\\"}\",\"done\":false}\n")
            .unwrap());
        assert!(decoder
            .feed(b"{\"response\":\"\",\"done\":true,\"done_reason\":\"stop\"}\n")
            .unwrap());

        assert_eq!(decoder.finish().unwrap(), "{\"message\": \"hi\"}");
    }

    #[test]
    fn test_lines_split_across_chunks() {
        let mut decoder = StreamDecoder::new();
        assert!(!decoder.feed(b"{\"response\":\"Hel").unwrap());
        assert!(!decoder.feed(b"lo\",\"done\":false}\n{\"respo").unwrap());
        assert!(decoder.feed(b"nse\":\" there\",\"done\":true}\n").unwrap());

        assert_eq!(decoder.finish().unwrap(), "Hello there");
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let mut decoder = StreamDecoder::new();
        decoder
            .feed(b"{\"response\":\"a\",\"done\":false}\nnot json at all\n{\"unexpected\":1}\n\n{\"response\":\"b\",\"done\":true}\n")
            .unwrap();

        assert_eq!(decoder.skipped(), 2);
        assert_eq!(decoder.finish().unwrap(), "ab");
    }

    #[test]
    fn test_text_after_done_is_ignored() {
        let mut decoder = StreamDecoder::new();
        assert!(decoder
            .feed(b"{\"response\":\"x\",\"done\":true}\n{\"response\":\"y\",\"done\":false}\n")
            .unwrap());
        assert_eq!(decoder.finish().unwrap(), "x");
    }

    #[test]
    fn test_final_line_without_newline() {
        let mut decoder = StreamDecoder::new();
        decoder.feed(b"{\"response\":\"tail\",\"done\":true}").unwrap();
        assert_eq!(decoder.finish().unwrap(), "tail");
    }

    #[test]
    fn test_stream_without_done() {
        let mut decoder = StreamDecoder::new();
        decoder.feed(b"{\"response\":\"partial\",\"done\":false}\n").unwrap();
        assert_eq!(decoder.finish().unwrap(), "partial");

        let decoder = StreamDecoder::new();
        assert!(decoder.finish().is_err());
    }

    #[test]
    fn test_error_line_fails_request() {
        let mut decoder = StreamDecoder::new();
        let err = decoder
            .feed(b"{\"error\":\"model 'nope' not found\"}\n")
            .unwrap_err();
        assert!(err.to_string().contains("model 'nope' not found"));
    }

    #[test]
    fn test_oversized_line_is_rejected() {
        let mut decoder = StreamDecoder::new();
        let blob = vec![b'x'; MAX_LINE_BYTES + 1];
        assert!(decoder.feed(&blob).is_err());
    }
}
