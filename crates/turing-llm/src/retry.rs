//! Key rotation, bounded rate-limit retry and fallback around a provider
//!
//! Every attempt draws a fresh key from the shared [`KeyPool`] and runs under
//! an explicit timeout. A rate-limited attempt waits a fixed backoff on the
//! injected [`Clock`] and is retried, up to `max_retries` times. Callers that
//! only want text use [`RetryingCompleter::reply`], which turns any failure
//! into the configured fallback utterance.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use turing_core::{Clock, Message};

use crate::keys::KeyPool;
use crate::provider::{CompletionProvider, CompletionRequest, CompletionResponse, LlmError};

/// Default utterance when a completion cannot be obtained
pub const DEFAULT_FALLBACK: &str = "That's an interesting point. What do others think?";

/// Retry and timeout policy
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first rate-limited attempt
    pub max_retries: u32,
    /// Wait before retrying a rate-limited request
    pub backoff: Duration,
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Text returned by [`RetryingCompleter::reply`] on failure
    pub fallback: String,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_secs(65),
            timeout: Duration::from_secs(8),
            fallback: DEFAULT_FALLBACK.to_string(),
        }
    }
}

/// Provider wrapper that rotates keys and retries on rate limits
#[derive(Debug, Clone)]
pub struct RetryingCompleter {
    inner: Arc<dyn CompletionProvider>,
    keys: Arc<KeyPool>,
    clock: Arc<dyn Clock>,
    config: RetryConfig,
    model: String,
    temperature: f32,
}

impl RetryingCompleter {
    pub fn new(
        inner: Arc<dyn CompletionProvider>,
        keys: Arc<KeyPool>,
        clock: Arc<dyn Clock>,
        model: &str,
    ) -> Self {
        Self {
            inner,
            keys,
            clock,
            config: RetryConfig::default(),
            model: model.to_string(),
            temperature: 0.7,
        }
    }

    pub fn with_config(mut self, config: RetryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Complete `messages` with the configured model
    pub async fn complete_messages(
        &self,
        messages: Vec<Message>,
    ) -> Result<CompletionResponse, LlmError> {
        self.send(CompletionRequest::new(messages, &self.model, self.temperature))
            .await
    }

    /// Complete `messages`, falling back to the canned utterance on any error
    pub async fn reply(&self, messages: Vec<Message>) -> String {
        match self.complete_messages(messages).await {
            Ok(response) => response.content,
            Err(e) => {
                tracing::warn!(
                    provider = %self.inner.name(),
                    error = %e,
                    "Completion failed, using fallback utterance"
                );
                self.config.fallback.clone()
            }
        }
    }

    async fn send(&self, template: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let mut request = template.clone();
            request.api_key = self.keys.next_key();

            let outcome =
                match tokio::time::timeout(self.config.timeout, self.inner.complete(request)).await
                {
                    Ok(result) => result,
                    Err(_) => Err(LlmError::Timeout(self.config.timeout)),
                };

            match outcome {
                Err(LlmError::RateLimited) if attempts <= self.config.max_retries => {
                    tracing::warn!(
                        provider = %self.inner.name(),
                        attempt = attempts,
                        backoff_secs = self.config.backoff.as_secs(),
                        "Rate limited, backing off before retry"
                    );
                    self.clock.sleep(self.config.backoff).await;
                }
                Err(LlmError::RateLimited) => {
                    tracing::error!(
                        provider = %self.inner.name(),
                        attempts,
                        "Giving up after repeated rate limits"
                    );
                    return Err(LlmError::RetriesExhausted { attempts });
                }
                other => return other,
            }
        }
    }
}

#[async_trait]
impl CompletionProvider for RetryingCompleter {
    fn name(&self) -> &str {
        "retrying"
    }

    async fn is_available(&self) -> bool {
        self.inner.is_available().await
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.send(request).await
    }
}
