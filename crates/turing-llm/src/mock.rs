//! Mock completion provider for tests and dry runs

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use turing_core::Role;

use crate::provider::{CompletionProvider, CompletionRequest, CompletionResponse, LlmError};

/// A mock provider with predefined behaviour
///
/// Outcomes are served in this order: the scripted queue first, then the
/// fixed failure if one is set, then canned responses in a cycle. With no
/// canned responses it improvises short chat lines and answers analysis
/// requests in the structured format.
#[derive(Debug)]
pub struct MockProvider {
    /// Name of this mock
    pub name: String,
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    failure: Option<LlmError>,
    responses: Vec<String>,
    index: AtomicUsize,
    latency: Duration,
    requests: Mutex<Vec<CompletionRequest>>,
}

const SMALL_TALK: [&str; 5] = [
    "not much, just chilling tbh",
    "lol same here, kinda bored",
    "honestly no idea, what do you think",
    "ha fair enough",
    "idk, that sounds a bit off to me",
];

impl MockProvider {
    /// Cycle through the given responses
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            name: "mock".to_string(),
            script: Mutex::new(VecDeque::new()),
            failure: None,
            responses,
            index: AtomicUsize::new(0),
            latency: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always return the same response
    pub fn constant(response: &str) -> Self {
        Self::new(vec![response.to_string()])
    }

    /// Serve `outcomes` in order, then improvise
    pub fn scripted(outcomes: Vec<Result<String, LlmError>>) -> Self {
        let mock = Self::smart();
        if let Ok(mut script) = mock.script.lock() {
            script.extend(outcomes);
        }
        mock
    }

    /// Fail every call with `error`
    pub fn failing(error: LlmError) -> Self {
        Self {
            failure: Some(error),
            ..Self::smart()
        }
    }

    /// Improvise replies from the request content
    pub fn smart() -> Self {
        Self {
            name: "smart-mock".to_string(),
            ..Self::new(Vec::new())
        }
    }

    /// Simulate network latency on every call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// The API key attached to each request, in call order
    pub fn keys_seen(&self) -> Vec<Option<String>> {
        self.requests()
            .into_iter()
            .map(|r| r.api_key)
            .collect()
    }

    fn improvise(&self, request: &CompletionRequest) -> String {
        let last = request
            .messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        if last.contains("Target Color:") {
            let suspect = request
                .messages
                .iter()
                .find(|m| m.role == Role::System)
                .and_then(|m| first_opponent(&m.content))
                .unwrap_or("Blue");
            return format!(
                "Target Color: {suspect}\n\
                 Confidence: 65%\n\
                 Key Indicators:\n\
                 1. Replies arrived at a steady pace\n\
                 2. Phrasing stayed tidy the whole game\n\
                 3. Never picked up anyone else's slang\n\
                 Analysis Summary: {suspect} sounded a little too even. The others drifted more."
            );
        }

        let turn = self.index.fetch_add(1, Ordering::Relaxed);
        SMALL_TALK[turn % SMALL_TALK.len()].to_string()
    }
}

/// First color after "opponents' colors are" in a system prompt
fn first_opponent(system: &str) -> Option<&str> {
    let (_, rest) = system.split_once("opponents' colors are ")?;
    rest.split_whitespace()
        .next()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let start = Instant::now();
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request.clone());
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let scripted = self.script.lock().ok().and_then(|mut s| s.pop_front());
        let content = match scripted {
            Some(outcome) => outcome?,
            None => {
                if let Some(error) = &self.failure {
                    return Err(error.clone());
                }
                if self.responses.is_empty() {
                    self.improvise(&request)
                } else {
                    let idx = self.index.fetch_add(1, Ordering::Relaxed);
                    self.responses[idx % self.responses.len()].clone()
                }
            }
        };

        Ok(CompletionResponse {
            content,
            model: request.model,
            tokens_used: None,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turing_core::Message;

    fn request(messages: Vec<Message>) -> CompletionRequest {
        CompletionRequest::new(messages, "mock-model", 0.7)
    }

    #[tokio::test]
    async fn test_mock_cycles_responses() {
        let mock = MockProvider::new(vec!["one".into(), "two".into()]);
        let mut got = Vec::new();
        for _ in 0..3 {
            got.push(mock.complete(request(vec![])).await.unwrap().content);
        }
        assert_eq!(got, vec!["one", "two", "one"]);
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_scripted_then_improvise() {
        let mock = MockProvider::scripted(vec![Err(LlmError::RateLimited)]);
        assert_eq!(
            mock.complete(request(vec![])).await.unwrap_err(),
            LlmError::RateLimited
        );
        assert!(mock.complete(request(vec![])).await.is_ok());
    }

    #[tokio::test]
    async fn test_smart_mock_answers_analysis() {
        let mock = MockProvider::smart();
        let response = mock
            .complete(request(vec![
                Message::system("Be sly.\nYour color is Red. Your opponents' colors are Blue and Green."),
                Message::user("Target Color: [Color]"),
            ]))
            .await
            .unwrap();
        assert!(response.content.starts_with("Target Color: Blue\n"));
    }
}
