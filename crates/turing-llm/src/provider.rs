//! Completion provider trait and common types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use turing_core::Message;

/// Errors from completion providers
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LlmError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Provider not available")]
    NotAvailable,
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Still rate limited after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

/// A chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Ordered conversation, system message first
    pub messages: Vec<Message>,
    /// Model identifier understood by the backend
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Key chosen by rotation; `None` when the pool is empty
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>, model: &str, temperature: f32) -> Self {
        Self {
            messages,
            model: model.to_string(),
            temperature,
            api_key: None,
        }
    }
}

/// A completion returned by a backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The generated text
    pub content: String,
    /// Model that answered
    pub model: String,
    /// Tokens used (if reported)
    pub tokens_used: Option<u32>,
    /// Time taken in milliseconds
    pub latency_ms: u64,
}

/// A chat-completion backend
#[async_trait]
pub trait CompletionProvider: Send + Sync + std::fmt::Debug {
    /// Short backend name used in logs
    fn name(&self) -> &str;

    /// Probe whether the backend answers at all
    async fn is_available(&self) -> bool;

    /// Run one completion attempt
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}
