//! Provider configuration
//!
//! Reads `TURING_*` environment variables; command-line flags override the
//! resulting values in the binary.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::ollama::OllamaProvider;
use crate::openai::OpenAiCompatibleProvider;
use crate::provider::CompletionProvider;
use crate::retry::RetryConfig;
use crate::{KeyPool, MockProvider};

/// Error types for configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown provider: {0} (expected openai, groq, ollama or mock)")]
    UnknownProvider(String),
}

/// Completion backend selected at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Groq,
    Ollama,
    Mock,
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "groq" => Ok(Self::Groq),
            "ollama" => Ok(Self::Ollama),
            "mock" => Ok(Self::Mock),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OpenAi => "openai",
            Self::Groq => "groq",
            Self::Ollama => "ollama",
            Self::Mock => "mock",
        };
        f.write_str(name)
    }
}

/// Completion backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Backend (env: TURING_PROVIDER)
    pub provider: ProviderKind,
    /// Model identifier (env: TURING_MODEL)
    pub model: String,
    /// Override the backend's base URL (env: TURING_BASE_URL)
    pub base_url: Option<String>,
    /// Newline-separated key file (env: TURING_API_KEYS_FILE)
    pub api_keys_file: Option<PathBuf>,
    /// Per-attempt timeout in seconds (env: TURING_TIMEOUT_SECS)
    pub timeout_secs: u64,
    /// Retries after a rate limit (env: TURING_MAX_RETRIES)
    pub max_retries: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Groq,
            model: "llama3.2".to_string(),
            base_url: None,
            api_keys_file: Some(PathBuf::from("groq_api_keys.txt")),
            timeout_secs: 8,
            max_retries: 3,
            temperature: 0.7,
        }
    }
}

impl LlmConfig {
    /// Load configuration from environment variables
    ///
    /// Unparseable values are logged and replaced by their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            provider: env::var("TURING_PROVIDER")
                .ok()
                .and_then(|v| match v.parse() {
                    Ok(kind) => Some(kind),
                    Err(e) => {
                        tracing::warn!(error = %e, "Ignoring TURING_PROVIDER");
                        None
                    }
                })
                .unwrap_or(defaults.provider),
            model: env::var("TURING_MODEL").unwrap_or(defaults.model),
            base_url: env::var("TURING_BASE_URL").ok(),
            api_keys_file: env::var("TURING_API_KEYS_FILE")
                .ok()
                .map(PathBuf::from)
                .or(defaults.api_keys_file),
            timeout_secs: env::var("TURING_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            max_retries: env::var("TURING_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_retries),
            temperature: defaults.temperature,
        }
    }

    /// Whether this backend sends API keys at all
    pub fn uses_keys(&self) -> bool {
        matches!(self.provider, ProviderKind::OpenAi | ProviderKind::Groq)
    }

    /// Instantiate the configured backend
    pub fn build_provider(&self) -> Arc<dyn CompletionProvider> {
        match (self.provider, self.base_url.as_deref()) {
            (ProviderKind::OpenAi, Some(url)) => Arc::new(OpenAiCompatibleProvider::new("openai", url)),
            (ProviderKind::OpenAi, None) => Arc::new(OpenAiCompatibleProvider::openai()),
            (ProviderKind::Groq, Some(url)) => Arc::new(OpenAiCompatibleProvider::new("groq", url)),
            (ProviderKind::Groq, None) => Arc::new(OpenAiCompatibleProvider::groq()),
            (ProviderKind::Ollama, Some(url)) => Arc::new(OllamaProvider::with_url(url)),
            (ProviderKind::Ollama, None) => Arc::new(OllamaProvider::new()),
            (ProviderKind::Mock, _) => Arc::new(MockProvider::smart()),
        }
    }

    /// Load the key pool, empty when unset or unreadable
    pub fn key_pool(&self) -> KeyPool {
        match &self.api_keys_file {
            Some(path) if self.uses_keys() => KeyPool::from_file(path),
            _ => KeyPool::default(),
        }
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            timeout: Duration::from_secs(self.timeout_secs),
            ..RetryConfig::default()
        }
    }
}
