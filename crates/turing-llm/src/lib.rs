//! # Turing LLM
//!
//! Completion backends for Turing Game seats.
//!
//! ## Supported Backends
//!
//! | Provider | Type | Key Required |
//! |----------|------|--------------|
//! | Groq | API | key file |
//! | OpenAI | API | key file |
//! | Ollama | Local | None |
//! | Mock | Testing | None |
//!
//! Seats never call a backend directly. They go through a
//! [`RetryingCompleter`], which rotates keys from a shared [`KeyPool`],
//! retries rate-limited requests after a fixed backoff and falls back to a
//! canned utterance on failure.
//!
//! ```rust
//! use std::sync::Arc;
//! use turing_core::{Message, TokioClock};
//! use turing_llm::{KeyPool, MockProvider, RetryingCompleter};
//!
//! #[tokio::main]
//! async fn main() {
//!     let completer = RetryingCompleter::new(
//!         Arc::new(MockProvider::constant("not much, you?")),
//!         Arc::new(KeyPool::default()),
//!         Arc::new(TokioClock),
//!         "llama3.2",
//!     );
//!     let text = completer.reply(vec![Message::user("Red: what's up?")]).await;
//!     assert_eq!(text, "not much, you?");
//! }
//! ```

pub mod config;
pub mod keys;
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod provider;
pub mod retry;

pub use config::{ConfigError, LlmConfig, ProviderKind};
pub use keys::KeyPool;
pub use mock::MockProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiCompatibleProvider;
pub use provider::{CompletionProvider, CompletionRequest, CompletionResponse, LlmError};
pub use retry::{RetryConfig, RetryingCompleter, DEFAULT_FALLBACK};
