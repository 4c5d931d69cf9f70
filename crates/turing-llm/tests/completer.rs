//! Key rotation and rate-limit behaviour of the retrying completer

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use turing_core::{ManualClock, Message};
use turing_llm::{
    KeyPool, LlmError, MockProvider, RetryConfig, RetryingCompleter, DEFAULT_FALLBACK,
};

fn keys(n: usize) -> Arc<KeyPool> {
    Arc::new(KeyPool::new((0..n).map(|i| format!("k{i}"))))
}

#[tokio::test]
async fn test_rotation_over_n_plus_one_calls() {
    let mock = Arc::new(MockProvider::constant("ok"));
    let clock = Arc::new(ManualClock::default());
    let completer = RetryingCompleter::new(mock.clone(), keys(3), clock, "llama3.2");

    for _ in 0..4 {
        completer.reply(vec![Message::user("hi")]).await;
    }

    let seen: Vec<String> = mock.keys_seen().into_iter().flatten().collect();
    assert_eq!(seen, vec!["k0", "k1", "k2", "k0"]);
}

#[tokio::test]
async fn test_rotation_advances_on_failure() {
    let mock = Arc::new(MockProvider::scripted(vec![
        Err(LlmError::RequestFailed("boom".into())),
        Ok("fine".into()),
    ]));
    let clock = Arc::new(ManualClock::default());
    let completer = RetryingCompleter::new(mock.clone(), keys(2), clock, "llama3.2");

    assert_eq!(completer.reply(vec![]).await, DEFAULT_FALLBACK);
    assert_eq!(completer.reply(vec![]).await, "fine");
    let seen: Vec<String> = mock.keys_seen().into_iter().flatten().collect();
    assert_eq!(seen, vec!["k0", "k1"]);
}

#[tokio::test]
async fn test_persistent_rate_limit_is_bounded() {
    let mock = Arc::new(MockProvider::failing(LlmError::RateLimited));
    let clock = Arc::new(ManualClock::default());
    let completer = RetryingCompleter::new(mock.clone(), keys(2), clock.clone(), "llama3.2");

    let err = completer
        .complete_messages(vec![Message::user("anyone?")])
        .await
        .unwrap_err();
    assert_eq!(err, LlmError::RetriesExhausted { attempts: 4 });
    assert_eq!(mock.call_count(), 4);
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(65); 3]);

    // Same path through reply() degrades to the fallback utterance
    assert_eq!(completer.reply(vec![]).await, DEFAULT_FALLBACK);
}

#[tokio::test]
async fn test_custom_retry_cap() {
    let mock = Arc::new(MockProvider::failing(LlmError::RateLimited));
    let clock = Arc::new(ManualClock::default());
    let completer = RetryingCompleter::new(mock.clone(), keys(1), clock.clone(), "m")
        .with_config(RetryConfig {
            max_retries: 1,
            fallback: "brb".to_string(),
            ..RetryConfig::default()
        });

    assert_eq!(completer.reply(vec![]).await, "brb");
    assert_eq!(mock.call_count(), 2);
    assert_eq!(clock.sleeps().len(), 1);
}

#[tokio::test]
async fn test_empty_pool_sends_without_key() {
    let mock = Arc::new(MockProvider::constant("ok"));
    let clock = Arc::new(ManualClock::default());
    let completer =
        RetryingCompleter::new(mock.clone(), Arc::new(KeyPool::default()), clock, "m");

    completer.reply(vec![]).await;
    assert_eq!(mock.keys_seen(), vec![None]);
}

#[test]
fn test_key_file_order() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "first").unwrap();
    writeln!(file).unwrap();
    writeln!(file, "second").unwrap();

    let pool = KeyPool::from_file(file.path());
    assert_eq!(pool.len(), 2);
    assert_eq!(pool.next_key().as_deref(), Some("first"));
    assert_eq!(pool.next_key().as_deref(), Some("second"));
    assert_eq!(pool.next_key().as_deref(), Some("first"));
}
