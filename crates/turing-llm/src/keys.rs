//! Rotating API key pool

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Newline-separated key list, handed out round-robin
///
/// The cursor advances on every [`KeyPool::next_key`] call whether or not
/// the request that used the key succeeds. Share it behind an `Arc` so all
/// seats draw from the same rotation.
#[derive(Debug, Default)]
pub struct KeyPool {
    keys: Vec<String>,
    next: AtomicUsize,
}

impl KeyPool {
    /// Build a pool from keys in rotation order; blank entries are dropped
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keys: keys
                .into_iter()
                .map(|k| k.as_ref().trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
            next: AtomicUsize::new(0),
        }
    }

    /// Parse newline-separated keys, first line first
    pub fn parse(text: &str) -> Self {
        Self::new(text.lines())
    }

    /// Load keys from a file
    ///
    /// A missing or unreadable file is logged and yields an empty pool;
    /// requests then go out without a key.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let pool = Self::parse(&text);
                tracing::info!(path = %path.display(), keys = pool.len(), "Loaded API key pool");
                pool
            }
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "Cannot read API key file, continuing without keys"
                );
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Take the key at the cursor and advance it by one (mod pool size)
    pub fn next_key(&self) -> Option<String> {
        let n = self.keys.len();
        if n == 0 {
            return None;
        }
        let idx = self
            .next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |i| Some((i + 1) % n))
            .unwrap_or_else(|i| i);
        self.keys.get(idx % n).cloned()
    }
}
