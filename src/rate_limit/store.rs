use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::AuthError;

/// Snapshot of one client's current window.
#[derive(Debug, Clone)]
pub struct WindowInfo {
    /// Requests counted in the current window, including this one.
    pub count: u32,
    /// When the window rolls over.
    pub reset_at: DateTime<Utc>,
}

impl WindowInfo {
    /// Seconds until the window rolls over, clamped to zero.
    pub fn retry_after_secs(&self) -> i64 {
        (self.reset_at - Utc::now()).num_seconds().max(0)
    }
}

/// Storage for rate-limit windows.
///
/// Implement this for a shared backend (redis, postgres) when running
/// multiple instances; the in-memory store is per-process.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Counts one request against `key`, as an atomic read-modify-write.
    ///
    /// Starts a fresh window (count 1) when the key is absent or its window
    /// has rolled over.
    async fn increment(&self, key: &str, window: Duration) -> Result<WindowInfo, AuthError>;

    /// Returns the current window without counting a request.
    async fn get(&self, key: &str) -> Result<Option<WindowInfo>, AuthError>;

    /// Drops the window for `key`.
    async fn reset(&self, key: &str) -> Result<(), AuthError>;
}

/// Per-process fixed-window store.
///
/// Windows shard across a [`DashMap`], so clients with different keys never
/// contend and the increment-and-compare for one key is atomic.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    windows: DashMap<String, WindowInfo>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            windows: DashMap::new(),
        }
    }

    /// Drops every rolled-over window. Call periodically in long-running
    /// processes to bound memory growth.
    pub fn cleanup_expired(&self) {
        let now = Utc::now();
        self.windows.retain(|_, info| info.reset_at > now);
    }
}

#[async_trait]
impl RateLimitStore for InMemoryStore {
    async fn increment(&self, key: &str, window: Duration) -> Result<WindowInfo, AuthError> {
        let now = Utc::now();

        let mut entry = self
            .windows
            .entry(key.to_owned())
            .or_insert_with(|| WindowInfo {
                count: 0,
                reset_at: now + window,
            });

        if entry.reset_at <= now {
            // Window rolled over, start a new one
            entry.count = 1;
            entry.reset_at = now + window;
        } else {
            entry.count += 1;
        }

        Ok(entry.value().clone())
    }

    async fn get(&self, key: &str) -> Result<Option<WindowInfo>, AuthError> {
        Ok(self.windows.get(key).map(|info| info.value().clone()))
    }

    async fn reset(&self, key: &str) -> Result<(), AuthError> {
        self.windows.remove(key);
        Ok(())
    }
}
