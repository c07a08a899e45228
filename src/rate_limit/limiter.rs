use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::store::RateLimitStore;
use crate::config::RateLimitConfig;
use crate::AuthError;

/// Outcome of a rate limit check.
#[derive(Debug, Clone)]
pub enum RateLimitDecision {
    /// Request is allowed. Carries the remaining quota for this window.
    Allowed {
        remaining: u32,
        reset_at: DateTime<Utc>,
    },
    /// Request exceeded the window ceiling. Carries enough to build a
    /// "try again later" response.
    Limited { retry_after_secs: i64 },
}

impl RateLimitDecision {
    /// Returns true if the request is allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Returns true if the request is rate limited.
    pub fn is_limited(&self) -> bool {
        matches!(self, Self::Limited { .. })
    }

    /// Returns the retry-after value in seconds if limited.
    pub fn retry_after(&self) -> Option<i64> {
        match self {
            Self::Limited {
                retry_after_secs, ..
            } => Some(*retry_after_secs),
            Self::Allowed { .. } => None,
        }
    }
}

/// Fixed-window request counter keyed by client identity.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    ceiling: u32,
    window: Duration,
}

impl RateLimiter {
    /// Creates a limiter over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn RateLimitStore>, config: &RateLimitConfig) -> Self {
        Self {
            store,
            ceiling: config.ceiling,
            window: config.window,
        }
    }

    /// Counts one request for `client_key` and decides whether it may
    /// proceed. Exactly `ceiling` requests pass per window; the next is
    /// limited until the window rolls over.
    pub async fn check(&self, client_key: &str) -> Result<RateLimitDecision, AuthError> {
        let info = self.store.increment(client_key, self.window).await?;

        if info.count > self.ceiling {
            Ok(RateLimitDecision::Limited {
                retry_after_secs: info.retry_after_secs(),
            })
        } else {
            Ok(RateLimitDecision::Allowed {
                remaining: self.ceiling - info.count,
                reset_at: info.reset_at,
            })
        }
    }

    /// Convenience wrapper over [`check`](Self::check) returning a bare
    /// allow/deny.
    pub async fn allow(&self, client_key: &str) -> Result<bool, AuthError> {
        Ok(self.check(client_key).await?.is_allowed())
    }

    /// Counts one request and maps a limited outcome to
    /// [`AuthError::RateLimited`].
    pub async fn enforce(&self, client_key: &str) -> Result<(), AuthError> {
        match self.check(client_key).await? {
            RateLimitDecision::Allowed { .. } => Ok(()),
            RateLimitDecision::Limited { retry_after_secs } => {
                Err(AuthError::RateLimited { retry_after_secs })
            }
        }
    }

    /// Clears the window for `client_key`.
    pub async fn clear(&self, client_key: &str) -> Result<(), AuthError> {
        self.store.reset(client_key).await
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("ceiling", &self.ceiling)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::InMemoryStore;

    fn limiter(ceiling: u32) -> RateLimiter {
        RateLimiter::new(
            Arc::new(InMemoryStore::new()),
            &RateLimitConfig {
                ceiling,
                window: Duration::minutes(1),
            },
        )
    }

    #[tokio::test]
    async fn test_ceiling_allows_then_limits() {
        let limiter = limiter(5);

        for i in 0..5 {
            let decision = limiter.check("10.0.0.1").await.unwrap();
            assert!(decision.is_allowed(), "request {} should pass", i + 1);
        }

        let decision = limiter.check("10.0.0.1").await.unwrap();
        assert!(decision.is_limited());
        assert!(decision.retry_after().unwrap() >= 0);
    }

    #[tokio::test]
    async fn test_keys_do_not_share_quota() {
        let limiter = limiter(1);

        assert!(limiter.allow("10.0.0.1").await.unwrap());
        assert!(!limiter.allow("10.0.0.1").await.unwrap());

        assert!(limiter.allow("10.0.0.2").await.unwrap());
    }

    #[tokio::test]
    async fn test_enforce_maps_to_error() {
        let limiter = limiter(1);

        limiter.enforce("10.0.0.1").await.unwrap();

        let err = limiter.enforce("10.0.0.1").await.unwrap_err();
        assert!(matches!(err, AuthError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn test_clear_restores_quota() {
        let limiter = limiter(1);

        assert!(limiter.allow("10.0.0.1").await.unwrap());
        assert!(!limiter.allow("10.0.0.1").await.unwrap());

        limiter.clear("10.0.0.1").await.unwrap();
        assert!(limiter.allow("10.0.0.1").await.unwrap());
    }

    #[tokio::test]
    async fn test_remaining_counts_down() {
        let limiter = limiter(3);

        match limiter.check("10.0.0.1").await.unwrap() {
            RateLimitDecision::Allowed { remaining, .. } => assert_eq!(remaining, 2),
            RateLimitDecision::Limited { .. } => panic!("should be allowed"),
        }
    }
}
