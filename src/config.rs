//! Configuration for the auth core.
//!
//! All knobs that were implicit in the surrounding service live here:
//! the signing secret and algorithm, per-purpose token lifetimes, the user
//! cache TTL, the rate-limit window, and the upstream call timeout.
//!
//! # Example
//!
//! ```rust
//! use warden::{AuthConfig, TokenConfig};
//! use chrono::Duration;
//!
//! let config = AuthConfig::new("an-obviously-test-secret-32-bytes!")
//!     .unwrap()
//!     .with_tokens(TokenConfig {
//!         access_ttl: Duration::minutes(30),
//!         ..Default::default()
//!     });
//! ```

use chrono::Duration;
use jsonwebtoken::Algorithm;

use crate::crypto::SecretString;
use crate::AuthError;

/// Minimum length of the signing secret in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Top-level configuration handed to the guard, codec, and recovery actions.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Process-wide token signing secret. Rotating it invalidates every
    /// outstanding token.
    pub secret: SecretString,
    /// Signing algorithm. Only the HMAC family is supported.
    pub algorithm: Algorithm,
    /// Per-purpose token lifetimes.
    pub tokens: TokenConfig,
    /// User snapshot cache settings.
    pub cache: CacheConfig,
    /// Fixed-window rate limit settings.
    pub rate_limit: RateLimitConfig,
    /// How long a store or mailer call may run before it is treated as
    /// unavailable.
    pub upstream_timeout: std::time::Duration,
}

impl AuthConfig {
    /// Creates a configuration with the given signing secret and defaults
    /// everywhere else.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the secret is shorter than
    /// [`MIN_SECRET_LENGTH`] bytes.
    pub fn new(secret: impl Into<SecretString>) -> Result<Self, AuthError> {
        let secret = secret.into();

        if secret.expose_secret().len() < MIN_SECRET_LENGTH {
            return Err(AuthError::Configuration(format!(
                "signing secret must be at least {MIN_SECRET_LENGTH} bytes, got {}",
                secret.expose_secret().len()
            )));
        }

        Ok(Self {
            secret,
            algorithm: Algorithm::HS256,
            tokens: TokenConfig::default(),
            cache: CacheConfig::default(),
            rate_limit: RateLimitConfig::default(),
            upstream_timeout: std::time::Duration::from_secs(5),
        })
    }

    /// Sets the signing algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets the token lifetimes.
    #[must_use]
    pub fn with_tokens(mut self, tokens: TokenConfig) -> Self {
        self.tokens = tokens;
        self
    }

    /// Sets the cache settings.
    #[must_use]
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Sets the rate limit settings.
    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Sets the upstream call timeout.
    #[must_use]
    pub fn with_upstream_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    /// Stricter lifetimes for deployments that favor a small exploitation
    /// window over convenience.
    ///
    /// # Errors
    ///
    /// Same secret-length requirement as [`AuthConfig::new`].
    pub fn strict(secret: impl Into<SecretString>) -> Result<Self, AuthError> {
        Ok(Self::new(secret)?.with_tokens(TokenConfig {
            access_ttl: Duration::minutes(15),
            reset_ttl: Duration::minutes(30),
            confirm_ttl: Duration::hours(12),
        }))
    }
}

/// Lifetimes for each token purpose.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Access token lifetime. Default: 1 hour.
    pub access_ttl: Duration,
    /// Password-reset token lifetime. Default: 1 hour.
    pub reset_ttl: Duration,
    /// Email-confirmation token lifetime. Default: 24 hours.
    pub confirm_ttl: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_ttl: Duration::hours(1),
            reset_ttl: Duration::hours(1),
            confirm_ttl: Duration::hours(24),
        }
    }
}

/// Settings for the user snapshot cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a cached snapshot may be served. Default: 15 minutes.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(15),
        }
    }
}

/// Settings for the fixed-window rate limiter.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests allowed per window. Default: 5.
    pub ceiling: u32,
    /// Window length. Default: 1 minute.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            ceiling: 5,
            window: Duration::minutes(1),
        }
    }
}
