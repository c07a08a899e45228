//! Authentication and access-control core for a user-scoped CRUD service.
//!
//! The crate covers the identity subsystem only: signed expiring tokens,
//! role policy, a TTL cache in front of user lookups, fixed-window rate
//! limiting, and the password-reset / email-confirmation lifecycle. The
//! persistent user store and the outbound mailer are collaborators the host
//! application provides through the traits in [`repository`].

pub mod actions;
pub mod cache;
pub mod config;
pub mod crypto;
pub mod guard;
pub mod rate_limit;
pub mod repository;
pub mod token;

use std::fmt;

pub use cache::UserCache;
pub use config::{AuthConfig, CacheConfig, RateLimitConfig, TokenConfig};
pub use crypto::{Argon2Hasher, PasswordHasher, SecretString};
pub use guard::AccessGuard;
pub use rate_limit::{InMemoryStore, RateLimitDecision, RateLimitStore, RateLimiter};
pub use repository::{canonical_email, MailMessage, Mailer, NewUser, Role, User, UserRepository};
pub use token::{Claims, InvalidToken, Purpose, TokenCodec};

#[cfg(any(test, feature = "mocks"))]
pub use repository::{MockMailer, MockUserRepository};

/// Every failure this crate can surface to the host application.
///
/// `Unauthenticated` and `InvalidRecoveryToken` deliberately carry no detail:
/// a caller (or an attacker reading responses) cannot tell a bad signature
/// from an expired or wrong-purpose token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Missing, malformed, expired, or wrong-purpose access token, or a
    /// valid token whose subject no longer exists.
    Unauthenticated,
    /// The principal is known but lacks the required role.
    Forbidden,
    /// The recovery token failed to decode, expired, or carried the wrong
    /// purpose.
    InvalidRecoveryToken,
    /// The fixed-window ceiling was exceeded for this client.
    RateLimited { retry_after_secs: i64 },
    /// The user store or mailer failed or timed out.
    UpstreamUnavailable(String),
    /// Hashing the supplied password failed.
    PasswordHash,
    /// Invalid configuration (bad secret, unsupported algorithm).
    Configuration(String),
}

impl std::error::Error for AuthError {}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Unauthenticated => write!(f, "Could not validate credentials"),
            AuthError::Forbidden => write!(f, "Insufficient privileges"),
            AuthError::InvalidRecoveryToken => write!(f, "Recovery token is invalid or expired"),
            AuthError::RateLimited { retry_after_secs } => {
                write!(f, "Too many requests, retry in {retry_after_secs}s")
            }
            AuthError::UpstreamUnavailable(msg) => write!(f, "Upstream unavailable: {msg}"),
            AuthError::PasswordHash => write!(f, "Failed to hash password"),
            AuthError::Configuration(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}
