//! Interfaces of the external collaborators.
//!
//! The persistent user store and the outbound mailer are owned by the host
//! application; this crate consumes them through [`UserRepository`] and
//! [`Mailer`]. Enable the `mocks` feature for in-memory implementations
//! useful when testing a host.

mod mailer;
mod user;

#[cfg(any(test, feature = "mocks"))]
mod mailer_mock;
#[cfg(any(test, feature = "mocks"))]
mod user_mock;

pub use mailer::{MailMessage, Mailer};
pub use user::{canonical_email, NewUser, Role, User, UserRepository};

#[cfg(any(test, feature = "mocks"))]
pub use mailer_mock::MockMailer;
#[cfg(any(test, feature = "mocks"))]
pub use user_mock::MockUserRepository;

use std::future::Future;
use std::time::Duration;

use crate::AuthError;

/// Runs a collaborator call under `limit`, mapping a timeout to
/// `AuthError::UpstreamUnavailable` so a hung store or mailer never hangs
/// the request.
pub(crate) async fn with_upstream_timeout<T>(
    limit: Duration,
    what: &str,
    fut: impl Future<Output = Result<T, AuthError>>,
) -> Result<T, AuthError> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| AuthError::UpstreamUnavailable(format!("{what} timed out")))?
}
