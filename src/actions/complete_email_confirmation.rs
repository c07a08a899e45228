use std::sync::Arc;

use crate::cache::UserCache;
use crate::config::AuthConfig;
use crate::repository::{canonical_email, with_upstream_timeout, UserRepository};
use crate::token::{Purpose, TokenCodec};
use crate::AuthError;

/// Marks an account confirmed when a valid `email-confirm` token comes back.
pub struct CompleteEmailConfirmationAction<U: UserRepository> {
    users: U,
    codec: TokenCodec,
    cache: Arc<UserCache>,
    upstream_timeout: std::time::Duration,
}

impl<U: UserRepository> CompleteEmailConfirmationAction<U> {
    pub fn new(users: U, codec: TokenCodec, cache: Arc<UserCache>, config: &AuthConfig) -> Self {
        CompleteEmailConfirmationAction {
            users,
            codec,
            cache,
            upstream_timeout: config.upstream_timeout,
        }
    }

    /// Confirms the account named by a valid `email-confirm` token.
    ///
    /// Idempotent: confirming an already-confirmed account succeeds without
    /// touching the store.
    ///
    /// # Errors
    ///
    /// - `InvalidRecoveryToken` when the token fails to decode, expired,
    ///   carries a different purpose, or names an account that no longer
    ///   exists.
    /// - `UpstreamUnavailable` when the store fails or times out.
    #[tracing::instrument(name = "complete_email_confirmation", skip_all)]
    pub async fn execute(&self, token: &str) -> Result<(), AuthError> {
        let claims = self
            .codec
            .decode(token)
            .map_err(|_| AuthError::InvalidRecoveryToken)?;

        if claims.purpose != Purpose::EmailConfirm {
            return Err(AuthError::InvalidRecoveryToken);
        }

        let key = canonical_email(claims.subject());

        let user = with_upstream_timeout(
            self.upstream_timeout,
            "user store",
            self.users.find_user_by_email(&key),
        )
        .await?
        .ok_or(AuthError::InvalidRecoveryToken)?;

        if user.confirmed {
            return Ok(());
        }

        with_upstream_timeout(
            self.upstream_timeout,
            "user store",
            self.users.confirm_email(user.id),
        )
        .await?;

        self.cache.invalidate(&key);

        tracing::info!(user_id = user.id, "email confirmed");
        Ok(())
    }
}
