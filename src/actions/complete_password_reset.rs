use std::sync::Arc;

use crate::cache::UserCache;
use crate::config::AuthConfig;
use crate::crypto::PasswordHasher;
use crate::repository::{canonical_email, with_upstream_timeout, UserRepository};
use crate::token::{Purpose, TokenCodec};
use crate::AuthError;

/// Completes a password recovery attempt: verifies the returned token,
/// persists the new password hash, and drops the principal's cache entry.
pub struct CompletePasswordResetAction<U: UserRepository, H: PasswordHasher> {
    users: U,
    hasher: H,
    codec: TokenCodec,
    cache: Arc<UserCache>,
    upstream_timeout: std::time::Duration,
}

impl<U: UserRepository, H: PasswordHasher> CompletePasswordResetAction<U, H> {
    pub fn new(
        users: U,
        hasher: H,
        codec: TokenCodec,
        cache: Arc<UserCache>,
        config: &AuthConfig,
    ) -> Self {
        CompletePasswordResetAction {
            users,
            hasher,
            codec,
            cache,
            upstream_timeout: config.upstream_timeout,
        }
    }

    /// Applies `new_password` to the account named by a valid
    /// `password-reset` token.
    ///
    /// # Errors
    ///
    /// - `InvalidRecoveryToken` when the token fails to decode, expired,
    ///   carries a different purpose, or names an account that no longer
    ///   exists. The caller cannot tell these cases apart.
    /// - `PasswordHash` when hashing the new password fails.
    /// - `UpstreamUnavailable` when the store fails or times out.
    #[tracing::instrument(name = "complete_password_reset", skip_all)]
    pub async fn execute(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let claims = self
            .codec
            .decode(token)
            .map_err(|_| AuthError::InvalidRecoveryToken)?;

        if claims.purpose != Purpose::PasswordReset {
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

        let hashed = self.hasher.hash(new_password)?;

        with_upstream_timeout(
            self.upstream_timeout,
            "user store",
            self.users.update_password(user.id, &hashed),
        )
        .await?;

        // Same logical operation as the write: the next read must not see
        // the pre-reset snapshot.
        self.cache.invalidate(&key);

        tracing::info!(user_id = user.id, "password reset completed");
        Ok(())
    }
}
