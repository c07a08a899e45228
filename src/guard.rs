//! Bearer-token resolution and role policy.
//!
//! The guard is the sole source of the "current principal" for the
//! surrounding service: it verifies the presented token, resolves the
//! subject through the cache (falling through to the store on a miss), and
//! applies role policy. Ownership checks in the data layer lean entirely on
//! the principal this module returns.

use std::sync::Arc;

use chrono::Duration;

use crate::cache::UserCache;
use crate::config::AuthConfig;
use crate::repository::{canonical_email, with_upstream_timeout, Role, User, UserRepository};
use crate::token::{Purpose, TokenCodec};
use crate::AuthError;

/// Resolves principals from bearer tokens and enforces role policy.
pub struct AccessGuard<U: UserRepository> {
    users: U,
    codec: TokenCodec,
    cache: Arc<UserCache>,
    cache_ttl: Duration,
    upstream_timeout: std::time::Duration,
}

impl<U: UserRepository> AccessGuard<U> {
    /// Creates a guard over the given store, codec, and shared cache.
    ///
    /// The cache is `Arc`-shared so recovery actions can invalidate entries
    /// the guard populated.
    pub fn new(users: U, codec: TokenCodec, cache: Arc<UserCache>, config: &AuthConfig) -> Self {
        Self {
            users,
            codec,
            cache,
            cache_ttl: config.cache.ttl,
            upstream_timeout: config.upstream_timeout,
        }
    }

    /// Resolves the principal presenting `bearer_token`.
    ///
    /// Read-through composition: decode, try the cache, fall through to the
    /// store on a miss, and populate the cache before returning.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` for any token the codec rejects, a non-access
    ///   purpose, or a subject the store no longer knows; the three cases
    ///   are indistinguishable to the caller.
    /// - `UpstreamUnavailable` when the store fails or times out.
    #[tracing::instrument(name = "resolve_principal", skip_all)]
    pub async fn resolve(&self, bearer_token: &str) -> Result<User, AuthError> {
        let claims = self
            .codec
            .decode(bearer_token)
            .map_err(|_| AuthError::Unauthenticated)?;

        if claims.purpose != Purpose::Access {
            return Err(AuthError::Unauthenticated);
        }

        let key = canonical_email(claims.subject());

        if let Some(user) = self.cache.get(&key) {
            return Ok(user);
        }

        let found = with_upstream_timeout(
            self.upstream_timeout,
            "user store",
            self.users.find_user_by_email(&key),
        )
        .await?;

        // A valid token for a deleted principal is not authenticated.
        let user = found.ok_or(AuthError::Unauthenticated)?;

        self.cache.put(&key, user.clone(), self.cache_ttl);
        tracing::debug!(user_id = user.id, "principal cached after store lookup");

        Ok(user)
    }

    /// Requires `principal` to hold `role`. Admins satisfy any requirement.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden`: the caller is known but lacks privilege, a
    /// distinct condition from `Unauthenticated`.
    pub fn require_role(&self, principal: &User, role: Role) -> Result<(), AuthError> {
        if principal.role == role || principal.is_admin() {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }

    /// The shared cache this guard populates.
    pub fn cache(&self) -> &Arc<UserCache> {
        &self.cache
    }
}
