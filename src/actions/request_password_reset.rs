use chrono::Duration;

use super::DEFAULT_LINK_BASE;
use crate::config::AuthConfig;
use crate::repository::{canonical_email, with_upstream_timeout, MailMessage, Mailer, UserRepository};
use crate::token::{Purpose, TokenCodec};
use crate::AuthError;

/// Starts a password recovery attempt: mints a `password-reset` token and
/// hands it to the mailer.
pub struct RequestPasswordResetAction<U: UserRepository, M: Mailer> {
    users: U,
    mailer: M,
    codec: TokenCodec,
    reset_ttl: Duration,
    link_base: String,
    upstream_timeout: std::time::Duration,
}

impl<U: UserRepository, M: Mailer> RequestPasswordResetAction<U, M> {
    pub fn new(users: U, mailer: M, codec: TokenCodec, config: &AuthConfig) -> Self {
        RequestPasswordResetAction {
            users,
            mailer,
            codec,
            reset_ttl: config.tokens.reset_ttl,
            link_base: DEFAULT_LINK_BASE.to_owned(),
            upstream_timeout: config.upstream_timeout,
        }
    }

    /// Sets the base URL embedded in the recovery link.
    #[must_use]
    pub fn with_link_base(mut self, link_base: impl Into<String>) -> Self {
        self.link_base = link_base.into();
        self
    }

    /// Requests a password reset for `email`.
    ///
    /// Returns `Ok(())` whether or not the account exists, and sends no mail
    /// for unknown addresses. The response shape never reveals which, so
    /// the endpoint cannot be used to enumerate accounts.
    ///
    /// Mailer failures are logged and swallowed: the token is already valid
    /// and the user can request again.
    #[tracing::instrument(name = "request_password_reset", skip_all)]
    pub async fn execute(&self, email: &str) -> Result<(), AuthError> {
        let key = canonical_email(email);

        let user = with_upstream_timeout(
            self.upstream_timeout,
            "user store",
            self.users.find_user_by_email(&key),
        )
        .await?;

        let Some(user) = user else {
            tracing::info!("password reset requested for unknown email");
            return Ok(());
        };

        let token = self
            .codec
            .issue(&key, Purpose::PasswordReset, self.reset_ttl)
            .map_err(|_| AuthError::Configuration("token signing failed".to_owned()))?;

        let message = MailMessage {
            to: user.email.clone(),
            subject: "Reset your password".to_owned(),
            body: format!(
                "Hi {},\n\nFollow this link to choose a new password:\n{}/auth/reset-password/{token}\n\nIf you did not ask for this, ignore this message.",
                user.username, self.link_base
            ),
        };

        match tokio::time::timeout(self.upstream_timeout, self.mailer.send(message)).await {
            Ok(Ok(())) => tracing::info!(user_id = user.id, "password reset email dispatched"),
            Ok(Err(err)) => tracing::warn!(error = %err, "password reset email delivery failed"),
            Err(_) => tracing::warn!("password reset email delivery timed out"),
        }

        Ok(())
    }
}
