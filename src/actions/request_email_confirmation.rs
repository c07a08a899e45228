use chrono::Duration;

use super::DEFAULT_LINK_BASE;
use crate::config::AuthConfig;
use crate::repository::{canonical_email, with_upstream_timeout, MailMessage, Mailer, UserRepository};
use crate::token::{Purpose, TokenCodec};
use crate::AuthError;

/// Mints an `email-confirm` token and mails the confirmation link.
///
/// Same shape as the password-reset request: success-shaped for unknown
/// addresses, mailer failures swallowed after logging. Already-confirmed
/// accounts get no mail.
pub struct RequestEmailConfirmationAction<U: UserRepository, M: Mailer> {
    users: U,
    mailer: M,
    codec: TokenCodec,
    confirm_ttl: Duration,
    link_base: String,
    upstream_timeout: std::time::Duration,
}

impl<U: UserRepository, M: Mailer> RequestEmailConfirmationAction<U, M> {
    pub fn new(users: U, mailer: M, codec: TokenCodec, config: &AuthConfig) -> Self {
        RequestEmailConfirmationAction {
            users,
            mailer,
            codec,
            confirm_ttl: config.tokens.confirm_ttl,
            link_base: DEFAULT_LINK_BASE.to_owned(),
            upstream_timeout: config.upstream_timeout,
        }
    }

    /// Sets the base URL embedded in the confirmation link.
    #[must_use]
    pub fn with_link_base(mut self, link_base: impl Into<String>) -> Self {
        self.link_base = link_base.into();
        self
    }

    /// Requests an email-confirmation message for `email`.
    #[tracing::instrument(name = "request_email_confirmation", skip_all)]
    pub async fn execute(&self, email: &str) -> Result<(), AuthError> {
        let key = canonical_email(email);

        let user = with_upstream_timeout(
            self.upstream_timeout,
            "user store",
            self.users.find_user_by_email(&key),
        )
        .await?;

        let Some(user) = user else {
            tracing::info!("email confirmation requested for unknown email");
            return Ok(());
        };

        if user.confirmed {
            tracing::info!(user_id = user.id, "email already confirmed, no mail sent");
            return Ok(());
        }

        let token = self
            .codec
            .issue(&key, Purpose::EmailConfirm, self.confirm_ttl)
            .map_err(|_| AuthError::Configuration("token signing failed".to_owned()))?;

        let message = MailMessage {
            to: user.email.clone(),
            subject: "Confirm your email".to_owned(),
            body: format!(
                "Hi {},\n\nFollow this link to confirm your email address:\n{}/auth/confirm-email/{token}",
                user.username, self.link_base
            ),
        };

        match tokio::time::timeout(self.upstream_timeout, self.mailer.send(message)).await {
            Ok(Ok(())) => tracing::info!(user_id = user.id, "confirmation email dispatched"),
            Ok(Err(err)) => tracing::warn!(error = %err, "confirmation email delivery failed"),
            Err(_) => tracing::warn!("confirmation email delivery timed out"),
        }

        Ok(())
    }
}
