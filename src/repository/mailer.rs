use async_trait::async_trait;

use crate::AuthError;

/// An outbound email carrying a recovery or confirmation link.
#[derive(Debug, Clone)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// The email-delivery collaborator.
///
/// Delivery is fire-and-forget from this crate's perspective: the recovery
/// actions log a failed `send` and carry on, because the minted token stays
/// valid regardless of delivery outcome.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<(), AuthError>;
}
