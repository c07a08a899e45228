//! Credential recovery and email confirmation.
//!
//! One action struct per operation, generic over the collaborator traits so
//! hosts can wire in their own store and mailer (or the mocks in tests).
//! The flows are stateless: a recovery attempt is `Requested` when the token
//! is minted and mailed, and `Completed` when a valid token comes back with
//! a new secret. A failed decode returns the user to square one; nothing
//! server-side tracks the attempt.

mod complete_email_confirmation;
mod complete_password_reset;
mod request_email_confirmation;
mod request_password_reset;

pub use complete_email_confirmation::CompleteEmailConfirmationAction;
pub use complete_password_reset::CompletePasswordResetAction;
pub use request_email_confirmation::RequestEmailConfirmationAction;
pub use request_password_reset::RequestPasswordResetAction;

/// Default base for links embedded in outbound mail.
pub(crate) const DEFAULT_LINK_BASE: &str = "http://localhost:8000";
