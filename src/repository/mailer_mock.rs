#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::mailer::{MailMessage, Mailer};
use crate::AuthError;

/// Recording mailer for tests. Set `failing` to simulate delivery outages.
#[derive(Clone, Default)]
pub struct MockMailer {
    pub sent: Arc<Mutex<Vec<MailMessage>>>,
    failing: Arc<AtomicBool>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `send` fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of messages delivered so far.
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// The most recently delivered message.
    pub fn last_sent(&self) -> Option<MailMessage> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, message: MailMessage) -> Result<(), AuthError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AuthError::UpstreamUnavailable(
                "smtp connection refused".to_owned(),
            ));
        }

        self.sent
            .lock()
            .map_err(|_| AuthError::UpstreamUnavailable("mock mailer lock poisoned".to_owned()))?
            .push(message);
        Ok(())
    }
}
