//! Recording email sender for tests.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::ports::{EmailError, EmailMessage, EmailReceipt, EmailSender};

/// Records every accepted message. Addresses registered with
/// `failing_for` are rejected.
#[derive(Default)]
pub struct MockEmailSender {
    inner: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    sent: Vec<EmailMessage>,
    failing: HashSet<String>,
}

impl MockEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn failing_for(self, address: impl Into<String>) -> Self {
        self.state().failing.insert(address.into());
        self
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.state().sent.clone()
    }
}

#[async_trait]
impl EmailSender for MockEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt, EmailError> {
        let mut state = self.state();
        if state.failing.contains(&message.to) {
            return Err(EmailError::Rejected(format!("{} is suppressed", message.to)));
        }
        state.sent.push(message.clone());
        Ok(EmailReceipt {
            id: format!("mock-{}", state.sent.len()),
        })
    }
}
