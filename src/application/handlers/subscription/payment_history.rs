use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::subscription::PaymentRecord;
use crate::ports::PaymentHistoryRepository;

/// Caller's payment ledger, newest first.
pub struct PaymentHistoryHandler {
    payments: Arc<dyn PaymentHistoryRepository>,
}

impl PaymentHistoryHandler {
    pub fn new(payments: Arc<dyn PaymentHistoryRepository>) -> Self {
        Self { payments }
    }

    pub async fn handle(&self, user_id: &UserId) -> Result<Vec<PaymentRecord>, DomainError> {
        self.payments.list_by_user(user_id).await
    }
}
