//! Payment history port (append-only ledger).

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::subscription::PaymentRecord;

#[async_trait]
pub trait PaymentHistoryRepository: Send + Sync {
    /// Append a record.
    ///
    /// # Errors
    ///
    /// - `Conflict` if a record with the same transaction id exists. Backed
    ///   by a unique index so concurrent duplicates still collapse to one.
    async fn append(&self, record: &PaymentRecord) -> Result<(), DomainError>;

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<PaymentRecord>, DomainError>;

    /// Newest first.
    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<PaymentRecord>, DomainError>;
}
