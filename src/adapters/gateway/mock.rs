//! Mock payment gateway for testing.
//!
//! Supports pre-registered transactions, error injection and a log of the
//! checkout requests received.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::ports::{
    CheckoutLink, CheckoutRequest, GatewayError, PaymentGateway, VerifiedTransaction,
};

#[derive(Default)]
pub struct MockPaymentGateway {
    inner: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    transactions: HashMap<String, VerifiedTransaction>,
    checkouts: Vec<CheckoutRequest>,
    verify_calls: usize,
    next_error: Option<GatewayError>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers a transaction the gateway will report on verification.
    pub fn with_transaction(self, transaction: VerifiedTransaction) -> Self {
        self.add_transaction(transaction);
        self
    }

    pub fn add_transaction(&self, transaction: VerifiedTransaction) {
        self.state()
            .transactions
            .insert(transaction.transaction_id.clone(), transaction);
    }

    /// The next call fails with `error`.
    pub fn fail_next(&self, error: GatewayError) {
        self.state().next_error = Some(error);
    }

    pub fn checkouts(&self) -> Vec<CheckoutRequest> {
        self.state().checkouts.clone()
    }

    /// Number of gateway calls of any kind.
    pub fn call_count(&self) -> usize {
        let state = self.state();
        state.checkouts.len() + state.verify_calls
    }

    fn take_error(&self) -> Option<GatewayError> {
        self.state().next_error.take()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutLink, GatewayError> {
        if let Some(err) = self.take_error() {
            return Err(err);
        }
        let link = format!("https://checkout.test/pay/{}", request.reference);
        self.state().checkouts.push(request);
        Ok(CheckoutLink { link })
    }

    async fn verify_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<VerifiedTransaction, GatewayError> {
        if let Some(err) = self.take_error() {
            return Err(err);
        }
        let mut state = self.state();
        state.verify_calls += 1;
        state
            .transactions
            .get(transaction_id)
            .cloned()
            .ok_or_else(|| {
                GatewayError::not_found(format!("transaction {} not found", transaction_id))
            })
    }

    async fn verify_by_reference(
        &self,
        reference: &str,
    ) -> Result<VerifiedTransaction, GatewayError> {
        if let Some(err) = self.take_error() {
            return Err(err);
        }
        let mut state = self.state();
        state.verify_calls += 1;
        state
            .transactions
            .values()
            .find(|t| t.reference == reference)
            .cloned()
            .ok_or_else(|| GatewayError::not_found(format!("reference {} not found", reference)))
    }
}
