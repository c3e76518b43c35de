//! Payment gateway adapters.
//!
//! - `FlutterwaveGateway` - REST client for the hosted checkout API
//! - `MockPaymentGateway` - scripted gateway for tests and local runs

mod flutterwave;
mod mock;

pub use flutterwave::{
    FlutterwaveConfig, FlutterwaveGateway, DEFAULT_BASE_URL as FLUTTERWAVE_BASE_URL,
};
pub use mock::MockPaymentGateway;
