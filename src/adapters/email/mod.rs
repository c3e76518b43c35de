//! Email delivery adapters.

mod mock;
mod resend;

pub use mock::MockEmailSender;
pub use resend::{ResendConfig, ResendEmailSender, DEFAULT_BASE_URL as RESEND_BASE_URL};
