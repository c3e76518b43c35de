//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `UserRepository`, `PublicationRepository`
//! - `SubscriptionRepository`, `PlanRepository`, `PaymentHistoryRepository`
//! - `NotificationRepository`, `CommunicationRepository`
//! - `NewsRepository`, `CommentRepository`, `EventRepository`, `ForumRepository`
//!
//! ## External Service Ports
//!
//! - `PaymentGateway` - hosted checkout and transaction verification
//! - `EmailSender` - transactional and bulk email
//!
//! ## Auth Ports
//!
//! - `SessionValidator`, `TokenIssuer`, `CredentialHasher`
//! - `AccessChecker` - active-subscription gate

mod access_checker;
mod content_repository;
mod credential_hasher;
mod email_sender;
mod notification_repository;
mod payment_gateway;
mod payment_history_repository;
mod publication_repository;
mod session_validator;
mod subscription_repository;
mod token_issuer;
mod user_repository;

pub use access_checker::AccessChecker;
pub use content_repository::{CommentRepository, EventRepository, ForumRepository, NewsRepository};
pub use credential_hasher::CredentialHasher;
pub use email_sender::{EmailError, EmailMessage, EmailReceipt, EmailSender};
pub use notification_repository::{CommunicationRepository, NotificationRepository};
pub use payment_gateway::{
    is_valid_transaction_id, CheckoutLink, CheckoutRequest, GatewayError, GatewayErrorCode,
    PaymentGateway, TransactionStatus, VerifiedTransaction,
};
pub use payment_history_repository::PaymentHistoryRepository;
pub use publication_repository::{PublicationQuery, PublicationRepository};
pub use session_validator::SessionValidator;
pub use subscription_repository::{PlanRepository, SubscriptionRepository};
pub use token_issuer::{IssuedToken, TokenIssuer};
pub use user_repository::UserRepository;
