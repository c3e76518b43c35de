//! Shared application state for every router.
//!
//! Holds the Arc-wrapped ports and runtime settings. Handlers are cheap to
//! build, so they are created per request from the state.

use std::sync::Arc;

use crate::application::handlers::content::{
    CommentsHandler, EventsHandler, ForumHandler, NewsHandler,
};
use crate::application::handlers::notification::{
    BulkEmailSettings, ListCommunicationsHandler, NotificationInboxHandler, Notifier,
    SendBulkEmailHandler,
};
use crate::application::handlers::publication::{
    CreatePublicationHandler, DeletePublicationHandler, ModeratePublicationHandler,
    PublicationQueryHandler, UpdatePublicationHandler,
};
use crate::application::handlers::subscription::{
    CancelSubscriptionHandler, CheckoutSettings, GetSubscriptionStatusHandler,
    HandlePaymentWebhookHandler, InitializePaymentHandler, ManagePlansHandler,
    PaymentHistoryHandler, SubscriptionAccessChecker, VerifyPaymentHandler,
};
use crate::application::handlers::user::{
    LoginHandler, ManageUsersHandler, ProfileHandler, RegisterHandler,
};
use crate::application::handlers::AuthorDirectory;
use crate::domain::subscription::WebhookVerifier;
use crate::ports::{
    CommentRepository, CommunicationRepository, CredentialHasher, EmailSender, EventRepository,
    ForumRepository, NewsRepository, NotificationRepository, PaymentGateway,
    PaymentHistoryRepository, PlanRepository, PublicationRepository, SessionValidator,
    SubscriptionRepository, TokenIssuer, UserRepository,
};

/// Persistence ports, one per aggregate.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub publications: Arc<dyn PublicationRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub news: Arc<dyn NewsRepository>,
    pub events: Arc<dyn EventRepository>,
    pub forum: Arc<dyn ForumRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub plans: Arc<dyn PlanRepository>,
    pub payments: Arc<dyn PaymentHistoryRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub communications: Arc<dyn CommunicationRepository>,
}

/// Runtime knobs taken from configuration.
#[derive(Debug, Clone, Default)]
pub struct AppSettings {
    pub checkout: CheckoutSettings,
    /// Shared secret expected in the `verif-hash` webhook header.
    pub webhook_secret: String,
    pub default_currency: String,
    pub bulk_email: BulkEmailSettings,
}

#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub gateway: Arc<dyn PaymentGateway>,
    pub email: Arc<dyn EmailSender>,
    pub hasher: Arc<dyn CredentialHasher>,
    pub tokens: Arc<dyn TokenIssuer>,
    pub sessions: Arc<dyn SessionValidator>,
    pub settings: Arc<AppSettings>,
}

impl AppState {
    fn authors(&self) -> AuthorDirectory {
        AuthorDirectory::new(self.repos.users.clone())
    }

    fn notifier(&self) -> Notifier {
        Notifier::new(self.repos.notifications.clone())
    }

    // Users

    pub fn register_handler(&self) -> RegisterHandler {
        RegisterHandler::new(self.repos.users.clone(), self.hasher.clone(), self.tokens.clone())
    }

    pub fn login_handler(&self) -> LoginHandler {
        LoginHandler::new(self.repos.users.clone(), self.hasher.clone(), self.tokens.clone())
    }

    pub fn profile_handler(&self) -> ProfileHandler {
        ProfileHandler::new(self.repos.users.clone())
    }

    pub fn manage_users_handler(&self) -> ManageUsersHandler {
        ManageUsersHandler::new(self.repos.users.clone())
    }

    // Publications

    pub fn create_publication_handler(&self) -> CreatePublicationHandler {
        CreatePublicationHandler::new(
            self.repos.publications.clone(),
            self.repos.users.clone(),
            self.notifier(),
        )
    }

    pub fn publication_query_handler(&self) -> PublicationQueryHandler {
        PublicationQueryHandler::new(self.repos.publications.clone(), self.authors())
    }

    pub fn update_publication_handler(&self) -> UpdatePublicationHandler {
        UpdatePublicationHandler::new(self.repos.publications.clone())
    }

    pub fn delete_publication_handler(&self) -> DeletePublicationHandler {
        DeletePublicationHandler::new(self.repos.publications.clone(), self.repos.comments.clone())
    }

    pub fn moderate_publication_handler(&self) -> ModeratePublicationHandler {
        ModeratePublicationHandler::new(self.repos.publications.clone(), self.notifier())
    }

    // Subscriptions

    pub fn initialize_payment_handler(&self) -> InitializePaymentHandler {
        InitializePaymentHandler::new(
            self.repos.subscriptions.clone(),
            self.repos.plans.clone(),
            self.repos.users.clone(),
            self.gateway.clone(),
            self.settings.checkout.clone(),
        )
    }

    pub fn verify_payment_handler(&self) -> VerifyPaymentHandler {
        VerifyPaymentHandler::new(
            self.repos.subscriptions.clone(),
            self.repos.plans.clone(),
            self.repos.payments.clone(),
            self.repos.users.clone(),
            self.gateway.clone(),
            self.email.clone(),
        )
    }

    pub fn subscription_status_handler(&self) -> GetSubscriptionStatusHandler {
        GetSubscriptionStatusHandler::new(self.repos.subscriptions.clone())
    }

    pub fn cancel_subscription_handler(&self) -> CancelSubscriptionHandler {
        CancelSubscriptionHandler::new(self.repos.subscriptions.clone())
    }

    pub fn payment_history_handler(&self) -> PaymentHistoryHandler {
        PaymentHistoryHandler::new(self.repos.payments.clone())
    }

    pub fn plans_handler(&self) -> ManagePlansHandler {
        ManagePlansHandler::new(
            self.repos.plans.clone(),
            self.repos.subscriptions.clone(),
            self.settings.default_currency.clone(),
        )
    }

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            self.repos.subscriptions.clone(),
            self.repos.payments.clone(),
            WebhookVerifier::new(self.settings.webhook_secret.clone()),
        )
    }

    // Notifications and communications

    pub fn inbox_handler(&self) -> NotificationInboxHandler {
        NotificationInboxHandler::new(self.repos.notifications.clone())
    }

    pub fn bulk_email_handler(&self) -> SendBulkEmailHandler {
        SendBulkEmailHandler::new(
            self.repos.users.clone(),
            self.repos.subscriptions.clone(),
            self.email.clone(),
            self.repos.communications.clone(),
            self.settings.bulk_email,
        )
    }

    pub fn communications_handler(&self) -> ListCommunicationsHandler {
        ListCommunicationsHandler::new(self.repos.communications.clone())
    }

    // Community content

    pub fn news_handler(&self) -> NewsHandler {
        NewsHandler::new(self.repos.news.clone())
    }

    pub fn comments_handler(&self) -> CommentsHandler {
        CommentsHandler::new(
            self.repos.comments.clone(),
            self.repos.publications.clone(),
            self.authors(),
            self.notifier(),
        )
    }

    pub fn events_handler(&self) -> EventsHandler {
        EventsHandler::new(
            self.repos.events.clone(),
            Arc::new(SubscriptionAccessChecker::new(self.repos.subscriptions.clone())),
        )
    }

    pub fn forum_handler(&self) -> ForumHandler {
        ForumHandler::new(self.repos.forum.clone(), self.authors(), self.notifier())
    }
}
