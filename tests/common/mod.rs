//! Shared harness for HTTP integration tests.
//!
//! Builds the full router over in-memory repositories, the mock gateway and
//! the mock email sender, with real JWT sessions and Argon2 hashing.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use guildhall::adapters::auth::{Argon2Hasher, JwtTokenService};
use guildhall::adapters::email::MockEmailSender;
use guildhall::adapters::gateway::MockPaymentGateway;
use guildhall::adapters::http::{app, AppSettings, AppState, HttpOptions, Repositories};
use guildhall::adapters::memory::{
    InMemoryCommentRepository, InMemoryCommunicationRepository, InMemoryEventRepository,
    InMemoryForumRepository, InMemoryNewsRepository, InMemoryNotificationRepository,
    InMemoryPaymentHistoryRepository, InMemoryPlanRepository, InMemoryPublicationRepository,
    InMemorySubscriptionRepository, InMemoryUserRepository,
};
use guildhall::application::handlers::notification::BulkEmailSettings;
use guildhall::application::handlers::subscription::CheckoutSettings;
use guildhall::domain::foundation::{Role, UserId};
use guildhall::ports::UserRepository;

pub const WEBHOOK_SECRET: &str = "test-webhook-hash";

pub struct TestApp {
    pub router: Router,
    pub repos: Repositories,
    pub gateway: Arc<MockPaymentGateway>,
    pub email: Arc<MockEmailSender>,
}

pub struct Member {
    pub id: UserId,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Self {
        let repos = Repositories {
            users: Arc::new(InMemoryUserRepository::new()),
            publications: Arc::new(InMemoryPublicationRepository::new()),
            comments: Arc::new(InMemoryCommentRepository::new()),
            news: Arc::new(InMemoryNewsRepository::new()),
            events: Arc::new(InMemoryEventRepository::new()),
            forum: Arc::new(InMemoryForumRepository::new()),
            subscriptions: Arc::new(InMemorySubscriptionRepository::new()),
            plans: Arc::new(InMemoryPlanRepository::new()),
            payments: Arc::new(InMemoryPaymentHistoryRepository::new()),
            notifications: Arc::new(InMemoryNotificationRepository::new()),
            communications: Arc::new(InMemoryCommunicationRepository::new()),
        };
        let gateway = Arc::new(MockPaymentGateway::new());
        let email = Arc::new(MockEmailSender::new());
        let jwt = Arc::new(JwtTokenService::new(
            SecretString::new("integration-test-secret-0123456789abcdef".to_string()),
            chrono::Duration::hours(1),
            repos.users.clone(),
        ));

        let state = AppState {
            repos: repos.clone(),
            gateway: gateway.clone(),
            email: email.clone(),
            hasher: Arc::new(Argon2Hasher::new()),
            tokens: jwt.clone(),
            sessions: jwt,
            settings: Arc::new(AppSettings {
                checkout: CheckoutSettings {
                    redirect_url: Some("https://guildhall.test/payment/callback".to_string()),
                },
                webhook_secret: WEBHOOK_SECRET.to_string(),
                default_currency: "NGN".to_string(),
                bulk_email: BulkEmailSettings::new(50, Duration::ZERO),
            }),
        };

        Self {
            router: app(state, &HttpOptions::default()),
            repos,
            gateway,
            email,
        }
    }

    /// Sends one request and returns the status with the decoded JSON body
    /// (`Value::Null` for an empty body).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.dispatch(request).await
    }

    pub async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    /// Registers a member through the API.
    pub async fn register(&self, name: &str, email: &str) -> Member {
        let (status, body) = self
            .post(
                "/api/auth/register",
                None,
                serde_json::json!({
                    "name": name,
                    "email": email,
                    "password": "correct horse battery"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        Member {
            id: body["user"]["id"].as_str().unwrap().parse().unwrap(),
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    /// Registers a member and grants `role` directly in the store.
    pub async fn staff(&self, name: &str, email: &str, role: Role) -> Member {
        let member = self.register(name, email).await;
        let mut user = self.repos.users.find_by_id(&member.id).await.unwrap().unwrap();
        user.role = role;
        self.repos.users.update(&user).await.unwrap();
        member
    }
}
