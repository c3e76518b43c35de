//! Guildhall server entry point.

use std::error::Error;
use std::sync::Arc;

use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use guildhall::adapters::auth::{Argon2Hasher, JwtTokenService};
use guildhall::adapters::email::{ResendConfig, ResendEmailSender};
use guildhall::adapters::gateway::{FlutterwaveConfig, FlutterwaveGateway};
use guildhall::adapters::http::{self, AppSettings, AppState, HttpOptions, Repositories};
use guildhall::adapters::{memory, postgres};
use guildhall::application::handlers::notification::BulkEmailSettings;
use guildhall::application::handlers::subscription::CheckoutSettings;
use guildhall::config::{AppConfig, ServerConfig};

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(server.log_level.clone()));
    let registry = tracing_subscriber::registry().with(filter);
    if server.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn postgres_repositories(pool: PgPool) -> Repositories {
    Repositories {
        users: Arc::new(postgres::PostgresUserRepository::new(pool.clone())),
        publications: Arc::new(postgres::PostgresPublicationRepository::new(pool.clone())),
        comments: Arc::new(postgres::PostgresCommentRepository::new(pool.clone())),
        news: Arc::new(postgres::PostgresNewsRepository::new(pool.clone())),
        events: Arc::new(postgres::PostgresEventRepository::new(pool.clone())),
        forum: Arc::new(postgres::PostgresForumRepository::new(pool.clone())),
        subscriptions: Arc::new(postgres::PostgresSubscriptionRepository::new(pool.clone())),
        plans: Arc::new(postgres::PostgresPlanRepository::new(pool.clone())),
        payments: Arc::new(postgres::PostgresPaymentHistoryRepository::new(pool.clone())),
        notifications: Arc::new(postgres::PostgresNotificationRepository::new(pool.clone())),
        communications: Arc::new(postgres::PostgresCommunicationRepository::new(pool)),
    }
}

fn memory_repositories() -> Repositories {
    Repositories {
        users: Arc::new(memory::InMemoryUserRepository::new()),
        publications: Arc::new(memory::InMemoryPublicationRepository::new()),
        comments: Arc::new(memory::InMemoryCommentRepository::new()),
        news: Arc::new(memory::InMemoryNewsRepository::new()),
        events: Arc::new(memory::InMemoryEventRepository::new()),
        forum: Arc::new(memory::InMemoryForumRepository::new()),
        subscriptions: Arc::new(memory::InMemorySubscriptionRepository::new()),
        plans: Arc::new(memory::InMemoryPlanRepository::new()),
        payments: Arc::new(memory::InMemoryPaymentHistoryRepository::new()),
        notifications: Arc::new(memory::InMemoryNotificationRepository::new()),
        communications: Arc::new(memory::InMemoryCommunicationRepository::new()),
    }
}

/// Waits for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    info!(environment = ?config.server.environment, "Starting guildhall");

    let repos = if config.database.is_configured() {
        let pool = postgres::connect(&config.database).await?;
        if config.database.run_migrations {
            postgres::migrate(&pool).await?;
            info!("Database migrations applied");
        }
        postgres_repositories(pool)
    } else {
        warn!("GUILDHALL__DATABASE__URL not set, using in-memory repositories");
        memory_repositories()
    };

    if !config.payment.is_configured() {
        warn!("Payment gateway not fully configured, paid checkout will fail");
    }

    let gateway = FlutterwaveGateway::new(
        FlutterwaveConfig::new(config.payment.secret_key.clone())
            .with_base_url(config.payment.base_url.clone()),
    );
    let email = ResendEmailSender::new(
        ResendConfig::new(config.email.api_key.clone(), config.email.from_header())
            .with_base_url(config.email.base_url.clone()),
    );
    let jwt = Arc::new(JwtTokenService::new(
        config.auth.jwt_secret(),
        config.auth.token_ttl(),
        repos.users.clone(),
    ));

    let settings = AppSettings {
        checkout: CheckoutSettings {
            redirect_url: config.payment.redirect_url.clone(),
        },
        webhook_secret: config.payment.webhook_hash.clone(),
        default_currency: config.payment.currency.clone(),
        bulk_email: BulkEmailSettings::new(config.email.batch_size, config.email.batch_delay()),
    };

    let state = AppState {
        repos,
        gateway: Arc::new(gateway),
        email: Arc::new(email),
        hasher: Arc::new(Argon2Hasher::new()),
        tokens: jwt.clone(),
        sessions: jwt,
        settings: Arc::new(settings),
    };

    let options = HttpOptions {
        cors_origins: config.server.cors_origins_list(),
        request_timeout: config.server.request_timeout(),
    };
    let app = http::app(state, &options);

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
