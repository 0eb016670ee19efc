//! Portfolio API - library for app logic and testing

pub mod config;
pub mod db;
pub mod editor;
pub mod error;
pub mod logging;
pub mod models;
pub mod notify;
pub mod routes;
pub mod state;
pub mod store;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

use config::AppConfig;
use notify::{NoopNotifier, Notifier, WebhookNotifier};
use state::{AppState, AuthConfig};
use store::memory::{MemoryContactStore, MemoryContentStore};
use store::postgres::{PgContactStore, PgContentStore};
use store::{ContactStore, ContentStore};

/// Configure CORS for the allow-listed origins. Requests from unlisted
/// origins get a response without the allow headers rather than an error.
pub fn configure_cors(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

/// Create and configure the application router.
pub fn create_app(state: AppState, allowed_origins: &[String]) -> Router {
    let cors = configure_cors(allowed_origins);
    tracing::info!("CORS configured for {} origin(s)", allowed_origins.len());

    Router::new()
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/verify", post(routes::auth::verify_token))
        .route(
            "/api/content",
            get(routes::content::get_content).put(routes::content::put_content),
        )
        .route(
            "/api/content/{section}",
            get(routes::content::get_section).put(routes::content::put_section),
        )
        .route(
            "/api/contact",
            post(routes::contact::submit).get(routes::contact::list),
        )
        .route(
            "/api/contact/{id}/status",
            patch(routes::contact::set_status),
        )
        .route("/api/contact/{id}", delete(routes::contact::delete))
        .route("/health", get(routes::health::health))
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        // Compress responses with gzip/br/zstd automatically
        .layer(CompressionLayer::new())
        // Global 2 MB request body cap
        .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024))
        .layer(cors)
        .with_state(state)
}

async fn build_stores(
    config: &AppConfig,
) -> (Arc<dyn ContentStore>, Arc<dyn ContactStore>) {
    if let Some(url) = &config.database_url {
        match db::connect(&db::DbConfig::new(url.clone())).await {
            Ok(pool) => {
                if let Err(e) = db::run_migrations(&pool).await {
                    tracing::error!("Failed to run database migrations: {}", e);
                }
                return (
                    Arc::new(PgContentStore::new(pool.clone())),
                    Arc::new(PgContactStore::new(pool)),
                );
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to initialize database pool: {}. Falling back to in-memory stores.",
                    e
                );
            }
        }
    } else {
        tracing::info!("DATABASE_URL not set. Running on in-memory stores.");
    }

    (
        Arc::new(MemoryContentStore::new()),
        Arc::new(MemoryContactStore::new()),
    )
}

fn build_notifier(config: &AppConfig) -> Arc<dyn Notifier> {
    match (&config.notify_webhook_url, &config.notify_to) {
        (Some(url), Some(to)) => {
            tracing::info!("Contact notifications enabled");
            Arc::new(WebhookNotifier::new(url.clone(), to.clone()))
        }
        _ => {
            tracing::info!("NOTIFY_WEBHOOK_URL / NOTIFY_TO not set. Notifications disabled.");
            Arc::new(NoopNotifier)
        }
    }
}

/// Run the server (used by main).
pub async fn run() {
    dotenvy::dotenv().ok();

    // Guards MUST be held for the programme's lifetime; dropping them early
    // shuts down background log-writer threads and loses buffered log lines.
    let _log_guards = logging::init();

    routes::health::init_start_time();

    let config = AppConfig::from_env();

    // Refuse to start in production with the insecure default JWT secret.
    if config.is_production() {
        if config.jwt_secret == config::DEFAULT_JWT_SECRET {
            panic!(
                "FATAL: JWT_SECRET must be set to a secure, unique value in production. \
                 Refusing to start with the default secret."
            );
        }

        // Warn (don't panic) about default admin credentials in production.
        let admin_password_set =
            std::env::var("ADMIN_PASSWORD_HASH").is_ok() || std::env::var("ADMIN_PASSWORD").is_ok();
        if !admin_password_set {
            tracing::warn!(
                "SECURITY: Neither ADMIN_PASSWORD_HASH nor ADMIN_PASSWORD is set. \
                 The fallback default password 'admin123' is insecure. \
                 Set ADMIN_PASSWORD_HASH to a bcrypt hash of a strong password."
            );
        }
    }

    let (content, contacts) = build_stores(&config).await;
    let notifier = build_notifier(&config);

    let state = AppState {
        content,
        contacts,
        notifier,
        auth: Arc::new(AuthConfig {
            admin_username: config.admin_username.clone(),
            admin_password_hash: config.admin_password_hash.clone(),
            jwt_secret: config.jwt_secret.clone(),
        }),
    };

    let app = create_app(state, &config.allowed_origins);

    // Bind address is configurable via HOST / PORT env vars, defaulting to
    // 127.0.0.1:3001 so existing dev setups keep working unchanged.
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid HOST/PORT configuration");
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}
