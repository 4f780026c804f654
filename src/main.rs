//! Condor Booking backend entry point.
//!
//! Wires configuration, the Postgres pool, the Izipay client, and the Brevo
//! mailer into the payment router and serves it. Configuration problems are
//! fatal at startup; the process never runs with missing gateway keys.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use condor_booking::adapters::email::BrevoMailer;
use condor_booking::adapters::gateway::IzipayClient;
use condor_booking::adapters::http::payments::{payment_routes, PaymentsAppState};
use condor_booking::adapters::postgres::PostgresPaymentRecordRepository;
use condor_booking::config::AppConfig;
use condor_booking::domain::payment::CallbackProcessor;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .idle_timeout(config.database.idle_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        tracing::info!("running database migrations");
        sqlx::migrate!().run(&pool).await?;
    }

    let store = Arc::new(PostgresPaymentRecordRepository::new(pool));
    let mailer = Arc::new(BrevoMailer::new(&config.email));
    let gateway = Arc::new(IzipayClient::new(config.gateway.clone()));

    let processor = Arc::new(CallbackProcessor::new(
        store,
        mailer.clone(),
        config.gateway.hmac_key.clone(),
        config.gateway.password.clone(),
        config.email.operator_email.clone(),
    ));

    let state = PaymentsAppState {
        processor,
        gateway,
        mailer,
    };

    let cors = if config.server.is_production() {
        let origins: Vec<_> = config
            .server
            .allowed_origins()
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::permissive()
    };

    let app = Router::new()
        .route("/health", get(health))
        .nest("/api/payments", payment_routes())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors)
        .with_state(state);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install ctrl-c handler");
    tracing::info!("shutdown signal received");
}
