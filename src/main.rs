//! riskfuse decision service
//!
//! Online decision pipeline: ingests per-entity events, maintains rolling
//! window aggregates, fuses an external risk score and policy action into
//! a final allow/throttle/block decision, and records outcomes as rewards
//! for offline policy improvement.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                          RISKFUSE                              │
//! ├────────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌──────────────┐   ┌────────────────────────┐ │
//! │  │  Ingest  │──▶│ Window Store │──▶│  Fusion Engine         │ │
//! │  │  (Axum)  │   │ (per-entity) │   │  risk + policy + rules │ │
//! │  └──────────┘   └──────────────┘   └───────────┬────────────┘ │
//! │                                                ▼              │
//! │                 ┌──────────────┐        ┌─────────────┐       │
//! │                 │ Reward Mapper│◀──────▶│ PostgreSQL  │       │
//! │                 │ (outcomes)   │        │ (ledger)    │       │
//! │                 └──────────────┘        └─────────────┘       │
//! └────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod error;
mod features;
mod fusion;
mod handlers;
mod ingest;
mod models;
mod rewards;
mod signals;
mod telemetry;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use tokio::sync::mpsc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use features::WindowStore;
use fusion::{FusionEngine, RuleSet};
use signals::{HttpExplainer, HttpPolicyModel, HttpRiskScorer};

pub use error::{AppError, AppResult};

/// The engine variant wired at startup: HTTP collaborators all around
pub type Engine = FusionEngine<HttpRiskScorer, HttpPolicyModel, HttpExplainer>;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "riskfuse=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("riskfuse starting ({})...", config.environment);
    tracing::info!("Database: {}", config.database_url.split('@').last().unwrap_or("***"));

    // Install metrics recorder
    let metrics_handle = telemetry::init();

    // Initialize database pool
    let pool = db::create_pool(&config.database_url).await
        .expect("Failed to create database pool");

    // Run migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&pool).await
        .expect("Failed to run migrations");

    // Window store and fusion engine
    let store = Arc::new(WindowStore::new());
    let engine = Arc::new(build_engine(&config)
        .expect("Failed to build signal clients"));

    // Ingestion worker
    let (ingest_tx, ingest_rx) = mpsc::channel(config.ingest_queue);
    ingest::spawn_worker(store.clone(), ingest_rx, config.ingest_dedup_capacity);

    // Background sweeps
    spawn_compaction_sweep(store.clone(), config.compaction_interval);
    spawn_reconciliation_sweep(pool.clone(), config.reconcile_interval);

    // Build application state
    let state = AppState {
        pool,
        features: store,
        engine,
        ingest_tx,
        metrics: metrics_handle,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub features: Arc<WindowStore>,
    pub engine: Arc<Engine>,
    pub ingest_tx: mpsc::Sender<ingest::Event>,
    pub metrics: PrometheusHandle,
}

/// Wire the HTTP signal clients, each with its own timeout
fn build_engine(config: &config::Config) -> anyhow::Result<Engine> {
    Ok(FusionEngine::new(
        HttpRiskScorer::new(&config.risk_url, config.risk_timeout)?,
        HttpPolicyModel::new(&config.policy_url, config.policy_timeout)?,
        HttpExplainer::new(&config.explain_url, config.explain_timeout)?,
        RuleSet::default(),
    ))
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/metrics", get(handlers::metrics::render))
        .route("/decide", post(handlers::decide::decide))
        .route("/outcome", post(handlers::outcome::record))
        .route("/events", post(handlers::events::ingest))
        .route("/api/v1/features/:entity_id", get(handlers::features::get))
        .route("/api/v1/training/records", get(handlers::training::records))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

/// Periodically drop window-store entries older than the largest window
fn spawn_compaction_sweep(store: Arc<WindowStore>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // first tick fires immediately
        loop {
            ticker.tick().await;
            let removed = store.compact();
            if removed > 0 {
                tracing::debug!(
                    "Compaction removed {} entries ({} entities tracked)",
                    removed,
                    store.entity_count()
                );
            }
        }
    });
}

/// Periodically backfill rewards for outcomes that lost theirs
fn spawn_reconciliation_sweep(pool: PgPool, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match models::outcome::reconcile_rewards(&pool).await {
                Ok(0) => {}
                Ok(repaired) => {
                    tracing::info!("Reconciliation backfilled {} rewards", repaired);
                }
                Err(err) => {
                    tracing::warn!("Reward reconciliation failed: {}", err);
                }
            }
        }
    });
}
