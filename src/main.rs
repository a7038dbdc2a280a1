use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

mod config;
mod db;
mod error;
mod handlers;
mod metrics;
mod models;
mod seed;
mod service;
mod undo;

use crate::config::Config;
use crate::db::PgReturnStore;
use crate::metrics::MetricsStore;
use crate::service::ReturnService;
use crate::undo::UndoBuffer;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: ReturnService,
    pub metrics: Arc<RwLock<MetricsStore>>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().or_else(|_| {
                tracing_subscriber::EnvFilter::try_new("info,retur_service=debug")
            })?,
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Retur Service  - Rust + Axum        ║");
    info!("║  create · approve · delete · undo    ║");
    info!("╚══════════════════════════════════════╝");

    info!("Connecting to PostgreSQL...");
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    info!("Database connection pool established.");

    info!("Running migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Migrations complete.");

    let state = AppState {
        service: ReturnService::new(Arc::new(PgReturnStore::new(pool)), UndoBuffer::new()),
        metrics: Arc::new(RwLock::new(MetricsStore::with_capacity(
            config.metrics_capacity,
        ))),
    };

    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Listening on http://{}", addr);
    info!("Undo history is process-local and is lost on restart.");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        // ── Health ──────────────────────────────────────────────────────────
        .route("/health", get(handlers::health))

        // ── Returns ─────────────────────────────────────────────────────────
        .route(
            "/retur",
            get(handlers::retur::list_returns).post(handlers::retur::create_return),
        )
        .route(
            "/retur/undo",
            get(handlers::retur::undo_status).post(handlers::retur::undo_delete),
        )
        .route("/retur/:id", get(handlers::retur::get_return))
        .route("/retur/:id/approve", post(handlers::retur::approve_return))
        .route("/retur/:id/delete", delete(handlers::retur::delete_return))

        // ── Seed ────────────────────────────────────────────────────────────
        .route("/seed", post(handlers::seed::seed_returns))

        // ── Metrics ─────────────────────────────────────────────────────────
        .route(
            "/metrics",
            get(handlers::metrics::get_metrics).delete(handlers::metrics::reset_metrics),
        )
        .route("/metrics/export/csv", get(handlers::metrics::export_csv))

        // ── Middleware ──────────────────────────────────────────────────────
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) fn test_state() -> (AppState, Arc<db::InMemoryReturnStore>) {
    let store = Arc::new(db::InMemoryReturnStore::new());
    let state = AppState {
        service: ReturnService::new(store.clone(), UndoBuffer::new()),
        metrics: Arc::new(RwLock::new(MetricsStore::default())),
    };
    (state, store)
}
