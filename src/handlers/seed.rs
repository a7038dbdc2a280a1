use std::time::Instant;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::{error::AppResult, seed, AppState};

#[derive(Debug, Deserialize)]
pub struct SeedParams {
    /// Number of returns to seed (default: 100, max: 10 000)
    pub count: Option<usize>,
}

// ── POST /seed ────────────────────────────────────────────────────────────────

pub async fn seed_returns(
    State(state): State<AppState>,
    Query(params): Query<SeedParams>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let count = params.count.unwrap_or(100).min(10_000);

    let start = Instant::now();
    let result = seed::seed_returns(state.service.store(), count).await;
    let elapsed = start.elapsed();
    let seeded = result.as_ref().map_or(0, Vec::len);
    state
        .metrics
        .write()
        .await
        .record_raw("seed", "DB", elapsed, seeded, result.is_ok());
    result?;

    let total_in_db = state.service.store().count().await?;

    info!(
        seeded,
        total_in_db,
        seed_ms = elapsed.as_millis(),
        "Seeding complete"
    );

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "seeded": seeded,
            "total_in_db": total_in_db,
            "seed_time_ms": elapsed.as_secs_f64() * 1000.0,
        })),
    ))
}
