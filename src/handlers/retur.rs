use std::time::{Duration, Instant};

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    models::{ApproveReturn, CreateReturn, Return},
    AppState,
};

fn parse_id(raw: &str) -> AppResult<i64> {
    raw.parse().map_err(|_| AppError::invalid_input("Invalid ID format"))
}

async fn record(
    state: &AppState,
    operation: &str,
    backend: &str,
    elapsed: Duration,
    items: usize,
    ok: bool,
) {
    state
        .metrics
        .write()
        .await
        .record_raw(operation, backend, elapsed, items, ok);
}

// ── GET /retur ────────────────────────────────────────────────────────────────

pub async fn list_returns(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<Vec<Return>>)> {
    let start = Instant::now();
    let result = state.service.list().await;
    let elapsed = start.elapsed();
    let count = result.as_ref().map_or(0, Vec::len);
    record(&state, "list", "DB", elapsed, count, result.is_ok()).await;

    let returns = result?;
    info!(
        count = returns.len(),
        elapsed_ms = elapsed.as_millis(),
        "Listed returns"
    );

    Ok((StatusCode::OK, Json(returns)))
}

// ── POST /retur ───────────────────────────────────────────────────────────────

pub async fn create_return(
    State(state): State<AppState>,
    payload: Result<Json<CreateReturn>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Return>)> {
    let Json(payload) = payload?;

    let start = Instant::now();
    let result = state.service.create(&payload).await;
    record(&state, "create", "DB", start.elapsed(), 1, result.is_ok()).await;

    let created = result?;
    info!(id = created.id, item = %created.item, "Created return");

    Ok((StatusCode::CREATED, Json(created)))
}

// ── GET /retur/:id ────────────────────────────────────────────────────────────

pub async fn get_return(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<(StatusCode, Json<Return>)> {
    let id = parse_id(&raw_id)?;

    let start = Instant::now();
    let result = state.service.get(id).await;
    record(&state, "get", "DB", start.elapsed(), 1, result.is_ok()).await;

    Ok((StatusCode::OK, Json(result?)))
}

// ── POST /retur/:id/approve ───────────────────────────────────────────────────

pub async fn approve_return(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<ApproveReturn>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Return>)> {
    let id = parse_id(&raw_id)?;
    let Json(payload) = payload?;

    let start = Instant::now();
    let result = state.service.approve(id, &payload.refund_mode).await;
    record(&state, "approve", "DB", start.elapsed(), 1, result.is_ok()).await;

    let approved = result?;
    info!(id, refund_mode = %payload.refund_mode, "Approved return");

    Ok((StatusCode::OK, Json(approved)))
}

// ── DELETE /retur/:id/delete ──────────────────────────────────────────────────

pub async fn delete_return(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let id = parse_id(&raw_id)?;

    let start = Instant::now();
    let result = state.service.delete(id).await;
    record(&state, "delete", "DB", start.elapsed(), 1, result.is_ok()).await;

    let removed = result?;
    info!(id, item = %removed.item, "Deleted return, snapshot kept for undo");

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "message": format!("Return with ID {} deleted", id),
        })),
    ))
}

// ── POST /retur/undo ──────────────────────────────────────────────────────────

pub async fn undo_delete(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<Return>)> {
    let start = Instant::now();
    let result = state.service.undo().await;
    record(&state, "undo", "UndoBuffer", start.elapsed(), 1, result.is_ok()).await;

    let restored = result?;
    info!(id = restored.id, item = %restored.item, "Restored deleted return");

    Ok((StatusCode::OK, Json(restored)))
}

// ── GET /retur/undo ───────────────────────────────────────────────────────────

/// Whether an undo would currently succeed, and how deep the history is.
pub async fn undo_status(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let history = state.service.undo_buffer().lock().await;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "available": !history.is_empty(),
            "depth": history.len(),
        })),
    ))
}
