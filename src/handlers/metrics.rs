use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::info;

use crate::{error::AppResult, AppState};

// ── GET /metrics ──────────────────────────────────────────────────────────────

pub async fn get_metrics(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let metrics = state.metrics.read().await;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "entry_count": metrics.entries.len(),
            "capacity": metrics.capacity(),
            "aggregated": metrics.aggregated(),
            "ascii_table": metrics.ascii_table(),
        })),
    ))
}

// ── GET /metrics/export/csv ───────────────────────────────────────────────────

pub async fn export_csv(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let csv = state.metrics.read().await.to_csv()?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"retur_metrics.csv\"",
            ),
        ],
        csv,
    ))
}

// ── DELETE /metrics ───────────────────────────────────────────────────────────

pub async fn reset_metrics(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let mut metrics = state.metrics.write().await;
    let cleared = metrics.entries.len();
    metrics.clear();

    info!(cleared, "Metrics cleared");

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "cleared": cleared })),
    ))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use std::sync::Arc;

    use tokio::sync::RwLock;
    use tower::ServiceExt;

    use crate::metrics::MetricsStore;
    use crate::test_state;

    #[tokio::test]
    async fn request_history_stays_within_capacity() {
        let (mut state, _) = test_state();
        state.metrics = Arc::new(RwLock::new(MetricsStore::with_capacity(16)));
        let metrics = state.metrics.clone();
        let app = crate::build_router(state);

        for _ in 0..200 {
            let list = Request::builder().uri("/retur").body(Body::empty()).unwrap();
            let response = app.clone().oneshot(list).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let metrics = metrics.read().await;
        assert_eq!(metrics.entries.len(), 16);
        assert_eq!(metrics.aggregated()[0].sample_count, 16);
    }

    #[tokio::test]
    async fn csv_export_is_served_as_attachment() {
        let (state, _) = test_state();
        let app = crate::build_router(state);

        let list = Request::builder().uri("/retur").body(Body::empty()).unwrap();
        app.clone().oneshot(list).await.unwrap();

        let req = Request::builder()
            .uri("/metrics/export/csv")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/csv");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert_eq!(body.lines().count(), 2);
        assert!(body.contains(",list,DB,"));
    }

    #[tokio::test]
    async fn reset_empties_the_store() {
        let (state, _) = test_state();
        let metrics = state.metrics.clone();
        let app = crate::build_router(state);

        let list = Request::builder().uri("/retur").body(Body::empty()).unwrap();
        app.clone().oneshot(list).await.unwrap();
        assert_eq!(metrics.read().await.entries.len(), 1);

        let req = Request::builder()
            .method(Method::DELETE)
            .uri("/metrics")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(metrics.read().await.entries.is_empty());
    }
}
