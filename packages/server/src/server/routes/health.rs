use axum::extract::Extension;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    workers: usize,
    jobs: usize,
}

/// Health check endpoint
///
/// All state is in-memory, so liveness reduces to reporting the worker
/// pool size and the number of tracked jobs.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            workers: state.worker_count,
            jobs: state.store.job_count(),
        }),
    )
}
