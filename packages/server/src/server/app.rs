//! Application state and router assembly.

use std::sync::Arc;

use axum::extract::Extension;
use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::kernel::jobs::{DispatchQueue, JobStore};
use crate::server::routes::{create_job_handler, get_job_handler, health_handler};

/// Shared application state handed to every handler.
///
/// Submitters only touch the store and the queue; workers are wired
/// separately in `main` and communicate through the same two handles.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<JobStore>,
    pub queue: Arc<DispatchQueue>,
    pub worker_count: usize,
}

/// Build the axum application router.
pub fn build_app(store: Arc<JobStore>, queue: Arc<DispatchQueue>, worker_count: usize) -> Router {
    let state = AppState {
        store,
        queue,
        worker_count,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/jobs", post(create_job_handler))
        .route("/jobs/:job_id", get(get_job_handler))
        .route("/health", get(health_handler))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
