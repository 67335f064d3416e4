//! Submission and status endpoints for jobs.

use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::ErrorResponse;
use crate::kernel::jobs::{Job, JobStatus, NewJob};
use crate::server::app::AppState;

/// Body for `POST /jobs`.
#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default = "default_payload")]
    pub payload: Value,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default)]
    pub client_job_id: Option<String>,
    #[serde(default)]
    pub timeout: Option<f64>,
}

fn default_payload() -> Value {
    Value::Object(Default::default())
}

fn default_max_retries() -> u32 {
    3
}

#[derive(Debug, Serialize)]
pub struct CreateJobResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
}

/// Snapshot of a record as reported by the status endpoint.
#[derive(Debug, Serialize)]
pub struct JobView {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub task_name: String,
    pub attempts: u32,
    pub max_retries: u32,
    pub result: Option<Value>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Job> for JobView {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.job_id,
            status: job.status,
            task_name: job.task_name,
            attempts: job.attempts,
            max_retries: job.max_retries,
            result: job.result,
            error: job.error,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

/// Submit a job
///
/// Validates the task name, creates (or idempotently resolves) the record,
/// and enqueues newly created jobs for dispatch. A duplicate submission is
/// not re-enqueued; the original job already owns the execution.
pub async fn create_job_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<CreateJobRequest>,
) -> Response {
    let Some(task) = body.task.filter(|task| !task.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("task is required")),
        )
            .into_response();
    };

    let created = state.store.create_job(
        NewJob::builder()
            .task_name(task)
            .payload(body.payload)
            .max_retries(body.max_retries)
            .client_job_id(body.client_job_id)
            .timeout(body.timeout)
            .build(),
    );

    if created.is_created() {
        state.queue.enqueue(created.job_id());
    }

    (
        StatusCode::CREATED,
        Json(CreateJobResponse {
            job_id: created.job_id(),
            status: JobStatus::Pending,
        }),
    )
        .into_response()
}

/// Poll job status
///
/// Unknown and syntactically invalid ids both report not-found; readers
/// cannot probe the id space.
pub async fn get_job_handler(
    Extension(state): Extension<AppState>,
    Path(job_id): Path<String>,
) -> Response {
    let job = Uuid::parse_str(&job_id)
        .ok()
        .and_then(|job_id| state.store.get_job(job_id));

    match job {
        Some(job) => (StatusCode::OK, Json(JobView::from(job))).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Job not found")),
        )
            .into_response(),
    }
}
