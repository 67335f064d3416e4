//! Shared test harness: the full application stack in-process, with a live
//! worker pool and the builtin task library.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use jobqueue_core::kernel::jobs::{DispatchQueue, JobStore, TaskRegistry, WorkerPool};
use jobqueue_core::server::build_app;
use jobqueue_core::tasks::register_builtin_tasks;
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    pub app: Router,
    pub store: Arc<JobStore>,
    // Keeps the pool's shutdown token alive for the duration of the test.
    _pool: WorkerPool,
}

impl TestApp {
    /// Spin up the stack with `worker_count` workers.
    pub fn spawn(worker_count: usize) -> Self {
        let mut registry = TaskRegistry::new();
        register_builtin_tasks(&mut registry);
        let registry = Arc::new(registry);

        let store = Arc::new(JobStore::new());
        let queue = Arc::new(DispatchQueue::new());
        let pool = WorkerPool::spawn(worker_count, store.clone(), queue.clone(), registry);
        let app = build_app(store.clone(), queue, worker_count);

        Self {
            app,
            store,
            _pool: pool,
        }
    }

    /// `POST /jobs` with a JSON body.
    pub async fn post_job(&self, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/jobs")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("request completes");
        read_json(response).await
    }

    /// `GET /jobs/{job_id}`.
    pub async fn get_job(&self, job_id: &str) -> (StatusCode, Value) {
        self.get(&format!("/jobs/{job_id}")).await
    }

    /// `GET` an arbitrary path.
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .expect("request builds");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("request completes");
        read_json(response).await
    }

    /// Poll the status endpoint until the job reaches a terminal status.
    pub async fn wait_for_terminal(&self, job_id: &str, limit: Duration) -> Value {
        let deadline = tokio::time::Instant::now() + limit;
        loop {
            let (status, body) = self.get_job(job_id).await;
            if status == StatusCode::OK {
                if let Some("success") | Some("failed") = body["status"].as_str() {
                    return body;
                }
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "job {job_id} did not reach a terminal status within {limit:?}; last seen: {body}"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body is JSON")
    };
    (status, value)
}
