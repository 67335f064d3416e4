//! In-memory job store: record map plus the idempotency index.
//!
//! A single mutex covers both maps so the check-and-insert pair behind
//! idempotent submission is atomic with respect to concurrent submitters.
//! Critical sections are short and perform no I/O. Lock poisoning is
//! recovered (`unwrap_or_else(|e| e.into_inner())`) so a panicking task can
//! never wedge the store.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use typed_builder::TypedBuilder;
use uuid::Uuid;

use super::job::{Job, JobStatus};

/// Options for creating a job.
#[derive(Clone, Debug, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct NewJob {
    /// The task to execute (should match a registered executor).
    pub task_name: String,
    /// Opaque payload handed to the executor.
    #[builder(default = serde_json::Value::Object(Default::default()))]
    pub payload: serde_json::Value,
    /// Maximum execution attempts before permanent failure.
    #[builder(default = 3)]
    pub max_retries: u32,
    /// Client-supplied idempotency key.
    #[builder(default)]
    pub client_job_id: Option<String>,
    /// Per-attempt timeout in seconds.
    #[builder(default)]
    pub timeout: Option<f64>,
}

/// Result of a create that accounts for idempotency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateResult {
    /// A fresh record was inserted.
    Created(Uuid),
    /// The idempotency key was already claimed; no record was created.
    Duplicate(Uuid),
}

impl CreateResult {
    /// Get the job id regardless of whether the record is new.
    pub fn job_id(&self) -> Uuid {
        match self {
            CreateResult::Created(id) | CreateResult::Duplicate(id) => *id,
        }
    }

    /// Returns true when a fresh record was inserted.
    pub fn is_created(&self) -> bool {
        matches!(self, CreateResult::Created(_))
    }
}

#[derive(Default)]
struct StoreInner {
    jobs: HashMap<Uuid, Job>,
    client_job_ids: HashMap<String, Uuid>,
}

/// Thread-safe repository of job records keyed by job id.
///
/// Records live for the process lifetime; there is no eviction and nothing
/// is persisted across restarts.
#[derive(Default)]
pub struct JobStore {
    inner: Mutex<StoreInner>,
}

impl JobStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a job record, or resolve to the existing id when the client
    /// key has been seen before. The first submission wins regardless of
    /// payload; index entries are permanent, so a key whose job is already
    /// terminal still resolves to that job.
    pub fn create_job(&self, new_job: NewJob) -> CreateResult {
        let now = Utc::now();
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(key) = &new_job.client_job_id {
            if let Some(existing) = inner.client_job_ids.get(key) {
                return CreateResult::Duplicate(*existing);
            }
        }

        let job = Job {
            job_id: Uuid::new_v4(),
            task_name: new_job.task_name,
            payload: new_job.payload,
            status: JobStatus::Pending,
            attempts: 0,
            max_retries: new_job.max_retries,
            timeout: new_job.timeout,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        };
        let job_id = job.job_id;

        if let Some(key) = new_job.client_job_id {
            inner.client_job_ids.insert(key, job_id);
        }
        inner.jobs.insert(job_id, job);

        CreateResult::Created(job_id)
    }

    /// Snapshot read of a record. The clone cannot tear under concurrent
    /// mutation.
    pub fn get_job(&self, job_id: Uuid) -> Option<Job> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .jobs
            .get(&job_id)
            .cloned()
    }

    /// Write `status` and optionally `result`/`error`, bumping `updated_at`.
    ///
    /// Returns false for an unknown id. State-machine legality is the
    /// worker's discipline, not enforced here.
    pub fn update_job_status(
        &self,
        job_id: Uuid,
        status: JobStatus,
        result: Option<serde_json::Value>,
        error: Option<String>,
    ) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let Some(job) = inner.jobs.get_mut(&job_id) else {
            return false;
        };

        job.status = status;
        if let Some(result) = result {
            job.result = Some(result);
        }
        if let Some(error) = error {
            job.error = Some(error);
        }
        job.updated_at = Utc::now();
        true
    }

    /// Atomically increment the attempt counter, bumping `updated_at`.
    pub fn increment_attempts(&self, job_id: Uuid) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let Some(job) = inner.jobs.get_mut(&job_id) else {
            return false;
        };

        job.attempts += 1;
        job.updated_at = Utc::now();
        true
    }

    /// Number of records in the store.
    pub fn job_count(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).jobs.len()
    }
}
