//! Worker pool executing jobs from the dispatch queue.
//!
//! Each worker is a long-lived loop:
//!
//! ```text
//! Worker
//!     │
//!     ├─► Pop a job id (interruptible; shutdown wins only at this boundary)
//!     ├─► Mark the record running
//!     ├─► Invoke the registered executor (offloaded, timeout-bounded)
//!     └─► Write success, or count the attempt and retry / fail
//! ```
//!
//! Workers hold no locks while executing user tasks and never crash the
//! process on task failure. Retried ids go back to the queue tail with no
//! backoff.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::error::TaskFailure;
use super::job::{Job, JobStatus};
use super::queue::DispatchQueue;
use super::registry::SharedTaskRegistry;
use super::store::JobStore;

/// A single worker loop.
struct Worker {
    worker_id: String,
    store: Arc<JobStore>,
    queue: Arc<DispatchQueue>,
    registry: SharedTaskRegistry,
}

impl Worker {
    /// Run until the shutdown token fires or the queue closes.
    ///
    /// Cancellation is only observed at the pop boundary, so an in-flight
    /// job always completes or re-enqueues before the loop exits.
    async fn run(self, shutdown: CancellationToken) {
        info!(worker_id = %self.worker_id, "worker starting");

        loop {
            let job_id = tokio::select! {
                _ = shutdown.cancelled() => break,
                popped = self.queue.dequeue() => match popped {
                    Some(job_id) => job_id,
                    None => break,
                },
            };

            self.process_job(job_id).await;
        }

        info!(worker_id = %self.worker_id, "worker stopped");
    }

    /// One iteration of the dispatch contract.
    async fn process_job(&self, job_id: Uuid) {
        let Some(job) = self.store.get_job(job_id) else {
            // Ids only enter the queue after the record is inserted, so a
            // missing record is an invariant violation. Fatal to this
            // iteration only.
            error!(worker_id = %self.worker_id, job_id = %job_id, "no record for dequeued job");
            return;
        };

        if job.status.is_terminal() {
            warn!(job_id = %job_id, status = ?job.status, "dequeued job already terminal, skipping");
            return;
        }

        self.store
            .update_job_status(job_id, JobStatus::Running, None, None);
        debug!(worker_id = %self.worker_id, job_id = %job_id, task = %job.task_name, "job started");

        match self.execute(&job).await {
            Ok(result) => {
                self.store
                    .update_job_status(job_id, JobStatus::Success, Some(result), None);
                info!(job_id = %job_id, task = %job.task_name, "job succeeded");
            }
            Err(failure) => self.record_failure(job_id, &job.task_name, failure),
        }
    }

    /// Invoke the executor for `job`, offloaded to its own task so this
    /// worker can abandon it at the timeout boundary.
    ///
    /// The spawned executor is aborted when the deadline fires; an executor
    /// that blocks its thread instead of awaiting may still run to natural
    /// completion in the background. Either way the worker proceeds at the
    /// deadline.
    async fn execute(&self, job: &Job) -> Result<serde_json::Value, TaskFailure> {
        if !self.registry.is_registered(&job.task_name) {
            return Err(TaskFailure::UnknownTask(job.task_name.clone()));
        }

        let registry = self.registry.clone();
        let task_name = job.task_name.clone();
        let payload = job.payload.clone();
        let handle: JoinHandle<anyhow::Result<serde_json::Value>> =
            tokio::spawn(async move { registry.invoke(&task_name, payload).await });
        let abort = handle.abort_handle();

        let joined = if let Some(limit) = job.timeout_duration() {
            match tokio::time::timeout(limit, handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    abort.abort();
                    return Err(TaskFailure::Timeout(limit.as_secs_f64()));
                }
            }
        } else {
            handle.await
        };

        match joined {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(err)) => Err(TaskFailure::Failed(err)),
            Err(join_err) => Err(join_failure(join_err)),
        }
    }

    /// Count the attempt, then either re-enqueue or transition to terminal
    /// failure per the retry rule.
    fn record_failure(&self, job_id: Uuid, task_name: &str, failure: TaskFailure) {
        let message = failure.to_string();

        self.store.increment_attempts(job_id);

        // Re-read for the post-increment attempt count.
        let Some(job) = self.store.get_job(job_id) else {
            error!(job_id = %job_id, "record vanished while recording failure");
            return;
        };

        if job.attempts < job.max_retries {
            self.store
                .update_job_status(job_id, JobStatus::Pending, None, None);
            self.queue.enqueue(job_id);
            warn!(
                job_id = %job_id,
                task = %task_name,
                attempts = job.attempts,
                max_retries = job.max_retries,
                error = %message,
                "job will be retried"
            );
        } else {
            self.store
                .update_job_status(job_id, JobStatus::Failed, None, Some(message.clone()));
            error!(
                job_id = %job_id,
                task = %task_name,
                attempts = job.attempts,
                error = %message,
                "job permanently failed"
            );
        }
    }
}

/// Map a join error on the offloaded executor to a failure class.
fn join_failure(err: JoinError) -> TaskFailure {
    match err.try_into_panic() {
        Ok(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "executor panicked".to_string());
            TaskFailure::Panicked(message)
        }
        Err(err) => TaskFailure::Failed(anyhow::Error::new(err)),
    }
}

/// A fixed pool of workers sharing one queue, store, and registry.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    shutdown: CancellationToken,
}

impl WorkerPool {
    /// Spawn `worker_count` worker loops.
    pub fn spawn(
        worker_count: usize,
        store: Arc<JobStore>,
        queue: Arc<DispatchQueue>,
        registry: SharedTaskRegistry,
    ) -> Self {
        let shutdown = CancellationToken::new();

        let handles = (0..worker_count)
            .map(|n| {
                let worker = Worker {
                    worker_id: format!("worker-{}", n + 1),
                    store: store.clone(),
                    queue: queue.clone(),
                    registry: registry.clone(),
                };
                tokio::spawn(worker.run(shutdown.clone()))
            })
            .collect();

        Self { handles, shutdown }
    }

    /// Number of workers in the pool.
    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// Signal shutdown and join each worker within `grace`.
    ///
    /// A worker finishes (or re-enqueues) its current job before observing
    /// the signal; one still busy past the grace period is abandoned with a
    /// warning.
    pub async fn shutdown(self, grace: Duration) {
        self.shutdown.cancel();

        for handle in self.handles {
            if tokio::time::timeout(grace, handle).await.is_err() {
                warn!("worker did not stop within grace period");
            }
        }
    }
}
