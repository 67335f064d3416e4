//! Failure classes for a single execution attempt.

use thiserror::Error;

/// Ways one execution attempt can fail.
///
/// Every variant drives the same retry path; the rendered string is what
/// lands in the job's `error` field once retries are exhausted.
#[derive(Debug, Error)]
pub enum TaskFailure {
    /// The executor did not finish within the job's timeout.
    #[error("job exceeded timeout of {0} seconds")]
    Timeout(f64),

    /// No executor is registered under the job's task name.
    #[error("unknown task: {0}")]
    UnknownTask(String),

    /// The executor panicked; carries the panic payload when it was a string.
    #[error("task panicked: {0}")]
    Panicked(String),

    /// The executor returned an error.
    #[error("{0}")]
    Failed(#[from] anyhow::Error),
}
