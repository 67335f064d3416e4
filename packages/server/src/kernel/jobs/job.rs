//! Job record and lifecycle types.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle states for a job.
///
/// `Success` and `Failed` are terminal; a record never leaves a terminal
/// state. Workers own the transition discipline, the store just records
/// whatever it is told.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Pending,
    Running,
    Success,
    Failed,
}

impl JobStatus {
    /// Whether this status admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Failed)
    }
}

/// A tracked execution request for a named task.
///
/// Identity fields (`job_id`, `task_name`, `payload`, `created_at`) are set
/// once at creation; everything else is mutated by workers as the job moves
/// through the state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: Uuid,
    pub task_name: String,
    pub payload: serde_json::Value,
    pub status: JobStatus,
    /// Completed execution attempts; incremented after each failed attempt.
    pub attempts: u32,
    pub max_retries: u32,
    /// Per-attempt execution bound in seconds. `None` means unbounded.
    pub timeout: Option<f64>,
    /// Set only on the transition to `Success`.
    pub result: Option<serde_json::Value>,
    /// Set only on the transition to terminal `Failed`.
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// The per-attempt timeout as a [`Duration`], if one is set.
    ///
    /// Non-finite or negative values are treated as unbounded rather than
    /// tripping a panic deep in the worker.
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout.and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}
