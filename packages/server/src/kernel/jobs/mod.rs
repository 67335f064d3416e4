//! Job lifecycle engine: store, dispatch queue, task registry, workers.
//!
//! # Architecture
//!
//! ```text
//! Submitter (HTTP handler)
//!     │
//!     ├─► JobStore::create_job (idempotency index decides new vs existing)
//!     └─► DispatchQueue::enqueue(job_id)   [only for newly created jobs]
//!
//! Worker (N long-lived loops)
//!     │
//!     ├─► DispatchQueue::dequeue
//!     ├─► JobStore: mark running
//!     ├─► TaskRegistry::invoke (offloaded, timeout-bounded)
//!     └─► JobStore: success, or count attempt and retry / fail
//! ```
//!
//! State is process-local and lost at shutdown. The queue carries ids, not
//! records, so workers always observe the latest record state on dispatch.

mod error;
mod job;
mod queue;
mod registry;
mod store;
mod worker;

pub use error::TaskFailure;
pub use job::{Job, JobStatus};
pub use queue::DispatchQueue;
pub use registry::{SharedTaskRegistry, TaskRegistry};
pub use store::{CreateResult, JobStore, NewJob};
pub use worker::WorkerPool;
