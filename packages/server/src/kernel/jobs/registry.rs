//! Task registry mapping task names to executors.
//!
//! The registry maps task name strings (e.g. "generate_monthly_bill") to
//! boxed async executors over opaque JSON payloads. It is built once at
//! startup, then shared read-only behind an `Arc`, so lookups from
//! concurrent workers need no locking.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::{anyhow, Result};

/// Type alias for the boxed async executor.
///
/// Executors take the job payload and produce an opaque result value, or
/// fail with a descriptive error.
type BoxedTask = Box<
    dyn Fn(serde_json::Value) -> Pin<Box<dyn Future<Output = Result<serde_json::Value>> + Send>>
        + Send
        + Sync,
>;

/// Registry that maps task names to executors.
///
/// Executors are arbitrary user code; the core only cares that they return
/// a value or an error. The registry itself is frozen after startup.
///
/// # Example
///
/// ```ignore
/// let mut registry = TaskRegistry::new();
/// registry.register("sum", sum_task);
///
/// // Later, in a worker
/// let result = registry.invoke("sum", payload).await?;
/// ```
#[derive(Default)]
pub struct TaskRegistry {
    tasks: HashMap<&'static str, BoxedTask>,
}

impl TaskRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
        }
    }

    /// Register an executor under a task name.
    ///
    /// Replaces any previous registration for the same name; registration
    /// happens during single-threaded startup, before the registry is
    /// shared.
    pub fn register<F, Fut>(&mut self, name: &'static str, task: F)
    where
        F: Fn(serde_json::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value>> + Send + 'static,
    {
        self.tasks
            .insert(name, Box::new(move |payload| Box::pin(task(payload))));
    }

    /// Run the executor registered under `name` on `payload`.
    ///
    /// Fails when the name is not registered, or when the executor itself
    /// fails.
    pub async fn invoke(&self, name: &str, payload: serde_json::Value) -> Result<serde_json::Value> {
        let task = self
            .tasks
            .get(name)
            .ok_or_else(|| anyhow!("unknown task: {name}"))?;
        task(payload).await
    }

    /// Check if a task name is registered.
    pub fn is_registered(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Get all registered task names.
    pub fn registered_names(&self) -> Vec<&'static str> {
        self.tasks.keys().copied().collect()
    }
}

/// Thread-safe registry wrapped in Arc.
pub type SharedTaskRegistry = Arc<TaskRegistry>;
