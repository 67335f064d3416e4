//! Dispatch queue of job ids awaiting worker pickup.
//!
//! An unbounded FIFO built on a tokio mpsc channel. The queue carries ids,
//! not records, so workers always read the latest record state from the
//! store on dispatch. The receiver sits behind an async mutex so any number
//! of workers can block on [`DispatchQueue::dequeue`]; each enqueued id is
//! delivered to exactly one of them.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Unbounded FIFO of job ids with a blocking consumer interface.
pub struct DispatchQueue {
    tx: UnboundedSender<Uuid>,
    rx: Mutex<UnboundedReceiver<Uuid>>,
}

impl Default for DispatchQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchQueue {
    /// Create a new empty queue.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }

    /// Append a job id to the tail. Never blocks.
    pub fn enqueue(&self, job_id: Uuid) {
        // The receiver lives as long as the queue, so the send cannot fail.
        let _ = self.tx.send(job_id);
    }

    /// Pop the head id, waiting until one is available.
    ///
    /// Cancel-safe: a consumer cancelled mid-wait (e.g. by a shutdown
    /// signal racing this future in a `select!`) loses no ids.
    pub async fn dequeue(&self) -> Option<Uuid> {
        self.rx.lock().await.recv().await
    }
}
