use async_trait::async_trait;

use crate::domain::{FileId, JobId};

/// Unit of pending work carried from submission to a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkItem {
    pub job_id: JobId,
    pub file_id: FileId,
}

/// One at-least-once delivery of a work item. `attempt` counts deliveries of
/// the same item; `receipt` identifies the delivery to the backend for `ack`.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub item: WorkItem,
    pub attempt: u32,
    pub receipt: Option<i64>,
}

#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Adds a work item. Must return quickly; a full queue is an error, not a
    /// wait.
    async fn enqueue(&self, item: WorkItem) -> Result<(), WorkQueueError>;

    /// Waits up to the backend's poll interval for the next item. `None`
    /// means nothing was available; callers loop.
    async fn dequeue(&self) -> Result<Option<Delivery>, WorkQueueError>;

    /// Marks the delivery as done so the backend will not redeliver it.
    async fn ack(&self, delivery: &Delivery) -> Result<(), WorkQueueError>;
}

#[derive(Debug, thiserror::Error)]
pub enum WorkQueueError {
    #[error("queue is full")]
    Full,
    #[error("queue is closed")]
    Closed,
    #[error("queue backend failed: {0}")]
    Backend(String),
}
