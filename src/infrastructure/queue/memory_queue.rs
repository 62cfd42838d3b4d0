use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tokio::time::timeout;

use crate::application::ports::{Delivery, WorkItem, WorkQueue, WorkQueueError};

/// In-process fallback queue. Pending items live in a bounded channel and do
/// not survive a restart; delivery is exactly-once within the process.
pub struct InMemoryWorkQueue {
    tx: mpsc::Sender<WorkItem>,
    rx: Mutex<mpsc::Receiver<WorkItem>>,
    poll: Duration,
}

impl InMemoryWorkQueue {
    pub fn new(capacity: usize, poll: Duration) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx,
            rx: Mutex::new(rx),
            poll,
        }
    }
}

#[async_trait]
impl WorkQueue for InMemoryWorkQueue {
    async fn enqueue(&self, item: WorkItem) -> Result<(), WorkQueueError> {
        self.tx.try_send(item).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => WorkQueueError::Full,
            mpsc::error::TrySendError::Closed(_) => WorkQueueError::Closed,
        })?;
        tracing::debug!(
            depth = self.tx.max_capacity() - self.tx.capacity(),
            "Work item queued"
        );
        Ok(())
    }

    async fn dequeue(&self) -> Result<Option<Delivery>, WorkQueueError> {
        let mut rx = self.rx.lock().await;
        match timeout(self.poll, rx.recv()).await {
            Ok(Some(item)) => Ok(Some(Delivery {
                item,
                attempt: 1,
                receipt: None,
            })),
            // The queue owns its sender, so a closed channel only happens on
            // teardown.
            Ok(None) => Ok(None),
            Err(_) => Ok(None),
        }
    }

    async fn ack(&self, _delivery: &Delivery) -> Result<(), WorkQueueError> {
        Ok(())
    }
}
