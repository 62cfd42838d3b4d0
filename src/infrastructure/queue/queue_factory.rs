use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::application::ports::{WorkQueue, WorkQueueError};
use crate::presentation::config::{QueueBackendSetting, QueueSettings};

use super::memory_queue::InMemoryWorkQueue;
use super::pg_queue::PgWorkQueue;

pub struct WorkQueueFactory;

impl WorkQueueFactory {
    pub fn create(
        settings: &QueueSettings,
        pool: Option<&PgPool>,
    ) -> Result<Arc<dyn WorkQueue>, WorkQueueError> {
        let poll = Duration::from_millis(settings.poll_ms);
        match settings.backend {
            QueueBackendSetting::Memory => {
                Ok(Arc::new(InMemoryWorkQueue::new(settings.capacity, poll)))
            }
            QueueBackendSetting::Postgres => {
                let pool = pool.ok_or_else(|| {
                    WorkQueueError::Backend(
                        "postgres queue selected but no database pool configured".into(),
                    )
                })?;
                Ok(Arc::new(PgWorkQueue::new(
                    pool.clone(),
                    poll,
                    Duration::from_secs(settings.visibility_secs),
                )))
            }
        }
    }
}
