use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{Delivery, WorkItem, WorkQueue, WorkQueueError};
use crate::domain::{FileId, JobId};

/// Durable queue backed by a claim table. Pending items survive restarts; a
/// claim that is never acked becomes eligible again after the visibility
/// window, which is what gives at-least-once delivery.
pub struct PgWorkQueue {
    pool: PgPool,
    poll: Duration,
    visibility: Duration,
}

impl PgWorkQueue {
    pub fn new(pool: PgPool, poll: Duration, visibility: Duration) -> Self {
        Self {
            pool,
            poll,
            visibility,
        }
    }
}

#[async_trait]
impl WorkQueue for PgWorkQueue {
    #[instrument(skip(self), fields(job_id = %item.job_id.as_uuid()))]
    async fn enqueue(&self, item: WorkItem) -> Result<(), WorkQueueError> {
        sqlx::query("INSERT INTO download_queue (job_id, file_id) VALUES ($1, $2)")
            .bind(item.job_id.as_uuid())
            .bind(item.file_id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| WorkQueueError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn dequeue(&self) -> Result<Option<Delivery>, WorkQueueError> {
        let visibility = chrono::Duration::from_std(self.visibility)
            .map_err(|e| WorkQueueError::Backend(e.to_string()))?;
        let cutoff = Utc::now() - visibility;

        let row = sqlx::query(
            r#"
            WITH next AS (
                SELECT id FROM download_queue
                WHERE claimed_at IS NULL OR claimed_at < $1
                ORDER BY enqueued_at
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            UPDATE download_queue AS q
            SET claimed_at = now(), attempts = q.attempts + 1
            FROM next
            WHERE q.id = next.id
            RETURNING q.id, q.job_id, q.file_id, q.attempts
            "#,
        )
        .bind(cutoff)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| WorkQueueError::Backend(e.to_string()))?;

        let Some(row) = row else {
            tokio::time::sleep(self.poll).await;
            return Ok(None);
        };

        let receipt: i64 = row
            .try_get("id")
            .map_err(|e| WorkQueueError::Backend(e.to_string()))?;
        let job_id: Uuid = row
            .try_get("job_id")
            .map_err(|e| WorkQueueError::Backend(e.to_string()))?;
        let file_id: i64 = row
            .try_get("file_id")
            .map_err(|e| WorkQueueError::Backend(e.to_string()))?;
        let attempts: i32 = row
            .try_get("attempts")
            .map_err(|e| WorkQueueError::Backend(e.to_string()))?;

        Ok(Some(Delivery {
            item: WorkItem {
                job_id: JobId::from_uuid(job_id),
                file_id: FileId::try_from(file_id).map_err(WorkQueueError::Backend)?,
            },
            attempt: attempts.max(1) as u32,
            receipt: Some(receipt),
        }))
    }

    async fn ack(&self, delivery: &Delivery) -> Result<(), WorkQueueError> {
        let Some(receipt) = delivery.receipt else {
            return Ok(());
        };
        sqlx::query("DELETE FROM download_queue WHERE id = $1")
            .bind(receipt)
            .execute(&self.pool)
            .await
            .map_err(|e| WorkQueueError::Backend(e.to_string()))?;
        Ok(())
    }
}
