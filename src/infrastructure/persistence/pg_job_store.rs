use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{ApplyOutcome, JobStore, JobStoreError};
use crate::domain::{DownloadJob, FileId, JobId, JobStatus, JobUpdate};

/// Durable job store shared by every worker process. Records carry an
/// `expires_at` deadline so the retention window holds across restarts.
pub struct PgJobStore {
    pool: PgPool,
    retention: Duration,
}

impl PgJobStore {
    pub fn new(pool: PgPool, retention: Duration) -> Self {
        Self { pool, retention }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    #[instrument(skip(self, job), fields(job_id = %job.id.as_uuid()))]
    async fn insert(&self, job: &DownloadJob) -> Result<(), JobStoreError> {
        let retention = chrono::Duration::from_std(self.retention)
            .map_err(|e| JobStoreError::QueryFailed(e.to_string()))?;
        let expires_at = job.created_at + retention;

        sqlx::query(
            r#"
            INSERT INTO download_jobs
                (id, file_id, status, progress, download_url, size_bytes,
                 processing_time_ms, message, created_at, updated_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(job.file_id.as_i64())
        .bind(job.status.as_str())
        .bind(i16::from(job.progress))
        .bind(job.download_url.as_deref())
        .bind(job.size_bytes.map(|v| v as i64))
        .bind(job.processing_time_ms.map(|v| v as i64))
        .bind(&job.message)
        .bind(job.created_at)
        .bind(job.updated_at)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| JobStoreError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(job_id = %id.as_uuid()))]
    async fn get(&self, id: JobId) -> Result<Option<DownloadJob>, JobStoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, file_id, status, progress, download_url, size_bytes,
                   processing_time_ms, message, created_at, updated_at
            FROM download_jobs
            WHERE id = $1 AND expires_at > now()
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| JobStoreError::QueryFailed(e.to_string()))?;

        row.map(row_to_job).transpose()
    }

    /// Read-modify-write under a row lock: the freshly read status feeds the
    /// domain gate, so a tick that lost the race against a terminal write is
    /// discarded here exactly as it is in the in-memory backend.
    #[instrument(skip(self, update), fields(job_id = %id.as_uuid()))]
    async fn apply(&self, id: JobId, update: JobUpdate) -> Result<ApplyOutcome, JobStoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| JobStoreError::ConnectionFailed(e.to_string()))?;

        let row = sqlx::query(
            r#"
            SELECT id, file_id, status, progress, download_url, size_bytes,
                   processing_time_ms, message, created_at, updated_at
            FROM download_jobs
            WHERE id = $1 AND expires_at > now()
            FOR UPDATE
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| JobStoreError::QueryFailed(e.to_string()))?;

        let Some(row) = row else {
            return Ok(ApplyOutcome::NotFound);
        };
        let mut job = row_to_job(row)?;

        if !job.apply(update) {
            return Ok(ApplyOutcome::Discarded);
        }

        sqlx::query(
            r#"
            UPDATE download_jobs
            SET status = $2, progress = $3, download_url = $4, size_bytes = $5,
                processing_time_ms = $6, message = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(job.status.as_str())
        .bind(i16::from(job.progress))
        .bind(job.download_url.as_deref())
        .bind(job.size_bytes.map(|v| v as i64))
        .bind(job.processing_time_ms.map(|v| v as i64))
        .bind(&job.message)
        .bind(job.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| JobStoreError::QueryFailed(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| JobStoreError::QueryFailed(e.to_string()))?;

        Ok(ApplyOutcome::Applied)
    }

    #[instrument(skip(self))]
    async fn evict_expired(&self) -> Result<u64, JobStoreError> {
        let result = sqlx::query("DELETE FROM download_jobs WHERE expires_at <= now()")
            .execute(&self.pool)
            .await
            .map_err(|e| JobStoreError::QueryFailed(e.to_string()))?;
        Ok(result.rows_affected())
    }
}

fn row_to_job(row: PgRow) -> Result<DownloadJob, JobStoreError> {
    let id: Uuid = column(&row, "id")?;
    let file_id: i64 = column(&row, "file_id")?;
    let status: String = column(&row, "status")?;
    let progress: i16 = column(&row, "progress")?;
    let download_url: Option<String> = column(&row, "download_url")?;
    let size_bytes: Option<i64> = column(&row, "size_bytes")?;
    let processing_time_ms: Option<i64> = column(&row, "processing_time_ms")?;

    Ok(DownloadJob {
        id: JobId::from_uuid(id),
        file_id: FileId::try_from(file_id).map_err(JobStoreError::QueryFailed)?,
        status: status
            .parse::<JobStatus>()
            .map_err(JobStoreError::QueryFailed)?,
        progress: progress as u8,
        download_url,
        size_bytes: size_bytes.map(|v| v as u64),
        processing_time_ms: processing_time_ms.map(|v| v as u64),
        message: column(&row, "message")?,
        created_at: column(&row, "created_at")?,
        updated_at: column(&row, "updated_at")?,
    })
}

fn column<'r, T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>>(
    row: &'r PgRow,
    name: &str,
) -> Result<T, JobStoreError> {
    row.try_get(name)
        .map_err(|e| JobStoreError::QueryFailed(e.to_string()))
}
