use std::sync::Arc;

use crate::application::ports::{JobStore, JobStoreError, WorkItem, WorkQueue, WorkQueueError};
use crate::domain::{DownloadJob, FileId, JobId, JobStatus, JobUpdate, MAX_FILE_ID, MIN_FILE_ID};

pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub job_id: JobId,
    pub status: JobStatus,
    pub total_count: usize,
}

/// Validates a submission, writes the initial record and enqueues the work
/// item. Returns before any processing happens, so callers behind short proxy
/// timeouts always get an answer in near-constant time.
pub struct SubmissionService {
    store: Arc<dyn JobStore>,
    queue: Arc<dyn WorkQueue>,
    max_batch_size: usize,
}

impl SubmissionService {
    pub fn new(store: Arc<dyn JobStore>, queue: Arc<dyn WorkQueue>, max_batch_size: usize) -> Self {
        Self {
            store,
            queue,
            max_batch_size,
        }
    }

    /// Submits a batch of file ids. The whole batch is validated, but exactly
    /// one job is created, for the first id; `total_count` echoes the batch
    /// length so clients can see how the request was interpreted.
    #[tracing::instrument(skip(self))]
    pub async fn submit(&self, file_ids: &[i64]) -> Result<SubmissionReceipt, SubmissionError> {
        if file_ids.is_empty() {
            return Err(SubmissionError::EmptyBatch);
        }
        if file_ids.len() > self.max_batch_size {
            return Err(SubmissionError::BatchTooLarge {
                got: file_ids.len(),
                max: self.max_batch_size,
            });
        }

        let mut validated = Vec::with_capacity(file_ids.len());
        for &raw in file_ids {
            let file_id =
                FileId::try_from(raw).map_err(|_| SubmissionError::FileIdOutOfRange {
                    value: raw,
                    min: MIN_FILE_ID,
                    max: MAX_FILE_ID,
                })?;
            validated.push(file_id);
        }
        let file_id = validated[0];

        let job = DownloadJob::new(file_id);
        let job_id = job.id;
        self.store.insert(&job).await?;

        if let Err(e) = self
            .queue
            .enqueue(WorkItem { job_id, file_id })
            .await
        {
            // The record exists but no worker will ever see it; close it out
            // instead of leaving it Queued forever.
            if let Err(store_err) = self
                .store
                .apply(
                    job_id,
                    JobUpdate::Failed {
                        message: "Download could not be scheduled".to_string(),
                        processing_time_ms: 0,
                    },
                )
                .await
            {
                tracing::error!(
                    job_id = %job_id.as_uuid(),
                    error = %store_err,
                    "Failed to reconcile job after enqueue failure"
                );
            }
            return Err(SubmissionError::Queue(e));
        }

        tracing::info!(
            job_id = %job_id.as_uuid(),
            file_id = %file_id,
            batch_size = file_ids.len(),
            "Download job enqueued"
        );

        Ok(SubmissionReceipt {
            job_id,
            status: JobStatus::Queued,
            total_count: file_ids.len(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("no file ids supplied")]
    EmptyBatch,
    #[error("batch of {got} file ids exceeds the maximum of {max}")]
    BatchTooLarge { got: usize, max: usize },
    #[error("file id {value} is outside the allowed range {min}..={max}")]
    FileIdOutOfRange { value: i64, min: i64, max: i64 },
    #[error("job store: {0}")]
    Store(#[from] JobStoreError),
    #[error("work queue: {0}")]
    Queue(#[from] WorkQueueError),
}

impl SubmissionError {
    /// Validation failures are rejected synchronously and never create a
    /// record; everything else is an infrastructure fault.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SubmissionError::EmptyBatch
                | SubmissionError::BatchTooLarge { .. }
                | SubmissionError::FileIdOutOfRange { .. }
        )
    }
}
