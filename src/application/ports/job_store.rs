use async_trait::async_trait;

use crate::domain::{DownloadJob, JobId, JobUpdate};

/// Result of applying a [`JobUpdate`] through a store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The transition was legal and the record was written.
    Applied,
    /// The transition was rejected by the status gate (terminal record or
    /// progress regression) and the stored record is untouched.
    Discarded,
    /// No record exists for the id, either never created or evicted.
    NotFound,
}

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn insert(&self, job: &DownloadJob) -> Result<(), JobStoreError>;

    async fn get(&self, id: JobId) -> Result<Option<DownloadJob>, JobStoreError>;

    /// Applies the update behind the backend's status gate. Backends must
    /// evaluate the gate and the write atomically with respect to other
    /// writers of the same record.
    async fn apply(&self, id: JobId, update: JobUpdate) -> Result<ApplyOutcome, JobStoreError>;

    /// Drops records past their retention window. Returns how many were
    /// evicted.
    async fn evict_expired(&self) -> Result<u64, JobStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum JobStoreError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
}
