use std::sync::Arc;

use crate::application::ports::{JobStore, JobStoreError};
use crate::domain::{DownloadJob, JobId};

/// Read-only projection of job state for polling clients. Unknown and
/// expired ids are indistinguishable, both answer `NotFound`.
pub struct StatusService {
    store: Arc<dyn JobStore>,
}

impl StatusService {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    pub async fn status(&self, job_id: JobId) -> Result<DownloadJob, StatusError> {
        match self.store.get(job_id).await? {
            Some(job) => Ok(job),
            None => Err(StatusError::NotFound(job_id)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("no job found for id {}", .0.as_uuid())]
    NotFound(JobId),
    #[error("job store: {0}")]
    Store(#[from] JobStoreError),
}
