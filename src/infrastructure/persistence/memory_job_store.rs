use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{ApplyOutcome, JobStore, JobStoreError};
use crate::domain::{DownloadJob, JobId, JobUpdate};

struct Entry {
    job: DownloadJob,
    expires_at: Instant,
}

/// Process-local fallback store. No durability and no cross-process
/// visibility; records expire after the retention window.
pub struct InMemoryJobStore {
    entries: RwLock<HashMap<JobId, Entry>>,
    retention: Duration,
}

impl InMemoryJobStore {
    pub fn new(retention: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            retention,
        }
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn insert(&self, job: &DownloadJob) -> Result<(), JobStoreError> {
        let mut entries = self.entries.write().await;
        entries.insert(
            job.id,
            Entry {
                job: job.clone(),
                expires_at: Instant::now() + self.retention,
            },
        );
        Ok(())
    }

    async fn get(&self, id: JobId) -> Result<Option<DownloadJob>, JobStoreError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&id)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.job.clone()))
    }

    async fn apply(&self, id: JobId, update: JobUpdate) -> Result<ApplyOutcome, JobStoreError> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(&id) {
            None => Ok(ApplyOutcome::NotFound),
            Some(entry) if entry.expires_at <= Instant::now() => {
                entries.remove(&id);
                Ok(ApplyOutcome::NotFound)
            }
            Some(entry) => {
                if entry.job.apply(update) {
                    Ok(ApplyOutcome::Applied)
                } else {
                    Ok(ApplyOutcome::Discarded)
                }
            }
        }
    }

    async fn evict_expired(&self) -> Result<u64, JobStoreError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        let now = Instant::now();
        entries.retain(|_, entry| entry.expires_at > now);
        Ok((before - entries.len()) as u64)
    }
}
