use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::application::ports::{JobStore, JobStoreError};
use crate::presentation::config::{StoreBackendSetting, StoreSettings};

use super::memory_job_store::InMemoryJobStore;
use super::pg_job_store::PgJobStore;

/// Builds the job store once at composition time; nothing downstream ever
/// branches on the backend again.
pub struct JobStoreFactory;

impl JobStoreFactory {
    pub fn create(
        settings: &StoreSettings,
        pool: Option<&PgPool>,
    ) -> Result<Arc<dyn JobStore>, JobStoreError> {
        let retention = Duration::from_secs(settings.retention_hours * 3600);
        match settings.backend {
            StoreBackendSetting::Memory => Ok(Arc::new(InMemoryJobStore::new(retention))),
            StoreBackendSetting::Postgres => {
                let pool = pool.ok_or_else(|| {
                    JobStoreError::ConnectionFailed(
                        "postgres store selected but no database pool configured".into(),
                    )
                })?;
                Ok(Arc::new(PgJobStore::new(pool.clone(), retention)))
            }
        }
    }
}
