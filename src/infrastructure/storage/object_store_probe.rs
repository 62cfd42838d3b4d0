use std::sync::Arc;

use async_trait::async_trait;
use object_store::ObjectStore;
use object_store::path::Path as StorePath;

use crate::application::ports::{ObjectProbe, ProbeOutcome};
use crate::domain::{FileId, ObjectKey};

/// Availability check via a `head` request against the backing object store.
pub struct ObjectStoreProbe {
    inner: Arc<dyn ObjectStore>,
}

impl ObjectStoreProbe {
    pub fn new(inner: Arc<dyn ObjectStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ObjectProbe for ObjectStoreProbe {
    async fn probe(&self, file_id: FileId) -> ProbeOutcome {
        let key = ObjectKey::for_file(file_id);
        let store_path = StorePath::from(key.as_str());

        match self.inner.head(&store_path).await {
            Ok(meta) => ProbeOutcome::Available {
                key,
                size_bytes: meta.size as u64,
            },
            Err(object_store::Error::NotFound { .. }) => {
                tracing::debug!(file_id = %file_id, "File not present in backing storage");
                ProbeOutcome::Missing
            }
            Err(e) => {
                // Fail closed: an unreadable store means the file is not
                // available, whatever the underlying cause.
                tracing::warn!(file_id = %file_id, error = %e, "Probe failed, treating as missing");
                ProbeOutcome::Missing
            }
        }
    }
}
