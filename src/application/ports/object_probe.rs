use async_trait::async_trait;

use crate::domain::{FileId, ObjectKey};

/// Availability check against backing storage.
///
/// Not-found is a normal negative answer, and implementations fold every
/// other access failure into `Missing` as well, so availability is always
/// determined fail-closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Available { key: ObjectKey, size_bytes: u64 },
    Missing,
}

#[async_trait]
pub trait ObjectProbe: Send + Sync {
    async fn probe(&self, file_id: FileId) -> ProbeOutcome;
}
