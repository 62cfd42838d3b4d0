use async_trait::async_trait;

use crate::application::ports::{ObjectProbe, ProbeOutcome};
use crate::domain::{FileId, ObjectKey};

/// Deterministic probe for environments without backing storage: a file id
/// divisible by seven exists, everything else is missing. The size is a pure
/// function of the id so repeated runs agree.
pub struct SimulatedProbe;

#[async_trait]
impl ObjectProbe for SimulatedProbe {
    async fn probe(&self, file_id: FileId) -> ProbeOutcome {
        if file_id.get() % 7 == 0 {
            ProbeOutcome::Available {
                key: ObjectKey::for_file(file_id),
                size_bytes: u64::from(file_id.get()) * 512,
            }
        } else {
            ProbeOutcome::Missing
        }
    }
}
