mod job_store;
mod object_probe;
mod url_issuer;
mod work_queue;

pub use job_store::{ApplyOutcome, JobStore, JobStoreError};
pub use object_probe::{ObjectProbe, ProbeOutcome};
pub use url_issuer::{UrlIssuer, UrlIssuerError};
pub use work_queue::{Delivery, WorkItem, WorkQueue, WorkQueueError};
