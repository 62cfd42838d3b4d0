mod file_id;
mod job;
mod job_id;
mod job_status;
mod object_key;
mod signed_url;

pub use file_id::{FileId, MAX_FILE_ID, MIN_FILE_ID};
pub use job::{DownloadJob, JobUpdate};
pub use job_id::JobId;
pub use job_status::JobStatus;
pub use object_key::ObjectKey;
pub use signed_url::SignedUrl;
