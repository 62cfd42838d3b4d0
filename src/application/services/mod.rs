mod download_worker;
mod status_service;
mod submission_service;
mod worker_pool;

pub use download_worker::{DelayProfile, DownloadWorker};
pub use status_service::{StatusError, StatusService};
pub use submission_service::{
    DEFAULT_MAX_BATCH_SIZE, SubmissionError, SubmissionReceipt, SubmissionService,
};
pub use worker_pool::{PoolOptions, WorkerPool};
