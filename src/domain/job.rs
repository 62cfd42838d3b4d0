use chrono::{DateTime, Utc};

use super::{FileId, JobId, JobStatus};

#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub id: JobId,
    pub file_id: FileId,
    pub status: JobStatus,
    pub progress: u8,
    pub download_url: Option<String>,
    pub size_bytes: Option<u64>,
    pub processing_time_ms: Option<u64>,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single transition applied to a job record.
///
/// Keeping mutation behind this closed set puts every store backend behind
/// the same status gate: a late progress tick can never overwrite a record
/// that already reached a terminal state.
#[derive(Debug, Clone)]
pub enum JobUpdate {
    Started,
    Progress {
        percent: u8,
        message: String,
    },
    Completed {
        download_url: String,
        size_bytes: u64,
        processing_time_ms: u64,
    },
    Degraded {
        size_bytes: u64,
        processing_time_ms: u64,
    },
    Failed {
        message: String,
        processing_time_ms: u64,
    },
}

impl DownloadJob {
    pub fn new(file_id: FileId) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            file_id,
            status: JobStatus::Queued,
            progress: 0,
            download_url: None,
            size_bytes: None,
            processing_time_ms: None,
            message: "Waiting in queue".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the update if the transition is legal and reports whether the
    /// record changed. Terminal records reject every update; progress never
    /// regresses; `Started` is idempotent so redelivered work items are safe.
    pub fn apply(&mut self, update: JobUpdate) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        match update {
            JobUpdate::Started => {
                self.status = JobStatus::Processing;
                self.message = "Download started".to_string();
            }
            JobUpdate::Progress { percent, message } => {
                if self.status != JobStatus::Processing {
                    return false;
                }
                // Monotone clamp: a redelivered run's early ticks never walk
                // progress backwards.
                self.progress = self.progress.max(percent.min(100));
                self.message = message;
            }
            JobUpdate::Completed {
                download_url,
                size_bytes,
                processing_time_ms,
            } => {
                self.status = JobStatus::Completed;
                self.progress = 100;
                self.download_url = Some(download_url);
                self.size_bytes = Some(size_bytes);
                self.processing_time_ms = Some(processing_time_ms);
                self.message = "Download ready".to_string();
            }
            JobUpdate::Degraded {
                size_bytes,
                processing_time_ms,
            } => {
                self.status = JobStatus::Degraded;
                self.progress = 100;
                self.size_bytes = Some(size_bytes);
                self.processing_time_ms = Some(processing_time_ms);
                self.message = "File is available but no download link could be issued".to_string();
            }
            JobUpdate::Failed {
                message,
                processing_time_ms,
            } => {
                self.status = JobStatus::Failed;
                self.progress = 100;
                self.processing_time_ms = Some(processing_time_ms);
                self.message = message;
            }
        }
        let now = Utc::now();
        if now > self.updated_at {
            self.updated_at = now;
        }
        true
    }
}
