use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::application::ports::{Delivery, JobStore, WorkQueue};
use crate::domain::{JobId, JobUpdate};

use super::DownloadWorker;

#[derive(Debug, Clone)]
pub struct PoolOptions {
    /// Hard ceiling on simultaneously processing jobs.
    pub concurrency: usize,
    /// In-place attempts per delivery before the failure hook fires.
    pub max_attempts: u32,
    /// Base for the exponential retry backoff.
    pub retry_base: Duration,
    /// Record fault detail in the job message instead of an opaque line.
    pub detailed_errors: bool,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            concurrency: 5,
            max_attempts: 3,
            retry_base: Duration::from_millis(500),
            detailed_errors: false,
        }
    }
}

/// Bounded set of supervised consumers draining the work queue.
///
/// Each consumer runs one job at a time, so at most `concurrency` jobs are
/// processing at any instant; everything else waits in the queue. Shutdown is
/// cooperative: consumers stop dequeuing and finish their current job.
pub struct WorkerPool {
    token: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn spawn(
        queue: Arc<dyn WorkQueue>,
        store: Arc<dyn JobStore>,
        worker: Arc<DownloadWorker>,
        options: PoolOptions,
    ) -> Self {
        let token = CancellationToken::new();
        let handles = (0..options.concurrency)
            .map(|slot| {
                let queue = Arc::clone(&queue);
                let store = Arc::clone(&store);
                let worker = Arc::clone(&worker);
                let options = options.clone();
                let token = token.clone();
                tokio::spawn(async move {
                    consumer_loop(slot, queue, store, worker, options, token).await;
                })
            })
            .collect();
        Self { token, handles }
    }

    pub async fn shutdown(self) {
        self.token.cancel();
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

async fn consumer_loop(
    slot: usize,
    queue: Arc<dyn WorkQueue>,
    store: Arc<dyn JobStore>,
    worker: Arc<DownloadWorker>,
    options: PoolOptions,
    token: CancellationToken,
) {
    tracing::info!(slot, "Download worker started");
    loop {
        let delivery = tokio::select! {
            _ = token.cancelled() => break,
            result = queue.dequeue() => match result {
                Ok(Some(delivery)) => delivery,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(slot, error = %e, "Dequeue failed");
                    tokio::time::sleep(options.retry_base).await;
                    continue;
                }
            },
        };

        let span = tracing::info_span!(
            "download_job",
            job_id = %delivery.item.job_id.as_uuid(),
            file_id = %delivery.item.file_id,
            delivery_attempt = delivery.attempt,
        );
        run_delivery(&store, &worker, &delivery, &options)
            .instrument(span)
            .await;

        if let Err(e) = queue.ack(&delivery).await {
            tracing::warn!(
                slot,
                job_id = %delivery.item.job_id.as_uuid(),
                error = %e,
                "Ack failed, item may be redelivered"
            );
        }
    }
    tracing::info!(slot, "Download worker stopped");
}

async fn run_delivery(
    store: &Arc<dyn JobStore>,
    worker: &Arc<DownloadWorker>,
    delivery: &Delivery,
    options: &PoolOptions,
) {
    let started = Instant::now();
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let result = std::panic::AssertUnwindSafe(worker.process(&delivery.item))
            .catch_unwind()
            .await;

        match result {
            Ok(Ok(())) => return,
            Ok(Err(e)) => {
                if attempt >= options.max_attempts {
                    tracing::error!(error = %e, attempt, "Download job exhausted its retries");
                    let message = format!("Download failed after {} attempts", attempt);
                    fail_job(store, delivery.item.job_id, message, started).await;
                    return;
                }
                let backoff = options.retry_base * 2u32.pow(attempt - 1);
                tracing::warn!(
                    error = %e,
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    "Transient failure, retrying download job"
                );
                tokio::time::sleep(backoff).await;
            }
            Err(panic) => {
                let detail = panic_detail(panic.as_ref());
                tracing::error!(panic = %detail, "Download job panicked");
                let message = if options.detailed_errors {
                    format!("Download failed: {}", detail)
                } else {
                    "Download failed unexpectedly".to_string()
                };
                fail_job(store, delivery.item.job_id, message, started).await;
                return;
            }
        }
    }
}

async fn fail_job(store: &Arc<dyn JobStore>, job_id: JobId, message: String, started: Instant) {
    let update = JobUpdate::Failed {
        message,
        processing_time_ms: started.elapsed().as_millis() as u64,
    };
    if let Err(e) = store.apply(job_id, update).await {
        tracing::error!(
            job_id = %job_id.as_uuid(),
            error = %e,
            "Failed to record terminal failure"
        );
    }
}

fn panic_detail(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
