use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::application::ports::{
    ApplyOutcome, JobStore, JobStoreError, ObjectProbe, ProbeOutcome, UrlIssuer, WorkItem,
};
use crate::domain::JobUpdate;

/// Timing profile for one download run. The delay stands in for the variable
/// latency of materializing a file in backing storage.
#[derive(Debug, Clone)]
pub struct DelayProfile {
    pub min: Duration,
    pub max: Duration,
    /// Lower bound on the progress-tick interval.
    pub tick_floor: Duration,
}

impl Default for DelayProfile {
    fn default() -> Self {
        Self {
            min: Duration::from_secs(10),
            max: Duration::from_secs(200),
            tick_floor: Duration::from_secs(1),
        }
    }
}

/// Runs a single job from `Started` to a terminal state.
///
/// The wait and the progress ticker are driven by one `select!` loop, so
/// within a process there is only ever one writer per job and the ticker
/// stops the instant the job finishes. The store's status gate covers writers
/// in other processes.
pub struct DownloadWorker {
    store: Arc<dyn JobStore>,
    probe: Arc<dyn ObjectProbe>,
    url_issuer: Arc<dyn UrlIssuer>,
    delay: DelayProfile,
}

impl DownloadWorker {
    pub fn new(
        store: Arc<dyn JobStore>,
        probe: Arc<dyn ObjectProbe>,
        url_issuer: Arc<dyn UrlIssuer>,
        delay: DelayProfile,
    ) -> Self {
        Self {
            store,
            probe,
            url_issuer,
            delay,
        }
    }

    /// Errors are store failures only; the pool treats them as transient and
    /// retries the delivery. Probe-negative is a normal terminal outcome.
    pub async fn process(&self, item: &WorkItem) -> Result<(), JobStoreError> {
        let started = Instant::now();

        match self.store.apply(item.job_id, JobUpdate::Started).await? {
            ApplyOutcome::Applied => {}
            ApplyOutcome::Discarded => {
                tracing::debug!(
                    job_id = %item.job_id.as_uuid(),
                    "Redelivered work item for a finished job, skipping"
                );
                return Ok(());
            }
            ApplyOutcome::NotFound => {
                tracing::warn!(
                    job_id = %item.job_id.as_uuid(),
                    "Work item references an unknown job, skipping"
                );
                return Ok(());
            }
        }

        let delay = self.draw_delay();
        let tick = (delay / 10).max(self.delay.tick_floor);
        tracing::debug!(
            job_id = %item.job_id.as_uuid(),
            delay_ms = delay.as_millis() as u64,
            tick_ms = tick.as_millis() as u64,
            "Transfer delay drawn"
        );

        if !self.wait_with_progress(item, delay, tick).await? {
            // Another writer already finished this job.
            return Ok(());
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match self.probe.probe(item.file_id).await {
            ProbeOutcome::Available { key, size_bytes } => {
                match self.url_issuer.issue(&key).await {
                    Ok(signed) => {
                        self.store
                            .apply(
                                item.job_id,
                                JobUpdate::Completed {
                                    download_url: signed.url,
                                    size_bytes,
                                    processing_time_ms: elapsed_ms,
                                },
                            )
                            .await?;
                        tracing::info!(
                            job_id = %item.job_id.as_uuid(),
                            size_bytes,
                            elapsed_ms,
                            "Download ready"
                        );
                    }
                    Err(e) => {
                        tracing::warn!(
                            job_id = %item.job_id.as_uuid(),
                            error = %e,
                            "Link issuance failed, completing degraded"
                        );
                        self.store
                            .apply(
                                item.job_id,
                                JobUpdate::Degraded {
                                    size_bytes,
                                    processing_time_ms: elapsed_ms,
                                },
                            )
                            .await?;
                    }
                }
            }
            ProbeOutcome::Missing => {
                self.store
                    .apply(
                        item.job_id,
                        JobUpdate::Failed {
                            message: format!("File {} is not available", item.file_id),
                            processing_time_ms: elapsed_ms,
                        },
                    )
                    .await?;
                tracing::info!(
                    job_id = %item.job_id.as_uuid(),
                    file_id = %item.file_id,
                    "File not available"
                );
            }
        }

        Ok(())
    }

    /// Waits out the transfer delay while emitting progress ticks, nine
    /// percent per step up to ninety. Returns `false` when a tick is
    /// discarded, meaning the record went terminal under another writer.
    async fn wait_with_progress(
        &self,
        item: &WorkItem,
        delay: Duration,
        tick: Duration,
    ) -> Result<bool, JobStoreError> {
        let deadline = tokio::time::sleep(delay);
        tokio::pin!(deadline);
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + tick, tick);
        let mut percent: u8 = 0;

        loop {
            tokio::select! {
                _ = &mut deadline => return Ok(true),
                _ = ticker.tick() => {
                    if percent >= 90 {
                        continue;
                    }
                    percent += 9;
                    let outcome = self
                        .store
                        .apply(
                            item.job_id,
                            JobUpdate::Progress {
                                percent,
                                message: "Downloading".to_string(),
                            },
                        )
                        .await?;
                    if outcome != ApplyOutcome::Applied {
                        return Ok(false);
                    }
                }
            }
        }
    }

    fn draw_delay(&self) -> Duration {
        let min = self.delay.min.as_millis() as u64;
        let max = (self.delay.max.as_millis() as u64).max(min);
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}
