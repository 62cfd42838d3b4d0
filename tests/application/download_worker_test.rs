use std::sync::Arc;
use std::time::Duration;

use harstad::application::ports::{
    JobStore, ObjectProbe, UrlIssuer, UrlIssuerError, WorkItem,
};
use harstad::application::services::{DelayProfile, DownloadWorker};
use harstad::domain::{DownloadJob, FileId, JobStatus, ObjectKey, SignedUrl};
use harstad::infrastructure::persistence::InMemoryJobStore;
use harstad::infrastructure::storage::{SimulatedProbe, StaticUrlIssuer};

struct FailingIssuer;

#[async_trait::async_trait]
impl UrlIssuer for FailingIssuer {
    async fn issue(&self, _key: &ObjectKey) -> Result<SignedUrl, UrlIssuerError> {
        Err(UrlIssuerError::SigningFailed("no signing key".to_string()))
    }
}

fn fast_profile(delay_ms: u64) -> DelayProfile {
    DelayProfile {
        min: Duration::from_millis(delay_ms),
        max: Duration::from_millis(delay_ms),
        tick_floor: Duration::from_millis(5),
    }
}

fn worker_with(
    store: Arc<dyn JobStore>,
    probe: Arc<dyn ObjectProbe>,
    issuer: Arc<dyn UrlIssuer>,
    delay_ms: u64,
) -> DownloadWorker {
    DownloadWorker::new(store, probe, issuer, fast_profile(delay_ms))
}

async fn queued_job(store: &Arc<InMemoryJobStore>, raw_id: i64) -> WorkItem {
    let job = DownloadJob::new(FileId::try_from(raw_id).unwrap());
    store.insert(&job).await.unwrap();
    WorkItem {
        job_id: job.id,
        file_id: job.file_id,
    }
}

#[tokio::test]
async fn given_available_file_when_processing_then_job_completes_with_link() {
    let store = Arc::new(InMemoryJobStore::new(Duration::from_secs(3600)));
    let issuer = Arc::new(StaticUrlIssuer::new(
        "http://localhost:3000",
        Duration::from_secs(3600),
    ));
    let worker = worker_with(store.clone(), Arc::new(SimulatedProbe), issuer, 30);

    let item = queued_job(&store, 70_000).await;
    worker.process(&item).await.unwrap();

    let job = store.get(item.job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.progress, 100);
    let url = job.download_url.expect("completed job must carry a link");
    assert!(url.contains("files/70000.zip"));
    assert_eq!(job.size_bytes, Some(70_000 * 512));
    assert!(job.processing_time_ms.unwrap() >= 30);
}

#[tokio::test]
async fn given_missing_file_when_processing_then_job_fails_without_link() {
    let store = Arc::new(InMemoryJobStore::new(Duration::from_secs(3600)));
    let issuer = Arc::new(StaticUrlIssuer::new(
        "http://localhost:3000",
        Duration::from_secs(3600),
    ));
    let worker = worker_with(store.clone(), Arc::new(SimulatedProbe), issuer, 30);

    let item = queued_job(&store, 70_001).await;
    worker.process(&item).await.unwrap();

    let job = store.get(item.job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.progress, 100);
    assert!(job.download_url.is_none());
    assert!(job.message.contains("70001"));
}

#[tokio::test]
async fn given_issuer_failure_when_processing_then_job_completes_degraded() {
    let store = Arc::new(InMemoryJobStore::new(Duration::from_secs(3600)));
    let worker = worker_with(
        store.clone(),
        Arc::new(SimulatedProbe),
        Arc::new(FailingIssuer),
        30,
    );

    let item = queued_job(&store, 70_000).await;
    worker.process(&item).await.unwrap();

    let job = store.get(item.job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Degraded);
    assert!(job.download_url.is_none());
    assert_eq!(job.size_bytes, Some(70_000 * 512));
}

#[tokio::test]
async fn given_long_transfer_when_waiting_then_progress_advances_before_completion() {
    let store = Arc::new(InMemoryJobStore::new(Duration::from_secs(3600)));
    let issuer = Arc::new(StaticUrlIssuer::new(
        "http://localhost:3000",
        Duration::from_secs(3600),
    ));
    let worker = Arc::new(DownloadWorker::new(
        store.clone() as Arc<dyn JobStore>,
        Arc::new(SimulatedProbe),
        issuer,
        DelayProfile {
            min: Duration::from_millis(300),
            max: Duration::from_millis(300),
            tick_floor: Duration::from_millis(10),
        },
    ));

    let item = queued_job(&store, 70_000).await;
    let task = tokio::spawn({
        let worker = Arc::clone(&worker);
        async move { worker.process(&item).await }
    });

    tokio::time::sleep(Duration::from_millis(150)).await;
    let mid = store.get(item.job_id).await.unwrap().unwrap();
    assert_eq!(mid.status, JobStatus::Processing);
    assert!(mid.progress >= 9, "progress was {}", mid.progress);
    assert!(mid.progress <= 90, "progress was {}", mid.progress);

    task.await.unwrap().unwrap();
    let done = store.get(item.job_id).await.unwrap().unwrap();
    assert_eq!(done.status, JobStatus::Completed);
    assert_eq!(done.progress, 100);
}

#[tokio::test]
async fn given_delay_window_when_completing_then_elapsed_time_is_within_bounds() {
    let store = Arc::new(InMemoryJobStore::new(Duration::from_secs(3600)));
    let issuer = Arc::new(StaticUrlIssuer::new(
        "http://localhost:3000",
        Duration::from_secs(3600),
    ));
    let worker = Arc::new(DownloadWorker::new(
        store.clone() as Arc<dyn JobStore>,
        Arc::new(SimulatedProbe),
        issuer,
        DelayProfile {
            min: Duration::from_millis(40),
            max: Duration::from_millis(80),
            tick_floor: Duration::from_millis(10),
        },
    ));

    let item = queued_job(&store, 70_000).await;
    worker.process(&item).await.unwrap();

    let job = store.get(item.job_id).await.unwrap().unwrap();
    let elapsed = job.processing_time_ms.unwrap();
    assert!(elapsed >= 40, "elapsed was {}ms", elapsed);
    // Generous scheduling allowance on top of the configured maximum.
    assert!(elapsed < 1_000, "elapsed was {}ms", elapsed);
}

#[tokio::test]
async fn given_already_finished_job_when_redelivered_then_left_untouched() {
    let store = Arc::new(InMemoryJobStore::new(Duration::from_secs(3600)));
    let issuer = Arc::new(StaticUrlIssuer::new(
        "http://localhost:3000",
        Duration::from_secs(3600),
    ));
    let worker = worker_with(store.clone(), Arc::new(SimulatedProbe), issuer, 30);

    let item = queued_job(&store, 70_000).await;
    worker.process(&item).await.unwrap();
    let first = store.get(item.job_id).await.unwrap().unwrap();

    // Simulates an at-least-once redelivery of the same work item.
    worker.process(&item).await.unwrap();
    let second = store.get(item.job_id).await.unwrap().unwrap();
    assert_eq!(second.status, JobStatus::Completed);
    assert_eq!(second.processing_time_ms, first.processing_time_ms);
    assert_eq!(second.download_url, first.download_url);
}
