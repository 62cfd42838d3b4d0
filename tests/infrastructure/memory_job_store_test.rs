use std::time::Duration;

use harstad::application::ports::{ApplyOutcome, JobStore};
use harstad::domain::{DownloadJob, FileId, JobId, JobStatus, JobUpdate};
use harstad::infrastructure::persistence::InMemoryJobStore;

fn new_job() -> DownloadJob {
    DownloadJob::new(FileId::try_from(70_000).unwrap())
}

fn store() -> InMemoryJobStore {
    InMemoryJobStore::new(Duration::from_secs(3600))
}

#[tokio::test]
async fn given_inserted_job_when_reading_then_snapshot_matches() {
    let store = store();
    let job = new_job();
    store.insert(&job).await.unwrap();

    let found = store.get(job.id).await.unwrap().unwrap();
    assert_eq!(found.id, job.id);
    assert_eq!(found.status, JobStatus::Queued);
    assert_eq!(found.progress, 0);
}

#[tokio::test]
async fn given_unknown_id_when_reading_then_absent() {
    let store = store();
    assert!(store.get(JobId::new()).await.unwrap().is_none());
}

#[tokio::test]
async fn given_unknown_id_when_applying_then_not_found() {
    let store = store();
    let outcome = store.apply(JobId::new(), JobUpdate::Started).await.unwrap();
    assert_eq!(outcome, ApplyOutcome::NotFound);
}

#[tokio::test]
async fn given_queued_job_when_started_then_processing_is_stored() {
    let store = store();
    let job = new_job();
    store.insert(&job).await.unwrap();

    let outcome = store.apply(job.id, JobUpdate::Started).await.unwrap();
    assert_eq!(outcome, ApplyOutcome::Applied);
    let found = store.get(job.id).await.unwrap().unwrap();
    assert_eq!(found.status, JobStatus::Processing);
}

#[tokio::test]
async fn given_terminal_record_when_late_tick_arrives_then_discarded() {
    let store = store();
    let job = new_job();
    store.insert(&job).await.unwrap();
    store.apply(job.id, JobUpdate::Started).await.unwrap();
    store
        .apply(
            job.id,
            JobUpdate::Completed {
                download_url: "https://example.com/files/70000.zip".to_string(),
                size_bytes: 1024,
                processing_time_ms: 5,
            },
        )
        .await
        .unwrap();

    let outcome = store
        .apply(
            job.id,
            JobUpdate::Progress {
                percent: 54,
                message: "Downloading".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(outcome, ApplyOutcome::Discarded);

    let found = store.get(job.id).await.unwrap().unwrap();
    assert_eq!(found.status, JobStatus::Completed);
    assert_eq!(found.progress, 100);
}

#[tokio::test]
async fn given_lower_percent_when_applying_then_progress_never_regresses() {
    let store = store();
    let job = new_job();
    store.insert(&job).await.unwrap();
    store.apply(job.id, JobUpdate::Started).await.unwrap();
    store
        .apply(
            job.id,
            JobUpdate::Progress {
                percent: 27,
                message: "Downloading".to_string(),
            },
        )
        .await
        .unwrap();

    let outcome = store
        .apply(
            job.id,
            JobUpdate::Progress {
                percent: 18,
                message: "Downloading".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(outcome, ApplyOutcome::Applied);
    let found = store.get(job.id).await.unwrap().unwrap();
    assert_eq!(found.progress, 27);
}

#[tokio::test]
async fn given_expired_record_when_reading_then_absent() {
    let store = InMemoryJobStore::new(Duration::from_millis(40));
    let job = new_job();
    store.insert(&job).await.unwrap();
    assert!(store.get(job.id).await.unwrap().is_some());

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(store.get(job.id).await.unwrap().is_none());
}

#[tokio::test]
async fn given_expired_records_when_sweeping_then_they_are_evicted() {
    let store = InMemoryJobStore::new(Duration::from_millis(40));
    store.insert(&new_job()).await.unwrap();
    store.insert(&new_job()).await.unwrap();

    tokio::time::sleep(Duration::from_millis(80)).await;
    let evicted = store.evict_expired().await.unwrap();
    assert_eq!(evicted, 2);
    assert_eq!(store.evict_expired().await.unwrap(), 0);
}
