use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use harstad::application::ports::{
    ApplyOutcome, JobStore, JobStoreError, WorkItem, WorkQueue, WorkQueueError,
};
use harstad::application::services::{SubmissionError, SubmissionService};
use harstad::domain::{DownloadJob, JobId, JobStatus, JobUpdate};
use harstad::infrastructure::persistence::InMemoryJobStore;
use harstad::infrastructure::queue::InMemoryWorkQueue;

const MAX_BATCH: usize = 10;

/// Store wrapper that remembers every inserted job id, so tests can reach
/// records they did not create themselves.
struct RecordingStore {
    inner: InMemoryJobStore,
    inserted: Mutex<Vec<JobId>>,
}

impl RecordingStore {
    fn new() -> Self {
        Self {
            inner: InMemoryJobStore::new(Duration::from_secs(3600)),
            inserted: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl JobStore for RecordingStore {
    async fn insert(&self, job: &DownloadJob) -> Result<(), JobStoreError> {
        self.inserted.lock().await.push(job.id);
        self.inner.insert(job).await
    }

    async fn get(&self, id: JobId) -> Result<Option<DownloadJob>, JobStoreError> {
        self.inner.get(id).await
    }

    async fn apply(
        &self,
        id: JobId,
        update: JobUpdate,
    ) -> Result<ApplyOutcome, JobStoreError> {
        self.inner.apply(id, update).await
    }

    async fn evict_expired(&self) -> Result<u64, JobStoreError> {
        self.inner.evict_expired().await
    }
}

struct FailingQueue;

#[async_trait::async_trait]
impl WorkQueue for FailingQueue {
    async fn enqueue(&self, _item: WorkItem) -> Result<(), WorkQueueError> {
        Err(WorkQueueError::Backend("queue down".to_string()))
    }

    async fn dequeue(&self) -> Result<Option<harstad::application::ports::Delivery>, WorkQueueError> {
        Ok(None)
    }

    async fn ack(
        &self,
        _delivery: &harstad::application::ports::Delivery,
    ) -> Result<(), WorkQueueError> {
        Ok(())
    }
}

fn service_with(
    store: Arc<RecordingStore>,
    queue: Arc<dyn WorkQueue>,
) -> SubmissionService {
    SubmissionService::new(store, queue, MAX_BATCH)
}

#[tokio::test]
async fn given_valid_id_when_submitting_then_record_is_queued_immediately() {
    let store = Arc::new(RecordingStore::new());
    let queue = Arc::new(InMemoryWorkQueue::new(8, Duration::from_millis(20)));
    let service = service_with(Arc::clone(&store), queue);

    let receipt = service.submit(&[70_000]).await.unwrap();
    assert_eq!(receipt.status, JobStatus::Queued);
    assert_eq!(receipt.total_count, 1);

    let job = store.get(receipt.job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.progress, 0);
    assert_eq!(job.file_id.as_i64(), 70_000);
}

#[tokio::test]
async fn given_batch_when_submitting_then_one_job_for_the_first_id() {
    let store = Arc::new(RecordingStore::new());
    let queue = Arc::new(InMemoryWorkQueue::new(8, Duration::from_millis(20)));
    let service = service_with(Arc::clone(&store), Arc::clone(&queue) as Arc<dyn WorkQueue>);

    let receipt = service.submit(&[70_000, 70_007, 70_014]).await.unwrap();
    assert_eq!(receipt.total_count, 3);
    assert_eq!(store.inserted.lock().await.len(), 1);

    let job = store.get(receipt.job_id).await.unwrap().unwrap();
    assert_eq!(job.file_id.as_i64(), 70_000);

    let delivery = queue.dequeue().await.unwrap().unwrap();
    assert_eq!(delivery.item.job_id, receipt.job_id);
    assert!(queue.dequeue().await.unwrap().is_none());
}

#[tokio::test]
async fn given_out_of_range_id_when_submitting_then_rejected_without_a_record() {
    let store = Arc::new(RecordingStore::new());
    let queue = Arc::new(InMemoryWorkQueue::new(8, Duration::from_millis(20)));
    let service = service_with(Arc::clone(&store), queue);

    let result = service.submit(&[9_999]).await;
    assert!(matches!(
        result,
        Err(SubmissionError::FileIdOutOfRange { value: 9_999, .. })
    ));
    assert!(store.inserted.lock().await.is_empty());
}

#[tokio::test]
async fn given_empty_batch_when_submitting_then_rejected() {
    let store = Arc::new(RecordingStore::new());
    let queue = Arc::new(InMemoryWorkQueue::new(8, Duration::from_millis(20)));
    let service = service_with(store, queue);

    assert!(matches!(
        service.submit(&[]).await,
        Err(SubmissionError::EmptyBatch)
    ));
}

#[tokio::test]
async fn given_oversized_batch_when_submitting_then_rejected() {
    let store = Arc::new(RecordingStore::new());
    let queue = Arc::new(InMemoryWorkQueue::new(8, Duration::from_millis(20)));
    let service = service_with(Arc::clone(&store), queue);

    let ids: Vec<i64> = (0..=MAX_BATCH as i64).map(|i| 70_000 + i).collect();
    assert!(matches!(
        service.submit(&ids).await,
        Err(SubmissionError::BatchTooLarge { .. })
    ));
    assert!(store.inserted.lock().await.is_empty());
}

#[tokio::test]
async fn given_enqueue_failure_when_submitting_then_record_is_reconciled_to_failed() {
    let store = Arc::new(RecordingStore::new());
    let service = service_with(Arc::clone(&store), Arc::new(FailingQueue));

    let result = service.submit(&[70_000]).await;
    assert!(matches!(result, Err(SubmissionError::Queue(_))));

    let inserted = store.inserted.lock().await.clone();
    assert_eq!(inserted.len(), 1);
    let job = store.get(inserted[0]).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.progress, 100);
}
