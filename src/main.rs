use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use harstad::application::services::{
    DelayProfile, DownloadWorker, PoolOptions, StatusService, SubmissionService, WorkerPool,
};
use harstad::infrastructure::observability::{TracingConfig, init_tracing};
use harstad::infrastructure::persistence::{JobStoreFactory, create_pool};
use harstad::infrastructure::queue::WorkQueueFactory;
use harstad::infrastructure::storage::StorageFactory;
use harstad::presentation::config::{QueueBackendSetting, StoreBackendSetting};
use harstad::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env();
    let environment = Environment::from_env();

    init_tracing(
        TracingConfig::new(environment.as_str(), settings.logging.enable_json),
        settings.server.port,
    );

    let needs_postgres = settings.store.backend == StoreBackendSetting::Postgres
        || settings.queue.backend == QueueBackendSetting::Postgres;
    let pool = if needs_postgres {
        let url = settings
            .store
            .database_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL required for the postgres backend"))?;
        let pool = create_pool(url, settings.store.max_connections).await?;
        sqlx::migrate!().run(&pool).await?;
        Some(pool)
    } else {
        None
    };

    let store = JobStoreFactory::create(&settings.store, pool.as_ref())?;
    let queue = WorkQueueFactory::create(&settings.queue, pool.as_ref())?;
    let (probe, url_issuer) = StorageFactory::create(&settings.storage)?;

    let worker = Arc::new(DownloadWorker::new(
        Arc::clone(&store),
        probe,
        url_issuer,
        DelayProfile {
            min: Duration::from_millis(settings.worker.delay_min_ms),
            max: Duration::from_millis(settings.worker.delay_max_ms),
            tick_floor: Duration::from_millis(settings.worker.tick_floor_ms),
        },
    ));

    let worker_pool = WorkerPool::spawn(
        Arc::clone(&queue),
        Arc::clone(&store),
        worker,
        PoolOptions {
            concurrency: settings.worker.concurrency,
            max_attempts: settings.worker.max_attempts,
            retry_base: Duration::from_millis(settings.worker.retry_base_ms),
            detailed_errors: environment.detailed_errors(),
        },
    );

    let sweep_store = Arc::clone(&store);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600));
        loop {
            interval.tick().await;
            match sweep_store.evict_expired().await {
                Ok(0) => {}
                Ok(evicted) => tracing::info!(evicted, "Expired job records evicted"),
                Err(e) => tracing::warn!(error = %e, "Retention sweep failed"),
            }
        }
    });

    let state = AppState {
        submission_service: Arc::new(SubmissionService::new(
            Arc::clone(&store),
            Arc::clone(&queue),
            settings.submission.max_batch_size,
        )),
        status_service: Arc::new(StatusService::new(Arc::clone(&store))),
    };

    let router = create_router(state);

    let addr = SocketAddr::from((
        settings
            .server
            .host
            .parse::<std::net::IpAddr>()
            .unwrap_or_else(|_| [0, 0, 0, 0].into()),
        settings.server.port,
    ));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    worker_pool.shutdown().await;
    tracing::info!("Download service stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
