use std::str::FromStr;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub queue: QueueSettings,
    pub worker: WorkerSettings,
    pub storage: StorageSettings,
    pub submission: SubmissionSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    pub backend: StoreBackendSetting,
    pub database_url: Option<String>,
    pub max_connections: u32,
    /// Retention window for job records; expired records read as NotFound.
    pub retention_hours: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackendSetting {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueueSettings {
    pub backend: QueueBackendSetting,
    pub capacity: usize,
    pub poll_ms: u64,
    /// How long a claimed item stays invisible before redelivery.
    pub visibility_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueBackendSetting {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSettings {
    pub concurrency: usize,
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    pub tick_floor_ms: u64,
    pub max_attempts: u32,
    pub retry_base_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub provider: StorageProviderSetting,
    pub local_path: String,
    pub s3_bucket: Option<String>,
    pub base_url: String,
    pub url_expiry_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProviderSetting {
    Simulated,
    Local,
    S3,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionSettings {
    pub max_batch_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub enable_json: bool,
}

impl Settings {
    /// Reads every setting from the environment, falling back to defaults
    /// suitable for a local run against the simulated backends.
    pub fn from_env() -> Self {
        Self {
            server: ServerSettings {
                host: env_or("SERVER_HOST", "0.0.0.0".to_string()),
                port: env_or("SERVER_PORT", 3000),
            },
            store: StoreSettings {
                backend: env_or("STORE_BACKEND", StoreBackendSetting::Memory),
                database_url: std::env::var("DATABASE_URL").ok(),
                max_connections: env_or("DATABASE_MAX_CONNECTIONS", 5),
                retention_hours: env_or("JOB_RETENTION_HOURS", 24),
            },
            queue: QueueSettings {
                backend: env_or("QUEUE_BACKEND", QueueBackendSetting::Memory),
                capacity: env_or("QUEUE_CAPACITY", 1024),
                poll_ms: env_or("QUEUE_POLL_MS", 250),
                visibility_secs: env_or("QUEUE_VISIBILITY_SECS", 600),
            },
            worker: WorkerSettings {
                concurrency: env_or("WORKER_CONCURRENCY", 5),
                delay_min_ms: env_or("DOWNLOAD_DELAY_MIN_MS", 10_000),
                delay_max_ms: env_or("DOWNLOAD_DELAY_MAX_MS", 200_000),
                tick_floor_ms: env_or("PROGRESS_TICK_FLOOR_MS", 1_000),
                max_attempts: env_or("WORKER_MAX_ATTEMPTS", 3),
                retry_base_ms: env_or("WORKER_RETRY_BASE_MS", 500),
            },
            storage: StorageSettings {
                provider: env_or("STORAGE_PROVIDER", StorageProviderSetting::Simulated),
                local_path: env_or("STORAGE_LOCAL_PATH", "./data/files".to_string()),
                s3_bucket: std::env::var("S3_BUCKET").ok(),
                base_url: env_or("DOWNLOAD_BASE_URL", "http://localhost:3000".to_string()),
                url_expiry_secs: env_or("URL_EXPIRY_SECS", 3_600),
            },
            submission: SubmissionSettings {
                max_batch_size: env_or("MAX_BATCH_SIZE", 100),
            },
            logging: LoggingSettings {
                enable_json: std::env::var("LOG_FORMAT")
                    .map(|v| v.to_lowercase() == "json")
                    .unwrap_or(false),
            },
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl FromStr for StoreBackendSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" => Ok(Self::Postgres),
            other => Err(format!("Invalid store backend: {}", other)),
        }
    }
}

impl FromStr for QueueBackendSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" => Ok(Self::Postgres),
            other => Err(format!("Invalid queue backend: {}", other)),
        }
    }
}

impl FromStr for StorageProviderSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simulated" => Ok(Self::Simulated),
            "local" => Ok(Self::Local),
            "s3" => Ok(Self::S3),
            other => Err(format!("Invalid storage provider: {}", other)),
        }
    }
}
