use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use object_store::ObjectStore;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;

use crate::application::ports::{ObjectProbe, UrlIssuer};
use crate::presentation::config::{StorageProviderSetting, StorageSettings};

use super::object_store_probe::ObjectStoreProbe;
use super::presigned_url_issuer::PresignedUrlIssuer;
use super::simulated_probe::SimulatedProbe;
use super::static_url_issuer::StaticUrlIssuer;

pub struct StorageFactory;

impl StorageFactory {
    /// Builds the probe and the link issuer for the configured provider.
    /// Local and simulated storage cannot presign, so they pair with the
    /// static issuer.
    pub fn create(
        settings: &StorageSettings,
    ) -> Result<(Arc<dyn ObjectProbe>, Arc<dyn UrlIssuer>), StorageConfigError> {
        let expiry = Duration::from_secs(settings.url_expiry_secs);
        match settings.provider {
            StorageProviderSetting::Simulated => Ok((
                Arc::new(SimulatedProbe),
                Arc::new(StaticUrlIssuer::new(settings.base_url.clone(), expiry)),
            )),
            StorageProviderSetting::Local => {
                let path = PathBuf::from(&settings.local_path);
                std::fs::create_dir_all(&path)
                    .map_err(|e| StorageConfigError::InitFailed(e.to_string()))?;
                let fs = LocalFileSystem::new_with_prefix(path)
                    .map_err(|e| StorageConfigError::InitFailed(e.to_string()))?;
                Ok((
                    Arc::new(ObjectStoreProbe::new(Arc::new(fs))),
                    Arc::new(StaticUrlIssuer::new(settings.base_url.clone(), expiry)),
                ))
            }
            StorageProviderSetting::S3 => {
                let bucket = settings.s3_bucket.as_deref().ok_or_else(|| {
                    StorageConfigError::InvalidConfig("s3_bucket required".into())
                })?;
                let s3 = AmazonS3Builder::from_env()
                    .with_bucket_name(bucket)
                    .build()
                    .map_err(|e| StorageConfigError::InitFailed(e.to_string()))?;
                let s3 = Arc::new(s3);
                let probe_store: Arc<dyn ObjectStore> = s3.clone();
                Ok((
                    Arc::new(ObjectStoreProbe::new(probe_store)),
                    Arc::new(PresignedUrlIssuer::new(s3, expiry)),
                ))
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageConfigError {
    #[error("storage configuration invalid: {0}")]
    InvalidConfig(String),
    #[error("object store initialization failed: {0}")]
    InitFailed(String),
}
