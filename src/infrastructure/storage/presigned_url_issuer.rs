use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::Method;
use chrono::Utc;
use object_store::aws::AmazonS3;
use object_store::path::Path as StorePath;
use object_store::signer::Signer;

use crate::application::ports::{UrlIssuer, UrlIssuerError};
use crate::domain::{ObjectKey, SignedUrl};

/// Mints presigned GET links against S3-compatible storage.
pub struct PresignedUrlIssuer {
    store: Arc<AmazonS3>,
    expiry: Duration,
}

impl PresignedUrlIssuer {
    pub fn new(store: Arc<AmazonS3>, expiry: Duration) -> Self {
        Self { store, expiry }
    }
}

#[async_trait]
impl UrlIssuer for PresignedUrlIssuer {
    async fn issue(&self, key: &ObjectKey) -> Result<SignedUrl, UrlIssuerError> {
        let store_path = StorePath::from(key.as_str());
        let url = self
            .store
            .signed_url(Method::GET, &store_path, self.expiry)
            .await
            .map_err(|e| UrlIssuerError::SigningFailed(e.to_string()))?;

        let expiry = chrono::Duration::from_std(self.expiry)
            .map_err(|e| UrlIssuerError::SigningFailed(e.to_string()))?;

        Ok(SignedUrl {
            url: url.to_string(),
            expires_at: Utc::now() + expiry,
        })
    }
}
