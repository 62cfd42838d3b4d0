use async_trait::async_trait;

use crate::domain::{ObjectKey, SignedUrl};

#[async_trait]
pub trait UrlIssuer: Send + Sync {
    /// Mints a time-bounded retrieval link for an existing object.
    async fn issue(&self, key: &ObjectKey) -> Result<SignedUrl, UrlIssuerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum UrlIssuerError {
    #[error("signing failed: {0}")]
    SigningFailed(String),
}
