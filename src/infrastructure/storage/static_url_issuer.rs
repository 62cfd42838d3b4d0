use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::application::ports::{UrlIssuer, UrlIssuerError};
use crate::domain::{ObjectKey, SignedUrl};

/// Link issuer for local and simulated storage, where nothing can presign:
/// the link is the base url plus the object key with the expiry spelled out
/// as a query parameter.
pub struct StaticUrlIssuer {
    base_url: String,
    expiry: Duration,
}

impl StaticUrlIssuer {
    pub fn new(base_url: impl Into<String>, expiry: Duration) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            expiry,
        }
    }
}

#[async_trait]
impl UrlIssuer for StaticUrlIssuer {
    async fn issue(&self, key: &ObjectKey) -> Result<SignedUrl, UrlIssuerError> {
        let expiry = chrono::Duration::from_std(self.expiry)
            .map_err(|e| UrlIssuerError::SigningFailed(e.to_string()))?;
        let expires_at = Utc::now() + expiry;
        Ok(SignedUrl {
            url: format!(
                "{}/{}?expires={}",
                self.base_url,
                key.as_str(),
                expires_at.timestamp()
            ),
            expires_at,
        })
    }
}
