use chrono::{DateTime, Utc};

/// Time-bounded retrieval credential for a stored file.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}
