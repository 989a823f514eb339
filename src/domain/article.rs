use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A normalized news article, independent of the wire format it came from.
///
/// Articles are value objects: constructed once by a source adapter,
/// then copied freely and never mutated except for image enrichment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub image_url: Option<String>,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub tags: Vec<String>,
    pub url: String,
    pub comments_url: Option<String>,
    pub points: Option<i64>,
    pub comment_count: Option<i64>,
}

impl Article {
    /// Derive a stable article id from the canonical URL or a
    /// source-provided entry id. Two sources yielding the same canonical
    /// URL produce the same id and collapse into one logical article
    /// during the merge step.
    pub fn derive_id(canonical: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        hex::encode(hasher.finalize())
    }
}
