//! Image enrichment: looks up a representative photo for articles whose
//! feed fragment carried no image. Lookup failures are never errors; an
//! article without an image simply stays without one.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// Pluggable lookup the aggregation engine calls per article.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn related_image(&self, title: &str, tags: &[String]) -> Option<String>;
}

/// Provider that never finds anything; used when no credential is
/// configured and in tests.
pub struct NoopProvider;

#[async_trait]
impl ImageProvider for NoopProvider {
    async fn related_image(&self, _title: &str, _tags: &[String]) -> Option<String> {
        None
    }
}

const TECH_KEYWORDS: &[&str] = &[
    "programming",
    "coding",
    "developer",
    "software",
    "technology",
    "computer",
    "development",
    "code",
    "tech",
];

const EXCLUDED_WORDS: &[&str] = &[
    "a", "an", "the", "in", "on", "at", "to", "for", "of", "with", "by", "from", "up", "about",
    "into", "over", "after",
];

const DEFAULT_QUERIES: &[&str] = &[
    "programming code screen",
    "software development workspace",
    "technology computer modern",
    "coding developer setup",
    "tech workspace modern",
];

/// Unsplash-style photo search provider.
pub struct UnsplashProvider {
    client: Client,
    base_url: String,
    access_key: Option<String>,
    // Rotates through DEFAULT_QUERIES for the last-resort lookup.
    default_cursor: AtomicUsize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    urls: ImageUrls,
}

#[derive(Debug, Deserialize)]
struct ImageUrls {
    regular: String,
}

impl UnsplashProvider {
    pub fn new(client: Client, access_key: Option<String>) -> Self {
        Self::with_base_url(client, access_key, "https://api.unsplash.com")
    }

    pub fn with_base_url(client: Client, access_key: Option<String>, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_key,
            default_cursor: AtomicUsize::new(0),
        }
    }

    async fn search(&self, query: &str) -> Option<String> {
        let access_key = self.access_key.as_deref()?;

        let response = self
            .client
            .get(format!("{}/search/photos", self.base_url))
            .query(&[("query", query), ("per_page", "1")])
            .header("Authorization", format!("Client-ID {access_key}"))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| tracing::debug!("Image search for {query:?} failed: {e}"))
            .ok()?;

        let payload: SearchResponse = response
            .json()
            .await
            .map_err(|e| tracing::debug!("Image search for {query:?} returned bad JSON: {e}"))
            .ok()?;

        payload
            .results
            .into_iter()
            .next()
            .map(|r| format!("{}&w=800&q=80", r.urls.regular))
    }

    fn title_keywords(title: &str) -> Vec<String> {
        title
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace())
            .collect::<String>()
            .split_whitespace()
            .filter(|w| w.len() > 2 && !EXCLUDED_WORDS.contains(w))
            .map(String::from)
            .collect()
    }
}

#[async_trait]
impl ImageProvider for UnsplashProvider {
    async fn related_image(&self, title: &str, tags: &[String]) -> Option<String> {
        if self.access_key.is_none() {
            return None;
        }

        // Tech-flavored tags first.
        let tech_tags: Vec<&String> = tags
            .iter()
            .filter(|tag| {
                let tag = tag.to_lowercase();
                TECH_KEYWORDS.iter().any(|kw| tag.contains(kw))
            })
            .collect();

        if !tech_tags.is_empty() {
            let query = tech_tags
                .iter()
                .take(2)
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            if let Some(url) = self.search(&query).await {
                return Some(url);
            }
        }

        // Then title keywords with a tech-context keyword appended.
        let keywords = Self::title_keywords(title);
        if !keywords.is_empty() {
            let base = keywords
                .iter()
                .take(3)
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            for kw in TECH_KEYWORDS {
                if let Some(url) = self.search(&format!("{base} {kw}")).await {
                    return Some(url);
                }
            }
        }

        // Last resort: rotate through generic queries.
        let idx = self.default_cursor.fetch_add(1, Ordering::Relaxed) % DEFAULT_QUERIES.len();
        self.search(DEFAULT_QUERIES[idx]).await
    }
}
