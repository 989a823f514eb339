pub mod api;
pub mod rss;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::app::Result;
use crate::domain::{Article, FeedSource};

pub use api::ApiAdapter;
pub use rss::RssAdapter;

/// Capability implemented once per wire shape; the engine selects the
/// adapter on `source.kind` instead of branching on it internally.
#[async_trait]
pub trait SourceAdapter {
    async fn fetch_articles(&self, source: &FeedSource) -> Result<Vec<Article>>;
}

/// Shared HTTP client. The request timeout is the per-source timeout
/// policy: every fan-out branch settles within this bound.
pub fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .gzip(true)
        .brotli(true)
        .user_agent(concat!("techtrend/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to build HTTP client")
}
