use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::app::Result;
use crate::domain::{Article, FeedSource};
use crate::fetcher::SourceAdapter;

/// Category assigned when the API provides no tags of its own.
const DEFAULT_TAG: &str = "technology";

/// Adapter for JSON list-API sources. Requires a configured credential;
/// without one the source is skipped (empty result, not an error).
pub struct ApiAdapter {
    client: Client,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    articles: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
struct ApiArticle {
    title: Option<String>,
    description: Option<String>,
    #[serde(rename = "urlToImage")]
    url_to_image: Option<String>,
    source: ApiArticleSource,
    #[serde(rename = "publishedAt")]
    published_at: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct ApiArticleSource {
    name: String,
}

impl ApiAdapter {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }

    fn map_article(raw: ApiArticle) -> Option<Article> {
        // A present-but-unparseable timestamp drops the entry so it can
        // never corrupt the merged sort order.
        let published_at = raw
            .published_at
            .parse::<DateTime<Utc>>()
            .map_err(|e| {
                tracing::debug!("Dropping article with bad timestamp {}: {e}", raw.published_at);
                e
            })
            .ok()?;

        Some(Article {
            id: Article::derive_id(&raw.url),
            title: raw
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "No Title".to_string()),
            summary: raw
                .description
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "No description available".to_string()),
            image_url: raw.url_to_image,
            source: raw.source.name,
            published_at,
            tags: vec![DEFAULT_TAG.to_string()],
            url: raw.url,
            comments_url: None,
            points: None,
            comment_count: None,
        })
    }
}

#[async_trait]
impl SourceAdapter for ApiAdapter {
    async fn fetch_articles(&self, source: &FeedSource) -> Result<Vec<Article>> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("News API key not configured; skipping {}", source.name);
            return Ok(Vec::new());
        };

        let response = self
            .client
            .get(&source.url)
            .query(&[("apiKey", api_key)])
            .send()
            .await?;
        response.error_for_status_ref()?;

        let payload: ApiResponse = response.json().await?;

        Ok(payload
            .articles
            .into_iter()
            .filter_map(Self::map_article)
            .collect())
    }
}
