use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use feed_rs::model::Entry;
use feed_rs::parser;
use html_escape::decode_html_entities;
use regex::Regex;
use reqwest::Client;

use crate::app::{Result, TechTrendError};
use crate::domain::{Article, FeedSource};
use crate::fetcher::SourceAdapter;
use crate::normalizer::Normalizer;

/// Source id whose descriptions embed score and comment-count text.
const DISCUSSION_SOURCE_ID: &str = "hackernews";

/// Adapter for syndication-feed (RSS/Atom) sources.
pub struct RssAdapter {
    client: Client,
    normalizer: Normalizer,
    points_re: Regex,
    comments_re: Regex,
    item_block: Regex,
    link_el: Regex,
    comments_el: Regex,
}

impl RssAdapter {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            normalizer: Normalizer::new(),
            points_re: Regex::new(r"(\d+)\s+points?").expect("valid regex"),
            comments_re: Regex::new(r"(\d+)\s+comments?").expect("valid regex"),
            item_block: Regex::new(r"(?s)<item>(.*?)</item>").expect("valid regex"),
            link_el: Regex::new(r"(?s)<link>\s*(.*?)\s*</link>").expect("valid regex"),
            comments_el: Regex::new(r"(?s)<comments>\s*(.*?)\s*</comments>").expect("valid regex"),
        }
    }

    /// The parser does not surface the RSS `<comments>` element, so the
    /// discussion URLs are recovered from the raw item markup, keyed by
    /// the item link.
    fn discussion_urls(&self, xml: &str) -> HashMap<String, String> {
        self.item_block
            .captures_iter(xml)
            .filter_map(|item| {
                let block = item.get(1)?.as_str();
                let link = self.link_el.captures(block)?.get(1)?.as_str();
                let comments = self.comments_el.captures(block)?.get(1)?.as_str();
                Some((
                    decode_html_entities(link).into_owned(),
                    decode_html_entities(comments).into_owned(),
                ))
            })
            .collect()
    }

    fn map_entry(
        &self,
        source: &FeedSource,
        discussion: &HashMap<String, String>,
        entry: Entry,
    ) -> Option<Article> {
        let link = entry.links.first().map(|l| l.href.clone());

        let canonical = if entry.id.is_empty() {
            link.clone()?
        } else {
            entry.id.clone()
        };

        let fragment = entry
            .content
            .and_then(|c| c.body)
            .or_else(|| entry.summary.as_ref().map(|s| s.content.clone()))
            .unwrap_or_default();

        let summary = self.normalizer.plain_text(&fragment);
        let summary = if summary.is_empty() {
            "No description available".to_string()
        } else {
            summary
        };

        let (points, comment_count, comments_url) = if source.id == DISCUSSION_SOURCE_ID {
            let points = self
                .points_re
                .captures(&fragment)
                .and_then(|c| c[1].parse().ok());
            let comments = self
                .comments_re
                .captures(&fragment)
                .and_then(|c| c[1].parse().ok())
                .unwrap_or(0);
            let comments_url = link.as_deref().and_then(|l| discussion.get(l)).cloned();
            (points, Some(comments), comments_url)
        } else {
            (None, None, None)
        };

        Some(Article {
            id: Article::derive_id(&canonical),
            title: entry
                .title
                .map(|t| t.content)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "No Title".to_string()),
            summary,
            image_url: self.normalizer.extract_image(&fragment),
            source: source.name.clone(),
            published_at: entry
                .published
                .or(entry.updated)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(Utc::now),
            tags: entry.categories.into_iter().map(|c| c.term).collect(),
            url: link.unwrap_or_default(),
            comments_url,
            points,
            comment_count,
        })
    }
}

#[async_trait]
impl SourceAdapter for RssAdapter {
    async fn fetch_articles(&self, source: &FeedSource) -> Result<Vec<Article>> {
        let response = self.client.get(&source.url).send().await?;
        response.error_for_status_ref()?;
        let body = response.bytes().await?;

        let feed =
            parser::parse(&body[..]).map_err(|e| TechTrendError::FeedParse(e.to_string()))?;

        let discussion = if source.id == DISCUSSION_SOURCE_ID {
            self.discussion_urls(&String::from_utf8_lossy(&body))
        } else {
            HashMap::new()
        };

        Ok(feed
            .entries
            .into_iter()
            .filter_map(|entry| self.map_entry(source, &discussion, entry))
            .collect())
    }
}
