//! The set of configured feed sources: a fixed list of built-ins created at
//! startup plus user-added sources held for the lifetime of the process.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use url::Url;

use crate::app::{Result, TechTrendError};
use crate::domain::{FeedSource, NewFeedRequest, SourceKind};

pub struct FeedRegistry {
    builtin: RwLock<Vec<FeedSource>>,
    custom: RwLock<Vec<FeedSource>>,
    next_custom_id: AtomicU64,
}

impl Default for FeedRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedRegistry {
    /// Registry seeded with the built-in sources. Built-ins are immutable
    /// except for their enabled flag.
    pub fn new() -> Self {
        Self::with_builtin(default_sources())
    }

    pub fn with_builtin(builtin: Vec<FeedSource>) -> Self {
        Self {
            builtin: RwLock::new(builtin),
            custom: RwLock::new(Vec::new()),
            next_custom_id: AtomicU64::new(1),
        }
    }

    /// All sources, built-in first, then user-added in insertion order.
    pub fn list(&self) -> Vec<FeedSource> {
        let mut all = self.builtin.read().expect("registry lock").clone();
        all.extend(self.custom.read().expect("registry lock").iter().cloned());
        all
    }

    /// The sources an aggregation pass fans out over.
    pub fn enabled(&self) -> Vec<FeedSource> {
        self.list().into_iter().filter(|s| s.enabled).collect()
    }

    /// Add a user source. The URL is validated, a fresh id assigned, and
    /// the kind classified from the URL when not given explicitly.
    pub fn add(&self, request: NewFeedRequest) -> Result<FeedSource> {
        Url::parse(&request.url)?;

        if request.name.trim().is_empty() {
            return Err(TechTrendError::Config("Feed name must not be empty".into()));
        }

        let id = format!("custom-{}", self.next_custom_id.fetch_add(1, Ordering::Relaxed));
        let kind = request
            .kind
            .unwrap_or_else(|| SourceKind::classify(&request.url));

        let source = FeedSource::new(&id, request.name.trim(), &request.url, kind);
        self.custom
            .write()
            .expect("registry lock")
            .push(source.clone());

        Ok(source)
    }

    /// Remove a user-added source. A no-op when the id is unknown.
    pub fn remove(&self, id: &str) {
        self.custom
            .write()
            .expect("registry lock")
            .retain(|s| s.id != id);
    }

    /// Flip a source's enabled flag, checking built-ins first and then
    /// user-added sources. Unknown ids are a no-op.
    pub fn set_enabled(&self, id: &str, enabled: bool) {
        {
            let mut builtin = self.builtin.write().expect("registry lock");
            if let Some(source) = builtin.iter_mut().find(|s| s.id == id) {
                source.enabled = enabled;
                return;
            }
        }

        let mut custom = self.custom.write().expect("registry lock");
        if let Some(source) = custom.iter_mut().find(|s| s.id == id) {
            source.enabled = enabled;
        }
    }
}

/// The built-in source set.
fn default_sources() -> Vec<FeedSource> {
    vec![
        FeedSource::new("devto", "Dev.to", "https://dev.to/feed", SourceKind::Rss),
        FeedSource::new(
            "techcrunch",
            "TechCrunch",
            "https://techcrunch.com/feed/",
            SourceKind::Rss,
        ),
        FeedSource::new(
            "css-tricks",
            "CSS-Tricks",
            "https://css-tricks.com/feed/",
            SourceKind::Rss,
        ),
        FeedSource::new(
            "smashing",
            "Smashing Magazine",
            "https://www.smashingmagazine.com/feed/",
            SourceKind::Rss,
        ),
        FeedSource::new(
            "reddit-programming",
            "Reddit Programming",
            "https://www.reddit.com/r/programming/.rss",
            SourceKind::Rss,
        ),
        FeedSource::new(
            "github-blog",
            "GitHub Blog",
            "https://github.blog/feed/",
            SourceKind::Rss,
        ),
        FeedSource::new(
            "web-dev",
            "web.dev",
            "https://web.dev/feed.xml",
            SourceKind::Rss,
        ),
        FeedSource::new(
            "hackernews",
            "Hacker News",
            "https://news.ycombinator.com/rss",
            SourceKind::Rss,
        ),
    ]
}
