//! Orchestrates one aggregation pass: debounce gate, concurrent fan-out
//! over enabled sources with per-source caching and failure isolation,
//! merge/dedup/sort, then batched image enrichment.
//!
//! State machine: Idle -> Fetching -> Idle. Requests arriving while a
//! pass is in flight are dropped, not queued; a forced request bypasses
//! the cooldown but not the in-flight guard.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use futures::future::join_all;

use crate::app::TechTrendError;
use crate::cache::ExpiringCache;
use crate::domain::{Article, FeedSource, SourceKind};
use crate::enrich::ImageProvider;
use crate::fetcher::SourceAdapter;
use crate::registry::FeedRegistry;

/// Engine timing and batching knobs.
#[derive(Debug, Clone)]
pub struct EngineTunables {
    /// Per-source cache entry lifetime.
    pub cache_ttl: Duration,
    /// Window after a completed pass during which non-forced requests
    /// are suppressed.
    pub cooldown: Duration,
    /// Articles per enrichment wave.
    pub enrich_batch: usize,
}

impl Default for EngineTunables {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(5 * 60),
            cooldown: Duration::from_secs(30),
            enrich_batch: 5,
        }
    }
}

pub struct AggregationEngine {
    registry: Arc<FeedRegistry>,
    cache: ExpiringCache,
    rss: Arc<dyn SourceAdapter + Send + Sync>,
    api: Arc<dyn SourceAdapter + Send + Sync>,
    enricher: Arc<dyn ImageProvider>,
    tunables: EngineTunables,
    articles: RwLock<Vec<Article>>,
    in_flight: AtomicBool,
    last_completed: Mutex<Option<Instant>>,
    last_error: Mutex<Option<String>>,
}

/// Clears the in-flight flag (and optionally records completion) on every
/// exit path, so a panic or early return never wedges the engine.
struct FlightGuard<'a> {
    engine: &'a AggregationEngine,
    record_completion: bool,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if self.record_completion {
            *self
                .engine
                .last_completed
                .lock()
                .expect("engine lock") = Some(Instant::now());
        }
        self.engine.in_flight.store(false, Ordering::Release);
    }
}

impl AggregationEngine {
    pub fn new(
        registry: Arc<FeedRegistry>,
        cache: ExpiringCache,
        rss: Arc<dyn SourceAdapter + Send + Sync>,
        api: Arc<dyn SourceAdapter + Send + Sync>,
        enricher: Arc<dyn ImageProvider>,
        tunables: EngineTunables,
    ) -> Self {
        Self {
            registry,
            cache,
            rss,
            api,
            enricher,
            tunables,
            articles: RwLock::new(Vec::new()),
            in_flight: AtomicBool::new(false),
            last_completed: Mutex::new(None),
            last_error: Mutex::new(None),
        }
    }

    /// The current published article set. Always a complete snapshot:
    /// callers never observe a partially-replaced list.
    pub fn articles(&self) -> Vec<Article> {
        self.articles.read().expect("engine lock").clone()
    }

    pub fn clear_articles(&self) {
        self.articles.write().expect("engine lock").clear();
    }

    /// The only caller-visible error state: an orchestration-level fault
    /// from the most recent accepted pass. Per-source faults never
    /// surface here.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().expect("engine lock").clone()
    }

    /// Run one aggregation pass and return the resulting article set.
    ///
    /// Never fails: a rejected request (in-flight or cooldown) and an
    /// orchestration fault both return the currently published set, the
    /// latter also recording `last_error`.
    pub async fn fetch_all(&self, force_fresh: bool) -> Vec<Article> {
        // In-flight guard takes precedence over force.
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Aggregation already in flight; dropping request");
            return self.articles();
        }

        let mut guard = FlightGuard {
            engine: self,
            record_completion: true,
        };

        if !force_fresh {
            let last = *self.last_completed.lock().expect("engine lock");
            if let Some(at) = last {
                if at.elapsed() < self.tunables.cooldown {
                    tracing::debug!("Within cooldown window; dropping request");
                    guard.record_completion = false;
                    return self.articles();
                }
            }
        }

        match self.run_pass(force_fresh).await {
            Ok(articles) => {
                *self.last_error.lock().expect("engine lock") = None;
                articles
            }
            Err(e) => {
                tracing::error!("Aggregation pass failed: {e}");
                *self.last_error.lock().expect("engine lock") = Some(e.to_string());
                self.articles()
            }
        }
    }

    async fn run_pass(&self, force_fresh: bool) -> crate::app::Result<Vec<Article>> {
        let sources = self.registry.enabled();
        tracing::info!(
            "Aggregating {} sources (force_fresh = {force_fresh})",
            sources.len()
        );

        let fetches = sources
            .iter()
            .map(|source| self.fetch_with_cache(source, force_fresh));
        let outcomes = join_all(fetches).await;

        // Per-source isolation: a failed branch degrades to an empty list
        // and never disturbs the others. A pass where every source failed
        // is an aggregate failure.
        let mut failures = 0;
        let per_source: Vec<Vec<Article>> = outcomes
            .into_iter()
            .zip(&sources)
            .map(|(outcome, source)| match outcome {
                Ok(articles) => articles,
                Err(e) => {
                    tracing::error!("Fetching {} failed: {e}", source.name);
                    failures += 1;
                    Vec::new()
                }
            })
            .collect();

        if !sources.is_empty() && failures == sources.len() {
            return Err(TechTrendError::Other("All sources failed".into()));
        }

        let mut merged = merge(per_source);
        tracing::info!("Merged {} articles", merged.len());

        self.publish(merged.clone());
        self.enrich(&mut merged).await;

        Ok(merged)
    }

    /// Fetch one source through the cache, writing back on success.
    async fn fetch_with_cache(
        &self,
        source: &FeedSource,
        bypass: bool,
    ) -> crate::app::Result<Vec<Article>> {
        let key = format!("feed:{}", source.id);

        if !bypass {
            if let Some(articles) = self
                .cache
                .get_with_ttl::<Vec<Article>>(&key, self.tunables.cache_ttl)
            {
                tracing::debug!("Cache hit for {}", source.id);
                return Ok(articles);
            }
        }

        let adapter = match source.kind {
            SourceKind::Rss => &self.rss,
            SourceKind::Api => &self.api,
        };

        let articles = adapter.fetch_articles(source).await?;
        self.cache.set(&key, &articles);
        Ok(articles)
    }

    /// Look up images for articles that lack one, in sequential bounded
    /// waves. Each completed wave republishes the full list so partial
    /// progress is visible without ever exposing an incomplete snapshot.
    async fn enrich(&self, articles: &mut Vec<Article>) {
        let batch = self.tunables.enrich_batch.max(1);
        let total = articles.len();

        let mut start = 0;
        while start < total {
            let end = (start + batch).min(total);

            let lookups: Vec<_> = articles[start..end]
                .iter()
                .map(|a| (a.image_url.is_none(), a.title.clone(), a.tags.clone()))
                .collect();

            let wave = lookups.into_iter().map(|(missing, title, tags)| {
                let enricher = self.enricher.clone();
                async move {
                    if missing {
                        enricher.related_image(&title, &tags).await
                    } else {
                        None
                    }
                }
            });
            let found = join_all(wave).await;

            let mut changed = false;
            for (article, url) in articles[start..end].iter_mut().zip(found) {
                if article.image_url.is_none() {
                    if let Some(url) = url {
                        article.image_url = Some(url);
                        changed = true;
                    }
                }
            }

            if changed {
                self.publish(articles.clone());
            }

            start = end;
        }
    }

    fn publish(&self, articles: Vec<Article>) {
        *self.articles.write().expect("engine lock") = articles;
    }
}

/// Concatenate per-source results in fan-out order, collapse colliding
/// ids (last seen wins, at the first-seen position), and sort by publish
/// time descending. The sort is stable, so ties keep fan-out order.
fn merge(per_source: Vec<Vec<Article>>) -> Vec<Article> {
    let mut merged: Vec<Article> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for article in per_source.into_iter().flatten() {
        match positions.entry(article.id.clone()) {
            Entry::Occupied(occupied) => merged[*occupied.get()] = article,
            Entry::Vacant(vacant) => {
                vacant.insert(merged.len());
                merged.push(article);
            }
        }
    }

    merged.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    merged
}
