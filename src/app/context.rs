use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{Result, TechTrendError};
use crate::cache::ExpiringCache;
use crate::config::Config;
use crate::engine::AggregationEngine;
use crate::enrich::{ImageProvider, UnsplashProvider};
use crate::fetcher::{http_client, ApiAdapter, RssAdapter};
use crate::registry::FeedRegistry;
use crate::store::{KvStore, MemoryStore, SqliteStore};

/// Wires the constructed dependencies together: store, cache, registry,
/// adapters, enricher, engine. No component is a process-wide singleton;
/// tests substitute any seam they need.
pub struct AppContext {
    pub config: Config,
    pub registry: Arc<FeedRegistry>,
    pub cache: ExpiringCache,
    pub engine: AggregationEngine,
}

impl AppContext {
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let config = Config::load()?;
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };
        let store: Arc<dyn KvStore> = Arc::new(SqliteStore::new(&db_path)?);
        Ok(Self::assemble(config, store))
    }

    /// Context backed by a non-durable store; used in tests.
    pub fn in_memory(config: Config) -> Self {
        Self::assemble(config, Arc::new(MemoryStore::new()))
    }

    fn assemble(config: Config, store: Arc<dyn KvStore>) -> Self {
        let client = http_client(config.fetch_timeout());

        let registry = Arc::new(FeedRegistry::new());
        let cache = ExpiringCache::with_ttl(store, config.tunables().cache_ttl);

        let rss = Arc::new(RssAdapter::new(client.clone()));
        let api = Arc::new(ApiAdapter::new(
            client.clone(),
            config.news_api_key.clone(),
        ));
        let enricher: Arc<dyn ImageProvider> = Arc::new(UnsplashProvider::new(
            client,
            config.unsplash_access_key.clone(),
        ));

        let engine = AggregationEngine::new(
            registry.clone(),
            cache.clone(),
            rss,
            api,
            enricher,
            config.tunables(),
        );

        Self {
            config,
            registry,
            cache,
            engine,
        }
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| TechTrendError::Config("Could not find data directory".into()))?;
        let techtrend_dir = data_dir.join("techtrend");
        std::fs::create_dir_all(&techtrend_dir)?;
        Ok(techtrend_dir.join("techtrend.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_context_wires_up() {
        let ctx = AppContext::in_memory(Config::default());
        assert!(!ctx.registry.list().is_empty());
        assert!(ctx.engine.articles().is_empty());
    }
}
