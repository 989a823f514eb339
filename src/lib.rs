//! # TechTrend
//!
//! Feed aggregation core for a tech-news reader: fetches a configurable
//! set of RSS and JSON-API sources concurrently, normalizes them into one
//! article model, caches per-source results with time-based expiry, and
//! merges everything into a single time-ordered stream.
//!
//! ## Architecture
//!
//! ```text
//! Registry -> Engine -> (Cache | Adapters -> Normalizer) -> merge -> enrich
//! ```
//!
//! - [`registry`]: the set of configured sources (built-in + user-added)
//! - [`engine`]: fan-out/fan-in orchestration with failure isolation
//! - [`cache`]: lazy-expiry cache over a durable key-value store
//! - [`fetcher`]: one adapter per wire shape (syndication XML, JSON API)
//! - [`normalizer`]: markup fragments to segments / plain text / image URL
//! - [`enrich`]: representative-image lookup for articles without one
//!
//! A single source failing (network, malformed payload, storage fault)
//! only ever costs that source's slice of the result; the aggregation
//! itself never fails from one bad feed.

/// Application context and error handling.
///
/// [`AppContext`](app::AppContext) wires together store, cache, registry,
/// adapters, enricher, and engine as explicit constructed dependencies.
pub mod app;

/// Lazy-expiry cache over a durable key-value store.
pub mod cache;

/// Command-line interface using clap.
pub mod cli;

/// TOML tunables plus environment credentials; everything optional.
pub mod config;

/// Core domain models: [`Article`](domain::Article),
/// [`FeedSource`](domain::FeedSource), [`SourceKind`](domain::SourceKind).
pub mod domain;

/// Aggregation engine: debounce gate, concurrent fan-out, merge, batched
/// image enrichment, atomic publish.
pub mod engine;

/// Image enrichment collaborator.
pub mod enrich;

/// Source adapters: RSS/Atom via feed-rs, JSON list-API via serde.
pub mod fetcher;

/// Markup normalization: typed text/code segments, flat summaries,
/// best-effort image extraction.
pub mod normalizer;

/// Configured feed sources and their enabled flags.
pub mod registry;

/// Durable key-value store trait with SQLite and in-memory backends.
pub mod store;
