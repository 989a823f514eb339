use crate::app::{AppContext, Result, TechTrendError};
use crate::domain::{NewFeedRequest, SourceKind};

pub async fn fetch(ctx: &AppContext, fresh: bool) -> Result<()> {
    let articles = ctx.engine.fetch_all(fresh).await;

    if let Some(error) = ctx.engine.last_error() {
        eprintln!("Aggregation error: {error}");
    }

    if articles.is_empty() {
        println!("No articles");
        return Ok(());
    }

    for article in &articles {
        println!(
            "{}  [{}]  {}",
            article.published_at.format("%Y-%m-%d %H:%M"),
            article.source,
            article.title
        );
        println!("    {}", article.url);
    }
    println!("{} articles", articles.len());

    Ok(())
}

pub fn list_feeds(ctx: &AppContext) {
    for source in ctx.registry.list() {
        let marker = if source.enabled { " " } else { "-" };
        let kind = match source.kind {
            SourceKind::Rss => "rss",
            SourceKind::Api => "api",
        };
        println!("{marker} {:20} {kind:4} {}\n      {}", source.id, source.name, source.url);
    }
}

pub fn add_feed(ctx: &AppContext, name: &str, url: &str, kind: Option<&str>) -> Result<()> {
    let kind = match kind {
        Some("rss") => Some(SourceKind::Rss),
        Some("api") => Some(SourceKind::Api),
        Some(other) => {
            return Err(TechTrendError::Config(format!(
                "Unknown feed kind: {other} (expected \"rss\" or \"api\")"
            )))
        }
        None => None,
    };

    let source = ctx.registry.add(NewFeedRequest {
        name: name.to_string(),
        url: url.to_string(),
        kind,
    })?;

    println!("Added feed {} ({})", source.id, source.name);
    Ok(())
}

pub fn remove_feed(ctx: &AppContext, id: &str) {
    ctx.registry.remove(id);
    println!("Removed feed {id}");
}

pub fn set_feed_enabled(ctx: &AppContext, id: &str, enabled: bool) {
    ctx.registry.set_enabled(id, enabled);
    println!(
        "{} feed {id}",
        if enabled { "Enabled" } else { "Disabled" }
    );
}

pub fn clear_cache(ctx: &AppContext) {
    ctx.cache.clear();
    println!("Cache cleared");
}
