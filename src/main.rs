use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use techtrend::app::AppContext;
use techtrend::cli::{commands, CacheAction, Cli, Commands, FeedsAction};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::new(None)?;

    match cli.command {
        Commands::Fetch { fresh } => {
            commands::fetch(&ctx, fresh).await?;
        }
        Commands::Feeds { action } => match action {
            FeedsAction::List => commands::list_feeds(&ctx),
            FeedsAction::Add { name, url, kind } => {
                commands::add_feed(&ctx, &name, &url, kind.as_deref())?;
            }
            FeedsAction::Remove { id } => commands::remove_feed(&ctx, &id),
            FeedsAction::Enable { id } => commands::set_feed_enabled(&ctx, &id, true),
            FeedsAction::Disable { id } => commands::set_feed_enabled(&ctx, &id, false),
        },
        Commands::Cache { action } => match action {
            CacheAction::Clear => commands::clear_cache(&ctx),
        },
    }

    Ok(())
}
