pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "techtrend")]
#[command(about = "Aggregate tech-news feeds into one cached, time-ordered stream", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch and print the merged article stream
    Fetch {
        /// Bypass per-source caches and the cooldown window
        #[arg(long)]
        fresh: bool,
    },
    /// Manage feed sources
    Feeds {
        #[command(subcommand)]
        action: FeedsAction,
    },
    /// Manage the feed cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
pub enum FeedsAction {
    /// List all configured sources
    List,
    /// Add a user feed
    Add {
        /// Display name
        name: String,
        /// Fetch endpoint
        url: String,
        /// Wire shape: "rss" or "api" (classified from the URL when omitted)
        #[arg(long)]
        kind: Option<String>,
    },
    /// Remove a user feed by id
    Remove {
        id: String,
    },
    /// Enable a source by id
    Enable {
        id: String,
    },
    /// Disable a source by id
    Disable {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum CacheAction {
    /// Drop all cached feed results
    Clear,
}
