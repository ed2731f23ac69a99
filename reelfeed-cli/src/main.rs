//! Reelfeed CLI - personalized video feed driver.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use reelfeed_core::FeedConfig;

mod commands;

#[derive(Parser)]
#[command(name = "reelfeed")]
#[command(author, version, about = "Personalized video feed client", long_about = None)]
struct Cli {
    /// Catalog resource-list endpoint (overrides REELFEED_CATALOG_URL)
    #[arg(long, global = true)]
    catalog_url: Option<String>,

    /// Ranking endpoint (overrides REELFEED_RANKING_URL)
    #[arg(long, global = true)]
    ranking_url: Option<String>,

    /// State directory (overrides REELFEED_STATE_DIR)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Media cache directory (overrides REELFEED_CACHE_DIR)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and print the assembled feed
    Feed {
        /// Print at most this many items
        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        /// Emit the full feed as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch the feed and print the display rails
    Rails {
        /// Emit the rails as JSON
        #[arg(long)]
        json: bool,
    },

    /// Prefetch media for the current feed into the offline cache
    Prime,

    /// Search the current feed by title or category
    Search {
        /// Case-insensitive substring to look for
        query: String,
    },

    /// Like an item, or un-like it if already liked
    Like { id: String },

    /// Hide an item from the feed
    Dislike { id: String },

    /// Un-hide a previously disliked item
    Restore { id: String },

    /// Save an item for later
    Save { id: String },

    /// Remove an item from the saved list
    Unsave { id: String },

    /// Record watch progress for an item (0.0 to 1.0)
    Watch { id: String, progress: f64 },
}

impl Cli {
    /// Environment configuration with command-line overrides applied.
    fn config(&self) -> FeedConfig {
        let mut config = FeedConfig::from_env();
        if let Some(url) = &self.catalog_url {
            config.catalog_url = url.clone();
        }
        if let Some(url) = &self.ranking_url {
            config.ranking_url = Some(url.clone());
        }
        if let Some(dir) = &self.state_dir {
            config.state_dir = dir.clone();
        }
        if let Some(dir) = &self.cache_dir {
            config.cache_dir = dir.clone();
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config();

    match cli.command {
        Commands::Feed { limit, json } => commands::feed::execute(&config, limit, json).await,
        Commands::Rails { json } => commands::rails::execute(&config, json).await,
        Commands::Prime => commands::prime::execute(&config).await,
        Commands::Search { query } => commands::feed::search(&config, &query).await,
        Commands::Like { id } => commands::interact::like(&config, &id).await,
        Commands::Dislike { id } => commands::interact::dislike(&config, &id).await,
        Commands::Restore { id } => commands::interact::restore(&config, &id).await,
        Commands::Save { id } => commands::interact::save(&config, &id).await,
        Commands::Unsave { id } => commands::interact::unsave(&config, &id).await,
        Commands::Watch { id, progress } => {
            commands::interact::watch(&config, &id, progress).await
        }
    }
}
