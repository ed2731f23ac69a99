//! Feed and search command implementations.

use anyhow::{Context, Result};
use colored::Colorize;
use reelfeed_core::{catalog, FeedConfig, FeedSession, MediaItem, MediaKind};
use tracing::info;

/// One printed line per item: kind tag, id, title, category.
fn print_item(item: &MediaItem) {
    let kind = match item.kind {
        MediaKind::Short => "short".cyan(),
        MediaKind::Long => " long".magenta(),
    };
    println!(
        "  [{kind}] {} {} {}",
        item.id.bold(),
        item.title,
        format!("({})", item.category).dimmed()
    );
}

/// Execute the feed command.
pub async fn execute(config: &FeedConfig, limit: usize, json: bool) -> Result<()> {
    let mut session = FeedSession::from_config(config).await?;
    let feed = session.refresh().await.context("Failed to refresh feed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&feed.items)?);
        return Ok(());
    }

    info!(items = feed.items.len(), "Feed assembled");
    println!(
        "{} {} items",
        "Feed:".bold(),
        feed.items.len().to_string().green()
    );
    for item in feed.items.iter().take(limit) {
        print_item(item);
    }
    if feed.items.len() > limit {
        println!("  {} more not shown", (feed.items.len() - limit).to_string().dimmed());
    }
    Ok(())
}

/// Execute the search command against the freshly assembled feed.
pub async fn search(config: &FeedConfig, query: &str) -> Result<()> {
    let mut session = FeedSession::from_config(config).await?;
    let feed = session.refresh().await.context("Failed to refresh feed")?;

    let hits = catalog::search_items(&feed.items, query);
    if hits.is_empty() {
        println!("{}", "No matching items".yellow());
        return Ok(());
    }

    println!(
        "{} {} items matching {}",
        "Found".bold(),
        hits.len().to_string().green(),
        query.bold()
    );
    for item in hits {
        print_item(item);
    }
    Ok(())
}
