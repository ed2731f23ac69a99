//! Prime command implementation.

use anyhow::{Context, Result};
use colored::Colorize;
use reelfeed_core::{FeedConfig, FeedSession, PRIORITY_PREFETCH_COUNT};

/// Execute the prime command: refresh the feed, then run both prefetch
/// passes to completion so the command's exit means the cache is warm.
pub async fn execute(config: &FeedConfig) -> Result<()> {
    let mut session = FeedSession::from_config(config).await?;
    let feed = session.refresh().await.context("Failed to refresh feed")?;

    println!(
        "Priming cache for {} items (priority window {})",
        feed.items.len().to_string().green(),
        PRIORITY_PREFETCH_COUNT
    );
    session.cache().prime(&feed.items).await;

    let mut cached = 0usize;
    for item in &feed.items {
        if session.cache().is_cached(&item.media_url).await {
            cached += 1;
        }
    }
    println!(
        "{} {} of {} items cached",
        "Done:".bold().green(),
        cached,
        feed.items.len()
    );
    Ok(())
}
