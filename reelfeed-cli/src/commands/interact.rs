//! Interaction mutation commands.
//!
//! These touch only the local state directory; no network involved.

use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use reelfeed_core::{FeedConfig, InteractionStore, KvStore};

async fn open_store(config: &FeedConfig) -> InteractionStore {
    InteractionStore::load(Arc::new(KvStore::file(&config.state_dir))).await
}

pub async fn like(config: &FeedConfig, id: &str) -> Result<()> {
    let mut store = open_store(config).await;
    let liked = store.toggle_like(id).await?;
    if liked {
        println!("{} {}", "Liked".green().bold(), id);
    } else {
        println!("{} {}", "Un-liked".yellow(), id);
    }
    Ok(())
}

pub async fn dislike(config: &FeedConfig, id: &str) -> Result<()> {
    let mut store = open_store(config).await;
    store.dislike(id).await?;
    println!("{} {} (restore with `reelfeed restore`)", "Hidden".red().bold(), id);
    Ok(())
}

pub async fn restore(config: &FeedConfig, id: &str) -> Result<()> {
    let mut store = open_store(config).await;
    store.restore(id).await?;
    println!("{} {}", "Restored".green().bold(), id);
    Ok(())
}

pub async fn save(config: &FeedConfig, id: &str) -> Result<()> {
    let mut store = open_store(config).await;
    store.save(id).await?;
    println!("{} {}", "Saved".green().bold(), id);
    Ok(())
}

pub async fn unsave(config: &FeedConfig, id: &str) -> Result<()> {
    let mut store = open_store(config).await;
    store.unsave(id).await?;
    println!("{} {}", "Removed from saved".yellow(), id);
    Ok(())
}

pub async fn watch(config: &FeedConfig, id: &str, progress: f64) -> Result<()> {
    let mut store = open_store(config).await;
    store.record_progress(id, progress).await?;
    let stored = store.state().progress_for(id).unwrap_or(0.0);
    println!(
        "{} {} at {}%",
        "Progress".green().bold(),
        id,
        format!("{:.0}", stored * 100.0)
    );
    Ok(())
}
