//! Rails command implementation.

use anyhow::{Context, Result};
use colored::Colorize;
use reelfeed_core::{FeedConfig, FeedSession, SectionId};

/// Execute the rails command.
pub async fn execute(config: &FeedConfig, json: bool) -> Result<()> {
    let mut session = FeedSession::from_config(config).await?;
    let feed = session.refresh().await.context("Failed to refresh feed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&feed.sections)?);
        return Ok(());
    }

    if feed.sections.is_empty() {
        println!("{}", "No rails to show".yellow());
        return Ok(());
    }

    for section in &feed.sections {
        let title = section.id.to_string();
        let header = if section.id == SectionId::ContinueWatching {
            title.yellow().bold()
        } else {
            title.green().bold()
        };
        println!(
            "{header} {}",
            format!("({} items)", section.items.len()).dimmed()
        );
        for item in &section.items {
            println!("    {} {}", item.id.bold(), item.title);
        }
    }
    Ok(())
}
