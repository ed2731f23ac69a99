//! Mock catalog source for testing.

use async_trait::async_trait;

use super::{CatalogSource, MediaItem, MediaKind};
use crate::error::{FeedError, Result};

/// Build a minimal catalog item for tests and examples.
pub fn media_item(id: &str, kind: MediaKind) -> MediaItem {
    MediaItem {
        id: id.to_string(),
        media_url: format!("https://media.test/{id}.mp4"),
        poster_url: None,
        kind,
        title: format!("Clip {id}"),
        category: "general".to_string(),
        tags: Vec::new(),
        created_at: None,
    }
}

/// Catalog source serving a fixed in-memory snapshot, or failing on demand.
pub struct MockCatalogSource {
    items: Vec<MediaItem>,
    fail: bool,
}

impl MockCatalogSource {
    pub fn new(items: Vec<MediaItem>) -> Self {
        Self { items, fail: false }
    }

    /// A source whose every fetch fails, for exercising fallback paths.
    pub fn failing() -> Self {
        Self {
            items: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl CatalogSource for MockCatalogSource {
    async fn fetch_catalog(&self) -> Result<Vec<MediaItem>> {
        if self.fail {
            return Err(FeedError::Catalog("mock catalog offline".to_string()));
        }
        Ok(self.items.clone())
    }
}
