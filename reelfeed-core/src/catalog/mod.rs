//! Media catalog: data model and catalog sources.
//!
//! A catalog is the full set of playable items the hosting service knows
//! about at a point in time. Sources are fallible; a failed fetch is
//! recovered by the session from the last persisted snapshot, never by
//! inventing data here.
//!
//! ## Sources
//!
//! - [`HttpCatalogSource`] - resource-list JSON endpoint (production)
//! - [`MockCatalogSource`] - fixed in-memory catalog (testing only)

mod http;
mod mock;

pub use http::{HttpCatalogConfig, HttpCatalogSource};
pub use mock::{media_item, MockCatalogSource};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Whether an item plays in the vertical short-form feed or the
/// landscape long-form player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Short,
    Long,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Short => write!(f, "short"),
            Self::Long => write!(f, "long"),
        }
    }
}

/// One playable asset from a catalog snapshot.
///
/// `id` and `media_url` are each unique within a snapshot. Duplicate ids
/// from the source are a data error the assembler tolerates by keeping
/// the first occurrence. Items are immutable once a snapshot is
/// published; a new fetch produces a wholly new snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    pub media_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    pub kind: MediaKind,
    pub title: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl MediaItem {
    /// External collaborators key items sometimes by `id` and sometimes
    /// by `media_url`. Every place an external key is resolved against
    /// the catalog goes through here so the dual-key rule lives in one
    /// spot.
    pub fn matches_key(&self, key: &str) -> bool {
        self.id == key || self.media_url == key
    }
}

/// Case-insensitive title/category substring search over a catalog.
///
/// An empty query matches everything, which is what an interactive
/// search box expects while the user is still typing.
pub fn search_items<'a>(items: &'a [MediaItem], query: &str) -> Vec<&'a MediaItem> {
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|it| {
            it.title.to_lowercase().contains(&needle)
                || it.category.to_lowercase().contains(&needle)
        })
        .collect()
}

/// A remote source of media catalogs.
///
/// Implementations must be thread-safe (`Send + Sync`) and may perform
/// network requests; retries belong inside the implementation.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the current catalog snapshot.
    async fn fetch_catalog(&self) -> Result<Vec<MediaItem>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_key_by_id_and_url() {
        let item = media_item("clip-1", MediaKind::Short);
        assert!(item.matches_key("clip-1"));
        assert!(item.matches_key(&item.media_url));
        assert!(!item.matches_key("clip-2"));
    }

    #[test]
    fn test_search_by_title_and_category() {
        let mut a = media_item("a", MediaKind::Short);
        a.title = "Midnight Garden".into();
        a.category = "nature".into();
        let mut b = media_item("b", MediaKind::Long);
        b.title = "Deep Sea".into();
        b.category = "documentary".into();
        let items = vec![a, b];

        let hits = search_items(&items, "garden");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");

        let hits = search_items(&items, "DOCUMENTARY");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "b");

        assert_eq!(search_items(&items, "").len(), 2);
        assert!(search_items(&items, "nothing").is_empty());
    }

    #[test]
    fn test_media_kind_serde_roundtrip() {
        let json = serde_json::to_string(&MediaKind::Short).unwrap();
        assert_eq!(json, "\"short\"");
        let kind: MediaKind = serde_json::from_str("\"long\"").unwrap();
        assert_eq!(kind, MediaKind::Long);
    }
}
