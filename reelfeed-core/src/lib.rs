//! Reelfeed Core - Feed orchestration and offline media cache
//!
//! This crate is the engine of a personalized short/long video feed
//! client: it fetches a media catalog, re-orders it with an external
//! relevance ranking, tracks likes/dislikes/saves/watch progress on the
//! device, partitions the feed into named display rails, and prefetches
//! media bytes so playback is instant and works offline.
//!
//! # Features
//!
//! - Ranking merge that never loses or duplicates an item, whatever the
//!   ranking service returns
//! - Disjoint cursor-based display rails plus a continue-watching rail
//! - Crash-safe interaction state: every mutation persists the full state
//! - Offline cache keyed by media URL with a seen/unseen prefetch frontier
//! - Snapshot fallback when the catalog service is unreachable
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use reelfeed_core::{
//!     CacheManager, FeedSession, HttpCatalogSource, HttpMediaFetcher,
//!     FsMediaCache, InteractionStore, KvStore,
//! };
//!
//! # async fn example() -> reelfeed_core::Result<()> {
//! let store = Arc::new(KvStore::file(".reelfeed/state"));
//! let interactions = InteractionStore::load(store.clone()).await;
//! let cache = CacheManager::new(
//!     Arc::new(FsMediaCache::new(".reelfeed/cache")),
//!     Arc::new(HttpMediaFetcher::new()?),
//!     store.clone(),
//! )
//! .await;
//!
//! let mut session = FeedSession::new(
//!     Arc::new(HttpCatalogSource::new("https://media.example/list.json")?),
//!     None,
//!     interactions,
//!     Arc::new(cache),
//!     store,
//! );
//!
//! let feed = session.refresh().await?;
//! session.prime_cache(feed.items.clone());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod feed;
pub mod interactions;
mod net;
pub mod persist;
pub mod ranking;
pub mod sections;
pub mod session;

// Re-export main types for convenience
pub use cache::{
    CacheManager, FsMediaCache, HttpMediaFetcher, MediaCache, MediaFetcher, MemoryMediaCache,
    PRIORITY_PREFETCH_COUNT, UNSEEN_PREFETCH_COUNT,
};
pub use catalog::{
    media_item, CatalogSource, HttpCatalogConfig, HttpCatalogSource, MediaItem, MediaKind,
    MockCatalogSource,
};
pub use config::FeedConfig;
pub use error::{FeedError, Result};
pub use feed::FeedAssembler;
pub use interactions::{InteractionState, InteractionStore, WatchEntry};
pub use persist::{KvStore, CATALOG_SNAPSHOT_KEY, INTERACTIONS_KEY, SEEN_IDS_KEY};
pub use ranking::{HttpRankingService, MockRanking, RankOutcome, RankingService};
pub use sections::{
    continue_watching, distribute, hidden_items, items_in_category, liked_items, saved_items,
    ResumeEntry, Section, SectionId,
};
pub use session::{Feed, FeedSession};
