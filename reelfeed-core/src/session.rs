//! Session orchestration: one refresh cycle of the client.
//!
//! A refresh fetches the catalog (falling back to the last persisted
//! snapshot when the network fails), assembles the personalized ordering,
//! partitions it into rails, and hands the result back. Cache priming is
//! separate and fire-and-forget.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::cache::{CacheManager, FsMediaCache, HttpMediaFetcher};
use crate::catalog::{CatalogSource, HttpCatalogConfig, HttpCatalogSource, MediaItem};
use crate::config::FeedConfig;
use crate::error::{FeedError, Result};
use crate::feed::FeedAssembler;
use crate::interactions::InteractionStore;
use crate::persist::{KvStore, CATALOG_SNAPSHOT_KEY};
use crate::ranking::{HttpRankingService, RankingService};
use crate::sections::{self, Section};

/// One assembled, partitioned feed.
#[derive(Debug, Clone)]
pub struct Feed {
    /// The full deduplicated ordering over the catalog.
    pub items: Vec<MediaItem>,
    /// Display rails in display order.
    pub sections: Vec<Section>,
}

/// Owns the collaborators of one device session.
pub struct FeedSession {
    catalog_source: Arc<dyn CatalogSource>,
    assembler: FeedAssembler,
    interactions: InteractionStore,
    cache: Arc<CacheManager>,
    store: Arc<KvStore>,
}

impl FeedSession {
    pub fn new(
        catalog_source: Arc<dyn CatalogSource>,
        ranking: Option<Arc<dyn RankingService>>,
        interactions: InteractionStore,
        cache: Arc<CacheManager>,
        store: Arc<KvStore>,
    ) -> Self {
        Self {
            catalog_source,
            assembler: FeedAssembler::new(ranking),
            interactions,
            cache,
            store,
        }
    }

    /// Build a session with HTTP collaborators and file-backed state.
    pub async fn from_config(config: &FeedConfig) -> Result<Self> {
        if config.catalog_url.is_empty() {
            return Err(FeedError::Config("Catalog URL not set".to_string()));
        }

        let catalog_source = HttpCatalogSource::with_config(HttpCatalogConfig {
            endpoint: config.catalog_url.clone(),
            timeout: config.timeout(),
            max_retries: config.max_retries,
        })?;

        let ranking: Option<Arc<dyn RankingService>> = match &config.ranking_url {
            Some(url) => Some(Arc::new(HttpRankingService::new(url.clone())?)),
            None => None,
        };

        let store = Arc::new(KvStore::file(&config.state_dir));
        let interactions = InteractionStore::load(store.clone()).await;
        let cache = CacheManager::new(
            Arc::new(FsMediaCache::new(&config.cache_dir)),
            Arc::new(HttpMediaFetcher::new()?),
            store.clone(),
        )
        .await;

        Ok(Self::new(
            Arc::new(catalog_source),
            ranking,
            interactions,
            Arc::new(cache),
            store,
        ))
    }

    /// Fetch, assemble, and partition the current feed.
    ///
    /// A successful non-empty fetch replaces the persisted fallback
    /// snapshot. A failed or empty fetch falls back to that snapshot;
    /// only a failure with no snapshot at all surfaces as an error.
    #[instrument(level = "info", skip(self))]
    pub async fn refresh(&mut self) -> Result<Feed> {
        let catalog = match self.catalog_source.fetch_catalog().await {
            Ok(items) if !items.is_empty() => {
                if let Err(e) = self.store.put_json(CATALOG_SNAPSHOT_KEY, &items).await {
                    warn!(error = %e, "Failed to persist catalog snapshot");
                }
                items
            }
            Ok(_) => {
                warn!("Catalog fetch returned no items, falling back to snapshot");
                self.snapshot().await
            }
            Err(e) => {
                warn!(error = %e, "Catalog fetch failed, falling back to snapshot");
                let snapshot = self.snapshot().await;
                if snapshot.is_empty() {
                    return Err(FeedError::Catalog("No catalog available".to_string()));
                }
                snapshot
            }
        };

        let items = self
            .assembler
            .assemble(&catalog, self.interactions.state())
            .await;
        let sections = sections::distribute(&items, self.interactions.state());

        info!(
            items = items.len(),
            sections = sections.len(),
            "Refreshed feed"
        );
        Ok(Feed { items, sections })
    }

    /// Kick off cache priming for an assembled feed and return
    /// immediately. Stale in-flight fetches from a previous prime are
    /// left to finish; their cache entries are never wrong, only
    /// possibly unused.
    pub fn prime_cache(&self, items: Vec<MediaItem>) {
        let cache = self.cache.clone();
        tokio::spawn(async move {
            cache.prime(&items).await;
        });
    }

    pub fn interactions(&self) -> &InteractionStore {
        &self.interactions
    }

    pub fn interactions_mut(&mut self) -> &mut InteractionStore {
        &mut self.interactions
    }

    pub fn cache(&self) -> &Arc<CacheManager> {
        &self.cache
    }

    async fn snapshot(&self) -> Vec<MediaItem> {
        self.store.get_json(CATALOG_SNAPSHOT_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryMediaCache;
    use crate::catalog::{media_item, MediaKind, MockCatalogSource};
    use crate::error::Result as CoreResult;

    struct NoFetch;

    #[async_trait::async_trait]
    impl crate::cache::MediaFetcher for NoFetch {
        async fn fetch(&self, _url: &str) -> CoreResult<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    async fn session_with(source: Arc<dyn CatalogSource>, store: Arc<KvStore>) -> FeedSession {
        let interactions = InteractionStore::load(store.clone()).await;
        let cache = CacheManager::new(
            Arc::new(MemoryMediaCache::new()),
            Arc::new(NoFetch),
            store.clone(),
        )
        .await;
        FeedSession::new(source, None, interactions, Arc::new(cache), store)
    }

    #[tokio::test]
    async fn test_refresh_persists_snapshot_for_fallback() {
        let items = vec![
            media_item("a", MediaKind::Short),
            media_item("b", MediaKind::Long),
        ];
        let store = Arc::new(KvStore::in_memory());

        let mut session =
            session_with(Arc::new(MockCatalogSource::new(items.clone())), store.clone()).await;
        let feed = session.refresh().await.unwrap();
        assert_eq!(feed.items.len(), 2);

        // Same store, now-offline source: snapshot keeps the feed alive.
        let mut offline = session_with(Arc::new(MockCatalogSource::failing()), store).await;
        let feed = offline.refresh().await.unwrap();
        assert_eq!(feed.items.len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_with_nothing_at_all_errors() {
        let store = Arc::new(KvStore::in_memory());
        let mut session = session_with(Arc::new(MockCatalogSource::failing()), store).await;
        assert!(matches!(
            session.refresh().await,
            Err(FeedError::Catalog(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_fetch_falls_back_without_error() {
        let store = Arc::new(KvStore::in_memory());
        let mut session = session_with(Arc::new(MockCatalogSource::new(Vec::new())), store).await;
        let feed = session.refresh().await.unwrap();
        assert!(feed.items.is_empty());
        assert!(feed.sections.is_empty());
    }

    #[tokio::test]
    async fn test_from_config_requires_catalog_url() {
        let config = FeedConfig::default();
        assert!(matches!(
            FeedSession::from_config(&config).await,
            Err(FeedError::Config(_))
        ));
    }
}
