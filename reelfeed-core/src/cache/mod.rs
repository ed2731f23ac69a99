//! Offline media cache.
//!
//! Binary media is cached by `media_url`; the hosting service already
//! encodes a content-derived identifier in the URL, so the location is the
//! key. The platform may evict entries at any time; every call site
//! tolerates a miss and playback simply re-fetches on demand.
//!
//! Priming is advisory. A prefetch that fails leaves nothing worse than an
//! uncached item behind, so failures are isolated per item and never
//! surfaced to the caller.

mod fs;
mod memory;

pub use fs::FsMediaCache;
pub use memory::MemoryMediaCache;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::catalog::MediaItem;
use crate::error::{FeedError, Result};
use crate::net::build_client;
use crate::persist::{KvStore, SEEN_IDS_KEY};

/// How many items from the head of the feed get a high-priority prefetch.
pub const PRIORITY_PREFETCH_COUNT: usize = 10;

/// How many never-seen items the secondary pass prefetches.
pub const UNSEEN_PREFETCH_COUNT: usize = 5;

/// Default timeout for a single media download.
const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Keyed store for opaque media bytes.
///
/// `get` may miss even for a key that was just `put`; storage pressure
/// eviction is the platform's call, not ours.
#[async_trait]
pub trait MediaCache: Send + Sync {
    async fn has(&self, key: &str) -> bool;
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()>;
    async fn get(&self, key: &str) -> Option<Vec<u8>>;
}

/// Downloads media bytes for the cache.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// reqwest-backed media fetcher.
pub struct HttpMediaFetcher {
    client: Client,
}

impl HttpMediaFetcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: build_client(FETCH_TIMEOUT)?,
        })
    }
}

#[async_trait]
impl MediaFetcher for HttpMediaFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Cache(format!(
                "Media fetch returned status {status}: {url}"
            )));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Prefetches media into the cache and tracks the seen-ids frontier.
///
/// The seen ledger records every id a prime pass has touched, persisted
/// after each addition, and biases the secondary pass toward media the
/// user has never been shown. It is best-effort state: losing it costs
/// some duplicate downloads, nothing else.
pub struct CacheManager {
    cache: Arc<dyn MediaCache>,
    fetcher: Arc<dyn MediaFetcher>,
    store: Arc<KvStore>,
    seen: Mutex<Vec<String>>,
}

impl CacheManager {
    /// Create a manager, loading the persisted seen ledger.
    pub async fn new(
        cache: Arc<dyn MediaCache>,
        fetcher: Arc<dyn MediaFetcher>,
        store: Arc<KvStore>,
    ) -> Self {
        let seen: Vec<String> = store.get_json(SEEN_IDS_KEY).await;
        debug!(seen = seen.len(), "Loaded seen-ids ledger");
        Self {
            cache,
            fetcher,
            store,
            seen: Mutex::new(seen),
        }
    }

    /// Best-effort presence check for a media URL.
    pub async fn is_cached(&self, media_url: &str) -> bool {
        self.cache.has(media_url).await
    }

    /// Cached bytes for a media URL, if still present.
    pub async fn cached_bytes(&self, media_url: &str) -> Option<Vec<u8>> {
        self.cache.get(media_url).await
    }

    /// Ids currently in the seen ledger.
    pub async fn seen_ids(&self) -> Vec<String> {
        self.seen.lock().await.clone()
    }

    /// Prefetch media for an ordered feed.
    ///
    /// Two passes: the first [`PRIORITY_PREFETCH_COUNT`] items of the
    /// feed, then up to [`UNSEEN_PREFETCH_COUNT`] items whose ids the
    /// ledger has never recorded. Within a pass all fetches run
    /// concurrently and independently; one failure affects nothing else.
    /// There is no cancellation; a newer prime simply issues new
    /// attempts, and stale fetches complete into the cache harmlessly.
    #[instrument(level = "info", skip_all, fields(items = items.len()))]
    pub async fn prime(&self, items: &[MediaItem]) {
        let priority = items.iter().take(PRIORITY_PREFETCH_COUNT);
        join_all(priority.map(|item| self.prime_one(item))).await;

        let unseen: Vec<&MediaItem> = {
            let seen = self.seen.lock().await;
            items
                .iter()
                .filter(|item| !seen.contains(&item.id))
                .take(UNSEEN_PREFETCH_COUNT)
                .collect()
        };
        if unseen.is_empty() {
            return;
        }
        debug!(unseen = unseen.len(), "Prefetching unseen media");
        join_all(unseen.into_iter().map(|item| self.prime_one(item))).await;
    }

    /// Fetch-and-store one item, swallowing its failure.
    async fn prime_one(&self, item: &MediaItem) {
        if self.cache.has(&item.media_url).await {
            self.mark_seen(&item.id).await;
            return;
        }

        match self.fetcher.fetch(&item.media_url).await {
            Ok(bytes) => {
                let len = bytes.len();
                if let Err(e) = self.cache.put(&item.media_url, bytes).await {
                    warn!(id = %item.id, error = %e, "Failed to store prefetched media");
                } else {
                    debug!(id = %item.id, bytes = len, "Prefetched media");
                }
            }
            Err(e) => {
                warn!(id = %item.id, error = %e, "Prefetch failed");
            }
        }

        // Attempted counts as seen: the unseen pass should move the
        // frontier forward, not retry this refresh's failures.
        self.mark_seen(&item.id).await;
    }

    /// Record an id as seen and persist the ledger. Also called when an
    /// item is displayed without ever being prefetched.
    pub async fn mark_seen(&self, id: &str) {
        let mut seen = self.seen.lock().await;
        if seen.iter().any(|x| x == id) {
            return;
        }
        seen.push(id.to_string());
        if let Err(e) = self.store.put_json(SEEN_IDS_KEY, &*seen).await {
            warn!(error = %e, "Failed to persist seen-ids ledger");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{media_item, MediaKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fetcher that counts attempts and fails for scripted URLs.
    struct CountingFetcher {
        attempts: AtomicUsize,
        fail_for: Vec<String>,
    }

    impl CountingFetcher {
        fn new() -> Self {
            Self {
                attempts: AtomicUsize::new(0),
                fail_for: Vec::new(),
            }
        }

        fn failing_for(urls: Vec<String>) -> Self {
            Self {
                attempts: AtomicUsize::new(0),
                fail_for: urls,
            }
        }
    }

    #[async_trait]
    impl MediaFetcher for CountingFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.fail_for.iter().any(|u| u == url) {
                return Err(FeedError::Cache(format!("scripted failure: {url}")));
            }
            Ok(url.as_bytes().to_vec())
        }
    }

    fn shorts(n: usize) -> Vec<MediaItem> {
        (0..n)
            .map(|i| media_item(&format!("v{i}"), MediaKind::Short))
            .collect()
    }

    async fn manager(
        cache: Arc<dyn MediaCache>,
        fetcher: Arc<CountingFetcher>,
    ) -> CacheManager {
        CacheManager::new(cache, fetcher, Arc::new(KvStore::in_memory())).await
    }

    #[tokio::test]
    async fn test_prime_skips_cached_and_isolates_failures() {
        let items = shorts(10);
        let cache: Arc<dyn MediaCache> = Arc::new(MemoryMediaCache::new());
        // Item #3 (index 2) is already cached.
        cache
            .put(&items[2].media_url, b"already".to_vec())
            .await
            .unwrap();
        // Item #5 (index 4) fails to download.
        let fetcher = Arc::new(CountingFetcher::failing_for(vec![items[4]
            .media_url
            .clone()]));

        let mgr = manager(cache.clone(), fetcher.clone()).await;
        mgr.prime(&items).await;

        // Exactly 9 fetch attempts: the cached one was skipped, and the
        // unseen pass retries nothing from this refresh.
        assert_eq!(fetcher.attempts.load(Ordering::SeqCst), 9);

        for (i, item) in items.iter().enumerate() {
            if i == 4 {
                assert!(!cache.has(&item.media_url).await);
            } else {
                assert!(cache.has(&item.media_url).await, "item {i} not cached");
            }
        }
    }

    #[tokio::test]
    async fn test_unseen_pass_reaches_past_priority_window() {
        let items = shorts(PRIORITY_PREFETCH_COUNT + 8);
        let cache: Arc<dyn MediaCache> = Arc::new(MemoryMediaCache::new());
        let fetcher = Arc::new(CountingFetcher::new());

        let mgr = manager(cache.clone(), fetcher.clone()).await;
        mgr.prime(&items).await;

        assert_eq!(
            fetcher.attempts.load(Ordering::SeqCst),
            PRIORITY_PREFETCH_COUNT + UNSEEN_PREFETCH_COUNT
        );
        // The unseen pass covered the items right after the priority window.
        for item in items.iter().take(PRIORITY_PREFETCH_COUNT + UNSEEN_PREFETCH_COUNT) {
            assert!(cache.has(&item.media_url).await);
        }
    }

    #[tokio::test]
    async fn test_seen_ledger_persists_across_managers() {
        let items = shorts(3);
        let kv = Arc::new(KvStore::in_memory());
        let cache: Arc<dyn MediaCache> = Arc::new(MemoryMediaCache::new());
        let fetcher = Arc::new(CountingFetcher::new());

        let mgr = CacheManager::new(cache.clone(), fetcher.clone(), kv.clone()).await;
        mgr.prime(&items).await;
        assert_eq!(mgr.seen_ids().await.len(), 3);

        let reloaded =
            CacheManager::new(cache, Arc::new(CountingFetcher::new()), kv).await;
        assert_eq!(reloaded.seen_ids().await.len(), 3);
    }

    #[tokio::test]
    async fn test_second_prime_fetches_nothing_new() {
        let items = shorts(4);
        let cache: Arc<dyn MediaCache> = Arc::new(MemoryMediaCache::new());
        let fetcher = Arc::new(CountingFetcher::new());

        let mgr = manager(cache, fetcher.clone()).await;
        mgr.prime(&items).await;
        let first = fetcher.attempts.load(Ordering::SeqCst);
        assert_eq!(first, 4);

        mgr.prime(&items).await;
        assert_eq!(fetcher.attempts.load(Ordering::SeqCst), first);
    }

    #[tokio::test]
    async fn test_mark_seen_idempotent() {
        let mgr = manager(
            Arc::new(MemoryMediaCache::new()),
            Arc::new(CountingFetcher::new()),
        )
        .await;
        mgr.mark_seen("x").await;
        mgr.mark_seen("x").await;
        assert_eq!(mgr.seen_ids().await, vec!["x".to_string()]);
    }
}
