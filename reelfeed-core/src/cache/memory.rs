//! In-memory media cache for tests and ephemeral sessions.

use async_trait::async_trait;
use dashmap::DashMap;

use super::MediaCache;
use crate::error::Result;

/// Media cache backed by a concurrent map; contents die with the process.
#[derive(Default)]
pub struct MemoryMediaCache {
    entries: DashMap<String, Vec<u8>>,
}

impl MemoryMediaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl MediaCache for MemoryMediaCache {
    async fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.entries.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roundtrip() {
        let cache = MemoryMediaCache::new();
        assert!(cache.is_empty());

        cache.put("k", b"v".to_vec()).await.unwrap();
        assert!(cache.has("k").await);
        assert_eq!(cache.get("k").await.unwrap(), b"v");
        assert_eq!(cache.len(), 1);

        assert!(cache.get("missing").await.is_none());
    }
}
