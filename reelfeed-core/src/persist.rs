//! Durable key-value persistence for client state.
//!
//! Three logical values live here, each under a fixed, versioned key so an
//! incompatible schema change shows up as an unknown key instead of a
//! half-parsed struct:
//!
//! - interaction state ([`INTERACTIONS_KEY`])
//! - the catalog fallback snapshot ([`CATALOG_SNAPSHOT_KEY`])
//! - the seen-ids prefetch ledger ([`SEEN_IDS_KEY`])
//!
//! Reads never fail past this boundary: an absent key, unreadable file, or
//! corrupt payload yields the type's default value. Startup must not be
//! blocked by whatever a previous run left on disk.

use std::path::PathBuf;

use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::error::{FeedError, Result};

/// Key for the persisted interaction state.
pub const INTERACTIONS_KEY: &str = "interactions-v5";

/// Key for the catalog fallback snapshot.
pub const CATALOG_SNAPSHOT_KEY: &str = "catalog-cache-v1";

/// Key for the seen-ids prefetch ledger.
pub const SEEN_IDS_KEY: &str = "seen-ids-v1";

enum KvBackend {
    /// One JSON file per key inside a state directory (production).
    File { dir: PathBuf },
    /// In-memory map (tests, ephemeral sessions).
    Memory(DashMap<String, Vec<u8>>),
}

/// Durable key-value store for serialized client state.
pub struct KvStore {
    backend: KvBackend,
}

impl KvStore {
    /// File-backed store rooted at `dir`. The directory is created lazily
    /// on first write.
    pub fn file(dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: KvBackend::File { dir: dir.into() },
        }
    }

    /// In-memory store; contents die with the process.
    pub fn in_memory() -> Self {
        Self {
            backend: KvBackend::Memory(DashMap::new()),
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, KvBackend::File { .. })
    }

    /// Raw bytes for a key, `None` if absent.
    pub async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match &self.backend {
            KvBackend::File { dir } => {
                let path = dir.join(format!("{key}.json"));
                match tokio::fs::read(&path).await {
                    Ok(bytes) => Ok(Some(bytes)),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                    Err(e) => Err(FeedError::Storage(format!(
                        "Failed to read {}: {e}",
                        path.display()
                    ))),
                }
            }
            KvBackend::Memory(map) => Ok(map.get(key).map(|entry| entry.value().clone())),
        }
    }

    /// Store raw bytes under a key, replacing any previous value.
    pub async fn put_raw(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        match &self.backend {
            KvBackend::File { dir } => {
                tokio::fs::create_dir_all(dir).await.map_err(|e| {
                    FeedError::Storage(format!("Failed to create {}: {e}", dir.display()))
                })?;
                let path = dir.join(format!("{key}.json"));
                tokio::fs::write(&path, bytes).await.map_err(|e| {
                    FeedError::Storage(format!("Failed to write {}: {e}", path.display()))
                })
            }
            KvBackend::Memory(map) => {
                map.insert(key.to_string(), bytes);
                Ok(())
            }
        }
    }

    /// Load a JSON value, substituting the default on absence, read
    /// failure, or parse failure. This is the documented recovery path
    /// for every persisted value, not an error case.
    pub async fn get_json<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        match self.get_raw(key).await {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(value) => value,
                Err(e) => {
                    warn!(key, error = %e, "Corrupt persisted value, using default");
                    T::default()
                }
            },
            Ok(None) => T::default(),
            Err(e) => {
                warn!(key, error = %e, "Failed to load persisted value, using default");
                T::default()
            }
        }
    }

    /// Serialize a value as JSON and store it under a key.
    pub async fn put_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| FeedError::Storage(format!("Failed to serialize {key}: {e}")))?;
        self.put_raw(key, bytes).await
    }
}

impl std::fmt::Debug for KvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let backend = match &self.backend {
            KvBackend::File { dir } => format!("File({})", dir.display()),
            KvBackend::Memory(map) => format!("Memory({} keys)", map.len()),
        };
        f.debug_struct("KvStore").field("backend", &backend).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_roundtrip() {
        let store = KvStore::in_memory();
        assert!(!store.is_persistent());

        store.put_json("k", &vec!["a".to_string()]).await.unwrap();
        let value: Vec<String> = store.get_json("k").await;
        assert_eq!(value, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn test_absent_key_defaults() {
        let store = KvStore::in_memory();
        let value: Vec<String> = store.get_json("missing").await;
        assert!(value.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_value_defaults() {
        let store = KvStore::in_memory();
        store
            .put_raw("k", b"{not json at all".to_vec())
            .await
            .unwrap();
        let value: Vec<String> = store.get_json("k").await;
        assert!(value.is_empty());
    }

    #[tokio::test]
    async fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = KvStore::file(dir.path());
        assert!(store.is_persistent());

        store.put_json("k", &42u32).await.unwrap();
        let value: u32 = store.get_json("k").await;
        assert_eq!(value, 42);

        // A second store over the same directory sees the value.
        let reopened = KvStore::file(dir.path());
        let value: u32 = reopened.get_json("k").await;
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_file_overwrite_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let store = KvStore::file(dir.path());
        store.put_json("k", &1u32).await.unwrap();
        store.put_json("k", &2u32).await.unwrap();
        let value: u32 = store.get_json("k").await;
        assert_eq!(value, 2);
    }
}
