//! Filesystem media cache.
//!
//! One file per key under a cache directory, named by the SHA3-256 of the
//! URL so arbitrary URLs map to safe filenames. The directory lives in
//! platform-managed storage; files disappearing underneath us is normal
//! and reads simply miss.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha3::{Digest, Sha3_256};
use tracing::debug;

use super::MediaCache;
use crate::error::{FeedError, Result};

/// Media cache storing each entry as a file.
pub struct FsMediaCache {
    dir: PathBuf,
}

impl FsMediaCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let mut hasher = Sha3_256::new();
        hasher.update(key.as_bytes());
        self.dir.join(hex::encode(hasher.finalize()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl MediaCache for FsMediaCache {
    async fn has(&self, key: &str) -> bool {
        tokio::fs::metadata(self.path_for(key)).await.is_ok()
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            FeedError::Cache(format!("Failed to create {}: {e}", self.dir.display()))
        })?;
        let path = self.path_for(key);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| FeedError::Cache(format!("Failed to write {}: {e}", path.display())))?;
        debug!(key, path = %path.display(), "Stored cache entry");
        Ok(())
    }

    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        tokio::fs::read(self.path_for(key)).await.ok()
    }
}
