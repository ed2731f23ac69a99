//! Client configuration loaded from environment variables with defaults.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a feed session.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Catalog resource-list endpoint. Required for network sessions.
    pub catalog_url: String,
    /// Ranking endpoint; unset means the feed keeps catalog order.
    pub ranking_url: Option<String>,
    /// Directory for persisted state (interactions, snapshot, seen ledger).
    pub state_dir: PathBuf,
    /// Directory for cached media bytes.
    pub cache_dir: PathBuf,
    /// Request timeout in seconds for catalog and ranking calls.
    pub timeout_secs: u64,
    /// Maximum retry attempts for transient catalog errors.
    pub max_retries: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            catalog_url: String::new(),
            ranking_url: None,
            state_dir: PathBuf::from(".reelfeed/state"),
            cache_dir: PathBuf::from(".reelfeed/cache"),
            timeout_secs: 15,
            max_retries: 3,
        }
    }
}

impl FeedConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let catalog_url = std::env::var("REELFEED_CATALOG_URL").unwrap_or_default();

        let ranking_url = std::env::var("REELFEED_RANKING_URL")
            .ok()
            .filter(|s| !s.is_empty());

        let state_dir = std::env::var("REELFEED_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.state_dir);

        let cache_dir = std::env::var("REELFEED_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.cache_dir);

        let timeout_secs = std::env::var("REELFEED_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.timeout_secs);

        let max_retries = std::env::var("REELFEED_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_retries);

        Self {
            catalog_url,
            ranking_url,
            state_dir,
            cache_dir,
            timeout_secs,
            max_retries,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FeedConfig::default();
        assert!(config.catalog_url.is_empty());
        assert!(config.ranking_url.is_none());
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.timeout(), Duration::from_secs(15));
    }
}
