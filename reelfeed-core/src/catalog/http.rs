//! HTTP catalog source backed by a hosting service's resource-list endpoint.
//!
//! The endpoint returns a JSON document listing every uploaded asset with
//! its dimensions and optional captions. Orientation decides the feed it
//! plays in: portrait assets become shorts, landscape assets long-form.
//!
//! ## Features
//!
//! - Automatic retry with exponential backoff on transient errors
//! - HTTPS-only connections
//! - Cache-busting query parameter so intermediaries never serve a stale list

use std::time::{Duration, Instant};

use async_trait::async_trait;
use backoff::{future::retry_notify, ExponentialBackoff};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{CatalogSource, MediaItem, MediaKind};
use crate::error::{FeedError, Result};
use crate::net::{build_client, is_transient_error, is_transient_status};

/// Default timeout for catalog requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Maximum number of retry attempts.
const MAX_RETRIES: u32 = 3;

/// Initial retry interval.
const INITIAL_INTERVAL: Duration = Duration::from_millis(200);

/// Maximum retry interval.
const MAX_INTERVAL: Duration = Duration::from_secs(3);

/// Resource-list response from the hosting service.
#[derive(Debug, Deserialize)]
struct ResourceList {
    #[serde(default)]
    resources: Vec<Resource>,
}

/// One uploaded asset as the hosting service describes it.
#[derive(Debug, Deserialize)]
struct Resource {
    id: String,
    media_url: String,
    #[serde(default)]
    poster_url: Option<String>,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

/// Configuration for the HTTP catalog source.
#[derive(Debug, Clone)]
pub struct HttpCatalogConfig {
    /// Resource-list endpoint URL.
    pub endpoint: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retry attempts for transient errors.
    pub max_retries: u32,
}

impl HttpCatalogConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: MAX_RETRIES,
        }
    }
}

/// Catalog source that fetches the hosting service's resource list.
pub struct HttpCatalogSource {
    client: Client,
    config: HttpCatalogConfig,
}

impl HttpCatalogSource {
    /// Create a source for the given resource-list endpoint.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::with_config(HttpCatalogConfig::new(endpoint))
    }

    /// Create a source with custom configuration.
    #[instrument(level = "debug", skip_all, fields(endpoint = %config.endpoint))]
    pub fn with_config(config: HttpCatalogConfig) -> Result<Self> {
        url::Url::parse(&config.endpoint)
            .map_err(|e| FeedError::Config(format!("Invalid catalog endpoint: {e}")))?;
        let client = build_client(config.timeout)?;
        Ok(Self { client, config })
    }

    async fn fetch_once(&self) -> std::result::Result<Vec<MediaItem>, backoff::Error<FeedError>> {
        let start = Instant::now();

        // Cache-busting parameter: the resource list must reflect the
        // latest uploads, not whatever an edge cache last saw.
        let url = format!(
            "{}?t={}",
            self.config.endpoint,
            Utc::now().timestamp_millis()
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            let latency_ms = start.elapsed().as_millis();
            if is_transient_error(&e) {
                warn!(error = %e, latency_ms = latency_ms as u64, "Transient error, will retry");
                backoff::Error::transient(FeedError::Catalog(format!(
                    "Transient error (will retry): {e}"
                )))
            } else {
                warn!(error = %e, latency_ms = latency_ms as u64, "Permanent error, aborting");
                backoff::Error::permanent(FeedError::Catalog(format!(
                    "Catalog request failed: {e}"
                )))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let err = FeedError::Catalog(format!("Catalog endpoint returned status: {status}"));
            return if is_transient_status(status) {
                Err(backoff::Error::transient(err))
            } else {
                Err(backoff::Error::permanent(err))
            };
        }

        let list: ResourceList = response.json().await.map_err(|e| {
            backoff::Error::permanent(FeedError::Catalog(format!(
                "Failed to parse resource list: {e}"
            )))
        })?;

        let latency_ms = start.elapsed().as_millis();
        debug!(
            resources = list.resources.len(),
            latency_ms = latency_ms as u64,
            "Fetched resource list"
        );

        Ok(list.resources.into_iter().map(map_resource).collect())
    }
}

/// Map a hosting-service resource to a catalog item.
///
/// Portrait assets (taller than wide) are shorts; everything else plays
/// long-form. Missing captions fall back to the asset id so every item
/// stays searchable.
fn map_resource(res: Resource) -> MediaItem {
    let kind = if res.height > res.width {
        MediaKind::Short
    } else {
        MediaKind::Long
    };

    MediaItem {
        kind,
        title: res.title.unwrap_or_else(|| res.id.clone()),
        category: res.category.unwrap_or_else(|| "uncategorized".to_string()),
        id: res.id,
        media_url: res.media_url,
        poster_url: res.poster_url,
        tags: res.tags,
        created_at: res.created_at,
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    #[instrument(level = "info", skip(self), fields(endpoint = %self.config.endpoint))]
    async fn fetch_catalog(&self) -> Result<Vec<MediaItem>> {
        let backoff = ExponentialBackoff {
            initial_interval: INITIAL_INTERVAL,
            max_interval: MAX_INTERVAL,
            max_elapsed_time: Some(self.config.timeout * self.config.max_retries),
            ..Default::default()
        };

        retry_notify(
            backoff,
            || async { self.fetch_once().await },
            |err: FeedError, duration: Duration| {
                warn!(
                    error = %err,
                    retry_after_ms = duration.as_millis() as u64,
                    "Retry scheduled"
                );
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(id: &str, width: u32, height: u32) -> Resource {
        Resource {
            id: id.to_string(),
            media_url: format!("https://media.example/{id}.mp4"),
            poster_url: None,
            width,
            height,
            title: None,
            category: None,
            tags: Vec::new(),
            created_at: None,
        }
    }

    #[test]
    fn test_portrait_maps_to_short() {
        let item = map_resource(resource("a", 720, 1280));
        assert_eq!(item.kind, MediaKind::Short);
    }

    #[test]
    fn test_landscape_maps_to_long() {
        let item = map_resource(resource("b", 1920, 1080));
        assert_eq!(item.kind, MediaKind::Long);
        // Square assets play long-form too.
        let item = map_resource(resource("c", 0, 0));
        assert_eq!(item.kind, MediaKind::Long);
    }

    #[test]
    fn test_missing_captions_default() {
        let item = map_resource(resource("clip", 720, 1280));
        assert_eq!(item.title, "clip");
        assert_eq!(item.category, "uncategorized");
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        assert!(HttpCatalogSource::new("not a url").is_err());
    }

    #[test]
    fn test_resource_list_tolerates_missing_fields() {
        let list: ResourceList = serde_json::from_str(
            r#"{"resources":[{"id":"x","media_url":"https://m/x.mp4","height":1280,"width":720}]}"#,
        )
        .unwrap();
        assert_eq!(list.resources.len(), 1);

        let empty: ResourceList = serde_json::from_str("{}").unwrap();
        assert!(empty.resources.is_empty());
    }
}
