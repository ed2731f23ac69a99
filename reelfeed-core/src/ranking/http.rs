//! HTTP ranking client.
//!
//! Posts a compact view of the catalog and the user's affinity signals to
//! an external ranking endpoint and expects a JSON array of item ids in
//! return. The response is untrusted end to end: anything that is not an
//! array of strings is an error, and the caller's fallback handles it.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::RankingService;
use crate::catalog::MediaItem;
use crate::error::{FeedError, Result};
use crate::interactions::InteractionState;
use crate::net::build_client;

/// Default timeout for ranking requests. Rankings are advisory, so this
/// is kept short; a slow ranker degrades to catalog order.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-item context sent to the ranker.
#[derive(Debug, Serialize)]
struct RankContextItem<'a> {
    id: &'a str,
    title: &'a str,
    category: &'a str,
}

/// Ranking request payload.
#[derive(Debug, Serialize)]
struct RankRequest<'a> {
    items: Vec<RankContextItem<'a>>,
    liked_titles: Vec<&'a str>,
    favorite_categories: Vec<&'a str>,
}

/// Configuration for the HTTP ranking client.
#[derive(Debug, Clone)]
pub struct HttpRankingConfig {
    /// Ranking endpoint URL.
    pub endpoint: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl HttpRankingConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Ranking service client. No retries: a ranking is only useful for the
/// refresh that asked for it, and the merge degrades gracefully without it.
pub struct HttpRankingService {
    client: Client,
    config: HttpRankingConfig,
}

impl HttpRankingService {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::with_config(HttpRankingConfig::new(endpoint))
    }

    #[instrument(level = "debug", skip_all, fields(endpoint = %config.endpoint))]
    pub fn with_config(config: HttpRankingConfig) -> Result<Self> {
        url::Url::parse(&config.endpoint)
            .map_err(|e| FeedError::Config(format!("Invalid ranking endpoint: {e}")))?;
        let client = build_client(config.timeout)?;
        Ok(Self { client, config })
    }
}

/// Build the request payload from the catalog and affinity signals.
///
/// Favorite categories are the distinct categories of liked items, in
/// first-liked order.
fn build_request<'a>(
    catalog: &'a [MediaItem],
    interactions: &'a InteractionState,
) -> RankRequest<'a> {
    let liked: Vec<&MediaItem> = catalog
        .iter()
        .filter(|it| interactions.liked_ids.iter().any(|id| it.matches_key(id)))
        .collect();

    let mut favorite_categories: Vec<&str> = Vec::new();
    for item in &liked {
        if !favorite_categories.contains(&item.category.as_str()) {
            favorite_categories.push(&item.category);
        }
    }

    RankRequest {
        items: catalog
            .iter()
            .map(|it| RankContextItem {
                id: &it.id,
                title: &it.title,
                category: &it.category,
            })
            .collect(),
        liked_titles: liked.iter().map(|it| it.title.as_str()).collect(),
        favorite_categories,
    }
}

/// Parse the untrusted response body into an id sequence.
///
/// Non-array responses are an error; non-string elements inside an array
/// are dropped, they could only ever resolve as unknown ids.
fn parse_response(value: serde_json::Value) -> Result<Vec<String>> {
    match value {
        serde_json::Value::Array(entries) => Ok(entries
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect()),
        other => Err(FeedError::Ranking(format!(
            "Expected a JSON array of ids, got {other}"
        ))),
    }
}

#[async_trait]
impl RankingService for HttpRankingService {
    #[instrument(level = "info", skip_all, fields(endpoint = %self.config.endpoint, items = catalog.len()))]
    async fn rank(
        &self,
        catalog: &[MediaItem],
        interactions: &InteractionState,
    ) -> Result<Vec<String>> {
        let start = Instant::now();
        let request = build_request(catalog, interactions);

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Ranking request failed");
                FeedError::Ranking(format!("Ranking request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Ranking(format!(
                "Ranking endpoint returned status: {status}"
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| FeedError::Ranking(format!("Failed to parse ranking response: {e}")))?;

        let ids = parse_response(body)?;
        debug!(
            ranked = ids.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Ranking received"
        );
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{media_item, MediaKind};

    #[test]
    fn test_parse_array_of_strings() {
        let ids = parse_response(serde_json::json!(["a", "b"])).unwrap();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_parse_drops_non_string_elements() {
        let ids = parse_response(serde_json::json!(["a", 7, null, "b"])).unwrap();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(parse_response(serde_json::json!({"ids": ["a"]})).is_err());
        assert!(parse_response(serde_json::json!("a")).is_err());
    }

    #[test]
    fn test_request_context_from_likes() {
        let mut a = media_item("a", MediaKind::Short);
        a.category = "nature".into();
        let mut b = media_item("b", MediaKind::Short);
        b.category = "nature".into();
        let c = media_item("c", MediaKind::Long);
        let catalog = vec![a, b, c];

        let mut interactions = InteractionState::default();
        interactions.liked_ids = vec!["a".into(), "b".into()];

        let request = build_request(&catalog, &interactions);
        assert_eq!(request.items.len(), 3);
        assert_eq!(request.liked_titles, vec!["Clip a", "Clip b"]);
        // Duplicate categories collapse, order of first like wins.
        assert_eq!(request.favorite_categories, vec!["nature"]);
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        assert!(HttpRankingService::new("nope").is_err());
    }
}
