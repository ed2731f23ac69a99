//! External relevance ranking.
//!
//! The ranking service is best-effort and untrusted: it may time out,
//! return ids the catalog has never heard of, or return garbage. Nothing
//! downstream may depend on it succeeding: a failed or malformed ranking
//! collapses to [`RankOutcome::Unavailable`], which orders the feed
//! exactly like an empty ranking would.

mod http;
mod mock;

pub use http::{HttpRankingConfig, HttpRankingService};
pub use mock::MockRanking;

use async_trait::async_trait;
use tracing::warn;

use crate::catalog::MediaItem;
use crate::error::Result;
use crate::interactions::InteractionState;

/// An externally computed relevance ordering over catalog item ids.
#[async_trait]
pub trait RankingService: Send + Sync {
    /// Rank the catalog for this user. The returned ids may be partial,
    /// may repeat, and may reference unknown items; callers must treat
    /// the sequence as advisory.
    async fn rank(
        &self,
        catalog: &[MediaItem],
        interactions: &InteractionState,
    ) -> Result<Vec<String>>;
}

/// Outcome of one ranking request.
///
/// `Unavailable` and `Ranked(vec![])` are deliberately indistinguishable
/// to consumers: both degrade the feed to catalog order through the same
/// code path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankOutcome {
    Ranked(Vec<String>),
    Unavailable,
}

impl RankOutcome {
    /// Ask the service for an ordering, collapsing any error into
    /// `Unavailable`. A `None` service is a client configured without
    /// ranking and behaves the same way.
    pub async fn request(
        service: Option<&dyn RankingService>,
        catalog: &[MediaItem],
        interactions: &InteractionState,
    ) -> Self {
        let Some(service) = service else {
            return Self::Unavailable;
        };
        match service.rank(catalog, interactions).await {
            Ok(ids) => Self::Ranked(ids),
            Err(e) => {
                warn!(error = %e, "Ranking unavailable, feed keeps catalog order");
                Self::Unavailable
            }
        }
    }

    /// The ranked ids, empty when unavailable.
    pub fn into_ids(self) -> Vec<String> {
        match self {
            Self::Ranked(ids) => ids,
            Self::Unavailable => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_service_is_unavailable() {
        let outcome = RankOutcome::request(None, &[], &InteractionState::default()).await;
        assert_eq!(outcome, RankOutcome::Unavailable);
        assert!(outcome.into_ids().is_empty());
    }

    #[tokio::test]
    async fn test_failing_service_collapses_to_unavailable() {
        let svc = MockRanking::failing();
        let outcome =
            RankOutcome::request(Some(&svc), &[], &InteractionState::default()).await;
        assert_eq!(outcome, RankOutcome::Unavailable);
    }

    #[tokio::test]
    async fn test_ranked_ids_pass_through() {
        let svc = MockRanking::new(vec!["b".into(), "a".into()]);
        let outcome =
            RankOutcome::request(Some(&svc), &[], &InteractionState::default()).await;
        assert_eq!(outcome.into_ids(), vec!["b".to_string(), "a".to_string()]);
    }
}
