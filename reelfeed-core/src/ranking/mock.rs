//! Mock ranking service for testing.

use async_trait::async_trait;

use super::RankingService;
use crate::catalog::MediaItem;
use crate::error::{FeedError, Result};
use crate::interactions::InteractionState;

enum Mode {
    /// Return exactly these ids, whatever the catalog looks like.
    Scripted(Vec<String>),
    /// Echo the catalog's ids in reverse, a cheap full permutation.
    Reversing,
    /// Fail every request.
    Failing,
}

/// Ranking service with scripted behavior for tests.
pub struct MockRanking {
    mode: Mode,
}

impl MockRanking {
    pub fn new(order: Vec<String>) -> Self {
        Self {
            mode: Mode::Scripted(order),
        }
    }

    pub fn reversing() -> Self {
        Self {
            mode: Mode::Reversing,
        }
    }

    pub fn failing() -> Self {
        Self { mode: Mode::Failing }
    }
}

#[async_trait]
impl RankingService for MockRanking {
    async fn rank(
        &self,
        catalog: &[MediaItem],
        _interactions: &InteractionState,
    ) -> Result<Vec<String>> {
        match &self.mode {
            Mode::Scripted(order) => Ok(order.clone()),
            Mode::Reversing => Ok(catalog.iter().rev().map(|it| it.id.clone()).collect()),
            Mode::Failing => Err(FeedError::Ranking("mock ranker offline".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{media_item, MediaKind};

    #[tokio::test]
    async fn test_scripted_order() {
        let svc = MockRanking::new(vec!["z".into()]);
        let ids = svc.rank(&[], &InteractionState::default()).await.unwrap();
        assert_eq!(ids, vec!["z".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_script_stays_empty() {
        let catalog = vec![media_item("a", MediaKind::Short)];
        let svc = MockRanking::new(Vec::new());
        let ids = svc
            .rank(&catalog, &InteractionState::default())
            .await
            .unwrap();
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn test_reversing_permutation() {
        let catalog = vec![
            media_item("a", MediaKind::Short),
            media_item("b", MediaKind::Long),
        ];
        let svc = MockRanking::reversing();
        let ids = svc
            .rank(&catalog, &InteractionState::default())
            .await
            .unwrap();
        assert_eq!(ids, vec!["b".to_string(), "a".to_string()]);
    }
}
