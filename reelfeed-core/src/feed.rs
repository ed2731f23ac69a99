//! Feed assembly: merging an external ranking with the catalog.
//!
//! The output is always a total ordering over the catalog (no duplicates,
//! no omissions) whatever the ranking service did. A failed or malformed
//! ranking degrades to original catalog order through the same path as an
//! empty one.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::catalog::MediaItem;
use crate::interactions::InteractionState;
use crate::ranking::{RankOutcome, RankingService};

/// Merges ranking output with the catalog into one deduplicated ordering.
pub struct FeedAssembler {
    ranking: Option<Arc<dyn RankingService>>,
}

impl FeedAssembler {
    pub fn new(ranking: Option<Arc<dyn RankingService>>) -> Self {
        Self { ranking }
    }

    /// Order the catalog by the external ranking, appending everything the
    /// ranking did not mention in original catalog order.
    ///
    /// The ranking call fully resolves (success or failure) before the
    /// merge runs; the merge never sees a partial result. Ranked ids are
    /// resolved by `id` or `media_url`, first match wins, unknown ids are
    /// dropped silently. The final pass deduplicates by `id`, keeping the
    /// first occurrence, which also absorbs duplicate ids in a corrupt
    /// catalog snapshot.
    pub async fn assemble(
        &self,
        catalog: &[MediaItem],
        interactions: &InteractionState,
    ) -> Vec<MediaItem> {
        let outcome =
            RankOutcome::request(self.ranking.as_deref(), catalog, interactions).await;
        let ranked_ids = outcome.into_ids();

        let mut out: Vec<MediaItem> = Vec::with_capacity(catalog.len());
        for key in &ranked_ids {
            if let Some(item) = catalog.iter().find(|it| it.matches_key(key)) {
                out.push(item.clone());
            }
        }

        let matched = out.len();
        for item in catalog {
            if !ranked_ids.iter().any(|key| key == &item.id) {
                out.push(item.clone());
            }
        }

        let mut seen_ids = HashSet::with_capacity(out.len());
        out.retain(|it| seen_ids.insert(it.id.clone()));

        debug!(
            catalog = catalog.len(),
            ranked = ranked_ids.len(),
            matched,
            assembled = out.len(),
            "Assembled feed"
        );
        out
    }
}
