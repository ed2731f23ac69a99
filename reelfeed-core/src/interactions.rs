//! Per-user interaction state and its owning store.
//!
//! The store is the only writer of [`InteractionState`]. Every mutation is
//! followed by a full-state write to the [`KvStore`], so no buffered change
//! can be lost to a crash. Loading never fails: an absent or corrupt
//! persisted state comes back as the empty default.
//!
//! Invariants maintained here:
//! - an id is never liked and disliked at the same time
//! - recorded watch progress never decreases for a given id
//! - set membership is idempotent

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::persist::{KvStore, INTERACTIONS_KEY};

/// Watch progress for one item, in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchEntry {
    pub id: String,
    pub progress: f64,
}

/// The persisted record of user affinity.
///
/// Field names keep the camelCase wire form the persisted key has always
/// used, so an existing on-device state survives the rewrite of the
/// client around it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InteractionState {
    pub liked_ids: Vec<String>,
    pub disliked_ids: Vec<String>,
    pub saved_ids: Vec<String>,
    pub watch_history: Vec<WatchEntry>,
}

impl InteractionState {
    pub fn is_liked(&self, id: &str) -> bool {
        self.liked_ids.iter().any(|x| x == id)
    }

    pub fn is_disliked(&self, id: &str) -> bool {
        self.disliked_ids.iter().any(|x| x == id)
    }

    pub fn is_saved(&self, id: &str) -> bool {
        self.saved_ids.iter().any(|x| x == id)
    }

    /// Recorded progress for an exact history key, if any.
    pub fn progress_for(&self, id: &str) -> Option<f64> {
        self.watch_history
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.progress)
    }
}

/// Owner of the interaction state and its persistence.
pub struct InteractionStore {
    state: InteractionState,
    store: Arc<KvStore>,
}

impl InteractionStore {
    /// Load the persisted state, defaulting to empty. Never fails and
    /// never blocks startup on bad data.
    pub async fn load(store: Arc<KvStore>) -> Self {
        let state: InteractionState = store.get_json(INTERACTIONS_KEY).await;
        debug!(
            liked = state.liked_ids.len(),
            disliked = state.disliked_ids.len(),
            saved = state.saved_ids.len(),
            watched = state.watch_history.len(),
            "Loaded interaction state"
        );
        Self { state, store }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Like an id, or un-like it if already liked. Liking removes the id
    /// from the disliked set. Returns the new liked state so the caller
    /// can acknowledge the transition.
    pub async fn toggle_like(&mut self, id: &str) -> Result<bool> {
        let liked = if self.state.is_liked(id) {
            self.state.liked_ids.retain(|x| x != id);
            false
        } else {
            self.state.liked_ids.push(id.to_string());
            self.state.disliked_ids.retain(|x| x != id);
            true
        };
        self.persist().await?;
        Ok(liked)
    }

    /// Hide an id from general sections. Removes any like; idempotent.
    /// Invalidating active playback of the item is the caller's business.
    pub async fn dislike(&mut self, id: &str) -> Result<()> {
        if !self.state.is_disliked(id) {
            self.state.disliked_ids.push(id.to_string());
        }
        self.state.liked_ids.retain(|x| x != id);
        self.persist().await
    }

    /// Un-hide a previously disliked id.
    pub async fn restore(&mut self, id: &str) -> Result<()> {
        self.state.disliked_ids.retain(|x| x != id);
        self.persist().await
    }

    /// Idempotently add an id to the saved set.
    pub async fn save(&mut self, id: &str) -> Result<()> {
        if !self.state.is_saved(id) {
            self.state.saved_ids.push(id.to_string());
        }
        self.persist().await
    }

    /// Remove an id from the saved set; idempotent.
    pub async fn unsave(&mut self, id: &str) -> Result<()> {
        self.state.saved_ids.retain(|x| x != id);
        self.persist().await
    }

    /// Record watch progress, clamped to `[0, 1]`. Progress for an id only
    /// ever moves forward; a smaller value leaves the entry untouched.
    pub async fn record_progress(&mut self, id: &str, progress: f64) -> Result<()> {
        let progress = progress.clamp(0.0, 1.0);
        match self.state.watch_history.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                if progress > entry.progress {
                    entry.progress = progress;
                }
            }
            None => self.state.watch_history.push(WatchEntry {
                id: id.to_string(),
                progress,
            }),
        }
        self.persist().await
    }

    async fn persist(&self) -> Result<()> {
        self.store.put_json(INTERACTIONS_KEY, &self.state).await
    }
}

impl std::fmt::Debug for InteractionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionStore")
            .field("liked", &self.state.liked_ids.len())
            .field("disliked", &self.state.disliked_ids.len())
            .field("saved", &self.state.saved_ids.len())
            .field("watched", &self.state.watch_history.len())
            .finish()
    }
}
