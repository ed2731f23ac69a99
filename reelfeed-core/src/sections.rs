//! Partitioning the assembled feed into display rails.
//!
//! Rails are carved from two per-kind streams with a cursor each: every
//! rail consumes a fixed-size slice and the cursor never rewinds, so no
//! item appears in two cursor rails within one pass. The continue-watching
//! rail is derived from watch history instead and is allowed to overlap
//! the others; resuming something is a different grouping than
//! discovering it.

use std::collections::HashSet;

use serde::Serialize;

use crate::catalog::{MediaItem, MediaKind};
use crate::interactions::InteractionState;

/// Names of the fixed display rails, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    QuickPicks,
    ContinueWatching,
    FeaturedLongs,
    SecondDose,
    ShortReel,
    LongPreviews,
    FreshFinds,
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::QuickPicks => "quick_picks",
            Self::ContinueWatching => "continue_watching",
            Self::FeaturedLongs => "featured_longs",
            Self::SecondDose => "second_dose",
            Self::ShortReel => "short_reel",
            Self::LongPreviews => "long_previews",
            Self::FreshFinds => "fresh_finds",
        };
        write!(f, "{name}")
    }
}

/// One named, ordered rail of the distribution output.
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub id: SectionId,
    pub items: Vec<MediaItem>,
}

/// A watch-history entry resolved to its item, for resumption UIs.
#[derive(Debug, Clone)]
pub struct ResumeEntry {
    pub item: MediaItem,
    pub progress: f64,
}

struct RailSpec {
    id: SectionId,
    kind: MediaKind,
    len: usize,
    /// Presentation order of the consumed slice; the cursor still moves
    /// forward, so reversal cannot break disjointness.
    reversed: bool,
}

const RAIL_PLAN: &[RailSpec] = &[
    RailSpec {
        id: SectionId::QuickPicks,
        kind: MediaKind::Short,
        len: 4,
        reversed: false,
    },
    RailSpec {
        id: SectionId::FeaturedLongs,
        kind: MediaKind::Long,
        len: 3,
        reversed: false,
    },
    RailSpec {
        id: SectionId::SecondDose,
        kind: MediaKind::Short,
        len: 4,
        reversed: false,
    },
    RailSpec {
        id: SectionId::ShortReel,
        kind: MediaKind::Short,
        len: 8,
        reversed: false,
    },
    RailSpec {
        id: SectionId::LongPreviews,
        kind: MediaKind::Long,
        len: 10,
        reversed: true,
    },
    RailSpec {
        id: SectionId::FreshFinds,
        kind: MediaKind::Short,
        len: 10,
        reversed: true,
    },
];

/// Watch-history window considered resumable: past the first moments,
/// not effectively finished.
const RESUME_MIN_PROGRESS: f64 = 0.05;
const RESUME_MAX_PROGRESS: f64 = 0.95;

/// Partition the assembled feed into display rails.
///
/// Disliked items are excluded from every cursor rail first. Streams are
/// split by kind with relative order preserved; a stream that runs out
/// just yields a short (or omitted) rail. Empty rails never appear in the
/// output.
pub fn distribute(assembled: &[MediaItem], interactions: &InteractionState) -> Vec<Section> {
    let visible: Vec<&MediaItem> = assembled
        .iter()
        .filter(|it| !interactions.disliked_ids.iter().any(|d| it.matches_key(d)))
        .collect();

    let mut shorts = visible.iter().filter(|it| it.kind == MediaKind::Short);
    let mut longs = visible.iter().filter(|it| it.kind == MediaKind::Long);

    let mut rails = Vec::new();
    for spec in RAIL_PLAN {
        let mut items: Vec<MediaItem> = match spec.kind {
            MediaKind::Short => shorts.by_ref().take(spec.len).map(|it| (*it).clone()).collect(),
            MediaKind::Long => longs.by_ref().take(spec.len).map(|it| (*it).clone()).collect(),
        };
        if spec.reversed {
            items.reverse();
        }
        if !items.is_empty() {
            rails.push(Section { id: spec.id, items });
        }
    }

    // Resumption resolves against the full assembled set, not the cursor
    // streams, and may overlap the rails above. Disliked items stay
    // hidden here too; the restore view is their only way back.
    let resumable = continue_watching(assembled, interactions);
    let items: Vec<MediaItem> = resumable
        .into_iter()
        .map(|entry| entry.item)
        .filter(|it| !interactions.disliked_ids.iter().any(|d| it.matches_key(d)))
        .collect();
    if !items.is_empty() {
        let pos = usize::from(rails.first().map(|s| s.id) == Some(SectionId::QuickPicks));
        rails.insert(
            pos,
            Section {
                id: SectionId::ContinueWatching,
                items,
            },
        );
    }

    rails
}

/// Resumable watch-history entries, most recently recorded first,
/// deduplicated by resolved item id.
pub fn continue_watching(items: &[MediaItem], interactions: &InteractionState) -> Vec<ResumeEntry> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for entry in interactions.watch_history.iter().rev() {
        if entry.progress <= RESUME_MIN_PROGRESS || entry.progress >= RESUME_MAX_PROGRESS {
            continue;
        }
        if let Some(item) = items.iter().find(|it| it.matches_key(&entry.id)) {
            if seen.insert(item.id.clone()) {
                out.push(ResumeEntry {
                    item: item.clone(),
                    progress: entry.progress,
                });
            }
        }
    }
    out
}

/// Items the user liked, in the order the likes were recorded.
pub fn liked_items(items: &[MediaItem], interactions: &InteractionState) -> Vec<MediaItem> {
    resolve_ids(items, &interactions.liked_ids)
}

/// Items the user saved, in the order the saves were recorded.
pub fn saved_items(items: &[MediaItem], interactions: &InteractionState) -> Vec<MediaItem> {
    resolve_ids(items, &interactions.saved_ids)
}

/// Disliked items, for the dedicated restore view.
pub fn hidden_items(items: &[MediaItem], interactions: &InteractionState) -> Vec<MediaItem> {
    resolve_ids(items, &interactions.disliked_ids)
}

/// Items in a category, preserving feed order.
pub fn items_in_category(items: &[MediaItem], category: &str) -> Vec<MediaItem> {
    items
        .iter()
        .filter(|it| it.category == category)
        .cloned()
        .collect()
}

fn resolve_ids(items: &[MediaItem], ids: &[String]) -> Vec<MediaItem> {
    ids.iter()
        .filter_map(|id| items.iter().find(|it| it.matches_key(id)))
        .cloned()
        .collect()
}
