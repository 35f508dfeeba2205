//! Classify a freshly fetched item list against the snapshot.

use crate::model::{Comment, ItemKind, TrackedItem};
use crate::recency;
use crate::snapshot::{Snapshot, SnapshotEntry};
use crate::source::SourceError;
use serde::Serialize;
use std::collections::btree_map::Entry;

/// One observed difference between a fresh fetch and the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// An id the snapshot had never seen before.
    NewItem { item: TrackedItem },
    /// A known item whose status label moved.
    StatusChanged {
        item: TrackedItem,
        old_status: String,
        new_status: String,
    },
    /// A known item grew a comment newer than the cached date.
    NewComment { item: TrackedItem, comment: Comment },
}

impl ChangeEvent {
    /// The item this event refers to.
    #[must_use]
    pub const fn item(&self) -> &TrackedItem {
        match self {
            Self::NewItem { item }
            | Self::StatusChanged { item, .. }
            | Self::NewComment { item, .. } => item,
        }
    }

    #[must_use]
    pub const fn is_new_item(&self) -> bool {
        matches!(self, Self::NewItem { .. })
    }
}

/// Compare `current` against the snapshot's `kind` map, in input order.
///
/// Updates snapshot entries in place and returns the classified events.
/// Every current item costs one `fetch_comments` round trip; that is the
/// only way to catch comment-only updates. Items without an id are skipped.
///
/// Per item: an unseen id yields exactly one [`ChangeEvent::NewItem`] and a
/// snapshot entry seeded with its current status and newest comment date,
/// so the backlog of old comments is never replayed on the next cycle. A
/// known id yields up to two events, status change first, then new
/// comment. A status change only counts when both the cached and the
/// current label are non-empty; losing or gaining a label is a data gap,
/// not a transition.
///
/// # Errors
///
/// Any `fetch_comments` failure aborts the whole diff. Entries touched
/// before the failure stay modified in memory; callers are expected to
/// drop the snapshot without saving on error.
pub fn diff_items(
    current: &[TrackedItem],
    kind: ItemKind,
    snapshot: &mut Snapshot,
    mut fetch_comments: impl FnMut(&str) -> Result<Vec<Comment>, SourceError>,
) -> Result<Vec<ChangeEvent>, SourceError> {
    let mut events = Vec::new();

    for item in current {
        if item.id.is_empty() {
            tracing::debug!(kind = %kind, number = %item.number, "skipping item without an id");
            continue;
        }

        let comments = fetch_comments(&item.id)?;
        let newest = recency::latest(&comments).filter(|comment| !comment.created_at.is_empty());

        match snapshot.entries_mut(kind).entry(item.id.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(SnapshotEntry {
                    last_status: item.status.clone(),
                    last_comment_date: newest.map(|comment| comment.created_at.clone()),
                });
                events.push(ChangeEvent::NewItem { item: item.clone() });
            }
            Entry::Occupied(mut slot) => {
                let entry = slot.get_mut();

                if item.status != entry.last_status
                    && !item.status.is_empty()
                    && !entry.last_status.is_empty()
                {
                    let old_status =
                        std::mem::replace(&mut entry.last_status, item.status.clone());
                    events.push(ChangeEvent::StatusChanged {
                        item: item.clone(),
                        old_status,
                        new_status: item.status.clone(),
                    });
                }

                if let Some(comment) = newest
                    && recency::newer_than(&comment.created_at, entry.last_comment_date.as_deref())
                {
                    entry.last_comment_date = Some(comment.created_at.clone());
                    events.push(ChangeEvent::NewComment {
                        item: item.clone(),
                        comment: comment.clone(),
                    });
                }
            }
        }
    }

    Ok(events)
}
