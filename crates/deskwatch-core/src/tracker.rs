//! One poll cycle end to end: fetch, diff, persist, report.

use crate::diff::{self, ChangeEvent};
use crate::model::{ItemKind, TrackedItem};
use crate::recency;
use crate::snapshot::{SnapshotEntry, SnapshotStore};
use crate::source::Source;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything one poll cycle found, split the way callers report it.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityReport {
    pub new_incidents: Vec<TrackedItem>,
    pub updated_incidents: Vec<ChangeEvent>,
    pub new_changes: Vec<TrackedItem>,
    pub updated_changes: Vec<ChangeEvent>,
}

impl ActivityReport {
    /// Total number of reported findings across all four lists.
    #[must_use]
    pub fn total(&self) -> usize {
        self.new_incidents.len()
            + self.updated_incidents.len()
            + self.new_changes.len()
            + self.updated_changes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// One summary row: full detail when the re-fetch worked, cached scraps
/// when it did not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SummaryEntry {
    Detailed(TrackedItem),
    Degraded {
        id: String,
        status: String,
        error: String,
    },
}

impl SummaryEntry {
    /// Modification date used for recency sorting; degraded rows have none
    /// and therefore sort last.
    fn modified_at(&self) -> Option<&str> {
        match self {
            Self::Detailed(item) => item.modified_at.as_deref(),
            Self::Degraded { .. } => None,
        }
    }
}

/// Summary of every item the snapshot has ever tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryReport {
    pub incidents: Vec<SummaryEntry>,
    pub changes: Vec<SummaryEntry>,
    pub last_check: Option<String>,
}

/// Drives poll cycles against one source and one snapshot store.
pub struct ActivityTracker<S> {
    source: S,
    store: SnapshotStore,
}

impl<S: Source> ActivityTracker<S> {
    pub const fn new(source: S, store: SnapshotStore) -> Self {
        Self { source, store }
    }

    /// Run one poll cycle and persist what it learned.
    ///
    /// Fetches both assigned lists, diffs them against the snapshot, then
    /// advances `last_check` and saves, in that order. `last_check` moves
    /// even when nothing fired. Any source failure propagates before the
    /// save, so the on-disk snapshot never reflects a half-finished cycle.
    ///
    /// # Errors
    ///
    /// Source failures and snapshot write failures.
    pub fn check_for_updates(&self) -> Result<ActivityReport> {
        let mut snapshot = self.store.load();

        let incidents = self
            .source
            .list_my_incidents()
            .context("failed to list assigned incidents")?;
        let changes = self
            .source
            .list_my_changes()
            .context("failed to list assigned changes")?;

        let incident_events =
            diff::diff_items(&incidents, ItemKind::Incident, &mut snapshot, |id| {
                self.source.fetch_comments(id, ItemKind::Incident)
            })
            .context("failed to diff incidents")?;
        let change_events = diff::diff_items(&changes, ItemKind::Change, &mut snapshot, |id| {
            self.source.fetch_comments(id, ItemKind::Change)
        })
        .context("failed to diff changes")?;

        snapshot.last_check = Some(chrono::Utc::now().to_rfc3339());
        self.store
            .save(&snapshot)
            .context("failed to persist snapshot")?;

        let mut report = ActivityReport::default();
        partition(
            incident_events,
            &mut report.new_incidents,
            &mut report.updated_incidents,
        );
        partition(
            change_events,
            &mut report.new_changes,
            &mut report.updated_changes,
        );

        tracing::info!(
            new_incidents = report.new_incidents.len(),
            updated_incidents = report.updated_incidents.len(),
            new_changes = report.new_changes.len(),
            updated_changes = report.updated_changes.len(),
            "poll cycle complete"
        );

        Ok(report)
    }

    /// Re-fetch current details for everything the snapshot tracks.
    ///
    /// A per-id fetch failure degrades that one row to the cached status
    /// instead of aborting, so one deleted or unreachable item cannot hide
    /// the rest. Rows sort most recently modified first; rows without a
    /// modification date go last. Nothing is written back.
    #[must_use]
    pub fn summary_report(&self) -> SummaryReport {
        let snapshot = self.store.load();

        let incidents = self.summarize(ItemKind::Incident, snapshot.entries(ItemKind::Incident));
        let changes = self.summarize(ItemKind::Change, snapshot.entries(ItemKind::Change));

        SummaryReport {
            incidents,
            changes,
            last_check: snapshot.last_check,
        }
    }

    fn summarize(
        &self,
        kind: ItemKind,
        entries: &BTreeMap<String, SnapshotEntry>,
    ) -> Vec<SummaryEntry> {
        let mut rows: Vec<SummaryEntry> = entries
            .iter()
            .map(|(id, entry)| match self.source.fetch_details(id, kind) {
                Ok(details) => SummaryEntry::Detailed(details),
                Err(err) => {
                    tracing::warn!(%id, kind = %kind, %err, "detail fetch failed, degrading row");
                    SummaryEntry::Degraded {
                        id: id.clone(),
                        status: entry.last_status.clone(),
                        error: "could not retrieve complete details".to_string(),
                    }
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            recency::compare_dates(
                b.modified_at().unwrap_or(""),
                a.modified_at().unwrap_or(""),
            )
        });
        rows
    }
}

fn partition(
    events: Vec<ChangeEvent>,
    new_items: &mut Vec<TrackedItem>,
    updates: &mut Vec<ChangeEvent>,
) {
    for event in events {
        match event {
            ChangeEvent::NewItem { item } => new_items.push(item),
            other => updates.push(other),
        }
    }
}
