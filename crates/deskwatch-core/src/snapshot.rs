//! Durable snapshot of last-observed item state.
//!
//! The snapshot is the tracker's only persistent state: one JSON document
//! holding, per item id, the status and newest comment date seen on the
//! previous cycle. Loading is deliberately infallible so that a damaged
//! document can never wedge the tool; saving is write-temp-then-rename so a
//! crash can never leave a torn document behind.

use crate::model::ItemKind;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Last-observed state for one tracked item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub last_status: String,
    #[serde(default)]
    pub last_comment_date: Option<String>,
}

/// Everything the tracker has observed so far, keyed by item id.
///
/// Entries are created on first sighting and updated in place. Nothing is
/// ever deleted, even when an item drops out of the assigned-to-me view, so
/// a briefly reassigned item does not come back as "new".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub incidents: BTreeMap<String, SnapshotEntry>,
    pub changes: BTreeMap<String, SnapshotEntry>,
    /// When the last poll cycle ran, RFC 3339. `None` until the first one.
    pub last_check: Option<String>,
}

impl Snapshot {
    /// The entry map for one item kind.
    #[must_use]
    pub fn entries(&self, kind: ItemKind) -> &BTreeMap<String, SnapshotEntry> {
        match kind {
            ItemKind::Incident => &self.incidents,
            ItemKind::Change => &self.changes,
        }
    }

    /// Mutable entry map for one item kind.
    pub fn entries_mut(&mut self, kind: ItemKind) -> &mut BTreeMap<String, SnapshotEntry> {
        match kind {
            ItemKind::Incident => &mut self.incidents,
            ItemKind::Change => &mut self.changes,
        }
    }

    /// Number of tracked entries across both kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.incidents.len() + self.changes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Loads and saves the snapshot document at a fixed path.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Where the snapshot document lives.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted snapshot.
    ///
    /// A missing, unreadable, or malformed file yields an empty snapshot.
    /// The next save overwrites whatever was there, so the worst outcome of
    /// a damaged document is one noisy cycle that re-reports known items.
    #[must_use]
    pub fn load(&self) -> Snapshot {
        if !self.path.exists() {
            return Snapshot::default();
        }

        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    %err,
                    "snapshot unreadable, starting fresh"
                );
                return Snapshot::default();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    %err,
                    "snapshot malformed, starting fresh"
                );
                Snapshot::default()
            }
        }
    }

    /// Replace the persisted snapshot atomically.
    ///
    /// # Errors
    ///
    /// Returns an error when the parent directory cannot be created, the
    /// temp file cannot be written, or the rename into place fails.
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(snapshot).context("failed to serialize snapshot")?;

        fs::write(&tmp_path, body)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!(
                "failed to atomically move {} to {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> SnapshotStore {
        SnapshotStore::new(dir.path().join("snapshot.json"))
    }

    fn sample() -> Snapshot {
        let mut incidents = BTreeMap::new();
        incidents.insert(
            "inc-1".to_string(),
            SnapshotEntry {
                last_status: "open".to_string(),
                last_comment_date: Some("2024-01-01T10:00:00+01:00".to_string()),
            },
        );
        let mut changes = BTreeMap::new();
        changes.insert(
            "chg-1".to_string(),
            SnapshotEntry {
                last_status: "planned".to_string(),
                last_comment_date: None,
            },
        );
        Snapshot {
            incidents,
            changes,
            last_check: Some("2024-01-02T08:00:00+01:00".to_string()),
        }
    }

    #[test]
    fn load_missing_file_yields_empty_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let snapshot = store_in(&dir).load();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.last_check, None);
    }

    #[test]
    fn load_corrupt_file_yields_empty_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        fs::write(store.path(), b"{ this is not json").expect("write");
        assert!(store.load().is_empty());
    }

    #[test]
    fn load_wrong_shape_yields_empty_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        fs::write(store.path(), br#"{"incidents": "not a map"}"#).expect("write");
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let snapshot = sample();
        store.save(&snapshot).expect("save");
        assert_eq!(store.load(), snapshot);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::new(dir.path().join("state/nested/snapshot.json"));
        store.save(&Snapshot::default()).expect("save");
        assert!(store.path().exists());
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        store.save(&sample()).expect("save");

        let names: Vec<String> = fs::read_dir(dir.path())
            .expect("read_dir")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["snapshot.json".to_string()]);
    }

    #[test]
    fn save_overwrites_previous_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        store.save(&sample()).expect("first save");
        store.save(&Snapshot::default()).expect("second save");
        assert!(store.load().is_empty());
    }

    #[test]
    fn persisted_field_names_are_stable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        store.save(&sample()).expect("save");

        let raw = fs::read_to_string(store.path()).expect("read");
        assert!(raw.contains("\"incidents\""));
        assert!(raw.contains("\"changes\""));
        assert!(raw.contains("\"last_check\""));
        assert!(raw.contains("\"last_status\""));
        assert!(raw.contains("\"last_comment_date\""));
    }
}
