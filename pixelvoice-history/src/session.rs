//! Save/load of an edit history as JSON.
//!
//! A snapshot stores every version (images inline as base64) and the cursor,
//! so a session can be resumed exactly where it was left. Loading validates
//! the history invariants before handing back an `EditHistory`.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::{EditHistory, HistoryEntry, HistoryError, HISTORY_SCHEMA_VERSION};

/// On-disk form of an `EditHistory` (v1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshotV1 {
    pub schema_version: String,
    pub entries: Vec<HistoryEntry>,
    pub cursor: usize,
}

// Borrowing twin of `HistorySnapshotV1` so saving does not clone every image.
#[derive(Serialize)]
struct HistorySnapshotRef<'a> {
    schema_version: &'a str,
    entries: &'a [HistoryEntry],
    cursor: usize,
}

impl EditHistory {
    pub fn to_snapshot(&self) -> HistorySnapshotV1 {
        HistorySnapshotV1 {
            schema_version: HISTORY_SCHEMA_VERSION.to_string(),
            entries: self.entries().to_vec(),
            cursor: self.cursor(),
        }
    }
}

impl TryFrom<HistorySnapshotV1> for EditHistory {
    type Error = HistoryError;

    fn try_from(snapshot: HistorySnapshotV1) -> Result<Self, Self::Error> {
        if snapshot.schema_version != HISTORY_SCHEMA_VERSION {
            return Err(HistoryError::UnsupportedSchema {
                found: snapshot.schema_version,
            });
        }
        EditHistory::from_parts(snapshot.entries, snapshot.cursor)
    }
}

/// Save a history to disk as pretty JSON.
pub fn save_history(path: impl AsRef<Path>, history: &EditHistory) -> anyhow::Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create parent dir: {}", parent.display()))?;
    }

    let snapshot = HistorySnapshotRef {
        schema_version: HISTORY_SCHEMA_VERSION,
        entries: history.entries(),
        cursor: history.cursor(),
    };
    let json = serde_json::to_string_pretty(&snapshot).context("serialize history to json")?;
    fs::write(path, json).with_context(|| format!("write history file: {}", path.display()))?;

    tracing::debug!(
        path = %path.display(),
        entries = history.len(),
        cursor = history.cursor(),
        "saved history snapshot"
    );
    Ok(())
}

/// Load a history from disk, rejecting snapshots that break the invariants.
pub fn load_history(path: impl AsRef<Path>) -> anyhow::Result<EditHistory> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .with_context(|| format!("read history file: {}", path.display()))?;
    let snapshot: HistorySnapshotV1 =
        serde_json::from_str(&data).context("parse history json")?;
    let history = EditHistory::try_from(snapshot)
        .with_context(|| format!("validate history file: {}", path.display()))?;
    Ok(history)
}
