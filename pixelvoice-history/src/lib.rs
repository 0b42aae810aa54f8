//! pixelvoice-history: the branching edit history behind PixelVoice.
//!
//! Design rules:
//! - One history per uploaded image; a new upload replaces it outright.
//! - Index 0 is always the original upload.
//! - Entries are immutable. They are only appended, and only removed when a
//!   commit branches off from a past version (branch-discard).
//! - Undo/redo/jump move the cursor; nothing is recomputed.

use pixelvoice_core::ImageData;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Label given to the first entry of every history.
pub const ORIGINAL_LABEL: &str = "original";

/// Snapshot schema version for forward compatibility.
pub const HISTORY_SCHEMA_VERSION: &str = "1.0";

/// One immutable version of the picture plus the command that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub image: ImageData,
    /// Command text, or `ORIGINAL_LABEL` for the upload.
    pub label: String,
    /// Milliseconds since the UNIX epoch. Strictly increasing within a history.
    pub created_at: i64,
}

impl HistoryEntry {
    pub(crate) fn new(image: ImageData, label: String, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            image,
            label,
            created_at,
        }
    }
}

/// Errors related to history navigation and snapshot validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("history index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("history snapshot has no entries")]
    EmptySnapshot,

    #[error("history snapshot cursor {cursor} out of range (len {len})")]
    CursorOutOfRange { cursor: usize, len: usize },

    #[error("unsupported history schema version: {found}")]
    UnsupportedSchema { found: String },

    #[error("history snapshot starts with `{label}` instead of the original upload")]
    MissingOriginal { label: String },

    #[error("history entry {index} is not newer than the entry before it")]
    TimestampNotIncreasing { index: usize },

    #[error("history entry id {id} appears more than once")]
    DuplicateEntryId { id: Uuid },
}

pub mod export;
pub mod history;
pub mod session;

pub use export::{ExportError, ExportNaming, DEFAULT_EXPORT_PREFIX};
pub use history::EditHistory;
pub use session::{load_history, save_history, HistorySnapshotV1};
