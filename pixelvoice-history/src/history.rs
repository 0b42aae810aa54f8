// Undo/redo history for the picture being edited.

use pixelvoice_core::{now_millis, ImageData};
use std::collections::HashSet;
use tracing::{debug, info, trace, warn};

use crate::{HistoryEntry, HistoryError, ORIGINAL_LABEL};

/// Ordered versions of one uploaded image and the cursor to the displayed one.
///
/// Invariants: `entries` is never empty and `cursor < entries.len()`.
/// Both hold by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct EditHistory {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl EditHistory {
    /// Start a history from a freshly uploaded image.
    pub fn new(original: ImageData) -> Self {
        let entry = HistoryEntry::new(original, ORIGINAL_LABEL.to_string(), now_millis());
        info!(
            entry_id = %entry.id,
            mime_type = %entry.image.mime_type,
            bytes = entry.image.len(),
            "starting new edit history"
        );
        Self {
            entries: vec![entry],
            cursor: 0,
        }
    }

    /// Rebuild from stored parts. Rejects anything `new` and `commit` could
    /// not have produced: an empty list, a cursor past the end, a first entry
    /// that is not the original, timestamps that do not strictly increase,
    /// or a repeated entry id.
    pub(crate) fn from_parts(entries: Vec<HistoryEntry>, cursor: usize) -> Result<Self, HistoryError> {
        let first = entries.first().ok_or(HistoryError::EmptySnapshot)?;
        if cursor >= entries.len() {
            return Err(HistoryError::CursorOutOfRange {
                cursor,
                len: entries.len(),
            });
        }
        if first.label != ORIGINAL_LABEL {
            return Err(HistoryError::MissingOriginal {
                label: first.label.clone(),
            });
        }

        let mut ids = HashSet::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if index > 0 && entry.created_at <= entries[index - 1].created_at {
                return Err(HistoryError::TimestampNotIncreasing { index });
            }
            if !ids.insert(entry.id) {
                return Err(HistoryError::DuplicateEntryId { id: entry.id });
            }
        }

        Ok(Self { entries, cursor })
    }

    /// Append the result of an edit made from the current version.
    ///
    /// Everything after the cursor is discarded first, so the undone future
    /// can no longer be redone. The cursor ends on the new entry.
    pub fn commit(&mut self, image: ImageData, label: impl Into<String>) -> &HistoryEntry {
        let label = label.into();

        let discarded = self.entries.len() - self.cursor - 1;
        if discarded > 0 {
            debug!(
                cursor = self.cursor,
                discarded, "branching from past version, dropping redo entries"
            );
            self.entries.truncate(self.cursor + 1);
        }

        let created_at = self.next_timestamp(now_millis());
        let entry = HistoryEntry::new(image, label, created_at);
        info!(
            entry_id = %entry.id,
            label = %entry.label,
            index = self.entries.len(),
            "committed edit"
        );

        self.entries.push(entry);
        self.cursor = self.entries.len() - 1;
        &self.entries[self.cursor]
    }

    // Two commits inside one millisecond would otherwise share a timestamp
    // (and an export file name).
    fn next_timestamp(&self, now: i64) -> i64 {
        match self.entries.last() {
            Some(last) if now <= last.created_at => last.created_at + 1,
            _ => now,
        }
    }

    /// Step back one version. Returns `false` (and does nothing) at the original.
    pub fn undo(&mut self) -> bool {
        if self.cursor == 0 {
            trace!("undo at original, ignoring");
            return false;
        }
        self.cursor -= 1;
        debug!(cursor = self.cursor, len = self.entries.len(), "undo");
        true
    }

    /// Step forward one version. Returns `false` (and does nothing) at the tail.
    pub fn redo(&mut self) -> bool {
        if self.cursor + 1 >= self.entries.len() {
            trace!("redo at latest version, ignoring");
            return false;
        }
        self.cursor += 1;
        debug!(cursor = self.cursor, len = self.entries.len(), "redo");
        true
    }

    /// Random access into the history (e.g. clicking a thumbnail).
    /// Out-of-range indices are rejected and leave the cursor where it was.
    pub fn jump_to(&mut self, index: usize) -> Result<(), HistoryError> {
        if index >= self.entries.len() {
            warn!(index, len = self.entries.len(), "rejected jump outside history");
            return Err(HistoryError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        self.cursor = index;
        debug!(cursor = self.cursor, len = self.entries.len(), "jump");
        Ok(())
    }

    /// The currently displayed version.
    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.cursor]
    }

    pub fn original(&self) -> &HistoryEntry {
        &self.entries[0]
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // Never true; here so `len` has its usual companion.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn img(tag: u8) -> ImageData {
        ImageData::new("image/png", vec![tag])
    }

    #[test]
    fn test_new_history() {
        let h = EditHistory::new(img(0));
        assert_eq!(h.len(), 1);
        assert_eq!(h.cursor(), 0);
        assert_eq!(h.current().id, h.original().id);
        assert_eq!(h.current().label, ORIGINAL_LABEL);
        assert_eq!(h.current().image, img(0));
        assert!(!h.can_undo());
        assert!(!h.can_redo());
    }

    #[test]
    fn test_commit_advances_cursor() {
        let mut h = EditHistory::new(img(0));
        let entry = h.commit(img(1), "làm nền xanh");
        assert_eq!(entry.label, "làm nền xanh");
        assert_eq!(h.len(), 2);
        assert_eq!(h.cursor(), 1);
        assert_eq!(h.current().image, img(1));
    }

    #[test]
    fn test_commit_after_undo_discards_future() {
        let mut h = EditHistory::new(img(0));
        h.commit(img(1), "b");
        h.commit(img(2), "c");
        assert!(h.undo());
        assert!(h.undo());
        h.commit(img(3), "d");

        let labels: Vec<_> = h.entries().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec![ORIGINAL_LABEL, "d"]);
        assert!(!h.redo());
    }

    #[test]
    fn test_undo_redo_bounds() {
        let mut h = EditHistory::new(img(0));
        assert!(!h.undo());
        assert!(!h.redo());
        h.commit(img(1), "b");
        assert!(!h.redo());
        assert!(h.undo());
        assert!(!h.undo());
        assert!(h.redo());
        assert_eq!(h.cursor(), 1);
    }

    #[test]
    fn test_jump_rejects_out_of_range() {
        let mut h = EditHistory::new(img(0));
        h.commit(img(1), "b");
        h.commit(img(2), "c");

        assert!(h.jump_to(0).is_ok());
        assert_eq!(h.cursor(), 0);

        assert_eq!(
            h.jump_to(3),
            Err(HistoryError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(h.cursor(), 0);
    }

    #[test]
    fn test_timestamps_strictly_increase() {
        let mut h = EditHistory::new(img(0));
        for i in 1..20 {
            h.commit(img(i), format!("edit {}", i));
        }
        for pair in h.entries().windows(2) {
            assert!(pair[0].created_at < pair[1].created_at);
        }
    }

    #[test]
    fn test_next_timestamp_bumps_same_millisecond() {
        let h = EditHistory::new(img(0));
        let last = h.current().created_at;
        assert_eq!(h.next_timestamp(last), last + 1);
        assert_eq!(h.next_timestamp(last - 10), last + 1);
        assert_eq!(h.next_timestamp(last + 5), last + 5);
    }

    #[test]
    fn test_from_parts_validates() {
        assert_eq!(
            EditHistory::from_parts(vec![], 0),
            Err(HistoryError::EmptySnapshot)
        );
        let h = EditHistory::new(img(0));
        assert_eq!(
            EditHistory::from_parts(h.entries().to_vec(), 1),
            Err(HistoryError::CursorOutOfRange { cursor: 1, len: 1 })
        );
        assert_eq!(EditHistory::from_parts(h.entries().to_vec(), 0).unwrap(), h);
    }
}
