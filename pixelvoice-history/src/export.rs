//! Export of the displayed version to a downloadable file.
//!
//! File names embed the entry's creation timestamp, so exporting different
//! versions of one history never overwrites an earlier export.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::{EditHistory, HistoryEntry};

/// Prefix used for exported files unless configured otherwise.
pub const DEFAULT_EXPORT_PREFIX: &str = "pixelvoice-edit";

/// Naming convention for exported images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportNaming {
    pub prefix: String,
    pub separator: String,
    pub lowercase: bool,
}

impl Default for ExportNaming {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_EXPORT_PREFIX.into(),
            separator: "-".into(),
            lowercase: true,
        }
    }
}

impl ExportNaming {
    /// `<prefix><sep><created_at>.<ext>`, extension taken from the image MIME type.
    pub fn file_name(&self, entry: &HistoryEntry) -> String {
        let mut parts = Vec::new();

        if !self.prefix.is_empty() {
            parts.push(self.prefix.clone());
        }
        parts.push(entry.created_at.to_string());

        let mut name = parts.join(&self.separator);

        if self.lowercase {
            name = name.to_lowercase();
        }

        format!("{}.{}", name, entry.image.extension())
    }

    pub fn output_path(&self, base_dir: impl AsRef<Path>, entry: &HistoryEntry) -> PathBuf {
        base_dir.as_ref().join(self.file_name(entry))
    }

    /// Check for characters that cannot appear in a file name.
    pub fn validate(&self) -> Result<(), ExportError> {
        let invalid_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
        for ch in invalid_chars {
            if self.prefix.contains(ch) || self.separator.contains(ch) {
                tracing::error!(
                    prefix = %self.prefix,
                    separator = %self.separator,
                    invalid_char = %ch,
                    "export naming contains invalid filename character"
                );
                return Err(ExportError::InvalidNaming {
                    reason: format!("contains invalid character '{}'", ch),
                });
            }
        }

        if self.separator.len() > 5 {
            tracing::warn!(
                separator = %self.separator,
                "unusually long separator (recommended: 1-2 chars)"
            );
        }

        Ok(())
    }
}

/// Export configuration errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid export naming: {reason}")]
    InvalidNaming { reason: String },
}

/// Write the currently displayed version into `base_dir` and return its path.
/// The bytes are written exactly as stored in the history entry.
pub fn export_current(
    base_dir: impl AsRef<Path>,
    history: &EditHistory,
    naming: &ExportNaming,
) -> anyhow::Result<PathBuf> {
    naming.validate()?;

    let base_dir = base_dir.as_ref();
    fs::create_dir_all(base_dir)
        .with_context(|| format!("create export dir: {}", base_dir.display()))?;

    let entry = history.current();
    let path = naming.output_path(base_dir, entry);
    fs::write(&path, &entry.image.bytes)
        .with_context(|| format!("write exported image: {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        entry_id = %entry.id,
        bytes = entry.image.len(),
        "exported current version"
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelvoice_core::ImageData;

    #[test]
    fn test_default_file_name() {
        let history = EditHistory::new(ImageData::new("image/png", vec![1]));
        let entry = history.current();
        let name = ExportNaming::default().file_name(entry);
        assert_eq!(name, format!("pixelvoice-edit-{}.png", entry.created_at));
    }

    #[test]
    fn test_extension_follows_mime() {
        let history = EditHistory::new(ImageData::new("image/jpeg", vec![1]));
        let name = ExportNaming::default().file_name(history.current());
        assert!(name.ends_with(".jpg"));
    }

    #[test]
    fn test_versions_get_distinct_names() {
        let mut history = EditHistory::new(ImageData::new("image/png", vec![0]));
        history.commit(ImageData::new("image/png", vec![1]), "thêm mũ");
        let naming = ExportNaming::default();
        let a = naming.file_name(&history.entries()[0]);
        let b = naming.file_name(&history.entries()[1]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalid_prefix_rejected() {
        let naming = ExportNaming {
            prefix: "bad/prefix".into(),
            ..Default::default()
        };
        assert!(matches!(
            naming.validate(),
            Err(ExportError::InvalidNaming { .. })
        ));
    }

    #[test]
    fn test_empty_prefix() {
        let history = EditHistory::new(ImageData::new("image/webp", vec![1]));
        let naming = ExportNaming {
            prefix: String::new(),
            ..Default::default()
        };
        let entry = history.current();
        assert_eq!(naming.file_name(entry), format!("{}.webp", entry.created_at));
    }
}
