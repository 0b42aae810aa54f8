//! pixelvoice-core: shared value types for PixelVoice.
//!
//! - `ImageData` is the opaque picture handle passed between the history,
//!   the AI collaborators and the export path.
//! - `AudioClip` is one finished press-and-hold recording.
//! - Both keep their encoded bytes untouched; nothing here decodes pixels.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod audio;
pub mod image;

pub use audio::{AudioClip, DEFAULT_AUDIO_MIME};
pub use image::{ImageData, DEFAULT_IMAGE_MIME};

/// Errors raised while building value types from untrusted input.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("unsupported media type: {mime_type}")]
    UnsupportedMediaType { mime_type: String },
}

/// Coarse media family, used to check a MIME type before it is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Audio,
}

impl MediaKind {
    fn prefix(self) -> &'static str {
        match self {
            MediaKind::Image => "image/",
            MediaKind::Audio => "audio/",
        }
    }

    /// Reject MIME types from the wrong family (e.g. `audio/webm` passed as an image).
    /// MIME types are case-insensitive.
    pub fn check(self, mime_type: &str) -> Result<(), CoreError> {
        if mime_type.trim().to_ascii_lowercase().starts_with(self.prefix()) {
            Ok(())
        } else {
            Err(CoreError::UnsupportedMediaType {
                mime_type: mime_type.to_string(),
            })
        }
    }
}

/// serde adapter: `Vec<u8>` <-> standard base64 string.
pub(crate) mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// Milliseconds since the UNIX epoch, the timestamp unit used across PixelVoice.
pub fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
