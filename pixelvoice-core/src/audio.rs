// One finished microphone recording.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;


/// Container used by browser recorders when nothing better is negotiated.
pub const DEFAULT_AUDIO_MIME: &str = "audio/webm";

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioClip {
    pub mime_type: String,
    #[serde(with = "crate::base64_bytes")]
    pub bytes: Vec<u8>,
}

impl AudioClip {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// MIME type without codec parameters (`audio/webm;codecs=opus` -> `audio/webm`).
    pub fn essence(&self) -> &str {
        self.mime_type
            .split(';')
            .next()
            .unwrap_or(DEFAULT_AUDIO_MIME)
            .trim()
    }

    pub fn mime_for_path(path: impl AsRef<Path>) -> Option<&'static str> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "webm" => Some("audio/webm"),
            "wav" => Some("audio/wav"),
            "mp3" => Some("audio/mpeg"),
            "ogg" | "oga" => Some("audio/ogg"),
            "m4a" | "mp4" => Some("audio/mp4"),
            "flac" => Some("audio/flac"),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioClip")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}
