// Encoded image handle shared across the workspace.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::{CoreError, MediaKind};

/// MIME type assumed when nothing better is known.
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// An encoded picture (PNG, JPEG, ...) plus its MIME type.
/// The bytes are never decoded here; equality is byte equality.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    pub mime_type: String,
    #[serde(with = "crate::base64_bytes")]
    pub bytes: Vec<u8>,
}

impl ImageData {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Build from a bare base64 payload, as returned by inline-data APIs.
    /// A blank MIME type is taken as `DEFAULT_IMAGE_MIME`.
    pub fn from_base64(mime_type: impl Into<String>, payload: &str) -> Result<Self, CoreError> {
        let mut mime_type = mime_type.into();
        if mime_type.trim().is_empty() {
            mime_type = DEFAULT_IMAGE_MIME.to_string();
        }
        MediaKind::Image.check(&mime_type)?;
        let bytes = STANDARD.decode(payload.trim().as_bytes())?;
        Ok(Self { mime_type, bytes })
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// File extension matching the MIME type. Unknown types fall back to `png`.
    pub fn extension(&self) -> &'static str {
        let essence = self
            .mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            "image/bmp" => "bmp",
            _ => "png",
        }
    }

    /// Guess the MIME type from a file name (`photo.JPG` -> `image/jpeg`).
    pub fn mime_for_path(path: impl AsRef<Path>) -> Option<&'static str> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some("image/png"),
            "jpg" | "jpeg" => Some("image/jpeg"),
            "webp" => Some("image/webp"),
            "gif" => Some("image/gif"),
            "bmp" => Some("image/bmp"),
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

// Images can be megabytes; never dump the bytes into logs.
impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageData")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_base64() {
        let img = ImageData::from_base64("image/jpeg", "AQID").unwrap();
        assert_eq!(img.mime_type, "image/jpeg");
        assert_eq!(img.bytes, vec![1, 2, 3]);
        assert_eq!(img.extension(), "jpg");
        assert_eq!(img.to_base64(), "AQID");
    }

    #[test]
    fn test_from_base64_blank_mime_defaults() {
        let img = ImageData::from_base64("", "AQID").unwrap();
        assert_eq!(img.mime_type, DEFAULT_IMAGE_MIME);
    }

    #[test]
    fn test_from_base64_accepts_uppercase_mime() {
        let img = ImageData::from_base64("IMAGE/PNG", "AQID").unwrap();
        assert_eq!(img.extension(), "png");
    }

    #[test]
    fn test_audio_is_not_an_image() {
        assert!(matches!(
            ImageData::from_base64("audio/webm", "AQID"),
            Err(CoreError::UnsupportedMediaType { .. })
        ));
        assert!(matches!(
            ImageData::from_base64("image/png", "@@@"),
            Err(CoreError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_extension_fallback() {
        assert_eq!(ImageData::new("image/x-unknown", vec![]).extension(), "png");
        assert_eq!(ImageData::new("IMAGE/WEBP", vec![]).extension(), "webp");
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(ImageData::mime_for_path("a/b/photo.JPG"), Some("image/jpeg"));
        assert_eq!(ImageData::mime_for_path("cat.png"), Some("image/png"));
        assert_eq!(ImageData::mime_for_path("notes.txt"), None);
        assert_eq!(ImageData::mime_for_path("no_extension"), None);
    }

    #[test]
    fn test_serde_uses_base64() {
        let img = ImageData::new("image/png", vec![1, 2, 3]);
        let json = serde_json::to_string(&img).unwrap();
        assert_eq!(json, r#"{"mime_type":"image/png","bytes":"AQID"}"#);
        let back: ImageData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn test_debug_hides_bytes() {
        let img = ImageData::new("image/png", vec![0; 1024]);
        let out = format!("{:?}", img);
        assert!(out.contains("len: 1024"));
        assert!(!out.contains("0, 0"));
    }
}
