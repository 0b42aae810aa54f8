// The two AI capabilities PixelVoice depends on: speech -> text and
// (image, prompt) -> image. Callers are generic over these traits; the
// Gemini client is one implementation.

use pixelvoice_core::{AudioClip, CoreError, ImageData};
use thiserror::Error;

pub mod gemini;
pub mod wire;

pub use gemini::{GeminiClient, GeminiConfig};

/// Speech transcription capability.
#[allow(async_fn_in_trait)]
pub trait Transcriber {
    /// Turn one recorded clip into text. An empty string means nothing was heard.
    async fn transcribe(&self, clip: &AudioClip) -> Result<String, AiError>;
}

/// Image editing capability.
#[allow(async_fn_in_trait)]
pub trait ImageEditor {
    /// Produce a new image from `image` following the natural-language `prompt`.
    async fn edit(&self, image: &ImageData, prompt: &str) -> Result<ImageData, AiError>;
}

/// Failures of an AI collaborator call. All of them are recoverable from the
/// caller's point of view.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("request blocked by the provider: {reason}")]
    Rejected { reason: String },

    #[error("response contained no image{}", model_note(.text))]
    NoImageReturned { text: Option<String> },

    #[error("response contained no candidates")]
    EmptyResponse,

    #[error("invalid payload in response: {0}")]
    InvalidPayload(#[from] CoreError),
}

fn model_note(text: &Option<String>) -> String {
    match text {
        Some(t) => format!(" (model said: {})", t),
        None => String::new(),
    }
}

impl AiError {
    /// Timeouts are reported separately in logs; callers treat them like any failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self, AiError::Http(e) if e.is_timeout())
    }
}
