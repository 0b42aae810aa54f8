//! Gemini REST client implementing both `Transcriber` and `ImageEditor`.

use pixelvoice_core::{AudioClip, ImageData};
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

use crate::wire::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part};
use crate::{AiError, ImageEditor, Transcriber};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_EDIT_MODEL: &str = "gemini-2.5-flash-image";

/// Connection settings for the Gemini API.
#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub transcription_model: String,
    pub edit_model: String,
    /// Spoken language named in the transcription instruction.
    pub language: String,
    pub request_timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.into(),
            transcription_model: DEFAULT_TRANSCRIPTION_MODEL.into(),
            edit_model: DEFAULT_EDIT_MODEL.into(),
            language: "Vietnamese".into(),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl GeminiConfig {
    pub fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }

    /// Instruction sent next to the audio clip.
    pub fn transcription_instruction(&self) -> String {
        format!(
            "Transcribe this audio exactly as spoken. The speaker is giving an image \
             editing command in {}. Return only the transcribed text in that language, \
             without quotes, translation or commentary. If nothing intelligible is said, \
             return an empty response.",
            self.language
        )
    }
}

pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, AiError> {
        if config.api_key.trim().is_empty() {
            return Err(AiError::MissingApiKey);
        }
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { config, client })
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, AiError> {
        let url = self.config.endpoint(model);
        let started = Instant::now();
        debug!(model, "sending generateContent request");

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    warn!(model, timeout_s = self.config.request_timeout.as_secs(), "request timed out");
                }
                AiError::from(e)
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            error!(model, status = status.as_u16(), "Gemini API error");
            return Err(AiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateContentResponse = resp.json().await?;
        debug!(
            model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            candidates = body.candidates.len(),
            "generateContent response received"
        );

        if let Some(reason) = body.block_reason() {
            warn!(model, reason, "request blocked");
            return Err(AiError::Rejected {
                reason: reason.to_string(),
            });
        }
        Ok(body)
    }
}

/// Pull the transcript out of a response. No text at all is an empty transcript.
pub fn transcript_from_response(resp: &GenerateContentResponse) -> Result<String, AiError> {
    if resp.candidates.is_empty() {
        return Err(AiError::EmptyResponse);
    }
    Ok(resp.text().unwrap_or_default().trim().to_string())
}

/// Pull the edited image out of a response.
pub fn image_from_response(resp: &GenerateContentResponse) -> Result<ImageData, AiError> {
    if resp.candidates.is_empty() {
        return Err(AiError::EmptyResponse);
    }
    match resp.first_image() {
        Some(data) => Ok(ImageData::from_base64(data.mime_type.clone(), &data.data)?),
        None => Err(AiError::NoImageReturned { text: resp.text() }),
    }
}

impl Transcriber for GeminiClient {
    async fn transcribe(&self, clip: &AudioClip) -> Result<String, AiError> {
        debug!(mime_type = %clip.mime_type, bytes = clip.len(), "transcribing clip");

        // Gemini rejects codec parameters in inline MIME types.
        let request = GenerateContentRequest {
            contents: vec![Content::user(vec![
                Part::inline(clip.essence(), clip.to_base64()),
                Part::text(self.config.transcription_instruction()),
            ])],
            generation_config: None,
        };

        let resp = self
            .generate(&self.config.transcription_model, &request)
            .await?;
        transcript_from_response(&resp)
    }
}

impl ImageEditor for GeminiClient {
    async fn edit(&self, image: &ImageData, prompt: &str) -> Result<ImageData, AiError> {
        debug!(mime_type = %image.mime_type, bytes = image.len(), prompt, "requesting edit");

        let request = GenerateContentRequest {
            contents: vec![Content::user(vec![
                Part::inline(image.mime_type.clone(), image.to_base64()),
                Part::text(prompt),
            ])],
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["TEXT".into(), "IMAGE".into()],
            }),
        };

        let resp = self.generate(&self.config.edit_model, &request).await?;
        image_from_response(&resp)
    }
}
