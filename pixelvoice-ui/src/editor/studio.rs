//! The editing studio: one explicit store for everything the UI shows.
//!
//! `Studio` owns the live edit history, the chat log and the busy status.
//! Every user action is a method with a defined transition. Collaborator
//! calls are split in two phases (`begin_*` hands out a ticket, `finish_*`
//! applies the result) so the store never holds a borrow across a network
//! call and a result that arrives late cannot corrupt a newer history.

use pixelvoice_ai::{AiError, ImageEditor, Transcriber};
use pixelvoice_core::{AudioClip, ImageData};
use pixelvoice_history::export::export_current;
use pixelvoice_history::{EditHistory, ExportNaming, HistoryEntry, HistoryError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::chat::{ChatLog, Role};

pub const MSG_UPLOADED: &str = "Tải ảnh thành công. Hãy ra lệnh sửa ảnh bằng Tiếng Việt!";
pub const MSG_RESTORED: &str = "Đã khôi phục phiên chỉnh sửa.";
pub const MSG_UPLOAD_FIRST: &str = "Vui lòng tải ảnh lên trước.";
pub const MSG_NOT_HEARD: &str = "Tôi không nghe rõ. Vui lòng nói lại.";
pub const MSG_AUDIO_FAILED: &str = "Lỗi xử lý âm thanh.";
pub const MSG_EDIT_DONE: &str = "Đã hoàn thành chỉnh sửa.";
pub const MSG_EDIT_FAILED: &str = "Xin lỗi, đã xảy ra lỗi khi chỉnh sửa ảnh.";

/// How the original upload is labelled on screen.
pub const ORIGINAL_DISPLAY_LABEL: &str = "Ảnh gốc";

pub fn processing_message(prompt: &str) -> String {
    format!("Đang xử lý yêu cầu: \"{}\"...", prompt)
}

/// What the studio is doing right now. Input is accepted only when `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Idle,
    Recording,
    Transcribing,
    Editing,
    /// An edit just failed; returns to `Idle` after the error cooldown.
    Error,
}

impl Status {
    /// A collaborator call is outstanding.
    pub fn in_flight(&self) -> bool {
        matches!(self, Status::Transcribing | Status::Editing)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Recording => write!(f, "recording"),
            Self::Transcribing => write!(f, "transcribing"),
            Self::Editing => write!(f, "editing"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StudioError {
    #[error("no image uploaded yet")]
    NoImage,

    #[error("prompt is empty")]
    EmptyPrompt,

    #[error("studio is busy ({0})")]
    Busy(Status),

    #[error("result belongs to an earlier upload or an abandoned request")]
    StaleRequest,

    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Result of one edit attempt as seen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// A new version was committed at `index`.
    Applied { index: usize },
    /// A collaborator failed; history is unchanged and an error message was logged.
    Failed,
    /// The transcript was blank; nothing was sent for editing.
    NothingHeard,
}

/// Ticket for an outstanding image edit.
#[must_use = "finish or abandon the edit, otherwise the studio stays busy"]
#[derive(Debug)]
pub struct PendingEdit {
    generation: u64,
    prompt: String,
    image: ImageData,
}

impl PendingEdit {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Snapshot of the version displayed when the edit was requested.
    pub fn image(&self) -> &ImageData {
        &self.image
    }
}

/// Ticket for an outstanding transcription.
#[must_use = "finish or abandon the transcription, otherwise the studio stays busy"]
#[derive(Debug)]
pub struct PendingTranscription {
    generation: u64,
    clip: AudioClip,
}

impl PendingTranscription {
    pub fn clip(&self) -> &AudioClip {
        &self.clip
    }
}

/// What a finished transcription leads to.
#[derive(Debug)]
pub enum TranscriptOutcome {
    /// Speech was recognised and an edit has been started for it.
    Heard(PendingEdit),
    NothingHeard,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudioOptions {
    /// How long `Status::Error` is shown before input is accepted again.
    pub error_cooldown: Duration,
    pub export_naming: ExportNaming,
}

impl Default for StudioOptions {
    fn default() -> Self {
        Self {
            error_cooldown: Duration::from_millis(3000),
            export_naming: ExportNaming::default(),
        }
    }
}

#[derive(Debug)]
pub struct Studio {
    options: StudioOptions,
    history: Option<EditHistory>,
    chat: ChatLog,
    status: Status,
    error_since: Option<Instant>,
    /// Bumped on every upload; tickets from older uploads are stale.
    generation: u64,
}

impl Default for Studio {
    fn default() -> Self {
        Self::new(StudioOptions::default())
    }
}

impl Studio {
    pub fn new(options: StudioOptions) -> Self {
        Self {
            options,
            history: None,
            chat: ChatLog::new(),
            status: Status::Idle,
            error_since: None,
            generation: 0,
        }
    }

    // ------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn history(&self) -> Option<&EditHistory> {
        self.history.as_ref()
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.history.as_ref().map(|h| h.current())
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    /// `(displayed, total)`, 1-based as shown next to the undo/redo buttons.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.history.as_ref().map(|h| (h.cursor() + 1, h.len()))
    }

    /// Whether text or voice input is currently accepted.
    pub fn accepts_input(&self) -> bool {
        self.history.is_some() && self.status == Status::Idle
    }

    /// On-screen label of `entry`: the command text, or "Ảnh gốc" for the upload.
    pub fn display_label<'a>(&self, entry: &'a HistoryEntry) -> &'a str {
        let original = self.history.as_ref().map(|h| h.original().id);
        if original == Some(entry.id) {
            ORIGINAL_DISPLAY_LABEL
        } else {
            &entry.label
        }
    }

    // ------------------------------------------------------------------
    // Upload and navigation
    // ------------------------------------------------------------------

    /// Start over with a new picture. The previous history is dropped.
    pub fn upload(&mut self, image: ImageData) -> Result<&HistoryEntry, StudioError> {
        self.replace_history(EditHistory::new(image), MSG_UPLOADED)
    }

    /// Resume a saved history. Same rules as `upload`.
    pub fn restore(&mut self, history: EditHistory) -> Result<&HistoryEntry, StudioError> {
        self.replace_history(history, MSG_RESTORED)
    }

    fn replace_history(&mut self, history: EditHistory, notice: &str) -> Result<&HistoryEntry, StudioError> {
        if self.status.in_flight() {
            warn!(status = %self.status, "history replacement rejected while a request is in flight");
            return Err(StudioError::Busy(self.status));
        }

        if let Some(old) = &self.history {
            info!(discarded_versions = old.len(), "replacing edit history");
        }
        self.generation += 1;
        self.chat.push(Role::System, notice);

        let history = self.history.insert(history);
        Ok(history.current())
    }

    fn history_mut(&mut self) -> Result<&mut EditHistory, StudioError> {
        self.history.as_mut().ok_or(StudioError::NoImage)
    }

    pub fn undo(&mut self) -> Result<bool, StudioError> {
        Ok(self.history_mut()?.undo())
    }

    pub fn redo(&mut self) -> Result<bool, StudioError> {
        Ok(self.history_mut()?.redo())
    }

    pub fn jump_to(&mut self, index: usize) -> Result<(), StudioError> {
        self.history_mut()?.jump_to(index)?;
        Ok(())
    }

    /// Write the displayed version into `dir`.
    pub fn export(&self, dir: impl AsRef<Path>) -> anyhow::Result<PathBuf> {
        let history = self.history.as_ref().ok_or(StudioError::NoImage)?;
        export_current(dir, history, &self.options.export_naming)
    }

    // ------------------------------------------------------------------
    // Status gate
    // ------------------------------------------------------------------

    fn require_image(&mut self) -> Result<(), StudioError> {
        if self.history.is_none() {
            self.chat.push(Role::System, MSG_UPLOAD_FIRST);
            return Err(StudioError::NoImage);
        }
        Ok(())
    }

    fn require_idle(&self) -> Result<(), StudioError> {
        if self.status != Status::Idle {
            debug!(status = %self.status, "input rejected, studio busy");
            return Err(StudioError::Busy(self.status));
        }
        Ok(())
    }

    /// Leave `Status::Error` once the cooldown has passed. Returns the new status.
    pub fn tick(&mut self, now: Instant) -> Status {
        if self.status == Status::Error {
            let expired = self
                .error_since
                .map_or(true, |since| now.saturating_duration_since(since) >= self.options.error_cooldown);
            if expired {
                debug!("error cooldown over");
                self.status = Status::Idle;
                self.error_since = None;
            }
        }
        self.status
    }

    // Drop the busy status of an abandoned request.
    fn release_gate(&mut self) {
        if self.status.in_flight() {
            warn!(status = %self.status, "in-flight request abandoned");
            self.status = Status::Idle;
        }
    }

    // ------------------------------------------------------------------
    // Voice path
    // ------------------------------------------------------------------

    /// The hold-to-talk button went down.
    pub fn begin_recording(&mut self) -> Result<(), StudioError> {
        self.require_image()?;
        self.require_idle()?;
        self.status = Status::Recording;
        Ok(())
    }

    /// Recording ended without a usable clip (e.g. microphone unavailable).
    pub fn cancel_recording(&mut self) {
        if self.status == Status::Recording {
            self.status = Status::Idle;
        }
    }

    /// A clip is ready and is about to be sent for transcription.
    pub fn begin_transcription(&mut self, clip: AudioClip) -> Result<PendingTranscription, StudioError> {
        self.require_image()?;
        if !matches!(self.status, Status::Idle | Status::Recording) {
            return Err(StudioError::Busy(self.status));
        }

        debug!(mime_type = %clip.mime_type, bytes = clip.len(), "transcription started");
        self.status = Status::Transcribing;
        Ok(PendingTranscription {
            generation: self.generation,
            clip,
        })
    }

    pub fn finish_transcription(
        &mut self,
        ticket: PendingTranscription,
        result: Result<String, AiError>,
    ) -> Result<TranscriptOutcome, StudioError> {
        if ticket.generation != self.generation || self.status != Status::Transcribing {
            warn!("ignoring stale transcription result");
            return Err(StudioError::StaleRequest);
        }
        self.status = Status::Idle;

        let transcript = match result {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, timeout = e.is_timeout(), "transcription failed");
                self.chat.push(Role::System, MSG_AUDIO_FAILED);
                return Ok(TranscriptOutcome::Failed);
            }
        };

        if transcript.trim().is_empty() {
            info!("blank transcript, nothing to edit");
            self.chat.push(Role::System, MSG_NOT_HEARD);
            return Ok(TranscriptOutcome::NothingHeard);
        }

        Ok(TranscriptOutcome::Heard(self.begin_edit(&transcript)?))
    }

    pub fn abandon_transcription(&mut self, ticket: PendingTranscription) {
        if ticket.generation == self.generation && self.status == Status::Transcribing {
            self.release_gate();
        }
    }

    // ------------------------------------------------------------------
    // Edit path
    // ------------------------------------------------------------------

    /// Log the command and capture the displayed version for the editor.
    pub fn begin_edit(&mut self, prompt: &str) -> Result<PendingEdit, StudioError> {
        self.require_image()?;
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(StudioError::EmptyPrompt);
        }
        self.require_idle()?;

        let image = self.history_mut()?.current().image.clone();
        self.chat.push(Role::User, prompt);
        self.chat.push(Role::Assistant, processing_message(prompt));
        self.status = Status::Editing;
        info!(prompt, "edit started");

        Ok(PendingEdit {
            generation: self.generation,
            prompt: prompt.to_string(),
            image,
        })
    }

    /// Apply the editor's answer. A failure leaves the history untouched.
    pub fn finish_edit(
        &mut self,
        ticket: PendingEdit,
        result: Result<ImageData, AiError>,
    ) -> Result<EditOutcome, StudioError> {
        if ticket.generation != self.generation || self.status != Status::Editing {
            warn!(prompt = %ticket.prompt, "ignoring stale edit result");
            return Err(StudioError::StaleRequest);
        }

        match result {
            Ok(image) => {
                let history = self.history_mut()?;
                let entry_id = history.commit(image, ticket.prompt).id;
                let index = history.cursor();
                self.chat
                    .push_with_entry(Role::Assistant, MSG_EDIT_DONE, entry_id);
                self.status = Status::Idle;
                Ok(EditOutcome::Applied { index })
            }
            Err(e) => {
                error!(error = %e, timeout = e.is_timeout(), prompt = %ticket.prompt, "edit failed");
                self.chat.push(Role::System, MSG_EDIT_FAILED);
                self.status = Status::Error;
                self.error_since = Some(Instant::now());
                Ok(EditOutcome::Failed)
            }
        }
    }

    pub fn abandon_edit(&mut self, ticket: PendingEdit) {
        if ticket.generation == self.generation && self.status == Status::Editing {
            self.release_gate();
        }
    }

    // ------------------------------------------------------------------
    // One-call conveniences
    // ------------------------------------------------------------------

    /// Typed command: edit the displayed version with `text`.
    pub async fn submit_text<E: ImageEditor>(
        &mut self,
        editor: &E,
        text: &str,
    ) -> Result<EditOutcome, StudioError> {
        let pending = self.begin_edit(text)?;
        let flight = InFlight::new(self);
        let result = editor.edit(pending.image(), pending.prompt()).await;
        flight.land()?.finish_edit(pending, result)
    }

    /// Spoken command: transcribe `clip`, then edit with the transcript.
    pub async fn submit_audio<T: Transcriber, E: ImageEditor>(
        &mut self,
        transcriber: &T,
        editor: &E,
        clip: AudioClip,
    ) -> Result<EditOutcome, StudioError> {
        let pending = self.begin_transcription(clip)?;
        let flight = InFlight::new(self);
        let heard = transcriber.transcribe(pending.clip()).await;
        let studio = flight.land()?;

        let edit = match studio.finish_transcription(pending, heard)? {
            TranscriptOutcome::Heard(edit) => edit,
            TranscriptOutcome::NothingHeard => return Ok(EditOutcome::NothingHeard),
            TranscriptOutcome::Failed => return Ok(EditOutcome::Failed),
        };

        let flight = InFlight::new(studio);
        let result = editor.edit(edit.image(), edit.prompt()).await;
        flight.land()?.finish_edit(edit, result)
    }
}

// Releases the busy gate if the future driving a collaborator call is
// dropped before the call returns.
struct InFlight<'a> {
    studio: Option<&'a mut Studio>,
}

impl<'a> InFlight<'a> {
    fn new(studio: &'a mut Studio) -> Self {
        Self {
            studio: Some(studio),
        }
    }

    fn land(mut self) -> Result<&'a mut Studio, StudioError> {
        self.studio.take().ok_or(StudioError::StaleRequest)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(studio) = self.studio.take() {
            studio.release_gate();
        }
    }
}
