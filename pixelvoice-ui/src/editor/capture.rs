// Press-and-hold voice capture.
//
// The microphone itself is a platform capability behind the `Microphone`
// trait; this module only tracks the hold gesture so that every
// press/release cycle yields exactly one clip.

use anyhow::Context;
use pixelvoice_core::{AudioClip, DEFAULT_AUDIO_MIME};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, trace, warn};

pub trait Microphone {
    /// Begin recording. Fails when the device is missing or access is denied.
    fn start(&mut self) -> anyhow::Result<()>;

    /// Stop recording and hand back everything captured since `start`.
    fn stop(&mut self) -> anyhow::Result<AudioClip>;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldState {
    Released,
    Held,
}

/// Hold-to-talk button state around a `Microphone`.
#[derive(Debug)]
pub struct PressHold<M: Microphone> {
    mic: M,
    state: HoldState,
    disabled: bool,
}

impl<M: Microphone> PressHold<M> {
    pub fn new(mic: M) -> Self {
        Self {
            mic,
            state: HoldState::Released,
            disabled: false,
        }
    }

    /// A disabled button ignores presses. A hold already in progress can
    /// still be released.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn state(&self) -> HoldState {
        self.state
    }

    pub fn is_held(&self) -> bool {
        self.state == HoldState::Held
    }

    pub fn mic(&self) -> &M {
        &self.mic
    }

    /// Pointer down. Returns whether recording started.
    pub fn press(&mut self) -> anyhow::Result<bool> {
        if self.disabled {
            trace!("press ignored, capture disabled");
            return Ok(false);
        }
        if self.is_held() {
            trace!("press ignored, already held");
            return Ok(false);
        }

        self.mic
            .start()
            .with_context(|| format!("could not access microphone `{}`", self.mic.name()))?;
        self.state = HoldState::Held;
        info!(mic = self.mic.name(), "recording started");
        Ok(true)
    }

    /// Pointer up. Yields the clip for this cycle, or `None` if nothing was held.
    pub fn release(&mut self) -> anyhow::Result<Option<AudioClip>> {
        if !self.is_held() {
            trace!("release without hold, ignoring");
            return Ok(None);
        }

        // Released even if stopping fails, so the next press starts clean.
        self.state = HoldState::Released;
        let clip = self.mic.stop().context("stop recording")?;
        debug!(mime_type = %clip.mime_type, bytes = clip.len(), "recording finished");
        if clip.is_empty() {
            warn!(mic = self.mic.name(), "recorded clip is empty");
        }
        Ok(Some(clip))
    }

    /// Pointer left the button while held. Same as releasing it.
    pub fn leave(&mut self) -> anyhow::Result<Option<AudioClip>> {
        self.release()
    }
}

/// Microphone stand-in that "records" a clip already on disk.
/// Used by the terminal front end, where there is no live audio device.
#[derive(Debug, Clone)]
pub struct FileMicrophone {
    path: PathBuf,
    recording: bool,
}

impl FileMicrophone {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            recording: false,
        }
    }
}

impl Microphone for FileMicrophone {
    fn start(&mut self) -> anyhow::Result<()> {
        if !self.path.is_file() {
            anyhow::bail!("audio file not found: {}", self.path.display());
        }
        self.recording = true;
        Ok(())
    }

    fn stop(&mut self) -> anyhow::Result<AudioClip> {
        if !self.recording {
            anyhow::bail!("microphone was not started");
        }
        self.recording = false;

        let bytes = fs::read(&self.path)
            .with_context(|| format!("read audio file: {}", self.path.display()))?;
        let mime_type = AudioClip::mime_for_path(&self.path).unwrap_or(DEFAULT_AUDIO_MIME);
        Ok(AudioClip::new(mime_type, bytes))
    }

    fn name(&self) -> &str {
        "file"
    }
}
