// Editor module for PixelVoice UI.

pub mod capture;
pub mod chat;
pub mod studio;

pub use capture::{FileMicrophone, HoldState, Microphone, PressHold};
pub use chat::{ChatLog, ChatMessage, Role};
pub use studio::{
    EditOutcome, PendingEdit, PendingTranscription, Status, Studio, StudioError, StudioOptions,
    TranscriptOutcome,
};
