//! pixelvoice-ui: controller layer and terminal front end for PixelVoice.
//!
//! Everything a screen would show (current version, position, chat log,
//! busy status) is read from `editor::Studio`.

pub mod cli;
pub mod config;
pub mod editor;

pub use config::StudioConfig;
pub use editor::{Studio, StudioError};
