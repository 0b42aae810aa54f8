//! Configuration reading.
//!
//! A single optional JSON file (camelCase keys, every field optional) plus an
//! environment override for the API key.

use anyhow::Context;
use pixelvoice_ai::gemini::{DEFAULT_BASE_URL, DEFAULT_EDIT_MODEL, DEFAULT_TRANSCRIPTION_MODEL};
use pixelvoice_ai::GeminiConfig;
use pixelvoice_history::ExportNaming;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::editor::StudioOptions;

/// Environment variables checked for the API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudioConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub transcription_model: String,
    pub edit_model: String,
    pub language: String,
    pub request_timeout_secs: u64,
    pub error_cooldown_ms: u64,
    pub export_dir: PathBuf,
    pub export_naming: ExportNaming,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.into(),
            transcription_model: DEFAULT_TRANSCRIPTION_MODEL.into(),
            edit_model: DEFAULT_EDIT_MODEL.into(),
            language: "Vietnamese".into(),
            request_timeout_secs: 60,
            error_cooldown_ms: 3000,
            export_dir: PathBuf::from("."),
            export_naming: ExportNaming::default(),
        }
    }
}

impl StudioConfig {
    /// Load from `path`, or from the default location when `path` is `None`.
    /// A missing default file gives the defaults; an explicit path must exist.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::read(path)?,
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::read(&path)?,
                _ => {
                    debug!("no config file, using defaults");
                    Self::default()
                }
            },
        };
        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make every collaborator call fail.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.request_timeout_secs == 0 {
            anyhow::bail!("requestTimeoutSecs must be at least 1");
        }
        Ok(())
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&data)
            .with_context(|| format!("parse config file: {}", path.display()))?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Let the environment override the file's API key.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for name in API_KEY_VARS {
            if let Some(key) = lookup(name).filter(|k| !k.trim().is_empty()) {
                debug!(var = name, "API key taken from environment");
                self.api_key = Some(key);
                return;
            }
        }
    }

    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.api_key.clone().unwrap_or_default(),
            base_url: self.base_url.clone(),
            transcription_model: self.transcription_model.clone(),
            edit_model: self.edit_model.clone(),
            language: self.language.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn studio_options(&self) -> StudioOptions {
        StudioOptions {
            error_cooldown: Duration::from_millis(self.error_cooldown_ms),
            export_naming: self.export_naming.clone(),
        }
    }
}

/// `<config dir>/pixelvoice/config.json`, e.g. `~/.config/pixelvoice/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pixelvoice").join("config.json"))
}
