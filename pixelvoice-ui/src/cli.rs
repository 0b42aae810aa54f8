// Line commands for the terminal front end, and how studio state is printed.

use anyhow::Context;
use pixelvoice_core::ImageData;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::editor::{ChatMessage, Role, Studio};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(PathBuf),
    /// Press-and-hold cycle replaying a recorded clip.
    Say(PathBuf),
    Undo,
    Redo,
    /// 0-based index (the user types the 1-based number shown on screen).
    Jump(usize),
    History,
    Chat,
    Save(Option<PathBuf>),
    SaveSession(PathBuf),
    LoadSession(PathBuf),
    Help,
    Quit,
    /// Anything else is an edit command for the AI.
    Prompt(String),
    Empty,
    Invalid(String),
}

pub const HELP: &str = "\
Lệnh / commands:
  open <ảnh>            upload an image (replaces the current history)
  say <âm thanh>        speak a command from a recorded clip
  undo | redo           step through versions
  jump <n>              show version n
  history               list versions
  chat                  show the whole conversation
  save [thư mục]        export the displayed version
  session save <file>   save the edit history
  session load <file>   resume a saved history
  help | quit
Any other text is sent as an edit command, e.g. `làm nền xanh`.";

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }

    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head.to_lowercase().as_str() {
        "open" | "mo" if !rest.is_empty() => Command::Open(PathBuf::from(rest)),
        "say" | "noi" if !rest.is_empty() => Command::Say(PathBuf::from(rest)),
        "open" | "mo" | "say" | "noi" => Command::Invalid(format!("`{}` needs a file path", head)),
        "undo" if rest.is_empty() => Command::Undo,
        "redo" if rest.is_empty() => Command::Redo,
        "jump" => match rest.parse::<usize>() {
            Ok(n) if n >= 1 => Command::Jump(n - 1),
            _ => Command::Invalid(format!("`jump` needs a version number, got `{}`", rest)),
        },
        "history" if rest.is_empty() => Command::History,
        "chat" if rest.is_empty() => Command::Chat,
        "save" => Command::Save((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "session" => match rest.split_once(char::is_whitespace) {
            Some(("save", path)) if !path.trim().is_empty() => {
                Command::SaveSession(PathBuf::from(path.trim()))
            }
            Some(("load", path)) if !path.trim().is_empty() => {
                Command::LoadSession(PathBuf::from(path.trim()))
            }
            _ => Command::Invalid("usage: session save|load <file>".into()),
        },
        "help" | "?" if rest.is_empty() => Command::Help,
        "quit" | "exit" if rest.is_empty() => Command::Quit,
        _ => Command::Prompt(line.to_string()),
    }
}

/// Read an image file, taking the MIME type from its extension.
pub fn load_image(path: &Path) -> anyhow::Result<ImageData> {
    let mime_type = ImageData::mime_for_path(path)
        .with_context(|| format!("unsupported image type: {}", path.display()))?;
    let bytes =
        std::fs::read(path).with_context(|| format!("read image file: {}", path.display()))?;
    if bytes.is_empty() {
        anyhow::bail!("image file is empty: {}", path.display());
    }
    Ok(ImageData::new(mime_type, bytes))
}

pub fn render_message(msg: &ChatMessage) -> String {
    match msg.role {
        Role::System => format!("  · {}", msg.text),
        role => format!("{}: {}", role.speaker(), msg.text),
    }
}

/// `[2/3] thêm mũ (editing)`, or a hint when nothing is uploaded.
pub fn render_status(studio: &Studio) -> String {
    match (studio.position(), studio.current()) {
        (Some((shown, total)), Some(entry)) => format!(
            "[{}/{}] {} ({})",
            shown,
            total,
            studio.display_label(entry),
            studio.status()
        ),
        _ => "Bắt đầu bằng cách tải ảnh lên: open <ảnh>".to_string(),
    }
}

/// One line per version; the displayed one is marked with `>`.
pub fn render_history(studio: &Studio) -> String {
    let mut out = String::new();
    if let Some(history) = studio.history() {
        let _ = writeln!(out, "Lịch sử chỉnh sửa ({} phiên bản)", history.len());
        for (i, entry) in history.entries().iter().enumerate() {
            let marker = if i == history.cursor() { '>' } else { ' ' };
            let _ = writeln!(
                out,
                "{} {:>2}. {}",
                marker,
                i + 1,
                studio.display_label(entry)
            );
        }
    }
    out
}
