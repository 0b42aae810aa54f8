// PixelVoice terminal front end.
//
// Reads one command per line from stdin. Edit commands go to Gemini; a
// recorded clip can stand in for the hold-to-talk microphone.

use clap::Parser;
use pixelvoice_ai::{AiError, GeminiClient, ImageEditor, Transcriber};
use pixelvoice_core::{AudioClip, ImageData};
use pixelvoice_history::{load_history, save_history};
use pixelvoice_ui::cli::{self, Command};
use pixelvoice_ui::editor::{EditOutcome, FileMicrophone, Microphone, PressHold};
use pixelvoice_ui::{Studio, StudioConfig, StudioError};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pixelvoice", version, about = "Voice-controlled image editing")]
struct Args {
    /// Config file (default: <config dir>/pixelvoice/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Image to upload on start
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Resume a saved session instead of uploading
    #[arg(long, conflicts_with = "image")]
    session: Option<PathBuf>,
}

/// Gemini when a key is configured. Without one every call fails with
/// `MissingApiKey`, but navigation and export keep working.
struct Backend(Option<GeminiClient>);

impl Transcriber for Backend {
    async fn transcribe(&self, clip: &AudioClip) -> Result<String, AiError> {
        match &self.0 {
            Some(client) => client.transcribe(clip).await,
            None => Err(AiError::MissingApiKey),
        }
    }
}

impl ImageEditor for Backend {
    async fn edit(&self, image: &ImageData, prompt: &str) -> Result<ImageData, AiError> {
        match &self.0 {
            Some(client) => client.edit(image, prompt).await,
            None => Err(AiError::MissingApiKey),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = StudioConfig::load(args.config.as_deref())?;

    let backend = match GeminiClient::new(config.gemini()) {
        Ok(client) => Backend(Some(client)),
        Err(e) => {
            warn!(error = %e, "AI features disabled; set GEMINI_API_KEY");
            Backend(None)
        }
    };

    let mut studio = Studio::new(config.studio_options());
    let mut seen = 0;

    if let Some(path) = &args.image {
        open(&mut studio, path)?;
    } else if let Some(path) = &args.session {
        studio.restore(load_history(path)?)?;
    }

    println!("{}", cli::HELP);
    seen = print_new(&studio, seen);
    println!("{}", cli::render_status(&studio));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        studio.tick(Instant::now());

        let command = cli::parse_command(&line);
        if command == Command::Quit {
            break;
        }
        if let Err(e) = run(&mut studio, &backend, &config, command).await {
            println!("! {:#}", e);
        }

        seen = print_new(&studio, seen);
        println!("{}", cli::render_status(&studio));
    }

    info!("bye");
    Ok(())
}

async fn run(
    studio: &mut Studio,
    backend: &Backend,
    config: &StudioConfig,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Open(path) => open(studio, &path)?,
        Command::Say(path) => say(studio, backend, &path).await?,
        Command::Undo => {
            if !studio.undo()? {
                println!("Đang ở ảnh gốc.");
            }
        }
        Command::Redo => {
            if !studio.redo()? {
                println!("Đang ở phiên bản mới nhất.");
            }
        }
        Command::Jump(index) => studio.jump_to(index)?,
        Command::History => print!("{}", cli::render_history(studio)),
        Command::Chat => {
            for msg in studio.chat().messages() {
                println!("{}", cli::render_message(msg));
            }
        }
        Command::Save(dir) => {
            let dir = dir.unwrap_or_else(|| config.export_dir.clone());
            let path = studio.export(dir)?;
            println!("Đã lưu: {}", path.display());
        }
        Command::SaveSession(path) => {
            let history = studio.history().ok_or(StudioError::NoImage)?;
            save_history(&path, history)?;
            println!("Đã lưu phiên: {}", path.display());
        }
        Command::LoadSession(path) => {
            studio.restore(load_history(&path)?)?;
        }
        Command::Prompt(text) => report(studio.submit_text(backend, &text).await),
        Command::Help => println!("{}", cli::HELP),
        Command::Invalid(reason) => println!("? {}", reason),
        Command::Empty | Command::Quit => {}
    }
    Ok(())
}

fn open(studio: &mut Studio, path: &Path) -> anyhow::Result<()> {
    let image = cli::load_image(path)?;
    info!(path = %path.display(), mime_type = %image.mime_type, bytes = image.len(), "image loaded");
    studio.upload(image)?;
    Ok(())
}

/// One press-and-hold cycle over a recorded clip, then the voice pipeline.
async fn say(studio: &mut Studio, backend: &Backend, path: &Path) -> anyhow::Result<()> {
    // The button only accepts a press while the studio is idle with an image.
    let mut hold = PressHold::new(FileMicrophone::new(path));
    hold.set_disabled(!studio.accepts_input());
    studio.begin_recording()?;
    debug!(mic = hold.mic().name(), path = %path.display(), "replaying recorded clip");

    let clip = match hold.press().and_then(|_| hold.release()) {
        Ok(Some(clip)) => clip,
        Ok(None) => {
            studio.cancel_recording();
            return Ok(());
        }
        Err(e) => {
            studio.cancel_recording();
            return Err(e);
        }
    };

    report(studio.submit_audio(backend, backend, clip).await);
    Ok(())
}

// Outcomes already land in the chat log; only gate rejections need a line.
fn report(result: Result<EditOutcome, StudioError>) {
    match result {
        Ok(outcome) => info!(?outcome, "command finished"),
        Err(StudioError::NoImage) => {}
        Err(e) => println!("! {}", e),
    }
}

fn print_new(studio: &Studio, seen: usize) -> usize {
    for msg in studio.chat().since(seen) {
        println!("{}", cli::render_message(msg));
    }
    studio.chat().len()
}
