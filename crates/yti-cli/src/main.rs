mod config;
mod config_cmd;
mod history;

use clap::{Args, Parser, Subcommand};
use config::{Config, ConfigPaths, GatewayConfig};
use history::HistoryStore;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;
use yti_core::StandupEntry;
use yti_core::gateway::create_standup_provider;
use yti_core::ingest::{StructuredStandup, structure_model_output};
use yti_core::render::markdown_file_name;

const MAX_AUDIO_BYTES: usize = 20 * 1024 * 1024;
const MAX_TEXT_CHARS: usize = 10_000;

// The audio pipeline has no typed fallback, so a gateway response without a
// transcript gets this marker instead.
const NO_SPEECH_TRANSCRIPT: &str = "No speech detected.";

#[derive(Parser)]
#[command(name = "yti", version, about = "daily standup structuring engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Structure a recorded audio update and save it
    Audio(AudioArgs),
    /// Structure a typed update and save it
    Text(TextArgs),
    /// Show recent standups, newest first
    History(HistoryArgs),
    /// Inspect or edit the configuration
    Config(config_cmd::ConfigArgs),
}

#[derive(Args, Debug, Clone)]
struct AudioArgs {
    /// Path to the recorded audio file
    file: PathBuf,

    #[command(flatten)]
    submit: SubmitArgs,
}

#[derive(Args, Debug, Clone)]
struct TextArgs {
    /// Casual, conversational description of your work
    text: String,

    #[command(flatten)]
    submit: SubmitArgs,
}

#[derive(Args, Debug, Clone)]
struct SubmitArgs {
    /// Display name override for this entry
    #[arg(long)]
    name: Option<String>,

    /// Gateway model override
    #[arg(long, value_name = "model")]
    model: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct HistoryArgs {
    /// Number of entries to show
    #[arg(long, default_value_t = history::DEFAULT_RECENT_LIMIT)]
    limit: usize,
}

#[derive(Debug, Clone)]
struct ResolvedSubmit {
    gateway: GatewayConfig,
    display_name: String,
}

impl SubmitArgs {
    fn resolve(&self, config: &Config) -> ResolvedSubmit {
        let mut gateway = config.gateway.clone();
        let mut display_name = config.standup.display_name.clone();

        if let Some(value) = env_override("GEMINI_MODEL") {
            gateway.model = value;
        }
        if gateway.api_key.trim().is_empty() {
            if let Some(value) = env_override("GEMINI_API_KEY") {
                gateway.api_key = value;
            }
        }
        if let Some(value) = env_override("DEFAULT_STANDUP_NAME") {
            display_name = value;
        }

        if let Some(model) = &self.model {
            gateway.model = model.trim().to_string();
        }
        if let Some(name) = &self.name {
            let trimmed = name.trim();
            if !trimmed.is_empty() {
                display_name = trimmed.to_string();
            }
        }

        ResolvedSubmit {
            gateway,
            display_name,
        }
    }
}

fn env_override(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn non_empty_str(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let paths = match ConfigPaths::from_home() {
        Ok(paths) => paths,
        Err(err) => {
            eprintln!("config paths error: {err}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Audio(args) => run_audio(&args, &paths),
        Command::Text(args) => run_text(&args, &paths),
        Command::History(args) => run_history(&args, &paths),
        Command::Config(args) => config_cmd::run(&args, &paths).map_err(Into::into),
    };

    if let Err(err) = result {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run_audio(args: &AudioArgs, paths: &ConfigPaths) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_create(paths)?;
    let resolved = args.submit.resolve(&config);

    let audio = fs::read(&args.file)
        .map_err(|err| format!("failed to read {}: {err}", args.file.display()))?;
    ensure_audio_payload(&audio)?;
    let mime_type = mime_for_path(&args.file);

    let provider = create_standup_provider(
        resolved.gateway.provider.as_str(),
        non_empty_str(resolved.gateway.model.as_str()),
        non_empty_str(resolved.gateway.api_key.as_str()),
    )?;
    let model_text = provider.structure_audio(&audio, mime_type)?;

    save_and_print(&model_text, NO_SPEECH_TRANSCRIPT, &resolved, &config, paths)
}

fn run_text(args: &TextArgs, paths: &ConfigPaths) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_create(paths)?;
    let resolved = args.submit.resolve(&config);

    let text = args.text.trim();
    ensure_text_payload(text)?;

    let provider = create_standup_provider(
        resolved.gateway.provider.as_str(),
        non_empty_str(resolved.gateway.model.as_str()),
        non_empty_str(resolved.gateway.api_key.as_str()),
    )?;
    let model_text = provider.structure_text(text)?;

    save_and_print(&model_text, text, &resolved, &config, paths)
}

fn save_and_print(
    model_text: &str,
    default_transcript: &str,
    resolved: &ResolvedSubmit,
    config: &Config,
    paths: &ConfigPaths,
) -> Result<(), Box<dyn std::error::Error>> {
    let now = OffsetDateTime::now_utc();
    let date_iso = date_iso(now);
    let structured =
        structure_model_output(model_text, default_transcript, &resolved.display_name, &date_iso);
    let entry = build_entry(
        structured,
        &resolved.display_name,
        &date_iso,
        Uuid::now_v7().to_string(),
        now.format(&Rfc3339)?,
    );

    let store = HistoryStore::new(paths, &config.storage.export_dir);
    let markdown_path = store.save(&entry)?;

    print!("{}", entry.formatted_text);
    println!();
    println!("saved {}", markdown_path.display());
    Ok(())
}

fn run_history(args: &HistoryArgs, paths: &ConfigPaths) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_create(paths)?;
    let store = HistoryStore::new(paths, &config.storage.export_dir);
    let entries = store.recent(args.limit);

    if entries.is_empty() {
        println!("no standups recorded yet");
        return Ok(());
    }
    for entry in entries {
        println!("--- {}", entry.date_iso);
        print!("{}", entry.formatted_text);
        println!();
    }
    Ok(())
}

fn build_entry(
    structured: StructuredStandup,
    display_name: &str,
    date_iso: &str,
    id: String,
    created_at: String,
) -> StandupEntry {
    StandupEntry {
        id,
        date_iso: date_iso.to_string(),
        display_name: display_name.to_string(),
        raw_transcript: structured.raw_transcript,
        formatted_text: structured.formatted_text,
        markdown_content: structured.markdown_content,
        markdown_file_name: markdown_file_name(date_iso),
        sections: structured.sections,
        created_at,
    }
}

fn ensure_audio_payload(audio: &[u8]) -> Result<(), String> {
    if audio.is_empty() {
        return Err("audio file is empty".to_string());
    }
    if audio.len() > MAX_AUDIO_BYTES {
        return Err(format!(
            "audio file is too large; max supported size is {} MiB",
            MAX_AUDIO_BYTES / (1024 * 1024)
        ));
    }
    Ok(())
}

fn ensure_text_payload(text: &str) -> Result<(), String> {
    if text.is_empty() {
        return Err("no text provided".to_string());
    }
    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(format!(
            "text is too long; keep it under {MAX_TEXT_CHARS} characters"
        ));
    }
    Ok(())
}

fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "wav" => "audio/wav",
        "m4a" | "mp4" => "audio/mp4",
        "mp3" => "audio/mpeg",
        "ogg" | "oga" => "audio/ogg",
        "flac" => "audio/flac",
        _ => "audio/webm",
    }
}

fn date_iso(now: OffsetDateTime) -> String {
    let date = now.date();
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}
