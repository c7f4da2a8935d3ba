//! CLI command definitions for veriscan.
//!
//! One subcommand per input kind, plus `extract` for running the extractor
//! over a saved model reply without calling the model.

use crate::analysis::AnalysisOutcome;
use crate::detector::{Detector, DetectorConfig};
use crate::extraction::{extract_analysis, GroundingReference};
use crate::input::{AnalysisInput, MediaKind};
use crate::llm::providers::gemini::GEMINI_BASE_URL;
use crate::llm::GeminiClient;
use crate::render::{render_text, AnalysisReport};
use anyhow::Context;
use clap::Parser;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Checks whether content was written by a human or generated by AI.
#[derive(Parser)]
#[command(name = "veriscan")]
#[command(about = "Ask a hosted model whether a URL, text, image or video is AI-generated")]
#[command(version)]
#[command(
    long_about = "veriscan sends a URL, text, image or video to a Gemini model and reports its verdict (Human, AI or Mixed/Uncertain), a confidence score, the indicators it found and, for URLs, the web sources it consulted.\n\nExample usage:\n  veriscan text --file essay.txt\n  veriscan url https://example.com/article --json\n  veriscan image photo.jpg"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Analyze the content published at a URL (uses web search).
    Url(UrlArgs),

    /// Analyze a block of text given inline, from a file, or on stdin.
    Text(TextArgs),

    /// Analyze an image file or image data URL.
    #[command(alias = "img")]
    Image(MediaArgs),

    /// Analyze a video file or video data URL.
    Video(MediaArgs),

    /// Run the extractor on a saved raw model reply, without calling the model.
    Extract(ExtractArgs),
}

/// Model and output options shared by every analysis subcommand.
#[derive(clap::Args, Debug, Clone)]
pub struct ModelArgs {
    /// Model to use (overrides VERISCAN_MODEL).
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Gemini API key (can also be set via GEMINI_API_KEY or GOOGLE_API_KEY env var).
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Sampling temperature (overrides VERISCAN_TEMPERATURE).
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Request timeout in seconds (overrides VERISCAN_TIMEOUT_SECS).
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Output the report as JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `veriscan url`.
#[derive(Parser, Debug)]
pub struct UrlArgs {
    /// Absolute http(s) URL to analyze.
    pub url: String,

    /// Do not let the model search the web (no sources will be reported).
    #[arg(long)]
    pub no_search: bool,

    #[command(flatten)]
    pub model: ModelArgs,
}

/// Arguments for `veriscan text`.
#[derive(Parser, Debug)]
pub struct TextArgs {
    /// Text to analyze. Read from --file or stdin when omitted.
    #[arg(conflicts_with = "file")]
    pub text: Option<String>,

    /// Read the text from this file.
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub model: ModelArgs,
}

/// Arguments for `veriscan image` and `veriscan video`.
#[derive(Parser, Debug)]
pub struct MediaArgs {
    /// Path to the media file, or a data:<mime>;base64,<payload> URL.
    pub source: String,

    /// Largest accepted payload in bytes (overrides VERISCAN_MAX_INLINE_BYTES).
    #[arg(long)]
    pub max_bytes: Option<usize>,

    #[command(flatten)]
    pub model: ModelArgs,
}

/// Arguments for `veriscan extract`.
#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// File holding the raw model reply. Read from stdin when omitted.
    pub input: Option<PathBuf>,

    /// JSON file with grounding chunks, e.g. [{"web": {"uri": "...", "title": "..."}}].
    #[arg(short = 'g', long)]
    pub grounding: Option<PathBuf>,

    /// Output the report as JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Parse command-line arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI with the parsed arguments.
///
/// Returns an error when the analysis did not complete, so the process exits
/// non-zero for extraction and upstream failures.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Url(args) => run_url_command(args).await,
        Commands::Text(args) => run_text_command(args).await,
        Commands::Image(args) => run_media_command(MediaKind::Image, args).await,
        Commands::Video(args) => run_media_command(MediaKind::Video, args).await,
        Commands::Extract(args) => run_extract_command(args),
    }
}

async fn run_url_command(args: UrlArgs) -> anyhow::Result<()> {
    let mut config = build_config(&args.model)?;
    if args.no_search {
        config.enable_url_search = false;
    }
    let input = AnalysisInput::url(&args.url)?;
    let detector = build_detector(&args.model, config)?;
    run_analysis(&detector, input, args.model.json).await
}

async fn run_text_command(args: TextArgs) -> anyhow::Result<()> {
    let config = build_config(&args.model)?;
    let text = match (args.text, args.file) {
        (Some(text), _) => text,
        (None, Some(path)) => fs::read_to_string(&path)
            .with_context(|| format!("Failed to read text file {}", path.display()))?,
        (None, None) => read_stdin()?,
    };
    let input = AnalysisInput::text(text)?;
    let detector = build_detector(&args.model, config)?;
    run_analysis(&detector, input, args.model.json).await
}

async fn run_media_command(kind: MediaKind, args: MediaArgs) -> anyhow::Result<()> {
    let mut config = build_config(&args.model)?;
    if let Some(max_bytes) = args.max_bytes {
        config.max_inline_bytes = max_bytes;
        config.validate()?;
    }
    let detector = build_detector(&args.model, config)?;
    let input = detector
        .load_media(kind, &args.source)
        .with_context(|| format!("Failed to load {} '{}'", kind, preview(&args.source)))?;
    run_analysis(&detector, input, args.model.json).await
}

fn run_extract_command(args: ExtractArgs) -> anyhow::Result<()> {
    let (raw, origin) = match &args.input {
        Some(path) => (
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read reply file {}", path.display()))?,
            path.display().to_string(),
        ),
        None => (read_stdin()?, "stdin".to_string()),
    };

    let grounding = match &args.grounding {
        Some(path) => load_grounding(path)?,
        None => Vec::new(),
    };

    let outcome = AnalysisOutcome::from(extract_analysis(&raw, &grounding));
    let report = AnalysisReport::from_parts("reply", origin, "-", outcome);
    emit_report(&report, args.json)
}

/// Resolves configuration: defaults, then environment, then CLI flags.
fn build_config(args: &ModelArgs) -> anyhow::Result<DetectorConfig> {
    apply_overrides(DetectorConfig::from_env()?, args)
}

fn apply_overrides(mut config: DetectorConfig, args: &ModelArgs) -> anyhow::Result<DetectorConfig> {
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(temperature) = args.temperature {
        config.temperature = temperature;
    }
    if let Some(secs) = args.timeout_secs {
        config.request_timeout = std::time::Duration::from_secs(secs);
    }
    config.validate()?;
    Ok(config)
}

fn build_client(args: &ModelArgs, config: &DetectorConfig) -> anyhow::Result<GeminiClient> {
    let api_key = args
        .api_key
        .clone()
        .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No API key configured. Please provide --api-key or set GEMINI_API_KEY/GOOGLE_API_KEY env var."
            )
        })?;
    let base_url = std::env::var("GEMINI_API_BASE").unwrap_or_else(|_| GEMINI_BASE_URL.to_string());

    info!(model = %config.model, base_url = %base_url, "Using Gemini client");
    Ok(GeminiClient::with_options(
        api_key,
        base_url,
        config.model.clone(),
        config.request_timeout,
    )?)
}

fn build_detector(args: &ModelArgs, config: DetectorConfig) -> anyhow::Result<Detector> {
    let client = build_client(args, &config)?;
    Ok(Detector::new(Arc::new(client), config))
}

async fn run_analysis(detector: &Detector, input: AnalysisInput, json: bool) -> anyhow::Result<()> {
    let outcome = detector.analyze(&input).await;
    let report = AnalysisReport::new(&input, detector.config().model.clone(), outcome);
    emit_report(&report, json)
}

/// Prints the report and turns a failed outcome into an error.
fn emit_report(report: &AnalysisReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", render_text(report));
    }

    if report.outcome.is_completed() {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "Analysis did not complete ({})",
            report.outcome.status()
        ))
    }
}

fn load_grounding(path: &Path) -> anyhow::Result<Vec<GroundingReference>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read grounding file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Grounding file {} is not a JSON array of chunks", path.display()))
}

fn read_stdin() -> anyhow::Result<String> {
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read from stdin")?;
    Ok(buffer)
}

/// Keeps data URLs from flooding error messages.
fn preview(source: &str) -> String {
    if source.chars().count() > 80 {
        let head: String = source.chars().take(80).collect();
        format!("{}...", head)
    } else {
        source.to_string()
    }
}
