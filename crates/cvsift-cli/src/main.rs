use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cvsift_core::{EntityRecognizer, OcrEngine};
use cvsift_ingest::TesseractCli;
use cvsift_parsing::ProjectStrategy;
use cvsift_reporting::{ExportFormat, export_record, write_export};

mod output;
mod settings;

use output::ColorMode;
use settings::Overrides;

/// Resume field extractor - pull name, contacts, skills, education,
/// experience and projects out of a resume PDF
#[derive(Parser, Debug)]
#[command(name = "cvsift", version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Read settings from this TOML file instead of the default locations
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract candidate fields from a resume
    Extract {
        /// Path to the resume PDF (or a text file with --text)
        file_path: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Write the report to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Never fall back to OCR for image-only documents
        #[arg(long)]
        no_ocr: bool,

        /// Page rendering resolution for OCR
        #[arg(long)]
        dpi: Option<u32>,

        /// Tesseract language code for OCR
        #[arg(long)]
        lang: Option<String>,

        /// External named-entity recognizer, e.g. "python3 ner.py"
        #[arg(long)]
        ner_command: Option<String>,

        /// Seconds allowed for text acquisition
        #[arg(long)]
        timeout: Option<u64>,

        /// How project lines are collected
        #[arg(long, value_enum)]
        project_strategy: Option<Strategy>,

        /// Treat the input as already-extracted plain text
        #[arg(long)]
        text: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Format {
    Text,
    Json,
    Markdown,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => ExportFormat::Text,
            Format::Json => ExportFormat::Json,
            Format::Markdown => ExportFormat::Markdown,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Strategy {
    /// Each keyword line on its own
    SingleLine,
    /// A keyword line and the lines after it, up to a blank line
    Windowed,
}

impl From<Strategy> for ProjectStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::SingleLine => ProjectStrategy::SingleLine,
            Strategy::Windowed => ProjectStrategy::Windowed,
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_file = match &cli.config {
        Some(path) => cvsift_core::config_file::load_from_path(path).ok_or_else(|| {
            anyhow::anyhow!("Could not read config file {}", path.display())
        })?,
        None => cvsift_core::config_file::load_config(),
    };

    match cli.command {
        Command::Extract {
            file_path,
            format,
            output,
            no_color,
            no_ocr,
            dpi,
            lang,
            ner_command,
            timeout,
            project_strategy,
            text,
        } => {
            let overrides = Overrides {
                no_ocr,
                dpi,
                lang,
                ner_command,
                timeout_secs: timeout,
                project_strategy: project_strategy.map(Into::into),
            };
            let settings =
                settings::resolve(&config_file, &overrides, |key| std::env::var(key).ok())?;
            extract(
                &file_path,
                settings,
                format.into(),
                output.as_deref(),
                ColorMode(!no_color),
                text,
            )
            .await
        }
    }
}

async fn extract(
    file_path: &Path,
    settings: settings::Settings,
    format: ExportFormat,
    output: Option<&Path>,
    color: ColorMode,
    text_input: bool,
) -> anyhow::Result<()> {
    if !file_path.exists() {
        anyhow::bail!("File not found: {}", file_path.display());
    }

    let ocr: Option<Arc<dyn OcrEngine>> = if settings.ocr_enabled {
        let engine = TesseractCli::new(&settings.tesseract);
        if !text_input && !engine.is_available() {
            tracing::warn!(
                program = %settings.tesseract.display(),
                "tesseract not found; image-only resumes will yield no text"
            );
        }
        Some(Arc::new(engine) as Arc<dyn OcrEngine>)
    } else {
        None
    };
    let recognizer = settings
        .recognizer
        .map(|r| Arc::new(r) as Arc<dyn EntityRecognizer>);
    let pipeline = cvsift_ingest::mupdf_pipeline(settings.pipeline, ocr, recognizer);

    let generated_at = chrono::Local::now().naive_local();
    let outcome = if text_input {
        let text = std::fs::read_to_string(file_path)?;
        pipeline.run_text_at(text, generated_at).await?
    } else {
        let bytes = std::fs::read(file_path)?;
        pipeline.run_at(bytes, generated_at).await?
    };

    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file_path.display().to_string());

    // Summary goes to stderr so stdout stays a clean report.
    let mut stderr = std::io::stderr();
    output::print_summary(&mut stderr, &file_name, &outcome, color)?;

    match output {
        Some(path) => {
            write_export(outcome.record(), generated_at, format, path)?;
            tracing::info!(path = %path.display(), %format, "report written");
        }
        None => {
            let rendered = match format {
                ExportFormat::Text => outcome.report().to_string(),
                other => export_record(outcome.record(), generated_at, other)?,
            };
            let mut stdout = std::io::stdout();
            writeln!(stdout, "{}", rendered)?;
        }
    }
    Ok(())
}
