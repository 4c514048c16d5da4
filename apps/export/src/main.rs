use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use screenplay_export::config::{Config, ExportSettings};
use screenplay_export::writer::{DisplayListWriter, RecordingWriter};
use screenplay_export::{export_or_none, export_or_none_with, ExportOutcome};

/// Paginate a Fountain screenplay into a positioned display list.
#[derive(Parser, Debug)]
#[command(name = "screenplay-export", version, about)]
struct Cli {
    /// Screenplay text file
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output path (defaults to <EXPORT_DIR>/<input stem>.pages.json)
    #[arg(short, long, env = "SCREENPLAY_OUTPUT")]
    output: Option<PathBuf>,

    /// JSON export settings file
    #[arg(short, long, env = "SCREENPLAY_SETTINGS")]
    settings: Option<PathBuf>,

    /// Run the layout pass without writing a file
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load configuration first so RUST_LOG from .env applies to the filter
    let config = Config::from_env()?;
    let cli = Cli::parse();

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting screenplay-export v{}", env!("CARGO_PKG_VERSION"));

    let settings = match cli.settings.as_ref().or(config.settings_path.as_ref()) {
        Some(path) => ExportSettings::load(path)?,
        None => ExportSettings::default(),
    };

    let source = match &cli.input {
        Some(path) => Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read screenplay '{}'", path.display()))?,
        ),
        None => None,
    };

    let outcome = if cli.dry_run {
        export_or_none(source, &settings, RecordingWriter::new()).await
    } else {
        let destination = cli
            .output
            .clone()
            .unwrap_or_else(|| default_destination(&config.export_dir, cli.input.as_deref()));
        let page_size = settings.page_size;
        export_or_none_with(source, &settings, || {
            DisplayListWriter::create(&destination, page_size)
        })
        .await
    };

    Ok(report(outcome.as_ref()))
}

fn default_destination(export_dir: &Path, input: Option<&Path>) -> PathBuf {
    let stem = input
        .and_then(Path::file_stem)
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "screenplay".to_string());
    export_dir.join(format!("{stem}.pages.json"))
}

fn report(outcome: Option<&ExportOutcome>) -> ExitCode {
    match outcome {
        Some(outcome) => {
            println!(
                "Exported {} page(s), {} scene(s) to {}",
                outcome.summary.pages, outcome.summary.scenes, outcome.document.location
            );
            ExitCode::SUCCESS
        }
        None => {
            println!("Export failed; see log for details");
            ExitCode::FAILURE
        }
    }
}
