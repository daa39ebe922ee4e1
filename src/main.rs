//! medredact - PII redaction for scanned medical records
//!
//! Finds patient-identifying text on scanned forms (dates, doctor names,
//! patient header fields, long ID numbers) via OCR and paints it out.

mod app;
mod config;
mod error;
mod redaction;
mod storage;
mod vision;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::app::RedactionApp;
use crate::config::AppConfig;
use crate::vision::OcrBackend;

/// medredact - batch PII redaction for scanned medical records
#[derive(Parser, Debug)]
#[command(name = "medredact")]
#[command(about = "Black out patient-identifying text in scanned medical-record images")]
struct Args {
    /// Configuration file (defaults to config.toml in the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of images to redact
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory for redacted images and the report
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report file name inside the output directory
    #[arg(long)]
    report: Option<String>,

    /// Read detections from <DIR>/<image name>.json instead of running OCR
    #[arg(long, value_name = "DIR")]
    sidecar: Option<PathBuf>,

    /// OCR program to run on each page (prints EasyOCR-style JSON)
    #[arg(long)]
    ocr_program: Option<String>,

    /// Write the effective configuration to this path and exit
    #[arg(long, value_name = "PATH")]
    write_config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let mut config = load_or_create_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args);

    if let Some(path) = &args.write_config {
        config::save_config(&config, path)
            .with_context(|| format!("Failed to write config {:?}", path))?;
        info!("Wrote configuration to {:?}", path);
        return Ok(ExitCode::SUCCESS);
    }

    let mut app = RedactionApp::new(config);
    let summary = app.run()?;

    if summary.has_failures() {
        for (path, reason) in &summary.failed {
            error!("Failed: {:?}: {}", path, reason);
        }
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

/// Load configuration from an explicit path, the user config directory, or
/// fall back to defaults
fn load_or_create_config(explicit: Option<&std::path::Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        let config = config::load_config(path)?;
        info!("Loaded configuration from {:?}", path);
        return Ok(config);
    }

    if let Ok(config_dir) = storage::get_config_dir() {
        let config_path = config_dir.join("config.toml");
        if config_path.exists() {
            let config = config::load_config(&config_path)?;
            info!("Loaded configuration from {:?}", config_path);
            return Ok(config);
        }
    }

    info!("Using default configuration");
    Ok(AppConfig::default())
}

fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(input) = &args.input {
        config.paths.input_dir = input.clone();
    }
    if let Some(output) = &args.output {
        config.paths.output_dir = output.clone();
    }
    if let Some(report) = &args.report {
        config.paths.report_file = report.clone();
    }
    if let Some(dir) = &args.sidecar {
        config.ocr.backend = OcrBackend::Sidecar;
        config.ocr.sidecar_dir = Some(dir.clone());
    }
    if let Some(program) = &args.ocr_program {
        config.ocr.backend = OcrBackend::Command;
        config.ocr.program = program.clone();
    }
}
