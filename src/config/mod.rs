//! Application Configuration
//!
//! Batch paths, preprocessing, OCR backend and redaction policy, stored in
//! TOML format.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::redaction::{ClassifierPolicy, HeaderDictionary};
use crate::vision::OcrBackend;

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Input/output locations
    pub paths: PathSettings,
    /// OCR page preparation
    pub preprocess: PreprocessSettings,
    /// OCR backend settings
    pub ocr: OcrSettings,
    /// Redaction policy
    pub redaction: RedactionSettings,
}

/// Input/output locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Directory scanned for images
    pub input_dir: PathBuf,
    /// Directory receiving redacted images and the report
    pub output_dir: PathBuf,
    /// Prefix added to redacted image file names
    pub output_prefix: String,
    /// Report file name, relative to the output directory
    pub report_file: String,
    /// Accepted image extensions (case-insensitive)
    pub extensions: Vec<String>,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("images"),
            output_dir: PathBuf::from("output"),
            output_prefix: "redacted_".to_string(),
            report_file: "report.json".to_string(),
            extensions: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
        }
    }
}

/// OCR page preparation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessSettings {
    /// Apply contrast and thresholding (grayscale is always applied)
    pub enabled: bool,
    /// Contrast factor (1.0 = unchanged)
    pub contrast: f32,
    /// Neighbourhood radius for the adaptive threshold (0 = no threshold)
    pub block_radius: u32,
}

impl Default for PreprocessSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            contrast: 1.0,
            block_radius: 15,
        }
    }
}

/// OCR backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Backend to use
    pub backend: OcrBackend,
    /// OCR program (command backend)
    pub program: String,
    /// Arguments placed before the page path (command backend)
    pub args: Vec<String>,
    /// Directory holding `<image name>.json` files (sidecar backend).
    /// Defaults to the input directory.
    pub sidecar_dir: Option<PathBuf>,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            backend: OcrBackend::Command,
            program: "easyocr-json".to_string(),
            args: vec!["--lang".to_string(), "en".to_string()],
            sidecar_dir: None,
        }
    }
}

/// Redaction policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactionSettings {
    /// Header matches must score above this (0 - 100)
    pub header_threshold: f64,
    /// Rightward widening of patient headers, as a multiple of their width
    pub expansion_factor: f32,
    /// Classification word lists and limits
    #[serde(flatten)]
    pub policy: ClassifierPolicy,
    /// Canonical header labels and their known misreadings
    pub headers: HeaderDictionary,
}

impl Default for RedactionSettings {
    fn default() -> Self {
        Self {
            header_threshold: 85.0,
            expansion_factor: 2.5,
            policy: ClassifierPolicy::default(),
            headers: HeaderDictionary::default(),
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {:?}", path))?;
    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Invalid config {:?}", path))?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
