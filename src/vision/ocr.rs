//! OCR backends
//!
//! The recognizer itself lives outside this crate. Backends hand it a
//! preprocessed page and read back `[box, text, confidence]` triples in the
//! EasyOCR `readtext` layout:
//!
//! ```text
//! [[[[x, y], [x, y], [x, y], [x, y]], "Patient Name", 0.71], ...]
//! ```

use image::{GrayImage, ImageFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;
use tracing::debug;

use super::{Detection, OcrBackend, Quad};
use crate::config::OcrSettings;
use crate::error::OcrError;

/// Text detection capability
pub trait OcrEngine {
    /// Detect text on a preprocessed page.
    ///
    /// `name` is the source file name; `image` keeps the original geometry so
    /// returned boxes are in original pixel coordinates.
    fn detect_text(&mut self, name: &str, image: &GrayImage) -> Result<Vec<Detection>, OcrError>;
}

#[derive(Debug, Deserialize)]
struct RawDetection(Vec<(f32, f32)>, String, f32);

/// Parse EasyOCR-style JSON output into detections
pub fn parse_detections(json: &str) -> Result<Vec<Detection>, OcrError> {
    let raw: Vec<RawDetection> = serde_json::from_str(json)?;

    raw.into_iter()
        .enumerate()
        .map(|(index, RawDetection(points, text, confidence))| {
            let quad: Quad = points
                .as_slice()
                .try_into()
                .map_err(|_| OcrError::BadQuad {
                    index,
                    points: points.len(),
                })?;
            Ok(Detection::new(quad, text, confidence))
        })
        .collect()
}

/// Runs an external OCR program once per page.
///
/// The page is written to a temporary PNG whose path is appended to `args`;
/// the program must print detections as JSON on stdout.
#[derive(Debug, Clone)]
pub struct CommandOcr {
    program: String,
    args: Vec<String>,
}

impl CommandOcr {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl OcrEngine for CommandOcr {
    fn detect_text(&mut self, name: &str, image: &GrayImage) -> Result<Vec<Detection>, OcrError> {
        let start = Instant::now();

        let page = tempfile::Builder::new()
            .prefix("medredact-")
            .suffix(".png")
            .tempfile()?;
        image.save_with_format(page.path(), ImageFormat::Png)?;

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(page.path())
            .output()
            .map_err(|source| OcrError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(OcrError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let detections = parse_detections(&String::from_utf8_lossy(&output.stdout))?;
        debug!(
            "OCR on {} complete in {:?}: {} detections",
            name,
            start.elapsed(),
            detections.len()
        );
        Ok(detections)
    }
}

/// Replays pre-computed detections stored next to the batch
#[derive(Debug, Clone)]
pub struct SidecarOcr {
    dir: PathBuf,
}

impl SidecarOcr {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Sidecar file for an image name
    pub fn sidecar_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

impl OcrEngine for SidecarOcr {
    fn detect_text(&mut self, name: &str, _image: &GrayImage) -> Result<Vec<Detection>, OcrError> {
        let path = self.sidecar_path(name);
        let content = std::fs::read_to_string(&path)?;
        let detections = parse_detections(&content)?;
        debug!("Loaded {} detections from {:?}", detections.len(), path);
        Ok(detections)
    }
}

/// Build the configured OCR backend.
///
/// `input_dir` is the sidecar directory fallback when none is configured.
pub fn engine_from_config(settings: &OcrSettings, input_dir: &Path) -> Box<dyn OcrEngine> {
    match settings.backend {
        OcrBackend::Command => Box::new(CommandOcr::new(settings.program.clone(), settings.args.clone())),
        OcrBackend::Sidecar => {
            let dir = settings
                .sidecar_dir
                .clone()
                .unwrap_or_else(|| input_dir.to_path_buf());
            Box::new(SidecarOcr::new(dir))
        }
    }
}
