//! Vision/OCR Layer
//!
//! Prepares scanned pages for OCR and turns backend output into detections.
//! Supports two OCR backends:
//! - An external OCR program invoked per image (EasyOCR-style JSON on stdout)
//! - Pre-computed sidecar JSON files, one per image

pub mod ocr;
pub mod ocr_preprocess;

pub use ocr::{engine_from_config, OcrEngine};
pub use ocr_preprocess::preprocess_for_ocr;

/// Quadrilateral box reported by OCR, clockwise from the top-left corner
pub type Quad = [(f32, f32); 4];

/// OCR backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrBackend {
    /// Run an external OCR program on each preprocessed page
    #[default]
    Command,
    /// Replay detections from `<sidecar_dir>/<image name>.json`
    Sidecar,
}

/// One recognized text fragment
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Box corners in original image coordinates
    pub quad: Quad,
    /// Recognized text
    pub text: String,
    /// Recognition confidence (0.0 - 1.0)
    pub confidence: f32,
}

impl Detection {
    pub fn new(quad: Quad, text: impl Into<String>, confidence: f32) -> Self {
        Self {
            quad,
            text: text.into(),
            confidence,
        }
    }

    /// Axis-aligned detection from two corners
    #[cfg(test)]
    pub fn from_corners(x0: f32, y0: f32, x1: f32, y1: f32, text: impl Into<String>, confidence: f32) -> Self {
        Self::new([(x0, y0), (x1, y0), (x1, y1), (x0, y1)], text, confidence)
    }
}
