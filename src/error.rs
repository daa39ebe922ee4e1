//! Per-file failure kinds
//!
//! A failure on one image is reported and counted but never stops the batch.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by an OCR backend
#[derive(Debug, Error)]
pub enum OcrError {
    /// The OCR program could not be started
    #[error("failed to launch OCR program `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// The OCR program exited unsuccessfully
    #[error("OCR program exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    /// The backend's output could not be parsed
    #[error("malformed OCR output: {0}")]
    Malformed(#[from] serde_json::Error),
    /// A detection box did not have exactly four corners
    #[error("detection {index} has {points} box points, expected 4")]
    BadQuad { index: usize, points: usize },
    /// I/O failure while handing the image to the backend
    #[error("OCR I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Image could not be written for the backend
    #[error("failed to encode image for OCR: {0}")]
    Encode(#[from] image::ImageError),
}

/// Errors that fail a single image
#[derive(Debug, Error)]
pub enum RedactError {
    /// The input could not be opened or decoded
    #[error("unreadable image {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// The OCR backend failed for this image
    #[error("OCR failed for {path}: {source}")]
    Ocr {
        path: PathBuf,
        #[source]
        source: OcrError,
    },
    /// The redacted image could not be written
    #[error("failed to save {path}: {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl RedactError {
    /// Path of the file the error relates to
    pub fn path(&self) -> &std::path::Path {
        match self {
            RedactError::ImageDecode { path, .. }
            | RedactError::Ocr { path, .. }
            | RedactError::ImageSave { path, .. } => path,
        }
    }
}

pub type RedactResult<T> = std::result::Result<T, RedactError>;
