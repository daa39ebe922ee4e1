//! Batch Coordinator
//!
//! Walks the input directory and runs each image through preprocessing, OCR
//! and the redaction pipeline. Images are processed one at a time; a failure
//! on one image is logged and the batch moves on.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::error::{RedactError, RedactResult};
use crate::redaction::{ExtractionRecord, FuzzyMatcher, RedactionPipeline, StrsimMatcher};
use crate::storage::{self, Report};
use crate::vision::{engine_from_config, preprocess_for_ocr, OcrEngine};

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Images redacted and reported
    pub processed: usize,
    /// Images that failed, with the reason
    pub failed: Vec<(PathBuf, String)>,
    /// Where the report was written, if anything was written
    pub report_path: Option<PathBuf>,
}

impl BatchSummary {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Batch redaction application
pub struct RedactionApp<M = StrsimMatcher> {
    config: AppConfig,
    pipeline: RedactionPipeline<M>,
    ocr: Box<dyn OcrEngine>,
}

impl RedactionApp<StrsimMatcher> {
    /// Create the application with the configured OCR backend
    pub fn new(config: AppConfig) -> Self {
        let pipeline = RedactionPipeline::from_settings(&config.redaction);
        let ocr = engine_from_config(&config.ocr, &config.paths.input_dir);
        Self::with_parts(config, pipeline, ocr)
    }
}

impl<M: FuzzyMatcher> RedactionApp<M> {
    /// Create the application from explicit parts
    pub fn with_parts(config: AppConfig, pipeline: RedactionPipeline<M>, ocr: Box<dyn OcrEngine>) -> Self {
        Self {
            config,
            pipeline,
            ocr,
        }
    }

    /// Redact every image in the input directory and write the report
    pub fn run(&mut self) -> Result<BatchSummary> {
        let paths = &self.config.paths;
        info!("Scanning folder: {:?}", paths.input_dir);

        let files = storage::list_images(&paths.input_dir, &paths.extensions)
            .with_context(|| format!("Failed to read input directory {:?}", paths.input_dir))?;

        let mut summary = BatchSummary::default();
        if files.is_empty() {
            warn!("No images found in {:?}", paths.input_dir);
            return Ok(summary);
        }

        std::fs::create_dir_all(&paths.output_dir)
            .with_context(|| format!("Failed to create output directory {:?}", paths.output_dir))?;

        let start = Instant::now();
        let mut report = Report::new();

        for path in &files {
            let name = file_name(path);
            info!("Processing: {}", name);

            match self.process_image(path, &name) {
                Ok(records) => {
                    report.insert(name, records);
                    summary.processed += 1;
                }
                Err(e) => {
                    error!("{}", e);
                    summary.failed.push((e.path().to_path_buf(), e.to_string()));
                }
            }
        }

        let report_path = self.config.paths.output_dir.join(&self.config.paths.report_file);
        storage::report::save_report(&report, &report_path)
            .with_context(|| format!("Failed to write report {:?}", report_path))?;

        info!(
            "Batch complete in {:?}: {} redacted, {} failed, report at {:?}",
            start.elapsed(),
            summary.processed,
            summary.failed.len(),
            report_path
        );
        summary.report_path = Some(report_path);

        Ok(summary)
    }

    /// Redact a single image and return its report records
    fn process_image(&mut self, path: &Path, name: &str) -> RedactResult<Vec<ExtractionRecord>> {
        let original = image::open(path).map_err(|source| RedactError::ImageDecode {
            path: path.to_path_buf(),
            source,
        })?;

        let page = preprocess_for_ocr(&original, &self.config.preprocess);

        let detections = self
            .ocr
            .detect_text(name, &page)
            .map_err(|source| RedactError::Ocr {
                path: path.to_path_buf(),
                source,
            })?;

        let (redacted, result) = self.pipeline.redact(&original, &detections);

        let save_path = storage::output_path(
            &self.config.paths.output_dir,
            &self.config.paths.output_prefix,
            path,
        );
        redacted.save(&save_path).map_err(|source| RedactError::ImageSave {
            path: save_path.clone(),
            source,
        })?;

        info!(
            "  {} redactions of {} detections, saved to {:?}",
            result.redactions.len(),
            result.records.len(),
            save_path
        );

        Ok(result.records)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
