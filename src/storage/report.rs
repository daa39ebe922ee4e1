//! Extraction report storage

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::redaction::ExtractionRecord;

/// Image file name -> records in OCR order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report {
    images: BTreeMap<String, Vec<ExtractionRecord>>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the results for one image, replacing any earlier entry
    pub fn insert(&mut self, image: impl Into<String>, records: Vec<ExtractionRecord>) {
        self.images.insert(image.into(), records);
    }

    #[cfg(test)]
    pub fn get(&self, image: &str) -> Option<&[ExtractionRecord]> {
        self.images.get(image).map(Vec::as_slice)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.images.len()
    }
}

/// Load a report from file
#[cfg(test)]
pub fn load_report(path: &Path) -> Result<Report> {
    let content = std::fs::read_to_string(path)?;
    let report: Report = serde_json::from_str(&content)?;
    Ok(report)
}

/// Save a report to file
pub fn save_report(report: &Report, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(report)?;
    std::fs::write(path, content)?;
    Ok(())
}
