//! Per-image redaction pipeline
//!
//! Runs every detection through header correction, classification and
//! geometry, then paints the resulting rectangles. Detections are handled
//! independently; their order only affects the order of the report.

use image::{DynamicImage, Luma, Rgb, Rgba};
use imageproc::drawing::{draw_filled_rect_mut, Canvas};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::classifier::{PiiCategory, PiiClassifier};
use super::geometry::{RedactionGeometry, RedactionRect};
use super::header::{FuzzyMatcher, HeaderCorrector, StrsimMatcher};
use crate::config::RedactionSettings;
use crate::vision::Detection;

/// Report entry for one detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRecord {
    /// Raw OCR text
    pub text: String,
    /// Corrected header label, or the raw text when uncorrected
    pub cleaned: String,
    /// PII category, `null` when the fragment was left visible
    pub pii_type: Option<PiiCategory>,
    /// OCR confidence
    pub confidence: f32,
}

/// A rectangle and the category that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redaction {
    pub category: PiiCategory,
    pub rect: RedactionRect,
}

/// Decisions for one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageRedaction {
    /// One record per detection, in OCR order
    pub records: Vec<ExtractionRecord>,
    /// One rectangle per PII detection, in OCR order
    pub redactions: Vec<Redaction>,
}

impl PageRedaction {
    pub fn rects(&self) -> impl Iterator<Item = &RedactionRect> {
        self.redactions.iter().map(|r| &r.rect)
    }
}

/// Classifies detections and computes redaction rectangles
pub struct RedactionPipeline<M = StrsimMatcher> {
    corrector: HeaderCorrector<M>,
    classifier: PiiClassifier,
    geometry: RedactionGeometry,
}

impl RedactionPipeline<StrsimMatcher> {
    /// Build the pipeline from configured policy
    pub fn from_settings(settings: &RedactionSettings) -> Self {
        Self::new(
            HeaderCorrector::new(settings.headers.clone(), settings.header_threshold),
            PiiClassifier::new(settings.policy.clone()),
            RedactionGeometry::new(settings.expansion_factor),
        )
    }
}

impl<M: FuzzyMatcher> RedactionPipeline<M> {
    pub fn new(corrector: HeaderCorrector<M>, classifier: PiiClassifier, geometry: RedactionGeometry) -> Self {
        Self {
            corrector,
            classifier,
            geometry,
        }
    }

    /// Decide what to redact on a page of the given width
    pub fn analyze(&self, detections: &[Detection], image_width: u32) -> PageRedaction {
        let mut page = PageRedaction::default();

        for detection in detections {
            let header = self.corrector.correct(&detection.text);
            let category = self
                .classifier
                .classify(&detection.text, header.canonical.as_deref());

            if let Some(category) = category {
                let rect = self.geometry.compute_rect(&detection.quad, category, image_width);
                if category == PiiCategory::PatientInfo {
                    info!("  -> Redacting (expanded): {}", detection.text);
                } else {
                    info!("  -> Redacting: {}", detection.text);
                }
                page.redactions.push(Redaction { category, rect });
            }

            page.records.push(ExtractionRecord {
                text: detection.text.clone(),
                cleaned: header.text,
                pii_type: category,
                confidence: detection.confidence,
            });
        }

        page
    }

    /// Analyze a page and paint its redactions onto a copy of the image
    pub fn redact(&self, image: &DynamicImage, detections: &[Detection]) -> (DynamicImage, PageRedaction) {
        let page = self.analyze(detections, image.width());
        let rects: Vec<RedactionRect> = page.rects().copied().collect();
        (paint_redactions(image, &rects), page)
    }
}

/// Paint opaque black rectangles, keeping the image's channel layout where
/// the output encoders allow it
pub fn paint_redactions(image: &DynamicImage, rects: &[RedactionRect]) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(gray) => {
            let mut out = gray.clone();
            fill(&mut out, rects, Luma([0]));
            DynamicImage::ImageLuma8(out)
        }
        img if img.color().has_alpha() => {
            let mut out = img.to_rgba8();
            fill(&mut out, rects, Rgba([0, 0, 0, 255]));
            DynamicImage::ImageRgba8(out)
        }
        img => {
            let mut out = img.to_rgb8();
            fill(&mut out, rects, Rgb([0, 0, 0]));
            DynamicImage::ImageRgb8(out)
        }
    }
}

fn fill<C: Canvas>(canvas: &mut C, rects: &[RedactionRect], color: C::Pixel) {
    let (width, height) = canvas.dimensions();
    for rect in rects.iter().filter_map(|r| r.to_rect(width, height)) {
        draw_filled_rect_mut(canvas, rect, color);
    }
}
