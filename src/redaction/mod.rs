//! PII Redaction Engine
//!
//! Decides which OCR fragments on a scanned medical record identify a patient
//! and where to black them out.

pub mod classifier;
pub mod geometry;
pub mod header;
pub mod normalize;
pub mod pipeline;

pub use classifier::ClassifierPolicy;
pub use header::{FuzzyMatcher, HeaderDictionary, StrsimMatcher};
pub use pipeline::{ExtractionRecord, RedactionPipeline};
