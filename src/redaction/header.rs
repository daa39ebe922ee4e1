//! Header correction
//!
//! Maps noisy OCR renderings of form headers ("Palicnt Name", "UH1D No") to
//! their canonical label using a fuzzy matcher. Correction is best effort:
//! anything scoring at or below the threshold passes through untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strsim::jaro_winkler;
use tracing::debug;

use super::normalize::normalize_header;

/// Fuzzy string matching capability.
///
/// Scores are on a 0..100 scale.
pub trait FuzzyMatcher {
    /// Return the best scoring candidate and its score, or `None` when
    /// there are no candidates.
    fn best_match<'c>(&self, query: &str, candidates: &[&'c str]) -> Option<(&'c str, f64)>;
}

/// Shortest-to-longest length ratio below which two strings never match.
/// Jaro-Winkler rewards a shared prefix, so "Agent" would otherwise match "Age".
const MIN_LENGTH_RATIO: f64 = 0.75;

/// Default matcher backed by `strsim` Jaro-Winkler similarity
#[derive(Debug, Clone, Copy, Default)]
pub struct StrsimMatcher;

impl StrsimMatcher {
    /// Similarity of two strings on a 0..100 scale
    pub fn score(a: &str, b: &str) -> f64 {
        let a = a.to_lowercase();
        let b = b.to_lowercase();

        // OCR drops and invents periods, so compare the bare alphanumerics too
        let a_bare: String = a.chars().filter(|c| c.is_alphanumeric()).collect();
        let b_bare: String = b.chars().filter(|c| c.is_alphanumeric()).collect();

        let (a_len, b_len) = if !a_bare.is_empty() && !b_bare.is_empty() {
            (a_bare.chars().count(), b_bare.chars().count())
        } else {
            (a.chars().count(), b.chars().count())
        };
        let (short, long) = (a_len.min(b_len), a_len.max(b_len));
        if long == 0 || (short as f64) < MIN_LENGTH_RATIO * long as f64 {
            return 0.0;
        }

        let base = jaro_winkler(&a, &b);
        let bare = if !a_bare.is_empty() && !b_bare.is_empty() {
            jaro_winkler(&a_bare, &b_bare)
        } else {
            0.0
        };

        base.max(bare) * 100.0
    }
}

impl FuzzyMatcher for StrsimMatcher {
    fn best_match<'c>(&self, query: &str, candidates: &[&'c str]) -> Option<(&'c str, f64)> {
        let mut best: Option<(&'c str, f64)> = None;
        for &candidate in candidates {
            let score = Self::score(query, candidate);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((candidate, score));
            }
        }
        best
    }
}

/// Canonical header labels and the OCR misreadings seen for each.
///
/// Matching runs against the labels only; the misreadings document what the
/// matcher is expected to absorb.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderDictionary {
    entries: BTreeMap<String, Vec<String>>,
}

impl HeaderDictionary {
    /// Build a dictionary from label/misreading pairs
    pub fn new<I, L, M>(entries: I) -> Self
    where
        I: IntoIterator<Item = (L, Vec<M>)>,
        L: Into<String>,
        M: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(label, misreads)| {
                    (label.into(), misreads.into_iter().map(Into::into).collect())
                })
                .collect(),
        }
    }

    /// Canonical labels, in dictionary order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Known misreadings for a label
    #[cfg(test)]
    pub fn misreadings(&self, label: &str) -> &[String] {
        self.entries.get(label).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for HeaderDictionary {
    fn default() -> Self {
        Self::new([
            ("Patient Name", vec!["Palicnt Name", "Patlent Name", "Patient Narne", "Pt Name"]),
            ("Age", vec!["Aqe", "Agc", "A9e"]),
            ("Sex", vec!["5ex", "Sx", "Sex."]),
            ("IPD No", vec!["1PD No", "IPO No", "IPD N0", "lPD No"]),
            ("UHID No", vec!["UH1D No", "UHlD No", "UHID N0", "UHIO No"]),
            ("Bed No", vec!["Bcd No", "Bed N0", "8ed No"]),
            ("Date", vec!["Dale", "Dat", "0ate"]),
            ("Dr.", vec!["Dn.", "Dr", "Or."]),
        ])
    }
}

/// Result of correcting one OCR fragment
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderMatch {
    /// Canonical label, if the best match cleared the threshold
    pub canonical: Option<String>,
    /// Canonical label when accepted, otherwise the raw input
    pub text: String,
    /// Similarity of the best candidate (0..100)
    pub similarity: f64,
}

/// Fuzzy header corrector
pub struct HeaderCorrector<M = StrsimMatcher> {
    dictionary: HeaderDictionary,
    matcher: M,
    threshold: f64,
}

impl HeaderCorrector<StrsimMatcher> {
    /// Create a corrector using the default matcher
    pub fn new(dictionary: HeaderDictionary, threshold: f64) -> Self {
        Self::with_matcher(dictionary, threshold, StrsimMatcher)
    }
}

impl<M: FuzzyMatcher> HeaderCorrector<M> {
    /// Create a corrector with an injected matcher
    pub fn with_matcher(dictionary: HeaderDictionary, threshold: f64, matcher: M) -> Self {
        Self {
            dictionary,
            matcher,
            threshold,
        }
    }

    /// Correct a raw OCR string to a canonical header label
    pub fn correct(&self, raw: &str) -> HeaderMatch {
        let query = normalize_header(raw);
        let labels: Vec<&str> = self.dictionary.labels().collect();

        let best = if query.is_empty() {
            None
        } else {
            self.matcher.best_match(&query, &labels)
        };

        match best {
            Some((label, score)) if score > self.threshold => {
                debug!("Header {:?} corrected to {:?} ({:.1})", raw, label, score);
                HeaderMatch {
                    canonical: Some(label.to_string()),
                    text: label.to_string(),
                    similarity: score,
                }
            }
            other => HeaderMatch {
                canonical: None,
                text: raw.to_string(),
                similarity: other.map_or(0.0, |(_, score)| score),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corrector() -> HeaderCorrector {
        HeaderCorrector::new(HeaderDictionary::default(), 85.0)
    }

    /// Matcher that always returns a fixed score for the first candidate
    struct FixedScore(f64);

    impl FuzzyMatcher for FixedScore {
        fn best_match<'c>(&self, _query: &str, candidates: &[&'c str]) -> Option<(&'c str, f64)> {
            candidates.first().map(|c| (*c, self.0))
        }
    }

    #[test]
    fn test_score_identical() {
        assert!((StrsimMatcher::score("Age", "age") - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_score_unrelated_is_low() {
        assert!(StrsimMatcher::score("xyz123", "Patient Name") < 60.0);
    }

    #[test]
    fn test_prefix_only_words_are_not_headers() {
        for text in ["Agent", "Sexual", "Se", "Patient Name and Address"] {
            let result = corrector().correct(text);
            assert_eq!(result.canonical, None, "{} matched {:?}", text, result.text);
            assert_eq!(result.text, text);
        }
    }

    #[test]
    fn test_score_length_ratio() {
        assert_eq!(StrsimMatcher::score("Agent", "Age"), 0.0);
        assert!(StrsimMatcher::score("Aqe", "Age") > 0.0);
        assert!(StrsimMatcher::score("Dr", "Dr.") > 85.0);
    }

    #[test]
    fn test_correct_misread_patient_name() {
        let result = corrector().correct("Palicnt Name");
        assert_eq!(result.canonical.as_deref(), Some("Patient Name"));
        assert_eq!(result.text, "Patient Name");
        assert!(result.similarity > 85.0, "score was {}", result.similarity);
    }

    #[test]
    fn test_correct_strips_label_punctuation() {
        let result = corrector().correct("Patient Name:");
        assert_eq!(result.canonical.as_deref(), Some("Patient Name"));

        let result = corrector().correct("UHID No:");
        assert_eq!(result.canonical.as_deref(), Some("UHID No"));
    }

    #[test]
    fn test_correct_passes_through_unknown_text() {
        let result = corrector().correct("xyz123");
        assert_eq!(result.canonical, None);
        assert_eq!(result.text, "xyz123");
        assert!(result.similarity <= 85.0);
    }

    #[test]
    fn test_correct_empty_text() {
        let result = corrector().correct(" : ");
        assert_eq!(result.canonical, None);
        assert_eq!(result.text, " : ");
        assert_eq!(result.similarity, 0.0);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let at = HeaderCorrector::with_matcher(HeaderDictionary::default(), 85.0, FixedScore(85.0));
        assert_eq!(at.correct("anything").canonical, None);

        let above = HeaderCorrector::with_matcher(HeaderDictionary::default(), 85.0, FixedScore(85.1));
        assert!(above.correct("anything").canonical.is_some());
    }

    #[test]
    fn test_custom_dictionary() {
        let dict = HeaderDictionary::new([("Ward", vec!["Wand"])]);
        let corrector = HeaderCorrector::new(dict, 85.0);
        assert_eq!(corrector.correct("Ward:").canonical.as_deref(), Some("Ward"));
        assert_eq!(corrector.correct("Patient Name").canonical, None);
    }

    #[test]
    fn test_default_dictionary_covers_required_labels() {
        let dict = HeaderDictionary::default();
        for label in ["Patient Name", "Age", "Sex", "IPD No", "UHID No", "Date", "Dr."] {
            assert!(dict.labels().any(|l| l == label), "missing {}", label);
        }
        assert!(!dict.misreadings("Patient Name").is_empty());
        assert!(dict.misreadings("Nope").is_empty());
    }
}
