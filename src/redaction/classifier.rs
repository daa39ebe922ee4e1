//! PII classification rules
//!
//! A fragment is assigned at most one category. Rules are evaluated in order
//! and the first match wins, so a date that happens to start with "Dr" is
//! still a date.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use tracing::debug;

use super::normalize::normalize_date;

/// Category of personally identifiable information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PiiCategory {
    /// Calendar date (admission, birth, visit)
    Date,
    /// Attending doctor or other named person with a title
    Doctor,
    /// Patient header label whose value sits beside it
    PatientInfo,
    /// Long numeric identifier (record, IPD, UHID numbers)
    IdNum,
}

impl PiiCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PiiCategory::Date => "DATE",
            PiiCategory::Doctor => "DOCTOR",
            PiiCategory::PatientInfo => "PATIENT_INFO",
            PiiCategory::IdNum => "ID_NUM",
        }
    }
}

impl fmt::Display for PiiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunable word lists and limits used by the rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierPolicy {
    /// Lower-case prefixes that introduce a person's name
    pub doctor_prefixes: Vec<String>,
    /// Prefix tokens that count as a doctor reference on their own
    pub bare_doctor_prefixes: Vec<String>,
    /// Substrings that veto the doctor rule ("drug", "dose", ...)
    pub doctor_guards: Vec<String>,
    /// Canonical header labels treated as patient information
    pub patient_labels: Vec<String>,
    /// Digit runs longer than this are identifiers
    pub id_min_len: usize,
}

impl Default for ClassifierPolicy {
    fn default() -> Self {
        Self {
            doctor_prefixes: ["dr", "dn", "mr", "ms", "prof"].map(String::from).to_vec(),
            bare_doctor_prefixes: ["dr", "dr.", "dn", "dn."].map(String::from).to_vec(),
            doctor_guards: ["drug", "dose", "date", "sign"].map(String::from).to_vec(),
            patient_labels: ["Patient Name", "Age", "Sex", "IPD No", "UHID No", "Bed No"]
                .map(String::from)
                .to_vec(),
            id_min_len: 6,
        }
    }
}

/// A single classification rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Date,
    Doctor,
    PatientHeader,
    IdNumber,
}

impl Rule {
    /// Default evaluation order
    pub const ORDERED: [Rule; 4] = [Rule::Date, Rule::Doctor, Rule::PatientHeader, Rule::IdNumber];

    /// Category assigned when the rule fires
    pub fn category(&self) -> PiiCategory {
        match self {
            Rule::Date => PiiCategory::Date,
            Rule::Doctor => PiiCategory::Doctor,
            Rule::PatientHeader => PiiCategory::PatientInfo,
            Rule::IdNumber => PiiCategory::IdNum,
        }
    }

    /// Whether the rule fires for this fragment
    pub fn matches(&self, policy: &ClassifierPolicy, raw: &str, header: Option<&str>) -> bool {
        match self {
            Rule::Date => is_date(raw),
            Rule::Doctor => is_doctor(policy, raw),
            Rule::PatientHeader => header
                .map(|label| policy.patient_labels.iter().any(|l| l == label))
                .unwrap_or(false),
            Rule::IdNumber => is_id_number(policy, raw),
        }
    }
}

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[0-9]{1,2}\.[0-9]{1,2}\.[0-9]{2,4}").expect("date pattern is valid")
    })
}

/// Date check on the date-normalized text
pub fn is_date(raw: &str) -> bool {
    date_pattern().is_match(&normalize_date(raw))
}

/// Title-prefixed name check
pub fn is_doctor(policy: &ClassifierPolicy, raw: &str) -> bool {
    let text = raw.trim().to_lowercase();

    if policy.doctor_guards.iter().any(|g| text.contains(g.as_str())) {
        return false;
    }

    let long_enough = text.chars().count() > 3;
    if long_enough && policy.doctor_prefixes.iter().any(|p| text.starts_with(p.as_str())) {
        return true;
    }

    policy.bare_doctor_prefixes.iter().any(|p| *p == text)
}

/// Long pure-digit identifier check
pub fn is_id_number(policy: &ClassifierPolicy, raw: &str) -> bool {
    !raw.is_empty()
        && raw.chars().all(|c| c.is_ascii_digit())
        && raw.chars().count() > policy.id_min_len
}

/// Ordered rule list classifier
#[derive(Debug, Clone)]
pub struct PiiClassifier {
    rules: Vec<Rule>,
    policy: ClassifierPolicy,
}

impl Default for PiiClassifier {
    fn default() -> Self {
        Self::new(ClassifierPolicy::default())
    }
}

impl PiiClassifier {
    /// Classifier with the standard rule order
    pub fn new(policy: ClassifierPolicy) -> Self {
        Self::with_rules(Rule::ORDERED.to_vec(), policy)
    }

    /// Classifier with an explicit rule order
    pub fn with_rules(rules: Vec<Rule>, policy: ClassifierPolicy) -> Self {
        Self { rules, policy }
    }

    /// Classify a raw fragment given its corrected header label (if any)
    pub fn classify(&self, raw: &str, header: Option<&str>) -> Option<PiiCategory> {
        let hit = self
            .rules
            .iter()
            .find(|rule| rule.matches(&self.policy, raw, header))
            .map(Rule::category);

        if let Some(category) = hit {
            debug!("Classified {:?} as {}", raw, category);
        }
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Option<PiiCategory> {
        PiiClassifier::default().classify(text, None)
    }

    #[test]
    fn test_dates() {
        for text in ["14/04/25", "1-4-2025", "14.04.2025", "Date: 03/11/24", "14 / 04 / 25"] {
            assert_eq!(classify(text), Some(PiiCategory::Date), "{}", text);
        }
    }

    #[test]
    fn test_dates_with_confusables() {
        for text in ["l4/O4/25", "I2/O1/2O24", "1S/O3/2S"] {
            assert_eq!(classify(text), Some(PiiCategory::Date), "{}", text);
        }
    }

    #[test]
    fn test_not_dates() {
        assert_ne!(classify("14/04"), Some(PiiCategory::Date));
        assert_ne!(classify("1/2/3"), Some(PiiCategory::Date));
    }

    #[test]
    fn test_doctor_prefixes() {
        for text in ["Dr. Mehta", "DR SHARMA", "Dn. Rao", "Mr. Khan", "Ms Iyer", "Prof. Gupta"] {
            assert_eq!(classify(text), Some(PiiCategory::Doctor), "{}", text);
        }
    }

    #[test]
    fn test_bare_doctor_prefix() {
        for text in ["dr", "Dr.", "DN", "dn."] {
            assert_eq!(classify(text), Some(PiiCategory::Doctor), "{}", text);
        }
        // Short non-bare prefixes do not qualify
        assert_eq!(classify("ms"), None);
        assert_eq!(classify("mr."), None);
    }

    #[test]
    fn test_doctor_ignores_ocr_padding() {
        assert_eq!(classify(" dr"), Some(PiiCategory::Doctor));
        assert_eq!(classify("  Dr. Mehta "), Some(PiiCategory::Doctor));
        assert_eq!(classify(" ms "), None);
    }

    #[test]
    fn test_doctor_guards() {
        assert_ne!(classify("drug name"), Some(PiiCategory::Doctor));
        assert_ne!(classify("Dr. dose 5ml"), Some(PiiCategory::Doctor));
        assert_ne!(classify("Dr. Sign"), Some(PiiCategory::Doctor));
        assert_ne!(classify("Drug"), Some(PiiCategory::Doctor));
    }

    #[test]
    fn test_date_wins_over_doctor() {
        assert_eq!(classify("Dr. Date: 14/04/25"), Some(PiiCategory::Date));
        assert_eq!(classify("Dr 12/05/2024"), Some(PiiCategory::Date));
    }

    #[test]
    fn test_patient_header_uses_corrected_label() {
        let classifier = PiiClassifier::default();
        assert_eq!(
            classifier.classify("Palicnt Name", Some("Patient Name")),
            Some(PiiCategory::PatientInfo)
        );
        assert_eq!(classifier.classify("UH1D", Some("UHID No")), Some(PiiCategory::PatientInfo));
        // Raw text alone does not make a header
        assert_eq!(classifier.classify("Patient Name", None), None);
        // Date and Dr. labels are handled by earlier rules
        assert_eq!(classifier.classify("Dale", Some("Date")), None);
    }

    #[test]
    fn test_id_numbers() {
        assert_eq!(classify("1234567"), Some(PiiCategory::IdNum));
        assert_eq!(classify("00012345678"), Some(PiiCategory::IdNum));
        assert_eq!(classify("123456"), None);
        assert_eq!(classify("12345a7"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_plain_text_is_not_pii() {
        assert_eq!(classify("hello"), None);
        assert_eq!(classify("Diagnosis"), None);
    }

    #[test]
    fn test_configurable_guards() {
        let policy = ClassifierPolicy {
            doctor_guards: vec!["drug".to_string()],
            ..Default::default()
        };
        let classifier = PiiClassifier::new(policy);
        assert_eq!(classifier.classify("Dr. Sign", None), Some(PiiCategory::Doctor));
        assert_eq!(classifier.classify("drug name", None), None);
    }

    #[test]
    fn test_rule_order_is_respected() {
        let classifier = PiiClassifier::with_rules(
            vec![Rule::Doctor, Rule::Date],
            ClassifierPolicy {
                doctor_guards: vec![],
                ..Default::default()
            },
        );
        assert_eq!(classifier.classify("Dr. Date: 14/04/25", None), Some(PiiCategory::Doctor));
    }

    #[test]
    fn test_category_names() {
        assert_eq!(PiiCategory::PatientInfo.to_string(), "PATIENT_INFO");
        assert_eq!(serde_json::to_string(&PiiCategory::IdNum).unwrap(), "\"ID_NUM\"");
    }
}
