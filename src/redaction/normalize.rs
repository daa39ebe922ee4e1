//! Text normalization profiles
//!
//! Two independent profiles are used on raw OCR strings. The date profile
//! remaps OCR-confusable letters to digits; the header profile only strips
//! label punctuation. Mixing them mangles names (an "S" becomes "5").

/// Normalize text for date detection.
///
/// Strips spaces, turns `-` and `/` into `.`, then remaps the usual digit
/// misreads: `l`/`I` to `1`, `O` to `0`, `S` to `5`.
pub fn normalize_date(text: &str) -> String {
    text.chars()
        .filter(|c| *c != ' ')
        .map(|c| match c {
            '-' | '/' => '.',
            'l' | 'I' => '1',
            'O' => '0',
            'S' => '5',
            other => other,
        })
        .collect()
}

/// Normalize text for header correction.
///
/// Removes `;`, `:` and `_` and trims surrounding whitespace.
pub fn normalize_header(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !matches!(c, ';' | ':' | '_'))
        .collect();
    stripped.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_separators() {
        assert_eq!(normalize_date("14/04/25"), "14.04.25");
        assert_eq!(normalize_date("14-04-2025"), "14.04.2025");
        assert_eq!(normalize_date("14 / 04 / 25"), "14.04.25");
    }

    #[test]
    fn test_date_confusables() {
        assert_eq!(normalize_date("l4/O4/2S"), "14.04.25");
        assert_eq!(normalize_date("I2.O1.2O24"), "12.01.2024");
    }

    #[test]
    fn test_date_profile_leaves_other_letters() {
        assert_eq!(normalize_date("Dr. Mehta"), "Dr.Mehta");
    }

    #[test]
    fn test_header_strips_punctuation() {
        assert_eq!(normalize_header("Patient Name:"), "Patient Name");
        assert_eq!(normalize_header("  UHID_No ;  "), "UHIDNo");
        assert_eq!(normalize_header("Age :"), "Age");
    }

    #[test]
    fn test_header_keeps_letters_intact() {
        // No digit remapping in the header profile
        assert_eq!(normalize_header("Sex"), "Sex");
        assert_eq!(normalize_header("IPD No"), "IPD No");
    }

    #[test]
    fn test_header_idempotent() {
        for text in ["Patient Name:", " _Age_ ", "Dr.;", "", "  :  ", "IPD No.: 12"] {
            let once = normalize_header(text);
            assert_eq!(normalize_header(&once), once, "not idempotent for {:?}", text);
        }
    }
}
