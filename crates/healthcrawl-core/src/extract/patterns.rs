//! Common regex patterns for resource extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Phone numbers: 555-123-4567, (555) 123-4567, +1 (555) 123-4567
    pub static ref PHONE: Regex = Regex::new(concat!(
        r"(?:\b\d{3}[-.\s]\d{3}[-.\s]\d{4}\b)",
        r"|(?:\(\d{3}\)\s?\d{3}[-.\s]\d{4})",
        r"|(?:\+?1?[-.\s]?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4})",
    ))
    .unwrap();

    // City, ST 12345 or City ST 12345-6789
    pub static ref CITY_STATE_ZIP: Regex = Regex::new(
        r"(?i)\b([A-Z][a-zA-Z .'\-]+),?\s*([A-Z]{2})\s*(\d{5}(?:-\d{4})?)\b"
    ).unwrap();

    // House number followed by a street name ending in a street type
    pub static ref STREET_LINE: Regex = Regex::new(concat!(
        r"(?i)\b\d{1,6}\s+[A-Za-z0-9'\-.#& ]+\s+",
        r"(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Drive|Dr|Lane|Ln|Court|Ct|Way|",
        r"Terrace|Ter|Place|Pl|Parkway|Pkwy|Highway|Hwy)\b\.?",
    ))
    .unwrap();

    // Call-to-action menu fragments ("I want to...")
    pub static ref CALL_TO_ACTION: Regex = Regex::new(
        r"^(?:i want(?: to)?|want to)\b"
    ).unwrap();

    // Phone extension suffix
    pub static ref PHONE_EXTENSION: Regex = Regex::new(
        r"(?i)ext\.?\s*\d+$"
    ).unwrap();

    // Closing parenthesis without the opening one: "707) 465-0426"
    pub static ref HALF_PARENTHESIZED: Regex = Regex::new(
        r"^\d{3}\)\s*\d"
    ).unwrap();

    // Already-normalized North American number: +1-707-465-0426
    pub static ref CANONICAL_NANP: Regex = Regex::new(
        r"^\+1-\d{3}-\d{3}-\d{4}$"
    ).unwrap();

    pub static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Collapse whitespace runs into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Digits of a string, in order.
pub fn digits_only(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phones(text: &str) -> Vec<String> {
        PHONE
            .find_iter(text)
            .map(|m| m.as_str().trim().to_string())
            .collect()
    }

    #[test]
    fn test_phone_shapes() {
        assert_eq!(phones("Call 707-465-0426 today"), vec!["707-465-0426"]);
        assert_eq!(phones("Call (800) 446-4408 now"), vec!["(800) 446-4408"]);
        assert_eq!(phones("Intl +1 555 123 4567"), vec!["+1 555 123 4567"]);
        assert_eq!(phones("a 555.123.4567 b 555 987 6543"), vec!["555.123.4567", "555 987 6543"]);
    }

    #[test]
    fn test_city_state_zip() {
        assert!(CITY_STATE_ZIP.is_match("Springfield, IL 62701"));
        assert!(CITY_STATE_ZIP.is_match("Crescent City CA 95531-4140"));
        assert!(!CITY_STATE_ZIP.is_match("Open Monday to Friday"));
    }

    #[test]
    fn test_street_line() {
        assert!(STREET_LINE.is_match("123 Main Street"));
        assert!(STREET_LINE.is_match("880 Northcrest Dr."));
        assert!(STREET_LINE.is_match("4065 County Cir Hwy"));
        assert!(!STREET_LINE.is_match("Main Street"));
    }

    #[test]
    fn test_call_to_action() {
        assert!(CALL_TO_ACTION.is_match("i want to apply"));
        assert!(CALL_TO_ACTION.is_match("want to volunteer"));
        assert!(!CALL_TO_ACTION.is_match("wanted: nurses"));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Public \n Health\tDept "), "Public Health Dept");
        assert_eq!(digits_only("(707) 465-0426"), "7074650426");
    }
}
