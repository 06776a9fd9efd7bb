//! Length-based confidence calibration.
//!
//! Long values are usually paragraphs or menus picked up by a broad selector,
//! so their provisional confidence is capped.

/// Cap for values longer than [`MAX_CHARS`] characters or [`MAX_WORDS`] words.
pub const LONG_TEXT_CAP: f64 = 0.35;

/// Cap for facility names of 8 to 11 words.
pub const MID_LENGTH_FACILITY_CAP: f64 = 0.55;

pub const MAX_CHARS: usize = 100;
pub const MAX_WORDS: usize = 12;

fn is_long(chars: usize, words: usize) -> bool {
    chars > MAX_CHARS || words > MAX_WORDS
}

/// Generic rule used for phones, addresses and services.
pub fn calibrate(text: &str, confidence: f64) -> f64 {
    if text.is_empty() {
        return confidence;
    }
    let words = text.split_whitespace().count();
    if is_long(text.chars().count(), words) {
        return confidence.min(LONG_TEXT_CAP);
    }
    confidence
}

/// Facility rule: the generic cap plus a lower ceiling for 8-11 word headings,
/// which tend to be sentences rather than names.
pub fn calibrate_facility(text: &str, confidence: f64) -> f64 {
    if text.is_empty() {
        return confidence;
    }
    let words = text.split_whitespace().count();
    if is_long(text.chars().count(), words) {
        return confidence.min(LONG_TEXT_CAP);
    }
    if words > 7 && words < MAX_WORDS {
        return confidence.min(MID_LENGTH_FACILITY_CAP);
    }
    confidence
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_unchanged() {
        assert_eq!(calibrate("(707) 465-0426", 0.9), 0.9);
        assert_eq!(calibrate("", 0.7), 0.7);
    }

    #[test]
    fn test_long_text_capped() {
        let long = "word ".repeat(13);
        assert_eq!(calibrate(&long, 0.9), LONG_TEXT_CAP);
        assert_eq!(calibrate(&"x".repeat(101), 0.6), LONG_TEXT_CAP);
        assert_eq!(calibrate(&"x".repeat(100), 0.6), 0.6);
    }

    #[test]
    fn test_cap_never_raises() {
        let long = "word ".repeat(20);
        assert_eq!(calibrate(&long, 0.2), 0.2);
    }

    #[test]
    fn test_facility_mid_length() {
        assert_eq!(calibrate_facility("one two three four five six seven", 0.85), 0.85);
        assert_eq!(
            calibrate_facility("one two three four five six seven eight", 0.85),
            MID_LENGTH_FACILITY_CAP
        );
        assert_eq!(
            calibrate_facility("one two three four five six seven eight nine ten eleven", 0.7),
            MID_LENGTH_FACILITY_CAP
        );
        assert_eq!(
            calibrate_facility("one two three four five six seven eight nine ten eleven twelve", 0.7),
            0.7
        );
    }

    #[test]
    fn test_service_uses_generic_rule() {
        let text = "one two three four five six seven eight nine";
        assert_eq!(calibrate(text, 0.85), 0.85);
        assert_eq!(calibrate_facility(text, 0.85), MID_LENGTH_FACILITY_CAP);
    }
}
