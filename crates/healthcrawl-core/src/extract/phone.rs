//! Phone number extraction and toll-free classification.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use super::calibrate::calibrate;
use super::document::{PageDocument, element_text, is_telephone_link, surrounding_context};
use super::patterns::{PHONE, collapse_whitespace, digits_only};
use super::vocabulary::Lexicon;
use super::{Region, ResourceExtractor, Result};
use crate::models::resource::{
    CRISIS_HOTLINE_TAG, Category, ResourceRecord, ResourceType,
};

/// Regions scanned for phone numbers, in order. A number keeps the context of
/// the first region it is found in.
pub const PHONE_REGIONS: &[Region] = &[
    Region::new(".contact-info", "contact information"),
    Region::new(".emergency", "emergency services"),
    Region::new(".crisis", "crisis services"),
    Region::new(".appointment", "appointment scheduling"),
    Region::new(r#"a[href^="tel:" i]"#, "telephone"),
    Region::new(r#"[itemtype*="ContactPoint"]"#, "phone contact"),
    Region::new("body", "general content"),
    Region::new(".address", "address"),
    Region::new(".location", "location"),
    Region::new(".facility_address", "facility address"),
    Region::new(".service_location", "service location"),
    Region::new(".footer", "footer"),
    Region::new(".copyright", "copyright information"),
    Region::new(".contact-details", "contact details"),
    Region::new(".contact-phone", "contact phone"),
    Region::new(".clinic-phone", "clinic phone"),
    Region::new(".emergency-contact", "emergency contact"),
    Region::new(".hotline", "hotline"),
];

/// Toll-free numbering plan areas.
pub const TOLL_FREE_NPAS: &[&str] = &["800", "888", "877", "855", "866", "844", "833", "822"];

const STRUCTURED_CONFIDENCE: f64 = 0.9;
const TEXT_CONFIDENCE: f64 = 0.7;

/// Phone number extractor.
pub struct PhoneExtractor {
    lexicon: Arc<Lexicon>,
    regions: Vec<Region>,
}

impl PhoneExtractor {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self {
            lexicon,
            regions: PHONE_REGIONS.to_vec(),
        }
    }

    /// Replace the scanned regions.
    pub fn with_regions(mut self, regions: Vec<Region>) -> Self {
        self.regions = regions;
        self
    }
}

/// Area code of a phone number, skipping a leading country code `1`.
fn area_code(digits: &str) -> Option<&str> {
    if digits.starts_with('1') && digits.len() >= 11 {
        Some(&digits[1..4])
    } else if digits.len() >= 10 {
        Some(&digits[..3])
    } else {
        None
    }
}

/// `toll_number` for toll-free area codes, `phone_number` otherwise.
pub fn classify_phone(value: &str) -> ResourceType {
    let digits = digits_only(value);
    match area_code(&digits) {
        Some(npa) if TOLL_FREE_NPAS.contains(&npa) => ResourceType::TollNumber,
        _ => ResourceType::PhoneNumber,
    }
}

fn is_contact_point(region: &Region) -> bool {
    region.selector.contains("ContactPoint") || region.context == "phone contact"
}

impl ResourceExtractor for PhoneExtractor {
    fn name(&self) -> &'static str {
        "phone_extractor"
    }

    fn extract(&self, document: &PageDocument) -> Result<Vec<ResourceRecord>> {
        let mut results = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for region in &self.regions {
            for element in document.select(region.selector)? {
                let text = element_text(&element);

                for found in PHONE.find_iter(&text) {
                    let value = collapse_whitespace(found.as_str());
                    if value.is_empty() || !seen.insert(value.clone()) {
                        continue;
                    }

                    let context = surrounding_context(&element, &value);
                    let mut tags = self.lexicon.vocabulary.tag(&value, &context);

                    if tags.contains_any(&["crisis_services", "emergency_room"]) {
                        let context_lower = context.to_lowercase();
                        if context_lower.contains("crisis") || context_lower.contains("suicide") {
                            tags.insert(CRISIS_HOTLINE_TAG);
                        }
                    }
                    tags.ensure_general();

                    let structured = is_telephone_link(&element) || is_contact_point(region);
                    let confidence = if structured {
                        STRUCTURED_CONFIDENCE
                    } else {
                        TEXT_CONFIDENCE
                    };

                    results.push(ResourceRecord::new(
                        Category::ContactInfo,
                        classify_phone(&value),
                        value.as_str(),
                        tags,
                        region.context,
                        calibrate(&value, confidence),
                    ));
                }
            }
        }

        debug!("Found {} phone numbers", results.len());
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extractor() -> PhoneExtractor {
        PhoneExtractor::new(Arc::new(Lexicon::standard().unwrap()))
    }

    fn extract(html: &str) -> Vec<ResourceRecord> {
        extractor().extract(&PageDocument::parse(html)).unwrap()
    }

    #[test]
    fn test_classify_phone() {
        assert_eq!(classify_phone("(800) 446-4408"), ResourceType::TollNumber);
        assert_eq!(classify_phone("1-888-555-0100"), ResourceType::TollNumber);
        assert_eq!(classify_phone("+1 (833) 555 0100"), ResourceType::TollNumber);
        assert_eq!(classify_phone("822.555.0100"), ResourceType::TollNumber);
        assert_eq!(classify_phone("(707) 465-0426"), ResourceType::PhoneNumber);
        assert_eq!(classify_phone("1-707-465-0426"), ResourceType::PhoneNumber);
        assert_eq!(classify_phone("555-0100"), ResourceType::PhoneNumber);
    }

    #[test]
    fn test_same_number_in_two_regions_is_one_record() {
        let records = extract(
            "<body><div class='contact-info'>Main line 707-465-0426</div>\
             <footer class='footer'>Call 707-465-0426</footer></body>",
        );

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category, Category::ContactInfo);
        assert_eq!(records[0].context, "contact information");
        assert_eq!(records[0].confidence, 0.7);
    }

    #[test]
    fn test_telephone_link_is_structured() {
        let records = extract("<body><p>Reach us at <a href='tel:7074650426'>707-465-0426</a></p></body>");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, "707-465-0426");
        assert_eq!(records[0].context, "telephone");
        assert_eq!(records[0].confidence, 0.9);
    }

    #[test]
    fn test_uppercase_telephone_link_is_structured() {
        let records = extract("<body><p>Call <a href='TEL:+17074650426'>707-465-0426</a></p></body>");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].context, "telephone");
        assert_eq!(records[0].confidence, 0.9);
    }

    #[test]
    fn test_contact_point_microdata_is_structured() {
        let records = extract(
            "<body><div itemscope itemtype='https://schema.org/ContactPoint'>707.465.0426</div></body>",
        );

        assert_eq!(records[0].context, "phone contact");
        assert_eq!(records[0].confidence, 0.9);
    }

    #[test]
    fn test_crisis_hotline_tag() {
        let records = extract(
            "<body><div class='crisis'><p>Suicide and crisis line: <span>(800) 273-8255</span></p></div></body>",
        );
        let record = &records[0];

        assert_eq!(record.resource_type, ResourceType::TollNumber);
        assert!(record.tags.contains("crisis_services"));
        assert!(record.tags.contains(CRISIS_HOTLINE_TAG));
        assert!(!record.tags.contains("general"));
    }

    #[test]
    fn test_untagged_number_gets_general() {
        let records = extract("<body><p>555-123-4567</p></body>");
        assert_eq!(records[0].tags.as_slice(), &["general"]);
    }
}
