//! Facility and service name extraction from headings and listing elements.

use std::collections::HashSet;
use std::sync::Arc;

use scraper::ElementRef;
use tracing::{debug, trace};

use super::calibrate::{calibrate, calibrate_facility};
use super::document::{PageDocument, heading_level, stripped_text, surrounding_context};
use super::patterns::{CALL_TO_ACTION, collapse_whitespace};
use super::vocabulary::Lexicon;
use super::{Region, ResourceExtractor, Result};
use crate::models::resource::{Category, ResourceRecord, ResourceType, TagSet};

pub const EXPLICIT_FACILITY: &str = "explicit_facility";

/// Regions scanned for names, in order.
pub const FACILITY_REGIONS: &[Region] = &[
    Region::new("h1, h2, h3", "heading"),
    Region::new(".facility-name", EXPLICIT_FACILITY),
    Region::new(".clinic-name", "clinic_listing"),
    Region::new(".location-name", "location_listing"),
    Region::new("h1", "h2"),
    Region::new("h2", "h3"),
];

/// Contexts where any reasonable non-UI text is accepted as a name.
const PERMISSIVE_CONTEXTS: &[&str] = &[
    EXPLICIT_FACILITY,
    "clinic_listing",
    "location_listing",
    "heading",
    "h1",
    "h2",
    "h3",
];

/// Facility tags, first match wins.
const FACILITY_TAGS: &[&str] = &["hospital", "clinic", "pharmacy"];

const URL_MARKERS: &[&str] = &[":", "http", "www"];

/// Facility/service name extractor.
pub struct FacilityExtractor {
    lexicon: Arc<Lexicon>,
    regions: Vec<Region>,
}

impl FacilityExtractor {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self {
            lexicon,
            regions: FACILITY_REGIONS.to_vec(),
        }
    }

    /// Replace the scanned regions.
    pub fn with_regions(mut self, regions: Vec<Region>) -> Self {
        self.regions = regions;
        self
    }

    /// Pre-filter on the raw element text.
    ///
    /// Document-type words ("agenda", "press", ...) reject the text, except in
    /// permissive contexts where a facility indicator or health keyword on
    /// plain text of reasonable length still accepts it.
    pub fn looks_like_facility_name(&self, text: &str, context: &str) -> bool {
        let lower = text.to_lowercase();
        let length = text.chars().count();
        let reasonable_length = length > 5 && length < 100;
        let plain = !URL_MARKERS.iter().any(|m| lower.contains(m));
        let has_indicator = self.lexicon.has_facility_indicator(&lower);
        let has_health_keyword = self.lexicon.has_health_keyword(&lower);
        let permissive = PERMISSIVE_CONTEXTS.contains(&context);

        if self.lexicon.has_non_facility_term(&lower) {
            return permissive
                && (has_indicator || has_health_keyword)
                && reasonable_length
                && plain
                && !self.lexicon.mentions_ui_term(&lower);
        }

        if permissive {
            if self.lexicon.mentions_ui_term(&lower) {
                return false;
            }
            return has_indicator || has_health_keyword || (reasonable_length && plain);
        }

        has_health_keyword && reasonable_length
    }

    fn tags(&self, name: &str, context: &str) -> TagSet {
        let mut tags = self.lexicon.vocabulary.tag(name, context);
        let lower = name.to_lowercase();
        if let Some(tag) = FACILITY_TAGS.iter().find(|t| lower.contains(*t)) {
            tags.insert(*tag);
        }
        tags.ensure_general();
        tags
    }

    fn classify(
        &self,
        element: &ElementRef<'_>,
        region: &Region,
        name: String,
    ) -> Option<ResourceRecord> {
        let lower = name.to_lowercase();
        if self.lexicon.is_generic_ui(&lower) {
            trace!("Skipping generic heading {:?}", name);
            return None;
        }

        let context = surrounding_context(element, &name);
        let tags = self.tags(&name, &context);

        let service_candidate = self
            .lexicon
            .service_keywords
            .matches(&tags.joined().to_lowercase())
            || self.lexicon.service_keywords.matches(&lower);
        let is_service = service_candidate && !self.lexicon.has_facility_indicator(&lower);

        let base = base_confidence(element, region.context);
        let record = if is_service {
            let confidence = calibrate(&name, base);
            ResourceRecord::new(
                Category::Service,
                ResourceType::ServiceName,
                name,
                tags,
                region.context,
                confidence,
            )
        } else {
            let confidence = calibrate_facility(&name, base);
            ResourceRecord::new(
                Category::Facility,
                ResourceType::FacilityName,
                name,
                tags,
                region.context,
                confidence,
            )
        };
        Some(record)
    }
}

fn base_confidence(element: &ElementRef<'_>, context: &str) -> f64 {
    if context == EXPLICIT_FACILITY {
        return 0.9;
    }
    match heading_level(element) {
        Some(1) => 0.85,
        Some(2) | Some(3) => 0.7,
        _ => 0.6,
    }
}

impl ResourceExtractor for FacilityExtractor {
    fn name(&self) -> &'static str {
        "facility_extractor"
    }

    fn extract(&self, document: &PageDocument) -> Result<Vec<ResourceRecord>> {
        let mut results = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for region in &self.regions {
            for element in document.select(region.selector)? {
                let text = stripped_text(&element);
                if !self.looks_like_facility_name(&text, region.context) {
                    continue;
                }

                let name = collapse_whitespace(&text);
                if name.is_empty()
                    || name.contains("...")
                    || name.contains('…')
                    || CALL_TO_ACTION.is_match(&name.to_lowercase())
                {
                    continue;
                }
                if !seen.insert(name.clone()) {
                    continue;
                }

                if let Some(record) = self.classify(&element, region, name) {
                    results.push(record);
                }
            }
        }

        debug!("Found {} facility/service names", results.len());
        Ok(results)
    }
}
