//! Postal address extraction.
//!
//! Addresses are anchored on a "City, ST 12345" line. The street line is taken
//! from the same line or one of the two lines on either side; failing that, the
//! surrounding window of lines is kept as a best-effort block.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use super::calibrate::calibrate;
use super::document::{PageDocument, line_text};
use super::patterns::{CITY_STATE_ZIP, STREET_LINE, collapse_whitespace};
use super::vocabulary::Lexicon;
use super::{Region, ResourceExtractor, Result};
use crate::models::resource::{Category, ResourceRecord, ResourceType};

/// Regions scanned for addresses, in order.
pub const ADDRESS_REGIONS: &[Region] = &[
    Region::new(".address", "facility_address"),
    Region::new(".location", "service_location"),
    Region::new(".contact-info", "contact_info"),
    Region::new("address", "html_address_tag"),
    Region::new(".facility_address", "facility_address"),
    Region::new(".service_location", "service_location"),
    Region::new(".contact", "contact"),
    Region::new(".footer", "footer"),
    Region::new("footer", "footer"),
    Region::new(".copyright", "copyright"),
];

/// Context label for addresses found by the whole-page fallback.
pub const PAGE_CONTEXT: &str = "page";

/// Lines on each side of an anchor line considered part of the address.
const WINDOW: usize = 2;

const COMPLETE_CONFIDENCE: f64 = 0.9;
const PARTIAL_CONFIDENCE: f64 = 0.6;

/// Postal address extractor.
pub struct AddressExtractor {
    lexicon: Arc<Lexicon>,
    regions: Vec<Region>,
}

impl AddressExtractor {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self {
            lexicon,
            regions: ADDRESS_REGIONS.to_vec(),
        }
    }

    /// Replace the scanned regions.
    pub fn with_regions(mut self, regions: Vec<Region>) -> Self {
        self.regions = regions;
        self
    }

    fn record(&self, value: String, context: &str) -> ResourceRecord {
        let mut tags = self.lexicon.vocabulary.tag(&value, context);
        tags.ensure_general();

        let base = if STREET_LINE.is_match(&value) && CITY_STATE_ZIP.is_match(&value) {
            COMPLETE_CONFIDENCE
        } else {
            PARTIAL_CONFIDENCE
        };
        let confidence = calibrate(&value, base);

        ResourceRecord::new(
            Category::Location,
            ResourceType::Address,
            value,
            tags,
            context,
            confidence,
        )
    }

    /// Validated address from a block of text, if any.
    fn candidate(&self, text: &str) -> Option<String> {
        guess_address(text)
            .map(|c| collapse_whitespace(&c))
            .filter(|c| looks_like_address(&self.lexicon, c))
    }
}

/// Lines `idx - WINDOW ..= idx + WINDOW`, first occurrence of each, space-joined.
fn merge_window(lines: &[&str], idx: usize) -> String {
    let start = idx.saturating_sub(WINDOW);
    let end = (idx + WINDOW + 1).min(lines.len());

    let mut seen = HashSet::new();
    lines[start..end]
        .iter()
        .copied()
        .filter(|line| seen.insert(*line))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Best guess at an address inside a block of text.
pub fn guess_address(text: &str) -> Option<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    // Only the first city/state/ZIP line is considered; it always yields a result.
    if let Some(idx) = lines.iter().position(|l| CITY_STATE_ZIP.is_match(l)) {
        if STREET_LINE.is_match(lines[idx]) {
            return Some(lines[idx].to_string());
        }

        let neighbours = [
            idx.checked_sub(1),
            idx.checked_sub(2),
            Some(idx + 1),
            Some(idx + 2),
        ];
        for j in neighbours.into_iter().flatten() {
            let Some(street) = lines.get(j) else { continue };
            if STREET_LINE.is_match(street) {
                let city = CITY_STATE_ZIP
                    .find(lines[idx])
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                return Some(format!("{} {}", street, city).trim().to_string());
            }
        }

        return Some(merge_window(&lines, idx));
    }

    lines
        .iter()
        .position(|l| STREET_LINE.is_match(l))
        .map(|i| merge_window(&lines, i))
}

/// Contains a digit and a street word, and is longer than 10 but shorter
/// than 200 characters.
pub fn looks_like_address(lexicon: &Lexicon, text: &str) -> bool {
    let length = text.chars().count();
    text.chars().any(|c| c.is_ascii_digit())
        && lexicon.has_street_word(&text.to_lowercase())
        && length > 10
        && length < 200
}

impl ResourceExtractor for AddressExtractor {
    fn name(&self) -> &'static str {
        "address_extractor"
    }

    fn extract(&self, document: &PageDocument) -> Result<Vec<ResourceRecord>> {
        let mut results = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for region in &self.regions {
            for element in document.select(region.selector)? {
                let Some(value) = self.candidate(&line_text(&element)) else {
                    continue;
                };
                if seen.insert(value.clone()) {
                    results.push(self.record(value, region.context));
                }
            }
        }

        if results.is_empty() {
            if let Some(value) = self.candidate(&document.page_text()) {
                debug!("Address found by whole-page fallback");
                results.push(self.record(value, PAGE_CONTEXT));
            }
        }

        debug!("Found {} addresses", results.len());
        Ok(results)
    }
}
