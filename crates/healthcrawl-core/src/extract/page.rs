//! Per-page aggregation of the extractors.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Local;
use tracing::{debug, info, warn};

use super::address::AddressExtractor;
use super::calibrate::LONG_TEXT_CAP;
use super::document::PageDocument;
use super::facility::FacilityExtractor;
use super::phone::PhoneExtractor;
use super::vocabulary::Lexicon;
use super::ResourceExtractor;
use crate::error::{ExtractionError, sanitize_error};
use crate::models::config::UncertainRule;
use crate::models::resource::{PageCrawlResult, ResourceKey, ResourceRecord, UNCERTAIN_TAG};

/// Local time in ISO-8601 form with microseconds.
pub fn iso_timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Whether a record's confidence falls under the uncertain rule.
fn is_uncertain(rule: UncertainRule, confidence: f64) -> bool {
    match rule {
        UncertainRule::Exact => (confidence - LONG_TEXT_CAP).abs() < f64::EPSILON,
        UncertainRule::Band => confidence <= LONG_TEXT_CAP + f64::EPSILON,
    }
}

/// Tag low-confidence records `uncertain`. Applying it twice changes nothing.
pub fn apply_uncertain_rule(records: &mut [ResourceRecord], rule: UncertainRule) {
    for record in records.iter_mut() {
        if is_uncertain(rule, record.confidence) {
            record.tags.insert(UNCERTAIN_TAG);
        }
    }
}

/// Keep the first record for each `(category, type, lowercase value)`.
pub fn dedup_records(records: Vec<ResourceRecord>) -> Vec<ResourceRecord> {
    let mut seen: HashSet<ResourceKey> = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.key()))
        .collect()
}

/// Runs every extractor over a page and merges their output.
pub struct PageAggregator {
    extractors: Vec<Box<dyn ResourceExtractor>>,
    rule: UncertainRule,
}

impl PageAggregator {
    /// Phone, address and facility extractors sharing one lexicon.
    pub fn new(lexicon: Arc<Lexicon>, rule: UncertainRule) -> Self {
        Self {
            extractors: vec![
                Box::new(PhoneExtractor::new(Arc::clone(&lexicon))),
                Box::new(AddressExtractor::new(Arc::clone(&lexicon))),
                Box::new(FacilityExtractor::new(lexicon)),
            ],
            rule,
        }
    }

    /// Aggregator over a custom extractor list.
    pub fn with_extractors(extractors: Vec<Box<dyn ResourceExtractor>>, rule: UncertainRule) -> Self {
        Self { extractors, rule }
    }

    /// Extract all resources from a parsed page.
    ///
    /// A failing extractor does not stop the others; its error is recorded as
    /// `"<extractor>: <message>"` and all errors are joined with `"; "`.
    ///
    /// A page without visible text is not scanned and is reported as
    /// `"page: document is empty"`.
    pub fn crawl_page(&self, url: &str, document: &PageDocument) -> PageCrawlResult {
        if document.is_blank() {
            warn!("No visible text on {}", url);
            return PageCrawlResult {
                url: url.to_string(),
                timestamp: iso_timestamp(),
                resources: Vec::new(),
                error: Some(format!("page: {}", ExtractionError::EmptyDocument)),
            };
        }

        let mut resources = Vec::new();
        let mut errors = Vec::new();

        for extractor in &self.extractors {
            match extractor.extract(document) {
                Ok(records) => {
                    debug!("{} returned {} records", extractor.name(), records.len());
                    resources.extend(records);
                }
                Err(e) => {
                    let message = sanitize_error(&e.to_string());
                    warn!("{} failed for {}: {}", extractor.name(), url, message);
                    errors.push(format!("{}: {}", extractor.name(), message));
                }
            }
        }

        let mut resources = dedup_records(resources);
        apply_uncertain_rule(&mut resources, self.rule);

        info!("Extracted {} resources from {}", resources.len(), url);

        PageCrawlResult {
            url: url.to_string(),
            timestamp: iso_timestamp(),
            resources,
            error: if errors.is_empty() {
                None
            } else {
                Some(errors.join("; "))
            },
        }
    }

    /// Parse raw HTML and extract from it.
    pub fn crawl_html(&self, url: &str, html: &str) -> PageCrawlResult {
        self.crawl_page(url, &PageDocument::parse(html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Region;
    use crate::models::resource::{Category, ResourceType, TagSet};
    use pretty_assertions::assert_eq;

    const RIVERSIDE: &str = "<html><body>\
        <h1>Riverside County Public Health Department</h1>\
        <p>Information on local programs is available Monday to Friday during normal hours.</p>\
        <div class=\"hotline\">Call (800) 446-4408</div>\
        </body></html>";

    fn lexicon() -> Arc<Lexicon> {
        Arc::new(Lexicon::standard().unwrap())
    }

    fn record(value: &str, confidence: f64) -> ResourceRecord {
        ResourceRecord::new(
            Category::Facility,
            ResourceType::FacilityName,
            value,
            TagSet::from(vec!["general".to_string()]),
            "heading",
            confidence,
        )
    }

    struct Failing;

    impl ResourceExtractor for Failing {
        fn name(&self) -> &'static str {
            "address_extractor"
        }

        fn extract(&self, _document: &PageDocument) -> crate::extract::Result<Vec<ResourceRecord>> {
            Err(ExtractionError::EmptyDocument)
        }
    }

    #[test]
    fn test_riverside_page() {
        let aggregator = PageAggregator::new(lexicon(), UncertainRule::Exact);
        let result = aggregator.crawl_html("https://example.gov/health", RIVERSIDE);

        assert_eq!(result.error, None);
        assert_eq!(result.count(Category::ContactInfo), 1);
        assert_eq!(result.count(Category::Facility), 1);
        assert_eq!(result.count(Category::Service), 0);

        let phone = result
            .resources
            .iter()
            .find(|r| r.category == Category::ContactInfo)
            .unwrap();
        assert_eq!(phone.resource_type, ResourceType::TollNumber);
        assert_eq!(phone.value, "(800) 446-4408");
        assert!(phone.tags.contains("general"));

        let facility = result
            .resources
            .iter()
            .find(|r| r.category == Category::Facility)
            .unwrap();
        assert_eq!(facility.value, "Riverside County Public Health Department");
        assert!(facility.confidence >= 0.7);
    }

    #[test]
    fn test_blank_page_is_reported() {
        let aggregator = PageAggregator::new(lexicon(), UncertainRule::Exact);
        let result = aggregator.crawl_html("https://example.gov", "<html><body>  \n </body></html>");

        assert!(result.resources.is_empty());
        assert_eq!(result.error.as_deref(), Some("page: document is empty"));
    }

    #[test]
    fn test_failing_extractor_keeps_partial_results() {
        let lexicon = lexicon();
        let aggregator = PageAggregator::with_extractors(
            vec![
                Box::new(PhoneExtractor::new(Arc::clone(&lexicon))),
                Box::new(Failing),
                Box::new(
                    FacilityExtractor::new(lexicon).with_regions(vec![Region::new("[[", "broken")]),
                ),
            ],
            UncertainRule::Exact,
        );
        let result = aggregator.crawl_html("https://example.gov", RIVERSIDE);

        assert_eq!(result.resources.len(), 1);
        let error = result.error.unwrap();
        let parts: Vec<&str> = error.split("; ").collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], "address_extractor: document is empty");
        assert!(parts[1].starts_with("facility_extractor: invalid selector"));
    }

    #[test]
    fn test_uncertain_exact_rule() {
        let mut records = vec![record("a", 0.35), record("b", 0.3), record("c", 0.9)];
        apply_uncertain_rule(&mut records, UncertainRule::Exact);
        apply_uncertain_rule(&mut records, UncertainRule::Exact);

        assert_eq!(records[0].tags.as_slice(), &["general", "uncertain"]);
        assert!(!records[1].tags.contains(UNCERTAIN_TAG));
        assert!(!records[2].tags.contains(UNCERTAIN_TAG));
    }

    #[test]
    fn test_uncertain_band_rule() {
        let mut records = vec![record("a", 0.35), record("b", 0.3), record("c", 0.36)];
        apply_uncertain_rule(&mut records, UncertainRule::Band);

        assert!(records[0].tags.contains(UNCERTAIN_TAG));
        assert!(records[1].tags.contains(UNCERTAIN_TAG));
        assert!(!records[2].tags.contains(UNCERTAIN_TAG));
    }

    #[test]
    fn test_dedup_is_case_insensitive() {
        let records = dedup_records(vec![
            record("Mercy Hospital", 0.85),
            record("MERCY HOSPITAL", 0.7),
            record("Eastside Clinic", 0.7),
        ]);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].confidence, 0.85);
    }

    #[test]
    fn test_long_heading_is_uncertain() {
        let heading = "Health Center news and information for residents of the county and the \
                       surrounding region this week";
        let html = format!("<body><h1>{}</h1></body>", heading);
        let aggregator = PageAggregator::new(lexicon(), UncertainRule::Exact);
        let result = aggregator.crawl_html("https://example.gov", &html);

        let facility = &result.resources[0];
        assert_eq!(facility.confidence, LONG_TEXT_CAP);
        assert!(facility.tags.contains(UNCERTAIN_TAG));
    }
}
