//! Rule-based resource extractors for health-department pages.

pub mod address;
pub mod calibrate;
pub mod document;
pub mod facility;
pub mod page;
pub mod patterns;
pub mod phone;
pub mod vocabulary;

pub use address::{AddressExtractor, looks_like_address};
pub use calibrate::{calibrate, calibrate_facility};
pub use document::PageDocument;
pub use facility::FacilityExtractor;
pub use page::{PageAggregator, apply_uncertain_rule};
pub use phone::{PhoneExtractor, classify_phone};
pub use vocabulary::{Lexicon, ServiceKeywords, TagVocabulary};

use crate::error::ExtractionError;
use crate::models::resource::ResourceRecord;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// A page region scanned by an extractor: a CSS selector and the context label
/// recorded on records found there.
#[derive(Debug, Clone, Copy)]
pub struct Region {
    pub selector: &'static str,
    pub context: &'static str,
}

impl Region {
    pub const fn new(selector: &'static str, context: &'static str) -> Self {
        Self { selector, context }
    }
}

/// Trait for per-page resource extractors.
pub trait ResourceExtractor {
    /// Short name used in combined error messages.
    fn name(&self) -> &'static str;

    /// Extract records from a parsed page.
    fn extract(&self, document: &PageDocument) -> Result<Vec<ResourceRecord>>;
}
