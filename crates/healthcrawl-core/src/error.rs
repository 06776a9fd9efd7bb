//! Error types for the healthcrawl-core library.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

/// Main error type for the healthcrawl library.
#[derive(Error, Debug)]
pub enum HealthCrawlError {
    /// Resource extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Report (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by a single page extractor.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A region selector could not be parsed.
    #[error("invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    /// A matching pattern failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The document has no content to scan.
    #[error("document is empty")]
    EmptyDocument,
}

/// Result type for the healthcrawl library.
pub type Result<T> = std::result::Result<T, HealthCrawlError>;

lazy_static! {
    static ref FOR_URL_SUFFIX: Regex = Regex::new(r"\sfor url:?.*$").unwrap();
}

/// Strip the URL from an error message, keeping the human-readable part.
///
/// `"403 Client Error: Forbidden for url: https://x.gov/"` becomes
/// `"403 Client Error: Forbidden for url"`.
pub fn sanitize_error(message: &str) -> String {
    FOR_URL_SUFFIX.replace(message, " for url").into_owned()
}
