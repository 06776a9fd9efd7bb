//! Core library for health-department resource extraction.
//!
//! This crate provides:
//! - Topic tagging and service keyword matching over a shared lexicon
//! - Phone, address and facility/service extractors for HTML pages
//! - Length-based confidence calibration and `uncertain` flagging
//! - Batch cleaning of crawl reports (phone normalization, re-bucketing)
//! - Plain-text summary reports

pub mod clean;
pub mod error;
pub mod extract;
pub mod models;
pub mod report;

pub use clean::{BatchCleaner, RawCrawlReport, normalize_phone};
pub use error::{ExtractionError, HealthCrawlError, Result, sanitize_error};
pub use extract::{Lexicon, PageAggregator, PageDocument, ResourceExtractor};
pub use extract::page::iso_timestamp;
pub use models::config::{HealthCrawlConfig, UncertainRule};
pub use models::report::{
    AggregateSummary, CrawlInfo, CrawlLogEntry, CrawlReport, Population, SiteMetadata, SiteResult,
};
pub use models::resource::{Category, PageCrawlResult, ResourceRecord, ResourceType, TagSet};
