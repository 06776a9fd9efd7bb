//! Batch-level cleaning of crawl reports.
//!
//! The cleaner reads reports leniently (any site or record that does not fit
//! the expected shape is skipped rather than failing the whole file),
//! normalizes values, re-buckets weak records into `unverified_resources`
//! and recomputes the summary.

use std::collections::HashSet;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::extract::patterns::{CANONICAL_NANP, HALF_PARENTHESIZED, PHONE_EXTENSION, digits_only};
use crate::models::report::{
    AggregateSummary, CrawlInfo, CrawlReport, Population, SiteMetadata, SiteResult, UNKNOWN,
};
use crate::models::resource::{
    Category, ResourceKey, ResourceRecord, ResourceType, TagSet, UNCERTAIN_TAG,
};

/// Values longer than this are treated as boilerplate.
pub const MAX_VALUE_CHARS: usize = 200;

/// Confidence ceiling for over-long values.
pub const LONG_VALUE_CAP: f64 = 0.4;

/// Canonical phone formatting.
///
/// - `"7074650426"` becomes `"(707) 465-0426"`
/// - `"17074650426"` becomes `"+1-707-465-0426"`
/// - `"+44 20 7946 0958"` becomes `"+442079460958"`
///
/// A missing opening parenthesis is repaired and a trailing extension is
/// dropped first. Anything else comes back trimmed.
pub fn normalize_phone(value: &str) -> String {
    let mut phone = value.trim().to_string();
    if HALF_PARENTHESIZED.is_match(&phone) {
        phone.insert(0, '(');
    }
    let phone = PHONE_EXTENSION.replace(&phone, "").trim().to_string();

    if CANONICAL_NANP.is_match(&phone) {
        return phone;
    }
    if phone.starts_with('+') {
        return format!("+{}", digits_only(&phone));
    }

    let digits = digits_only(&phone);
    match digits.len() {
        10 => format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..]),
        11 if digits.starts_with('1') => {
            format!("+1-{}-{}-{}", &digits[1..4], &digits[4..7], &digits[7..])
        }
        _ => phone,
    }
}

/// Report as read by the cleaner.
#[derive(Debug, Default, Deserialize)]
pub struct RawCrawlReport {
    #[serde(default)]
    pub summary: Value,
    #[serde(default)]
    pub results: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSiteResult {
    url: Option<String>,
    timestamp: Option<String>,
    name: Option<String>,
    category: Option<String>,
    state_id: Option<String>,
    population: Option<Value>,
    crawled_at: Option<String>,
    resources: Option<Vec<Value>>,
    unverified_resources: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawResource {
    category: Option<String>,
    #[serde(rename = "type")]
    resource_type: Option<String>,
    value: Option<Value>,
    tags: Option<Vec<Value>>,
    context: Option<String>,
    confidence: Option<Value>,
    verified: Option<bool>,
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Number or numeric string clamped to `[0, 1]`; absent means fully
/// confident, anything else (including NaN and infinities) 0.0.
fn coerce_confidence(value: Option<&Value>) -> f64 {
    let parsed = match value {
        None => return 1.0,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    parsed
        .filter(|c| c.is_finite())
        .map_or(0.0, |c| c.clamp(0.0, 1.0))
}

fn coerce_population(value: Option<Value>) -> Population {
    match value {
        Some(Value::Number(n)) => match n.as_u64() {
            Some(count) => Population::Count(count),
            None => Population::Text(n.to_string()),
        },
        Some(Value::String(s)) => Population::Text(s).normalized(),
        _ => Population::default(),
    }
}

/// Outcome of cleaning one record.
enum Cleaned {
    Keep(ResourceRecord),
    Unverified(ResourceRecord),
    Drop,
}

/// Re-buckets and normalizes records of a crawl report.
#[derive(Debug, Clone)]
pub struct BatchCleaner {
    cutoff: f64,
}

impl Default for BatchCleaner {
    fn default() -> Self {
        Self { cutoff: 0.5 }
    }
}

impl BatchCleaner {
    pub fn new(cutoff: f64) -> Self {
        Self { cutoff }
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Clean a JSON report document.
    pub fn clean_json(&self, json: &str) -> Result<CrawlReport> {
        let raw: RawCrawlReport = serde_json::from_str(json)?;
        Ok(self.clean(raw))
    }

    /// Clean an already-typed report, e.g. straight out of a crawl.
    pub fn clean_report(&self, report: &CrawlReport) -> Result<CrawlReport> {
        let raw: RawCrawlReport = serde_json::from_value(serde_json::to_value(report)?)?;
        Ok(self.clean(raw))
    }

    pub fn clean(&self, raw: RawCrawlReport) -> CrawlReport {
        let mut results = Vec::with_capacity(raw.results.len());
        for (index, site) in raw.results.into_iter().enumerate() {
            match serde_json::from_value::<RawSiteResult>(site) {
                Ok(site) => results.push(self.clean_site(site)),
                Err(e) => warn!("Skipping malformed site entry {}: {}", index, e),
            }
        }

        let crawl_info = raw
            .summary
            .get("crawl_info")
            .cloned()
            .and_then(|v| serde_json::from_value::<CrawlInfo>(v).ok());

        let summary = AggregateSummary::from_results(&results).with_crawl_info(crawl_info);
        info!(
            "Cleaned {} sites: {} verified resources",
            results.len(),
            summary.total_resources
        );

        CrawlReport { summary, results }
    }

    fn clean_site(&self, site: RawSiteResult) -> SiteResult {
        let mut kept = Vec::new();
        let mut unverified = Vec::new();
        let mut seen: HashSet<ResourceKey> = HashSet::new();

        let records = site
            .resources
            .unwrap_or_default()
            .into_iter()
            .chain(site.unverified_resources.unwrap_or_default());

        for entry in records {
            match self.clean_record(entry) {
                Cleaned::Keep(record) => {
                    if seen.insert(record.key()) {
                        kept.push(record);
                    }
                }
                Cleaned::Unverified(record) => unverified.push(record),
                Cleaned::Drop => {}
            }
        }

        let crawled_at = site.crawled_at.unwrap_or_default();
        let timestamp = site
            .timestamp
            .or_else(|| Some(crawled_at.clone()).filter(|c| !c.is_empty()));

        SiteResult {
            url: site.url.unwrap_or_default(),
            timestamp,
            metadata: SiteMetadata {
                name: site.name.unwrap_or_else(|| UNKNOWN.to_string()),
                category: site.category.unwrap_or_default(),
                state_id: site.state_id.unwrap_or_default(),
                population: coerce_population(site.population),
            },
            crawled_at,
            resources: kept,
            unverified_resources: if unverified.is_empty() {
                None
            } else {
                Some(unverified)
            },
        }
    }

    fn clean_record(&self, entry: Value) -> Cleaned {
        let Ok(raw) = serde_json::from_value::<RawResource>(entry) else {
            debug!("Dropping malformed resource entry");
            return Cleaned::Drop;
        };

        let category = raw.category.as_deref().and_then(|c| Category::from_str(c).ok());
        let resource_type = raw
            .resource_type
            .as_deref()
            .and_then(|t| ResourceType::from_str(t).ok());
        let value = raw
            .value
            .as_ref()
            .and_then(value_text)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let (Some(category), Some(resource_type), Some(mut value)) = (category, resource_type, value)
        else {
            debug!("Dropping resource without category, type or value");
            return Cleaned::Drop;
        };

        let mut tags: TagSet = raw
            .tags
            .unwrap_or_default()
            .iter()
            .filter_map(value_text)
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        let flagged = tags.remove(UNCERTAIN_TAG);
        let verified = !flagged && raw.verified != Some(false);

        if category == Category::ContactInfo || resource_type.is_phone() {
            value = normalize_phone(&value);
        }

        let mut record = ResourceRecord::new(
            category,
            resource_type,
            value,
            tags,
            raw.context.unwrap_or_default(),
            coerce_confidence(raw.confidence.as_ref()),
        );
        record.verified = Some(verified);

        if record.confidence < self.cutoff || !verified {
            return Cleaned::Unverified(record);
        }
        if record.value.chars().count() > MAX_VALUE_CHARS {
            record.confidence = record.confidence.min(LONG_VALUE_CAP);
            return Cleaned::Unverified(record);
        }
        Cleaned::Keep(record)
    }
}
