//! Batch crawl report: per-site results and the aggregate summary.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::resource::{ResourceRecord, UNCERTAIN_TAG};

/// Placeholder for missing site metadata.
pub const UNKNOWN: &str = "Unknown";

/// Site population: raw text from the site list until cleaned to a count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Population {
    Count(u64),
    Text(String),
}

impl Population {
    /// Parse `"1,234,567"`-style text into a count, keeping the text otherwise.
    pub fn normalized(&self) -> Population {
        match self {
            Self::Count(n) => Self::Count(*n),
            Self::Text(text) => text
                .replace(',', "")
                .trim()
                .parse::<u64>()
                .map(Self::Count)
                .unwrap_or_else(|_| self.clone()),
        }
    }

    pub fn as_count(&self) -> Option<u64> {
        match self.normalized() {
            Self::Count(n) => Some(n),
            Self::Text(_) => None,
        }
    }
}

impl Default for Population {
    fn default() -> Self {
        Self::Text(UNKNOWN.to_string())
    }
}

impl fmt::Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{}", n),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Site description from the site list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteMetadata {
    pub name: String,
    pub category: String,
    pub state_id: String,
    #[serde(default)]
    pub population: Population,
}

/// Outcome of fetching one site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlLogEntry {
    pub url: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CrawlLogEntry {
    /// Successful fetch with no recorded error.
    pub fn is_clean_success(&self) -> bool {
        self.success && self.error.is_none()
    }
}

/// Crawl bookkeeping attached to the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlInfo {
    pub url: Vec<CrawlLogEntry>,
    pub sites_crawled_count: usize,
    pub successful_crawls: usize,
    pub timestamp: String,
    pub student_name: String,
}

impl CrawlInfo {
    pub fn from_log(log: Vec<CrawlLogEntry>, timestamp: String, student_name: String) -> Self {
        let successful_crawls = log.iter().filter(|e| e.is_clean_success()).count();
        Self {
            sites_crawled_count: log.len(),
            successful_crawls,
            url: log,
            timestamp,
            student_name,
        }
    }

    pub fn failed_crawls(&self) -> usize {
        self.sites_crawled_count.saturating_sub(self.successful_crawls)
    }
}

/// Global resource counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub total_resources: usize,
    pub by_category: BTreeMap<String, usize>,
    pub by_tag: BTreeMap<String, usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawl_info: Option<CrawlInfo>,
}

impl AggregateSummary {
    /// Count the `resources` of every site. Unverified buckets are ignored.
    pub fn from_results(results: &[SiteResult]) -> Self {
        let mut summary = Self::default();
        for record in results.iter().flat_map(|site| site.resources.iter()) {
            summary.total_resources += 1;
            *summary
                .by_category
                .entry(record.category.to_string())
                .or_default() += 1;
            for tag in record.tags.iter() {
                *summary.by_tag.entry(tag.to_string()).or_default() += 1;
            }
        }
        summary
    }

    pub fn with_crawl_info(mut self, crawl_info: Option<CrawlInfo>) -> Self {
        self.crawl_info = crawl_info;
        self
    }

    /// Tag counts without the verification-only `uncertain` tag.
    pub fn topical_tags(&self) -> impl Iterator<Item = (&str, usize)> {
        self.by_tag
            .iter()
            .filter(|(tag, _)| !tag.eq_ignore_ascii_case(UNCERTAIN_TAG))
            .map(|(tag, count)| (tag.as_str(), *count))
    }
}

/// Results for one crawled site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteResult {
    pub url: String,

    /// Page crawl time; absent when the fetch failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(flatten)]
    pub metadata: SiteMetadata,

    pub crawled_at: String,

    #[serde(default)]
    pub resources: Vec<ResourceRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unverified_resources: Option<Vec<ResourceRecord>>,
}

/// Full output document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlReport {
    pub summary: AggregateSummary,
    pub results: Vec<SiteResult>,
}

impl CrawlReport {
    /// Build a report, computing the summary from the results.
    pub fn new(results: Vec<SiteResult>, crawl_info: Option<CrawlInfo>) -> Self {
        let summary = AggregateSummary::from_results(&results).with_crawl_info(crawl_info);
        Self { summary, results }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resource::{Category, ResourceType, TagSet};
    use pretty_assertions::assert_eq;

    fn record(category: Category, resource_type: ResourceType, value: &str, tags: &[&str]) -> ResourceRecord {
        ResourceRecord::new(
            category,
            resource_type,
            value,
            tags.iter().copied().collect::<TagSet>(),
            "test",
            0.9,
        )
    }

    fn site(resources: Vec<ResourceRecord>) -> SiteResult {
        SiteResult {
            url: "https://example.gov".to_string(),
            timestamp: None,
            metadata: SiteMetadata::default(),
            crawled_at: "2025-01-01T00:00:00".to_string(),
            resources,
            unverified_resources: None,
        }
    }

    #[test]
    fn test_population_normalized() {
        assert_eq!(
            Population::Text("1,234,567".to_string()).normalized(),
            Population::Count(1_234_567)
        );
        assert_eq!(
            Population::Text("Unknown".to_string()).normalized(),
            Population::Text("Unknown".to_string())
        );
        assert_eq!(Population::Count(5).as_count(), Some(5));
    }

    #[test]
    fn test_summary_counts_only_kept_resources() {
        let mut first = site(vec![
            record(Category::ContactInfo, ResourceType::PhoneNumber, "(707) 465-0426", &["general"]),
            record(Category::Facility, ResourceType::FacilityName, "County Clinic", &["clinic", "general"]),
        ]);
        first.unverified_resources = Some(vec![record(
            Category::Location,
            ResourceType::Address,
            "1 Main St",
            &["general"],
        )]);
        let second = site(vec![record(
            Category::ContactInfo,
            ResourceType::TollNumber,
            "(800) 446-4408",
            &["crisis_services"],
        )]);

        let summary = AggregateSummary::from_results(&[first, second]);

        assert_eq!(summary.total_resources, 3);
        assert_eq!(summary.by_category.get("CONTACT_INFO"), Some(&2));
        assert_eq!(summary.by_category.get("LOCATION"), None);
        assert_eq!(summary.by_tag.get("general"), Some(&2));
    }

    #[test]
    fn test_crawl_info_counts_clean_successes() {
        let log = vec![
            CrawlLogEntry { url: "a".into(), success: true, status_code: Some(200), error: None },
            CrawlLogEntry {
                url: "b".into(),
                success: true,
                status_code: Some(200),
                error: Some("phone_extractor: boom".into()),
            },
            CrawlLogEntry { url: "c".into(), success: false, status_code: None, error: None },
        ];
        let info = CrawlInfo::from_log(log, "now".into(), "Analyst".into());

        assert_eq!(info.sites_crawled_count, 3);
        assert_eq!(info.successful_crawls, 1);
        assert_eq!(info.failed_crawls(), 2);
    }

    #[test]
    fn test_site_result_flattens_metadata() {
        let mut result = site(Vec::new());
        result.metadata = SiteMetadata {
            name: "Del Norte County".into(),
            category: "county".into(),
            state_id: "ca".into(),
            population: Population::Text("27,743".into()),
        };
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["name"], "Del Norte County");
        assert_eq!(value["population"], "27,743");
        assert!(value.get("timestamp").is_none());
        assert!(value.get("unverified_resources").is_none());
    }
}
