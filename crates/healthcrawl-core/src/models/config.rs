//! Configuration structures for the crawl pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{HealthCrawlError, Result};

/// Main configuration for the healthcrawl pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCrawlConfig {
    /// Resource extraction and cleaning configuration.
    pub extraction: ExtractionConfig,

    /// Fetching and politeness configuration.
    pub crawl: CrawlConfig,

    /// Output locations and report details.
    pub output: OutputConfig,
}

/// How the page aggregator decides a record is `uncertain`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UncertainRule {
    /// Confidence equals the calibrator's long-text cap exactly.
    #[default]
    Exact,
    /// Confidence is at or below the long-text cap.
    Band,
}

/// Resource extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Records below this confidence are moved to `unverified_resources` when cleaning.
    pub confidence_cutoff: f64,

    /// Rule for tagging low-confidence records as `uncertain`.
    pub uncertain_rule: UncertainRule,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            confidence_cutoff: 0.5,
            uncertain_rule: UncertainRule::Exact,
        }
    }
}

/// Fetching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Seconds to wait between sites.
    pub delay_secs: u64,

    /// Maximum number of sites crawled per run.
    pub max_sites: usize,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// Directory holding `us-<state>.csv` site lists.
    pub data_dir: PathBuf,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            delay_secs: 2,
            max_sites: 10,
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            data_dir: PathBuf::from("data/websites"),
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for JSON crawl results.
    pub dir: PathBuf,

    /// Directory for plain-text summary reports.
    pub summary_dir: PathBuf,

    /// Directory for cleaned JSON documents.
    pub cleaned_dir: PathBuf,

    /// Name recorded in `crawl_info.student_name`.
    pub student_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            summary_dir: PathBuf::from("summary_reports"),
            cleaned_dir: PathBuf::from("cleaned_output"),
            student_name: "Unknown".to_string(),
        }
    }
}

impl HealthCrawlConfig {
    /// Load and validate configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| HealthCrawlError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        let cutoff = self.extraction.confidence_cutoff;
        if !(0.0..=1.0).contains(&cutoff) {
            return Err(HealthCrawlError::Config(format!(
                "extraction.confidence_cutoff must be between 0 and 1, got {}",
                cutoff
            )));
        }
        if self.crawl.timeout_secs == 0 {
            return Err(HealthCrawlError::Config(
                "crawl.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Path of the site list for a two-letter state code.
    pub fn site_list_path(&self, state_code: &str) -> PathBuf {
        self.crawl
            .data_dir
            .join(format!("us-{}.csv", state_code.to_lowercase()))
    }
}
