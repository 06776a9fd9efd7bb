//! HTTP page fetching with browser-like headers.

use std::time::Duration;

use anyhow::Context;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONNECTION, HeaderMap, HeaderValue, UPGRADE_INSECURE_REQUESTS};
use tracing::{info, warn};

use healthcrawl_core::models::config::CrawlConfig;
use healthcrawl_core::sanitize_error;

/// Result of fetching one page. Never an error: failures are recorded here.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub html: Option<String>,
    pub status_code: Option<u16>,
    pub error: Option<String>,
}

impl FetchOutcome {
    /// An HTTP status below 400 was received.
    pub fn is_success(&self) -> bool {
        self.status_code.is_some_and(|code| code < 400)
    }
}

/// Shared HTTP client for a crawl run.
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    pub fn new(config: &CrawlConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        info!("Fetching: {}", url);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return failure(url, e.status().map(|s| s.as_u16()), &e),
        };

        let status = response.status().as_u16();
        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(e) => return failure(url, Some(status), &e),
        };

        match response.text().await {
            Ok(html) => FetchOutcome {
                html: Some(html),
                status_code: Some(status),
                error: None,
            },
            Err(e) => failure(url, Some(status), &e),
        }
    }
}

fn failure(url: &str, status_code: Option<u16>, error: &reqwest::Error) -> FetchOutcome {
    let message = sanitize_error(&error.to_string());
    warn!("Error fetching {}: {}", url, message);
    FetchOutcome {
        html: None,
        status_code,
        error: Some(message),
    }
}
