//! Site list loading.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::info;

use healthcrawl_core::models::report::UNKNOWN;
use healthcrawl_core::{Population, SiteMetadata};

/// One row of a `;`-delimited site list.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SiteRow {
    name: Option<String>,
    pha_url: Option<String>,
    state_id: Option<String>,
    category: Option<String>,
    population_proper: Option<String>,
}

/// A site to crawl.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub url: String,
    pub metadata: SiteMetadata,
}

impl From<SiteRow> for Site {
    fn from(row: SiteRow) -> Self {
        Self {
            url: row.pha_url.unwrap_or_default(),
            metadata: SiteMetadata {
                name: row.name.unwrap_or_else(|| UNKNOWN.to_string()),
                category: row.category.unwrap_or_default(),
                state_id: row.state_id.unwrap_or_default(),
                population: Population::Text(
                    row.population_proper.unwrap_or_else(|| UNKNOWN.to_string()),
                ),
            },
        }
    }
}

/// Load a site list; missing columns fall back to defaults.
pub fn load_sites(path: &Path) -> anyhow::Result<Vec<Site>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Cannot open site list {}", path.display()))?;

    let mut sites = Vec::new();
    for row in reader.deserialize::<SiteRow>() {
        let row = row.with_context(|| format!("Malformed row in {}", path.display()))?;
        sites.push(Site::from(row));
    }

    info!("Loaded {} sites from {}", sites.len(), path.display());
    Ok(sites)
}
