//! CLI subcommands.

pub mod clean;
pub mod config;
pub mod crawl;
pub mod page;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use console::style;
use tracing::warn;

use healthcrawl_core::HealthCrawlConfig;

/// Config from `--config`, else the default config file if present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<HealthCrawlConfig> {
    if let Some(path) = config_path {
        return Ok(HealthCrawlConfig::from_file(Path::new(path))?);
    }
    let default_path = config::default_config_path();
    if default_path.exists() {
        return Ok(HealthCrawlConfig::from_file(&default_path)?);
    }
    Ok(HealthCrawlConfig::default())
}

/// Timestamp used in output file names.
pub fn file_timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Create `dir`, falling back to the current directory if that fails.
pub fn ensure_dir(dir: &Path) -> PathBuf {
    match fs::create_dir_all(dir) {
        Ok(()) => dir.to_path_buf(),
        Err(e) => {
            warn!("Cannot create {}: {}, writing to current directory", dir.display(), e);
            PathBuf::from(".")
        }
    }
}

/// Write `content` to `dir/file_name`, reporting the outcome on the console.
///
/// Write failures are reported but not fatal.
pub fn write_output(dir: &Path, file_name: &str, content: &str, label: &str) -> Option<PathBuf> {
    let path = ensure_dir(dir).join(file_name);
    match fs::write(&path, content) {
        Ok(()) => {
            println!("{} {} written to {}", style("✓").green(), label, path.display());
            Some(path)
        }
        Err(e) => {
            let message = healthcrawl_core::sanitize_error(&e.to_string());
            warn!("Failed to write {}: {}", path.display(), message);
            eprintln!(
                "{} Failed to write {} to {}: {}",
                style("✗").red(),
                label,
                path.display(),
                message
            );
            None
        }
    }
}
