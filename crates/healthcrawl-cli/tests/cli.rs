use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

const PAGE: &str = r#"<html><body>
<h1>Riverside County Public Health Department</h1>
<p>Information on local programs is available Monday to Friday during normal hours.</p>
<div class="hotline">Call (800) 446-4408</div>
</body></html>"#;

const BATCH: &str = r#"{
  "summary": {"total_resources": 3, "by_category": {}, "by_tag": {}},
  "results": [{
    "url": "https://example.gov",
    "name": "Del Norte County",
    "category": "county",
    "state_id": "ca",
    "population": "27,743",
    "crawled_at": "2025-11-29T14:53:53",
    "resources": [
      {"category": "CONTACT_INFO", "type": "phone_number", "value": "7074650426",
       "tags": ["general"], "context": "footer", "confidence": 0.7},
      {"category": "FACILITY", "type": "facility_name", "value": "Mercy Hospital",
       "tags": ["hospital"], "context": "heading", "confidence": 0.4}
    ]
  }]
}"#;

/// Command isolated from the user's configuration file.
fn healthcrawl(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("healthcrawl").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.join("config"))
        .env("HOME", home)
        .current_dir(home);
    cmd
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    healthcrawl(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("crawl"))
        .stdout(predicate::str::contains("clean"));
}

#[test]
fn test_page_from_file_as_json() {
    let dir = TempDir::new().unwrap();
    let page = dir.path().join("page.html");
    fs::write(&page, PAGE).unwrap();

    let output = healthcrawl(dir.path())
        .args(["page", "--file"])
        .arg(&page)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result: Value = serde_json::from_slice(&output.stdout).unwrap();
    let resources = result["resources"].as_array().unwrap();
    assert_eq!(resources.len(), 2);
    assert!(resources
        .iter()
        .any(|r| r["type"] == "toll_number" && r["value"] == "(800) 446-4408"));
    assert!(resources
        .iter()
        .any(|r| r["category"] == "FACILITY" && r["confidence"].as_f64().unwrap() >= 0.7));
}

#[test]
fn test_page_text_output_and_save() {
    let dir = TempDir::new().unwrap();
    let page = dir.path().join("page.html");
    fs::write(&page, PAGE).unwrap();

    healthcrawl(dir.path())
        .args(["page", "--file"])
        .arg(&page)
        .arg("--save")
        .assert()
        .success()
        .stdout(predicate::str::contains("CONTACT_INFO (1 items):"))
        .stdout(predicate::str::contains("Riverside County Public Health Department"));

    let saved: Vec<_> = fs::read_dir(dir.path().join("output"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("categorized_results_"))
        .collect();
    assert_eq!(saved.len(), 1);
}

#[test]
fn test_page_requires_input() {
    let dir = TempDir::new().unwrap();
    healthcrawl(dir.path()).arg("page").assert().failure();
}

#[test]
fn test_clean_explicit_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("batch.json");
    fs::write(&input, BATCH).unwrap();
    let out_dir = dir.path().join("cleaned");

    healthcrawl(dir.path())
        .arg("clean")
        .arg(&input)
        .arg("--output-dir")
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote cleaned file"));

    let cleaned = read_json(&out_dir.join("batch.cleaned.json"));
    let site = &cleaned["results"][0];
    assert_eq!(site["resources"][0]["value"], "(707) 465-0426");
    assert_eq!(site["resources"][0]["verified"], true);
    assert_eq!(site["unverified_resources"][0]["value"], "Mercy Hospital");
    assert_eq!(site["population"], 27743);
    assert_eq!(cleaned["summary"]["total_resources"], 1);
}

#[test]
fn test_clean_discovers_latest_batch() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("output");
    fs::create_dir_all(&output).unwrap();
    fs::write(output.join("batch_crawl_results_20250101_000000.json"), "not json").unwrap();
    fs::write(output.join("batch_crawl_results_20251129_145353.json"), BATCH).unwrap();

    healthcrawl(dir.path()).arg("clean").assert().success();

    let cleaned = dir
        .path()
        .join("cleaned_output")
        .join("batch_crawl_results_20251129_145353.cleaned.json");
    assert!(cleaned.exists());
}

#[test]
fn test_clean_missing_input_is_reported() {
    let dir = TempDir::new().unwrap();
    healthcrawl(dir.path())
        .args(["clean", "missing.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Input file not found"));
}

#[test]
fn test_clean_cutoff_override() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("batch.json");
    fs::write(&input, BATCH).unwrap();

    healthcrawl(dir.path())
        .arg("clean")
        .arg(&input)
        .args(["--cutoff", "0.3"])
        .assert()
        .success();

    let cleaned = read_json(&dir.path().join("cleaned_output").join("batch.cleaned.json"));
    assert_eq!(cleaned["summary"]["total_resources"], 2);
}

#[test]
fn test_config_init_set_get() {
    let dir = TempDir::new().unwrap();

    healthcrawl(dir.path())
        .args(["config", "init"])
        .assert()
        .success();
    assert!(dir.path().join("config/healthcrawl/config.json").exists());

    healthcrawl(dir.path())
        .args(["config", "set", "extraction.confidence_cutoff", "0.6"])
        .assert()
        .success();

    healthcrawl(dir.path())
        .args(["config", "get", "extraction.confidence_cutoff"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.6"));

    healthcrawl(dir.path())
        .args(["config", "get", "extraction.nope"])
        .assert()
        .failure();
}

#[test]
fn test_config_rejects_out_of_range_cutoff() {
    let dir = TempDir::new().unwrap();

    healthcrawl(dir.path())
        .args(["config", "set", "extraction.confidence_cutoff", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("confidence_cutoff must be between 0 and 1"));
    assert!(!dir.path().join("config/healthcrawl/config.json").exists());

    let bad = dir.path().join("bad.json");
    fs::write(&bad, r#"{"extraction": {"confidence_cutoff": -1}}"#).unwrap();
    healthcrawl(dir.path())
        .arg("--config")
        .arg(&bad)
        .args(["clean", "missing.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration error"));
}

#[test]
fn test_crawl_missing_site_list() {
    let dir = TempDir::new().unwrap();
    healthcrawl(dir.path())
        .args(["crawl", "--state", "zz"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Site list not found"));
}

#[test]
fn test_crawl_records_failed_fetch() {
    let dir = TempDir::new().unwrap();
    let sites = dir.path().join("sites.csv");
    fs::write(
        &sites,
        "name;pha_url;state_id;category;population_proper\n\
         Nowhere County;http://127.0.0.1:9/;ca;county;1,000\n",
    )
    .unwrap();

    healthcrawl(dir.path())
        .args(["crawl", "--sites"])
        .arg(&sites)
        .args(["--delay", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total sites crawled: 1"));

    let batch = fs::read_dir(dir.path().join("output"))
        .unwrap()
        .filter_map(|e| e.ok())
        .find(|e| e.file_name().to_string_lossy().starts_with("batch_crawl_results_"))
        .unwrap();
    let report = read_json(&batch.path());
    let info = &report["summary"]["crawl_info"];
    assert_eq!(info["sites_crawled_count"], 1);
    assert_eq!(info["successful_crawls"], 0);
    assert_eq!(info["url"][0]["success"], false);
    assert_eq!(report["results"][0]["name"], "Nowhere County");

    let summaries: Vec<_> = fs::read_dir(dir.path().join("summary_reports"))
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(summaries.len(), 1);
}
