//! Human-readable summaries of crawl results.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::models::report::{CrawlReport, SiteResult, UNKNOWN};
use crate::models::resource::{Category, ResourceRecord, UNCERTAIN_TAG};

/// Number of entries in top-N rankings.
pub const TOP_N: usize = 5;

const OBSERVATIONS: &[&str] = &[
    "Larger counties tend to have more comprehensive online resources",
    "All counties provide main contact numbers",
    "Crisis services information varies by county",
    "Hospital facilities well-represented across all sites",
];

/// `1234567` as `"1,234,567"`.
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `"mental_health"` as `"Mental Health"`.
pub fn title_case(tag: &str) -> String {
    tag.split(['_', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

/// Records grouped by category, categories in order of first appearance.
pub fn group_by_category(records: &[ResourceRecord]) -> Vec<(Category, Vec<&ResourceRecord>)> {
    let mut groups: Vec<(Category, Vec<&ResourceRecord>)> = Vec::new();
    for record in records {
        match groups.iter_mut().find(|(c, _)| *c == record.category) {
            Some((_, items)) => items.push(record),
            None => groups.push((record.category, vec![record])),
        }
    }
    groups
}

/// Sites ranked by resource count, highest first, keeping crawl order on ties.
pub fn top_organizations(results: &[SiteResult]) -> Vec<(&str, usize)> {
    let mut ranking: Vec<(&str, usize)> = results
        .iter()
        .map(|site| (site.metadata.name.as_str(), site.resources.len()))
        .collect();
    ranking.sort_by(|a, b| b.1.cmp(&a.1));
    ranking.truncate(TOP_N);
    ranking
}

fn county_name(site: &SiteResult) -> &str {
    [site.metadata.name.as_str(), site.metadata.state_id.as_str()]
        .into_iter()
        .map(str::trim)
        .find(|n| !n.is_empty())
        .unwrap_or(UNKNOWN)
}

/// Resource counts summed per county name, by count then name.
pub fn top_counties(results: &[SiteResult]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for site in results {
        *counts.entry(county_name(site).to_string()).or_default() += site.resources.len();
    }
    let mut ranking: Vec<(String, usize)> = counts.into_iter().collect();
    ranking.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranking.truncate(TOP_N);
    ranking
}

/// Most frequent tags of a site, `uncertain` excluded.
fn highlights(site: &SiteResult) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for tag in site.resources.iter().flat_map(|r| r.tags.iter()) {
        if !tag.eq_ignore_ascii_case(UNCERTAIN_TAG) {
            *counts.entry(tag).or_default() += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.into_iter().take(TOP_N).map(|(t, _)| title_case(t)).collect()
}

fn state_label(results: &[SiteResult]) -> String {
    results
        .first()
        .map(|site| site.metadata.state_id.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
        .unwrap_or_else(|| "ALL".to_string())
}

fn display_time(timestamp: &str) -> String {
    NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

fn site_detail(lines: &mut Vec<String>, name: &str, results: &[SiteResult]) {
    let site = results
        .iter()
        .find(|s| s.metadata.name.trim() == name)
        .or_else(|| {
            let needle = name.to_lowercase();
            results
                .iter()
                .find(|s| s.metadata.name.to_lowercase().contains(&needle))
        });

    lines.push(String::new());
    lines.push(format!("{}:", name));

    let Some(site) = site else {
        lines.push(format!("- Population: {}", UNKNOWN));
        lines.push("- Resources: 0 total (0 phones, 0 addresses, 0 facilities)".to_string());
        lines.push("- Highlights: None identified".to_string());
        return;
    };

    let population = match site.metadata.population.as_count() {
        Some(n) => format_thousands(n),
        None => site.metadata.population.to_string(),
    };
    lines.push(format!("- Population: {}", population));

    let count = |category: Category| site.resources.iter().filter(|r| r.category == category).count();
    let phones = count(Category::ContactInfo);
    let addresses = count(Category::Location);
    let facilities = count(Category::Facility);
    lines.push(format!(
        "- Resources: {} total ({} {}, {} {}, {} {})",
        site.resources.len(),
        phones,
        plural(phones, "phone", "phones"),
        addresses,
        plural(addresses, "address", "addresses"),
        facilities,
        plural(facilities, "facility", "facilities"),
    ));

    let tags = highlights(site);
    if tags.is_empty() {
        lines.push("- Highlights: None identified".to_string());
    } else {
        lines.push(format!("- Highlights: {}", tags.join(", ")));
    }
}

/// Plain-text batch report.
///
/// `now` is used as the crawl time when the report carries no crawl info.
pub fn render_summary_report(report: &CrawlReport, now: &str) -> String {
    let summary = &report.summary;
    let info = summary.crawl_info.as_ref();

    let crawled = info.map(|i| i.timestamp.as_str()).unwrap_or(now);
    let total_sites = info.map(|i| i.sites_crawled_count).unwrap_or(report.results.len());
    let successful = info.map(|i| i.successful_crawls).unwrap_or(total_sites);
    let operator = info.map(|i| i.student_name.as_str()).unwrap_or(UNKNOWN);

    let mut lines = vec![
        format!("BATCH CRAWLING REPORT - {}", state_label(&report.results)),
        "=".repeat(50),
        String::new(),
        format!("Crawled: {}", display_time(crawled)),
        format!("Total Sites: {}", total_sites),
        format!("Successful: {}", successful),
        format!("Failed: {}", total_sites.saturating_sub(successful)),
        String::new(),
        "SUMMARY STATISTICS".to_string(),
        "-".repeat(20),
        format!("Total Resources Found: {}", summary.total_resources),
        String::new(),
        "Resources by category:".to_string(),
    ];
    lines.extend(summary.by_category.iter().map(|(c, n)| format!("{}: {}", c, n)));

    lines.push(String::new());
    lines.push("Resources by tag:".to_string());
    lines.extend(summary.topical_tags().map(|(t, n)| format!("{}: {}", t, n)));

    lines.push(String::new());
    lines.push("TOP 5 COUNTIES BY RESOURCES FOUND".to_string());
    lines.push("-".repeat(35));
    let counties = top_counties(&report.results);
    if counties.is_empty() {
        lines.push("No sites crawled".to_string());
    }
    for (name, count) in &counties {
        lines.push(format!("{}: {} {}", name, count, plural(*count, "resource", "resources")));
    }

    lines.push(String::new());
    lines.push("DETAILED FINDINGS".to_string());
    lines.push("-".repeat(17));
    for (name, _) in &counties {
        site_detail(&mut lines, name, &report.results);
    }

    lines.push(String::new());
    lines.push("OBSERVATIONS".to_string());
    lines.push("-".repeat(12));
    lines.extend(OBSERVATIONS.iter().map(|o| format!("- {}", o)));
    lines.push(String::new());
    lines.push("Detailed results available in JSON format.".to_string());
    lines.push(format!("Generated by student: {}", operator));

    lines.join("\n")
}
