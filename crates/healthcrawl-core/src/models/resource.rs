//! Extracted resource records and per-page results.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fallback tag for records with no topical match.
pub const GENERAL_TAG: &str = "general";

/// Tag marking a record in the lowest calibrated confidence band.
pub const UNCERTAIN_TAG: &str = "uncertain";

/// Tag for phone numbers found next to crisis or suicide wording.
pub const CRISIS_HOTLINE_TAG: &str = "crisis_hotline";

/// Top-level resource category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Phone numbers.
    ContactInfo,
    /// Postal addresses.
    Location,
    /// Facility and organization names.
    Facility,
    /// Named services and programs.
    Service,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContactInfo => "CONTACT_INFO",
            Self::Location => "LOCATION",
            Self::Facility => "FACILITY",
            Self::Service => "SERVICE",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CONTACT_INFO" => Ok(Self::ContactInfo),
            "LOCATION" => Ok(Self::Location),
            "FACILITY" => Ok(Self::Facility),
            "SERVICE" => Ok(Self::Service),
            other => Err(format!("unknown category: {}", other)),
        }
    }
}

/// Refinement of a [`Category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    PhoneNumber,
    TollNumber,
    Address,
    FacilityName,
    ServiceName,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PhoneNumber => "phone_number",
            Self::TollNumber => "toll_number",
            Self::Address => "address",
            Self::FacilityName => "facility_name",
            Self::ServiceName => "service_name",
        }
    }

    /// Whether values of this type are telephone numbers.
    pub fn is_phone(&self) -> bool {
        matches!(self, Self::PhoneNumber | Self::TollNumber)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "phone_number" => Ok(Self::PhoneNumber),
            "toll_number" => Ok(Self::TollNumber),
            "address" => Ok(Self::Address),
            "facility_name" => Ok(Self::FacilityName),
            "service_name" => Ok(Self::ServiceName),
            other => Err(format!("unknown resource type: {}", other)),
        }
    }
}

/// Insertion-ordered set of topic tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet {
    tags: Vec<String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tag unless already present. Returns `true` if it was added.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Remove a tag. Returns `true` if it was present.
    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn contains_any(&self, tags: &[&str]) -> bool {
        tags.iter().any(|t| self.contains(t))
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tags
    }

    /// Add [`GENERAL_TAG`] when the set is empty.
    pub fn ensure_general(&mut self) {
        if self.tags.is_empty() {
            self.tags.push(GENERAL_TAG.to_string());
        }
    }

    /// Space-joined tags, for keyword matching.
    pub fn joined(&self) -> String {
        self.tags.join(" ")
    }
}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<TagSet> for Vec<String> {
    fn from(set: TagSet) -> Self {
        set.tags
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

/// Key identifying duplicate records: category, type and lowercased value.
pub type ResourceKey = (Category, ResourceType, String);

/// One extracted fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub category: Category,

    #[serde(rename = "type")]
    pub resource_type: ResourceType,

    /// Normalized, whitespace-collapsed value.
    pub value: String,

    pub tags: TagSet,

    /// Label of the page region that produced the record.
    pub context: String,

    /// Confidence score (0.0 - 1.0).
    pub confidence: f64,

    /// Set by the batch cleaner only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

impl ResourceRecord {
    pub fn new(
        category: Category,
        resource_type: ResourceType,
        value: impl Into<String>,
        tags: TagSet,
        context: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            category,
            resource_type,
            value: value.into(),
            tags,
            context: context.into(),
            confidence,
            verified: None,
        }
    }

    pub fn key(&self) -> ResourceKey {
        (self.category, self.resource_type, self.value.to_lowercase())
    }
}

/// Resources extracted from one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageCrawlResult {
    pub url: String,
    pub timestamp: String,
    pub resources: Vec<ResourceRecord>,

    /// Combined per-extractor errors, if any extractor failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageCrawlResult {
    /// Count records of the given category.
    pub fn count(&self, category: Category) -> usize {
        self.resources.iter().filter(|r| r.category == category).count()
    }
}
