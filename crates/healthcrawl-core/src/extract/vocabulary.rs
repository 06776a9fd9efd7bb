//! Keyword tables shared by every extractor.
//!
//! A [`Lexicon`] is built once at startup and handed to the extractors behind an
//! `Arc`; nothing here is mutated after construction.

use regex::RegexSet;

use crate::error::ExtractionError;
use crate::models::resource::TagSet;

/// Topic tags and the keyword phrases that trigger them, in matching order.
pub const TAG_KEYWORDS: &[(&str, &[&str])] = &[
    ("flu", &["flu", "influenza", "flu shot", "flu vaccine"]),
    ("covid19", &["covid", "covid-19", "coronavirus", "sars-cov-2"]),
    ("vaccination", &["vaccine", "vaccination", "immunization", "shot"]),
    ("mental_health", &["mental health", "behavioral health", "counseling", "therapy"]),
    ("pediatric", &["pediatric", "children", "kids", "infant", "child"]),
    ("dental", &["dental", "dentist", "teeth", "oral health"]),
    ("emergency_room", &["emergency", "er", "trauma", "24 hour"]),
    ("urgent_care", &["urgent care", "walk-in", "immediate care"]),
    ("crisis_services", &["crisis", "suicide", "crisis line", "hotline"]),
    ("substance_abuse", &["substance", "addiction", "rehab", "detox"]),
    ("opioid_treatment", &["opioid", "methadone", "suboxone", "narcan"]),
    (
        "rsv",
        &[
            "rsv",
            "respiratory syncytial",
            "respiratory syncytial virus",
            "respiratory syncytial virus (rsv)",
            "bronchiolitis",
        ],
    ),
    ("measles", &["measles", "rubeola", "measles vaccine", "mmr", "measles immunization"]),
    (
        "tuberculosis",
        &["tuberculosis", "tb", "tb test", "mantoux", "tuberculin", "latent tb", "active tb"],
    ),
    (
        "mpox",
        &["mpox", "monkeypox", "monkey pox", "mpox vaccine", "mpox testing", "mpox treatment"],
    ),
    (
        "hepatitis",
        &[
            "hepatitis",
            "hepatitis a",
            "hepatitis b",
            "hepatitis c",
            "hep a",
            "hep b",
            "hep c",
            "hepatitis vaccine",
            "hepatitis testing",
        ],
    ),
    (
        "std",
        &[
            "sexually transmitted",
            "std",
            "sti",
            "std testing",
            "sti testing",
            "sexual health",
            "gonorrhea",
            "chlamydia",
            "syphilis",
        ],
    ),
    (
        "vision",
        &[
            "vision",
            "eye care",
            "optometry",
            "ophthalmology",
            "eye exam",
            "vision screening",
            "glasses",
        ],
    ),
    (
        "diabetes",
        &["diabetes", "blood sugar", "insulin", "type 1", "type 2", "diabetic", "glucometer", "a1c"],
    ),
    (
        "hypertension",
        &["hypertension", "high blood pressure", "bp", "blood pressure", "hypertensive"],
    ),
    ("asthma", &["asthma", "inhaler", "wheezing", "bronchospasm", "peak flow"]),
    (
        "cancer",
        &[
            "cancer",
            "oncology",
            "chemotherapy",
            "radiation therapy",
            "tumor",
            "breast cancer",
            "screening",
        ],
    ),
    (
        "hiv",
        &[
            "hiv",
            "human immunodeficiency virus",
            "hiv testing",
            "antiretroviral",
            "prep",
            "post-exposure prophylaxis",
            "art",
        ],
    ),
    (
        "maternal_health",
        &["maternal", "pregnancy", "prenatal", "postpartum", "obstetric", "midwife", "birthing"],
    ),
    (
        "family_planning",
        &["contraception", "birth control", "family planning", "iud", "implant", "condom"],
    ),
    ("substance_use", &["substance use", "opioid", "overdose", "naloxone", "sober", "detox"]),
    (
        "tobacco",
        &["tobacco", "smoking", "smoking cessation", "quit smoking", "nicotine replacement"],
    ),
    (
        "nutrition",
        &["nutrition", "diet", "healthy eating", "food security", "nutrition counseling"],
    ),
    (
        "physical_activity",
        &["exercise", "physical activity", "fitness", "walking program", "rehab"],
    ),
    ("lead", &["lead", "lead poisoning", "lead testing", "lead exposure", "paint", "child lead"]),
    ("vector_borne", &["mosquito", "vector", "tick", "lyme", "west nile", "vector control"]),
    (
        "telehealth",
        &["telehealth", "telemedicine", "virtual visit", "video visit", "remote care"],
    ),
    (
        "palliative_care",
        &["palliative", "hospice", "end of life", "comfort care", "advance care planning"],
    ),
    (
        "occupational_health",
        &[
            "occupational health",
            "workplace safety",
            "workers compensation",
            "occupational medicine",
        ],
    ),
    (
        "school_health",
        &["school nurse", "school health", "school-based clinic", "student health"],
    ),
    (
        "hearing",
        &["hearing", "audiology", "hearing aid", "deaf", "tinnitus", "audiologist"],
    ),
    (
        "dermatology",
        &["dermatology", "skin", "rash", "eczema", "psoriasis", "derm clinic"],
    ),
    (
        "kidney_disease",
        &["dialysis", "kidney", "renal", "nephrology", "hemodialysis", "peritoneal dialysis"],
    ),
    (
        "injury_trauma",
        &["injury", "trauma", "trauma center", "fracture", "burn", "injury prevention"],
    ),
    (
        "chronic_pain",
        &["chronic pain", "pain management", "pain clinic", "analgesia", "pain specialist"],
    ),
    (
        "reproductive_health",
        &["reproductive health", "sexual health", "menopause", "gynecology", "ob-gyn"],
    ),
    (
        "transplant_immunocompromised",
        &["transplant", "immunocompromised", "post-transplant", "organ transplant"],
    ),
    (
        "womens_health",
        &[
            "women",
            "women's health",
            "gynecology",
            "obgyn",
            "pap smear",
            "mammogram",
            "breast health",
            "reproductive health",
            "menopause",
        ],
    ),
    (
        "senior_care",
        &[
            "senior",
            "elderly",
            "geriatrics",
            "senior services",
            "assisted living",
            "home care",
            "medicare",
            "older adults",
            "aging services",
        ],
    ),
];

/// Phrases that make a heading a SERVICE rather than a FACILITY.
pub const SERVICE_KEYWORDS: &[&str] = &[
    "vaccination", "vaccine", "vaccines", "vaccination program", "vaccination programs",
    "immunization", "immunizations", "immunize", "immunization clinic", "vaccine clinic",
    "testing", "test", "testing services", "covid testing", "test site",
    "treatment", "treatment program", "treatment programs", "therapy",
    "screening", "screenings", "health screening", "cancer screening",
    "mold", "mold remediation", "remediation", "inspection", "inspection request", "request service",
    "rodent", "rodents", "rodent control", "pest control",
    "food", "food safety", "restaurant", "complaint", "report a restaurant",
    "billing", "billing assistance", "financial assistance", "help paying", "hospital bill",
    "clinic", "clinics",
    "poison control", "emergency services", "food assistance", "housing assistance",
    "medical transportation", "transportation", "language services", "insurance help",
    "disability services", "disability support",
    "developmental services", "early intervention", "child development", "special needs",
    "early childhood services",
    "extreme heat", "air quality", "water safety", "urgent care center", "testing site",
];

/// Navigation, footer and boilerplate headings that are never facilities.
pub const GENERIC_UI_TERMS: &[&str] = &[
    "quick links", "categories", "program highlights", "contact us", "helpful links",
    "follow us", "sign up", "most searched", "connect", "items of interest", "resources",
    "follow us on facebook", "follow us on social media", "welcome",
    "contact info", "contact information", "contact details", "contact", "contact-us",
    "site links", "popular links", "site map", "sitemap", "email public health", "subscribe",
    "newsletter",
    "our mission", "mission", "our commitment", "commitment to", "our values", "about us",
    "about", "what we do", "our programs", "our services",
    "site footer", "latest news", "navigation", "additional links", "top menu", "facebook",
    "share this page", "headlines", "social media",
    "hipaa compliance", "are you prepared for an emergency?",
];

/// Words that mark text as naming an organization or facility.
pub const FACILITY_INDICATORS: &[&str] = &[
    "department", "public health", "health department", "office", "division",
    "clinic", "center", "hospital", "health services", "healthcare",
];

/// Section headings about the organization rather than naming it.
pub const MISSION_TERMS: &[&str] = &[
    "mission", "commitment to", "our commitment", "our mission", "our values", "about us",
    "about", "what we do",
];

/// Words suggesting a heading names a health facility.
pub const HEALTH_KEYWORDS: &[&str] = &[
    "clinic", "hospital", "medical", "health", "center", "pharmacy", "dental", "care",
    "urgent", "family",
];

/// Document-type words that disqualify a heading as a facility name.
pub const NON_FACILITY_TERMS: &[&str] = &[
    "update", "transcript", "video", "welcome", "report", "press", "notice", "alert",
    "committee", "board", "minutes", "agenda",
];

/// Street-type words accepted by address validation.
pub const STREET_WORDS: &[&str] = &[
    "street", "st", "avenue", "ave", "road", "rd", "boulevard", "blvd", "drive", "dr", "lane",
    "ln", "court", "ct", "highway", "hwy", "parkway", "pkwy", "way", "place", "pl", "terrace",
    "ter",
];

/// Maps topic tags to keyword phrases.
#[derive(Debug, Clone)]
pub struct TagVocabulary {
    entries: Vec<(String, Vec<String>)>,
}

impl TagVocabulary {
    pub fn new(entries: Vec<(String, Vec<String>)>) -> Self {
        Self { entries }
    }

    /// The built-in health topic vocabulary.
    pub fn standard() -> Self {
        Self::new(
            TAG_KEYWORDS
                .iter()
                .map(|(tag, keywords)| {
                    (
                        tag.to_string(),
                        keywords.iter().map(|k| k.to_string()).collect(),
                    )
                })
                .collect(),
        )
    }

    /// Tags whose keywords occur anywhere in `text` or `context`.
    ///
    /// Matching is case-insensitive substring search; the result follows
    /// vocabulary order and is empty when nothing matches.
    pub fn tag(&self, text: &str, context: &str) -> TagSet {
        let haystack = format!("{} {}", text, context).to_lowercase();
        self.entries
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|k| haystack.contains(k.as_str())))
            .map(|(tag, _)| tag.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Word-boundary matcher over the service keyword phrases.
#[derive(Debug, Clone)]
pub struct ServiceKeywords {
    patterns: RegexSet,
}

impl ServiceKeywords {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self, ExtractionError> {
        let patterns = RegexSet::new(
            keywords
                .iter()
                .map(|k| format!(r"\b{}\b", regex::escape(&k.as_ref().to_lowercase()))),
        )?;
        Ok(Self { patterns })
    }

    pub fn standard() -> Result<Self, ExtractionError> {
        Self::new(SERVICE_KEYWORDS)
    }

    /// Whether any service phrase occurs as whole words in lowercase `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.patterns.is_match(text)
    }
}

/// Every keyword table the extractors consult.
#[derive(Debug, Clone)]
pub struct Lexicon {
    pub vocabulary: TagVocabulary,
    pub service_keywords: ServiceKeywords,
    pub generic_ui_terms: Vec<String>,
    pub facility_indicators: Vec<String>,
    pub mission_terms: Vec<String>,
    pub health_keywords: Vec<String>,
    pub non_facility_terms: Vec<String>,
    pub street_words: Vec<String>,
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn contains_any(text: &str, terms: &[String]) -> bool {
    terms.iter().any(|t| text.contains(t.as_str()))
}

impl Lexicon {
    /// The built-in tables.
    pub fn standard() -> Result<Self, ExtractionError> {
        Ok(Self {
            vocabulary: TagVocabulary::standard(),
            service_keywords: ServiceKeywords::standard()?,
            generic_ui_terms: owned(GENERIC_UI_TERMS),
            facility_indicators: owned(FACILITY_INDICATORS),
            mission_terms: owned(MISSION_TERMS),
            health_keywords: owned(HEALTH_KEYWORDS),
            non_facility_terms: owned(NON_FACILITY_TERMS),
            street_words: owned(STREET_WORDS),
        })
    }

    /// `lower` contains a generic UI phrase.
    pub fn mentions_ui_term(&self, lower: &str) -> bool {
        contains_any(lower, &self.generic_ui_terms)
    }

    pub fn has_facility_indicator(&self, lower: &str) -> bool {
        contains_any(lower, &self.facility_indicators)
    }

    pub fn has_health_keyword(&self, lower: &str) -> bool {
        contains_any(lower, &self.health_keywords)
    }

    pub fn has_non_facility_term(&self, lower: &str) -> bool {
        contains_any(lower, &self.non_facility_terms)
    }

    pub fn has_street_word(&self, lower: &str) -> bool {
        contains_any(lower, &self.street_words)
    }

    /// Whether a lowercase heading is navigation/boilerplate rather than a name.
    ///
    /// Besides the UI phrase list, short "contact" headings (three words or
    /// fewer, excluding contact tracing) and short mission-style headings
    /// (ten words or fewer) count as generic.
    pub fn is_generic_ui(&self, lower: &str) -> bool {
        if self.mentions_ui_term(lower) {
            return true;
        }
        let words = lower.split_whitespace().count();
        if lower.contains("contact") && !lower.contains("tracing") && words <= 3 {
            return true;
        }
        contains_any(lower, &self.mission_terms) && words <= 10
    }
}
