//! Field Extractor — turns raw résumé text into a typed `ExtractionResult`.
//!
//! Pure and infallible: no match is represented as `None` or an empty set,
//! never as an error or a sentinel string.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::lexicon::{Lexicon, EDUCATION_LEXICON, JOB_TITLE_LEXICON, SKILLS_LEXICON};

/// Minimum number of digits a phone candidate must carry.
const MIN_PHONE_DIGITS: usize = 9;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.-]+@[\w.-]+").expect("email pattern is valid"));

// Separators are horizontal spaces only; a line break ends the number.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+?\(?\d[\d\p{Zs}\-()]{7,}\d").expect("phone pattern is valid")
});

static YEARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b\d+\+?\s+years?\b").expect("years pattern is valid"));

static DATE_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s+\d{4}\s*[-–—]\s*(?:\d{4}|present)\b",
    )
    .expect("date range pattern is valid")
});

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

/// Experience signals found in a résumé. Empty sets are omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceDetail {
    /// Lower-cased phrases such as `5+ years`.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub years: BTreeSet<String>,
    /// Verbatim phrases such as `Jan 2019 - Present`.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub date_ranges: BTreeSet<String>,
    /// Title-cased job titles from the lexicon.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub job_titles: BTreeSet<String>,
}

impl ExperienceDetail {
    pub fn is_empty(&self) -> bool {
        self.years.is_empty() && self.date_ranges.is_empty() && self.job_titles.is_empty()
    }
}

/// Structured fields extracted from one résumé.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Canonical lowercase skill phrases.
    pub skills: BTreeSet<String>,
    /// Title-cased education credentials.
    pub education: BTreeSet<String>,
    /// `None` when no experience signal of any kind was found.
    pub experience: Option<ExperienceDetail>,
}

// ────────────────────────────────────────────────────────────────────────────
// Extraction
// ────────────────────────────────────────────────────────────────────────────

/// Extracts every structured field from `text`.
pub fn extract(text: &str) -> ExtractionResult {
    // Line breaks and runs of spaces would otherwise split multi-word phrases.
    let flattened = collapse_whitespace(text);

    let experience = ExperienceDetail {
        years: extract_years(&flattened),
        date_ranges: extract_date_ranges(text),
        job_titles: lexicon_matches(&JOB_TITLE_LEXICON, &flattened, title_case),
    };

    ExtractionResult {
        email: extract_email(text),
        phone: extract_phone(text),
        skills: lexicon_matches(&SKILLS_LEXICON, &flattened, str::to_string),
        education: lexicon_matches(&EDUCATION_LEXICON, &flattened, title_case),
        experience: (!experience.is_empty()).then_some(experience),
    }
}

/// First `local@domain` run in the text.
pub fn extract_email(text: &str) -> Option<String> {
    EMAIL_RE.find(text).map(|m| m.as_str().to_string())
}

/// First digit run that looks like a phone number and carries enough digits.
pub fn extract_phone(text: &str) -> Option<String> {
    PHONE_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|candidate| {
            candidate.chars().filter(char::is_ascii_digit).count() >= MIN_PHONE_DIGITS
        })
        .map(str::to_string)
}

fn extract_years(text: &str) -> BTreeSet<String> {
    YEARS_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

fn extract_date_ranges(text: &str) -> BTreeSet<String> {
    DATE_RANGE_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn lexicon_matches(
    lexicon: &Lexicon,
    text: &str,
    canonical: fn(&str) -> String,
) -> BTreeSet<String> {
    lexicon.find_in(text).into_iter().map(canonical).collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Capitalises the first letter of every alphabetic run: `b.tech` → `B.Tech`,
/// `bachelor of science` → `Bachelor Of Science`.
fn title_case(phrase: &str) -> String {
    let mut out = String::with_capacity(phrase.len());
    let mut prev_alphabetic = false;
    for c in phrase.chars() {
        if prev_alphabetic {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_alphabetic = c.is_alphabetic();
    }
    out
}
