//! Raw record to canonical `Listing` conversion.
//!
//! Normalization is pure: the output depends only on the raw record, the
//! work item it came from, the adapter's defaults, and the fetch timestamp
//! passed in. No clock reads, no I/O. The listing leaves here with an empty
//! id; the assigner stamps one right before the store insert.

use crate::scrape::source::{ListingDefaults, RawListing};
use crate::types::{JobType, Listing, WorkItem};
use crate::util::{clamp_chars, collapse_whitespace};
use chrono::{DateTime, Utc};

pub const DEFAULT_COMPANY: &str = "Entreprise";
pub const DEFAULT_DOMAIN: &str = "General";
pub const FALLBACK_LOCATION: &str = "France";

pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Checked before the internship set: "stage en alternance" is an
/// apprenticeship, whatever the query asked for.
const APPRENTICESHIP_KEYWORDS: &[&str] = &[
    "alternance",
    "apprentissage",
    "apprenti",
    "apprenticeship",
];

const INTERNSHIP_KEYWORDS: &[&str] = &["stage", "stagiaire", "internship", "intern"];

/// Infer the listing kind from its title, if any keyword matches.
pub fn classify_job_type(title: &str) -> Option<JobType> {
    let lower = title.to_lowercase();
    if APPRENTICESHIP_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Some(JobType::Apprenticeship);
    }
    if INTERNSHIP_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Some(JobType::Internship);
    }
    None
}

fn clean(field: Option<&str>) -> Option<String> {
    field.map(collapse_whitespace).filter(|s| !s.is_empty())
}

/// Convert one extracted record into the canonical listing shape.
///
/// Every field ends up non-empty except `id` (assigned later) and the
/// free-text fields whose defaults are themselves empty. Missing values
/// fall back in a fixed order: record, then work item, then adapter
/// defaults, then crate-wide constants.
pub fn normalize(
    raw: RawListing,
    item: &WorkItem,
    defaults: &ListingDefaults,
    fetched_at: DateTime<Utc>,
) -> Listing {
    let title = clean(raw.title.as_deref())
        .unwrap_or_else(|| defaults.title_placeholder.to_string());
    let title = clamp_chars(&title, MAX_TITLE_CHARS).to_string();

    let job_type = classify_job_type(&title).unwrap_or(item.requested);

    let location = clean(raw.location.as_deref())
        .or_else(|| clean(Some(&item.location)))
        .unwrap_or_else(|| FALLBACK_LOCATION.to_string());

    let description = clean(raw.description.as_deref()).unwrap_or_default();
    let description = clamp_chars(&description, MAX_DESCRIPTION_CHARS).to_string();

    let skills: Vec<String> = raw
        .skills
        .into_iter()
        .map(|s| collapse_whitespace(&s))
        .filter(|s| !s.is_empty())
        .collect();

    let mut study_level: Vec<String> = raw
        .study_levels
        .into_iter()
        .map(|s| collapse_whitespace(&s))
        .filter(|s| !s.is_empty())
        .collect();
    if study_level.is_empty() {
        study_level = defaults.study_levels.iter().map(|s| (*s).to_string()).collect();
    }

    Listing {
        id: String::new(),
        title,
        company: clean(raw.company.as_deref()).unwrap_or_else(|| DEFAULT_COMPANY.to_string()),
        location,
        job_type,
        domain: clean(raw.domain.as_deref()).unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
        description,
        skills,
        study_level,
        duration: clean(raw.duration.as_deref())
            .unwrap_or_else(|| defaults.duration.to_string()),
        salary: clean(raw.salary.as_deref()).unwrap_or_else(|| defaults.salary.to_string()),
        posted_at: raw.posted_at.unwrap_or(fetched_at),
        source: item.source,
    }
}
