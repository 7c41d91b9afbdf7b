//! Core types for the listing aggregation pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for a persisted listing
pub type ListingId = String;

// ============================================================================
// Source Identity
// ============================================================================

/// One external listing source, polled by a dedicated adapter.
///
/// The set is closed: statistics break down per source and the id prefix
/// namespace is part of the store contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    Hellowork,
    Indeed,
    Wttj,
    Linkedin,
    Alternance,
}

impl SourceId {
    /// All registered sources, in sweep order.
    pub const ALL: [SourceId; 5] = [
        SourceId::Hellowork,
        SourceId::Indeed,
        SourceId::Wttj,
        SourceId::Linkedin,
        SourceId::Alternance,
    ];

    /// Stable identifier stored in `Listing.source` and used as config key.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Hellowork => "hellowork",
            SourceId::Indeed => "indeed",
            SourceId::Wttj => "wttj",
            SourceId::Linkedin => "linkedin",
            SourceId::Alternance => "alternance",
        }
    }

    /// Short prefix embedded in generated listing ids.
    pub fn prefix(&self) -> &'static str {
        match self {
            SourceId::Hellowork => "hw",
            SourceId::Indeed => "indeed",
            SourceId::Wttj => "wttj",
            SourceId::Linkedin => "linkedin",
            SourceId::Alternance => "alt",
        }
    }

    /// Human-readable site name for operator output.
    pub fn label(&self) -> &'static str {
        match self {
            SourceId::Hellowork => "HelloWork",
            SourceId::Indeed => "Indeed France",
            SourceId::Wttj => "Welcome to the Jungle",
            SourceId::Linkedin => "LinkedIn Jobs",
            SourceId::Alternance => "La Bonne Alternance",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SourceId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hellowork" => Ok(SourceId::Hellowork),
            "indeed" => Ok(SourceId::Indeed),
            "wttj" => Ok(SourceId::Wttj),
            "linkedin" => Ok(SourceId::Linkedin),
            "alternance" => Ok(SourceId::Alternance),
            other => Err(format!("unknown source '{}'", other)),
        }
    }
}

// ============================================================================
// Listing Type
// ============================================================================

/// Kind of opportunity a listing advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    Internship,
    Apprenticeship,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Internship => "internship",
            JobType::Apprenticeship => "apprenticeship",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Work Item
// ============================================================================

/// One (source, query term, location, page) unit of fetch work.
///
/// Generated lazily by the orchestrator, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub source: SourceId,
    pub term: String,
    pub location: String,
    pub page: u32,
    /// Listing type the query asked for; the normalizer falls back to this
    /// when the title carries no classifying keyword.
    pub requested: JobType,
}

impl WorkItem {
    pub fn new(
        source: SourceId,
        term: impl Into<String>,
        location: impl Into<String>,
        page: u32,
        requested: JobType,
    ) -> Self {
        Self {
            source,
            term: term.into(),
            location: location.into(),
            page,
            requested,
        }
    }

    /// Same triple, next page.
    pub fn next_page(&self) -> Self {
        Self {
            page: self.page + 1,
            ..self.clone()
        }
    }
}

// ============================================================================
// Canonical Listing
// ============================================================================

/// The canonical normalized record persisted for one opportunity.
///
/// Serializes with the camelCase field names the store collaborator consumes
/// (`studyLevel`, `postedAt`, and `type` for the listing kind).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub domain: String,
    pub description: String,
    pub skills: Vec<String>,
    pub study_level: Vec<String>,
    pub duration: String,
    pub salary: String,
    pub posted_at: DateTime<Utc>,
    pub source: SourceId,
}

// ============================================================================
// Run Statistics
// ============================================================================

/// Counters for one source within a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SourceStats {
    /// Records extracted from result pages
    pub scraped: u64,
    /// Records accepted by the listing store
    pub saved: u64,
}

/// Counters for one complete run.
///
/// Owned and mutated only by the orchestrator's aggregation loop; finalized
/// and handed to the listing store's aggregate-update operation at run end.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    pub total_scraped: u64,
    pub total_saved: u64,
    /// Records extracted but rejected by the store ("scraped but not saved")
    pub insert_failures: u64,
    /// Result pages successfully fetched and parsed
    pub pages_fetched: u64,
    /// Page chains cut short by a transient fetch error
    pub chains_abandoned: u64,
    /// Sources that hit a fatal adapter error mid-run
    pub sources_failed: Vec<SourceId>,
    pub per_source: BTreeMap<SourceId, SourceStats>,
}

impl RunStats {
    pub fn record_scraped(&mut self, source: SourceId) {
        self.total_scraped += 1;
        self.per_source.entry(source).or_default().scraped += 1;
    }

    pub fn record_saved(&mut self, source: SourceId) {
        self.total_saved += 1;
        self.per_source.entry(source).or_default().saved += 1;
    }

    pub fn record_insert_failure(&mut self) {
        self.insert_failures += 1;
    }

    pub fn record_page(&mut self) {
        self.pages_fetched += 1;
    }

    pub fn record_source_failure(&mut self, source: SourceId) {
        if !self.sources_failed.contains(&source) {
            self.sources_failed.push(source);
        }
    }

    /// Counters for one source, zeroed if it produced nothing.
    pub fn source(&self, source: SourceId) -> SourceStats {
        self.per_source.get(&source).copied().unwrap_or_default()
    }
}
