//! Sweep configuration: what to search for, where, and how wide

use crate::types::SourceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Query terms and locations enumerated by one run, plus source worker width.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Query terms; each term also decides the requested listing type
    /// ("alternance" queries ask for apprenticeships, everything else for
    /// internships).
    #[serde(default = "default_terms")]
    pub terms: Vec<String>,
    /// Locations crossed with every term on every source
    #[serde(default = "default_locations")]
    pub locations: Vec<String>,
    /// Upper bound on source adapters fetching at the same time
    #[serde(default = "default_max_concurrent_sources")]
    pub max_concurrent_sources: usize,
    /// Per-source overrides keyed by source id
    #[serde(default)]
    pub sources: BTreeMap<SourceId, SourceOverride>,
}

fn default_terms() -> Vec<String> {
    vec!["stage".to_string(), "alternance".to_string()]
}

fn default_locations() -> Vec<String> {
    [
        "Paris",
        "Lyon",
        "Marseille",
        "Toulouse",
        "Bordeaux",
        "Lille",
        "Nantes",
        "Strasbourg",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_max_concurrent_sources() -> usize {
    4
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            terms: default_terms(),
            locations: default_locations(),
            max_concurrent_sources: default_max_concurrent_sources(),
            sources: BTreeMap::new(),
        }
    }
}

impl SweepConfig {
    /// Override for one source, if configured.
    pub fn override_for(&self, source: SourceId) -> Option<&SourceOverride> {
        self.sources.get(&source)
    }

    /// Whether a source participates in the sweep.
    pub fn is_enabled(&self, source: SourceId) -> bool {
        self.sources.get(&source).map(|o| o.enabled).unwrap_or(true)
    }
}

/// Per-source tuning. Absent fields keep the adapter's built-in limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceOverride {
    /// Minimum inter-request delay in milliseconds
    #[serde(default)]
    pub delay_ms: Option<u64>,
    /// Maximum pages fetched per (term, location) query
    #[serde(default)]
    pub max_pages: Option<u32>,
    /// Set to false to skip this source entirely
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for SourceOverride {
    fn default() -> Self {
        Self {
            delay_ms: None,
            max_pages: None,
            enabled: true,
        }
    }
}
