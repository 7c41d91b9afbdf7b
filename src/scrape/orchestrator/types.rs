//! Orchestrator types: sweep plan, worker reports, and run outcomes

use crate::config::SweepConfig;
use crate::scrape::client::FetchError;
use crate::scrape::normalize::classify_job_type;
use crate::store::{StoreError, StoreTotals};
use crate::types::{JobType, RunStats, SourceId};
use thiserror::Error;
use uuid::Uuid;

/// Backpressure bound between source workers and the aggregator
pub(super) const PAGE_CHANNEL_CAPACITY: usize = 64;

/// The queries one run sweeps: every term crossed with every location.
#[derive(Debug, Clone)]
pub struct SweepPlan {
    /// Search terms, e.g. "stage" or "alternance développeur"
    pub terms: Vec<String>,
    /// Cities (or regions) each term is queried in
    pub locations: Vec<String>,
    /// Sources fetched in parallel at most
    pub max_concurrent_sources: usize,
}

impl SweepPlan {
    pub fn from_config(config: &SweepConfig) -> Self {
        Self {
            terms: config.terms.clone(),
            locations: config.locations.clone(),
            max_concurrent_sources: config.max_concurrent_sources,
        }
    }

    /// Expand the plan into concrete queries, in term-major order.
    ///
    /// The requested listing kind follows the term: a term carrying an
    /// apprenticeship keyword asks for apprenticeships, everything else
    /// defaults to internships.
    pub fn queries(&self) -> Vec<SweepQuery> {
        let mut queries = Vec::with_capacity(self.terms.len() * self.locations.len());
        for term in &self.terms {
            let requested = classify_job_type(term).unwrap_or(JobType::Internship);
            for location in &self.locations {
                queries.push(SweepQuery {
                    term: term.clone(),
                    location: location.clone(),
                    requested,
                });
            }
        }
        queries
    }
}

impl Default for SweepPlan {
    fn default() -> Self {
        Self::from_config(&SweepConfig::default())
    }
}

/// One (term, location) query of the sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepQuery {
    pub term: String,
    pub location: String,
    pub requested: JobType,
}

/// What one source worker accomplished before it returned.
#[derive(Debug, Clone, Copy)]
pub struct WorkerReport {
    pub source: SourceId,
    pub chains_completed: u64,
    pub chains_abandoned: u64,
}

impl WorkerReport {
    pub(super) fn new(source: SourceId) -> Self {
        Self {
            source,
            chains_completed: 0,
            chains_abandoned: 0,
        }
    }
}

/// Errors that end a run before or outside the sweep itself.
///
/// Everything per-record or per-page is absorbed into counters; these are
/// the failures nothing downstream can recover from.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("http client setup failed: {0}")]
    Client(#[from] FetchError),
}

/// Everything one run produced, fatal or not.
///
/// Returned instead of a `Result` so the caller can always print the final
/// summary; a fatal error rides along in `fatal` rather than replacing the
/// counters gathered before it hit.
#[derive(Debug)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub stats: RunStats,
    /// Store aggregates after the run, when the store could report them
    pub totals: Option<StoreTotals>,
    pub fatal: Option<RunError>,
}

impl RunOutcome {
    pub fn failed(&self) -> bool {
        self.fatal.is_some()
    }
}
