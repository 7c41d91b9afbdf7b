//! Listing store client interface
//!
//! The store is an external collaborator: this crate only speaks its
//! contract. One run calls `connect` → `initialize_schema` → many `insert` →
//! `update_stats` → `close`, and the orchestrator closes on every exit path.
//! `MemoryStore` is the reference implementation used by the default binary
//! and the test suite; deployments plug their own backend behind the trait.

mod memory;

pub use memory::MemoryStore;

use crate::types::{Listing, RunStats};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by a listing store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store already holds a listing with this id
    #[error("duplicate listing id '{0}'")]
    Duplicate(String),
    /// The listing violates a store constraint
    #[error("invalid listing: {0}")]
    Validation(String),
    /// The backend is unreachable or failed mid-operation
    #[error("store i/o failure: {0}")]
    Io(String),
}

impl StoreError {
    /// Failures that indicate the record, not the backend, is at fault.
    pub fn is_record_level(&self) -> bool {
        matches!(self, StoreError::Duplicate(_) | StoreError::Validation(_))
    }
}

/// Aggregate totals reported back by `update_stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreTotals {
    /// Listings held by the store after this run
    pub total_listings: u64,
    /// Distinct companies across all held listings
    pub total_companies: u64,
}

/// Contract the orchestrator consumes. Insert failures are per-record;
/// only `connect`/`initialize_schema` failures abort a run.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Open the backend connection. Fails with [`StoreError::Io`] when the
    /// backend is unreachable.
    async fn connect(&self) -> Result<(), StoreError>;

    /// Prepare the schema. Idempotent; safe to call every run.
    async fn initialize_schema(&self) -> Result<(), StoreError>;

    /// Persist one listing. A rejection affects only this record.
    async fn insert(&self, listing: &Listing) -> Result<(), StoreError>;

    /// Hand over the finished run counters; returns aggregate totals for the
    /// operator summary.
    async fn update_stats(&self, stats: &RunStats) -> Result<StoreTotals, StoreError>;

    /// Release the backend connection.
    async fn close(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_level_classification() {
        assert!(StoreError::Duplicate("hw_1_a".to_string()).is_record_level());
        assert!(StoreError::Validation("empty title".to_string()).is_record_level());
        assert!(!StoreError::Io("connection reset".to_string()).is_record_level());
    }
}
