//! In-memory listing store

use super::{ListingStore, StoreError, StoreTotals};
use crate::types::{Listing, RunStats};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Reference store backend holding everything in process memory.
///
/// Enforces the same lifecycle a remote backend would: operations before
/// `connect` fail with an i/o error, duplicate ids are rejected, and listings
/// missing id or title are rejected as validation errors.
#[derive(Debug, Default)]
pub struct MemoryStore {
    connected: AtomicBool,
    schema_ready: AtomicBool,
    listings: RwLock<HashMap<String, Listing>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of listings currently held.
    pub async fn len(&self) -> usize {
        self.listings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Snapshot of all held listings, ordered by id.
    pub async fn snapshot(&self) -> Vec<Listing> {
        let mut all: Vec<Listing> = self.listings.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Look up one listing by id.
    pub async fn get(&self, id: &str) -> Option<Listing> {
        self.listings.read().await.get(id).cloned()
    }

    fn ensure_connected(&self) -> Result<(), StoreError> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Io("store not connected".to_string()))
        }
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn connect(&self) -> Result<(), StoreError> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn initialize_schema(&self) -> Result<(), StoreError> {
        self.ensure_connected()?;
        // Nothing to build in memory; the flag keeps the lifecycle honest
        self.schema_ready.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn insert(&self, listing: &Listing) -> Result<(), StoreError> {
        self.ensure_connected()?;
        if listing.id.is_empty() {
            return Err(StoreError::Validation("listing id must not be empty".to_string()));
        }
        if listing.title.is_empty() {
            return Err(StoreError::Validation("listing title must not be empty".to_string()));
        }
        let mut listings = self.listings.write().await;
        if listings.contains_key(&listing.id) {
            return Err(StoreError::Duplicate(listing.id.clone()));
        }
        listings.insert(listing.id.clone(), listing.clone());
        Ok(())
    }

    async fn update_stats(&self, _stats: &RunStats) -> Result<StoreTotals, StoreError> {
        self.ensure_connected()?;
        let listings = self.listings.read().await;
        let companies: HashSet<&str> = listings.values().map(|l| l.company.as_str()).collect();
        Ok(StoreTotals {
            total_listings: listings.len() as u64,
            total_companies: companies.len() as u64,
        })
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }
}
