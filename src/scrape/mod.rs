//! Listing aggregation subsystem for the French internship market
//!
//! This module implements a polite, multi-source sweep over public job
//! boards, funneling every result into one canonical listing shape. Each
//! source gets a dedicated worker that paces its own requests; a single
//! aggregation loop normalizes records, stamps ids, and hands them to the
//! listing store.
//!
//! Key components:
//! - `SourceClient`: shared HTTP client with French-market headers
//! - `SourceAdapter`: per-board URL building and result-card parsing
//! - `normalize`: raw record to canonical `Listing` conversion
//! - `IdAssigner`: collision-free `{prefix}_{millis}_{token}` ids
//! - `Pacer` / `run_chain`: per-source request pacing and page walking
//! - `Orchestrator`: workers, aggregation, and the run lifecycle

pub mod client;
pub mod ident;
pub mod normalize;
pub mod orchestrator;
pub mod scheduler;
pub mod source;
pub mod sources;

pub use client::{FetchError, SourceClient};
pub use ident::IdAssigner;
pub use normalize::{classify_job_type, normalize};
pub use orchestrator::{Orchestrator, RunError, RunOutcome, SweepPlan};
pub use scheduler::{ChainEnd, PageBatch, Pacer};
pub use source::{ListingDefaults, ParsedPage, RawListing, SourceAdapter, SourceLimits};
pub use sources::default_adapters;
