//! StageMatch: Multi-Source Internship Listing Aggregator
//!
//! Sweeps the major French job boards for internship and apprenticeship
//! listings and funnels them into one canonical store, featuring:
//! - One adapter per board (HelloWork, Indeed, WTTJ, LinkedIn, La Bonne Alternance)
//! - Per-source request pacing and page caps
//! - Deterministic normalization into a single listing shape
//! - Collision-free id assignment across concurrent workers
//! - Per-record insert isolation with full run statistics

pub mod config;
pub mod scrape;
pub mod store;
pub mod types;
pub mod util;

pub use config::Config;
pub use types::*;
