//! One adapter per job board, plus the registry that assembles them.
//!
//! Each adapter ships compiled-in defaults for pacing and page depth;
//! `default_adapters` merges those with any `[sources.*]` overrides from
//! the config and skips boards the operator disabled.

mod alternance;
mod hellowork;
mod indeed;
mod linkedin;
mod wttj;

pub use alternance::AlternanceAdapter;
pub use hellowork::HelloworkAdapter;
pub use indeed::IndeedAdapter;
pub use linkedin::LinkedinAdapter;
pub use wttj::WttjAdapter;

use crate::config::{SourceOverride, SweepConfig};
use crate::scrape::source::{SourceAdapter, SourceLimits};
use crate::types::SourceId;
use std::sync::Arc;
use std::time::Duration;

fn resolve_limits(defaults: SourceLimits, over: Option<&SourceOverride>) -> SourceLimits {
    match over {
        Some(o) => SourceLimits {
            delay: o.delay_ms.map(Duration::from_millis).unwrap_or(defaults.delay),
            max_pages: o.max_pages.unwrap_or(defaults.max_pages),
        },
        None => defaults,
    }
}

/// Build the full adapter set for a sweep, honoring per-source overrides.
///
/// Disabled sources are left out entirely; the orchestrator never sees them.
pub fn default_adapters(sweep: &SweepConfig) -> Vec<Arc<dyn SourceAdapter>> {
    let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();
    for source in SourceId::ALL {
        if !sweep.is_enabled(source) {
            continue;
        }
        let over = sweep.override_for(source);
        let adapter: Arc<dyn SourceAdapter> = match source {
            SourceId::Hellowork => Arc::new(HelloworkAdapter::with_limits(resolve_limits(
                hellowork::DEFAULT_LIMITS,
                over,
            ))),
            SourceId::Indeed => Arc::new(IndeedAdapter::with_limits(resolve_limits(
                indeed::DEFAULT_LIMITS,
                over,
            ))),
            SourceId::Wttj => Arc::new(WttjAdapter::with_limits(resolve_limits(
                wttj::DEFAULT_LIMITS,
                over,
            ))),
            SourceId::Linkedin => Arc::new(LinkedinAdapter::with_limits(resolve_limits(
                linkedin::DEFAULT_LIMITS,
                over,
            ))),
            SourceId::Alternance => Arc::new(AlternanceAdapter::with_limits(resolve_limits(
                alternance::DEFAULT_LIMITS,
                over,
            ))),
        };
        adapters.push(adapter);
    }
    adapters
}
