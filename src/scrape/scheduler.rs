//! Request pacing and page-chain execution.
//!
//! Each source worker owns one [`Pacer`] and walks (term, location) page
//! chains through [`run_chain`]. The pacer spaces request starts for one
//! source; chains for different sources never share a pacer, so a slow
//! board cannot throttle a fast one.

use crate::scrape::client::{FetchError, SourceClient};
use crate::scrape::source::{ListingDefaults, RawListing, SourceAdapter};
use crate::types::WorkItem;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration, Instant};
use tracing::{debug, warn};

/// Enforces a minimum interval between request starts to one source.
pub struct Pacer {
    min_delay: Duration,
    last: Option<Instant>,
}

impl Pacer {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last: None,
        }
    }

    /// First call returns immediately; later calls sleep out whatever is
    /// left of `min_delay` since the previous request start.
    pub async fn pause(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.min_delay {
                sleep(self.min_delay - elapsed).await;
            }
        }
        self.last = Some(Instant::now());
    }
}

/// One successfully fetched result page, en route to the aggregator.
///
/// Carries the adapter's defaults so the aggregator can normalize without
/// looking the adapter back up.
#[derive(Debug)]
pub struct PageBatch {
    pub item: WorkItem,
    pub fetched_at: DateTime<Utc>,
    pub defaults: ListingDefaults,
    pub records: Vec<RawListing>,
}

/// What became of one (term, location) page chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainEnd {
    /// Ran to its natural end: no next page, or the page cap
    Complete,
    /// Cut short by a transient fetch error; earlier pages were kept
    Abandoned,
    /// Cut short by cancellation
    Cancelled,
}

/// Walk one page chain, sending each fetched page to the aggregator.
///
/// Transient fetch errors end the chain but keep what was already sent.
/// Permanent errors propagate and take the whole source down with them.
pub async fn run_chain(
    adapter: &dyn SourceAdapter,
    client: &SourceClient,
    pacer: &mut Pacer,
    start: WorkItem,
    cancel: &AtomicBool,
    tx: &mpsc::Sender<PageBatch>,
) -> Result<ChainEnd, FetchError> {
    let max_pages = adapter.limits().max_pages;
    let defaults = adapter.defaults();
    let mut item = start;
    loop {
        if cancel.load(Ordering::Relaxed) {
            return Ok(ChainEnd::Cancelled);
        }
        pacer.pause().await;
        // Re-checked after the pacing sleep so a stop request during a long
        // delay does not cost one more request.
        if cancel.load(Ordering::Relaxed) {
            return Ok(ChainEnd::Cancelled);
        }

        match adapter.fetch_page(client, &item).await {
            Ok(page) => {
                let has_next = page.has_next;
                let batch = PageBatch {
                    item: item.clone(),
                    fetched_at: Utc::now(),
                    defaults,
                    records: page.records,
                };
                if tx.send(batch).await.is_err() {
                    debug!(source = %item.source, "aggregator closed, ending chain");
                    return Ok(ChainEnd::Cancelled);
                }
                if !has_next || item.page >= max_pages {
                    return Ok(ChainEnd::Complete);
                }
                item = item.next_page();
            }
            Err(e) if e.is_transient() => {
                warn!(
                    source = %item.source,
                    term = %item.term,
                    location = %item.location,
                    page = item.page,
                    error = %e,
                    "abandoning page chain"
                );
                return Ok(ChainEnd::Abandoned);
            }
            Err(e) => return Err(e),
        }
    }
}
