//! Run orchestration for one complete sweep.
//!
//! Spawns one worker per enabled source, each walking its (term, location)
//! page chains behind a shared concurrency cap. Workers send fetched pages
//! over a bounded channel to the single aggregation loop here, which
//! normalizes, stamps ids, and inserts. Keeping aggregation on one task
//! means the run counters never need a lock.

mod types;

pub use types::*;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::HttpConfig;
use crate::scrape::client::{FetchError, SourceClient};
use crate::scrape::ident::IdAssigner;
use crate::scrape::normalize::normalize;
use crate::scrape::scheduler::{run_chain, ChainEnd, PageBatch, Pacer};
use crate::scrape::source::SourceAdapter;
use crate::store::ListingStore;
use crate::types::{RunStats, SourceId, WorkItem};
use crate::util::truncate_str;

pub struct Orchestrator {
    /// Queries this run sweeps
    plan: SweepPlan,
    /// One adapter per enabled source
    adapters: Vec<Arc<dyn SourceAdapter>>,
    /// Destination for normalized listings
    store: Arc<dyn ListingStore>,
    /// Shared HTTP client (clones share one connection pool)
    client: SourceClient,
    /// Id mint for the aggregation loop
    assigner: IdAssigner,
    /// Cancellation flag (lock-free, shared with signal handlers)
    cancel: Arc<AtomicBool>,
}

impl Orchestrator {
    pub fn new(
        plan: SweepPlan,
        adapters: Vec<Arc<dyn SourceAdapter>>,
        store: Arc<dyn ListingStore>,
        http: &HttpConfig,
    ) -> Result<Self, RunError> {
        let client = SourceClient::new(http)?;
        Ok(Self {
            plan,
            adapters,
            store,
            client,
            assigner: IdAssigner::new(),
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Ask the run to stop. Chains finish their in-flight request, then wind
    /// down; everything already fetched still gets normalized and saved.
    pub fn stop(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Clonable handle for signal handlers.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Execute one sweep to completion (or cancellation).
    ///
    /// Always returns an outcome: a fatal store or client error is carried
    /// in `RunOutcome::fatal` next to whatever counters were gathered, so
    /// the caller can still print its summary.
    pub async fn run(&self) -> RunOutcome {
        let run_id = Uuid::new_v4();
        let mut stats = RunStats::default();

        info!(
            %run_id,
            sources = self.adapters.len(),
            terms = self.plan.terms.len(),
            locations = self.plan.locations.len(),
            "starting sweep"
        );

        // Store bring-up is fatal: without it nothing can be saved
        if let Err(e) = self.bring_up_store().await {
            error!(error = %e, "store bring-up failed");
            if let Err(close_err) = self.store.close().await {
                warn!(error = %close_err, "store close failed");
            }
            return RunOutcome {
                run_id,
                stats,
                totals: None,
                fatal: Some(e),
            };
        }

        let (tx, mut rx) = mpsc::channel::<PageBatch>(PAGE_CHANNEL_CAPACITY);
        let semaphore = Arc::new(Semaphore::new(self.plan.max_concurrent_sources.max(1)));
        let queries = self.plan.queries();

        let mut workers: Vec<(SourceId, JoinHandle<(WorkerReport, Option<FetchError>)>)> =
            Vec::with_capacity(self.adapters.len());
        for adapter in &self.adapters {
            let adapter = Arc::clone(adapter);
            let client = self.client.clone();
            let cancel = Arc::clone(&self.cancel);
            let tx = tx.clone();
            let semaphore = Arc::clone(&semaphore);
            let queries = queries.clone();
            let source = adapter.id();
            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (WorkerReport::new(adapter.id()), None),
                };
                run_source(adapter, client, queries, cancel, tx).await
            });
            workers.push((source, handle));
        }
        // The aggregator's receive loop ends once every worker clone is gone
        drop(tx);

        while let Some(batch) = rx.recv().await {
            stats.record_page();
            for raw in batch.records {
                stats.record_scraped(batch.item.source);
                let listing = normalize(raw, &batch.item, &batch.defaults, batch.fetched_at);
                let listing = self.assigner.assign(listing);
                match self.store.insert(&listing).await {
                    Ok(()) => {
                        stats.record_saved(batch.item.source);
                        debug!(
                            id = %listing.id,
                            title = %truncate_str(&listing.title, 60),
                            "listing saved"
                        );
                    }
                    Err(e) => {
                        stats.record_insert_failure();
                        warn!(id = %listing.id, error = %e, "listing rejected by store");
                    }
                }
            }
        }

        for (source, handle) in workers {
            match handle.await {
                Ok((report, fatal)) => {
                    stats.chains_abandoned += report.chains_abandoned;
                    if let Some(e) = fatal {
                        error!(source = %report.source, error = %e, "source failed");
                        stats.record_source_failure(report.source);
                    }
                }
                Err(e) => {
                    error!(source = %source, error = %e, "source worker panicked");
                    stats.record_source_failure(source);
                }
            }
        }

        let totals = match self.store.update_stats(&stats).await {
            Ok(totals) => Some(totals),
            Err(e) => {
                warn!(error = %e, "failed to update store aggregates");
                None
            }
        };

        if let Err(e) = self.store.close().await {
            warn!(error = %e, "store close failed");
        }

        info!(
            %run_id,
            scraped = stats.total_scraped,
            saved = stats.total_saved,
            pages = stats.pages_fetched,
            "sweep finished"
        );

        RunOutcome {
            run_id,
            stats,
            totals,
            fatal: None,
        }
    }

    async fn bring_up_store(&self) -> Result<(), RunError> {
        self.store.connect().await?;
        self.store.initialize_schema().await?;
        Ok(())
    }
}

/// Walk every query's page chain for one source, in plan order.
///
/// One pacer for the whole worker: spacing holds across chain boundaries,
/// not just within a chain. A permanent fetch error ends the source but the
/// report of what it managed first still comes back.
async fn run_source(
    adapter: Arc<dyn SourceAdapter>,
    client: SourceClient,
    queries: Vec<SweepQuery>,
    cancel: Arc<AtomicBool>,
    tx: mpsc::Sender<PageBatch>,
) -> (WorkerReport, Option<FetchError>) {
    let mut report = WorkerReport::new(adapter.id());
    let mut pacer = Pacer::new(adapter.limits().delay);

    info!(source = %adapter.id(), queries = queries.len(), "source worker starting");

    for query in queries {
        if cancel.load(Ordering::Relaxed) {
            break;
        }
        let start = WorkItem::new(adapter.id(), query.term, query.location, 1, query.requested);
        match run_chain(adapter.as_ref(), &client, &mut pacer, start, &cancel, &tx).await {
            Ok(ChainEnd::Complete) => report.chains_completed += 1,
            Ok(ChainEnd::Abandoned) => report.chains_abandoned += 1,
            Ok(ChainEnd::Cancelled) => break,
            Err(e) => {
                return (report, Some(e));
            }
        }
    }

    debug!(
        source = %report.source,
        completed = report.chains_completed,
        abandoned = report.chains_abandoned,
        "source worker done"
    );
    (report, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::source::{ListingDefaults, ParsedPage, RawListing, SourceLimits};
    use crate::store::{MemoryStore, StoreError, StoreTotals};
    use crate::types::{JobType, Listing};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use url::Url;

    struct ScriptedAdapter {
        source: SourceId,
        script: Mutex<VecDeque<Result<ParsedPage, FetchError>>>,
    }

    impl ScriptedAdapter {
        fn new(source: SourceId, pages: Vec<Result<ParsedPage, FetchError>>) -> Self {
            Self {
                source,
                script: Mutex::new(pages.into()),
            }
        }
    }

    #[async_trait::async_trait]
    impl SourceAdapter for ScriptedAdapter {
        fn id(&self) -> SourceId {
            self.source
        }

        fn limits(&self) -> SourceLimits {
            SourceLimits {
                delay: Duration::ZERO,
                max_pages: 5,
            }
        }

        fn defaults(&self) -> ListingDefaults {
            ListingDefaults {
                title_placeholder: "Stage inconnu",
                duration: "6 mois",
                salary: "",
                study_levels: &["bac+3"],
            }
        }

        fn page_url(&self, _item: &WorkItem) -> Result<Url, FetchError> {
            Url::parse("https://jobs.test/search").map_err(|e| FetchError::InvalidUrl(e.to_string()))
        }

        fn parse_page(&self, _html: &str) -> ParsedPage {
            ParsedPage::empty()
        }

        async fn fetch_page(
            &self,
            _client: &SourceClient,
            _item: &WorkItem,
        ) -> Result<ParsedPage, FetchError> {
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ParsedPage::empty()))
        }
    }

    /// Store that rejects any listing whose title contains a marker word.
    struct PickyStore {
        accepted: Mutex<Vec<Listing>>,
        reject_marker: &'static str,
    }

    impl PickyStore {
        fn new(reject_marker: &'static str) -> Self {
            Self {
                accepted: Mutex::new(Vec::new()),
                reject_marker,
            }
        }
    }

    #[async_trait::async_trait]
    impl ListingStore for PickyStore {
        async fn connect(&self) -> Result<(), StoreError> {
            Ok(())
        }

        async fn initialize_schema(&self) -> Result<(), StoreError> {
            Ok(())
        }

        async fn insert(&self, listing: &Listing) -> Result<(), StoreError> {
            if listing.title.contains(self.reject_marker) {
                return Err(StoreError::Validation(format!(
                    "title contains '{}'",
                    self.reject_marker
                )));
            }
            self.accepted.lock().unwrap().push(listing.clone());
            Ok(())
        }

        async fn update_stats(&self, _stats: &RunStats) -> Result<StoreTotals, StoreError> {
            let accepted = self.accepted.lock().unwrap();
            Ok(StoreTotals {
                total_listings: accepted.len() as u64,
                total_companies: 0,
            })
        }

        async fn close(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    /// Store whose bring-up always fails.
    struct DownStore;

    #[async_trait::async_trait]
    impl ListingStore for DownStore {
        async fn connect(&self) -> Result<(), StoreError> {
            Err(StoreError::Io("connection refused".to_string()))
        }

        async fn initialize_schema(&self) -> Result<(), StoreError> {
            Err(StoreError::Io("not connected".to_string()))
        }

        async fn insert(&self, _listing: &Listing) -> Result<(), StoreError> {
            Err(StoreError::Io("not connected".to_string()))
        }

        async fn update_stats(&self, _stats: &RunStats) -> Result<StoreTotals, StoreError> {
            Err(StoreError::Io("not connected".to_string()))
        }

        async fn close(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn page_with_titles(titles: &[&str], has_next: bool) -> ParsedPage {
        ParsedPage {
            records: titles
                .iter()
                .map(|t| RawListing {
                    title: Some(t.to_string()),
                    ..Default::default()
                })
                .collect(),
            has_next,
        }
    }

    fn single_query_plan() -> SweepPlan {
        SweepPlan {
            terms: vec!["stage".to_string()],
            locations: vec!["Paris".to_string()],
            max_concurrent_sources: 4,
        }
    }

    fn orchestrator_with(
        plan: SweepPlan,
        adapters: Vec<Arc<dyn SourceAdapter>>,
        store: Arc<dyn ListingStore>,
    ) -> Orchestrator {
        Orchestrator::new(plan, adapters, store, &HttpConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_run_normalizes_assigns_and_saves() {
        let adapter = Arc::new(ScriptedAdapter::new(
            SourceId::Hellowork,
            vec![Ok(page_with_titles(
                &["Stage développeur", "Stage data analyst", "Alternance RH"],
                false,
            ))],
        ));
        let store = Arc::new(MemoryStore::new());
        let orchestrator =
            orchestrator_with(single_query_plan(), vec![adapter], store.clone());

        let outcome = orchestrator.run().await;

        assert!(!outcome.failed());
        assert_eq!(outcome.stats.total_scraped, 3);
        assert_eq!(outcome.stats.total_saved, 3);
        assert_eq!(outcome.stats.pages_fetched, 1);
        assert_eq!(store.len().await, 3);

        for listing in store.snapshot().await {
            assert!(listing.id.starts_with("hw_"));
            assert_eq!(listing.location, "Paris");
            assert_eq!(listing.company, "Entreprise");
        }
        // The title keyword overrides the requested internship kind
        let apprenticeships: Vec<Listing> = store
            .snapshot()
            .await
            .into_iter()
            .filter(|l| l.job_type == JobType::Apprenticeship)
            .collect();
        assert_eq!(apprenticeships.len(), 1);
        assert_eq!(apprenticeships[0].title, "Alternance RH");
    }

    #[tokio::test]
    async fn test_insert_failures_do_not_stop_the_batch() {
        let adapter = Arc::new(ScriptedAdapter::new(
            SourceId::Indeed,
            vec![Ok(page_with_titles(
                &["Stage ok un", "Stage rejeté", "Stage ok deux"],
                false,
            ))],
        ));
        let store = Arc::new(PickyStore::new("rejeté"));
        let orchestrator =
            orchestrator_with(single_query_plan(), vec![adapter], store.clone());

        let outcome = orchestrator.run().await;

        assert_eq!(outcome.stats.total_scraped, 3);
        assert_eq!(outcome.stats.total_saved, 2);
        assert_eq!(outcome.stats.insert_failures, 1);
        assert_eq!(
            outcome.stats.total_saved,
            outcome.stats.total_scraped - outcome.stats.insert_failures
        );
        assert_eq!(store.accepted.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_store_bring_up_failure_is_fatal_with_summary() {
        let adapter = Arc::new(ScriptedAdapter::new(
            SourceId::Wttj,
            vec![Ok(page_with_titles(&["Stage perdu"], false))],
        ));
        let orchestrator =
            orchestrator_with(single_query_plan(), vec![adapter], Arc::new(DownStore));

        let outcome = orchestrator.run().await;

        assert!(outcome.failed());
        assert!(matches!(outcome.fatal, Some(RunError::Store(_))));
        // No fetching happened, but the outcome still carries counters
        assert_eq!(outcome.stats.total_scraped, 0);
        assert!(outcome.totals.is_none());
    }

    #[tokio::test]
    async fn test_permanent_source_failure_is_contained() {
        let broken = Arc::new(ScriptedAdapter::new(
            SourceId::Linkedin,
            vec![Err(FetchError::Config("bad header value".to_string()))],
        ));
        let healthy = Arc::new(ScriptedAdapter::new(
            SourceId::Hellowork,
            vec![Ok(page_with_titles(&["Stage sauvé"], false))],
        ));
        let store = Arc::new(MemoryStore::new());
        let orchestrator =
            orchestrator_with(single_query_plan(), vec![broken, healthy], store.clone());

        let outcome = orchestrator.run().await;

        assert!(!outcome.failed());
        assert_eq!(outcome.stats.sources_failed, vec![SourceId::Linkedin]);
        assert_eq!(outcome.stats.total_saved, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_abandoned_chains_are_counted() {
        let adapter = Arc::new(ScriptedAdapter::new(
            SourceId::Alternance,
            vec![
                Ok(page_with_titles(&["Alternance un"], true)),
                Err(FetchError::Status(503)),
            ],
        ));
        let store = Arc::new(MemoryStore::new());
        let orchestrator =
            orchestrator_with(single_query_plan(), vec![adapter], store.clone());

        let outcome = orchestrator.run().await;

        assert_eq!(outcome.stats.chains_abandoned, 1);
        // The page fetched before the failure was kept
        assert_eq!(outcome.stats.total_saved, 1);
        assert!(outcome.stats.sources_failed.is_empty());
    }

    #[tokio::test]
    async fn test_stop_before_run_fetches_nothing() {
        let adapter = Arc::new(ScriptedAdapter::new(
            SourceId::Hellowork,
            vec![Ok(page_with_titles(&["Stage jamais vu"], false))],
        ));
        let store = Arc::new(MemoryStore::new());
        let orchestrator =
            orchestrator_with(single_query_plan(), vec![adapter], store.clone());

        orchestrator.stop();
        assert!(orchestrator.is_cancelled());
        let outcome = orchestrator.run().await;

        assert_eq!(outcome.stats.pages_fetched, 0);
        assert_eq!(outcome.stats.total_scraped, 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_totals_come_from_the_store() {
        let adapter = Arc::new(ScriptedAdapter::new(
            SourceId::Hellowork,
            vec![Ok(page_with_titles(&["Stage a", "Stage b"], false))],
        ));
        let store = Arc::new(MemoryStore::new());
        let orchestrator =
            orchestrator_with(single_query_plan(), vec![adapter], store.clone());

        let outcome = orchestrator.run().await;

        let totals = outcome.totals.unwrap();
        assert_eq!(totals.total_listings, 2);
        // Both records fell back to the same default company
        assert_eq!(totals.total_companies, 1);
    }
}
