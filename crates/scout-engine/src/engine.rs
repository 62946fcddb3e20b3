//! Tender Engine
//!
//! Owns the filter criteria, view mode, saved registry and latest fetched
//! page, and turns UI commands into gateway queries.
//!
//! ## Commands and fetches
//!
//! Every command runs synchronously. Commands that need fresh data return a
//! [`FetchTask`]: a future the caller spawns or awaits however it likes. The
//! engine is `loading` from the moment a task is issued until the newest
//! task completes.
//!
//! ## Sequencing
//!
//! Each issued fetch takes the next generation number. A response is only
//! applied if its generation is still the latest issued, so a slow early
//! response can never overwrite a faster later one. `abandon()` bumps the
//! generation without issuing anything, discarding whatever is in flight.
//!
//! ## Page bounds
//!
//! The page count belongs to the criteria of the last applied response. While
//! a filter change is in flight only page 1 may be requested. A response that
//! reports fewer pages than the requested page is not applied; the page is
//! clamped to the last one and fetched again.
//!
//! ## Broadcasting
//!
//! Mutation = notification. Every state change publishes a fresh
//! [`EngineSnapshot`] on a `tokio::sync::watch` channel.

use futures::future::BoxFuture;
use parking_lot::{Mutex, RwLock};
use scout_core::{
    Clock, EngineConfig, FilterCriteria, GatewayError, IndustryCategory, ProvinceFilter,
    SystemClock, TenderId, ViewMode, PAGE_SIZE,
};
use scout_gateway::{TenderGateway, TenderPage, TenderQuery};
use scout_storage::{DurableStore, SavedTenderRegistry};
use std::collections::BTreeSet;
use std::sync::{Arc, Weak};
use tokio::sync::watch;

use crate::pagination::Pagination;
use crate::selector::apply_view_mode;
use crate::state::{EngineSnapshot, FetchOutcome, TenderView};
use crate::stats::{aggregate, StatsSnapshot};

/// A pending fetch. Drive it to completion to apply (or discard) its result.
pub type FetchTask = BoxFuture<'static, FetchOutcome>;

// =============================================================================
// Internal State
// =============================================================================

#[derive(Debug)]
struct EngineState {
    criteria: FilterCriteria,
    mode: ViewMode,
    /// Latest successfully fetched page, before the view mode is applied.
    page: Option<TenderPage>,
    pagination: Pagination,
    /// Criteria the applied page and `pagination` were fetched with.
    applied: Option<FilterCriteria>,
    /// Page of a failed page change, restored by `retry`.
    retry_page: Option<u32>,
    /// Page-derived counters, fixed at the time the page arrived.
    stats: StatsSnapshot,
    loading: bool,
    error: Option<GatewayError>,
    /// Latest generation issued.
    generation: u64,
}

impl EngineState {
    fn pages_current(&self) -> bool {
        self.applied
            .as_ref()
            .is_some_and(|applied| applied.same_filters(&self.criteria))
    }

    fn page_allowed(&self, page: u32) -> bool {
        if self.pages_current() {
            self.pagination.contains(page)
        } else {
            page == 1
        }
    }
}

/// What a completed response did to the state.
enum Completion {
    Done(FetchOutcome),
    /// The requested page was past the end. The page was clamped and needs
    /// fetching again.
    Clamped,
}

struct EngineInner {
    gateway: Arc<dyn TenderGateway>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    // Lock order: `state` before `saved`.
    state: RwLock<EngineState>,
    saved: Mutex<SavedTenderRegistry>,
    tx: watch::Sender<EngineSnapshot>,
    rx: watch::Receiver<EngineSnapshot>,
}

// =============================================================================
// TenderEngine
// =============================================================================

/// The tender discovery engine. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct TenderEngine {
    inner: Arc<EngineInner>,
}

impl TenderEngine {
    /// Create an engine using the system clock. Loads saved tenders from `store`.
    pub fn new(
        gateway: Arc<dyn TenderGateway>,
        store: Arc<dyn DurableStore>,
        config: EngineConfig,
    ) -> Self {
        Self::with_clock(gateway, store, config, Arc::new(SystemClock))
    }

    /// Create an engine reading "now" from `clock`.
    pub fn with_clock(
        gateway: Arc<dyn TenderGateway>,
        store: Arc<dyn DurableStore>,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let saved = SavedTenderRegistry::load(store, config.saved_storage_key.clone());
        let state = EngineState {
            criteria: FilterCriteria::default(),
            mode: ViewMode::All,
            page: None,
            pagination: Pagination::new(0, PAGE_SIZE),
            applied: None,
            retry_page: None,
            stats: StatsSnapshot::default(),
            loading: false,
            error: None,
            generation: 0,
        };

        let mut initial = EngineSnapshot::initial();
        initial.stats.saved_count = saved.len();
        initial.warning = saved.warning().cloned();
        let (tx, rx) = watch::channel(initial);

        Self {
            inner: Arc::new(EngineInner {
                gateway,
                clock,
                config,
                state: RwLock::new(state),
                saved: Mutex::new(saved),
                tx,
                rx,
            }),
        }
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Subscribe to snapshots. Clone the receiver for each subscriber.
    pub fn subscribe(&self) -> watch::Receiver<EngineSnapshot> {
        self.inner.rx.clone()
    }

    /// Build a snapshot of the current state.
    pub fn snapshot(&self) -> EngineSnapshot {
        self.inner.build_snapshot()
    }

    /// What the tender view shows right now.
    pub fn view(&self) -> TenderView {
        self.snapshot().view()
    }

    pub fn criteria(&self) -> FilterCriteria {
        self.inner.state.read().criteria.clone()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.inner.state.read().mode
    }

    pub fn page(&self) -> u32 {
        self.inner.state.read().criteria.page
    }

    pub fn total_pages(&self) -> u32 {
        self.inner.state.read().pagination.total_pages()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.snapshot().stats
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.read().loading
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    /// Fetch the page for the current criteria.
    pub fn refresh(&self) -> FetchTask {
        self.inner.issue_fetch()
    }

    /// Re-issue the failed query. A failed page change is requested again.
    pub fn retry(&self) -> FetchTask {
        {
            let mut state = self.inner.state.write();
            if let Some(page) = state.retry_page.take() {
                state.criteria.set_page(page);
            }
            tracing::debug!("Retrying tender query for page {}", state.criteria.page);
        }
        self.inner.issue_fetch()
    }

    /// Leave the tender view. Any in-flight response is discarded.
    pub fn abandon(&self) {
        {
            let mut state = self.inner.state.write();
            state.generation += 1;
            state.loading = false;
            tracing::debug!("Abandoned tender view at generation {}", state.generation);
        }
        self.inner.broadcast();
    }

    // =========================================================================
    // Filter Criteria
    // =========================================================================

    /// Replace the selected industries. Back to page 1.
    pub fn set_industries(&self, industries: BTreeSet<IndustryCategory>) -> FetchTask {
        self.update_criteria(|c| c.set_industries(industries))
    }

    /// Select or deselect a single industry. Back to page 1.
    pub fn toggle_industry(&self, tag: IndustryCategory) -> FetchTask {
        self.update_criteria(|c| {
            c.toggle_industry(tag);
        })
    }

    /// Replace the province selection. Back to page 1.
    pub fn set_province(&self, province: ProvinceFilter) -> FetchTask {
        self.update_criteria(|c| c.set_province(province))
    }

    /// Replace the search text. Back to page 1.
    pub fn set_search(&self, search: impl Into<String>) -> FetchTask {
        let search = search.into();
        self.update_criteria(|c| c.set_search(search))
    }

    /// Drop every filter and view mode toggle. Back to page 1.
    pub fn clear_all(&self) -> FetchTask {
        {
            let mut state = self.inner.state.write();
            state.criteria.reset();
            state.mode = ViewMode::All;
            tracing::debug!("Cleared all filters");
        }
        self.inner.issue_fetch()
    }

    /// Go to page `page`. Ignored (returns `None`) outside `1..=total_pages`,
    /// and above page 1 while the page count for the current filters is
    /// still unknown.
    pub fn set_page(&self, page: u32) -> Option<FetchTask> {
        {
            let mut state = self.inner.state.write();
            if !state.page_allowed(page) {
                tracing::debug!(
                    "Ignoring page {} (valid 1..={}, counted for current filters: {})",
                    page,
                    state.pagination.total_pages(),
                    state.pages_current()
                );
                return None;
            }
            state.criteria.set_page(page);
        }
        Some(self.inner.issue_fetch())
    }

    /// Advance one page. `None` on the last page or while the page count is
    /// unknown.
    pub fn next_page(&self) -> Option<FetchTask> {
        let next = {
            let state = self.inner.state.read();
            state.pagination.next_of(state.criteria.page)
        }?;
        self.set_page(next)
    }

    /// Go back one page. `None` on the first page.
    pub fn previous_page(&self) -> Option<FetchTask> {
        let previous = {
            let state = self.inner.state.read();
            state.pagination.previous_of(state.criteria.page)
        }?;
        self.set_page(previous)
    }

    // =========================================================================
    // View Mode
    // =========================================================================

    /// Show only urgent tenders. Leaves SAVED if active. Back to page 1.
    pub fn activate_urgent(&self) -> Option<FetchTask> {
        self.set_view_mode(ViewMode::Urgent)
    }

    /// Show only saved tenders. Leaves URGENT if active. Back to page 1.
    pub fn activate_saved(&self) -> Option<FetchTask> {
        self.set_view_mode(ViewMode::Saved)
    }

    /// Show everything. Back to page 1.
    pub fn activate_all(&self) -> Option<FetchTask> {
        self.set_view_mode(ViewMode::All)
    }

    /// Urgent toggle button: on if off, back to ALL if on.
    pub fn toggle_urgent(&self) -> Option<FetchTask> {
        let mode = self.view_mode().toggled(ViewMode::Urgent);
        self.set_view_mode(mode)
    }

    /// Saved toggle button: on if off, back to ALL if on.
    pub fn toggle_saved(&self) -> Option<FetchTask> {
        let mode = self.view_mode().toggled(ViewMode::Saved);
        self.set_view_mode(mode)
    }

    /// View modes filter the loaded page, so a fetch is only needed when the
    /// page reset actually moved off another page.
    fn set_view_mode(&self, mode: ViewMode) -> Option<FetchTask> {
        let page_changed = {
            let mut state = self.inner.state.write();
            state.mode = mode;
            let was = state.criteria.page;
            state.criteria.set_page(1);
            tracing::debug!("View mode {}", mode);
            was != 1
        };

        if page_changed {
            Some(self.inner.issue_fetch())
        } else {
            self.inner.broadcast();
            None
        }
    }

    // =========================================================================
    // Saved Tenders
    // =========================================================================

    /// Bookmark or un-bookmark a tender. Returns whether it is saved afterwards.
    pub fn toggle_saved_tender(&self, id: &TenderId) -> bool {
        let saved = self.inner.saved.lock().toggle(id);
        self.inner.broadcast();
        saved
    }

    pub fn is_saved(&self, id: &TenderId) -> bool {
        self.inner.saved.lock().is_saved(id)
    }

    pub fn saved_ids(&self) -> Vec<TenderId> {
        self.inner.saved.lock().ids().cloned().collect()
    }

    /// Acknowledge the storage warning.
    pub fn dismiss_warning(&self) {
        self.inner.saved.lock().dismiss_warning();
        self.inner.broadcast();
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn update_criteria(&self, f: impl FnOnce(&mut FilterCriteria)) -> FetchTask {
        {
            let mut state = self.inner.state.write();
            f(&mut state.criteria);
            tracing::debug!(
                "Criteria now {} filter(s), page {}",
                state.criteria.active_filter_count(),
                state.criteria.page
            );
        }
        self.inner.issue_fetch()
    }
}

impl EngineInner {
    fn issue_fetch(self: &Arc<Self>) -> FetchTask {
        let (generation, query) = {
            let mut state = self.state.write();
            state.generation += 1;
            state.loading = true;
            state.retry_page = None;
            let query = TenderQuery::from_criteria(&state.criteria, PAGE_SIZE);
            (state.generation, query)
        };
        tracing::debug!("Issuing tender query #{}: {:?}", generation, query);
        self.broadcast();

        let response = self.gateway.query(query);
        let inner: Weak<EngineInner> = Arc::downgrade(self);

        Box::pin(async move {
            let result = response.await;
            let Some(inner) = inner.upgrade() else {
                return FetchOutcome::Stale;
            };
            match inner.complete(generation, result) {
                Completion::Done(outcome) => outcome,
                Completion::Clamped => {
                    let task = inner.issue_fetch();
                    drop(inner);
                    task.await
                }
            }
        })
    }

    fn complete(&self, generation: u64, result: Result<TenderPage, GatewayError>) -> Completion {
        let completion = {
            let mut state = self.state.write();
            if generation != state.generation {
                tracing::debug!(
                    "Discarding stale response #{} (latest #{})",
                    generation,
                    state.generation
                );
                return Completion::Done(FetchOutcome::Stale);
            }

            state.loading = false;
            match result {
                Ok(page) => {
                    let pagination = Pagination::new(page.total_count, PAGE_SIZE);
                    let requested = state.criteria.page;
                    if !pagination.contains(requested) {
                        let clamped = pagination.clamp(requested);
                        tracing::debug!(
                            "Page {} is past the last page {}, clamping",
                            requested,
                            clamped
                        );
                        state.pagination = pagination;
                        state.criteria.set_page(clamped);
                        return Completion::Clamped;
                    }

                    let now = self.clock.now();
                    state.pagination = pagination;
                    state.stats = aggregate(&page.tenders, now, self.config.urgent_window());
                    tracing::debug!(
                        "Applied response #{}: {} of {} tenders",
                        generation,
                        page.tenders.len(),
                        page.total_count
                    );
                    state.applied = Some(state.criteria.clone());
                    state.page = Some(page);
                    state.error = None;
                    Completion::Done(FetchOutcome::Applied)
                }
                Err(error) => {
                    tracing::warn!("Tender query #{} failed: {}", generation, error);
                    // A failed page change keeps showing the last applied page.
                    let applied_page = state
                        .applied
                        .as_ref()
                        .filter(|applied| applied.same_filters(&state.criteria))
                        .map(|applied| applied.page);
                    if let Some(applied_page) = applied_page {
                        if applied_page != state.criteria.page {
                            state.retry_page = Some(state.criteria.page);
                            state.criteria.set_page(applied_page);
                        }
                    }
                    state.error = Some(error.clone());
                    Completion::Done(FetchOutcome::Failed(error))
                }
            }
        };
        self.broadcast();
        completion
    }

    fn build_snapshot(&self) -> EngineSnapshot {
        let now = self.clock.now();
        let state = self.state.read();
        let saved = self.saved.lock();

        let (visible, page_len) = match &state.page {
            Some(page) => (
                apply_view_mode(
                    &page.tenders,
                    state.mode,
                    now,
                    self.config.urgent_window(),
                    &saved,
                ),
                page.tenders.len(),
            ),
            None => (Vec::new(), 0),
        };

        let mut stats = state.stats.clone();
        stats.saved_count = saved.len();

        EngineSnapshot {
            criteria: state.criteria.clone(),
            mode: state.mode,
            visible,
            page_len,
            pagination: state.pagination,
            pages_current: state.pages_current(),
            stats,
            loading: state.loading,
            loaded: state.page.is_some(),
            error: state.error.clone(),
            warning: saved.warning().cloned(),
        }
    }

    fn broadcast(&self) {
        let snapshot = self.build_snapshot();
        let _ = self.tx.send(snapshot);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use mockall::mock;
    use scout_core::{FixedClock, Province, Tender};
    use scout_gateway::FixtureGateway;
    use scout_storage::MemoryStore;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration as StdDuration;

    mock! {
        Gateway {}
        impl TenderGateway for Gateway {
            fn query(&self, query: TenderQuery) -> BoxFuture<'static, Result<TenderPage, GatewayError>>;
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn corpus(n: usize) -> Vec<Tender> {
        (0..n)
            .map(|i| {
                Tender::new(
                    format!("T-{i}"),
                    format!("Tender {i}"),
                    IndustryCategory::Construction,
                    now() - Duration::days(i as i64),
                )
                .with_closing_date(now() + Duration::days(3 + i as i64))
            })
            .collect()
    }

    fn engine_with(gateway: Arc<dyn TenderGateway>) -> TenderEngine {
        TenderEngine::with_clock(
            gateway,
            Arc::new(MemoryStore::new()),
            EngineConfig::default(),
            Arc::new(FixedClock(now())),
        )
    }

    fn fixture_engine(n: usize) -> (TenderEngine, FixtureGateway) {
        let gateway = FixtureGateway::new(corpus(n));
        (engine_with(Arc::new(gateway.clone())), gateway)
    }

    #[tokio::test]
    async fn test_refresh_loads_first_page() {
        let (engine, _) = fixture_engine(45);
        assert_eq!(engine.view(), TenderView::Loading);

        let task = engine.refresh();
        assert!(engine.is_loading());
        assert_eq!(task.await, FetchOutcome::Applied);

        let snapshot = engine.snapshot();
        assert!(!snapshot.loading);
        assert_eq!(snapshot.visible.len(), 20);
        assert_eq!(snapshot.total_pages(), 3);
        assert_eq!(snapshot.stats.total_tenders, 20);
    }

    #[tokio::test]
    async fn test_filter_changes_reset_page() {
        let (engine, gateway) = fixture_engine(45);
        engine.refresh().await;
        engine.set_page(3).unwrap().await;
        assert_eq!(engine.page(), 3);

        engine.set_search("Tender").await;
        assert_eq!(engine.page(), 1);
        assert_eq!(gateway.last_query().unwrap().page, 1);

        engine.set_page(2).unwrap().await;
        engine.set_province(ProvinceFilter::Only(Province::Gp)).await;
        assert_eq!(engine.page(), 1);

        engine.refresh().await;
        engine.set_industries(BTreeSet::from([IndustryCategory::Energy])).await;
        assert_eq!(engine.page(), 1);
    }

    #[tokio::test]
    async fn test_set_page_out_of_range_is_ignored() {
        let (engine, gateway) = fixture_engine(45);
        engine.refresh().await;
        let calls = gateway.calls();

        assert!(engine.set_page(0).is_none());
        assert!(engine.set_page(4).is_none());
        assert_eq!(engine.page(), 1);
        assert_eq!(gateway.calls(), calls);
    }

    #[tokio::test]
    async fn test_page_count_unknown_while_filter_change_in_flight() {
        let gateway = FixtureGateway::new(corpus(45)).with_delay(StdDuration::from_millis(20));
        let engine = engine_with(Arc::new(gateway));
        engine.refresh().await;
        assert_eq!(engine.total_pages(), 3);

        // "Tender 4" matches T-4 and T-40..T-44: one page.
        let pending = engine.set_search("Tender 4");
        assert!(engine.set_page(3).is_none());
        assert!(engine.next_page().is_none());
        assert!(!engine.snapshot().has_next());
        assert_eq!(pending.await, FetchOutcome::Applied);

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.page(), 1);
        assert_eq!(snapshot.total_pages(), 1);
        assert_eq!(snapshot.visible.len(), 6);
        assert!(engine.set_page(3).is_none());
    }

    #[tokio::test]
    async fn test_page_past_shrunken_total_is_clamped() {
        let remote_total = Arc::new(AtomicU64::new(45));
        let pages = Arc::new(Mutex::new(Vec::new()));

        let mut gateway = MockGateway::new();
        let (total, seen) = (remote_total.clone(), pages.clone());
        gateway.expect_query().times(4).returning(move |query| {
            seen.lock().push(query.page);
            let total = total.load(Ordering::SeqCst);
            let start = (query.page as u64 - 1) * query.page_size as u64;
            let len = total.saturating_sub(start).min(query.page_size as u64);
            let tenders = corpus(len as usize);
            Box::pin(async move { Ok(TenderPage::new(tenders, total)) })
        });
        let engine = engine_with(Arc::new(gateway));

        engine.refresh().await;
        engine.set_page(3).unwrap().await;
        remote_total.store(6, Ordering::SeqCst);

        assert_eq!(engine.refresh().await, FetchOutcome::Applied);
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.page(), 1);
        assert_eq!(snapshot.total_pages(), 1);
        assert_eq!(snapshot.visible.len(), 6);
        assert!(!snapshot.loading);
        assert_eq!(*pages.lock(), vec![1, 3, 3, 1]);
    }

    #[tokio::test]
    async fn test_next_and_previous_stop_at_bounds() {
        let (engine, _) = fixture_engine(45);
        engine.refresh().await;

        assert!(engine.previous_page().is_none());
        engine.next_page().unwrap().await;
        engine.next_page().unwrap().await;
        assert_eq!(engine.page(), 3);
        assert!(engine.next_page().is_none());

        engine.previous_page().unwrap().await;
        assert_eq!(engine.page(), 2);
    }

    #[tokio::test]
    async fn test_view_modes_are_exclusive() {
        let (engine, _) = fixture_engine(10);
        engine.refresh().await;

        assert!(engine.activate_urgent().is_none());
        assert_eq!(engine.view_mode(), ViewMode::Urgent);

        engine.activate_saved();
        assert_eq!(engine.view_mode(), ViewMode::Saved);

        engine.toggle_saved();
        assert_eq!(engine.view_mode(), ViewMode::All);

        engine.toggle_urgent();
        assert_eq!(engine.view_mode(), ViewMode::Urgent);
        engine.toggle_saved();
        assert_eq!(engine.view_mode(), ViewMode::Saved);
    }

    #[tokio::test]
    async fn test_view_mode_from_later_page_refetches_page_one() {
        let (engine, gateway) = fixture_engine(45);
        engine.refresh().await;
        engine.set_page(2).unwrap().await;

        let task = engine.activate_urgent().expect("page reset needs a fetch");
        assert_eq!(engine.page(), 1);
        task.await;
        assert_eq!(gateway.last_query().unwrap().page, 1);
    }

    #[tokio::test]
    async fn test_saved_and_all_from_later_page_refetch_page_one() {
        let (engine, gateway) = fixture_engine(45);
        engine.refresh().await;

        engine.set_page(2).unwrap().await;
        let task = engine.activate_saved().expect("page reset needs a fetch");
        assert_eq!(engine.page(), 1);
        assert_eq!(engine.view_mode(), ViewMode::Saved);
        task.await;
        assert_eq!(gateway.last_query().unwrap().page, 1);

        engine.set_page(2).unwrap().await;
        let task = engine.activate_all().expect("page reset needs a fetch");
        assert_eq!(engine.page(), 1);
        assert_eq!(engine.view_mode(), ViewMode::All);
        task.await;
        assert_eq!(gateway.last_query().unwrap().page, 1);
    }

    #[tokio::test]
    async fn test_urgent_filters_loaded_page() {
        let (engine, _) = fixture_engine(10);
        engine.refresh().await;
        engine.activate_urgent();

        // Closing dates are now+3d .. now+12d; urgent keeps +3..+7.
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.visible.len(), 5);
        assert_eq!(snapshot.stats.urgent_tenders, 5);
    }

    #[tokio::test]
    async fn test_saved_mode_empty_state() {
        let (engine, _) = fixture_engine(5);
        engine.refresh().await;
        engine.activate_saved();

        assert_eq!(
            engine.view(),
            TenderView::Empty {
                reason: crate::selector::EmptyReason::NoSaved
            }
        );

        engine.toggle_saved_tender(&TenderId::from("T-2"));
        match engine.view() {
            TenderView::List { tenders, .. } => {
                assert_eq!(tenders.len(), 1);
                assert_eq!(tenders[0].id.as_ref(), "T-2");
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_save_toggle_updates_stats_without_fetch() {
        let (engine, gateway) = fixture_engine(5);
        engine.refresh().await;
        let calls = gateway.calls();
        let mut rx = engine.subscribe();

        assert!(engine.toggle_saved_tender(&TenderId::from("T-1")));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().stats.saved_count, 1);
        assert_eq!(gateway.calls(), calls);
    }

    #[tokio::test]
    async fn test_clear_all_resets_everything() {
        let (engine, _) = fixture_engine(45);
        engine.refresh().await;
        engine.set_search("Tender 1").await;
        engine.toggle_industry(IndustryCategory::Mining).await;
        engine.set_province(ProvinceFilter::Only(Province::Lp)).await;
        engine.activate_urgent();

        engine.clear_all().await;

        assert_eq!(engine.criteria(), FilterCriteria::default());
        assert_eq!(engine.view_mode(), ViewMode::All);
        assert_eq!(engine.page(), 1);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_result() {
        let (engine, gateway) = fixture_engine(25);
        engine.refresh().await;
        let before = engine.snapshot();

        gateway.fail_next(GatewayError::Server {
            status: 500,
            message: "boom".into(),
        });
        let outcome = engine.set_page(2).unwrap().await;
        assert!(matches!(outcome, FetchOutcome::Failed(_)));

        // The pager stays on the page that is actually shown.
        let after = engine.snapshot();
        assert_eq!(after.page(), 1);
        assert_eq!(after.visible, before.visible);
        assert_eq!(after.stats, before.stats);
        assert!(after.is_retryable());
        assert!(matches!(
            after.view(),
            TenderView::List {
                stale_error: Some(_),
                ..
            }
        ));

        assert_eq!(engine.retry().await, FetchOutcome::Applied);
        let recovered = engine.snapshot();
        assert!(recovered.error.is_none());
        assert_eq!(recovered.page(), 2);
        assert_eq!(recovered.visible.len(), 5);
    }

    #[tokio::test]
    async fn test_next_page_after_failed_page_change_starts_from_shown_page() {
        let (engine, gateway) = fixture_engine(45);
        engine.refresh().await;

        gateway.fail_next(GatewayError::Transport("offline".into()));
        engine.set_page(3).unwrap().await;
        assert_eq!(engine.page(), 1);

        engine.next_page().unwrap().await;
        assert_eq!(engine.page(), 2);
        assert_eq!(gateway.last_query().unwrap().page, 2);
    }

    #[tokio::test]
    async fn test_first_fetch_failure_is_retryable() {
        let (engine, gateway) = fixture_engine(3);
        gateway.fail_next(GatewayError::Transport("offline".into()));

        engine.refresh().await;
        assert!(matches!(engine.view(), TenderView::Failed { .. }));

        engine.retry().await;
        assert!(matches!(engine.view(), TenderView::List { .. }));
    }

    #[tokio::test]
    async fn test_slow_early_response_is_discarded() {
        let mut gateway = MockGateway::new();
        gateway.expect_query().times(2).returning(|query| {
            let slow = query.search.as_deref() == Some("slow");
            let tenders = corpus(if slow { 7 } else { 2 });
            Box::pin(async move {
                if slow {
                    tokio::time::sleep(StdDuration::from_millis(50)).await;
                }
                let total = tenders.len() as u64;
                Ok(TenderPage::new(tenders, total))
            })
        });
        let engine = engine_with(Arc::new(gateway));

        let first = engine.set_search("slow");
        let second = engine.set_search("fast");
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first, FetchOutcome::Stale);
        assert_eq!(second, FetchOutcome::Applied);

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.criteria.search, "fast");
        assert_eq!(snapshot.visible.len(), 2);
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn test_abandon_discards_in_flight() {
        let gateway = FixtureGateway::new(corpus(3)).with_delay(StdDuration::from_millis(20));
        let engine = engine_with(Arc::new(gateway));

        let task = engine.refresh();
        engine.abandon();
        assert!(!engine.is_loading());

        assert_eq!(task.await, FetchOutcome::Stale);
        assert!(!engine.snapshot().loaded);
    }

    #[tokio::test]
    async fn test_dropped_engine_discards_response() {
        let gateway = FixtureGateway::new(corpus(3)).with_delay(StdDuration::from_millis(10));
        let engine = engine_with(Arc::new(gateway));

        let task = engine.refresh();
        drop(engine);
        assert_eq!(task.await, FetchOutcome::Stale);
    }

    #[tokio::test]
    async fn test_storage_warning_is_surfaced() {
        let store = Arc::new(MemoryStore::new());
        store.write("savedTenders", "not json").unwrap();
        let engine = TenderEngine::with_clock(
            Arc::new(FixtureGateway::new(corpus(1))),
            store,
            EngineConfig::default(),
            Arc::new(FixedClock(now())),
        );

        assert!(engine.snapshot().warning.is_some());
        engine.dismiss_warning();
        assert!(engine.snapshot().warning.is_none());
    }
}
