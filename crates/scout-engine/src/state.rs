//! Snapshot model for the tender view.
//!
//! These types are what subscribers see. They are plain data, independent of
//! any UI toolkit, so rendering decisions can be tested directly.

use scout_core::{FilterCriteria, GatewayError, Tender, ViewMode, PAGE_SIZE};
use scout_storage::StorageWarning;

use crate::pagination::Pagination;
use crate::selector::EmptyReason;
use crate::stats::StatsSnapshot;

// =============================================================================
// Engine Snapshot
// =============================================================================

/// Everything the tender view needs to render, as of one moment.
///
/// Broadcast after every state change.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    pub criteria: FilterCriteria,

    pub mode: ViewMode,

    /// Tenders on the latest page after the view mode is applied.
    pub visible: Vec<Tender>,

    /// Number of tenders on the latest page before the view mode is applied.
    pub page_len: usize,

    pub pagination: Pagination,

    /// `pagination` was counted for the current filters. False while a
    /// filter change is in flight; only page 1 can be requested until then.
    pub pages_current: bool,

    pub stats: StatsSnapshot,

    /// A fetch is in flight.
    pub loading: bool,

    /// At least one fetch has succeeded.
    pub loaded: bool,

    /// The latest fetch failed. Earlier data, if any, is still shown.
    pub error: Option<GatewayError>,

    /// Saved tenders are not being persisted.
    pub warning: Option<StorageWarning>,
}

impl EngineSnapshot {
    /// Snapshot before anything has been fetched.
    pub fn initial() -> Self {
        Self {
            criteria: FilterCriteria::default(),
            mode: ViewMode::All,
            visible: Vec::new(),
            page_len: 0,
            pagination: Pagination::new(0, PAGE_SIZE),
            pages_current: false,
            stats: StatsSnapshot::default(),
            loading: false,
            loaded: false,
            error: None,
            warning: None,
        }
    }

    pub fn page(&self) -> u32 {
        self.criteria.page
    }

    pub fn total_pages(&self) -> u32 {
        self.pagination.total_pages()
    }

    pub fn has_next(&self) -> bool {
        self.pages_current && self.pagination.next_of(self.page()).is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.pagination.previous_of(self.page()).is_some()
    }

    /// Whether the user should be offered a retry action.
    pub fn is_retryable(&self) -> bool {
        self.error.is_some() && !self.loading
    }

    /// Decide what the tender view shows.
    pub fn view(&self) -> TenderView {
        if !self.loaded {
            return match &self.error {
                Some(error) if !self.loading => TenderView::Failed {
                    message: error.to_string(),
                },
                _ => TenderView::Loading,
            };
        }

        if self.visible.is_empty() {
            let filtered = self.criteria.active_filter_count() > 0;
            return TenderView::Empty {
                reason: EmptyReason::for_mode(self.mode, self.page_len == 0, filtered),
            };
        }

        TenderView::List {
            tenders: self.visible.clone(),
            stale_error: self.error.as_ref().map(|e| e.to_string()),
        }
    }
}

// =============================================================================
// Tender View
// =============================================================================

/// The four things the tender view can show. Never blank.
#[derive(Debug, Clone, PartialEq)]
pub enum TenderView {
    /// First fetch in flight.
    Loading,

    /// First fetch failed; offer a retry.
    Failed { message: String },

    /// Nothing to show, with the reason.
    Empty { reason: EmptyReason },

    /// Tenders to show. `stale_error` is set when a later refresh failed and
    /// this is the previous result.
    List {
        tenders: Vec<Tender>,
        stale_error: Option<String>,
    },
}

// =============================================================================
// Fetch Outcome
// =============================================================================

/// What happened to one issued fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Result was applied to the engine state.
    Applied,

    /// A newer fetch was issued first, or the view was abandoned; discarded.
    Stale,

    /// The gateway failed. Previous data stays visible.
    Failed(GatewayError),
}
