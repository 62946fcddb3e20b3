//! View Mode Selector
//!
//! Narrows an already-fetched page according to the active [`ViewMode`].
//! Never re-queries the source.

use chrono::{DateTime, Duration, Utc};
use scout_core::{Tender, ViewMode};
use scout_storage::SavedTenderRegistry;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Keep the tenders on `page` that the active mode shows, in page order.
pub fn apply_view_mode(
    page: &[Tender],
    mode: ViewMode,
    now: DateTime<Utc>,
    urgent_window: Duration,
    saved: &SavedTenderRegistry,
) -> Vec<Tender> {
    match mode {
        ViewMode::All => page.to_vec(),
        ViewMode::Urgent => page
            .iter()
            .filter(|t| t.is_urgent(now, urgent_window))
            .cloned()
            .collect(),
        ViewMode::Saved => page
            .iter()
            .filter(|t| saved.is_saved(&t.id))
            .cloned()
            .collect(),
    }
}

/// Why the rendered list is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// The source has no tenders at all.
    NoTenders,
    /// Filters exclude everything.
    NoMatches,
    /// The page has tenders, none closing soon.
    NoUrgent,
    /// The page has tenders, none bookmarked.
    NoSaved,
}

impl EmptyReason {
    /// Pick the reason for an empty list.
    pub fn for_mode(mode: ViewMode, page_was_empty: bool, filtered: bool) -> Self {
        match mode {
            ViewMode::Urgent if !page_was_empty => EmptyReason::NoUrgent,
            ViewMode::Saved if !page_was_empty => EmptyReason::NoSaved,
            _ if filtered => EmptyReason::NoMatches,
            _ => EmptyReason::NoTenders,
        }
    }
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            EmptyReason::NoTenders => "No tenders available yet",
            EmptyReason::NoMatches => "No tenders match your filters",
            EmptyReason::NoUrgent => "No urgent tenders on this page",
            EmptyReason::NoSaved => "No saved tenders on this page",
        };
        f.write_str(message)
    }
}
