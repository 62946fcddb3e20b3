//! Result Aggregator
//!
//! Summary counters over the latest fetched page. The counts only reflect
//! that one page, not the whole remote corpus, and are marked as such with
//! [`StatsScope::CurrentPage`].

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use scout_core::Tender;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the counters were computed over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsScope {
    /// The most recent page only. Approximate for anything but a complete page.
    #[default]
    CurrentPage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub total_tenders: usize,
    /// Published in the trailing 7 days.
    pub this_week_tenders: usize,
    /// Published since the first day of the current month (UTC).
    pub this_month_tenders: usize,
    /// Closing within the urgent window.
    pub urgent_tenders: usize,
    /// Size of the saved registry, regardless of page.
    pub saved_count: usize,
    pub scope: StatsScope,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tenders, {} this week, {} this month, {} urgent, {} saved",
            self.total_tenders,
            self.this_week_tenders,
            self.this_month_tenders,
            self.urgent_tenders,
            self.saved_count
        )
    }
}

/// Compute counters for `page` as of `now`. `saved_count` is left at zero;
/// the engine fills it in live from the registry.
pub fn aggregate(page: &[Tender], now: DateTime<Utc>, urgent_window: Duration) -> StatsSnapshot {
    let week_start = now - Duration::days(7);
    let month_start = start_of_month(now);

    let published_between =
        |t: &Tender, start: DateTime<Utc>| t.published_date >= start && t.published_date <= now;

    StatsSnapshot {
        total_tenders: page.len(),
        this_week_tenders: page.iter().filter(|t| published_between(t, week_start)).count(),
        this_month_tenders: page
            .iter()
            .filter(|t| published_between(t, month_start))
            .count(),
        urgent_tenders: page
            .iter()
            .filter(|t| t.is_urgent(now, urgent_window))
            .count(),
        saved_count: 0,
        scope: StatsScope::CurrentPage,
    }
}

/// Midnight UTC on the first day of `now`'s month.
fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or(now)
}
