//! Plain-text and JSON rendering of engine snapshots.

use chrono::{DateTime, Utc};
use scout_core::{Tender, TenderId};
use scout_engine::{EngineSnapshot, StatsSnapshot, TenderView};
use serde::Serialize;

/// Render the tender list, empty state, loading or error line.
pub fn render_view(
    view: &TenderView,
    now: DateTime<Utc>,
    is_saved: impl Fn(&TenderId) -> bool,
) -> String {
    match view {
        TenderView::Loading => "Loading tenders...".to_string(),
        TenderView::Failed { message } => {
            format!("Could not load tenders: {message}. Run again to retry.")
        }
        TenderView::Empty { reason } => reason.to_string(),
        TenderView::List {
            tenders,
            stale_error,
        } => {
            let mut lines = Vec::with_capacity(tenders.len() + 1);
            if let Some(error) = stale_error {
                lines.push(format!("! Showing previous results: {error}"));
            }
            lines.extend(tenders.iter().map(|t| render_tender(t, now, is_saved(&t.id))));
            lines.join("\n")
        }
    }
}

fn render_tender(tender: &Tender, now: DateTime<Utc>, saved: bool) -> String {
    let marker = if saved { "*" } else { " " };
    let province = tender.province.map(|p| p.code()).unwrap_or("--");
    let closing = match tender.days_until_closing(now) {
        _ if tender.is_closed(now) => "closed".to_string(),
        0 => "closes today".to_string(),
        1 => "closes in 1 day".to_string(),
        days => format!("closes in {days} days"),
    };
    let mut line = format!(
        "[{marker}] {:<8} {:<4} {:<16} {} | {}",
        tender.id, province, closing, tender.industry_category, tender.title
    );
    if !tender.buyer.is_empty() {
        line.push_str(" | ");
        line.push_str(&tender.buyer);
    }
    line
}

/// "Page 2 of 3 (21-40 of 45)".
pub fn render_pager(snapshot: &EngineSnapshot) -> String {
    let page = snapshot.page();
    let mut line = format!("Page {} of {}", page, snapshot.total_pages());
    if let Some((first, last)) = snapshot.pagination.item_range(page) {
        line.push_str(&format!(
            " ({}-{} of {})",
            first, last, snapshot.pagination.total_count
        ));
    }
    line
}

pub fn render_stats(stats: &StatsSnapshot) -> String {
    format!("{stats} (this page only)")
}

/// Machine-readable form of a snapshot.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonReport<'a> {
    pub criteria: &'a scout_core::FilterCriteria,
    pub mode: scout_core::ViewMode,
    pub page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub tenders: &'a [Tender],
    pub stats: &'a StatsSnapshot,
    pub saved: Vec<TenderId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl<'a> JsonReport<'a> {
    pub fn new(snapshot: &'a EngineSnapshot, saved: Vec<TenderId>) -> Self {
        Self {
            criteria: &snapshot.criteria,
            mode: snapshot.mode,
            page: snapshot.page(),
            total_pages: snapshot.total_pages(),
            total_count: snapshot.pagination.total_count,
            tenders: &snapshot.visible,
            stats: &snapshot.stats,
            saved,
            error: snapshot.error.as_ref().map(|e| e.to_string()),
            warning: snapshot.warning.as_ref().map(|w| w.to_string()),
        }
    }
}
