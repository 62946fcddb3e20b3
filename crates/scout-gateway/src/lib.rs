//! Tender query gateway for the Scout engine.
//!
//! The remote tender source is reached only through the [`TenderGateway`]
//! trait. The trait returns futures so the caller decides how to drive them,
//! which keeps the engine runtime-agnostic and lets tests substitute an
//! in-memory source.
//!
//! ## Query Shape
//!
//! A [`TenderQuery`] is derived from the engine's `FilterCriteria`:
//! - unconstrained dimensions are omitted (`None`), never sent as empty values
//! - the page size is fixed per engine, 20 by default
//!
//! No ordering is promised beyond what the source returns, and `total_count`
//! may drift from the page contents if the corpus changes between calls.

mod fixture;
mod timeout;

use futures::future::BoxFuture;
use scout_core::{FilterCriteria, GatewayError, IndustryCategory, Province, Tender};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub use fixture::FixtureGateway;
pub use timeout::TimeoutGateway;

// =============================================================================
// Query & Page
// =============================================================================

/// One paged, filtered request to the tender source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderQuery {
    /// 1-based.
    pub page: u32,

    pub page_size: u32,

    /// `None` when no industry is selected; never an empty set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industries: Option<BTreeSet<IndustryCategory>>,

    /// `None` for "all provinces".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<Province>,

    /// Trimmed search text, `None` when blank.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl TenderQuery {
    /// Translate filter criteria into a query, dropping unconstrained fields.
    pub fn from_criteria(criteria: &FilterCriteria, page_size: u32) -> Self {
        let industries = if criteria.industries.is_empty() {
            None
        } else {
            Some(criteria.industries.clone())
        };

        let search = criteria.search.trim();
        let search = if search.is_empty() {
            None
        } else {
            Some(search.to_string())
        };

        Self {
            page: criteria.page.max(1),
            page_size: page_size.max(1),
            industries,
            province: criteria.province.province(),
            search,
        }
    }

    /// Zero-based index of the first tender on the requested page.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.page_size as usize
    }

    /// Whether `tender` satisfies every constraint in this query.
    pub fn matches(&self, tender: &Tender) -> bool {
        if let Some(industries) = &self.industries {
            if !industries.contains(&tender.industry_category) {
                return false;
            }
        }
        if let Some(province) = self.province {
            if tender.province != Some(province) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            if !tender.matches_text(search) {
                return false;
            }
        }
        true
    }
}

/// One page of results plus the size of the full filtered result set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderPage {
    pub tenders: Vec<Tender>,
    pub total_count: u64,
}

impl TenderPage {
    pub fn new(tenders: Vec<Tender>, total_count: u64) -> Self {
        Self {
            tenders,
            total_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tenders.is_empty()
    }
}

// =============================================================================
// Gateway Trait
// =============================================================================

/// Paged, filterable access to the remote tender source.
///
/// Implementations must not block: all work happens inside the returned
/// future. Any failure is a [`GatewayError`] and is always retryable.
#[cfg_attr(test, mockall::automock)]
pub trait TenderGateway: Send + Sync {
    /// Fetch one page of tenders matching `query`.
    fn query(&self, query: TenderQuery) -> BoxFuture<'static, Result<TenderPage, GatewayError>>;
}

// =============================================================================
// Tests
// =============================================================================
