//! Filter criteria sent to the tender source.
//!
//! Transitions are plain methods on the value so they can be tested without
//! an engine. Every transition other than `set_page` sends the user back to
//! the first page.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::tender::{IndustryCategory, Province, UnknownTag};

/// Province selection: a single region or no constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvinceFilter {
    #[default]
    All,
    Only(Province),
}

impl ProvinceFilter {
    /// The province to send upstream, `None` for "all".
    pub fn province(self) -> Option<Province> {
        match self {
            ProvinceFilter::All => None,
            ProvinceFilter::Only(p) => Some(p),
        }
    }
}

impl From<Province> for ProvinceFilter {
    fn from(p: Province) -> Self {
        ProvinceFilter::Only(p)
    }
}

impl fmt::Display for ProvinceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvinceFilter::All => f.write_str("all"),
            ProvinceFilter::Only(p) => write!(f, "{p}"),
        }
    }
}

impl FromStr for ProvinceFilter {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(ProvinceFilter::All)
        } else {
            s.parse::<Province>().map(ProvinceFilter::Only)
        }
    }
}

/// The composed query: industries, province, search text and page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Empty means no industry constraint.
    pub industries: BTreeSet<IndustryCategory>,
    pub province: ProvinceFilter,
    /// Empty means no text constraint.
    pub search: String,
    /// 1-based.
    pub page: u32,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            industries: BTreeSet::new(),
            province: ProvinceFilter::All,
            search: String::new(),
            page: 1,
        }
    }
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the industry set. Resets the page.
    pub fn set_industries(&mut self, industries: BTreeSet<IndustryCategory>) {
        self.industries = industries;
        self.page = 1;
    }

    /// Add or remove one industry tag. Resets the page.
    ///
    /// Returns whether the tag is selected afterwards.
    pub fn toggle_industry(&mut self, tag: IndustryCategory) -> bool {
        let selected = if self.industries.remove(&tag) {
            false
        } else {
            self.industries.insert(tag);
            true
        };
        self.page = 1;
        selected
    }

    /// Replace the province selection. Resets the page.
    pub fn set_province(&mut self, province: ProvinceFilter) {
        self.province = province;
        self.page = 1;
    }

    /// Replace the search text. Resets the page.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    /// Set the page without any bounds check. Callers validate against the
    /// current page count first.
    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Back to no constraints on page 1.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Same filters, ignoring the page. Page counts carry over between two
    /// criteria exactly when this holds.
    pub fn same_filters(&self, other: &FilterCriteria) -> bool {
        self.industries == other.industries
            && self.province == other.province
            && self.search == other.search
    }

    /// Number of constrained dimensions, for the filter badge.
    pub fn active_filter_count(&self) -> usize {
        let mut count = self.industries.len();
        if self.province != ProvinceFilter::All {
            count += 1;
        }
        if !self.search.trim().is_empty() {
            count += 1;
        }
        count
    }
}
