//! Tender records and the closed enumerations they are tagged with.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How far ahead a closing date may be for a tender to count as urgent.
///
/// Shared by the urgent view filter and the urgent counter in the stats so
/// the two never disagree.
pub const URGENT_WINDOW_DAYS: i64 = 7;

/// The urgent window as a duration.
pub fn urgent_window() -> Duration {
    Duration::days(URGENT_WINDOW_DAYS)
}

/// Stable tender identifier, opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenderId(pub String);

impl From<String> for TenderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TenderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for TenderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Industry tag attached to every tender.
///
/// Serialized by display label, which is also what the remote source uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IndustryCategory {
    #[serde(rename = "ICT & Software")]
    IctSoftware,
    #[serde(rename = "Construction & Infrastructure")]
    Construction,
    #[serde(rename = "Healthcare & Medical")]
    Healthcare,
    #[serde(rename = "Energy & Utilities")]
    Energy,
    #[serde(rename = "Transport & Logistics")]
    Transport,
    #[serde(rename = "Agriculture")]
    Agriculture,
    #[serde(rename = "Security Services")]
    Security,
    #[serde(rename = "Professional Services")]
    ProfessionalServices,
    #[serde(rename = "Education & Training")]
    Education,
    #[serde(rename = "Mining")]
    Mining,
    #[serde(rename = "Manufacturing")]
    Manufacturing,
    #[serde(rename = "Cleaning & Facilities")]
    Facilities,
}

impl IndustryCategory {
    /// Every industry tag, in the order the filter panel lists them.
    pub const ALL: [IndustryCategory; 12] = [
        IndustryCategory::IctSoftware,
        IndustryCategory::Construction,
        IndustryCategory::Healthcare,
        IndustryCategory::Energy,
        IndustryCategory::Transport,
        IndustryCategory::Agriculture,
        IndustryCategory::Security,
        IndustryCategory::ProfessionalServices,
        IndustryCategory::Education,
        IndustryCategory::Mining,
        IndustryCategory::Manufacturing,
        IndustryCategory::Facilities,
    ];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            IndustryCategory::IctSoftware => "ICT & Software",
            IndustryCategory::Construction => "Construction & Infrastructure",
            IndustryCategory::Healthcare => "Healthcare & Medical",
            IndustryCategory::Energy => "Energy & Utilities",
            IndustryCategory::Transport => "Transport & Logistics",
            IndustryCategory::Agriculture => "Agriculture",
            IndustryCategory::Security => "Security Services",
            IndustryCategory::ProfessionalServices => "Professional Services",
            IndustryCategory::Education => "Education & Training",
            IndustryCategory::Mining => "Mining",
            IndustryCategory::Manufacturing => "Manufacturing",
            IndustryCategory::Facilities => "Cleaning & Facilities",
        }
    }
}

impl fmt::Display for IndustryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for IndustryCategory {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        IndustryCategory::ALL
            .into_iter()
            .find(|tag| tag.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownTag(s.to_string()))
    }
}

/// Region code a tender is published for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Province {
    Ec,
    Fs,
    Gp,
    Kzn,
    Lp,
    Mp,
    Nc,
    Nw,
    Wc,
}

impl Province {
    pub const ALL: [Province; 9] = [
        Province::Ec,
        Province::Fs,
        Province::Gp,
        Province::Kzn,
        Province::Lp,
        Province::Mp,
        Province::Nc,
        Province::Nw,
        Province::Wc,
    ];

    /// Short region code, e.g. "GP".
    pub fn code(self) -> &'static str {
        match self {
            Province::Ec => "EC",
            Province::Fs => "FS",
            Province::Gp => "GP",
            Province::Kzn => "KZN",
            Province::Lp => "LP",
            Province::Mp => "MP",
            Province::Nc => "NC",
            Province::Nw => "NW",
            Province::Wc => "WC",
        }
    }

    /// Full region name.
    pub fn name(self) -> &'static str {
        match self {
            Province::Ec => "Eastern Cape",
            Province::Fs => "Free State",
            Province::Gp => "Gauteng",
            Province::Kzn => "KwaZulu-Natal",
            Province::Lp => "Limpopo",
            Province::Mp => "Mpumalanga",
            Province::Nc => "Northern Cape",
            Province::Nw => "North West",
            Province::Wc => "Western Cape",
        }
    }
}

impl fmt::Display for Province {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.code())
    }
}

impl FromStr for Province {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Province::ALL
            .into_iter()
            .find(|p| p.code().eq_ignore_ascii_case(needle) || p.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownTag(s.to_string()))
    }
}

/// A label that does not name any known industry or province.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tag: {0}")]
pub struct UnknownTag(pub String);

/// A published procurement opportunity.
///
/// Tenders come from the remote source and are never mutated locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tender {
    pub id: TenderId,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub buyer: String,

    pub industry_category: IndustryCategory,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<Province>,

    pub published_date: DateTime<Utc>,

    /// Expected to be on or after `published_date`; not checked here.
    pub closing_date: DateTime<Utc>,

    #[serde(default)]
    pub document_links: Vec<String>,

    #[serde(default)]
    pub source: String,

    #[serde(default)]
    pub source_url: String,
}

impl Tender {
    /// Create a tender with required fields, closing 30 days after publication.
    pub fn new(
        id: impl Into<TenderId>,
        title: impl Into<String>,
        industry_category: IndustryCategory,
        published_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            buyer: String::new(),
            industry_category,
            province: None,
            published_date,
            closing_date: published_date + Duration::days(30),
            document_links: Vec::new(),
            source: String::new(),
            source_url: String::new(),
        }
    }

    pub fn with_province(mut self, province: Province) -> Self {
        self.province = Some(province);
        self
    }

    pub fn with_closing_date(mut self, closing_date: DateTime<Utc>) -> Self {
        self.closing_date = closing_date;
        self
    }

    pub fn with_buyer(mut self, buyer: impl Into<String>) -> Self {
        self.buyer = buyer.into();
        self
    }

    /// Closes within `window` of `now`. Already-closed tenders count too.
    pub fn is_urgent(&self, now: DateTime<Utc>, window: Duration) -> bool {
        match now.checked_add_signed(window) {
            Some(limit) => self.closing_date <= limit,
            None => window > Duration::zero(),
        }
    }

    pub fn is_closed(&self, now: DateTime<Utc>) -> bool {
        self.closing_date < now
    }

    /// Whole days left until closing, negative once closed.
    pub fn days_until_closing(&self, now: DateTime<Utc>) -> i64 {
        (self.closing_date - now).num_days()
    }

    /// Case-insensitive substring match over title, description and buyer.
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [&self.title, &self.description, &self.buyer]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}
