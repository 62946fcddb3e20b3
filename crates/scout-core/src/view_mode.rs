//! View mode types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Refinement applied to a fetched page after retrieval.
///
/// A single enum rather than two toggles, so "urgent and saved at once"
/// cannot be represented.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Show every tender on the page.
    #[default]
    All,
    /// Only tenders closing within the urgent window.
    Urgent,
    /// Only bookmarked tenders.
    Saved,
}

impl ViewMode {
    /// Pressing a toggle that is already active returns to `All`.
    pub fn toggled(self, pressed: ViewMode) -> ViewMode {
        if self == pressed {
            ViewMode::All
        } else {
            pressed
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViewMode::All => "all",
            ViewMode::Urgent => "urgent",
            ViewMode::Saved => "saved",
        };
        f.write_str(name)
    }
}
