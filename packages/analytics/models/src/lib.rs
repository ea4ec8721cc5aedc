#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Descriptive summary result types.
//!
//! Each summary is the data behind one chart over the unified record set.
//! Rendering is left to whatever consumes the JSON documents.

use crime_panel_crime_models::Month;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Number of entries kept by the "top N" rankings.
pub const TOP_N: usize = 10;

/// Number of suburbs kept on the heatmap's suburb axis.
pub const HEATMAP_SUBURBS: usize = 25;

/// The descriptive summaries this crate can produce.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SummaryKind {
    /// Offence count per month.
    MonthlyTrend,
    /// Top offence level 1 categories by offence count.
    TopOffenceTypes,
    /// Top suburbs by offence count.
    TopSuburbs,
    /// Suburb by offence level 1 pivot for the busiest suburbs.
    SuburbHeatmap,
    /// Record share per offence level 1 category.
    Level1Distribution,
    /// Top offence level 2 categories by offence count.
    TopOffenceLevel2,
}

impl SummaryKind {
    /// Every summary, in the order they are written.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::MonthlyTrend,
            Self::TopOffenceTypes,
            Self::TopSuburbs,
            Self::SuburbHeatmap,
            Self::Level1Distribution,
            Self::TopOffenceLevel2,
        ]
    }

    /// File name of the JSON document for this summary.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::MonthlyTrend => "monthly_crime_trend.json",
            Self::TopOffenceTypes => "top_10_offence_types.json",
            Self::TopSuburbs => "top_10_crime_suburbs.json",
            Self::SuburbHeatmap => "suburb_crime_heatmap_filtered.json",
            Self::Level1Distribution => "offence_level1_pie.json",
            Self::TopOffenceLevel2 => "top_10_offence_level2.json",
        }
    }

    /// Human-readable chart title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::MonthlyTrend => "Monthly Crime Trend",
            Self::TopOffenceTypes => "Top 10 Offence Types",
            Self::TopSuburbs => "Top 10 Crime Suburbs",
            Self::SuburbHeatmap => "Crime Type by Suburb (Top 25, Log Scale)",
            Self::Level1Distribution => "Offence Level 1 Category Distribution",
            Self::TopOffenceLevel2 => "Top 10 Offence Level 2 Types",
        }
    }
}

/// Summed offence count for one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotal {
    /// The month (`YYYY-MM`).
    pub month: Month,
    /// Sum of offence counts reported in the month.
    pub offence_count: u64,
}

/// One entry of a ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCount {
    /// Category or suburb name.
    pub label: String,
    /// Summed offence count.
    pub offence_count: u64,
}

/// Record count and percentage share of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    /// Category name.
    pub label: String,
    /// Number of records in the category.
    pub records: u64,
    /// Share of all categorised records, in percent.
    pub percent: f64,
}

/// One cell of the suburb heatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapCell {
    /// Row label.
    pub suburb: String,
    /// Column label.
    pub offence_level_1: String,
    /// Summed offence count, 0 where the pair never occurs.
    pub offence_count: u64,
    /// `ln(1 + offence_count)`.
    pub log_count: f64,
}

/// Dense suburb by offence level 1 pivot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuburbHeatmap {
    /// Row labels, busiest suburb first.
    pub suburbs: Vec<String>,
    /// Column labels, alphabetical.
    pub categories: Vec<String>,
    /// Row-major cells, `suburbs.len() * categories.len()` of them.
    pub cells: Vec<HeatmapCell>,
}

impl SuburbHeatmap {
    /// Looks up the cell for a suburb and category.
    #[must_use]
    pub fn cell(&self, suburb: &str, category: &str) -> Option<&HeatmapCell> {
        let row = self.suburbs.iter().position(|s| s == suburb)?;
        let col = self.categories.iter().position(|c| c == category)?;
        self.cells.get(row * self.categories.len() + col)
    }
}

/// A summary as written to disk: its title plus the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDocument<T> {
    /// Which summary this is.
    pub kind: SummaryKind,
    /// Chart title.
    pub title: String,
    /// Summary data.
    pub data: T,
}

impl<T> SummaryDocument<T> {
    /// Wraps `data` with the kind's title.
    pub fn new(kind: SummaryKind, data: T) -> Self {
        Self {
            kind,
            title: kind.title().to_string(),
            data,
        }
    }
}

/// Every descriptive summary over one record set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summaries {
    /// Offence count per month, ascending.
    pub monthly_trend: Vec<MonthlyTotal>,
    /// Top offence level 1 categories.
    pub top_offence_types: Vec<RankedCount>,
    /// Top suburbs.
    pub top_suburbs: Vec<RankedCount>,
    /// Suburb by category pivot.
    pub suburb_heatmap: SuburbHeatmap,
    /// Record share per offence level 1 category.
    pub level1_distribution: Vec<CategoryShare>,
    /// Top offence level 2 categories.
    pub top_offence_level2: Vec<RankedCount>,
}
