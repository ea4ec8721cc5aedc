#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Monthly aggregate, panel row, and panel configuration types.
//!
//! A [`MonthlyAggregate`] is one `(entity key, month)` count. A [`PanelRow`]
//! extends it with positional lag features and short-window statistics as
//! configured by [`PanelConfig`].

use std::path::PathBuf;
use std::time::Duration;

use crime_panel_crime_models::{EntityKey, Month};
use serde::{Deserialize, Serialize};

/// Default number of lag features per row.
pub const DEFAULT_LAG_DEPTH: usize = 12;

/// Default number of most recent lags summarized by the mean/std features.
pub const DEFAULT_STATS_WINDOW: usize = 3;

/// Output column holding the suburb.
pub const SUBURB_COLUMN: &str = "Suburb";

/// Output column holding the broad offence category.
pub const OFFENCE_LEVEL_1_COLUMN: &str = "Offence Level 1";

/// Output column holding the medium offence category.
pub const OFFENCE_LEVEL_2_COLUMN: &str = "Offence Level 2";

/// Output column holding the first day of the row's month.
pub const MONTH_START_COLUMN: &str = "Month";

/// Output column holding the target count.
pub const OFFENCE_COUNT_COLUMN: &str = "offence_count";

/// Output column holding the calendar month number (1-12).
pub const MONTH_NUMBER_COLUMN: &str = "month";

/// Feature-window configuration for the panel builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct PanelConfig {
    /// Number of lag features (`lag_1..=lag_N`). Rows are only retained
    /// when every one of them is defined.
    pub lag_depth: usize,
    /// Number of most recent lags averaged for `avg_lag_W` / `std_lag_W`.
    pub stats_window: usize,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            lag_depth: DEFAULT_LAG_DEPTH,
            stats_window: DEFAULT_STATS_WINDOW,
        }
    }
}

impl PanelConfig {
    /// Checks that the configuration describes a usable feature window.
    ///
    /// # Errors
    ///
    /// Returns an error if either size is zero or the statistics window is
    /// wider than the lag depth.
    pub const fn validate(&self) -> Result<(), InvalidPanelConfigError> {
        if self.lag_depth == 0 {
            return Err(InvalidPanelConfigError::ZeroLagDepth);
        }
        if self.stats_window == 0 {
            return Err(InvalidPanelConfigError::ZeroStatsWindow);
        }
        if self.stats_window > self.lag_depth {
            return Err(InvalidPanelConfigError::WindowExceedsDepth {
                stats_window: self.stats_window,
                lag_depth: self.lag_depth,
            });
        }
        Ok(())
    }

    /// Name of the `k`-th lag column (1-based).
    #[must_use]
    pub fn lag_column(k: usize) -> String {
        format!("lag_{k}")
    }

    /// Name of the short-window mean column.
    #[must_use]
    pub fn avg_column(&self) -> String {
        format!("avg_lag_{}", self.stats_window)
    }

    /// Name of the short-window standard deviation column.
    #[must_use]
    pub fn std_column(&self) -> String {
        format!("std_lag_{}", self.stats_window)
    }

    /// Full header of the emitted panel table, in column order.
    #[must_use]
    pub fn output_header(&self) -> Vec<String> {
        let mut header = vec![
            SUBURB_COLUMN.to_string(),
            OFFENCE_LEVEL_1_COLUMN.to_string(),
            OFFENCE_LEVEL_2_COLUMN.to_string(),
            MONTH_START_COLUMN.to_string(),
            OFFENCE_COUNT_COLUMN.to_string(),
        ];
        header.extend((1..=self.lag_depth).map(Self::lag_column));
        header.push(self.avg_column());
        header.push(self.std_column());
        header.push(MONTH_NUMBER_COLUMN.to_string());
        header
    }
}

/// Error returned by [`PanelConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidPanelConfigError {
    /// `lag_depth` was zero.
    ZeroLagDepth,
    /// `stats_window` was zero.
    ZeroStatsWindow,
    /// `stats_window` was larger than `lag_depth`.
    WindowExceedsDepth {
        /// The configured window.
        stats_window: usize,
        /// The configured depth.
        lag_depth: usize,
    },
}

impl std::fmt::Display for InvalidPanelConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroLagDepth => write!(f, "lag_depth must be at least 1"),
            Self::ZeroStatsWindow => write!(f, "stats_window must be at least 1"),
            Self::WindowExceedsDepth {
                stats_window,
                lag_depth,
            } => write!(
                f,
                "stats_window ({stats_window}) must not exceed lag_depth ({lag_depth})"
            ),
        }
    }
}

impl std::error::Error for InvalidPanelConfigError {}

/// Summed offence count for one entity key in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAggregate {
    /// The series this count belongs to.
    pub key: EntityKey,
    /// Calendar month of the count.
    pub month: Month,
    /// Sum of offence counts for the key in the month.
    pub offence_count: u64,
}

/// A [`MonthlyAggregate`] with its historical features attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelRow {
    /// The series this row belongs to.
    pub key: EntityKey,
    /// Calendar month of the row.
    pub month: Month,
    /// Target count for the month.
    pub offence_count: u64,
    /// `lags[k - 1]` is the count `k` observed rows earlier in the same
    /// series, or `None` when the series is not that long yet.
    pub lags: Vec<Option<u64>>,
    /// Mean of the most recent lags in the statistics window.
    pub avg_lag: Option<f64>,
    /// Sample standard deviation of the same lags.
    pub std_lag: Option<f64>,
}

impl PanelRow {
    /// Returns lag `k` (1-based), or `None` if undefined or out of range.
    #[must_use]
    pub fn lag(&self, k: usize) -> Option<u64> {
        k.checked_sub(1)
            .and_then(|i| self.lags.get(i))
            .copied()
            .flatten()
    }

    /// Whether every lag feature is defined.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.lags.iter().all(Option::is_some)
    }

    /// Calendar month number (1-12) of the row.
    #[must_use]
    pub const fn month_number(&self) -> u32 {
        self.month.number()
    }
}

/// Diagnostics from one end-to-end panel run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    /// Records read across every source table.
    pub records_loaded: u64,
    /// Records whose reported date could not be parsed.
    pub records_missing_month: u64,
    /// Dated records excluded from grouping because a key component was
    /// blank.
    pub records_without_key: u64,
    /// Monthly aggregate rows produced.
    pub aggregates: u64,
    /// Panel rows built (before filtering).
    pub panel_rows: u64,
    /// Panel rows retained by the completeness filter.
    pub retained_rows: u64,
    /// Where the panel table was written.
    pub output_path: PathBuf,
    /// How long the run took.
    pub duration: Duration,
}
