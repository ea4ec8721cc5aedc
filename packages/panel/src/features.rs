//! Panel builder: positional lag features and short-window statistics.
//!
//! Monthly aggregates are partitioned into one month-ordered series per
//! entity key. Within a series, `lag_k` of row `i` is the count of row
//! `i - k`. Lags count observed rows, not calendar months: a month with no
//! incidents has no row, so the row before it is one position back.

use std::collections::BTreeMap;

use crime_panel_crime_models::{EntityKey, Month};
use crime_panel_panel_models::{MonthlyAggregate, PanelConfig, PanelRow};

/// The month-ordered counts of one entity key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySeries {
    /// The series' key.
    pub key: EntityKey,
    /// `(month, count)` pairs in ascending month order.
    pub points: Vec<(Month, u64)>,
}

/// Splits aggregates into per-key series, ordered by key, each sorted by
/// month.
#[must_use]
pub fn partition_by_entity(aggregates: &[MonthlyAggregate]) -> Vec<EntitySeries> {
    let mut by_key: BTreeMap<&EntityKey, Vec<(Month, u64)>> = BTreeMap::new();
    for aggregate in aggregates {
        by_key
            .entry(&aggregate.key)
            .or_default()
            .push((aggregate.month, aggregate.offence_count));
    }

    by_key
        .into_iter()
        .map(|(key, mut points)| {
            points.sort_by_key(|(month, _)| *month);
            EntitySeries {
                key: key.clone(),
                points,
            }
        })
        .collect()
}

/// Builds one panel row per aggregate.
///
/// Rows near the start of a series carry `None` lags; nothing is dropped
/// here. The output is ordered by entity key then month.
#[must_use]
pub fn build_panel(aggregates: &[MonthlyAggregate], config: &PanelConfig) -> Vec<PanelRow> {
    let series = partition_by_entity(aggregates);
    let mut rows = Vec::with_capacity(aggregates.len());
    for s in &series {
        rows.extend(series_rows(s, config));
    }
    log::debug!(
        "Built {} panel row(s) across {} series",
        rows.len(),
        series.len()
    );
    rows
}

fn series_rows<'a>(
    series: &'a EntitySeries,
    config: &'a PanelConfig,
) -> impl Iterator<Item = PanelRow> + 'a {
    series
        .points
        .iter()
        .enumerate()
        .map(move |(i, &(month, offence_count))| {
            let lags: Vec<Option<u64>> = (1..=config.lag_depth)
                .map(|k| i.checked_sub(k).map(|j| series.points[j].1))
                .collect();
            let window = &lags[..config.stats_window.min(lags.len())];
            PanelRow {
                key: series.key.clone(),
                month,
                offence_count,
                avg_lag: window_mean(window),
                std_lag: window_std(window),
                lags,
            }
        })
}

/// Arithmetic mean of the window, or `None` if any value is undefined or
/// the window is empty.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn window_mean(window: &[Option<u64>]) -> Option<f64> {
    if window.is_empty() {
        return None;
    }
    let mut sum = 0.0;
    for value in window {
        sum += (*value)? as f64;
    }
    Some(sum / window.len() as f64)
}

/// Sample standard deviation (divisor `n - 1`) of the window, or `None` if
/// any value is undefined or fewer than two values are present.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn window_std(window: &[Option<u64>]) -> Option<f64> {
    if window.len() < 2 {
        return None;
    }
    let mean = window_mean(window)?;
    let sum_sq: f64 = window
        .iter()
        .flatten()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum();
    Some((sum_sq / (window.len() - 1) as f64).sqrt())
}
