//! Descriptive summaries over the unified record set.
//!
//! Every ranking breaks ties by label ascending. A record missing the
//! field a summary groups by is left out of that summary only.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use crime_panel_analytics_models::{
    CategoryShare, HEATMAP_SUBURBS, HeatmapCell, MonthlyTotal, RankedCount, Summaries,
    SuburbHeatmap, TOP_N,
};
use crime_panel_crime_models::{Month, OffenceLevel};
use crime_panel_source_models::IncidentRecord;

/// Sums offence counts per label. Missing counts contribute 0.
fn sum_by<'a, F>(records: &'a [IncidentRecord], label: F) -> BTreeMap<&'a str, u64>
where
    F: Fn(&'a IncidentRecord) -> Option<&'a str>,
{
    let mut sums = BTreeMap::new();
    for record in records {
        if let Some(key) = label(record) {
            let sum: &mut u64 = sums.entry(key).or_insert(0);
            *sum = sum.saturating_add(record.offence_count.unwrap_or(0));
        }
    }
    sums
}

/// Orders `(label, count)` pairs by count descending, then label ascending,
/// and keeps the first `limit`.
fn rank(sums: BTreeMap<&str, u64>, limit: usize) -> Vec<RankedCount> {
    let mut ranked: Vec<(&str, u64)> = sums.into_iter().collect();
    // BTreeMap iteration is label-ordered and the sort is stable.
    ranked.sort_by_key(|&(_, count)| Reverse(count));
    ranked
        .into_iter()
        .take(limit)
        .map(|(label, offence_count)| RankedCount {
            label: label.to_string(),
            offence_count,
        })
        .collect()
}

/// Offence count per month, ascending. Undated records are skipped.
#[must_use]
pub fn monthly_trend(records: &[IncidentRecord]) -> Vec<MonthlyTotal> {
    let mut totals: BTreeMap<Month, u64> = BTreeMap::new();
    for record in records {
        if let Some(month) = record.month() {
            let total = totals.entry(month).or_insert(0);
            *total = total.saturating_add(record.offence_count.unwrap_or(0));
        }
    }
    totals
        .into_iter()
        .map(|(month, offence_count)| MonthlyTotal {
            month,
            offence_count,
        })
        .collect()
}

/// The `limit` categories of `level` with the highest summed offence count.
#[must_use]
pub fn top_by_level(
    records: &[IncidentRecord],
    level: OffenceLevel,
    limit: usize,
) -> Vec<RankedCount> {
    rank(sum_by(records, |r| r.offence_level(level)), limit)
}

/// The `limit` suburbs with the highest summed offence count.
#[must_use]
pub fn top_suburbs(records: &[IncidentRecord], limit: usize) -> Vec<RankedCount> {
    rank(sum_by(records, |r| r.suburb.as_deref()), limit)
}

/// Suburb by offence level 1 pivot of summed counts for the `suburbs`
/// busiest suburbs.
///
/// Columns are every level 1 category that occurs among those suburbs'
/// records. Pairs that never occur are filled with 0.
#[must_use]
pub fn suburb_heatmap(records: &[IncidentRecord], suburbs: usize) -> SuburbHeatmap {
    let rows: Vec<String> = top_suburbs(records, suburbs)
        .into_iter()
        .map(|r| r.label)
        .collect();
    let row_set: BTreeSet<&str> = rows.iter().map(String::as_str).collect();

    let mut pivot: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    let mut categories: BTreeSet<&str> = BTreeSet::new();
    for record in records {
        let (Some(suburb), Some(category)) = (
            record.suburb.as_deref(),
            record.offence_level(OffenceLevel::Broad),
        ) else {
            continue;
        };
        if !row_set.contains(suburb) {
            continue;
        }
        categories.insert(category);
        let sum = pivot.entry((suburb, category)).or_insert(0);
        *sum = sum.saturating_add(record.offence_count.unwrap_or(0));
    }

    let mut cells = Vec::with_capacity(rows.len() * categories.len());
    for suburb in &rows {
        for &category in &categories {
            let offence_count = pivot
                .get(&(suburb.as_str(), category))
                .copied()
                .unwrap_or(0);
            cells.push(HeatmapCell {
                suburb: suburb.clone(),
                offence_level_1: category.to_string(),
                offence_count,
                log_count: log_count(offence_count),
            });
        }
    }

    SuburbHeatmap {
        suburbs: rows,
        categories: categories.into_iter().map(str::to_string).collect(),
        cells,
    }
}

#[allow(clippy::cast_precision_loss)]
fn log_count(value: u64) -> f64 {
    (value as f64).ln_1p()
}

/// Number of records per category of `level`, with percentage share,
/// most frequent first.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn level_distribution(records: &[IncidentRecord], level: OffenceLevel) -> Vec<CategoryShare> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for category in records.iter().filter_map(|r| r.offence_level(level)) {
        *counts.entry(category).or_insert(0) += 1;
    }
    let total: u64 = counts.values().sum();

    rank(counts, usize::MAX)
        .into_iter()
        .map(|entry| CategoryShare {
            percent: entry.offence_count as f64 * 100.0 / total as f64,
            records: entry.offence_count,
            label: entry.label,
        })
        .collect()
}

/// Computes every summary with the default limits.
#[must_use]
pub fn summarize(records: &[IncidentRecord]) -> Summaries {
    Summaries {
        monthly_trend: monthly_trend(records),
        top_offence_types: top_by_level(records, OffenceLevel::Broad, TOP_N),
        top_suburbs: top_suburbs(records, TOP_N),
        suburb_heatmap: suburb_heatmap(records, HEATMAP_SUBURBS),
        level1_distribution: level_distribution(records, OffenceLevel::Broad),
        top_offence_level2: top_by_level(records, OffenceLevel::Medium, TOP_N),
    }
}
