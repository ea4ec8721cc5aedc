//! Aggregator: incident records into monthly counts per entity key.

use std::collections::BTreeMap;

use crime_panel_crime_models::{EntityKey, Month};
use crime_panel_panel_models::MonthlyAggregate;
use crime_panel_source_models::IncidentRecord;

/// Result of [`aggregate_monthly`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    /// One row per populated `(entity key, month)`, ordered by key then
    /// month.
    pub aggregates: Vec<MonthlyAggregate>,
    /// Records skipped because they have no month.
    pub records_missing_month: u64,
    /// Dated records skipped because a key component is blank.
    pub records_without_key: u64,
}

/// Sums offence counts per `(suburb, offence level 1, offence level 2,
/// month)`.
///
/// Records without a month or with a blank key component take no part in
/// any group. A missing offence count contributes nothing to its group's
/// sum. Months with no incidents are not synthesized.
#[must_use]
pub fn aggregate_monthly(records: &[IncidentRecord]) -> Aggregation {
    let mut groups: BTreeMap<(EntityKey, Month), u64> = BTreeMap::new();
    let mut records_missing_month = 0_u64;
    let mut records_without_key = 0_u64;

    for record in records {
        let Some(month) = record.month() else {
            records_missing_month += 1;
            continue;
        };
        let Some(key) = record.entity_key() else {
            records_without_key += 1;
            continue;
        };
        let sum = groups.entry((key, month)).or_insert(0);
        *sum = sum.saturating_add(record.offence_count.unwrap_or(0));
    }

    let aggregates: Vec<MonthlyAggregate> = groups
        .into_iter()
        .map(|((key, month), offence_count)| MonthlyAggregate {
            key,
            month,
            offence_count,
        })
        .collect();

    log::debug!(
        "Aggregated {} record(s) into {} monthly row(s) ({records_missing_month} undated, {records_without_key} without key)",
        records.len(),
        aggregates.len()
    );

    Aggregation {
        aggregates,
        records_missing_month,
        records_without_key,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn record(
        suburb: &str,
        l1: &str,
        l2: &str,
        date: Option<(i32, u32, u32)>,
        count: Option<u64>,
    ) -> IncidentRecord {
        IncidentRecord {
            period: "p".to_string(),
            reported_at: date.map(|(y, m, d)| {
                NaiveDate::from_ymd_opt(y, m, d)
                    .unwrap()
                    .and_hms_opt(9, 0, 0)
                    .unwrap()
            }),
            suburb: (!suburb.is_empty()).then(|| suburb.to_string()),
            offence_level_1: Some(l1.to_string()),
            offence_level_2: Some(l2.to_string()),
            offence_level_3: Some("fine".to_string()),
            offence_count: count,
        }
    }

    fn month(y: i32, m: u32) -> Month {
        Month::new(y, m).unwrap()
    }

    #[test]
    fn sums_counts_per_key_and_month() {
        let records = vec![
            record("Smithville", "Theft", "Shoplifting", Some((2023, 1, 3)), Some(2)),
            record("Smithville", "Theft", "Shoplifting", Some((2023, 1, 28)), Some(3)),
            record("Smithville", "Theft", "Shoplifting", Some((2023, 2, 1)), Some(1)),
            record("Smithville", "Theft", "Vehicle", Some((2023, 1, 5)), Some(4)),
        ];
        let agg = aggregate_monthly(&records);
        assert_eq!(agg.aggregates.len(), 3);

        let shoplifting = EntityKey::new("Smithville", "Theft", "Shoplifting");
        assert_eq!(agg.aggregates[0].key, shoplifting);
        assert_eq!(agg.aggregates[0].month, month(2023, 1));
        assert_eq!(agg.aggregates[0].offence_count, 5);
        assert_eq!(agg.aggregates[1].month, month(2023, 2));
        assert_eq!(agg.aggregates[1].offence_count, 1);
        assert_eq!(agg.aggregates[2].key.offence_level_2, "Vehicle");
        assert_eq!(agg.aggregates[2].offence_count, 4);
    }

    #[test]
    fn level_three_does_not_split_groups() {
        let mut a = record("X", "A", "B", Some((2023, 5, 1)), Some(1));
        let mut b = record("X", "A", "B", Some((2023, 5, 2)), Some(1));
        a.offence_level_3 = Some("one".to_string());
        b.offence_level_3 = Some("two".to_string());
        let agg = aggregate_monthly(&[a, b]);
        assert_eq!(agg.aggregates.len(), 1);
        assert_eq!(agg.aggregates[0].offence_count, 2);
    }

    #[test]
    fn output_is_ordered_by_key_then_month_regardless_of_input_order() {
        let records = vec![
            record("Zeta", "A", "B", Some((2023, 1, 1)), Some(1)),
            record("Alpha", "A", "B", Some((2023, 3, 1)), Some(1)),
            record("Alpha", "A", "B", Some((2022, 12, 1)), Some(1)),
        ];
        let agg = aggregate_monthly(&records);
        let order: Vec<(String, Month)> = agg
            .aggregates
            .iter()
            .map(|a| (a.key.suburb.clone(), a.month))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Alpha".to_string(), month(2022, 12)),
                ("Alpha".to_string(), month(2023, 3)),
                ("Zeta".to_string(), month(2023, 1)),
            ]
        );
    }

    #[test]
    fn undated_and_keyless_records_are_excluded() {
        let records = vec![
            record("X", "A", "B", None, Some(10)),
            record("", "A", "B", Some((2023, 1, 1)), Some(10)),
            record("X", "A", "B", Some((2023, 1, 1)), Some(1)),
        ];
        let agg = aggregate_monthly(&records);
        assert_eq!(agg.aggregates.len(), 1);
        assert_eq!(agg.aggregates[0].offence_count, 1);
        assert_eq!(agg.records_missing_month, 1);
        assert_eq!(agg.records_without_key, 1);
    }

    #[test]
    fn missing_counts_contribute_zero() {
        let records = vec![
            record("X", "A", "B", Some((2023, 1, 1)), None),
            record("X", "A", "B", Some((2023, 1, 2)), Some(3)),
            record("Y", "A", "B", Some((2023, 1, 2)), None),
        ];
        let agg = aggregate_monthly(&records);
        assert_eq!(agg.aggregates.len(), 2);
        assert_eq!(agg.aggregates[0].offence_count, 3);
        assert_eq!(agg.aggregates[1].offence_count, 0);
    }

    #[test]
    fn empty_input_yields_empty_table() {
        assert_eq!(aggregate_monthly(&[]), Aggregation::default());
    }
}
