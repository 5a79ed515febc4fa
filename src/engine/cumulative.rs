//! Stage 4: cumulative rows.
//!
//! Walks the summary-augmented table keeping a running total per numeric
//! column, and inserts a "Cumulative" row right after each summary row.
//! Only data rows feed the running totals; the totals at each summary
//! therefore already include that month's contribution.

use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::model::{CellValue, ReportRow, ReportTable, RowKind};

/// Insert one running-total row after each summary row.
pub fn insert_cumulative_rows(mut table: ReportTable) -> ReportTable {
    let numeric = table.numeric_column_names();
    let mut totals: HashMap<&str, Decimal> =
        numeric.iter().map(|name| (name.as_str(), Decimal::ZERO)).collect();

    let mut i = 0;
    while i < table.rows.len() {
        if table.rows[i].kind.week_number().is_some() {
            for name in &numeric {
                if let Some(value) = table.rows[i].number(name) {
                    if let Some(total) = totals.get_mut(name.as_str()) {
                        *total += value;
                    }
                }
            }
        } else if matches!(table.rows[i].kind, RowKind::Summary(_)) {
            let mut cumulative = ReportRow::new(RowKind::Cumulative);
            for name in &numeric {
                cumulative.set(name.clone(), CellValue::Number(totals[name.as_str()]));
            }
            table.rows.insert(i + 1, cumulative);
            // Step past the inserted row so it is not reprocessed.
            i += 1;
        }
        // Label-keyed rows pass through untouched.
        i += 1;
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::monthly::insert_summary_rows;
    use crate::engine::normalize::{normalize_columns, TARGET};
    use crate::engine::weeks::assign_dates;
    use crate::model::{MonthWeeks, RawSalesTable, RawWeekRow, WeekKey};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::collections::BTreeMap;

    fn summarized_table(rows: Vec<(u32, i64)>, mapping: &[MonthWeeks]) -> ReportTable {
        let raw_rows = rows
            .into_iter()
            .map(|(week, target)| RawWeekRow {
                week: WeekKey::Number(week),
                target: Some(Decimal::from(target)),
                sales_by_year: BTreeMap::new(),
            })
            .collect();
        let table = normalize_columns(RawSalesTable {
            has_target: true,
            years: vec![],
            rows: raw_rows,
        });
        let table = assign_dates(table, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        insert_summary_rows(table, mapping)
    }

    #[test]
    fn test_cumulative_follows_each_summary() {
        let mapping = vec![
            MonthWeeks::new("January", vec![1, 2]),
            MonthWeeks::new("February", vec![3]),
        ];
        let table = summarized_table(vec![(1, 40), (2, 60), (3, 150)], &mapping);
        let table = insert_cumulative_rows(table);

        let labels: Vec<_> = table.rows.iter().map(|r| r.kind.week_label()).collect();
        assert_eq!(
            labels,
            vec!["1", "2", "January", "Cumulative", "3", "February", "Cumulative"]
        );
    }

    #[test]
    fn test_second_cumulative_carries_the_full_running_total() {
        let mapping = vec![
            MonthWeeks::new("January", vec![1, 2]),
            MonthWeeks::new("February", vec![3]),
        ];
        let table = summarized_table(vec![(1, 40), (2, 60), (3, 150)], &mapping);
        let table = insert_cumulative_rows(table);

        // First cumulative: 100. Second: 250, not just February's 150.
        assert_eq!(table.rows[3].number(TARGET), Some(Decimal::from(100)));
        assert_eq!(table.rows[6].number(TARGET), Some(Decimal::from(250)));
    }

    #[test]
    fn test_cumulative_row_has_no_date() {
        let mapping = vec![MonthWeeks::new("January", vec![1])];
        let table = summarized_table(vec![(1, 40)], &mapping);
        let table = insert_cumulative_rows(table);

        assert_eq!(table.rows[2].kind, RowKind::Cumulative);
        assert!(table.rows[2].get("Date").is_null());
    }

    #[test]
    fn test_no_summaries_no_cumulative_rows() {
        let table = summarized_table(vec![(1, 40), (2, 60)], &[]);
        let table = insert_cumulative_rows(table);

        assert_eq!(table.rows.len(), 2);
        assert!(!table.rows.iter().any(|r| r.kind == RowKind::Cumulative));
    }

    #[test]
    fn test_summary_values_do_not_feed_totals() {
        // Totals come from data rows only; the summary row's own values
        // must not be double-added.
        let mapping = vec![MonthWeeks::new("January", vec![1, 2])];
        let table = summarized_table(vec![(1, 10), (2, 20)], &mapping);
        let table = insert_cumulative_rows(table);

        assert_eq!(table.rows[3].number(TARGET), Some(Decimal::from(30)));
    }
}
