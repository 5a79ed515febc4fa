//! Stage 3: monthly summary rows.
//!
//! For each configured month, sums every numeric column over the rows
//! whose week number belongs to that month and inserts a labeled summary
//! row right after the last contributing row. Sums are computed for all
//! months before any row is inserted, and insertions run at descending
//! indices so earlier ones never shift later insertion points.

use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::model::{CellValue, MonthWeeks, ReportRow, ReportTable, RowKind};

/// Insert one summary row per month that matched at least one data row.
///
/// Null cells count as zero. Months with no matching rows are skipped
/// silently. Weeks appearing in more than one month double-count; the
/// mapping provider owns disjointness.
pub fn insert_summary_rows(mut table: ReportTable, mapping: &[MonthWeeks]) -> ReportTable {
    let numeric = table.numeric_column_names();

    // Phase one: compute every month's sums and insertion point.
    let mut pending: Vec<(usize, ReportRow)> = Vec::new();
    for month_weeks in mapping {
        let mut sums: HashMap<&str, Decimal> =
            numeric.iter().map(|name| (name.as_str(), Decimal::ZERO)).collect();
        let mut last_match: Option<usize> = None;

        for (idx, row) in table.rows.iter().enumerate() {
            let Some(week) = row.kind.week_number() else {
                continue;
            };
            if !month_weeks.weeks.contains(&week) {
                continue;
            }
            last_match = Some(idx);
            for name in &numeric {
                let value = row.number(name).unwrap_or(Decimal::ZERO);
                if let Some(sum) = sums.get_mut(name.as_str()) {
                    *sum += value;
                }
            }
        }

        if let Some(insert_after) = last_match {
            let mut summary = ReportRow::new(RowKind::Summary(month_weeks.month.clone()));
            for name in &numeric {
                summary.set(name.clone(), CellValue::Number(sums[name.as_str()]));
            }
            pending.push((insert_after, summary));
        }
    }

    // Phase two: insert at descending index order.
    pending.sort_by(|a, b| b.0.cmp(&a.0));
    for (insert_after, summary) in pending {
        table.rows.insert(insert_after + 1, summary);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::normalize::{normalize_columns, TARGET};
    use crate::engine::weeks::assign_dates;
    use crate::model::{RawSalesTable, RawWeekRow, WeekKey};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::collections::BTreeMap;

    fn base_table(rows: Vec<(u32, Option<i64>)>) -> ReportTable {
        let raw_rows = rows
            .into_iter()
            .map(|(week, target)| RawWeekRow {
                week: WeekKey::Number(week),
                target: target.map(Decimal::from),
                sales_by_year: BTreeMap::new(),
            })
            .collect();
        let table = normalize_columns(RawSalesTable {
            has_target: true,
            years: vec![],
            rows: raw_rows,
        });
        assign_dates(table, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    }

    #[test]
    fn test_summary_inserted_after_last_contributing_row() {
        let table = base_table(vec![(1, Some(10)), (2, Some(20)), (3, Some(30)), (4, Some(40))]);
        let mapping = vec![MonthWeeks::new("January", vec![1, 2, 3, 4])];
        let table = insert_summary_rows(table, &mapping);

        assert_eq!(table.rows.len(), 5);
        assert_eq!(table.rows[4].kind, RowKind::Summary("January".into()));
        assert_eq!(table.rows[4].number(TARGET), Some(Decimal::from(100)));
    }

    #[test]
    fn test_summary_not_at_table_end_when_later_weeks_exist() {
        let table = base_table(vec![(1, Some(10)), (2, Some(20)), (5, Some(50))]);
        let mapping = vec![MonthWeeks::new("January", vec![1, 2])];
        let table = insert_summary_rows(table, &mapping);

        // After week 2, before week 5.
        assert_eq!(table.rows[2].kind, RowKind::Summary("January".into()));
        assert_eq!(table.rows[3].kind.week_number(), Some(5));
    }

    #[test]
    fn test_summary_row_has_no_date() {
        let table = base_table(vec![(1, Some(10))]);
        let mapping = vec![MonthWeeks::new("January", vec![1])];
        let table = insert_summary_rows(table, &mapping);

        assert!(table.rows[1].get("Date").is_null());
    }

    #[test]
    fn test_empty_month_skipped_silently() {
        let table = base_table(vec![(1, Some(10))]);
        let mapping = vec![
            MonthWeeks::new("January", vec![1]),
            MonthWeeks::new("February", vec![5, 6]),
        ];
        let table = insert_summary_rows(table, &mapping);

        assert_eq!(table.rows.len(), 2);
        assert!(!table
            .rows
            .iter()
            .any(|r| r.kind == RowKind::Summary("February".into())));
    }

    #[test]
    fn test_null_cells_count_as_zero() {
        let table = base_table(vec![(1, Some(10)), (2, None)]);
        let mapping = vec![MonthWeeks::new("January", vec![1, 2])];
        let table = insert_summary_rows(table, &mapping);

        assert_eq!(table.rows[2].number(TARGET), Some(Decimal::from(10)));
    }

    #[test]
    fn test_two_months_insert_without_shifting() {
        let table = base_table(vec![(1, Some(1)), (2, Some(2)), (3, Some(3)), (4, Some(4))]);
        let mapping = vec![
            MonthWeeks::new("January", vec![1, 2]),
            MonthWeeks::new("February", vec![3, 4]),
        ];
        let table = insert_summary_rows(table, &mapping);

        let labels: Vec<_> = table.rows.iter().map(|r| r.kind.week_label()).collect();
        assert_eq!(labels, vec!["1", "2", "January", "3", "4", "February"]);
    }

    #[test]
    fn test_overlapping_weeks_double_count() {
        // Documented edge case: week 2 belongs to both months.
        let table = base_table(vec![(1, Some(10)), (2, Some(20))]);
        let mapping = vec![
            MonthWeeks::new("January", vec![1, 2]),
            MonthWeeks::new("February", vec![2]),
        ];
        let table = insert_summary_rows(table, &mapping);

        let january = table
            .rows
            .iter()
            .find(|r| r.kind == RowKind::Summary("January".into()))
            .unwrap();
        let february = table
            .rows
            .iter()
            .find(|r| r.kind == RowKind::Summary("February".into()))
            .unwrap();
        assert_eq!(january.number(TARGET), Some(Decimal::from(30)));
        assert_eq!(february.number(TARGET), Some(Decimal::from(20)));
    }
}
