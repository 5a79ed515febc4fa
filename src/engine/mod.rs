//! The report transformation engine.
//!
//! Single-pass pipeline over one in-memory table snapshot:
//!
//! ```text
//! raw rows ──▶ normalize ──▶ weeks ──▶ monthly ──▶ cumulative ──▶ derived ──▶ layout
//! ```
//!
//! Each stage is a pure function from table to table; no stage reads
//! ahead, performs I/O, or shares state. The engine is synchronous and
//! safe to invoke concurrently with independently-owned inputs.

pub mod cumulative;
pub mod derived;
pub mod layout;
pub mod monthly;
pub mod normalize;
pub mod weeks;

use chrono::NaiveDate;

use crate::model::{MonthWeeks, RawSalesTable, ReportTable};

pub use cumulative::insert_cumulative_rows;
pub use derived::add_derived_columns;
pub use layout::finalize_layout;
pub use monthly::insert_summary_rows;
pub use normalize::normalize_columns;
pub use weeks::assign_dates;

/// Run the full pipeline on one raw extract.
///
/// `mapping` is consumed in the given order; the config provider is
/// responsible for handing it over in calendar month order.
pub fn build_report(
    raw: RawSalesTable,
    start_date: NaiveDate,
    mapping: &[MonthWeeks],
) -> ReportTable {
    let table = normalize_columns(raw);
    let table = assign_dates(table, start_date);
    let table = insert_summary_rows(table, mapping);
    let table = insert_cumulative_rows(table);
    let table = add_derived_columns(table);
    finalize_layout(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RawWeekRow, RowKind, WeekKey};
    use rust_decimal::Decimal;
    use std::collections::BTreeMap;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    /// A full year of weekly rows with two historical sales columns.
    fn year_of_rows() -> RawSalesTable {
        let rows = (1..=52)
            .map(|week| RawWeekRow {
                week: WeekKey::Number(week),
                target: Some(Decimal::from(1000)),
                sales_by_year: BTreeMap::from([
                    (2023, Some(Decimal::from(100))),
                    (2024, Some(Decimal::from(120))),
                ]),
            })
            .collect();
        RawSalesTable {
            has_target: true,
            years: vec![2023, 2024],
            rows,
        }
    }

    #[test]
    fn test_end_to_end_column_order() {
        let mapping = vec![MonthWeeks::new("January", vec![1, 2, 3, 4, 5])];
        let table = build_report(
            year_of_rows(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            &mapping,
        );

        let names: Vec<_> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Week", "Date", "Target", "Current", "Difference", "2024 vs 2023", "2023"]
        );
    }

    #[test]
    fn test_end_to_end_summary_and_cumulative_placement() {
        let mapping = vec![MonthWeeks::new("January", vec![1, 2, 3, 4, 5])];
        let table = build_report(
            year_of_rows(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            &mapping,
        );

        // 52 data rows + summary + cumulative.
        assert_eq!(table.rows.len(), 54);
        assert_eq!(table.rows[4].kind.week_number(), Some(5));
        assert_eq!(table.rows[5].kind, RowKind::Summary("January".into()));
        assert_eq!(table.rows[6].kind, RowKind::Cumulative);
        assert_eq!(table.rows[7].kind.week_number(), Some(6));

        // January sums five weeks of everything.
        assert_eq!(table.rows[5].number("Target"), Some(Decimal::from(5000)));
        assert_eq!(table.rows[5].number("Current"), Some(Decimal::from(600)));
        assert_eq!(table.rows[5].number("2023"), Some(Decimal::from(500)));
        assert_eq!(table.rows[6].number("Target"), Some(Decimal::from(5000)));
    }

    #[test]
    fn test_end_to_end_derived_values() {
        let mapping = vec![MonthWeeks::new("January", vec![1, 2, 3, 4, 5])];
        let table = build_report(
            year_of_rows(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            &mapping,
        );

        // Per data row: difference 120 - 1000, change (120-100)/100.
        assert_eq!(table.rows[0].number("Difference"), Some(dec("-880")));
        assert_eq!(table.rows[0].number("2024 vs 2023"), Some(dec("20.00")));

        // Rollup rows get derived values over their totals too.
        assert_eq!(table.rows[5].number("Difference"), Some(dec("-4400")));
        assert_eq!(table.rows[5].number("2024 vs 2023"), Some(dec("20.00")));
    }

    #[test]
    fn test_empty_extract_builds_empty_table() {
        let table = build_report(
            RawSalesTable::empty(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            &[MonthWeeks::new("January", vec![1])],
        );

        assert!(table.rows.is_empty());
        let names: Vec<_> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Week", "Date"]);
    }

    #[test]
    fn test_data_rows_keep_ascending_week_order() {
        let mut raw = year_of_rows();
        raw.rows.reverse();
        let mapping = vec![MonthWeeks::new("January", vec![1, 2, 3, 4, 5])];
        let table = build_report(
            raw,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            &mapping,
        );

        let weeks: Vec<u32> = table
            .rows
            .iter()
            .filter_map(|r| r.kind.week_number())
            .collect();
        let mut sorted = weeks.clone();
        sorted.sort_unstable();
        assert_eq!(weeks, sorted);
    }
}
