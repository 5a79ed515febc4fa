//! Stage 2: week ordering and date assignment.
//!
//! Sorts rows ascending by week number, inserts the Date column right
//! after Week, and dates each row from the report start date at seven-day
//! steps by its post-sort position. Dates must be assigned before any
//! summary or cumulative row is inserted, so the position numbering never
//! shifts.

use chrono::{Duration, NaiveDate};

use crate::model::{CellValue, Column, ColumnRole, ReportTable};

/// Display name of the date column.
pub const DATE: &str = "Date";

/// Sort rows and attach per-row dates.
///
/// Label-keyed rows never carry a week number; they sort after all
/// numeric weeks, keeping their relative order, and are dated by position
/// like any other pre-insertion row.
pub fn assign_dates(mut table: ReportTable, start_date: NaiveDate) -> ReportTable {
    table.rows.sort_by_key(|row| match row.kind.week_number() {
        Some(n) => (0u8, n),
        None => (1u8, 0),
    });

    table.insert_column_after("Week", Column::new(DATE, ColumnRole::Date));

    for (i, row) in table.rows.iter_mut().enumerate() {
        let date = start_date + Duration::days(7 * i as i64);
        row.set(DATE, CellValue::Date(date));
    }

    table
}
