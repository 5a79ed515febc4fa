//! Stage 1: column normalization.
//!
//! Builds the initial [`ReportTable`] from the raw extract. Year columns
//! take their bare year as the display name; the most recent year is
//! relabeled "Current", with the underlying year kept on the column role
//! so later stages can still resolve it.

use crate::model::{
    CellValue, Column, ColumnRole, RawSalesTable, ReportRow, ReportTable, RowKind,
};

/// Display name of the relabeled most-recent year column.
pub const CURRENT: &str = "Current";

/// Display name of the target column.
pub const TARGET: &str = "Target";

/// Build the normalized table from a raw sales extract.
///
/// With zero year columns no column becomes "Current" and the
/// Current-dependent stages downstream skip their work.
pub fn normalize_columns(raw: RawSalesTable) -> ReportTable {
    let mut table = ReportTable::new();
    table.push_column(Column::new("Week", ColumnRole::Week));
    if raw.has_target {
        table.push_column(Column::new(TARGET, ColumnRole::Target));
    }

    let latest = raw.years.iter().copied().max();
    for &year in &raw.years {
        let column = if Some(year) == latest {
            Column::new(CURRENT, ColumnRole::Current { year })
        } else {
            Column::new(year.to_string(), ColumnRole::SalesYear { year })
        };
        table.push_column(column);
    }

    for raw_row in raw.rows {
        let mut row = ReportRow::new(RowKind::Week(raw_row.week));
        if raw.has_target {
            row.set(TARGET, CellValue::from_opt(raw_row.target));
        }
        for &year in &raw.years {
            let value = raw_row.sales_by_year.get(&year).copied().flatten();
            let name = if Some(year) == latest {
                CURRENT.to_string()
            } else {
                year.to_string()
            };
            row.set(name, CellValue::from_opt(value));
        }
        table.rows.push(row);
    }

    table
}
