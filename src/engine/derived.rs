//! Stage 5: derived columns.
//!
//! Adds the Current-minus-Target difference column and, for every
//! adjacent pair of sales columns from newest to oldest, a year-over-year
//! percentage-change column. A percentage cell is null whenever either
//! operand is missing or the denominator is zero.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::engine::normalize::{CURRENT, TARGET};
use crate::model::{CellValue, Column, ColumnRole, ReportTable};

/// Display name of the difference column.
pub const DIFFERENCE: &str = "Difference";

/// Add the difference and percentage columns.
pub fn add_derived_columns(mut table: ReportTable) -> ReportTable {
    if table.has_column(CURRENT) && table.has_column(TARGET) {
        table.push_column(Column::new(DIFFERENCE, ColumnRole::Difference));
        for row in &mut table.rows {
            let value = match (row.number(CURRENT), row.number(TARGET)) {
                (Some(current), Some(target)) => CellValue::Number(current - target),
                _ => CellValue::Null,
            };
            row.set(DIFFERENCE, value);
        }
    }

    for window in sales_columns(&table).windows(2) {
        let (left_name, left_year) = window[0].clone();
        let (right_name, right_year) = window[1].clone();
        let pct_name = percentage_column_name(left_year, right_year);
        table.push_column(Column::new(
            pct_name.as_str(),
            ColumnRole::YearOverYear {
                newer: left_year,
                older: right_year,
            },
        ));

        for row in &mut table.rows {
            let value = match (row.number(&left_name), row.number(&right_name)) {
                (Some(left), Some(right)) if right != Decimal::ZERO => {
                    let pct = (left - right) / right * Decimal::from(100);
                    CellValue::Number(
                        pct.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
                    )
                }
                _ => CellValue::Null,
            };
            row.set(pct_name.as_str(), value);
        }
    }

    table
}

/// Name of the percentage column comparing two years.
pub fn percentage_column_name(newer: i32, older: i32) -> String {
    format!("{} vs {}", newer, older)
}

/// Sales columns ordered Current first, then remaining years descending.
///
/// Returns `(display name, calendar year)` pairs; the Current entry
/// resolves its year through the column role.
pub fn sales_columns(table: &ReportTable) -> Vec<(String, i32)> {
    let mut ordered: Vec<(String, i32)> = Vec::new();
    if let Some(year) = table.current_year() {
        ordered.push((CURRENT.to_string(), year));
    }
    let mut rest: Vec<(String, i32)> = table
        .columns
        .iter()
        .filter_map(|c| match c.role {
            ColumnRole::SalesYear { year } => Some((c.name.clone(), year)),
            _ => None,
        })
        .collect();
    rest.sort_by(|a, b| b.1.cmp(&a.1));
    ordered.extend(rest);
    ordered
}
