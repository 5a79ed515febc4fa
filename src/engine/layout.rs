//! Stage 6: final layout.
//!
//! Projects columns into the display order and attaches a format tag to
//! every numeric column. Running the planner again on its own output
//! changes nothing.

use crate::engine::derived::{percentage_column_name, sales_columns, DIFFERENCE};
use crate::engine::normalize::{CURRENT, TARGET};
use crate::engine::weeks::DATE;
use crate::model::{CellFormat, ReportTable};

/// Reorder columns and tag numeric ones for display.
///
/// Order: Week, Date, Target, Current, Difference, then for each older
/// sales column its percentage column followed by the sales column
/// itself. Columns not present are skipped; columns outside the plan keep
/// their relative order at the end.
pub fn finalize_layout(mut table: ReportTable) -> ReportTable {
    let mut plan: Vec<String> = vec![
        "Week".to_string(),
        DATE.to_string(),
        TARGET.to_string(),
        CURRENT.to_string(),
        DIFFERENCE.to_string(),
    ];
    for window in sales_columns(&table).windows(2) {
        plan.push(percentage_column_name(window[0].1, window[1].1));
        plan.push(window[1].0.clone());
    }

    let mut ordered = Vec::with_capacity(table.columns.len());
    for name in &plan {
        if let Some(idx) = table.columns.iter().position(|c| &c.name == name) {
            ordered.push(table.columns.remove(idx));
        }
    }
    // Anything the plan does not mention trails in its existing order.
    ordered.append(&mut table.columns);
    table.columns = ordered;

    for column in &mut table.columns {
        column.format = if column.role.is_numeric() {
            if column.name.contains("vs") {
                Some(CellFormat::Percentage)
            } else {
                Some(CellFormat::Currency)
            }
        } else {
            None
        };
    }

    table
}
