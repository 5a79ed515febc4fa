//! Presentation boundary: flatten a finished [`ReportTable`] into
//! display strings and write console, CSV, or JSON output.
//!
//! All formatting policy lives here, driven by the per-column tags the
//! layout planner attached: currency cells display as a pound-prefixed
//! integer, percentage cells as a two-decimal value with a `%` suffix.
//! Row highlighting and color-coding beyond that are the grid's concern,
//! which is why row kinds travel alongside the JSON payload instead of
//! being rendered.

use rust_decimal::RoundingStrategy;
use std::io::Write;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::model::{CellFormat, CellValue, ColumnRole, ReportTable};

/// Format one cell for display.
pub fn format_cell(value: &CellValue, format: Option<CellFormat>) -> String {
    match value {
        CellValue::Null => String::new(),
        CellValue::Text(text) => text.clone(),
        CellValue::Date(date) => date.format("%Y-%m-%d").to_string(),
        CellValue::Number(number) => match format {
            Some(CellFormat::Currency) => format!(
                "£{}",
                number.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            ),
            Some(CellFormat::Percentage) => {
                let mut rounded =
                    number.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
                rounded.rescale(2);
                format!("{}%", rounded)
            }
            None => number.to_string(),
        },
    }
}

/// Column header names in display order.
pub fn display_headers(table: &ReportTable) -> Vec<String> {
    table.columns.iter().map(|c| c.name.clone()).collect()
}

/// All rows flattened to display strings, in display order.
///
/// The Week cell comes from the row tag, which is where summary and
/// cumulative rows carry their labels.
pub fn display_rows(table: &ReportTable) -> Vec<Vec<String>> {
    table
        .rows
        .iter()
        .map(|row| {
            table
                .columns
                .iter()
                .map(|column| match column.role {
                    ColumnRole::Week => row.kind.week_label(),
                    _ => format_cell(row.get(&column.name), column.format),
                })
                .collect()
        })
        .collect()
}

/// Render the table for the console.
pub fn render_console(table: &ReportTable) -> String {
    if table.rows.is_empty() {
        return "(no rows)".to_string();
    }
    let mut builder = Builder::default();
    builder.push_record(display_headers(table));
    for row in display_rows(table) {
        builder.push_record(row);
    }
    builder.build().with(Style::markdown()).to_string()
}

/// Write the table as CSV of display strings.
pub fn write_csv<W: Write>(table: &ReportTable, writer: W) -> std::io::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(display_headers(table))
        .map_err(std::io::Error::other)?;
    for row in display_rows(table) {
        wtr.write_record(row).map_err(std::io::Error::other)?;
    }
    wtr.flush()?;
    Ok(())
}
