//! REST API types for grid frontends.
//!
//! The payload carries the finished table plus everything a grid needs
//! to apply its own presentation: per-column format kinds and per-row
//! kinds (so summary and cumulative rows can be highlighted and the
//! Difference column color-coded without re-deriving row type from the
//! Week cell).

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::model::{CellFormat, CellValue, ColumnRole, ReportTable, RowKind};

/// One column of the report payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub name: String,
    /// "label", "date", "currency", or "percentage".
    pub kind: String,
}

/// One row of the report payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowPayload {
    /// "data", "summary", or "cumulative".
    pub kind: String,
    /// Column name → cell value; numbers as JSON numbers, dates as
    /// ISO strings, absent figures as null.
    pub cells: Map<String, Value>,
}

/// Response for one transformed store report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub store: String,
    pub row_count: usize,
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<RowPayload>,
}

impl ReportResponse {
    /// Flatten a finished table into the wire shape.
    pub fn from_table(store: impl Into<String>, table: &ReportTable) -> Self {
        let columns = table
            .columns
            .iter()
            .map(|column| ColumnInfo {
                name: column.name.clone(),
                kind: column_kind(column.role, column.format).to_string(),
            })
            .collect();

        let rows: Vec<RowPayload> = table
            .rows
            .iter()
            .map(|row| {
                let mut cells = Map::new();
                for column in &table.columns {
                    let value = match column.role {
                        ColumnRole::Week => Value::String(row.kind.week_label()),
                        _ => cell_to_json(row.get(&column.name)),
                    };
                    cells.insert(column.name.clone(), value);
                }
                RowPayload {
                    kind: row_kind(&row.kind).to_string(),
                    cells,
                }
            })
            .collect();

        ReportResponse {
            store: store.into(),
            row_count: rows.len(),
            columns,
            rows,
        }
    }
}

fn column_kind(role: ColumnRole, format: Option<CellFormat>) -> &'static str {
    match role {
        ColumnRole::Week => "label",
        ColumnRole::Date => "date",
        _ => match format {
            Some(CellFormat::Percentage) => "percentage",
            _ => "currency",
        },
    }
}

fn row_kind(kind: &RowKind) -> &'static str {
    match kind {
        RowKind::Week(_) => "data",
        RowKind::Summary(_) => "summary",
        RowKind::Cumulative => "cumulative",
    }
}

fn cell_to_json(value: &CellValue) -> Value {
    match value {
        CellValue::Number(number) => number
            .to_f64()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        CellValue::Text(text) => Value::String(text.clone()),
        CellValue::Date(date) => Value::String(date.format("%Y-%m-%d").to_string()),
        CellValue::Null => Value::Null,
    }
}

/// Create an error response body.
pub fn error_response(error: &str) -> Value {
    json!({
        "status": "error",
        "error": error,
    })
}
