//! Domain model for the report transformation pipeline.
//!
//! This module contains the data structures flowing through the engine:
//!
//! - [`RawSalesTable`] / [`RawWeekRow`] - the provider-facing input shape
//! - [`WeekKey`] - integer week number or opaque label
//! - [`ReportTable`] / [`ReportRow`] - the transformed table handed to
//!   the presentation layer
//! - [`Column`] / [`ColumnRole`] / [`CellFormat`] - typed column
//!   descriptors carried alongside the table
//! - [`RowKind`] - explicit row tagging (data / summary / cumulative)
//!
//! Column identity and row type are explicit here; they are flattened to
//! the name-string / week-label form only at the presentation boundary.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

// =============================================================================
// Week Keys
// =============================================================================

/// Key of one raw row: a week-of-year number, or an opaque label.
///
/// Labels never match a month's week set and are carried through the
/// pipeline unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WeekKey {
    Number(u32),
    Label(String),
}

impl WeekKey {
    /// Parse a raw cell into a week key. Anything that is not a
    /// non-negative integer becomes a label.
    pub fn from_raw(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.parse::<u32>() {
            Ok(n) => WeekKey::Number(n),
            Err(_) => WeekKey::Label(trimmed.to_string()),
        }
    }

    /// The week number, if this key is numeric.
    pub fn number(&self) -> Option<u32> {
        match self {
            WeekKey::Number(n) => Some(*n),
            WeekKey::Label(_) => None,
        }
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekKey::Number(n) => write!(f, "{}", n),
            WeekKey::Label(s) => write!(f, "{}", s),
        }
    }
}

// =============================================================================
// Raw Input Shape
// =============================================================================

/// One week of one store, as supplied by the raw sales provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWeekRow {
    pub week: WeekKey,
    pub target: Option<Decimal>,
    /// Sales figures keyed by calendar year.
    pub sales_by_year: BTreeMap<i32, Option<Decimal>>,
}

/// A raw sales extract: the row set plus the schema the provider saw.
///
/// The schema is carried explicitly so the engine can distinguish "no
/// Target column" from "Target null everywhere".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSalesTable {
    /// Whether the extract carried a Target column.
    pub has_target: bool,
    /// Year columns present, ascending.
    pub years: Vec<i32>,
    pub rows: Vec<RawWeekRow>,
}

impl RawSalesTable {
    pub fn empty() -> Self {
        Self {
            has_target: false,
            years: Vec::new(),
            rows: Vec::new(),
        }
    }
}

// =============================================================================
// Month -> Week Mapping
// =============================================================================

/// The week numbers belonging to one calendar month.
///
/// The engine consumes these in the order given; calendar ordering is the
/// provider's responsibility. Weeks are expected to be disjoint across
/// months; overlapping weeks double-count in the aggregators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthWeeks {
    pub month: String,
    pub weeks: Vec<u32>,
}

impl MonthWeeks {
    pub fn new(month: impl Into<String>, weeks: Vec<u32>) -> Self {
        Self {
            month: month.into(),
            weeks,
        }
    }
}

// =============================================================================
// Cells
// =============================================================================

/// A single cell of the transformed table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(Decimal),
    Text(String),
    Date(NaiveDate),
    Null,
}

impl CellValue {
    /// Wrap an optional decimal, mapping `None` to [`CellValue::Null`].
    pub fn from_opt(value: Option<Decimal>) -> Self {
        match value {
            Some(d) => CellValue::Number(d),
            None => CellValue::Null,
        }
    }

    /// The numeric value, if this cell holds one.
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            CellValue::Number(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// =============================================================================
// Column Descriptors
// =============================================================================

/// Display-format tag attached to numeric columns by the layout planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellFormat {
    /// Currency-prefixed, integer-rounded display.
    Currency,
    /// Two-decimal percentage display.
    Percentage,
}

/// What a column *is*, independent of its display name.
///
/// `Current` remembers the calendar year it was relabeled from, since the
/// name "Current" is not itself parseable as a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnRole {
    Week,
    Date,
    Target,
    Current { year: i32 },
    SalesYear { year: i32 },
    Difference,
    YearOverYear { newer: i32, older: i32 },
}

impl ColumnRole {
    /// Whether cells under this column are numeric (eligible for
    /// summation and format tagging).
    pub fn is_numeric(&self) -> bool {
        !matches!(self, ColumnRole::Week | ColumnRole::Date)
    }

    /// The calendar year a sales column carries, if any.
    pub fn sales_year(&self) -> Option<i32> {
        match self {
            ColumnRole::Current { year } | ColumnRole::SalesYear { year } => Some(*year),
            _ => None,
        }
    }
}

/// One column of the transformed table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub role: ColumnRole,
    /// Set by the layout planner; `None` for non-numeric columns.
    pub format: Option<CellFormat>,
}

impl Column {
    pub fn new(name: impl Into<String>, role: ColumnRole) -> Self {
        Self {
            name: name.into(),
            role,
            format: None,
        }
    }
}

// =============================================================================
// Rows
// =============================================================================

/// Explicit row tagging.
///
/// The source format encodes row type implicitly in whether the Week cell
/// parses as an integer; internally the tag is explicit and only the
/// presentation boundary flattens it back to the label form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowKind {
    /// A raw week row (data if the key is numeric, passthrough if a label).
    Week(WeekKey),
    /// Monthly totals, labeled with the month name.
    Summary(String),
    /// Running totals up to this point.
    Cumulative,
}

impl RowKind {
    /// The week number, for rows that represent an actual data week.
    pub fn week_number(&self) -> Option<u32> {
        match self {
            RowKind::Week(key) => key.number(),
            _ => None,
        }
    }

    /// The display string for the Week column.
    pub fn week_label(&self) -> String {
        match self {
            RowKind::Week(key) => key.to_string(),
            RowKind::Summary(month) => month.clone(),
            RowKind::Cumulative => "Cumulative".to_string(),
        }
    }

    /// Whether this is an inserted rollup row (summary or cumulative).
    pub fn is_rollup(&self) -> bool {
        matches!(self, RowKind::Summary(_) | RowKind::Cumulative)
    }
}

static NULL_CELL: CellValue = CellValue::Null;

/// One row of the transformed table: a kind tag plus name-keyed cells.
///
/// The Week value lives in the kind tag, not the cell map; rollup rows
/// never hold a Date cell (reads return [`CellValue::Null`]).
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub kind: RowKind,
    cells: HashMap<String, CellValue>,
}

impl ReportRow {
    pub fn new(kind: RowKind) -> Self {
        Self {
            kind,
            cells: HashMap::new(),
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: CellValue) {
        self.cells.insert(name.into(), value);
    }

    /// Cell under the given column name; absent cells read as null.
    pub fn get(&self, name: &str) -> &CellValue {
        self.cells.get(name).unwrap_or(&NULL_CELL)
    }

    /// Numeric cell value, if present and numeric.
    pub fn number(&self, name: &str) -> Option<Decimal> {
        self.get(name).as_number()
    }
}

// =============================================================================
// The Report Table
// =============================================================================

/// The transformed table: ordered columns plus ordered rows.
///
/// Built once per invocation; each pipeline stage consumes a table and
/// yields the next. No mutation happens after the layout planner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportTable {
    pub columns: Vec<Column>,
    pub rows: Vec<ReportRow>,
}

impl ReportTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Index of a column by name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Append a column on the right.
    pub fn push_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// Insert a column immediately after an existing one, or append if
    /// the anchor is absent.
    pub fn insert_column_after(&mut self, anchor: &str, column: Column) {
        match self.position(anchor) {
            Some(idx) => self.columns.insert(idx + 1, column),
            None => self.columns.push(column),
        }
    }

    /// Names of numeric columns, in column order.
    pub fn numeric_column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.role.is_numeric())
            .map(|c| c.name.clone())
            .collect()
    }

    /// The calendar year behind the "Current" column, if present.
    pub fn current_year(&self) -> Option<i32> {
        self.columns.iter().find_map(|c| match c.role {
            ColumnRole::Current { year } => Some(year),
            _ => None,
        })
    }
}
