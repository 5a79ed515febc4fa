//! # Salesheet - weekly store sales report transformation
//!
//! Salesheet turns raw weekly sales extracts (one row per week, one
//! sales column per historical year) into denormalized, display-ready
//! report tables with monthly subtotals, running totals, and
//! year-over-year comparisons.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Store CSV  │────▶│  Provider   │────▶│   Engine    │────▶│ Report JSON │
//! │ (ISO/UTF8)  │     │ (auto-enc)  │     │ (6 stages)  │     │  / CSV / …  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! The engine itself is a pure, synchronous pipeline:
//! normalize columns → order weeks and assign dates → insert monthly
//! summaries → insert cumulative rows → derive difference and
//! percentage columns → finalize layout and format tags.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use salesheet::{build_report, load_store_csv, ConfigStore};
//!
//! let raw = load_store_csv("BG01.csv")?;
//! let config = ConfigStore::new();
//! let table = build_report(raw, config.start_date(), &config.week_mapping());
//! println!("{}", salesheet::render::render_console(&table));
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`model`] - Table model (rows, typed columns, cells)
//! - [`engine`] - The six-stage transformation pipeline
//! - [`report`] - High-level per-store orchestration
//! - [`provider`] - Store CSV reading with auto-detection
//! - [`config`] - Week mapping, start date, store mappings
//! - [`render`] - Display formatting and console/CSV output
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod model;

// The transformation pipeline
pub mod engine;

// High-level orchestration
pub mod report;

// Boundary providers
pub mod config;
pub mod provider;

// Presentation
pub mod render;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConfigError, ReportError, ServerError, SourceError};

// =============================================================================
// Re-exports - Model
// =============================================================================

pub use model::{
    CellFormat, CellValue, Column, ColumnRole, MonthWeeks, RawSalesTable, RawWeekRow,
    ReportRow, ReportTable, RowKind, WeekKey,
};

// =============================================================================
// Re-exports - Engine
// =============================================================================

pub use engine::{
    add_derived_columns, assign_dates, build_report, finalize_layout, insert_cumulative_rows,
    insert_summary_rows, normalize_columns,
};

pub use report::report_for_store;

// =============================================================================
// Re-exports - Providers
// =============================================================================

pub use provider::{detect_delimiter, detect_encoding, load_store_csv, parse_store_bytes};

pub use config::{example_config, machine_name, AppConfig, ConfigStore, MachineEntry};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, ColumnInfo, ReportResponse, RowPayload};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
