//! Error types for the salesheet report pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`SourceError`] - raw sales CSV reading errors
//! - [`ConfigError`] - configuration store errors
//! - [`ReportError`] - top-level orchestration errors
//! - [`ServerError`] - HTTP server errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Data-shape surprises inside a successfully read table (malformed week
//! values, missing numeric cells, zero denominators) are NOT errors: the
//! engine degrades gracefully per cell. These types cover provider and
//! boundary failures only.

use thiserror::Error;

// =============================================================================
// Raw Sales Source Errors
// =============================================================================

/// Errors while reading a raw sales CSV.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode file content.
    #[error("Failed to decode content: {0}")]
    Encoding(String),

    /// Invalid CSV shape.
    #[error("Invalid CSV on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// The sheet has no `Week` column, which every store extract must carry.
    #[error("No 'Week' column in CSV headers")]
    MissingWeekColumn,
}

impl SourceError {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors from the configuration store.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error while loading or saving the config document.
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed config document.
    #[error("Config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid config content.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

// =============================================================================
// Report Errors (top-level)
// =============================================================================

/// Top-level report orchestration errors.
///
/// This is the main error type returned by the load-and-transform flow.
/// It wraps the provider-level errors; the engine itself never fails on
/// data shape.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Raw sales source error.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Requested store has no data file.
    #[error("No data file for store '{0}'")]
    UnknownStore(String),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Report pipeline error.
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for report operations.
pub type ReportResult<T> = Result<T, ReportError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
