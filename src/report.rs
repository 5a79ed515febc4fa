//! High-level report building: config plus store extract to finished table.
//!
//! The CLI and the HTTP server both go through here so the lookup rules
//! stay in one place: a store named `BG01` reads `BG01.csv` from the
//! data directory and is transformed with the config's start date and
//! calendar-ordered week mapping.

use std::path::Path;

use crate::config::ConfigStore;
use crate::engine::build_report;
use crate::error::{ReportError, ReportResult};
use crate::model::ReportTable;
use crate::provider::load_store_csv;

/// Build the report table for one configured store.
pub fn report_for_store(
    config: &ConfigStore,
    data_dir: &Path,
    store: &str,
) -> ReportResult<ReportTable> {
    let csv_path = data_dir.join(format!("{}.csv", store));
    if !csv_path.exists() {
        return Err(ReportError::UnknownStore(store.to_string()));
    }

    let raw = load_store_csv(csv_path)?;
    Ok(build_report(raw, config.start_date(), &config.week_mapping()))
}
