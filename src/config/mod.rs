//! Configuration store: month→week mapping, report start date, and
//! machine→store mappings with run bookkeeping.
//!
//! A single JSON document persisted under a config directory. Loading is
//! graceful: a missing or unreadable document yields the built-in
//! defaults, mirroring how the original deployment fell back when its
//! config source was unreachable.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigResult;
use crate::model::MonthWeeks;

/// Directory where the config document lives (relative to current dir).
const DEFAULT_CONFIG_DIR: &str = ".salesheet";

/// File name of the config document.
const CONFIG_FILE: &str = "config.json";

/// Calendar month order used to sort the week mapping before the engine
/// consumes it.
const MONTH_ORDER: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn default_start_date() -> NaiveDate {
    // Fallback used when no start date is configured.
    NaiveDate::from_ymd_opt(2024, 9, 1).expect("valid fallback date")
}

/// Per-machine entry: which stores to report on, plus run counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MachineEntry {
    /// Ordered store names; one report per store.
    #[serde(default)]
    pub stores: Vec<String>,
    /// Number of application runs recorded for this machine.
    #[serde(default)]
    pub times_ran: u32,
    /// RFC 3339 timestamp of the last recorded run.
    #[serde(default)]
    pub last_ran: Option<String>,
}

/// The config document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Start date of week 1.
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,
    /// Month→week mapping, in any stored order.
    #[serde(default)]
    pub month_weeks: Vec<MonthWeeks>,
    /// Machine name → entry.
    #[serde(default)]
    pub machines: HashMap<String, MachineEntry>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            start_date: default_start_date(),
            month_weeks: Vec::new(),
            machines: HashMap::new(),
        }
    }
}

/// A filled-in sample config on a 4-4-5-style week calendar, for
/// bootstrapping a new deployment.
pub fn example_config() -> AppConfig {
    let quarters: [[usize; 3]; 4] = [[4, 4, 5]; 4];
    let mut month_weeks = Vec::with_capacity(12);
    let mut week = 1u32;
    for (quarter, lengths) in quarters.iter().enumerate() {
        for (offset, &len) in lengths.iter().enumerate() {
            let month = MONTH_ORDER[quarter * 3 + offset];
            let weeks: Vec<u32> = (week..week + len as u32).collect();
            month_weeks.push(MonthWeeks::new(month, weeks));
            week += len as u32;
        }
    }

    AppConfig {
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
        month_weeks,
        machines: HashMap::from([(
            "example-till".to_string(),
            MachineEntry {
                stores: vec!["BG01".to_string(), "BG02".to_string()],
                ..MachineEntry::default()
            },
        )]),
    }
}

/// Store managing the persisted config document.
pub struct ConfigStore {
    dir: PathBuf,
    pub config: AppConfig,
}

impl ConfigStore {
    /// Open the default config directory.
    pub fn new() -> Self {
        Self::with_dir(DEFAULT_CONFIG_DIR)
    }

    /// Open a specific config directory, loading the document if present.
    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        let dir = PathBuf::from(dir.as_ref());
        let config = fs::read_to_string(dir.join(CONFIG_FILE))
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        Self { dir, config }
    }

    fn document_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    /// Persist the current document.
    pub fn save(&self) -> ConfigResult<()> {
        fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string_pretty(&self.config)?;
        fs::write(self.document_path(), content)?;
        Ok(())
    }

    /// The month→week mapping in calendar order, ready for the engine.
    ///
    /// Months outside the known calendar names sort first, then by name;
    /// the engine consumes whatever order it is handed.
    pub fn week_mapping(&self) -> Vec<MonthWeeks> {
        let mut mapping = self.config.month_weeks.clone();
        mapping.sort_by(|a, b| {
            let pos = |m: &MonthWeeks| {
                MONTH_ORDER
                    .iter()
                    .position(|name| *name == m.month)
                    .map(|p| p as i32)
                    .unwrap_or(-1)
            };
            pos(a).cmp(&pos(b)).then_with(|| a.month.cmp(&b.month))
        });
        mapping
    }

    /// Start date of week 1.
    pub fn start_date(&self) -> NaiveDate {
        self.config.start_date
    }

    /// Stores mapped to a machine; empty when the machine is unknown.
    pub fn stores_for(&self, machine: &str) -> Vec<String> {
        self.config
            .machines
            .get(machine)
            .map(|entry| entry.stores.clone())
            .unwrap_or_default()
    }

    /// Record an application run for a machine and persist.
    ///
    /// Unknown machines are registered with an empty store list so an
    /// operator can fill them in later.
    pub fn record_run(&mut self, machine: &str) -> ConfigResult<()> {
        let entry = self
            .config
            .machines
            .entry(machine.to_string())
            .or_default();
        entry.times_ran += 1;
        entry.last_ran = Some(Utc::now().to_rfc3339());
        self.save()
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Name of the invoking machine, used to look up the store mapping.
pub fn machine_name() -> String {
    std::env::var("SALESHEET_MACHINE")
        .or_else(|_| std::env::var("HOSTNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}
