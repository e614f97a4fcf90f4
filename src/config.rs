//! Deserializable settings for embedding applications.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ImportResult;
use crate::execution::ExecutionOptions;
use crate::generation::DEFAULT_EXAMPLE_ROWS;
use crate::ingestion::{ImportOptions, ImportSeverity, ValueOptionPolicy};
use crate::persistence::{SqliteStore, StoreResult};

/// Import settings, typically loaded from a JSON file. Every field is optional.
///
/// ```rust
/// use csv_seeder::config::ImportSettings;
///
/// # fn main() -> Result<(), csv_seeder::ImportError> {
/// let settings = ImportSettings::from_json_str(r#"{ "enforce_value_options": true }"#)?;
/// assert_eq!(settings.example_row_count, 3);
/// assert!(settings.enforce_value_options);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// SQLite database file; `None` keeps everything in memory.
    pub database_path: Option<PathBuf>,
    /// Rows in generated example CSV.
    pub example_row_count: usize,
    /// Reject cells outside a column's declared value options.
    pub enforce_value_options: bool,
    /// Upper bound on concurrent placeholder creates; `None` uses the engine default.
    pub max_parallel_creates: Option<usize>,
    /// Severity at which observers receive `on_alert`.
    pub alert_at_or_above: ImportSeverity,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            database_path: None,
            example_row_count: DEFAULT_EXAMPLE_ROWS,
            enforce_value_options: false,
            max_parallel_creates: None,
            alert_at_or_above: ImportSeverity::Critical,
        }
    }
}

impl ImportSettings {
    pub fn from_json_str(json: &str) -> ImportResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> ImportResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Runtime options for these settings, without an observer.
    pub fn to_options(&self) -> ImportOptions {
        let mut execution = ExecutionOptions::default();
        if let Some(n) = self.max_parallel_creates {
            execution.max_in_flight = n.max(1);
            execution.num_threads = Some(n.max(1));
        }
        ImportOptions {
            value_option_policy: if self.enforce_value_options {
                ValueOptionPolicy::Enforce
            } else {
                ValueOptionPolicy::Advisory
            },
            observer: None,
            alert_at_or_above: self.alert_at_or_above,
            execution,
        }
    }

    /// Open the configured database, or a private in-memory one.
    pub fn open_store(&self) -> StoreResult<SqliteStore> {
        match &self.database_path {
            Some(path) => SqliteStore::open(path),
            None => SqliteStore::open_in_memory(),
        }
    }
}
