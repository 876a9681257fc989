//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. The intent is to avoid reading process-wide environment variables
//! during request handling, which can lead to inconsistent behaviour in multi-threaded runtimes
//! and test harnesses.

use crate::constants::DEFAULT_DATABASE_PATH;
use crate::{PatientError, PatientResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use terminology::TerminologyTable;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    database_path: PathBuf,
    terminology: Arc<TerminologyTable>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::InvalidInput`] if `database_path` is empty.
    pub fn new(database_path: PathBuf, terminology: TerminologyTable) -> PatientResult<Self> {
        if database_path.as_os_str().is_empty() {
            return Err(PatientError::InvalidInput(
                "database path cannot be empty".into(),
            ));
        }

        Ok(Self {
            database_path,
            terminology: Arc::new(terminology),
        })
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    pub fn terminology(&self) -> &Arc<TerminologyTable> {
        &self.terminology
    }
}

/// Resolve the database path from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_DATABASE_PATH`].
pub fn database_path_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH))
}

/// Resolve the terminology table without reading environment variables.
///
/// With no override the built-in table is used. An override must name a readable YAML file
/// holding at least one entry.
///
/// # Errors
///
/// Returns `PatientError` if:
/// - the override is not a regular file or cannot be read,
/// - the YAML does not parse as a terminology table,
/// - the table is empty.
pub fn resolve_terminology(override_file: Option<PathBuf>) -> PatientResult<TerminologyTable> {
    let Some(path) = override_file else {
        return Ok(TerminologyTable::builtin());
    };

    if !path.is_file() {
        return Err(PatientError::InvalidInput(format!(
            "terminology file does not exist: {}",
            path.display()
        )));
    }

    let yaml_text = std::fs::read_to_string(&path).map_err(PatientError::FileRead)?;
    let table = TerminologyTable::parse(&yaml_text)?;
    if table.is_empty() {
        return Err(PatientError::InvalidInput(format!(
            "terminology file has no entries: {}",
            path.display()
        )));
    }

    tracing::info!(
        "loaded {} terminology entries from {}",
        table.len(),
        path.display()
    );
    Ok(table)
}

/// Build a [`CoreConfig`] from raw environment values.
///
/// Binaries read `AYUNEX_DATABASE` and `AYUNEX_TERMINOLOGY_FILE` and pass them here; blank
/// values count as unset.
///
/// # Errors
///
/// Returns `PatientError` if the terminology table cannot be resolved.
pub fn core_config_from_env_values(
    database: Option<String>,
    terminology_file: Option<String>,
) -> PatientResult<CoreConfig> {
    let database_path = database_path_from_env_value(database);
    let terminology_file = terminology_file
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    let terminology = resolve_terminology(terminology_file)?;
    CoreConfig::new(database_path, terminology)
}
