//! Constants used throughout the AYUNEX core crate.

/// Default SQLite database file when no explicit path is configured.
pub const DEFAULT_DATABASE_PATH: &str = "ayunex.db";

/// Display format for diagnosis timestamps (UTC, minute precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Field name reported when the patient name is missing.
pub const NAME_FIELD: &str = "name";

/// Field name reported when the diagnosis note is missing.
pub const DIAGNOSIS_FIELD: &str = "diagnosis";

/// Environment variable naming the SQLite database file.
pub const DATABASE_ENV: &str = "AYUNEX_DATABASE";

/// Environment variable naming an alternative terminology table (YAML).
pub const TERMINOLOGY_FILE_ENV: &str = "AYUNEX_TERMINOLOGY_FILE";
