//! Disease terminology support for AYUNEX.
//!
//! This crate owns the static terminology table (disease keyword to NAMASTE, ICD-11, SNOMED
//! and LOINC codes plus preventive-care advice) and the matcher that scans free-text
//! diagnosis notes against it.
//!
//! This crate focuses on:
//! - the in-memory table and its YAML wire format
//! - pure matching and lookup over the table
//!
//! **No storage concerns**: persisting matched diagnoses belongs in `ayunex-core`.

pub mod matcher;
pub mod table;

pub use matcher::match_note;
pub use table::{CodeSystem, TerminologyEntry, TerminologyTable, DEFAULT_LOOKUP_LIMIT};

/// Errors returned by the `terminology` crate.
#[derive(Debug, thiserror::Error)]
pub enum TerminologyError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("translation error: {0}")]
    Translation(String),

    #[error("unknown code system: {0}")]
    UnknownCodeSystem(String),
}

/// Type alias for Results that can fail with a [`TerminologyError`].
pub type TerminologyResult<T> = Result<T, TerminologyError>;
