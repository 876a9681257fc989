//! # AYUNEX Core
//!
//! Core business logic for the AYUNEX clinical record entry system.
//!
//! This crate contains pure data operations:
//! - Patient creation with terminology matching over the diagnosis note
//! - Patient listing and diagnosis history queries
//! - SQLite persistence under the configured database path
//!
//! **No API concerns**: HTTP servers, request/response shapes and CLI parsing belong in
//! `api-rest`, `api-shared` or `ayunex-cli`.

pub mod config;
pub mod constants;
pub mod error;
pub mod patient;
pub mod store;

pub use ayunex_types::{NonEmptyText, TextError};
pub use config::{core_config_from_env_values, CoreConfig};
pub use constants::{DATABASE_ENV, DEFAULT_DATABASE_PATH, TERMINOLOGY_FILE_ENV, TIMESTAMP_FORMAT};
pub use error::{PatientError, PatientResult};
pub use patient::{Diagnosis, NewPatient, Patient, PatientRecord, PatientService};
pub use store::SqliteStore;
pub use terminology::{CodeSystem, TerminologyEntry, TerminologyTable, DEFAULT_LOOKUP_LIMIT};
