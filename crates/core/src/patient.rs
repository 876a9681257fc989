//! Patient service and related types.
//!
//! This module holds the record-creation and query boundaries: it validates incoming
//! records, runs the diagnosis matcher over the note and hands the results to the store.

use crate::constants::{DIAGNOSIS_FIELD, NAME_FIELD, TIMESTAMP_FORMAT};
use crate::error::{PatientError, PatientResult};
use crate::store::SqliteStore;
use crate::{CoreConfig, NonEmptyText};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use terminology::{TerminologyEntry, TerminologyTable};

/// A stored patient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub age: Option<u32>,
    pub gender: Option<String>,
}

/// A validated patient that has not been stored yet.
#[derive(Clone, Debug)]
pub struct NewPatient {
    pub name: NonEmptyText,
    pub age: Option<u32>,
    pub gender: Option<String>,
}

/// A diagnosis recorded when a note matched a terminology entry.
///
/// Coded fields are copied from the entry at creation time and never re-derived.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnosis {
    pub id: i64,
    pub patient_id: i64,
    pub disease_name: String,
    pub namaste: String,
    pub icd11: String,
    pub snomed: String,
    pub loinc: String,
    pub preventive: String,
    pub timestamp: DateTime<Utc>,
}

impl Diagnosis {
    /// Timestamp rendered as `YYYY-MM-DD HH:MM` (UTC).
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// A patient together with its diagnosis history, oldest first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientRecord {
    pub patient: Patient,
    pub diagnoses: Vec<Diagnosis>,
}

/// Pure patient data operations - no API concerns
#[derive(Clone, Debug)]
pub struct PatientService {
    cfg: Arc<CoreConfig>,
    store: Arc<SqliteStore>,
}

impl PatientService {
    /// Creates a service over an already opened store.
    pub fn new(cfg: Arc<CoreConfig>, store: Arc<SqliteStore>) -> Self {
        Self { cfg, store }
    }

    /// Opens the database named by the configuration and creates a service over it.
    ///
    /// # Errors
    ///
    /// Returns a `PatientError` if the database cannot be opened or initialised.
    pub fn open(cfg: Arc<CoreConfig>) -> PatientResult<Self> {
        let store = SqliteStore::open(cfg.database_path())?;
        Ok(Self::new(cfg, Arc::new(store)))
    }

    /// The terminology table this service matches against.
    pub fn terminology(&self) -> &TerminologyTable {
        self.cfg.terminology()
    }

    /// Runs the matcher over `note` without storing anything.
    pub fn match_note(&self, note: &str) -> Vec<&TerminologyEntry> {
        self.terminology().match_note(note)
    }

    /// Creates a patient and records one diagnosis per terminology match in the note.
    ///
    /// # Arguments
    ///
    /// * `name` - Patient name; required.
    /// * `age` - Optional age in years.
    /// * `gender` - Optional gender; blank values are stored as absent.
    /// * `diagnosis_text` - Free-text diagnosis note; required.
    ///
    /// # Returns
    ///
    /// The stored patient with the diagnoses created for it. A note that matches nothing
    /// still creates the patient, with an empty history.
    ///
    /// # Errors
    ///
    /// Returns a `PatientError` if:
    /// - `name` or `diagnosis_text` is absent or blank ([`PatientError::MissingRequiredField`]),
    /// - the database write fails.
    pub fn create_record(
        &self,
        name: Option<&str>,
        age: Option<u32>,
        gender: Option<&str>,
        diagnosis_text: Option<&str>,
    ) -> PatientResult<PatientRecord> {
        self.create_record_at(name, age, gender, diagnosis_text, Utc::now())
    }

    fn create_record_at(
        &self,
        name: Option<&str>,
        age: Option<u32>,
        gender: Option<&str>,
        diagnosis_text: Option<&str>,
        recorded_at: DateTime<Utc>,
    ) -> PatientResult<PatientRecord> {
        let name = NonEmptyText::from_optional(name)
            .map_err(|_| PatientError::MissingRequiredField(NAME_FIELD))?;
        let note = match diagnosis_text {
            Some(text) if !text.trim().is_empty() => text,
            _ => return Err(PatientError::MissingRequiredField(DIAGNOSIS_FIELD)),
        };

        let new_patient = NewPatient {
            name,
            age,
            gender: gender
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_string),
        };

        let matches = self.match_note(note);
        let record = self
            .store
            .insert_patient_with_diagnoses(&new_patient, &matches, recorded_at)?;

        tracing::info!(
            patient_id = record.patient.id,
            matched = record.diagnoses.len(),
            "patient record created"
        );
        Ok(record)
    }

    /// Returns a patient and its diagnosis history in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::NotFound`] if no patient has this id, or a database error.
    pub fn get_patient(&self, id: i64) -> PatientResult<PatientRecord> {
        let patient = self
            .store
            .find_patient(id)?
            .ok_or(PatientError::NotFound(id))?;
        let diagnoses = self.store.diagnoses_for(id)?;
        Ok(PatientRecord { patient, diagnoses })
    }

    /// Lists every stored patient ordered by id.
    ///
    /// # Errors
    ///
    /// Returns a `PatientError` if the database query fails.
    pub fn list_patients(&self) -> PatientResult<Vec<Patient>> {
        self.store.list_patients()
    }
}
