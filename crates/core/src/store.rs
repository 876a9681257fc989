//! SQLite persistence for patients and their diagnoses.
//!
//! ## Schema
//!
//! ```text
//! patients(id INTEGER PK, name TEXT, age INTEGER NULL, gender TEXT NULL)
//! diagnoses(id INTEGER PK, patient_id -> patients.id, disease_name, namaste, icd11,
//!           snomed, loinc, preventive, timestamp TEXT /* RFC 3339, UTC */)
//! ```
//!
//! The connection is guarded by a `Mutex`; every write runs inside one transaction so a
//! patient and its diagnoses land together or not at all.

use crate::error::PatientResult;
use crate::patient::{Diagnosis, NewPatient, Patient, PatientRecord};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use terminology::TerminologyEntry;

const SCHEMA: &str = r"
    CREATE TABLE IF NOT EXISTS patients (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        age INTEGER,
        gender TEXT
    );

    CREATE TABLE IF NOT EXISTS diagnoses (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        patient_id INTEGER NOT NULL REFERENCES patients(id),
        disease_name TEXT NOT NULL,
        namaste TEXT NOT NULL,
        icd11 TEXT NOT NULL,
        snomed TEXT NOT NULL,
        loinc TEXT NOT NULL,
        preventive TEXT NOT NULL,
        timestamp TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_diagnoses_patient
        ON diagnoses(patient_id, id);
";

/// SQLite-backed record store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or initialised.
    pub fn open(path: impl AsRef<Path>) -> PatientResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        tracing::debug!("opened database {}", path.as_ref().display());
        Self::from_connection(conn)
    }

    /// Create an in-memory database (for testing).
    ///
    /// # Errors
    /// Returns an error if the database cannot be created.
    pub fn in_memory() -> PatientResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> PatientResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // A panic mid-transaction rolls the transaction back on drop, so the connection is
    // still usable after poisoning.
    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a patient and one diagnosis per matched entry in a single transaction.
    ///
    /// Diagnoses are inserted in the order given and all carry `recorded_at`.
    ///
    /// # Errors
    /// Returns an error if any insert fails; nothing is written in that case.
    pub fn insert_patient_with_diagnoses(
        &self,
        patient: &NewPatient,
        matches: &[&TerminologyEntry],
        recorded_at: DateTime<Utc>,
    ) -> PatientResult<PatientRecord> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO patients (name, age, gender) VALUES (?1, ?2, ?3)",
            params![patient.name.as_str(), patient.age, patient.gender],
        )?;
        let patient_id = tx.last_insert_rowid();

        let timestamp = recorded_at.to_rfc3339_opts(SecondsFormat::Micros, true);
        let mut diagnoses = Vec::with_capacity(matches.len());
        for entry in matches {
            tx.execute(
                r"
                INSERT INTO diagnoses (
                    patient_id, disease_name, namaste, icd11, snomed, loinc,
                    preventive, timestamp
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ",
                params![
                    patient_id,
                    entry.disease_key,
                    entry.namaste,
                    entry.icd11,
                    entry.snomed,
                    entry.loinc,
                    entry.preventive_advice,
                    timestamp,
                ],
            )?;
            diagnoses.push(Diagnosis {
                id: tx.last_insert_rowid(),
                patient_id,
                disease_name: entry.disease_key.clone(),
                namaste: entry.namaste.clone(),
                icd11: entry.icd11.clone(),
                snomed: entry.snomed.clone(),
                loinc: entry.loinc.clone(),
                preventive: entry.preventive_advice.clone(),
                timestamp: recorded_at,
            });
        }

        tx.commit()?;

        Ok(PatientRecord {
            patient: Patient {
                id: patient_id,
                name: patient.name.as_str().to_string(),
                age: patient.age,
                gender: patient.gender.clone(),
            },
            diagnoses,
        })
    }

    /// Fetch a single patient by id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn find_patient(&self, id: i64) -> PatientResult<Option<Patient>> {
        let conn = self.lock();
        let patient = conn
            .query_row(
                "SELECT id, name, age, gender FROM patients WHERE id = ?1",
                params![id],
                patient_from_row,
            )
            .optional()?;
        Ok(patient)
    }

    /// All diagnoses for a patient, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails or a stored timestamp is malformed.
    pub fn diagnoses_for(&self, patient_id: i64) -> PatientResult<Vec<Diagnosis>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            r"
            SELECT id, patient_id, disease_name, namaste, icd11, snomed, loinc,
                   preventive, timestamp
            FROM diagnoses
            WHERE patient_id = ?1
            ORDER BY id ASC
            ",
        )?;
        let diagnoses = stmt
            .query_map(params![patient_id], diagnosis_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(diagnoses)
    }

    /// All patients ordered by id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn list_patients(&self) -> PatientResult<Vec<Patient>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT id, name, age, gender FROM patients ORDER BY id ASC")?;
        let patients = stmt
            .query_map([], patient_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(patients)
    }

    /// Number of stored diagnoses across all patients.
    #[cfg(test)]
    pub(crate) fn count_diagnoses(&self) -> PatientResult<usize> {
        let conn = self.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM diagnoses", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        gender: row.get(3)?,
    })
}

fn diagnosis_from_row(row: &Row<'_>) -> rusqlite::Result<Diagnosis> {
    let raw_timestamp: String = row.get(8)?;
    let timestamp = DateTime::parse_from_rfc3339(&raw_timestamp)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Diagnosis {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        disease_name: row.get(2)?,
        namaste: row.get(3)?,
        icd11: row.get(4)?,
        snomed: row.get(5)?,
        loinc: row.get(6)?,
        preventive: row.get(7)?,
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NonEmptyText;
    use chrono::TimeZone;
    use tempfile::TempDir;
    use terminology::TerminologyTable;

    fn new_patient(name: &str) -> NewPatient {
        NewPatient {
            name: NonEmptyText::new(name).unwrap(),
            age: Some(42),
            gender: Some("F".into()),
        }
    }

    #[test]
    fn insert_assigns_ids_and_copies_codes() {
        let store = SqliteStore::in_memory().unwrap();
        let table = TerminologyTable::builtin();
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();

        let record = store
            .insert_patient_with_diagnoses(&new_patient("Asha"), &table.match_note("cough"), at)
            .expect("insert record");

        assert!(record.patient.id > 0);
        assert_eq!(record.diagnoses.len(), 1);
        let diagnosis = &record.diagnoses[0];
        assert_eq!(diagnosis.patient_id, record.patient.id);
        assert_eq!(diagnosis.disease_name, "cough");
        assert_eq!(diagnosis.namaste, "NAM002");
        assert_eq!(diagnosis.loinc, "10154-3");
        assert_eq!(diagnosis.timestamp, at);
    }

    #[test]
    fn stored_rows_read_back_in_insertion_order() {
        let store = SqliteStore::in_memory().unwrap();
        let table = TerminologyTable::builtin();
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();

        let record = store
            .insert_patient_with_diagnoses(
                &new_patient("Ravi"),
                &table.match_note("diabetes and fever"),
                at,
            )
            .unwrap();

        let read_back = store.diagnoses_for(record.patient.id).unwrap();
        assert_eq!(read_back, record.diagnoses);
        let names: Vec<&str> = read_back.iter().map(|d| d.disease_name.as_str()).collect();
        assert_eq!(names, ["fever", "diabetes"]);
    }

    #[test]
    fn patient_without_matches_is_still_stored() {
        let store = SqliteStore::in_memory().unwrap();
        let record = store
            .insert_patient_with_diagnoses(&new_patient("Meera"), &[], Utc::now())
            .unwrap();

        assert!(record.diagnoses.is_empty());
        assert_eq!(
            store.find_patient(record.patient.id).unwrap(),
            Some(record.patient)
        );
        assert_eq!(store.count_diagnoses().unwrap(), 0);
    }

    #[test]
    fn failed_diagnosis_insert_rolls_back_patient() {
        let store = SqliteStore::in_memory().unwrap();
        let table = TerminologyTable::builtin();
        store
            .lock()
            .execute_batch(
                "CREATE TRIGGER reject_diagnoses BEFORE INSERT ON diagnoses
                 BEGIN SELECT RAISE(ABORT, 'diagnosis rejected'); END;",
            )
            .expect("install trigger");

        let result = store.insert_patient_with_diagnoses(
            &new_patient("Anil"),
            &table.match_note("fever"),
            Utc::now(),
        );

        assert!(result.is_err());
        assert!(store.list_patients().unwrap().is_empty());
        assert_eq!(store.count_diagnoses().unwrap(), 0);
    }

    #[test]
    fn find_unknown_patient_returns_none() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.find_patient(999).unwrap(), None);
        assert!(store.diagnoses_for(999).unwrap().is_empty());
    }

    #[test]
    fn list_patients_orders_by_id() {
        let store = SqliteStore::in_memory().unwrap();
        for name in ["A", "B", "C"] {
            store
                .insert_patient_with_diagnoses(&new_patient(name), &[], Utc::now())
                .unwrap();
        }

        let names: Vec<String> = store
            .list_patients()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn data_survives_reopening_the_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("ayunex.db");
        let table = TerminologyTable::builtin();

        let id = {
            let store = SqliteStore::open(&path).unwrap();
            store
                .insert_patient_with_diagnoses(
                    &new_patient("Kiran"),
                    &table.match_note("headache"),
                    Utc::now(),
                )
                .unwrap()
                .patient
                .id
        };

        let store = SqliteStore::open(&path).unwrap();
        let patient = store.find_patient(id).unwrap().expect("patient persisted");
        assert_eq!(patient.name, "Kiran");
        assert_eq!(patient.age, Some(42));
        assert_eq!(store.diagnoses_for(id).unwrap().len(), 1);
    }
}
