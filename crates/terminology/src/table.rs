//! The terminology table.
//!
//! A table is an ordered, immutable list of [`TerminologyEntry`] values keyed by a lowercase
//! disease name. Order is significant: matching and lookup report entries in the order the
//! table declares them.
//!
//! ## YAML wire format
//!
//! ```yaml
//! - disease: fever
//!   namaste: NAM001
//!   icd11: 1A00
//!   snomed: "386661006"
//!   loinc: 8310-5
//!   preventive: Stay hydrated, rest, avoid cold exposure, maintain hygiene.
//! ```

use crate::{TerminologyError, TerminologyResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Number of entries returned by [`TerminologyTable::lookup`] when the caller gives no limit.
pub const DEFAULT_LOOKUP_LIMIT: usize = 25;

/// One disease keyword and the codes recorded when a note mentions it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerminologyEntry {
    /// Lowercase disease keyword searched for in notes.
    pub disease_key: String,
    /// NAMASTE (AYUSH) code.
    pub namaste: String,
    /// ICD-11 code.
    pub icd11: String,
    /// SNOMED CT concept id.
    pub snomed: String,
    /// LOINC code.
    pub loinc: String,
    /// Canned preventive-care advice for the disease.
    pub preventive_advice: String,
}

impl TerminologyEntry {
    /// Returns this entry's code in the given coding system.
    pub fn code(&self, system: CodeSystem) -> &str {
        match system {
            CodeSystem::Namaste => &self.namaste,
            CodeSystem::Icd11 => &self.icd11,
            CodeSystem::Snomed => &self.snomed,
            CodeSystem::Loinc => &self.loinc,
        }
    }
}

/// Coding systems carried by every entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CodeSystem {
    Namaste,
    Icd11,
    Snomed,
    Loinc,
}

#[cfg(test)]
impl CodeSystem {
    pub(crate) const ALL: [CodeSystem; 4] = [
        CodeSystem::Namaste,
        CodeSystem::Icd11,
        CodeSystem::Snomed,
        CodeSystem::Loinc,
    ];
}

impl fmt::Display for CodeSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CodeSystem::Namaste => "NAMASTE",
            CodeSystem::Icd11 => "ICD11",
            CodeSystem::Snomed => "SNOMED",
            CodeSystem::Loinc => "LOINC",
        };
        f.write_str(name)
    }
}

impl FromStr for CodeSystem {
    type Err = TerminologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NAMASTE" => Ok(CodeSystem::Namaste),
            "ICD11" | "ICD-11" => Ok(CodeSystem::Icd11),
            "SNOMED" | "SNOMED-CT" => Ok(CodeSystem::Snomed),
            "LOINC" => Ok(CodeSystem::Loinc),
            _ => Err(TerminologyError::UnknownCodeSystem(s.to_string())),
        }
    }
}

/// Ordered, immutable terminology table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerminologyTable {
    entries: Vec<TerminologyEntry>,
}

impl TerminologyTable {
    /// Builds a table from entries, keeping their order.
    ///
    /// Keys are lowercased on the way in.
    ///
    /// # Errors
    ///
    /// Returns [`TerminologyError::InvalidInput`] if:
    /// - a disease key is empty or whitespace-only,
    /// - two entries share a key once lowercased.
    pub fn new(entries: Vec<TerminologyEntry>) -> TerminologyResult<Self> {
        let mut seen = HashSet::with_capacity(entries.len());
        let mut normalised = Vec::with_capacity(entries.len());

        for mut entry in entries {
            if entry.disease_key.trim().is_empty() {
                return Err(TerminologyError::InvalidInput(
                    "disease key cannot be empty".into(),
                ));
            }
            entry.disease_key = entry.disease_key.to_lowercase();
            if !seen.insert(entry.disease_key.clone()) {
                return Err(TerminologyError::InvalidInput(format!(
                    "duplicate disease key: {}",
                    entry.disease_key
                )));
            }
            normalised.push(entry);
        }

        Ok(Self {
            entries: normalised,
        })
    }

    /// The default table shipped with AYUNEX.
    pub fn builtin() -> Self {
        let entries = BUILTIN_ENTRIES
            .iter()
            .map(
                |&(disease_key, namaste, icd11, snomed, loinc, preventive_advice)| {
                    TerminologyEntry {
                        disease_key: disease_key.into(),
                        namaste: namaste.into(),
                        icd11: icd11.into(),
                        snomed: snomed.into(),
                        loinc: loinc.into(),
                        preventive_advice: preventive_advice.into(),
                    }
                },
            )
            .collect();

        Self { entries }
    }

    /// Parse a table from YAML text.
    ///
    /// This uses `serde_path_to_error` to surface a best-effort "path" (e.g. `[2].loinc`)
    /// to the failing field when the YAML does not match the wire schema.
    ///
    /// # Errors
    ///
    /// Returns [`TerminologyError`] if:
    /// - the YAML is not a sequence of entry mappings,
    /// - any field is missing or has an unexpected type,
    /// - any unknown keys are present,
    /// - the entries fail [`TerminologyTable::new`] validation.
    pub fn parse(yaml_text: &str) -> TerminologyResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let wire = match serde_path_to_error::deserialize::<_, Vec<TerminologyEntryWire>>(
            deserializer,
        ) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(TerminologyError::Translation(format!(
                    "Terminology table schema mismatch at {path}: {source}"
                )));
            }
        };

        let table = Self::new(wire.into_iter().map(TerminologyEntry::from).collect())?;
        tracing::debug!("parsed terminology table with {} entries", table.len());
        Ok(table)
    }

    /// Render the table as YAML text in its wire format.
    ///
    /// # Errors
    ///
    /// Returns [`TerminologyError::Translation`] if serialisation fails.
    pub fn render(&self) -> TerminologyResult<String> {
        let wire: Vec<TerminologyEntryWire> =
            self.entries.iter().map(TerminologyEntryWire::from).collect();
        serde_yaml::to_string(&wire).map_err(|e| {
            TerminologyError::Translation(format!("Failed to serialize terminology table: {e}"))
        })
    }

    /// Entries in declared order.
    pub fn entries(&self) -> &[TerminologyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for an exact (lowercase) disease key.
    pub fn get(&self, disease_key: &str) -> Option<&TerminologyEntry> {
        let key = disease_key.to_lowercase();
        self.entries.iter().find(|entry| entry.disease_key == key)
    }

    /// Case-insensitive search over keys, codes and advice text.
    ///
    /// Returns at most `limit` entries in table order. An empty filter matches everything.
    pub fn lookup(&self, filter: &str, limit: usize) -> Vec<&TerminologyEntry> {
        let needle = filter.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| {
                [
                    entry.disease_key.as_str(),
                    entry.namaste.as_str(),
                    entry.icd11.as_str(),
                    entry.snomed.as_str(),
                    entry.loinc.as_str(),
                    entry.preventive_advice.as_str(),
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
            })
            .take(limit)
            .collect()
    }

    /// Entry whose code in `system` equals `code` exactly.
    pub fn find_by_code(&self, system: CodeSystem, code: &str) -> Option<&TerminologyEntry> {
        self.entries.iter().find(|entry| entry.code(system) == code)
    }

    /// Map `code` in the `from` system onto the same entry's code in the `to` system.
    ///
    /// Returns `None` when no entry carries `code` in `from`.
    pub fn translate(&self, from: CodeSystem, code: &str, to: CodeSystem) -> Option<&str> {
        self.find_by_code(from, code).map(|entry| entry.code(to))
    }
}

impl Default for TerminologyTable {
    fn default() -> Self {
        Self::builtin()
    }
}

// (key, NAMASTE, ICD-11, SNOMED, LOINC, preventive advice)
const BUILTIN_ENTRIES: [(&str, &str, &str, &str, &str, &str); 5] = [
    (
        "fever",
        "NAM001",
        "1A00",
        "386661006",
        "8310-5",
        "Stay hydrated, rest, avoid cold exposure, maintain hygiene.",
    ),
    (
        "cough",
        "NAM002",
        "RA01",
        "49727002",
        "10154-3",
        "Avoid irritants, stay hydrated, practice hand hygiene.",
    ),
    (
        "heartburn",
        "NAM020",
        "DA10",
        "235719002",
        "2093-3",
        "Avoid spicy/fatty food, eat small meals, avoid lying down after meals.",
    ),
    (
        "headache",
        "NAM003",
        "1H40",
        "25064002",
        "20563-1",
        "Maintain hydration, sleep well, manage stress.",
    ),
    (
        "diabetes",
        "NAM010",
        "5A11",
        "44054006",
        "15074-8",
        "Balanced diet, exercise, monitor sugar levels.",
    ),
];

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct TerminologyEntryWire {
    disease: String,
    namaste: String,
    icd11: String,
    snomed: String,
    loinc: String,
    preventive: String,
}

impl From<TerminologyEntryWire> for TerminologyEntry {
    fn from(wire: TerminologyEntryWire) -> Self {
        Self {
            disease_key: wire.disease,
            namaste: wire.namaste,
            icd11: wire.icd11,
            snomed: wire.snomed,
            loinc: wire.loinc,
            preventive_advice: wire.preventive,
        }
    }
}

impl From<&TerminologyEntry> for TerminologyEntryWire {
    fn from(entry: &TerminologyEntry) -> Self {
        Self {
            disease: entry.disease_key.clone(),
            namaste: entry.namaste.clone(),
            icd11: entry.icd11.clone(),
            snomed: entry.snomed.clone(),
            loinc: entry.loinc.clone(),
            preventive: entry.preventive_advice.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"- disease: Fever
  namaste: "NAM001"
  icd11: "1A00"
  snomed: "386661006"
  loinc: "8310-5"
  preventive: "Rest."
- disease: jaundice
  namaste: "NAM030"
  icd11: "ME10.1"
  snomed: "18165001"
  loinc: "1975-2"
  preventive: "Boil drinking water."
"#;

    fn entry(key: &str) -> TerminologyEntry {
        TerminologyEntry {
            disease_key: key.into(),
            namaste: "NAM999".into(),
            icd11: "XX00".into(),
            snomed: "1".into(),
            loinc: "1-1".into(),
            preventive_advice: "None.".into(),
        }
    }

    #[test]
    fn builtin_table_keeps_declared_order() {
        let table = TerminologyTable::builtin();
        let keys: Vec<&str> = table
            .entries()
            .iter()
            .map(|e| e.disease_key.as_str())
            .collect();
        assert_eq!(keys, ["fever", "cough", "heartburn", "headache", "diabetes"]);
    }

    #[test]
    fn builtin_table_passes_validation() {
        let table = TerminologyTable::builtin();
        let rebuilt = TerminologyTable::new(table.entries().to_vec()).expect("valid table");
        assert_eq!(rebuilt, table);
    }

    #[test]
    fn new_lowercases_keys() {
        let table = TerminologyTable::new(vec![entry("Heartburn")]).unwrap();
        assert_eq!(table.entries()[0].disease_key, "heartburn");
        assert!(table.get("HEARTBURN").is_some());
    }

    #[test]
    fn new_rejects_duplicate_keys_ignoring_case() {
        let err = TerminologyTable::new(vec![entry("fever"), entry("FEVER")]).unwrap_err();
        match err {
            TerminologyError::InvalidInput(msg) => assert!(msg.contains("fever")),
            other => panic!("expected InvalidInput error, got {other:?}"),
        }
    }

    #[test]
    fn new_rejects_blank_key() {
        assert!(matches!(
            TerminologyTable::new(vec![entry("  ")]),
            Err(TerminologyError::InvalidInput(_))
        ));
    }

    #[test]
    fn parse_reads_entries_in_order() {
        let table = TerminologyTable::parse(SAMPLE).expect("parse yaml");
        assert_eq!(table.len(), 2);
        assert_eq!(table.entries()[0].disease_key, "fever");
        assert_eq!(table.entries()[1].icd11, "ME10.1");
        assert_eq!(table.entries()[1].preventive_advice, "Boil drinking water.");
    }

    #[test]
    fn parse_rejects_unknown_keys() {
        let input = r#"- disease: fever
  namaste: "NAM001"
  icd11: "1A00"
  snomed: "386661006"
  loinc: "8310-5"
  preventive: "Rest."
  severity: high
"#;
        let err = TerminologyTable::parse(input).expect_err("should reject unknown key");
        match err {
            TerminologyError::Translation(msg) => assert!(msg.contains("severity")),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn parse_reports_missing_field() {
        let input = r#"- disease: fever
  namaste: "NAM001"
  icd11: "1A00"
  snomed: "386661006"
  preventive: "Rest."
"#;
        let err = TerminologyTable::parse(input).expect_err("should reject missing loinc");
        match err {
            TerminologyError::Translation(msg) => assert!(msg.contains("loinc")),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn render_output_parses_back() {
        let table = TerminologyTable::builtin();
        let yaml = table.render().expect("render table");
        assert_eq!(TerminologyTable::parse(&yaml).expect("reparse"), table);
    }

    #[test]
    fn lookup_searches_codes_and_advice() {
        let table = TerminologyTable::builtin();

        let by_code: Vec<&str> = table
            .lookup("nam00", DEFAULT_LOOKUP_LIMIT)
            .iter()
            .map(|e| e.disease_key.as_str())
            .collect();
        assert_eq!(by_code, ["fever", "cough", "headache"]);

        let by_advice: Vec<&str> = table
            .lookup("HYDRAT", DEFAULT_LOOKUP_LIMIT)
            .iter()
            .map(|e| e.disease_key.as_str())
            .collect();
        assert_eq!(by_advice, ["fever", "cough", "headache"]);
    }

    #[test]
    fn lookup_honours_limit_and_empty_filter() {
        let table = TerminologyTable::builtin();
        assert_eq!(table.lookup("", 2).len(), 2);
        assert_eq!(table.lookup("", DEFAULT_LOOKUP_LIMIT).len(), 5);
        assert!(table.lookup("malaria", DEFAULT_LOOKUP_LIMIT).is_empty());
    }

    #[test]
    fn find_by_code_is_exact_per_system() {
        let table = TerminologyTable::builtin();
        let found = table
            .find_by_code(CodeSystem::Snomed, "235719002")
            .expect("heartburn by snomed");
        assert_eq!(found.disease_key, "heartburn");
        assert!(table.find_by_code(CodeSystem::Icd11, "235719002").is_none());
        assert!(table.find_by_code(CodeSystem::Namaste, "nam001").is_none());
    }

    #[test]
    fn translate_maps_between_systems() {
        let table = TerminologyTable::builtin();
        assert_eq!(
            table.translate(CodeSystem::Namaste, "NAM020", CodeSystem::Icd11),
            Some("DA10")
        );
        assert_eq!(
            table.translate(CodeSystem::Icd11, "5A11", CodeSystem::Snomed),
            Some("44054006")
        );
        assert_eq!(
            table.translate(CodeSystem::Loinc, "8310-5", CodeSystem::Loinc),
            Some("8310-5")
        );
    }

    #[test]
    fn translate_unknown_or_wrong_system_code_is_none() {
        let table = TerminologyTable::builtin();
        assert_eq!(
            table.translate(CodeSystem::Namaste, "NAM999", CodeSystem::Icd11),
            None
        );
        assert_eq!(
            table.translate(CodeSystem::Snomed, "NAM001", CodeSystem::Icd11),
            None
        );
    }

    #[test]
    fn code_system_parses_case_insensitively() {
        assert_eq!("icd-11".parse::<CodeSystem>().unwrap(), CodeSystem::Icd11);
        assert_eq!("Namaste".parse::<CodeSystem>().unwrap(), CodeSystem::Namaste);
        assert!(matches!(
            "ATC".parse::<CodeSystem>(),
            Err(TerminologyError::UnknownCodeSystem(_))
        ));
        for system in CodeSystem::ALL {
            assert_eq!(system.to_string().parse::<CodeSystem>().unwrap(), system);
        }
    }
}
