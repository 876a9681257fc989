//! Diagnosis note matching.
//!
//! A note matches an entry when the entry's lowercase key occurs anywhere in the lowercased
//! note. Matching ignores word boundaries, so a key embedded in a longer word still matches.
//! No other normalisation is applied.

use crate::table::{TerminologyEntry, TerminologyTable};

/// Scan `note` for every disease key in `table`.
///
/// Entries are returned in table order, each at most once. An empty result is a normal
/// outcome, not an error.
pub fn match_note<'t>(note: &str, table: &'t TerminologyTable) -> Vec<&'t TerminologyEntry> {
    let haystack = note.to_lowercase();
    table
        .entries()
        .iter()
        .filter(|entry| haystack.contains(&entry.disease_key.to_lowercase()))
        .collect()
}

impl TerminologyTable {
    /// Method form of [`match_note`].
    pub fn match_note(&self, note: &str) -> Vec<&TerminologyEntry> {
        match_note(note, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys<'a>(matches: &[&'a TerminologyEntry]) -> Vec<&'a str> {
        matches.iter().map(|e| e.disease_key.as_str()).collect()
    }

    fn custom_table(keys: &[&str]) -> TerminologyTable {
        TerminologyTable::new(
            keys.iter()
                .map(|key| TerminologyEntry {
                    disease_key: (*key).into(),
                    namaste: format!("NAM-{key}"),
                    icd11: "X".into(),
                    snomed: "0".into(),
                    loinc: "0-0".into(),
                    preventive_advice: String::new(),
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn fever_and_cough_match_with_their_codes() {
        let table = TerminologyTable::builtin();
        let matches = match_note("patient has fever and cough", &table);
        assert_eq!(keys(&matches), ["fever", "cough"]);

        let fever = matches[0];
        assert_eq!(
            (
                fever.namaste.as_str(),
                fever.icd11.as_str(),
                fever.snomed.as_str(),
                fever.loinc.as_str()
            ),
            ("NAM001", "1A00", "386661006", "8310-5")
        );
        let cough = matches[1];
        assert_eq!(
            (
                cough.namaste.as_str(),
                cough.icd11.as_str(),
                cough.snomed.as_str(),
                cough.loinc.as_str()
            ),
            ("NAM002", "RA01", "49727002", "10154-3")
        );
    }

    #[test]
    fn unrecognised_note_yields_nothing() {
        let table = TerminologyTable::builtin();
        assert!(match_note("feeling tired", &table).is_empty());
        assert!(match_note("", &table).is_empty());
    }

    #[test]
    fn matching_ignores_case() {
        let table = TerminologyTable::builtin();
        assert_eq!(
            keys(&match_note("Severe HEARTBURN after meals", &table)),
            ["heartburn"]
        );
        for note in ["FEVER", "Fever", "fever"] {
            assert_eq!(keys(&match_note(note, &table)), ["fever"]);
        }
    }

    #[test]
    fn results_follow_table_order_not_note_order() {
        let table = TerminologyTable::builtin();
        let matches = match_note("diabetes with recurring headache, some cough, fever", &table);
        assert_eq!(keys(&matches), ["fever", "cough", "headache", "diabetes"]);
    }

    #[test]
    fn repeated_mentions_match_once() {
        let table = TerminologyTable::builtin();
        let matches = match_note("fever, fever again, still FEVER", &table);
        assert_eq!(keys(&matches), ["fever"]);
    }

    #[test]
    fn keys_match_inside_longer_words() {
        let table = custom_table(&["ache", "cold"]);
        assert_eq!(keys(&match_note("backache since Monday", &table)), ["ache"]);
        assert_eq!(keys(&match_note("scolding pain", &table)), ["cold"]);

        let builtin = TerminologyTable::builtin();
        assert_eq!(keys(&match_note("feverish", &builtin)), ["fever"]);
    }

    #[test]
    fn punctuation_and_whitespace_are_not_normalised() {
        let table = custom_table(&["chest pain"]);
        assert!(match_note("chest-pain", &table).is_empty());
        assert!(match_note("chest  pain", &table).is_empty());
        assert_eq!(keys(&match_note("Chest Pain.", &table)), ["chest pain"]);
    }

    #[test]
    fn method_form_agrees_with_function() {
        let table = TerminologyTable::builtin();
        let note = "cough and heartburn";
        assert_eq!(table.match_note(note), match_note(note, &table));
    }
}
