//! JSON request and response bodies.
//!
//! Field names follow the wire contract clients already rely on, including the upper-case
//! coding-system keys (`NAMASTE`, `ICD11`, `SNOMED`, `LOINC`).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Body of an error response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

/// New patient submitted by a doctor.
///
/// `name` and `diagnosis` are required; they are optional here so that a missing field is
/// reported as a client error by the service instead of a body rejection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreatePatientReq {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    /// Free-text diagnosis note scanned for disease keywords.
    pub diagnosis: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PatientSummary {
    pub id: i64,
    pub name: String,
    pub age: Option<u32>,
    pub gender: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreatePatientRes {
    pub patient: PatientSummary,
    /// Disease keys matched in the note, in table order.
    pub matched: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListPatientsRes {
    pub patients: Vec<PatientSummary>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiagnosisRes {
    pub disease_name: String,
    #[serde(rename = "NAMASTE")]
    pub namaste: String,
    #[serde(rename = "ICD11")]
    pub icd11: String,
    #[serde(rename = "SNOMED")]
    pub snomed: String,
    #[serde(rename = "LOINC")]
    pub loinc: String,
    pub preventive: String,
    /// `YYYY-MM-DD HH:MM`, UTC.
    pub timestamp: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PatientDetailRes {
    pub id: i64,
    pub name: String,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub diagnoses: Vec<DiagnosisRes>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TerminologyEntryRes {
    pub disease: String,
    #[serde(rename = "NAMASTE")]
    pub namaste: String,
    #[serde(rename = "ICD11")]
    pub icd11: String,
    #[serde(rename = "SNOMED")]
    pub snomed: String,
    #[serde(rename = "LOINC")]
    pub loinc: String,
    pub preventive: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListTerminologyRes {
    pub entries: Vec<TerminologyEntryRes>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MatchNoteReq {
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MatchNoteRes {
    pub matches: Vec<TerminologyEntryRes>,
}

/// Code translation request.
///
/// All three fields are required; they are optional here so that a missing one is reported
/// as a client error instead of a body rejection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct TranslateReq {
    pub code: Option<String>,
    /// Source system: NAMASTE, ICD11, SNOMED or LOINC.
    pub from: Option<String>,
    /// Target system: NAMASTE, ICD11, SNOMED or LOINC.
    pub to: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TranslateRes {
    pub code: String,
    pub from: String,
    pub to: String,
    /// Mapped code, `null` when no entry carries `code` in `from`.
    pub target: Option<String>,
    /// Disease key of the entry the mapping came from.
    pub disease: Option<String>,
}
