//! # API REST
//!
//! REST API implementation for AYUNEX.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, status codes, CORS)
//!
//! Uses `api-shared` for request/response types and `ayunex-core` for the operations.

#![warn(rust_2018_idioms)]

use api_shared::dto;
use api_shared::HealthService;
use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use ayunex_core::{
    CodeSystem, Diagnosis, Patient, PatientError, PatientService, TerminologyEntry,
    DEFAULT_LOOKUP_LIMIT,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    patient_service: PatientService,
}

impl AppState {
    pub fn new(patient_service: PatientService) -> Self {
        Self { patient_service }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_patients,
        create_patient,
        get_patient,
        list_terminology,
        lookup_terminology,
        get_terminology_code,
        match_note,
        translate_code,
    ),
    components(schemas(
        dto::HealthRes,
        dto::ErrorRes,
        dto::CreatePatientReq,
        dto::CreatePatientRes,
        dto::PatientSummary,
        dto::ListPatientsRes,
        dto::DiagnosisRes,
        dto::PatientDetailRes,
        dto::TerminologyEntryRes,
        dto::ListTerminologyRes,
        dto::MatchNoteReq,
        dto::MatchNoteRes,
        dto::TranslateReq,
        dto::TranslateRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with all routes, Swagger UI and CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/patients", get(list_patients).post(create_patient))
        .route("/patients/:id", get(get_patient))
        .route("/terminology", get(list_terminology))
        .route("/terminology/lookup", get(lookup_terminology))
        .route("/terminology/match", post(match_note))
        .route("/terminology/translate", post(translate_code))
        .route("/terminology/codes/:system/:code", get(get_terminology_code))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

type ApiError = (StatusCode, Json<dto::ErrorRes>);

fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(dto::ErrorRes {
            error: message.into(),
        }),
    )
}

fn patient_error(err: PatientError) -> ApiError {
    match err {
        PatientError::MissingRequiredField(field) => {
            tracing::debug!(field, "rejected patient record");
            error_response(StatusCode::BAD_REQUEST, format!("Missing data: {field}"))
        }
        PatientError::NotFound(_) => error_response(StatusCode::NOT_FOUND, "Patient not found"),
        other => {
            tracing::error!("Patient service error: {:?}", other);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

fn patient_summary(patient: &Patient) -> dto::PatientSummary {
    dto::PatientSummary {
        id: patient.id,
        name: patient.name.clone(),
        age: patient.age,
        gender: patient.gender.clone(),
    }
}

fn diagnosis_res(diagnosis: &Diagnosis) -> dto::DiagnosisRes {
    dto::DiagnosisRes {
        disease_name: diagnosis.disease_name.clone(),
        namaste: diagnosis.namaste.clone(),
        icd11: diagnosis.icd11.clone(),
        snomed: diagnosis.snomed.clone(),
        loinc: diagnosis.loinc.clone(),
        preventive: diagnosis.preventive.clone(),
        timestamp: diagnosis.formatted_timestamp(),
    }
}

fn terminology_entry_res(entry: &TerminologyEntry) -> dto::TerminologyEntryRes {
    dto::TerminologyEntryRes {
        disease: entry.disease_key.clone(),
        namaste: entry.namaste.clone(),
        icd11: entry.icd11.clone(),
        snomed: entry.snomed.clone(),
        loinc: entry.loinc.clone(),
        preventive: entry.preventive_advice.clone(),
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = dto::HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// This endpoint is used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<dto::HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "List of patients", body = dto::ListPatientsRes),
        (status = 500, description = "Internal server error", body = dto::ErrorRes)
    )
)]
/// List all patients in the system, ordered by id.
///
/// # Errors
/// Returns `500 Internal Server Error` if the store query fails.
#[axum::debug_handler]
async fn list_patients(
    State(state): State<AppState>,
) -> Result<Json<dto::ListPatientsRes>, ApiError> {
    let patients = state
        .patient_service
        .list_patients()
        .map_err(patient_error)?;
    Ok(Json(dto::ListPatientsRes {
        patients: patients.iter().map(patient_summary).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = dto::CreatePatientReq,
    responses(
        (status = 201, description = "Patient created", body = dto::CreatePatientRes),
        (status = 400, description = "Missing name or diagnosis", body = dto::ErrorRes),
        (status = 500, description = "Internal server error", body = dto::ErrorRes)
    )
)]
/// Create a new patient record
///
/// Stores the patient, scans the diagnosis note for known disease keywords and records one
/// coded diagnosis per match.
///
/// # Errors
/// Returns `400 Bad Request` if `name` or `diagnosis` is missing or blank, and
/// `500 Internal Server Error` if the store write fails.
#[axum::debug_handler]
async fn create_patient(
    State(state): State<AppState>,
    Json(req): Json<dto::CreatePatientReq>,
) -> Result<(StatusCode, Json<dto::CreatePatientRes>), ApiError> {
    let record = state
        .patient_service
        .create_record(
            req.name.as_deref(),
            req.age,
            req.gender.as_deref(),
            req.diagnosis.as_deref(),
        )
        .map_err(patient_error)?;

    Ok((
        StatusCode::CREATED,
        Json(dto::CreatePatientRes {
            patient: patient_summary(&record.patient),
            matched: record
                .diagnoses
                .iter()
                .map(|d| d.disease_name.clone())
                .collect(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = i64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient with diagnosis history", body = dto::PatientDetailRes),
        (status = 404, description = "Patient not found", body = dto::ErrorRes),
        (status = 500, description = "Internal server error", body = dto::ErrorRes)
    )
)]
/// Fetch one patient and its diagnosis history, oldest first.
#[axum::debug_handler]
async fn get_patient(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> Result<Json<dto::PatientDetailRes>, ApiError> {
    let record = state
        .patient_service
        .get_patient(id)
        .map_err(patient_error)?;

    Ok(Json(dto::PatientDetailRes {
        id: record.patient.id,
        name: record.patient.name,
        age: record.patient.age,
        gender: record.patient.gender,
        diagnoses: record.diagnoses.iter().map(diagnosis_res).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/terminology",
    responses(
        (status = 200, description = "Loaded terminology table", body = dto::ListTerminologyRes)
    )
)]
/// The terminology table in declared order.
#[axum::debug_handler]
async fn list_terminology(State(state): State<AppState>) -> Json<dto::ListTerminologyRes> {
    Json(dto::ListTerminologyRes {
        entries: state
            .patient_service
            .terminology()
            .entries()
            .iter()
            .map(terminology_entry_res)
            .collect(),
    })
}

/// Query parameters for terminology lookup.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LookupQuery {
    /// Case-insensitive text matched against keys, codes and advice.
    filter: Option<String>,
    /// Maximum number of entries (default 25).
    #[serde(rename = "_count")]
    count: Option<usize>,
}

#[utoipa::path(
    get,
    path = "/terminology/lookup",
    params(LookupQuery),
    responses(
        (status = 200, description = "Matching entries", body = dto::ListTerminologyRes)
    )
)]
/// Search the terminology table.
#[axum::debug_handler]
async fn lookup_terminology(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> Json<dto::ListTerminologyRes> {
    let filter = query.filter.unwrap_or_default();
    let limit = query.count.unwrap_or(DEFAULT_LOOKUP_LIMIT);
    Json(dto::ListTerminologyRes {
        entries: state
            .patient_service
            .terminology()
            .lookup(&filter, limit)
            .into_iter()
            .map(terminology_entry_res)
            .collect(),
    })
}

#[utoipa::path(
    get,
    path = "/terminology/codes/{system}/{code}",
    params(
        ("system" = String, Path, description = "NAMASTE, ICD11, SNOMED or LOINC"),
        ("code" = String, Path, description = "Code within the system")
    ),
    responses(
        (status = 200, description = "Entry carrying the code", body = dto::TerminologyEntryRes),
        (status = 404, description = "Unknown system or code", body = dto::ErrorRes)
    )
)]
/// Find the entry that carries a given code.
#[axum::debug_handler]
async fn get_terminology_code(
    State(state): State<AppState>,
    AxumPath((system, code)): AxumPath<(String, String)>,
) -> Result<Json<dto::TerminologyEntryRes>, ApiError> {
    let system: CodeSystem = system
        .parse()
        .map_err(|_| error_response(StatusCode::NOT_FOUND, "Unknown system"))?;

    state
        .patient_service
        .terminology()
        .find_by_code(system, &code)
        .map(|entry| Json(terminology_entry_res(entry)))
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "Concept not found"))
}

#[utoipa::path(
    post,
    path = "/terminology/match",
    request_body = dto::MatchNoteReq,
    responses(
        (status = 200, description = "Entries matched in the note", body = dto::MatchNoteRes)
    )
)]
/// Run the diagnosis matcher over a note without storing anything.
#[axum::debug_handler]
async fn match_note(
    State(state): State<AppState>,
    Json(req): Json<dto::MatchNoteReq>,
) -> Json<dto::MatchNoteRes> {
    Json(dto::MatchNoteRes {
        matches: state
            .patient_service
            .match_note(&req.text)
            .into_iter()
            .map(terminology_entry_res)
            .collect(),
    })
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[utoipa::path(
    post,
    path = "/terminology/translate",
    request_body = dto::TranslateReq,
    responses(
        (status = 200, description = "Code mapped into the target system", body = dto::TranslateRes),
        (status = 400, description = "Missing field or unknown system", body = dto::ErrorRes)
    )
)]
/// Translate a code from one coding system into another.
///
/// An unknown code is not an error: the response carries a `null` target.
#[axum::debug_handler]
async fn translate_code(
    State(state): State<AppState>,
    Json(req): Json<dto::TranslateReq>,
) -> Result<Json<dto::TranslateRes>, ApiError> {
    let (Some(code), Some(from), Some(to)) =
        (required(req.code), required(req.from), required(req.to))
    else {
        return Err(error_response(StatusCode::BAD_REQUEST, "Missing code/from/to"));
    };

    let parse_system = |name: &str| {
        name.parse::<CodeSystem>()
            .map_err(|_| error_response(StatusCode::BAD_REQUEST, "Unknown system"))
    };
    let from_system = parse_system(&from)?;
    let to_system = parse_system(&to)?;

    let terminology = state.patient_service.terminology();
    let entry = terminology.find_by_code(from_system, &code);
    let target = terminology.translate(from_system, &code, to_system);

    Ok(Json(dto::TranslateRes {
        target: target.map(str::to_owned),
        disease: entry.map(|e| e.disease_key.clone()),
        code,
        from: from_system.to_string(),
        to: to_system.to_string(),
    }))
}
