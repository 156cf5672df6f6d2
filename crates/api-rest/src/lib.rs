//! # API REST
//!
//! REST API for the patient dashboard.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialisation, CORS, status codes)
//! - The current-patient stream the contacts panel reads from
//!
//! Uses `api-shared` for request/response types and `dashboard-core` for all decision logic.

#![warn(rust_2018_idioms)]

pub mod current_patient;

pub use current_patient::CurrentPatient;

use api_shared::{
    ContactsRes, CurrentPatientRes, ErrorRes, HealthRes, HealthService, HivSummaryLatestRes,
    HivSummaryRes, LoadCurrentPatientReq, PatientRes,
};
use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::Json,
    routing::{get, put},
    Router,
};
use dashboard_core::{
    ContactsService, CoreConfig, FileProvider, HivSummaryLatestService, PatientProvider,
    PatientUuid,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    provider: FileProvider,
    contacts: ContactsService<FileProvider>,
    hiv_summary: HivSummaryLatestService<FileProvider, FileProvider>,
    current: CurrentPatient,
}

impl AppState {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        let provider = FileProvider::new(cfg.clone());
        Self {
            contacts: ContactsService::new(provider.clone()),
            hiv_summary: HivSummaryLatestService::new(cfg, provider.clone(), provider.clone()),
            provider,
            current: CurrentPatient::new(),
        }
    }

    pub fn current_patient(&self) -> &CurrentPatient {
        &self.current
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        patient_contacts,
        hiv_summary_latest,
        load_current_patient,
        clear_current_patient,
        current_patient_contacts,
    ),
    components(schemas(
        HealthRes,
        PatientRes,
        ContactsRes,
        HivSummaryRes,
        ErrorRes,
        HivSummaryLatestRes,
        LoadCurrentPatientReq,
        CurrentPatientRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router, including Swagger UI at `/swagger-ui`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/patients/:uuid/contacts", get(patient_contacts))
        .route("/patients/:uuid/hiv-summary/latest", get(hiv_summary_latest))
        .route(
            "/current-patient",
            put(load_current_patient).delete(clear_current_patient),
        )
        .route("/current-patient/contacts", get(current_patient_contacts))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn parse_uuid(raw: &str) -> Result<PatientUuid, (StatusCode, &'static str)> {
    PatientUuid::parse(raw).map_err(|e| {
        tracing::debug!("Invalid patient UUID: {:?}", e);
        (StatusCode::BAD_REQUEST, "Invalid patient UUID")
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/patients/{uuid}/contacts",
    params(("uuid" = String, Path, description = "Patient UUID, hyphenated or plain")),
    responses(
        (status = 200, description = "Contacts display state; empty when the patient is unknown", body = ContactsRes),
        (status = 400, description = "Invalid patient UUID"),
        (status = 500, description = "Internal server error")
    )
)]
/// Contacts panel state for one patient.
async fn patient_contacts(
    State(state): State<AppState>,
    AxumPath(uuid): AxumPath<String>,
) -> Result<Json<ContactsRes>, (StatusCode, &'static str)> {
    let uuid = parse_uuid(&uuid)?;
    match state.contacts.contacts(&uuid) {
        Ok(display) => Ok(Json(ContactsRes::from(&display))),
        Err(e) => {
            tracing::error!("Load contacts error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/patients/{uuid}/hiv-summary/latest",
    params(("uuid" = String, Path, description = "Patient UUID, hyphenated or plain")),
    responses(
        (status = 200, description = "Latest HIV summary; load failures are listed in `errors`", body = HivSummaryLatestRes),
        (status = 400, description = "Invalid patient UUID")
    )
)]
/// Latest HIV summary and eligibility for one patient.
///
/// Provider failures do not change the status code; they are reported in the body.
async fn hiv_summary_latest(
    State(state): State<AppState>,
    AxumPath(uuid): AxumPath<String>,
) -> Result<Json<HivSummaryLatestRes>, (StatusCode, &'static str)> {
    let uuid = parse_uuid(&uuid)?;
    let view = state.hiv_summary.load(&uuid);
    Ok(Json(HivSummaryLatestRes::from(&view)))
}

#[utoipa::path(
    put,
    path = "/current-patient",
    request_body = LoadCurrentPatientReq,
    responses(
        (status = 200, description = "Patient loaded as current", body = CurrentPatientRes),
        (status = 400, description = "Invalid patient UUID"),
        (status = 404, description = "Patient not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Loads a patient and publishes it as the current patient.
async fn load_current_patient(
    State(state): State<AppState>,
    Json(req): Json<LoadCurrentPatientReq>,
) -> Result<Json<CurrentPatientRes>, (StatusCode, &'static str)> {
    let uuid = parse_uuid(&req.uuid)?;
    match state.provider.patient_by_uuid(&uuid) {
        Ok(Some(patient)) => {
            state.current.publish(Some(patient));
            Ok(Json(CurrentPatientRes {
                uuid: Some(uuid.to_string()),
            }))
        }
        Ok(None) => Err((StatusCode::NOT_FOUND, "Patient not found")),
        Err(e) => {
            tracing::error!("Load current patient error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

#[utoipa::path(
    delete,
    path = "/current-patient",
    responses(
        (status = 200, description = "Current patient cleared", body = CurrentPatientRes)
    )
)]
async fn clear_current_patient(State(state): State<AppState>) -> Json<CurrentPatientRes> {
    state.current.publish(None);
    Json(CurrentPatientRes { uuid: None })
}

#[utoipa::path(
    get,
    path = "/current-patient/contacts",
    responses(
        (status = 200, description = "Contacts for the current patient; empty when none is loaded", body = ContactsRes)
    )
)]
async fn current_patient_contacts(State(state): State<AppState>) -> Json<ContactsRes> {
    Json(ContactsRes::from(&state.current.contacts()))
}
