//! Embedded backend API served from an in-memory dataset.
//!
//! Mirrors the remote API's routes and its `{"message": ...}` error shape,
//! so the `/api` gateway can be pointed at this same server.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use medibusca_core::directory::Params;
use medibusca_core::text::non_empty;
use medibusca_core::{ClinicsQuery, CoreError, Directory, DoctorsQuery, SearchDoctorsQuery};
use serde::Serialize;

type Shared = Arc<Directory>;

#[derive(Serialize)]
struct MessageBody {
    message: String,
}

/// Backend-style error response
struct DirectoryError(CoreError);

impl From<CoreError> for DirectoryError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for DirectoryError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CoreError::Validation(_) => StatusCode::BAD_REQUEST,
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Directory query failed");
        }
        let body = MessageBody {
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type DirectoryResult = Result<Response, DirectoryError>;

fn param<'a>(params: &'a Params, name: &str) -> Option<&'a str> {
    non_empty(params.get(name).map(String::as_str))
}

async fn search_doctors(State(dir): State<Shared>, Query(params): Query<Params>) -> DirectoryResult {
    let query = SearchDoctorsQuery::from_params(&params)?;
    Ok(Json(dir.search_doctors(&query)?).into_response())
}

async fn clinics(State(dir): State<Shared>, Query(params): Query<Params>) -> DirectoryResult {
    let query = ClinicsQuery::from_params(&params)?;
    Ok(Json(dir.list_clinics(&query)?).into_response())
}

async fn doctors(State(dir): State<Shared>, Query(params): Query<Params>) -> DirectoryResult {
    let query = DoctorsQuery::from_params(&params)?;
    Ok(Json(dir.list_doctors(&query)?).into_response())
}

async fn specialties(State(dir): State<Shared>, Query(params): Query<Params>) -> DirectoryResult {
    Ok(Json(dir.list_specialties(param(&params, "especialidadId"))).into_response())
}

async fn subspecialties(State(dir): State<Shared>, Query(params): Query<Params>) -> DirectoryResult {
    Ok(Json(dir.list_subspecialties(param(&params, "especialidadId"))).into_response())
}

async fn insurers(State(dir): State<Shared>, Query(params): Query<Params>) -> DirectoryResult {
    Ok(Json(dir.list_insurers(param(&params, "seguroId"))).into_response())
}

async fn insurer_clinics(
    State(dir): State<Shared>,
    Query(params): Query<Params>,
) -> DirectoryResult {
    Ok(Json(dir.list_clinics_by_insurer(param(&params, "seguroId"))?).into_response())
}

/// Routes of the embedded backend, bound to `directory`
pub fn directory_routes(directory: Directory) -> Router {
    tracing::info!(
        clinics = directory.clinics.len(),
        doctors = directory.doctors.len(),
        specialties = directory.specialties.len(),
        "Serving embedded directory"
    );
    for missing in directory.dangling_clinic_refs() {
        tracing::warn!(clinica_id = %missing, "Doctor references unknown clinic");
    }

    Router::new()
        .route("/search/doctors", get(search_doctors))
        .route("/clinics", get(clinics))
        .route("/doctors", get(doctors))
        .route("/especialidades", get(specialties))
        .route("/subespecialidades", get(subspecialties))
        .route("/seguros", get(insurers))
        .route("/seguros-clinicas", get(insurer_clinics))
        .with_state(Arc::new(directory))
}
