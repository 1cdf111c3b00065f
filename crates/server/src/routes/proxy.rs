//! Gateway handlers forwarding whitelisted parameters to the backend API

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Query, State},
};
use medibusca_core::districts::{self, District};
use medibusca_core::page::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use medibusca_core::text::non_empty;
use medibusca_core::{DoctorCard, Page, PageRequest, SearchFilters, SearchResults};
use serde_json::Value as JsonValue;

use crate::AppState;
use crate::error::AppError;
use crate::upstream::UpstreamClient;

type Params = HashMap<String, String>;

/// Which query parameters a route passes through
struct Forward {
    path: &'static str,
    required: &'static [&'static str],
    missing: &'static str,
    paged: bool,
    optional: &'static [&'static str],
}

const SEARCH_DOCTORS: Forward = Forward {
    path: "/search/doctors",
    required: &["ubigeoId", "especialidadId"],
    missing: "ubigeoId and especialidadId are required",
    paged: true,
    optional: &["seguroId"],
};

const CLINICS: Forward = Forward {
    path: "/clinics",
    required: &[],
    missing: "",
    paged: true,
    optional: &["ubigeoId", "especialidadId", "seguroId", "clinicaId"],
};

const DOCTORS: Forward = Forward {
    path: "/doctors",
    required: &[],
    missing: "",
    paged: true,
    optional: &["especialidadId", "clinicaId", "doctorId"],
};

const SPECIALTIES: Forward = Forward {
    path: "/especialidades",
    required: &[],
    missing: "",
    paged: false,
    optional: &["especialidadId"],
};

const SUBSPECIALTIES: Forward = Forward {
    path: "/subespecialidades",
    required: &["especialidadId"],
    missing: "especialidadId is required",
    paged: false,
    optional: &[],
};

const INSURERS: Forward = Forward {
    path: "/seguros",
    required: &[],
    missing: "",
    paged: false,
    optional: &["seguroId"],
};

fn value<'a>(params: &'a Params, name: &str) -> Option<&'a str> {
    non_empty(params.get(name).map(String::as_str))
}

fn upstream(state: &AppState) -> Result<&UpstreamClient, AppError> {
    state
        .upstream
        .as_ref()
        .ok_or_else(AppError::upstream_not_configured)
}

/// Build the outgoing query: required values, then paging, then optional
/// values that are present. Everything else the client sent is dropped.
fn whitelist(params: &Params, route: &Forward) -> Result<Vec<(&'static str, String)>, AppError> {
    let mut query = Vec::new();
    for name in route.required {
        let value =
            value(params, name).ok_or_else(|| AppError::BadRequest(route.missing.to_string()))?;
        query.push((*name, value.to_string()));
    }
    if route.paged {
        let page = value(params, "page").map_or_else(|| DEFAULT_PAGE.to_string(), str::to_string);
        let page_size = value(params, "pageSize")
            .map_or_else(|| DEFAULT_PAGE_SIZE.to_string(), str::to_string);
        query.push(("page", page));
        query.push(("pageSize", page_size));
    }
    for name in route.optional {
        if let Some(value) = value(params, name) {
            query.push((*name, value.to_string()));
        }
    }
    Ok(query)
}

async fn forward(
    state: &AppState,
    route: &Forward,
    params: &Params,
) -> Result<Json<JsonValue>, AppError> {
    let upstream = upstream(state)?;
    let query = whitelist(params, route)?;
    let body = upstream.get_json(route.path, &query).await?;
    Ok(Json(body))
}

/// GET /api/search/doctors
pub async fn search_doctors(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<JsonValue>, AppError> {
    forward(&state, &SEARCH_DOCTORS, &params).await
}

/// GET /api/search/clinics - doctor search regrouped by clinic
///
/// With no filter selected nothing is fetched and an empty result is returned.
pub async fn search_clinics(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<SearchResults>, AppError> {
    let upstream = upstream(&state)?;
    let page = PageRequest::parse(value(&params, "page"), value(&params, "pageSize"))?;
    let filters = SearchFilters {
        ubigeo_id: value(&params, "ubigeoId").map(str::to_string),
        especialidad_id: value(&params, "especialidadId").map(str::to_string),
        seguro_id: value(&params, "seguroId").map(str::to_string),
        page: page.page,
        page_size: page.page_size,
        ..SearchFilters::default()
    };

    if !filters.is_ready() {
        return Ok(Json(SearchResults::from(Page::slice(Vec::new(), page))));
    }
    if filters.ubigeo_id.is_none() || filters.especialidad_id.is_none() {
        return Err(AppError::BadRequest(SEARCH_DOCTORS.missing.to_string()));
    }

    let body = upstream
        .get_json(SEARCH_DOCTORS.path, &filters.query_pairs())
        .await?;
    let page: Page<DoctorCard> = serde_json::from_value(body)
        .map_err(|e| AppError::Internal(format!("unexpected search response: {}", e)))?;

    let results = SearchResults::from(page);
    tracing::debug!(
        total = results.total,
        clinics = results.clinics.len(),
        "Grouped search results"
    );
    Ok(Json(results))
}

/// GET /api/clinics
pub async fn clinics(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<JsonValue>, AppError> {
    forward(&state, &CLINICS, &params).await
}

/// GET /api/doctors
pub async fn doctors(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<JsonValue>, AppError> {
    forward(&state, &DOCTORS, &params).await
}

/// GET /api/especialidades
pub async fn specialties(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<JsonValue>, AppError> {
    forward(&state, &SPECIALTIES, &params).await
}

/// GET /api/especialidades/subespecialidades
pub async fn subspecialties(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<JsonValue>, AppError> {
    forward(&state, &SUBSPECIALTIES, &params).await
}

/// GET /api/seguros
pub async fn insurers(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<JsonValue>, AppError> {
    forward(&state, &INSURERS, &params).await
}

/// GET /api/ubigeo - built-in Lima/Callao district list
///
/// `codigo` narrows the list to one district; `orden=nombre` sorts by name
/// instead of ubigeo order.
pub async fn ubigeo(Query(params): Query<Params>) -> Json<Vec<District>> {
    if let Some(code) = value(&params, "codigo") {
        return Json(districts::find_by_code(code).into_iter().cloned().collect());
    }
    match value(&params, "orden") {
        Some("nombre") => Json(districts::sorted()),
        _ => Json(districts::all().to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_search_whitelist_order_and_defaults() {
        let query = whitelist(
            &params(&[
                ("especialidadId", "8"),
                ("ubigeoId", "150122"),
                ("seguroId", "RIMAC"),
                ("rimacEnsured", "true"),
            ]),
            &SEARCH_DOCTORS,
        )
        .unwrap();
        assert_eq!(
            query,
            vec![
                ("ubigeoId", "150122".to_string()),
                ("especialidadId", "8".to_string()),
                ("page", "1".to_string()),
                ("pageSize", "10".to_string()),
                ("seguroId", "RIMAC".to_string()),
            ]
        );
    }

    #[test]
    fn test_blank_required_value_is_missing() {
        let err = whitelist(
            &params(&[("ubigeoId", "150122"), ("especialidadId", " ")]),
            &SEARCH_DOCTORS,
        )
        .unwrap_err();
        assert_eq!(err.message(), "ubigeoId and especialidadId are required");
    }

    #[test]
    fn test_unpaged_route_forwards_only_known_params() {
        let query = whitelist(
            &params(&[("especialidadId", "8"), ("page", "3")]),
            &SUBSPECIALTIES,
        )
        .unwrap();
        assert_eq!(query, vec![("especialidadId", "8".to_string())]);

        let query = whitelist(&params(&[("page", "2"), ("foo", "bar")]), &CLINICS).unwrap();
        assert_eq!(
            query,
            vec![("page", "2".to_string()), ("pageSize", "10".to_string())]
        );
    }

    #[tokio::test]
    async fn test_ubigeo_ordering_and_lookup() {
        let Json(by_code) = ubigeo(Query(params(&[]))).await;
        assert_eq!(by_code[0].code, "150101");

        let Json(by_name) = ubigeo(Query(params(&[("orden", "nombre")]))).await;
        assert_eq!(by_name.len(), 50);
        assert_eq!(by_name[0].name, "Ancón");

        let Json(one) = ubigeo(Query(params(&[("codigo", "150122")]))).await;
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].name, "Miraflores");

        let Json(none) = ubigeo(Query(params(&[("codigo", "999999")]))).await;
        assert!(none.is_empty());
    }
}
