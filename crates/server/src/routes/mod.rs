pub mod ai;
pub mod directory;
pub mod docs;
pub mod health;
pub mod metrics;
pub mod proxy;

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

/// Routes under `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/search/doctors", get(proxy::search_doctors))
        .route("/search/clinics", get(proxy::search_clinics))
        .route("/clinics", get(proxy::clinics))
        .route("/doctors", get(proxy::doctors))
        .route("/especialidades", get(proxy::specialties))
        .route(
            "/especialidades/subespecialidades",
            get(proxy::subspecialties),
        )
        .route("/seguros", get(proxy::insurers))
        .route("/ubigeo", get(proxy::ubigeo))
        .route("/docs", get(docs::get))
        .route("/symptoms", post(ai::symptoms))
        .route("/search", post(ai::search))
        .route("/chat", post(ai::chat))
}
