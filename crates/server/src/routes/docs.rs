//! API reference served at `/api/docs`

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ParamDoc {
    name: &'static str,
    required: bool,
    description: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDoc {
    method: &'static str,
    path: &'static str,
    description: &'static str,
    params: Vec<ParamDoc>,
    example: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ApiDocs {
    title: &'static str,
    routes: Vec<RouteDoc>,
}

const fn required(name: &'static str, description: &'static str) -> ParamDoc {
    ParamDoc {
        name,
        required: true,
        description,
    }
}

const fn optional(name: &'static str, description: &'static str) -> ParamDoc {
    ParamDoc {
        name,
        required: false,
        description,
    }
}

fn paging() -> [ParamDoc; 2] {
    [
        optional("page", "Número de página (por defecto 1)"),
        optional("pageSize", "Resultados por página (por defecto 10)"),
    ]
}

fn route(
    method: &'static str,
    path: &'static str,
    description: &'static str,
    params: impl IntoIterator<Item = ParamDoc>,
    example: &'static str,
) -> RouteDoc {
    RouteDoc {
        method,
        path,
        description,
        params: params.into_iter().collect(),
        example,
    }
}

pub fn api_docs() -> ApiDocs {
    let routes = vec![
        route(
            "GET",
            "/api/search/doctors",
            "Busca doctores por distrito y especialidad",
            [
                required("ubigeoId", "Código ubigeo del distrito"),
                required("especialidadId", "ID de la especialidad"),
                optional("seguroId", "ID del seguro"),
            ]
            .into_iter()
            .chain(paging()),
            "/api/search/doctors?ubigeoId=150122&especialidadId=8&page=1&pageSize=10",
        ),
        route(
            "GET",
            "/api/search/clinics",
            "Misma búsqueda agrupada por clínica; sin filtros devuelve un resultado vacío",
            [
                required("ubigeoId", "Código ubigeo del distrito"),
                required("especialidadId", "ID de la especialidad"),
                optional("seguroId", "ID del seguro"),
            ]
            .into_iter()
            .chain(paging()),
            "/api/search/clinics?ubigeoId=150122&especialidadId=8",
        ),
        route(
            "GET",
            "/api/clinics",
            "Lista clínicas; clinicaId excluye los demás filtros",
            [
                optional("ubigeoId", "Código ubigeo del distrito"),
                optional("especialidadId", "ID de la especialidad"),
                optional("seguroId", "ID del seguro"),
                optional("clinicaId", "ID de la clínica"),
            ]
            .into_iter()
            .chain(paging()),
            "/api/clinics?ubigeoId=150122&page=1&pageSize=10",
        ),
        route(
            "GET",
            "/api/doctors",
            "Lista doctores",
            [
                optional("especialidadId", "ID de la especialidad"),
                optional("clinicaId", "ID de la clínica"),
                optional("doctorId", "ID del doctor"),
            ]
            .into_iter()
            .chain(paging()),
            "/api/doctors?clinicaId=CLIN-001",
        ),
        route(
            "GET",
            "/api/especialidades",
            "Catálogo de especialidades",
            [optional("especialidadId", "ID de la especialidad")],
            "/api/especialidades",
        ),
        route(
            "GET",
            "/api/especialidades/subespecialidades",
            "Subespecialidades de una especialidad",
            [required("especialidadId", "ID de la especialidad")],
            "/api/especialidades/subespecialidades?especialidadId=8",
        ),
        route(
            "GET",
            "/api/seguros",
            "Catálogo de seguros",
            [optional("seguroId", "ID del seguro")],
            "/api/seguros",
        ),
        route(
            "GET",
            "/api/ubigeo",
            "Distritos de Lima Metropolitana y Callao",
            [
                optional("codigo", "Código ubigeo de un distrito concreto"),
                optional("orden", "\"nombre\" ordena por nombre en lugar de por código"),
            ],
            "/api/ubigeo?orden=nombre",
        ),
        route(
            "POST",
            "/api/symptoms",
            "Recomienda una especialidad y un nivel de urgencia según los síntomas. Con Accept: text/event-stream responde con eventos partial, result o error",
            [required("symptoms", "Descripción de los síntomas (cuerpo JSON)")],
            r#"{"symptoms": "Dolor en el pecho al hacer ejercicio"}"#,
        ),
        route(
            "POST",
            "/api/search",
            "Extrae especialidad y distrito de una consulta en texto libre",
            [required("query", "Consulta del usuario (cuerpo JSON o texto)")],
            r#"{"query": "Busco un cardiólogo en Miraflores"}"#,
        ),
        route(
            "POST",
            "/api/chat",
            "Asistente conversacional; responde con texto en streaming",
            [required("messages", "Historial [{role, content}] terminado en un mensaje del usuario")],
            r#"{"messages": [{"role": "user", "content": "¿Qué seguros aceptan en Miraflores?"}]}"#,
        ),
        route(
            "GET",
            "/api/docs",
            "Esta referencia de la API",
            Vec::new(),
            "/api/docs",
        ),
    ];

    ApiDocs {
        title: "MediBusca API",
        routes,
    }
}

/// GET /api/docs
pub async fn get() -> Json<ApiDocs> {
    Json(api_docs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_route_has_an_example() {
        let docs = api_docs();
        assert_eq!(docs.routes.len(), 12);
        for route in &docs.routes {
            assert!(!route.example.is_empty(), "{} lacks an example", route.path);
        }
    }

    #[test]
    fn test_docs_list_themselves() {
        let docs = api_docs();
        assert!(docs.routes.iter().any(|r| r.path == "/api/docs" && r.method == "GET"));
    }

    #[test]
    fn test_required_params_are_marked() {
        let docs = api_docs();
        let sub = docs
            .routes
            .iter()
            .find(|r| r.path == "/api/especialidades/subespecialidades")
            .unwrap();
        assert_eq!(sub.params.len(), 1);
        assert!(sub.params[0].required);
    }
}
