//! Built-in list of Lima Metropolitana and Callao districts
//!
//! Served by `/api/ubigeo` and used to resolve district names extracted
//! from free-text queries. Codes are INEI ubigeo codes.

use serde::Serialize;

use crate::text::{compare_es, match_key};

/// A district with its ubigeo code
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct District {
    #[serde(rename = "ubigeoId")]
    pub code: &'static str,
    #[serde(rename = "nombreDistrito")]
    pub name: &'static str,
    #[serde(rename = "departamento")]
    pub department: &'static str,
    #[serde(rename = "provincia")]
    pub province: &'static str,
}

const fn district(code: &'static str, name: &'static str, region: &'static str) -> District {
    District {
        code,
        name,
        department: region,
        province: region,
    }
}

static DISTRICTS: [District; 50] = [
    // Lima Metropolitana
    district("150101", "Lima", "Lima"),
    district("150102", "Ancón", "Lima"),
    district("150103", "Ate", "Lima"),
    district("150104", "Barranco", "Lima"),
    district("150105", "Breña", "Lima"),
    district("150106", "Carabayllo", "Lima"),
    district("150107", "Chaclacayo", "Lima"),
    district("150108", "Chorrillos", "Lima"),
    district("150109", "Cieneguilla", "Lima"),
    district("150110", "Comas", "Lima"),
    district("150111", "El Agustino", "Lima"),
    district("150112", "Independencia", "Lima"),
    district("150113", "Jesús María", "Lima"),
    district("150114", "La Molina", "Lima"),
    district("150115", "La Victoria", "Lima"),
    district("150116", "Lince", "Lima"),
    district("150117", "Los Olivos", "Lima"),
    district("150118", "Lurigancho", "Lima"),
    district("150119", "Lurín", "Lima"),
    district("150120", "Magdalena del Mar", "Lima"),
    district("150121", "Pueblo Libre", "Lima"),
    district("150122", "Miraflores", "Lima"),
    district("150123", "Pachacámac", "Lima"),
    district("150124", "Pucusana", "Lima"),
    district("150125", "Puente Piedra", "Lima"),
    district("150126", "Punta Hermosa", "Lima"),
    district("150127", "Punta Negra", "Lima"),
    district("150128", "Rímac", "Lima"),
    district("150129", "San Bartolo", "Lima"),
    district("150130", "San Borja", "Lima"),
    district("150131", "San Isidro", "Lima"),
    district("150132", "San Juan de Lurigancho", "Lima"),
    district("150133", "San Juan de Miraflores", "Lima"),
    district("150134", "San Luis", "Lima"),
    district("150135", "San Martín de Porres", "Lima"),
    district("150136", "San Miguel", "Lima"),
    district("150137", "Santa Anita", "Lima"),
    district("150138", "Santa María del Mar", "Lima"),
    district("150139", "Santa Rosa", "Lima"),
    district("150140", "Santiago de Surco", "Lima"),
    district("150141", "Surquillo", "Lima"),
    district("150142", "Villa El Salvador", "Lima"),
    district("150143", "Villa María del Triunfo", "Lima"),
    // Callao
    district("070101", "Callao", "Callao"),
    district("070102", "Bellavista", "Callao"),
    district("070103", "Carmen de la Legua Reynoso", "Callao"),
    district("070104", "La Perla", "Callao"),
    district("070105", "La Punta", "Callao"),
    district("070106", "Ventanilla", "Callao"),
    district("070107", "Mi Perú", "Callao"),
];

/// All districts in ubigeo order
pub fn all() -> &'static [District] {
    &DISTRICTS
}

/// All districts sorted by name for dropdown display
pub fn sorted() -> Vec<District> {
    let mut list = DISTRICTS.to_vec();
    list.sort_by(|a, b| compare_es(a.name, b.name));
    list
}

pub fn find_by_code(code: &str) -> Option<&'static District> {
    let code = code.trim();
    DISTRICTS.iter().find(|d| d.code == code)
}

/// Look a district up by name, ignoring case, accents and extra spaces
pub fn find_by_name(name: &str) -> Option<&'static District> {
    let key = match_key(name);
    if key.is_empty() {
        return None;
    }
    DISTRICTS.iter().find(|d| match_key(d.name) == key)
}
