//! Catalog entities as served by the backend API
//!
//! Field names follow the backend's camelCase JSON. The backend data went
//! through several import formats, so a few entities carry alternative
//! fields for the same fact (`ubicacion`/`direccion`, `clinicaId`/`clinicaIds`,
//! `photoUrl`/`fotoUrl`); accessor methods pick the right one.

use serde::{Deserialize, Serialize};

/// Medical specialty
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Especialidad {
    pub especialidad_id: String,
    pub nombre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
}

/// Sub-specialty, always attached to a parent specialty
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubEspecialidad {
    pub sub_especialidad_id: String,
    pub especialidad_id: String,
    pub nombre: String,
}

/// Health-insurance provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Seguro {
    pub seguro_id: String,
    pub nombre: String,
}

/// Insurer reference embedded in doctor cards
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeguroRef {
    pub seguro_id: String,
    pub nombre: String,
}

/// Either a single value or a list of values
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn as_slice(&self) -> &[String] {
        match self {
            OneOrMany::One(v) => std::slice::from_ref(v),
            OneOrMany::Many(v) => v,
        }
    }
}

/// Clinic / medical facility
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Clinica {
    pub clinica_id: String,
    pub nombre_clinica: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ubicacion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    pub ubigeo_id: String,
    #[serde(default)]
    pub especialidad_ids: Vec<String>,
    #[serde(default)]
    pub seguro_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grupo_clinica_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_landing_page: Option<String>,
}

impl Clinica {
    /// Street address, whichever field the record carries
    pub fn address(&self) -> String {
        self.ubicacion
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.direccion.as_deref())
            .unwrap_or_default()
            .to_string()
    }

    pub fn website(&self) -> String {
        self.url
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.url_landing_page.as_deref())
            .unwrap_or_default()
            .to_string()
    }

    pub fn accepts(&self, seguro_id: &str) -> bool {
        self.seguro_ids.iter().any(|s| s == seguro_id)
    }

    pub fn offers(&self, especialidad_id: &str) -> bool {
        self.especialidad_ids.iter().any(|s| s == especialidad_id)
    }
}

/// Doctor record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub doctor_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre_completo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombres: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apellido_paterno: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apellido_materno: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub especialidad_principal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub especialidad_id: Option<String>,
    #[serde(default)]
    pub sub_especialidad_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinica_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinica_ids: Option<OneOrMany>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foto_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rimac_ensured: Option<bool>,
}

impl Doctor {
    /// Full name, built from the split fields when `nombreCompleto` is absent
    pub fn display_name(&self) -> String {
        if let Some(full) = self.nombre_completo.as_deref().filter(|s| !s.is_empty()) {
            return full.to_string();
        }
        [&self.nombres, &self.apellido_paterno, &self.apellido_materno]
            .iter()
            .map(|part| part.as_deref().unwrap_or_default())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }

    pub fn specialty_id(&self) -> Option<&str> {
        self.especialidad_principal_id
            .as_deref()
            .or(self.especialidad_id.as_deref())
    }

    /// Every clinic the doctor practices at
    pub fn clinic_ids(&self) -> Vec<&str> {
        if let Some(id) = self.clinica_id.as_deref() {
            return vec![id];
        }
        self.clinica_ids
            .as_ref()
            .map(|ids| ids.as_slice().iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// The clinic shown on the doctor's card
    pub fn primary_clinic_id(&self) -> Option<&str> {
        self.clinic_ids().into_iter().next()
    }

    pub fn photo(&self) -> Option<String> {
        self.photo_url
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.foto_url.as_deref())
            .map(str::to_string)
    }
}

/// One search result: a doctor with their clinic and accepted insurers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DoctorCard {
    pub doctor_id: String,
    pub doctor_name: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub main_specialty: Option<String>,
    #[serde(default)]
    pub clinic_id: Option<String>,
    #[serde(default)]
    pub clinic_name: Option<String>,
    #[serde(default)]
    pub clinic_address: Option<String>,
    #[serde(default)]
    pub seguros: Vec<SeguroRef>,
}

/// Doctor listing row returned by `/doctors`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSummary {
    pub doctor_id: String,
    pub doctor_name: String,
    pub clinic_id: Option<String>,
    pub clinic_name: Option<String>,
    pub especialidad: Option<String>,
    pub photo_url: Option<String>,
}

/// Clinic listing row returned by `/clinics`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClinicSummary {
    pub clinica_id: String,
    pub nombre_clinica: String,
    pub ubicacion: String,
    pub ubigeo_id: String,
    pub especialidad_ids: Vec<String>,
    pub seguro_ids: Vec<String>,
    pub url: String,
}

impl From<&Clinica> for ClinicSummary {
    fn from(clinic: &Clinica) -> Self {
        Self {
            clinica_id: clinic.clinica_id.clone(),
            nombre_clinica: clinic.nombre_clinica.clone(),
            ubicacion: clinic.address(),
            ubigeo_id: clinic.ubigeo_id.clone(),
            especialidad_ids: clinic.especialidad_ids.clone(),
            seguro_ids: clinic.seguro_ids.clone(),
            url: clinic.website(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_doctor_name_from_split_fields() {
        let doctor: Doctor = serde_json::from_value(json!({
            "doctorId": "DOC-9",
            "nombres": "Ana",
            "apellidoPaterno": "Quispe",
            "especialidadId": "8"
        }))
        .unwrap();

        assert_eq!(doctor.display_name(), "Ana Quispe");
        assert_eq!(doctor.specialty_id(), Some("8"));
    }

    #[test]
    fn test_doctor_clinic_ids_formats() {
        let single: Doctor = serde_json::from_value(json!({
            "doctorId": "D1", "clinicaId": "C1"
        }))
        .unwrap();
        let list: Doctor = serde_json::from_value(json!({
            "doctorId": "D2", "clinicaIds": ["C2", "C3"]
        }))
        .unwrap();
        let scalar: Doctor = serde_json::from_value(json!({
            "doctorId": "D3", "clinicaIds": "C4"
        }))
        .unwrap();

        assert_eq!(single.clinic_ids(), vec!["C1"]);
        assert_eq!(list.clinic_ids(), vec!["C2", "C3"]);
        assert_eq!(list.primary_clinic_id(), Some("C2"));
        assert_eq!(scalar.clinic_ids(), vec!["C4"]);
    }

    #[test]
    fn test_clinic_address_fallback() {
        let clinic: Clinica = serde_json::from_value(json!({
            "clinicaId": "C1",
            "nombreClinica": "Clínica Prueba",
            "direccion": "Av. Arequipa 100",
            "ubigeoId": "150116",
            "urlLandingPage": "https://prueba.example/"
        }))
        .unwrap();

        assert_eq!(clinic.address(), "Av. Arequipa 100");
        let summary = ClinicSummary::from(&clinic);
        assert_eq!(summary.url, "https://prueba.example/");
        assert!(summary.seguro_ids.is_empty());
    }

    #[test]
    fn test_photo_fallback() {
        let doctor: Doctor = serde_json::from_value(json!({
            "doctorId": "D1", "fotoUrl": "https://img.example/d1.png"
        }))
        .unwrap();
        assert_eq!(doctor.photo().as_deref(), Some("https://img.example/d1.png"));
    }
}
