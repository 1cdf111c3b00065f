//! In-memory doctor directory
//!
//! Implements the backend API (search, clinics, doctors, specialties,
//! insurers) over a dataset held in memory. The server can serve it
//! directly, which makes local development and tests independent of the
//! remote API.

mod sample;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::districts;
use crate::error::CoreError;
use crate::model::{
    ClinicSummary, Clinica, Doctor, DoctorCard, DoctorSummary, Especialidad, Seguro, SeguroRef,
    SubEspecialidad,
};
use crate::page::{Listing, Page, PageRequest};
use crate::text::non_empty;

/// Query string parameters as received
pub type Params = HashMap<String, String>;

fn param<'a>(params: &'a Params, name: &str) -> Option<&'a str> {
    non_empty(params.get(name).map(String::as_str))
}

fn require<'a>(params: &'a Params, name: &str) -> Result<&'a str, CoreError> {
    param(params, name).ok_or_else(|| CoreError::missing_param(name))
}

fn owned(params: &Params, name: &str) -> Option<String> {
    param(params, name).map(str::to_string)
}

fn bool_param(params: &Params, name: &str) -> Result<Option<bool>, CoreError> {
    match param(params, name) {
        None => Ok(None),
        Some(v) if v.eq_ignore_ascii_case("true") => Ok(Some(true)),
        Some(v) if v.eq_ignore_ascii_case("false") => Ok(Some(false)),
        Some(_) => Err(CoreError::validation(format!(
            "Parameter {name} must be true or false"
        ))),
    }
}

fn page_request(params: &Params) -> Result<PageRequest, CoreError> {
    PageRequest::parse(
        params.get("page").map(String::as_str),
        params.get("pageSize").map(String::as_str),
    )
}

/// `/search/doctors` parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDoctorsQuery {
    pub ubigeo_id: String,
    pub especialidad_id: String,
    pub seguro_id: Option<String>,
    pub rimac_ensured: Option<bool>,
    pub page: PageRequest,
}

impl SearchDoctorsQuery {
    pub fn from_params(params: &Params) -> Result<Self, CoreError> {
        Ok(Self {
            ubigeo_id: require(params, "ubigeoId")?.to_string(),
            especialidad_id: require(params, "especialidadId")?.to_string(),
            seguro_id: owned(params, "seguroId"),
            rimac_ensured: bool_param(params, "rimacEnsured")?,
            page: page_request(params)?,
        })
    }
}

/// `/clinics` parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClinicsQuery {
    pub ubigeo_id: Option<String>,
    pub especialidad_id: Option<String>,
    pub seguro_id: Option<String>,
    pub clinica_id: Option<String>,
    pub page: PageRequest,
}

impl ClinicsQuery {
    pub fn from_params(params: &Params) -> Result<Self, CoreError> {
        let query = Self {
            ubigeo_id: owned(params, "ubigeoId"),
            especialidad_id: owned(params, "especialidadId"),
            seguro_id: owned(params, "seguroId"),
            clinica_id: owned(params, "clinicaId"),
            page: page_request(params)?,
        };
        let other_filters = query.ubigeo_id.is_some()
            || query.especialidad_id.is_some()
            || query.seguro_id.is_some();
        if query.clinica_id.is_some() && other_filters {
            return Err(CoreError::validation(
                "When clinicaId is provided, remove other filters",
            ));
        }
        Ok(query)
    }
}

/// `/doctors` parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctorsQuery {
    pub especialidad_id: Option<String>,
    pub clinica_id: Option<String>,
    pub doctor_id: Option<String>,
    pub rimac_ensured: Option<bool>,
    pub page: PageRequest,
}

impl DoctorsQuery {
    pub fn from_params(params: &Params) -> Result<Self, CoreError> {
        Ok(Self {
            especialidad_id: owned(params, "especialidadId"),
            clinica_id: owned(params, "clinicaId"),
            doctor_id: owned(params, "doctorId"),
            rimac_ensured: bool_param(params, "rimacEnsured")?,
            page: page_request(params)?,
        })
    }
}

/// District known to the directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UbigeoEntry {
    pub ubigeo_id: String,
    pub nombre_distrito: String,
}

fn default_ubigeos() -> Vec<UbigeoEntry> {
    districts::all()
        .iter()
        .map(|d| UbigeoEntry {
            ubigeo_id: d.code.to_string(),
            nombre_distrito: d.name.to_string(),
        })
        .collect()
}

/// The whole dataset behind the backend API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Directory {
    #[serde(default)]
    pub clinics: Vec<Clinica>,
    #[serde(default)]
    pub doctors: Vec<Doctor>,
    #[serde(default)]
    pub specialties: Vec<Especialidad>,
    #[serde(default)]
    pub subspecialties: Vec<SubEspecialidad>,
    #[serde(default)]
    pub insurers: Vec<Seguro>,
    #[serde(default = "default_ubigeos")]
    pub ubigeos: Vec<UbigeoEntry>,
}

impl Directory {
    /// Load a dataset from its JSON document
    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        serde_json::from_str(text).map_err(|e| CoreError::Dataset(e.to_string()))
    }

    pub fn ubigeo_exists(&self, ubigeo_id: &str) -> bool {
        self.ubigeos.iter().any(|u| u.ubigeo_id == ubigeo_id)
    }

    fn clinic(&self, clinica_id: &str) -> Option<&Clinica> {
        self.clinics.iter().find(|c| c.clinica_id == clinica_id)
    }

    fn specialty_name(&self, especialidad_id: &str) -> Option<String> {
        self.specialties
            .iter()
            .find(|s| s.especialidad_id == especialidad_id)
            .map(|s| s.nombre.clone())
    }

    fn check_ubigeo(&self, ubigeo_id: Option<&str>) -> Result<(), CoreError> {
        match ubigeo_id {
            Some(id) if !self.ubigeo_exists(id) => Err(CoreError::validation("Invalid ubigeoId")),
            _ => Ok(()),
        }
    }

    fn filter_doctors(
        &self,
        especialidad_id: Option<&str>,
        rimac_ensured: Option<bool>,
    ) -> impl Iterator<Item = &Doctor> {
        self.doctors.iter().filter(move |d| {
            especialidad_id.is_none_or(|id| d.specialty_id() == Some(id))
                && rimac_ensured.is_none_or(|flag| d.rimac_ensured == Some(flag))
        })
    }

    /// Doctor cards for a district + specialty search.
    ///
    /// A doctor matches when at least one of their clinics is in the
    /// district (and accepts the insurer, when one is given). The card shows
    /// the first matching clinic.
    pub fn search_doctors(&self, query: &SearchDoctorsQuery) -> Result<Page<DoctorCard>, CoreError> {
        self.check_ubigeo(Some(&query.ubigeo_id))?;

        let clinics: HashMap<&str, &Clinica> = self
            .clinics
            .iter()
            .filter(|c| c.ubigeo_id == query.ubigeo_id)
            .filter(|c| query.seguro_id.as_deref().is_none_or(|s| c.accepts(s)))
            .map(|c| (c.clinica_id.as_str(), c))
            .collect();

        let matched: Vec<(&Doctor, &Clinica)> = self
            .filter_doctors(Some(query.especialidad_id.as_str()), query.rimac_ensured)
            .filter_map(|doctor| {
                doctor
                    .clinic_ids()
                    .into_iter()
                    .find_map(|id| clinics.get(id).copied())
                    .map(|clinic| (doctor, clinic))
            })
            .collect();

        let specialty = self.specialty_name(&query.especialidad_id);
        let insurer_names: HashMap<&str, &str> = self
            .insurers
            .iter()
            .map(|s| (s.seguro_id.as_str(), s.nombre.as_str()))
            .collect();

        let page = Page::slice(matched, query.page).map(|(doctor, clinic)| DoctorCard {
            doctor_id: doctor.doctor_id.clone(),
            doctor_name: doctor.display_name(),
            photo_url: doctor.photo(),
            main_specialty: specialty.clone(),
            clinic_id: Some(clinic.clinica_id.clone()),
            clinic_name: Some(clinic.nombre_clinica.clone()),
            clinic_address: Some(clinic.address()),
            seguros: clinic
                .seguro_ids
                .iter()
                .map(|id| SeguroRef {
                    seguro_id: id.clone(),
                    nombre: insurer_names
                        .get(id.as_str())
                        .copied()
                        .unwrap_or(id.as_str())
                        .to_string(),
                })
                .collect(),
        });
        Ok(page)
    }

    pub fn list_clinics(&self, query: &ClinicsQuery) -> Result<Page<ClinicSummary>, CoreError> {
        self.check_ubigeo(query.ubigeo_id.as_deref())?;

        let matched: Vec<&Clinica> = self
            .clinics
            .iter()
            .filter(|c| query.clinica_id.as_deref().is_none_or(|id| c.clinica_id == id))
            .filter(|c| query.ubigeo_id.as_deref().is_none_or(|id| c.ubigeo_id == id))
            .filter(|c| query.especialidad_id.as_deref().is_none_or(|id| c.offers(id)))
            .filter(|c| query.seguro_id.as_deref().is_none_or(|id| c.accepts(id)))
            .collect();

        Ok(Page::slice(matched, query.page).map(ClinicSummary::from))
    }

    pub fn list_doctors(&self, query: &DoctorsQuery) -> Result<Page<DoctorSummary>, CoreError> {
        let matched: Vec<&Doctor> = self
            .filter_doctors(query.especialidad_id.as_deref(), query.rimac_ensured)
            .filter(|d| query.doctor_id.as_deref().is_none_or(|id| d.doctor_id == id))
            .filter(|d| {
                query
                    .clinica_id
                    .as_deref()
                    .is_none_or(|id| d.clinic_ids().contains(&id))
            })
            .collect();

        let page = Page::slice(matched, query.page).map(|doctor| {
            let clinic = doctor.primary_clinic_id().and_then(|id| self.clinic(id));
            DoctorSummary {
                doctor_id: doctor.doctor_id.clone(),
                doctor_name: doctor.display_name(),
                clinic_id: clinic.map(|c| c.clinica_id.clone()),
                clinic_name: clinic.map(|c| c.nombre_clinica.clone()),
                especialidad: doctor.specialty_id().and_then(|id| self.specialty_name(id)),
                photo_url: doctor.photo(),
            }
        });

        if query.doctor_id.is_some() && page.items.is_empty() {
            return Err(CoreError::NotFound("Doctor not found".to_string()));
        }
        Ok(page)
    }

    pub fn list_specialties(&self, especialidad_id: Option<&str>) -> Listing<Especialidad> {
        self.specialties
            .iter()
            .filter(|s| especialidad_id.is_none_or(|id| s.especialidad_id == id))
            .cloned()
            .collect::<Vec<_>>()
            .into()
    }

    pub fn list_subspecialties(&self, especialidad_id: Option<&str>) -> Listing<SubEspecialidad> {
        self.subspecialties
            .iter()
            .filter(|s| especialidad_id.is_none_or(|id| s.especialidad_id == id))
            .cloned()
            .collect::<Vec<_>>()
            .into()
    }

    pub fn list_insurers(&self, seguro_id: Option<&str>) -> Listing<Seguro> {
        self.insurers
            .iter()
            .filter(|s| seguro_id.is_none_or(|id| s.seguro_id == id))
            .cloned()
            .collect::<Vec<_>>()
            .into()
    }

    pub fn list_clinics_by_insurer(
        &self,
        seguro_id: Option<&str>,
    ) -> Result<Listing<ClinicSummary>, CoreError> {
        let seguro_id = non_empty(seguro_id)
            .ok_or_else(|| CoreError::validation("seguroId is required"))?;
        Ok(self
            .clinics
            .iter()
            .filter(|c| c.accepts(seguro_id))
            .map(ClinicSummary::from)
            .collect::<Vec<_>>()
            .into())
    }

    /// Distinct clinic ids any doctor points to that are missing from the dataset
    pub fn dangling_clinic_refs(&self) -> Vec<String> {
        let known: HashSet<&str> = self.clinics.iter().map(|c| c.clinica_id.as_str()).collect();
        let mut missing: Vec<String> = self
            .doctors
            .iter()
            .flat_map(|d| d.clinic_ids())
            .filter(|id| !known.contains(id))
            .map(str::to_string)
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }
}

impl Directory {
    /// Small built-in dataset for local runs
    pub fn sample() -> Self {
        sample::dataset()
    }
}
