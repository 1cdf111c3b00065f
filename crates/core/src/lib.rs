//! medibusca-core: shared domain types for the doctor discovery service
//!
//! Catalog entities (clinics, doctors, specialties, insurers), the static
//! Lima/Callao district list, pagination, search filter state, and the
//! prompt building and validation behind the two AI-assisted endpoints.
//! Nothing in this crate performs I/O.

pub mod directory;
pub mod districts;
pub mod error;
pub mod extraction;
pub mod filters;
pub mod model;
pub mod page;
pub mod text;
pub mod triage;

pub use directory::{ClinicsQuery, Directory, DoctorsQuery, SearchDoctorsQuery};
pub use districts::District;
pub use error::{CoreError, TriageError};
pub use extraction::SearchExtraction;
pub use filters::{ClinicGroup, SearchFilters, SearchResults};
pub use model::{
    Clinica, ClinicSummary, Doctor, DoctorCard, DoctorSummary, Especialidad, Seguro, SeguroRef,
    SubEspecialidad,
};
pub use page::{Listing, Page, PageRequest};
pub use triage::{SpecialtyOption, SymptomRecommendation, Urgency};
