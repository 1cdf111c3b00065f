use thiserror::Error;

/// Errors raised by directory queries and parameter parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Response does not match the schema: {0}")]
    Schema(String),

    #[error("Invalid dataset: {0}")]
    Dataset(String),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::Validation(msg.into())
    }

    pub fn missing_param(name: &str) -> Self {
        CoreError::Validation(format!("Missing required parameter: {name}"))
    }
}

/// Errors raised while checking a model's specialty recommendation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TriageError {
    #[error("No specialties available")]
    EmptyCatalog,

    #[error("Síntomas requeridos")]
    EmptySymptoms,

    #[error("Recommendation does not match the schema: {0}")]
    Schema(String),

    #[error("Specialty {id} is not in the available catalog")]
    UnknownSpecialty { id: String },
}
