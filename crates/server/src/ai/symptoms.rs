//! Symptom triage: recommend one catalog specialty and an urgency level

use std::time::Duration;

use futures::Stream;
use medibusca_core::triage::{self, SpecialtyOption, SymptomRecommendation};
use medibusca_core::TriageError;
use thiserror::Error;
use tokio::time::Instant;

use super::client::{AiError, ClaudeClient, Tool};
use super::structured::{self, ObjectEvent, ObjectRequest};
use crate::upstream::{UpstreamClient, UpstreamError};

const TOOL_NAME: &str = "recomendar_especialidad";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Empty(#[from] TriageError),
}

/// Fetch the specialty catalog the model is allowed to choose from
pub async fn load_catalog(
    upstream: &UpstreamClient,
    timeout: Duration,
) -> Result<Vec<SpecialtyOption>, CatalogError> {
    let body = upstream
        .get_json_within("/especialidades", &[], timeout)
        .await?;
    let options = triage::normalize_catalog(&body)?;
    tracing::debug!(count = options.len(), "Loaded specialty catalog");
    Ok(options)
}

fn recommendation_tool() -> Tool {
    Tool {
        name: TOOL_NAME.to_string(),
        description: "Registra la especialidad recomendada y el nivel de urgencia".to_string(),
        input_schema: triage::recommendation_schema(),
    }
}

/// Stream a recommendation for the given symptoms.
///
/// The final event only ever carries an ID present in `options`.
pub fn classify(
    client: ClaudeClient,
    options: Vec<SpecialtyOption>,
    symptoms: String,
    deadline: Instant,
) -> impl Stream<Item = Result<ObjectEvent<SymptomRecommendation>, AiError>> + Send + 'static {
    let request = ObjectRequest {
        system: triage::build_system_prompt(&options),
        prompt: triage::build_user_prompt(&symptoms),
        tool: recommendation_tool(),
    };

    structured::stream_object(client, request, deadline, move |raw| {
        triage::validate(&raw, &options).map_err(|e| {
            tracing::warn!(error = %e, "Rejected symptom recommendation");
            AiError::Rejected(e.to_string())
        })
    })
}
