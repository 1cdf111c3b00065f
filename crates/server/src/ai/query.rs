//! Free-text search extraction

use futures::Stream;
use medibusca_core::extraction::{self, ResolvedSearch};
use medibusca_core::{SearchExtraction, SpecialtyOption};
use tokio::time::Instant;

use super::client::{AiError, ClaudeClient, Tool};
use super::structured::{self, ObjectEvent, ObjectRequest};

const TOOL_NAME: &str = "extraer_busqueda";

fn extraction_tool() -> Tool {
    Tool {
        name: TOOL_NAME.to_string(),
        description: "Registra la especialidad, el distrito y la respuesta al usuario".to_string(),
        input_schema: extraction::extraction_schema(),
    }
}

/// Stream the extraction of `query`, resolving names against `options`
pub fn extract(
    client: ClaudeClient,
    options: Vec<SpecialtyOption>,
    query: String,
    deadline: Instant,
) -> impl Stream<Item = Result<ObjectEvent<ResolvedSearch>, AiError>> + Send + 'static {
    let request = ObjectRequest {
        system: extraction::SEARCH_PROMPT.to_string(),
        prompt: query,
        tool: extraction_tool(),
    };

    structured::stream_object(client, request, deadline, move |raw| {
        SearchExtraction::from_value(&raw)
            .map(|extracted| extracted.resolve(&options))
            .map_err(|e| AiError::Rejected(e.to_string()))
    })
}
