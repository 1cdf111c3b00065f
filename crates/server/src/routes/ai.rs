//! Model-backed endpoints: symptom triage, query extraction, chat

use std::convert::Infallible;

use axum::{
    Extension, Json,
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, header},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::{Stream, StreamExt};
use medibusca_core::{extraction, triage};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tokio::time::Instant;

use crate::AppState;
use crate::ai::chat::{self, ChatTurn};
use crate::ai::structured::collect_object;
use crate::ai::{AiError, ClaudeClient, ObjectEvent, query, symptoms};
use crate::error::{AppError, ErrorBody};

const AI_NOT_CONFIGURED: &str = "Servicio de IA no configurado";
const CATALOG_UNAVAILABLE: &str = "No se pudieron cargar las especialidades disponibles";

/// Map a model failure to the status the client sees
fn ai_failure(err: AiError) -> AppError {
    match err {
        AiError::Timeout => {
            tracing::warn!("Model call timed out");
            AppError::GatewayTimeout(
                "El análisis tardó demasiado. Intenta nuevamente.".to_string(),
            )
        }
        AiError::Rejected(reason) => {
            tracing::warn!(reason = %reason, "Model answer rejected");
            AppError::BadGateway("No se pudo obtener una respuesta válida del modelo".to_string())
        }
        AiError::EmptyResponse => {
            AppError::BadGateway("No se pudo obtener una respuesta válida del modelo".to_string())
        }
        other => {
            tracing::error!(error = %other, "Model call failed");
            AppError::ServiceUnavailable("Servicio de análisis no disponible".to_string())
        }
    }
}

fn wants_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/event-stream"))
}

fn error_event(err: AiError) -> Event {
    let body = ErrorBody {
        error: ai_failure(err).message(),
    };
    Event::default()
        .event("error")
        .json_data(&body)
        .unwrap_or_else(|_| Event::default().event("error").data("error"))
}

/// Server-sent events: JSON-encoded `partial` fragments, then `result` or `error`
fn event_stream<T, S>(stream: S) -> impl Stream<Item = Result<Event, Infallible>> + Send
where
    T: Serialize,
    S: Stream<Item = Result<ObjectEvent<T>, AiError>> + Send,
{
    stream.map(|item| {
        let event = match item {
            Ok(ObjectEvent::Partial(fragment)) => Event::default().event("partial").json_data(&fragment),
            Ok(ObjectEvent::Complete(value)) => Event::default().event("result").json_data(&value),
            Err(err) => return Ok(error_event(err)),
        };
        Ok(event.unwrap_or_else(|e| error_event(AiError::Decode(e.to_string()))))
    })
}

/// Answer with either the event stream or the final object as JSON
async fn respond<T, S>(headers: &HeaderMap, stream: S) -> Result<Response, AppError>
where
    T: Serialize + Send + 'static,
    S: Stream<Item = Result<ObjectEvent<T>, AiError>> + Send + 'static,
{
    if wants_event_stream(headers) {
        return Ok(Sse::new(event_stream(stream))
            .keep_alive(KeepAlive::default())
            .into_response());
    }
    let value = collect_object(stream).await.map_err(ai_failure)?;
    Ok(Json(value).into_response())
}

/// Parse a request body, treating malformed JSON like an empty body
fn json_body(body: &Bytes) -> JsonValue {
    serde_json::from_slice(body).unwrap_or(JsonValue::Null)
}

/// POST /api/symptoms - recommend a specialty from the live catalog
pub async fn symptoms(
    State(state): State<AppState>,
    Extension(client): Extension<Option<ClaudeClient>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let text = triage::symptoms_from_body(&json_body(&body))
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let Some(upstream) = state.upstream.as_ref() else {
        tracing::error!("Backend API not configured, cannot load specialties");
        return Err(AppError::upstream_not_configured());
    };
    let options = symptoms::load_catalog(upstream, state.catalog_timeout)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to load specialty catalog");
            AppError::ServiceUnavailable(CATALOG_UNAVAILABLE.to_string())
        })?;

    let client = client.ok_or_else(|| AppError::ServiceUnavailable(AI_NOT_CONFIGURED.to_string()))?;

    tracing::info!(
        specialties = options.len(),
        chars = text.chars().count(),
        "Classifying symptoms"
    );
    let deadline = Instant::now() + state.ai_timeout;
    respond(
        &headers,
        symptoms::classify(client, options, text, deadline),
    )
    .await
}

/// POST /api/search - extract specialty and district from free text
pub async fn search(
    State(state): State<AppState>,
    Extension(client): Extension<Option<ClaudeClient>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let text = extraction::query_from_body(&json_body(&body))
        .ok_or_else(|| AppError::BadRequest("Consulta requerida".to_string()))?;
    let client = client.ok_or_else(|| AppError::ServiceUnavailable(AI_NOT_CONFIGURED.to_string()))?;

    // ids are resolved only when the catalog is reachable
    let options = match state.upstream.as_ref() {
        Some(upstream) => symptoms::load_catalog(upstream, state.catalog_timeout)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Specialty catalog unavailable, skipping id resolution");
                Vec::new()
            }),
        None => Vec::new(),
    };

    tracing::info!(chars = text.chars().count(), "Extracting search query");
    let deadline = Instant::now() + state.ai_timeout;
    respond(&headers, query::extract(client, options, text, deadline)).await
}

#[derive(Deserialize)]
struct ChatRequest {
    messages: Vec<ChatTurn>,
}

/// POST /api/chat - plain text stream from the assistant
pub async fn chat(
    State(state): State<AppState>,
    Extension(client): Extension<Option<ClaudeClient>>,
    body: Bytes,
) -> Result<Response, AppError> {
    let messages = serde_json::from_slice::<ChatRequest>(&body)
        .ok()
        .and_then(|request| chat::conversation(request.messages))
        .ok_or_else(|| AppError::BadRequest("Mensajes requeridos".to_string()))?;
    let client = client.ok_or_else(|| AppError::ServiceUnavailable(AI_NOT_CONFIGURED.to_string()))?;

    let deadline = Instant::now() + state.ai_timeout;
    let mut reply = Box::pin(chat::reply(client, messages, deadline));

    // failures before the first fragment still get a proper status
    let first = match reply.next().await {
        Some(Ok(text)) => text,
        Some(Err(err)) => return Err(ai_failure(err)),
        None => String::new(),
    };

    let rest = reply.map(|item| {
        item.inspect_err(|e| tracing::error!(error = %e, "Chat stream interrupted"))
    });
    let body = Body::from_stream(futures::stream::once(async move { Ok::<_, AiError>(first) }).chain(rest));

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_failure_statuses() {
        assert_eq!(ai_failure(AiError::Timeout).status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            ai_failure(AiError::Rejected("unknown id".to_string())).status(),
            StatusCode::BAD_GATEWAY
        );
        let err = ai_failure(AiError::Http("connection refused".to_string()));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.message(), "Servicio de análisis no disponible");
    }

    #[test]
    fn test_accept_header_detection() {
        let mut headers = HeaderMap::new();
        assert!(!wants_event_stream(&headers));
        headers.insert(header::ACCEPT, "text/event-stream".parse().unwrap());
        assert!(wants_event_stream(&headers));
    }
}
