//! Structured output: stream one forced tool call and parse its input

use futures::{Stream, StreamExt};
use serde_json::Value as JsonValue;
use tokio::time::Instant;

use super::client::{AiError, ClaudeClient, Message, StreamDelta, Tool};

/// A forced-tool request
#[derive(Debug, Clone)]
pub struct ObjectRequest {
    pub system: String,
    pub prompt: String,
    pub tool: Tool,
}

/// Progress of a streamed object
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectEvent<T> {
    /// Raw JSON fragment as produced by the model
    Partial(String),
    Complete(T),
}

/// Stream the tool input, then yield the validated object.
///
/// Opening the stream and every subsequent chunk share a single deadline.
pub fn stream_object<T, F>(
    client: ClaudeClient,
    request: ObjectRequest,
    deadline: Instant,
    validate: F,
) -> impl Stream<Item = Result<ObjectEvent<T>, AiError>> + Send + 'static
where
    T: Send + 'static,
    F: FnOnce(JsonValue) -> Result<T, AiError> + Send + 'static,
{
    let ObjectRequest {
        system,
        prompt,
        tool,
    } = request;

    async_stream::try_stream! {
        let opened = tokio::time::timeout_at(
            deadline,
            client.stream(Some(&system), vec![Message::user(prompt)], Some(tool)),
        )
        .await
        .map_err(|_| AiError::Timeout)?;
        let mut deltas = opened?;

        let mut json = String::new();
        loop {
            let next = tokio::time::timeout_at(deadline, deltas.next())
                .await
                .map_err(|_| AiError::Timeout)?;
            let Some(delta) = next else {
                break;
            };
            if let StreamDelta::ToolInput(part) = delta? {
                if !part.is_empty() {
                    json.push_str(&part);
                    yield ObjectEvent::Partial(part);
                }
            }
        }

        if json.trim().is_empty() {
            Err::<(), _>(AiError::EmptyResponse)?;
        }
        let value: JsonValue = serde_json::from_str(&json)
            .map_err(|e| AiError::Rejected(format!("invalid JSON: {}", e)))?;
        yield ObjectEvent::Complete(validate(value)?);
    }
}

/// Drain a stream, keeping only the final object
pub async fn collect_object<T>(
    stream: impl Stream<Item = Result<ObjectEvent<T>, AiError>>,
) -> Result<T, AiError> {
    futures::pin_mut!(stream);
    while let Some(event) = stream.next().await {
        if let ObjectEvent::Complete(value) = event? {
            return Ok(value);
        }
    }
    Err(AiError::EmptyResponse)
}
