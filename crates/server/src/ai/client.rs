//! Claude API client for the Anthropic Messages API

use std::pin::Pin;

use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

const API_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
const MAX_TOKENS: u32 = 1024;

/// Errors from the model API
#[derive(Debug, Error)]
pub enum AiError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Claude API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Claude stream error: {0}")]
    Stream(String),

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Model returned no content")]
    EmptyResponse,

    #[error("Model call timed out")]
    Timeout,

    /// The answer parsed but failed validation
    #[error("Model answer rejected: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AiError::Timeout
        } else {
            AiError::Http(err.to_string())
        }
    }
}

/// Client for the Anthropic Claude Messages API
#[derive(Clone)]
pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: text.into(),
        }
    }
}

/// Tool definition for Claude
#[derive(Debug, Clone, Serialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: JsonValue,
}

/// Forces the model to answer through one specific tool
#[derive(Debug, Clone, Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    kind: &'static str,
    name: String,
}

/// Request body for the Messages API
#[derive(Serialize)]
struct ApiRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
    stream: bool,
}

/// Error detail from the Messages API
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Incremental output of a streamed message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamDelta {
    Text(String),
    /// Fragment of the forced tool call's JSON input
    ToolInput(String),
}

pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<StreamDelta, AiError>> + Send>>;

/// What a single server-sent event means for the caller
enum StreamStep {
    Delta(StreamDelta),
    Stop,
    Skip,
}

fn parse_stream_event(event: &Event) -> Result<StreamStep, AiError> {
    let payload: JsonValue = serde_json::from_str(&event.data)
        .map_err(|e| AiError::Decode(format!("bad stream event: {}", e)))?;
    let kind = payload
        .get("type")
        .and_then(JsonValue::as_str)
        .unwrap_or(event.event.as_str());

    match kind {
        "content_block_delta" => {
            let delta = &payload["delta"];
            match delta.get("type").and_then(JsonValue::as_str) {
                Some("text_delta") => Ok(StreamStep::Delta(StreamDelta::Text(
                    delta["text"].as_str().unwrap_or_default().to_string(),
                ))),
                Some("input_json_delta") => Ok(StreamStep::Delta(StreamDelta::ToolInput(
                    delta["partial_json"].as_str().unwrap_or_default().to_string(),
                ))),
                _ => Ok(StreamStep::Skip),
            }
        }
        "message_stop" => Ok(StreamStep::Stop),
        "error" => Err(AiError::Stream(
            payload["error"]["message"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string(),
        )),
        _ => Ok(StreamStep::Skip),
    }
}

impl From<EventStreamError<reqwest::Error>> for AiError {
    fn from(err: EventStreamError<reqwest::Error>) -> Self {
        match err {
            EventStreamError::Transport(err) => AiError::from(err),
            other => AiError::Stream(other.to_string()),
        }
    }
}

/// Turn the raw SSE body into deltas, stopping at `message_stop`
fn decode_stream<S, B>(bytes: S) -> impl Stream<Item = Result<StreamDelta, AiError>> + Send + 'static
where
    S: Stream<Item = Result<B, reqwest::Error>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    async_stream::try_stream! {
        let mut events = Box::pin(bytes.eventsource());
        while let Some(event) = events.next().await {
            let event = event.map_err(AiError::from)?;
            match parse_stream_event(&event)? {
                StreamStep::Delta(delta) => yield delta,
                StreamStep::Stop => break,
                StreamStep::Skip => {}
            }
        }
    }
}

async fn error_from_response(response: reqwest::Response) -> AiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    AiError::Api {
        status: status.as_u16(),
        message,
    }
}

impl ClaudeClient {
    /// Create a new client with the given API key
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn request(&self, body: &ApiRequest) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(body)
    }

    /// Open a streamed message.
    ///
    /// When `tool` is given the model is forced to answer by calling it, and
    /// the stream carries the tool input as JSON fragments.
    pub async fn stream(
        &self,
        system: Option<&str>,
        messages: Vec<Message>,
        tool: Option<Tool>,
    ) -> Result<DeltaStream, AiError> {
        let tool_choice = tool.as_ref().map(|t| ToolChoice {
            kind: "tool",
            name: t.name.clone(),
        });
        let request = ApiRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            system: system.map(|s| s.to_string()),
            messages,
            tools: tool.map(|t| vec![t]),
            tool_choice,
            stream: true,
        };

        let response = self.request(&request).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(Box::pin(decode_stream(response.bytes_stream())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(data: &str) -> Event {
        Event {
            event: "message".to_string(),
            data: data.to_string(),
            id: String::new(),
            retry: None,
        }
    }

    async fn decode(chunks: &[&str]) -> Vec<Result<StreamDelta, AiError>> {
        let chunks: Vec<Result<Vec<u8>, reqwest::Error>> =
            chunks.iter().map(|c| Ok(c.as_bytes().to_vec())).collect();
        decode_stream(futures::stream::iter(chunks)).collect().await
    }

    #[test]
    fn test_parse_tool_input_delta() {
        let step = parse_stream_event(&event(
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"input_json_delta","partial_json":"{\"urg"}}"#,
        ))
        .unwrap();
        assert!(matches!(step, StreamStep::Delta(StreamDelta::ToolInput(s)) if s == "{\"urg"));
    }

    #[test]
    fn test_parse_text_delta_and_stop() {
        let step = parse_stream_event(&event(
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hola"}}"#,
        ))
        .unwrap();
        assert!(matches!(step, StreamStep::Delta(StreamDelta::Text(s)) if s == "Hola"));

        let step = parse_stream_event(&event(r#"{"type":"message_stop"}"#)).unwrap();
        assert!(matches!(step, StreamStep::Stop));

        let step = parse_stream_event(&event(r#"{"type":"ping"}"#)).unwrap();
        assert!(matches!(step, StreamStep::Skip));
    }

    #[test]
    fn test_parse_error_event() {
        let err = parse_stream_event(&event(
            r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#,
        ))
        .err()
        .unwrap();
        assert!(matches!(err, AiError::Stream(msg) if msg == "Overloaded"));
    }

    #[test]
    fn test_event_name_used_when_payload_has_no_type() {
        let stop = Event {
            event: "message_stop".to_string(),
            data: "{}".to_string(),
            id: String::new(),
            retry: None,
        };
        assert!(matches!(parse_stream_event(&stop).unwrap(), StreamStep::Stop));
    }

    #[tokio::test]
    async fn test_decode_stream_across_chunk_boundaries() {
        let deltas = decode(&[
            "event: content_block_delta\r\ndata: {\"type\":\"content_block_delta\",\"index\":0,",
            "\"delta\":{\"type\":\"input_json_delta\",\"partial_json\":\"{\\\"a\\\":\"}}\r\n\r\n",
            ": keep-alive\n\n",
            "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"input_json_delta\",\"partial_json\":\"1}\"}}\n\n",
            "data: {\"type\":\"message_stop\"}\n\n",
            "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"late\"}}\n\n",
        ])
        .await;
        let fragments: Vec<StreamDelta> = deltas.into_iter().map(Result::unwrap).collect();
        assert_eq!(
            fragments,
            vec![
                StreamDelta::ToolInput("{\"a\":".to_string()),
                StreamDelta::ToolInput("1}".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_decode_stream_surfaces_error_event() {
        let deltas = decode(&[
            "event: error\ndata: {\"type\":\"error\",\"error\":{\"message\":\"Overloaded\"}}\n\n",
        ])
        .await;
        assert_eq!(deltas.len(), 1);
        assert!(matches!(&deltas[0], Err(AiError::Stream(msg)) if msg == "Overloaded"));
    }

    #[test]
    fn test_streaming_request_shape() {
        let request = ApiRequest {
            model: "m".to_string(),
            max_tokens: 10,
            system: None,
            messages: vec![Message::user("hola")],
            tools: None,
            tool_choice: Some(ToolChoice {
                kind: "tool",
                name: "recommend".to_string(),
            }),
            stream: true,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["tool_choice"]["type"], "tool");
        assert_eq!(value["stream"], true);
        assert!(value.get("system").is_none());
        assert_eq!(value["messages"][0]["content"], "hola");
    }
}
