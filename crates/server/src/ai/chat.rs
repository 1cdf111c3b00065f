//! General-purpose patient assistant streaming plain text

use futures::{Stream, StreamExt};
use serde::Deserialize;
use tokio::time::Instant;

use super::client::{AiError, ClaudeClient, Message, StreamDelta};

const SYSTEM_PROMPT: &str = r#"Eres un asistente médico especializado en ayudar a pacientes a encontrar información sobre doctores, clínicas, especialidades y seguros médicos en Perú.

Tu rol es:
- Ayudar a los usuarios a buscar doctores por especialidad, clínica o seguro
- Proporcionar información sobre clínicas y sus ubicaciones
- Explicar diferentes especialidades médicas
- Orientar sobre seguros médicos y cobertura

Sé amable, profesional y conciso en tus respuestas."#;

/// One turn of the conversation as posted by the client
#[derive(Debug, Clone, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

/// Check the posted history and convert it to API messages.
///
/// Returns `None` for an empty history, an unknown role, or a history
/// that does not end with the user speaking.
pub fn conversation(turns: Vec<ChatTurn>) -> Option<Vec<Message>> {
    let last_is_user = turns.last().is_some_and(|t| t.role == "user");
    if !last_is_user {
        return None;
    }
    turns
        .into_iter()
        .map(|turn| match turn.role.as_str() {
            "user" | "assistant" => Some(Message {
                role: turn.role,
                content: turn.content,
            }),
            _ => None,
        })
        .collect()
}

/// Stream the assistant's reply as text fragments
pub fn reply(
    client: ClaudeClient,
    messages: Vec<Message>,
    deadline: Instant,
) -> impl Stream<Item = Result<String, AiError>> + Send + 'static {
    async_stream::try_stream! {
        let opened = tokio::time::timeout_at(
            deadline,
            client.stream(Some(SYSTEM_PROMPT), messages, None),
        )
        .await
        .map_err(|_| AiError::Timeout)?;
        let mut deltas = opened?;

        loop {
            let next = tokio::time::timeout_at(deadline, deltas.next())
                .await
                .map_err(|_| AiError::Timeout)?;
            let Some(delta) = next else {
                break;
            };
            if let StreamDelta::Text(text) = delta? {
                yield text;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(role: &str, content: &str) -> ChatTurn {
        ChatTurn {
            role: role.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_conversation_accepts_alternating_turns() {
        let messages = conversation(vec![
            turn("user", "Hola"),
            turn("assistant", "¿En qué puedo ayudarte?"),
            turn("user", "Busco un cardiólogo"),
        ])
        .unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, "assistant");
    }

    #[test]
    fn test_conversation_rejects_bad_histories() {
        assert!(conversation(vec![]).is_none());
        assert!(conversation(vec![turn("system", "x"), turn("user", "y")]).is_none());
        assert!(conversation(vec![turn("user", "x"), turn("assistant", "y")]).is_none());
    }
}
