//! Wire types for the OpenAI-compatible chat-completion protocol.

use serde::{Deserialize, Serialize};

use crate::CompletionError;

/// Message author role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// What the caller controls about a completion call. The model identifier
/// belongs to the client's configuration, not to the request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// The usual system + user pair.
    pub fn new(
        system: impl Into<String>,
        user: impl Into<String>,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature,
            max_tokens,
        }
    }
}

/// Request body as sent on the wire.
#[derive(Debug, Serialize)]
pub(crate) struct WireRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub temperature: f32,
    pub max_tokens: u32,
}

impl<'a> WireRequest<'a> {
    pub(crate) fn new(model: &'a str, request: &'a CompletionRequest) -> Self {
        Self {
            model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

/// Response body; only the fields the pipeline reads.
#[derive(Debug, Deserialize)]
pub(crate) struct WireResponse {
    #[serde(default)]
    pub choices: Vec<WireChoice>,
    #[serde(default)]
    pub usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireChoice {
    pub message: WireMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

impl WireResponse {
    /// Text of the first choice. Absent choices or a null content field are
    /// protocol violations, not empty answers.
    pub(crate) fn into_text(self) -> Result<String, CompletionError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or(CompletionError::EmptyChoices)?;
        choice
            .message
            .content
            .ok_or_else(|| CompletionError::Malformed("first choice has no message content".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_request_serializes_openai_shape() {
        let request = CompletionRequest::new("sys", "hello", 0.7, 800);
        let json = serde_json::to_value(WireRequest::new("llama3-8b-8192", &request)).unwrap();
        assert_eq!(json["model"], "llama3-8b-8192");
        assert_eq!(json["max_tokens"], 800);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hello");
        assert!((json["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn first_choice_text_is_returned() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"a"}},{"message":{"content":"b"}}]}"#;
        let response: WireResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.into_text().unwrap(), "a");
    }

    #[test]
    fn missing_choices_is_an_error() {
        let response: WireResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(response.into_text().unwrap_err(), CompletionError::EmptyChoices);

        let response: WireResponse = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert_eq!(response.into_text().unwrap_err(), CompletionError::EmptyChoices);
    }

    #[test]
    fn null_content_is_malformed() {
        let response: WireResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(matches!(
            response.into_text(),
            Err(CompletionError::Malformed(_))
        ));
    }

    #[test]
    fn empty_content_is_valid_text() {
        let response: WireResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":""}}]}"#).unwrap();
        assert_eq!(response.into_text().unwrap(), "");
    }
}
