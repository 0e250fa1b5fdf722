//! Wire payloads for the Ollama HTTP API.
//!
//! Only the fields this crate reads or writes are modelled. Responses are
//! decoded leniently: missing optional fields fall back to defaults so that
//! older and newer server versions both parse.

use serde::{Deserialize, Serialize};

pub mod models;

pub const TAGS_ENDPOINT: &str = "api/tags";
pub const CHAT_ENDPOINT: &str = "api/chat";
pub const GENERATE_ENDPOINT: &str = "api/generate";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Body of `POST /api/chat`.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

/// Body of `POST /api/generate`.
#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
}

/// An installed model as reported by `GET /api/tags`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
    #[serde(rename = "size", default)]
    pub size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_serializes_stream_flag_and_roles() {
        let request = ChatRequest {
            model: "llama3.2",
            messages: vec![
                ChatMessage::new("system", "be brief"),
                ChatMessage::new("user", "Hi"),
            ],
            stream: true,
        };

        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "model": "llama3.2",
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "Hi"}
                ],
                "stream": true
            })
        );
    }

    #[test]
    fn generate_request_omits_missing_system_prompt() {
        let request = GenerateRequest {
            model: "llama3.2",
            prompt: "Why is the sky blue?",
            stream: false,
            system: None,
        };

        let value = serde_json::to_value(&request).expect("serialize");
        assert!(value.get("system").is_none());
        assert_eq!(value["stream"], false);
    }

    #[test]
    fn tags_response_tolerates_missing_fields() {
        let parsed: TagsResponse =
            serde_json::from_str(r#"{"models":[{"name":"llama3.2:latest","size":2019393189},{"name":"tiny"}]}"#)
                .expect("parse");
        assert_eq!(parsed.models.len(), 2);
        assert_eq!(parsed.models[0].size_bytes, 2_019_393_189);
        assert_eq!(parsed.models[1].size_bytes, 0);

        let empty: TagsResponse = serde_json::from_str("{}").expect("parse");
        assert!(empty.models.is_empty());
    }
}
