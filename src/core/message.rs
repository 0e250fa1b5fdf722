use serde::{Deserialize, Serialize};

use crate::api::ChatMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of a conversation.
///
/// `interrupted` is only ever set on assistant messages kept after the
/// generation that produced them was cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub interrupted: bool,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    pub fn is_user(self) -> bool {
        self == Role::User
    }

    pub fn is_assistant(self) -> bool {
        self == Role::Assistant
    }
}

impl TryFrom<&str> for Role {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            _ => Err(format!("invalid conversation role: {value}")),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            interrupted: false,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Partial assistant output kept after a cancel.
    pub fn interrupted_assistant(content: impl Into<String>) -> Self {
        Self {
            interrupted: true,
            ..Self::assistant(content)
        }
    }

    pub fn is_user(&self) -> bool {
        self.role.is_user()
    }

    pub fn is_assistant(&self) -> bool {
        self.role.is_assistant()
    }

    pub fn to_api(&self) -> ChatMessage {
        ChatMessage::new(self.role.as_str(), self.content.clone())
    }
}

/// Build the wire message list, with the system prompt (if any) first.
pub fn to_api_messages(system_prompt: Option<&str>, history: &[Message]) -> Vec<ChatMessage> {
    let mut api_messages = Vec::with_capacity(history.len() + 1);
    if let Some(system) = system_prompt.filter(|s| !s.trim().is_empty()) {
        api_messages.push(ChatMessage::new("system", system));
    }
    api_messages.extend(history.iter().map(Message::to_api));
    api_messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_round_trip_through_strings() {
        assert_eq!(Role::try_from("user"), Ok(Role::User));
        assert_eq!(String::from(Role::Assistant), "assistant");
        assert!(Role::try_from("system").is_err());
    }

    #[test]
    fn interrupted_flag_is_omitted_when_false() {
        let value = serde_json::to_value(Message::assistant("done")).expect("serialize");
        assert!(value.get("interrupted").is_none());

        let value = serde_json::to_value(Message::interrupted_assistant("par")).expect("serialize");
        assert_eq!(value["interrupted"], true);
        assert_eq!(value["role"], "assistant");
    }

    #[test]
    fn api_messages_lead_with_system_prompt() {
        let history = vec![Message::user("Hi"), Message::assistant("Hello")];
        let api = to_api_messages(Some("be brief"), &history);
        assert_eq!(api.len(), 3);
        assert_eq!(api[0], ChatMessage::new("system", "be brief"));
        assert_eq!(api[2], ChatMessage::new("assistant", "Hello"));

        let api = to_api_messages(Some("  "), &history);
        assert_eq!(api.len(), 2);
        assert_eq!(api[0].role, "user");
    }
}
