//! The render collaborator and the mapping from [`ClientError`] to what the
//! user is shown.

use crate::core::error::ClientError;
use crate::core::message::Message;

/// Receives the visible progress of a generation.
///
/// `on_delta` gets the full accumulated text each time, not just the new
/// fragment, so a renderer can redraw without keeping its own buffer.
pub trait MessageRenderer: Send + Sync {
    fn on_delta(&self, full_text: &str);

    fn on_complete(&self, message: &Message);

    fn on_error(&self, notice: &ErrorNotice);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// HTTP 403: the server refused the origin.
    ConnectionRejected,
    Unreachable,
    Server,
    Interrupted,
    Cancelled,
    InvalidState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub kind: NoticeKind,
    pub message: String,
}

impl ErrorNotice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

pub const CONNECTION_REJECTED_HELP: &str = "Connection Rejected (403)

Ollama blocked the connection because the request origin is not allowed.

To fix this:
1. Quit Ollama completely (right-click the tray icon and choose Quit)
2. Allow all origins, e.g. in PowerShell:
   [Environment]::SetEnvironmentVariable(\"OLLAMA_ORIGINS\", \"*\", \"User\")
   or on Linux/macOS: export OLLAMA_ORIGINS=\"*\"
3. Start Ollama again

If you already set OLLAMA_ORIGINS, make sure Ollama was fully quit and restarted.";

pub fn classify(error: &ClientError) -> ErrorNotice {
    match error {
        ClientError::Server { status: 403, .. } => {
            ErrorNotice::new(NoticeKind::ConnectionRejected, CONNECTION_REJECTED_HELP)
        }
        ClientError::Server { status, body } => {
            let message = match error_summary(body) {
                Some(summary) => format!("Error: HTTP {status}: {summary}"),
                None => format!("Error: HTTP {status}"),
            };
            ErrorNotice::new(NoticeKind::Server, message)
        }
        ClientError::Unreachable { url, .. } => ErrorNotice::new(
            NoticeKind::Unreachable,
            format!(
                "Error: could not connect to Ollama at {url}. Make sure Ollama is running and the base URL is correct."
            ),
        ),
        ClientError::Stream(_) | ClientError::Decode(_) => {
            ErrorNotice::new(NoticeKind::Interrupted, format!("Error: {error}"))
        }
        ClientError::Cancelled => ErrorNotice::new(NoticeKind::Cancelled, "Generation cancelled."),
        ClientError::InvalidState(message) => {
            ErrorNotice::new(NoticeKind::InvalidState, message.clone())
        }
    }
}

/// Pull a one-line reason out of an error body. Ollama answers with
/// `{"error": "..."}`; anything else is used as plain text.
fn error_summary(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "<no body>" {
        return None;
    }

    let text = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => value
            .pointer("/error/message")
            .or_else(|| value.get("error"))
            .or_else(|| value.get("message"))
            .and_then(|v| v.as_str())
            .map(str::to_owned)?,
        Err(_) => trimmed.to_string(),
    };

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(status: u16, body: &str) -> ClientError {
        ClientError::Server {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn forbidden_gets_origin_remediation() {
        let notice = classify(&server(403, ""));
        assert_eq!(notice.kind, NoticeKind::ConnectionRejected);
        assert!(notice.message.starts_with("Connection Rejected (403)"));
        assert!(notice.message.contains("OLLAMA_ORIGINS"));
        assert!(notice.message.contains("restart"));
    }

    #[test]
    fn other_statuses_carry_server_reason() {
        let notice = classify(&server(404, r#"{"error":"model 'nope' not found"}"#));
        assert_eq!(notice.kind, NoticeKind::Server);
        assert_eq!(notice.message, "Error: HTTP 404: model 'nope' not found");

        let notice = classify(&server(500, "  internal\n  failure "));
        assert_eq!(notice.message, "Error: HTTP 500: internal failure");

        let notice = classify(&server(502, "<no body>"));
        assert_eq!(notice.message, "Error: HTTP 502");
    }

    #[test]
    fn json_without_reason_falls_back_to_status() {
        let notice = classify(&server(500, r#"{"status":"failed"}"#));
        assert_eq!(notice.message, "Error: HTTP 500");
    }

    #[test]
    fn cancel_and_invalid_state_are_distinct() {
        assert_eq!(classify(&ClientError::Cancelled).kind, NoticeKind::Cancelled);

        let notice = classify(&ClientError::invalid_state("Please select a model first."));
        assert_eq!(notice.kind, NoticeKind::InvalidState);
        assert_eq!(notice.message, "Please select a model first.");
    }

    #[test]
    fn decode_failures_are_reported_as_interrupted() {
        let notice = classify(&ClientError::Decode("expected value".into()));
        assert_eq!(notice.kind, NoticeKind::Interrupted);
        assert!(notice.message.contains("expected value"));
    }
}
