use thiserror::Error;

/// Failures surfaced by the model-server client and the conversation session.
///
/// Malformed stream lines are not errors; the decoder skips them.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never got a response: refused connection, DNS failure, or a
    /// timeout before the first byte.
    #[error("could not reach the model server at {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("model server returned HTTP {status}")]
    Server { status: u16, body: String },

    /// The response body failed after the stream had started.
    #[error("response stream interrupted: {0}")]
    Stream(#[source] reqwest::Error),

    /// A one-shot response body was not valid JSON.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The in-flight generation was aborted by the caller.
    #[error("generation cancelled")]
    Cancelled,

    /// The caller violated a precondition; no request was made.
    #[error("{0}")]
    InvalidState(String),
}

impl ClientError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        ClientError::InvalidState(message.into())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, ClientError::Unreachable { .. })
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, ClientError::InvalidState(_))
    }
}

pub(crate) fn unreachable(url: &str, source: reqwest::Error) -> ClientError {
    ClientError::Unreachable {
        url: url.to_string(),
        source,
    }
}

/// Read the body of a failed response and build a [`ClientError::Server`].
pub(crate) async fn server_error(response: reqwest::Response) -> ClientError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<no body>".to_string());
    ClientError::Server { status, body }
}
