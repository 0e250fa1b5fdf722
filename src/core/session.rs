//! A single conversation with the model server.
//!
//! The session owns the message history and guarantees that at most one
//! generation is in flight. Progress is pushed to a [`MessageRenderer`];
//! precondition failures are returned to the caller and never rendered.

use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::ChatMessage;
use crate::core::client::ModelServerClient;
use crate::core::config::ServerConfig;
use crate::core::error::ClientError;
use crate::core::message::{to_api_messages, Message};
use crate::core::render::{classify, MessageRenderer};

const ALREADY_GENERATING: &str = "A response is already being generated.";

enum Phase {
    Idle,
    Generating {
        stream_id: u64,
        cancel: CancellationToken,
    },
}

struct SessionState {
    messages: Vec<Message>,
    phase: Phase,
    current_stream_id: u64,
    system_prompt: Option<String>,
    streaming: bool,
}

impl SessionState {
    fn is_current(&self, stream_id: u64) -> bool {
        matches!(self.phase, Phase::Generating { stream_id: id, .. } if id == stream_id)
    }

    fn finish(&mut self, stream_id: u64) -> bool {
        let current = self.is_current(stream_id);
        if current {
            self.phase = Phase::Idle;
        }
        current
    }
}

struct SessionInner {
    client: ModelServerClient,
    renderer: Arc<dyn MessageRenderer>,
    state: Mutex<SessionState>,
}

impl SessionInner {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Cheap to clone; every clone drives the same conversation.
#[derive(Clone)]
pub struct ConversationSession {
    inner: Arc<SessionInner>,
}

pub struct SessionBuilder {
    client: ModelServerClient,
    renderer: Arc<dyn MessageRenderer>,
    system_prompt: Option<String>,
    streaming: bool,
}

impl SessionBuilder {
    pub fn system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt;
        self
    }

    pub fn streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn build(self) -> ConversationSession {
        ConversationSession {
            inner: Arc::new(SessionInner {
                client: self.client,
                renderer: self.renderer,
                state: Mutex::new(SessionState {
                    messages: Vec::new(),
                    phase: Phase::Idle,
                    current_stream_id: 0,
                    system_prompt: self.system_prompt,
                    streaming: self.streaming,
                }),
            }),
        }
    }
}

enum Outcome {
    Complete(String),
    Cancelled(String),
    Failed(ClientError),
}

/// Puts the session back to idle if the generate future goes away early.
struct GenerationGuard<'a> {
    inner: &'a SessionInner,
    stream_id: u64,
}

impl Drop for GenerationGuard<'_> {
    fn drop(&mut self) {
        if self.inner.lock().finish(self.stream_id) {
            debug!(stream_id = self.stream_id, "generation dropped before completion");
        }
    }
}

impl ConversationSession {
    pub fn new(client: ModelServerClient, renderer: Arc<dyn MessageRenderer>) -> Self {
        Self::builder(client, renderer).build()
    }

    pub fn builder(client: ModelServerClient, renderer: Arc<dyn MessageRenderer>) -> SessionBuilder {
        SessionBuilder {
            client,
            renderer,
            system_prompt: None,
            streaming: true,
        }
    }

    /// Applies to the next generation; a blank prompt disables it.
    pub fn set_system_prompt(&self, prompt: Option<String>) {
        self.inner.lock().system_prompt = prompt;
    }

    pub fn set_streaming(&self, streaming: bool) {
        self.inner.lock().streaming = streaming;
    }

    pub fn submit_user_turn(&self, text: &str) -> Result<(), ClientError> {
        let mut state = self.inner.lock();
        if matches!(state.phase, Phase::Generating { .. }) {
            return Err(ClientError::invalid_state(ALREADY_GENERATING));
        }
        if text.trim().is_empty() {
            return Err(ClientError::invalid_state("Message is empty."));
        }
        state.messages.push(Message::user(text));
        Ok(())
    }

    /// Ask the model to answer the trailing user message.
    ///
    /// Resolves once the reply is complete, fails, or is cancelled. Only the
    /// completed reply is appended as a normal assistant message.
    pub async fn generate(
        &self,
        config: &ServerConfig,
        model: &str,
    ) -> Result<Message, ClientError> {
        let (stream_id, token, wire_messages, streaming) = {
            let mut state = self.inner.lock();
            if model.trim().is_empty() {
                return Err(ClientError::invalid_state("Please select a model first."));
            }
            if matches!(state.phase, Phase::Generating { .. }) {
                return Err(ClientError::invalid_state(ALREADY_GENERATING));
            }
            if !state.messages.last().is_some_and(Message::is_user) {
                return Err(ClientError::invalid_state(
                    "There is no user message to respond to.",
                ));
            }

            state.current_stream_id += 1;
            let stream_id = state.current_stream_id;
            let token = CancellationToken::new();
            state.phase = Phase::Generating {
                stream_id,
                cancel: token.clone(),
            };
            let wire = to_api_messages(state.system_prompt.as_deref(), &state.messages);
            (stream_id, token, wire, state.streaming)
        };

        let _guard = GenerationGuard {
            inner: &self.inner,
            stream_id,
        };
        debug!(stream_id, model, base_url = %config.base_url, streaming, "starting generation");

        let outcome = if streaming {
            self.stream_reply(config, model, wire_messages, &token).await
        } else {
            self.complete_reply(config, model, wire_messages, &token)
                .await
        };

        self.settle(stream_id, outcome)
    }

    /// Abort the in-flight generation. Returns whether there was one.
    pub fn cancel(&self) -> bool {
        let state = self.inner.lock();
        match &state.phase {
            Phase::Generating { cancel, stream_id } => {
                debug!(stream_id, "cancelling generation");
                cancel.cancel();
                true
            }
            Phase::Idle => false,
        }
    }

    /// Drop the history. A generation still running is cancelled and its
    /// result discarded.
    pub fn new_conversation(&self) {
        let mut state = self.inner.lock();
        if let Phase::Generating { cancel, .. } = &state.phase {
            cancel.cancel();
        }
        state.phase = Phase::Idle;
        state.messages.clear();
    }

    pub fn messages(&self) -> Vec<Message> {
        self.inner.lock().messages.clone()
    }

    pub fn last_message(&self) -> Option<Message> {
        self.inner.lock().messages.last().cloned()
    }

    pub fn is_generating(&self) -> bool {
        matches!(self.inner.lock().phase, Phase::Generating { .. })
    }

    async fn stream_reply(
        &self,
        config: &ServerConfig,
        model: &str,
        messages: Vec<ChatMessage>,
        token: &CancellationToken,
    ) -> Outcome {
        let mut deltas = tokio::select! {
            biased;
            _ = token.cancelled() => return Outcome::Cancelled(String::new()),
            opened = self.inner.client.complete_stream(config, model, messages) => match opened {
                Ok(deltas) => deltas,
                Err(err) => return Outcome::Failed(err),
            },
        };

        let mut content = String::new();
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => return Outcome::Cancelled(content),
                next = deltas.next() => match next {
                    Some(Ok(delta)) => {
                        content.push_str(&delta);
                        self.inner.renderer.on_delta(&content);
                    }
                    Some(Err(err)) => return Outcome::Failed(err),
                    None => return Outcome::Complete(content),
                },
            }
        }
    }

    async fn complete_reply(
        &self,
        config: &ServerConfig,
        model: &str,
        messages: Vec<ChatMessage>,
        token: &CancellationToken,
    ) -> Outcome {
        tokio::select! {
            biased;
            _ = token.cancelled() => Outcome::Cancelled(String::new()),
            reply = self.inner.client.complete_once(config, model, messages) => match reply {
                Ok(content) => {
                    self.inner.renderer.on_delta(&content);
                    Outcome::Complete(content)
                }
                Err(err) => Outcome::Failed(err),
            },
        }
    }

    fn settle(&self, stream_id: u64, outcome: Outcome) -> Result<Message, ClientError> {
        let renderer = &self.inner.renderer;
        match outcome {
            Outcome::Complete(content) => {
                let message = Message::assistant(content);
                {
                    let mut state = self.inner.lock();
                    if !state.finish(stream_id) {
                        debug!(stream_id, "discarding reply for a reset conversation");
                        return Err(ClientError::Cancelled);
                    }
                    state.messages.push(message.clone());
                }
                renderer.on_complete(&message);
                Ok(message)
            }
            Outcome::Failed(err) => {
                debug!(stream_id, error = %err, "generation failed");
                let current = self.inner.lock().finish(stream_id);
                if current {
                    renderer.on_error(&classify(&err));
                }
                Err(err)
            }
            Outcome::Cancelled(partial) => {
                let current = {
                    let mut state = self.inner.lock();
                    let current = state.finish(stream_id);
                    if current && !partial.is_empty() {
                        state.messages.push(Message::interrupted_assistant(partial));
                    }
                    current
                };
                debug!(stream_id, current, "generation cancelled");
                if current {
                    renderer.on_error(&classify(&ClientError::Cancelled));
                }
                Err(ClientError::Cancelled)
            }
        }
    }
}
