//! Incremental decoder for newline-delimited JSON response bodies.
//!
//! Ollama streams one JSON object per line:
//! ```text
//! {"model":"llama3.2","message":{"role":"assistant","content":"Hel"},"done":false}
//! {"model":"llama3.2","message":{"role":"assistant","content":"lo"},"done":false}
//! {"model":"llama3.2","message":{"role":"assistant","content":""},"done":true}
//! ```
//! Chunk boundaries from the transport are arbitrary, so a record (or a single
//! multi-byte character) may be split across chunks. Bytes are buffered until a
//! full line is available and only then decoded, which makes the produced event
//! sequence independent of how the body was chunked.

use std::borrow::Cow;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use memchr::memchr;
use serde_json::Value;
use tracing::debug;

use crate::core::error::ClientError;

/// Lazy, single-pass sequence of text deltas.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<String, ClientError>> + Send>>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamEvent {
    ContentDelta(String),
    Done,
    /// A non-blank line that was not valid JSON (or not valid UTF-8).
    Malformed(String),
}

/// JSON pointer locating the delta text inside one streamed record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeltaField(Cow<'static, str>);

impl DeltaField {
    /// `/api/chat` records: `{"message":{"content":"..."}}`.
    pub const CHAT: DeltaField = DeltaField(Cow::Borrowed("/message/content"));
    /// `/api/generate` records: `{"response":"..."}`.
    pub const GENERATE: DeltaField = DeltaField(Cow::Borrowed("/response"));

    pub fn pointer(pointer: impl Into<String>) -> Self {
        DeltaField(Cow::Owned(pointer.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn extract<'a>(&self, record: &'a Value) -> Option<&'a str> {
        record.pointer(&self.0).and_then(Value::as_str)
    }
}

pub struct NdjsonDecoder {
    buffer: Vec<u8>,
    field: DeltaField,
    finished: bool,
}

impl NdjsonDecoder {
    pub fn new(field: DeltaField) -> Self {
        Self {
            buffer: Vec::new(),
            field,
            finished: false,
        }
    }

    /// True once a `done` record was seen or [`finish`](Self::finish) ran.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Feed one transport chunk and return the events for every line it completed.
    ///
    /// After a `done` record nothing else is parsed, including lines already
    /// buffered behind it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }

        self.buffer.extend_from_slice(chunk);

        let mut consumed = 0;
        while let Some(offset) = memchr(b'\n', &self.buffer[consumed..]) {
            let line_end = consumed + offset;
            let done = parse_line(&self.field, &self.buffer[consumed..line_end], &mut events);
            consumed = line_end + 1;
            if done {
                self.finished = true;
                self.buffer.clear();
                return events;
            }
        }

        self.buffer.drain(..consumed);
        events
    }

    /// Signal end of input; a trailing line without a newline is parsed here.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }
        self.finished = true;

        let remaining = std::mem::take(&mut self.buffer);
        if !remaining.is_empty() {
            parse_line(&self.field, &remaining, &mut events);
        }
        events
    }
}

/// Parse one line, pushing its events. Returns true when the record ends the stream.
fn parse_line(field: &DeltaField, raw: &[u8], events: &mut Vec<StreamEvent>) -> bool {
    let text = match std::str::from_utf8(raw) {
        Ok(text) => text,
        Err(_) => {
            events.push(StreamEvent::Malformed(
                String::from_utf8_lossy(raw).into_owned(),
            ));
            return false;
        }
    };

    let line = text.trim();
    if line.is_empty() {
        return false;
    }

    let record: Value = match serde_json::from_str(line) {
        Ok(record) => record,
        Err(_) => {
            events.push(StreamEvent::Malformed(line.to_string()));
            return false;
        }
    };

    if let Some(delta) = field.extract(&record) {
        if !delta.is_empty() {
            events.push(StreamEvent::ContentDelta(delta.to_string()));
        }
    }

    if record.get("done").and_then(Value::as_bool).unwrap_or(false) {
        events.push(StreamEvent::Done);
        return true;
    }

    false
}

/// Turn a response byte stream into a lazy stream of text deltas.
///
/// Malformed lines are dropped. The stream ends at the first `done` record or at
/// end of input; a transport failure yields a single [`ClientError::Stream`].
pub fn decode_deltas<S>(byte_stream: S, field: DeltaField) -> DeltaStream
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut decoder = NdjsonDecoder::new(field);
        let mut byte_stream = std::pin::pin!(byte_stream);

        loop {
            let events = match byte_stream.next().await {
                Some(Ok(chunk)) => decoder.push(&chunk),
                Some(Err(err)) => {
                    yield Err(ClientError::Stream(err));
                    return;
                }
                None => decoder.finish(),
            };

            for event in events {
                match event {
                    StreamEvent::ContentDelta(text) => yield Ok(text),
                    StreamEvent::Done => return,
                    StreamEvent::Malformed(line) => {
                        debug!(line = %line, "skipping malformed stream line");
                    }
                }
            }

            if decoder.is_finished() {
                return;
            }
        }
    })
}
