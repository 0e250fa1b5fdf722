use std::sync::Mutex;

use ollama_assistant::core::message::Message;
use ollama_assistant::core::render::{ErrorNotice, MessageRenderer, NoticeKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Delta(String),
    Complete(Message),
    Error(NoticeKind),
}

#[derive(Default)]
pub struct RecordingRenderer {
    events: Mutex<Vec<Event>>,
}

impl RecordingRenderer {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().expect("renderer lock").clone()
    }

    pub fn errors(&self) -> Vec<NoticeKind> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Error(kind) => Some(kind),
                _ => None,
            })
            .collect()
    }
}

impl MessageRenderer for RecordingRenderer {
    fn on_delta(&self, full_text: &str) {
        self.events
            .lock()
            .expect("renderer lock")
            .push(Event::Delta(full_text.to_string()));
    }

    fn on_complete(&self, message: &Message) {
        self.events
            .lock()
            .expect("renderer lock")
            .push(Event::Complete(message.clone()));
    }

    fn on_error(&self, notice: &ErrorNotice) {
        self.events
            .lock()
            .expect("renderer lock")
            .push(Event::Error(notice.kind));
    }
}

pub fn chat_chunks(parts: &[&str]) -> String {
    let mut body = String::new();
    for part in parts {
        body.push_str(
            &serde_json::json!({ "message": { "role": "assistant", "content": part }, "done": false })
                .to_string(),
        );
        body.push('\n');
    }
    body.push_str(r#"{"message":{"role":"assistant","content":""},"done":true}"#);
    body.push('\n');
    body
}
