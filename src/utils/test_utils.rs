#[cfg(test)]
use crate::core::message::Message;
#[cfg(test)]
use crate::core::render::{ErrorNotice, MessageRenderer, NoticeKind};
#[cfg(test)]
use std::sync::Mutex;

#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedEvent {
    Delta(String),
    Complete(Message),
    Error(NoticeKind),
}

/// Renderer that remembers every callback, in order.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingRenderer {
    events: Mutex<Vec<RecordedEvent>>,
}

#[cfg(test)]
impl RecordingRenderer {
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().expect("renderer lock").clone()
    }

    fn record(&self, event: RecordedEvent) {
        self.events.lock().expect("renderer lock").push(event);
    }
}

#[cfg(test)]
impl MessageRenderer for RecordingRenderer {
    fn on_delta(&self, full_text: &str) {
        self.record(RecordedEvent::Delta(full_text.to_string()));
    }

    fn on_complete(&self, message: &Message) {
        self.record(RecordedEvent::Complete(message.clone()));
    }

    fn on_error(&self, notice: &ErrorNotice) {
        self.record(RecordedEvent::Error(notice.kind));
    }
}
