//! Prints a generation to the terminal as it streams in.

use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::core::message::Message;
use crate::core::render::{ErrorNotice, MessageRenderer, NoticeKind};

/// Streams assistant text to stdout and notices to stderr.
///
/// The session hands over the full text on every delta; only the part not
/// yet printed is written.
#[derive(Default)]
pub struct TerminalRenderer {
    printed: Mutex<usize>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn printed(&self) -> MutexGuard<'_, usize> {
        self.printed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Writes the unprinted suffix of `full_text` to `out`.
    ///
    /// Progress only advances once the write and flush succeed.
    fn print_new_text(&self, out: &mut impl Write, full_text: &str) {
        let mut printed = self.printed();
        let new_text = unprinted(full_text, *printed);
        if new_text.is_empty() {
            return;
        }
        match out
            .write_all(new_text.as_bytes())
            .and_then(|()| out.flush())
        {
            Ok(()) => *printed = full_text.len(),
            Err(err) => debug!(error = %err, "failed to write reply to stdout"),
        }
    }
}

/// The part of `full_text` after the first `printed` bytes.
fn unprinted(full_text: &str, printed: usize) -> &str {
    full_text.get(printed..).unwrap_or_default()
}

impl MessageRenderer for TerminalRenderer {
    fn on_delta(&self, full_text: &str) {
        self.print_new_text(&mut io::stdout().lock(), full_text);
    }

    fn on_complete(&self, _message: &Message) {
        *self.printed() = 0;
        println!();
    }

    fn on_error(&self, notice: &ErrorNotice) {
        let mut printed = self.printed();
        if *printed > 0 {
            println!();
        }
        *printed = 0;
        match notice.kind {
            NoticeKind::Cancelled => eprintln!("⏹️  {}", notice.message),
            _ => eprintln!("❌ {}", notice.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_new_suffix_is_printed() {
        assert_eq!(unprinted("Hello", 0), "Hello");
        assert_eq!(unprinted("Hello world", 5), " world");
        assert_eq!(unprinted("Hi", 2), "");
        assert_eq!(unprinted("Hi", 7), "");
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn new_text_is_written_once() {
        let renderer = TerminalRenderer::new();
        let mut out = Vec::new();
        renderer.print_new_text(&mut out, "Hel");
        renderer.print_new_text(&mut out, "Hello");
        renderer.print_new_text(&mut out, "Hello");
        assert_eq!(out, b"Hello");
        assert_eq!(*renderer.printed(), 5);
    }

    #[test]
    fn failed_write_does_not_advance_progress() {
        let renderer = TerminalRenderer::new();
        renderer.print_new_text(&mut ClosedPipe, "Hello");
        assert_eq!(*renderer.printed(), 0);

        let mut out = Vec::new();
        renderer.print_new_text(&mut out, "Hello");
        assert_eq!(out, b"Hello");
    }

    #[test]
    fn completion_resets_progress() {
        let renderer = TerminalRenderer::new();
        renderer.on_delta("abc");
        assert_eq!(*renderer.printed(), 3);
        renderer.on_complete(&Message::assistant("abc"));
        assert_eq!(*renderer.printed(), 0);
    }
}
