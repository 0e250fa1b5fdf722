use crate::core::message::Message;
use chrono::Local;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Diagnostics go to stderr, filtered by `RUST_LOG` (default `warn`).
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Appends the conversation to a plain-text file as it happens.
pub struct TranscriptLog {
    file_path: Option<PathBuf>,
}

impl TranscriptLog {
    pub fn new(log_file: Option<PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        let log = TranscriptLog {
            file_path: log_file,
        };
        if let Some(path) = &log.file_path {
            Self::test_file_access(path)?;
            log.write_to_log(&format!(
                "## Session started {}",
                Local::now().format("%Y-%m-%d %H:%M:%S")
            ))?;
        }
        Ok(log)
    }

    pub fn is_active(&self) -> bool {
        self.file_path.is_some()
    }

    pub fn log_message(&self, message: &Message) -> Result<(), Box<dyn std::error::Error>> {
        if message.content.is_empty() {
            return Ok(());
        }
        let entry = if message.is_user() {
            format!("You: {}", message.content)
        } else if message.interrupted {
            format!("{}\n[interrupted]", message.content)
        } else {
            message.content.clone()
        };
        self.write_to_log(&entry)
    }

    pub fn log_note(&self, note: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.write_to_log(&format!("## {note}"))
    }

    fn write_to_log(&self, content: &str) -> Result<(), Box<dyn std::error::Error>> {
        let Some(file_path) = &self.file_path else {
            return Ok(());
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let mut writer = BufWriter::new(file);

        for line in content.lines() {
            writeln!(writer, "{line}")?;
        }
        // Blank line between entries
        writeln!(writer)?;

        writer.flush()?;
        Ok(())
    }

    fn test_file_access(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        OpenOptions::new().create(true).append(true).open(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn disabled_log_writes_nothing() {
        let log = TranscriptLog::new(None).unwrap();
        assert!(!log.is_active());
        log.log_message(&Message::user("hello")).unwrap();
    }

    #[test]
    fn transcript_records_turns_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat.log");

        let log = TranscriptLog::new(Some(path.clone())).unwrap();
        log.log_message(&Message::user("What is Rust?")).unwrap();
        log.log_message(&Message::assistant("A systems language.\nIt is fast."))
            .unwrap();
        log.log_message(&Message::interrupted_assistant("Half an ans"))
            .unwrap();
        log.log_note("New conversation").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("## Session started "));
        let body = content.split_once("\n\n").unwrap().1;
        assert_eq!(
            body,
            "You: What is Rust?\n\nA systems language.\nIt is fast.\n\nHalf an ans\n[interrupted]\n\n## New conversation\n\n"
        );
    }

    #[test]
    fn unwritable_path_is_rejected_up_front() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("chat.log");
        assert!(TranscriptLog::new(Some(path)).is_err());
    }
}
