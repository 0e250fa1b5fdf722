//! Line-based interactive chat.
//!
//! `/new` starts a fresh conversation, `/quit` exits, and Ctrl+C cancels the
//! reply being generated (or exits when nothing is running).

use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::ask::{log_messages_since, page_provider, report_unrendered};
use crate::cli::renderer::TerminalRenderer;
use crate::cli::PageSource;
use crate::core::client::ModelServerClient;
use crate::core::config::{SettingsProvider, SharedSettings};
use crate::core::orchestrator::{Intent, RequestOrchestrator};
use crate::core::page_context::CHAT_CONTEXT_CHAR_LIMIT;
use crate::core::session::ConversationSession;
use crate::utils::logging::TranscriptLog;

#[derive(Debug, PartialEq, Eq)]
enum ChatInput {
    Quit,
    NewConversation,
    Message(String),
    Empty,
}

fn parse_input(line: &str) -> ChatInput {
    let trimmed = line.trim();
    match trimmed {
        "" => ChatInput::Empty,
        "/quit" | "/exit" => ChatInput::Quit,
        "/new" => ChatInput::NewConversation,
        _ => ChatInput::Message(trimmed.to_string()),
    }
}

pub async fn run_chat(
    settings: SharedSettings,
    model: Option<String>,
    page: Option<PathBuf>,
    log: Arc<TranscriptLog>,
) -> Result<(), Box<dyn Error>> {
    let session = ConversationSession::new(
        ModelServerClient::new(),
        Arc::new(TerminalRenderer::new()),
    );
    let model_label = model
        .clone()
        .or_else(|| settings.selected_model())
        .unwrap_or_else(|| "(none selected)".to_string());
    let base_url = settings.base_url();

    let mut orchestrator = RequestOrchestrator::new(session.clone(), Arc::new(settings));
    if let Some(path) = page {
        orchestrator = orchestrator
            .with_page_context(page_provider(PageSource::File(path), CHAT_CONTEXT_CHAR_LIMIT));
    }

    eprintln!("🦙 Chatting with {model_label} at {base_url}");
    eprintln!("💡 /new starts over, /quit exits, Ctrl+C stops a reply");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };

        match parse_input(&line) {
            ChatInput::Empty => continue,
            ChatInput::Quit => break,
            ChatInput::NewConversation => {
                orchestrator.new_conversation();
                if let Err(e) = log.log_note("New conversation") {
                    eprintln!("⚠️  Failed to write transcript: {e}");
                }
                eprintln!("🧹 Started a new conversation");
            }
            ChatInput::Message(text) => {
                let start = session.messages().len();
                let run = orchestrator.run(Intent::Chat(text), model.as_deref());
                tokio::pin!(run);

                let result = loop {
                    tokio::select! {
                        result = &mut run => break result,
                        _ = tokio::signal::ctrl_c() => {
                            session.cancel();
                        }
                    }
                };

                log_messages_since(&log, &session, start);
                if let Err(err) = result {
                    report_unrendered(&err);
                }
            }
        }
    }

    Ok(())
}
