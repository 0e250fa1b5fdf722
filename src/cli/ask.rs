//! One-shot commands: explain, summarize, translate, improve, ask, summarize-page

use std::error::Error;
use std::sync::Arc;

use crate::cli::renderer::TerminalRenderer;
use crate::cli::PageSource;
use crate::core::client::ModelServerClient;
use crate::core::config::SharedSettings;
use crate::core::error::ClientError;
use crate::core::orchestrator::{Intent, RequestOrchestrator, NO_MODEL_SELECTED};
use crate::core::page_context::{FilePageContext, PageContextProvider, SUMMARY_CHAR_LIMIT};
use crate::core::session::ConversationSession;
use crate::utils::logging::TranscriptLog;

pub async fn run_intent(
    settings: SharedSettings,
    intent: Intent,
    model: Option<String>,
    page: Option<PageSource>,
    log: Arc<TranscriptLog>,
) -> Result<(), Box<dyn Error>> {
    let session = ConversationSession::new(
        ModelServerClient::new(),
        Arc::new(TerminalRenderer::new()),
    );
    let mut orchestrator = RequestOrchestrator::new(session, Arc::new(settings));
    if let Some(page) = page {
        orchestrator = orchestrator.with_page_context(page_provider(page, SUMMARY_CHAR_LIMIT));
    }

    let result = orchestrator.run(intent, model.as_deref()).await;
    log_messages_since(&log, orchestrator.session(), 0);

    if let Err(err) = result {
        report_unrendered(&err);
        std::process::exit(1);
    }
    Ok(())
}

pub(crate) fn page_provider(page: PageSource, char_limit: usize) -> Arc<dyn PageContextProvider> {
    let provider = match page {
        PageSource::File(path) => FilePageContext::from_path(path),
        PageSource::Piped(text) => FilePageContext::from_text("stdin", text),
    };
    Arc::new(provider.with_char_limit(char_limit))
}

/// Append the messages from index `start` onwards to the transcript.
pub(crate) fn log_messages_since(log: &TranscriptLog, session: &ConversationSession, start: usize) {
    if !log.is_active() {
        return;
    }
    for message in session.messages().iter().skip(start) {
        if let Err(e) = log.log_message(message) {
            eprintln!("⚠️  Failed to write transcript: {e}");
            return;
        }
    }
}

/// Precondition failures are returned rather than rendered; show them here.
pub(crate) fn report_unrendered(err: &ClientError) {
    let ClientError::InvalidState(message) = err else {
        return;
    };
    eprintln!("❌ {message}");
    if message == NO_MODEL_SELECTED {
        eprintln!();
        eprintln!("💡 List installed models with 'ollama-assistant models', then run:");
        eprintln!("  ollama-assistant set model <name>");
    }
}
