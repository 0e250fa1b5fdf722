//! Turns user intents (explain a selection, summarize a page, chat) into
//! prompts and runs them through the conversation session.

use std::sync::Arc;

use tracing::debug;

use crate::core::config::SettingsProvider;
use crate::core::error::ClientError;
use crate::core::message::Message;
use crate::core::page_context::PageContextProvider;
use crate::core::session::ConversationSession;

pub const NO_MODEL_SELECTED: &str = "Please select a model first.";

const PAGE_SUMMARY_FALLBACK: &str = "Please provide a comprehensive summary of this web page.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Explain(String),
    Summarize(String),
    Translate(String),
    Improve(String),
    AskAbout { text: String, question: String },
    SummarizePage,
    Chat(String),
}

impl Intent {
    /// The prompt for intents that only depend on their own text.
    pub fn text_prompt(&self) -> Option<String> {
        let prompt = match self {
            Intent::Explain(text) => {
                format!("Please explain the following text in simple terms:\n\n\"{text}\"")
            }
            Intent::Summarize(text) => {
                format!("Please provide a concise summary of the following text:\n\n\"{text}\"")
            }
            Intent::Translate(text) => {
                format!("Please translate the following text to English:\n\n\"{text}\"")
            }
            Intent::Improve(text) => format!(
                "Please improve the writing of the following text while maintaining its meaning:\n\n\"{text}\""
            ),
            Intent::AskAbout { text, question } => {
                format!("Regarding this text: \"{text}\"\n\n{question}")
            }
            Intent::SummarizePage | Intent::Chat(_) => return None,
        };
        Some(prompt)
    }
}

pub struct RequestOrchestrator {
    session: ConversationSession,
    settings: Arc<dyn SettingsProvider>,
    page: Option<Arc<dyn PageContextProvider>>,
}

impl RequestOrchestrator {
    pub fn new(session: ConversationSession, settings: Arc<dyn SettingsProvider>) -> Self {
        Self {
            session,
            settings,
            page: None,
        }
    }

    pub fn with_page_context(mut self, page: Arc<dyn PageContextProvider>) -> Self {
        self.page = Some(page);
        self
    }

    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    /// Build the prompt for `intent`, add it as a user turn and generate the
    /// reply. Settings are read fresh on every call.
    pub async fn run(
        &self,
        intent: Intent,
        model_override: Option<&str>,
    ) -> Result<Message, ClientError> {
        let model = model_override
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .map(str::to_owned)
            .or_else(|| self.settings.selected_model())
            .ok_or_else(|| ClientError::invalid_state(NO_MODEL_SELECTED))?;

        let prompt = self.build_prompt(&intent).await;
        self.session.set_system_prompt(self.settings.system_prompt());
        self.session
            .set_streaming(self.settings.stream_responses());
        self.session.submit_user_turn(&prompt)?;

        let config = self.settings.server_config();
        debug!(model = %model, base_url = %config.base_url, "running request");
        self.session.generate(&config, &model).await
    }

    pub fn new_conversation(&self) {
        self.session.new_conversation();
    }

    pub async fn build_prompt(&self, intent: &Intent) -> String {
        if let Some(prompt) = intent.text_prompt() {
            return prompt;
        }

        match intent {
            Intent::SummarizePage => match self.page_text().await {
                Some(text) => format!(
                    "Please provide a comprehensive summary of the following web page content:\n\n{text}"
                ),
                None => PAGE_SUMMARY_FALLBACK.to_string(),
            },
            Intent::Chat(text) => match self.page_header().await {
                Some(header) => format!("{header}\n\n{text}"),
                None => text.clone(),
            },
            _ => String::new(),
        }
    }

    fn active_page(&self) -> Option<&Arc<dyn PageContextProvider>> {
        self.page
            .as_ref()
            .filter(|_| self.settings.include_page_context())
    }

    async fn page_text(&self) -> Option<String> {
        match self.active_page()?.page_text().await {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => None,
            Err(err) => {
                debug!(error = %err, "page text unavailable");
                None
            }
        }
    }

    async fn page_header(&self) -> Option<String> {
        match self.active_page()?.page_metadata().await {
            Ok(meta) => Some(format!(
                "[Context: Currently viewing \"{}\" at {}]",
                meta.title, meta.url
            )),
            Err(err) => {
                debug!(error = %err, "page metadata unavailable");
                None
            }
        }
    }
}
