//! Text and metadata of the "page" the user is looking at.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Character limit for page text sent in a summary request.
pub const SUMMARY_CHAR_LIMIT: usize = 8000;
/// Character limit for page text used as chat context.
pub const CHAT_CONTEXT_CHAR_LIMIT: usize = 4000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PageContextError {
    #[error("no page is available")]
    Unavailable,
    #[error("failed to read page {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Supplies the current page to the orchestrator. Both calls may fail; the
/// orchestrator decides how to degrade.
#[async_trait]
pub trait PageContextProvider: Send + Sync {
    async fn page_text(&self) -> Result<String, PageContextError>;

    async fn page_metadata(&self) -> Result<PageMetadata, PageContextError>;
}

/// A local text file (or piped text) standing in for the page.
#[derive(Debug, Clone)]
pub struct FilePageContext {
    source: PageSource,
    char_limit: usize,
}

#[derive(Debug, Clone)]
enum PageSource {
    File(PathBuf),
    Text { title: String, text: String },
}

impl FilePageContext {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: PageSource::File(path.into()),
            char_limit: SUMMARY_CHAR_LIMIT,
        }
    }

    /// Text that did not come from a file, e.g. stdin.
    pub fn from_text(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: PageSource::Text {
                title: title.into(),
                text: text.into(),
            },
            char_limit: SUMMARY_CHAR_LIMIT,
        }
    }

    pub fn with_char_limit(mut self, char_limit: usize) -> Self {
        self.char_limit = char_limit;
        self
    }

    fn read_path(path: &Path) -> Result<String, PageContextError> {
        std::fs::read_to_string(path).map_err(|source| PageContextError::Read {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[async_trait]
impl PageContextProvider for FilePageContext {
    async fn page_text(&self) -> Result<String, PageContextError> {
        let text = match &self.source {
            PageSource::File(path) => {
                let path = path.clone();
                tokio::task::spawn_blocking(move || Self::read_path(&path))
                    .await
                    .map_err(|_| PageContextError::Unavailable)??
            }
            PageSource::Text { text, .. } => text.clone(),
        };
        Ok(truncate_chars(text.trim(), self.char_limit).to_string())
    }

    async fn page_metadata(&self) -> Result<PageMetadata, PageContextError> {
        match &self.source {
            PageSource::File(path) => {
                let absolute = std::path::absolute(path).map_err(|source| {
                    PageContextError::Read {
                        path: path.clone(),
                        source,
                    }
                })?;
                let title = absolute
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| absolute.display().to_string());
                Ok(PageMetadata {
                    title,
                    url: format!("file://{}", absolute.display()),
                })
            }
            PageSource::Text { title, .. } => Ok(PageMetadata {
                title: title.clone(),
                url: "stdin:".to_string(),
            }),
        }
    }
}

/// Longest prefix of `text` holding at most `limit` characters.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
