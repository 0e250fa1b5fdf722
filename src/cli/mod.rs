//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod ask;
pub mod chat;
pub mod model_list;
pub mod renderer;
pub mod settings;

#[cfg(test)]
mod tests;

use std::error::Error;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;

use crate::cli::ask::run_intent;
use crate::cli::chat::run_chat;
use crate::cli::model_list::{list_models, show_status};
use crate::cli::settings::{set_setting, show_config, unset_setting};
use crate::core::config::{Config, SharedSettings};
use crate::core::orchestrator::Intent;
use crate::utils::logging::{init_tracing, TranscriptLog};

#[derive(Parser)]
#[command(name = "ollama-assistant")]
#[command(version)]
#[command(about = "Ask a local Ollama server to explain, summarize, translate, or chat")]
#[command(
    long_about = "ollama-assistant talks to a locally running Ollama server. It can explain, \
summarize, translate, or improve a piece of text, summarize a page (a local file), \
or hold a streaming chat that can be cancelled with Ctrl+C.\n\n\
Text arguments may be omitted, in which case the text is read from stdin.\n\n\
Settings are stored in a TOML file; see 'ollama-assistant config'.\n\
Set RUST_LOG=debug for diagnostic output on stderr."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Ollama server address for this run (overrides the saved base-url)
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Model to use for this run (overrides the saved model)
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Append the conversation to the specified file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that the server is reachable
    Status,
    /// List installed models
    Models,
    /// Send a prompt and print the reply
    Ask {
        #[arg(trailing_var_arg = true)]
        prompt: Vec<String>,
    },
    /// Explain text in simple terms
    Explain {
        #[arg(trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Summarize text concisely
    Summarize {
        #[arg(trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Translate text to English
    Translate {
        #[arg(trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Improve the writing of text
    Improve {
        #[arg(trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Summarize a page (a text file, or stdin)
    SummarizePage {
        #[arg(long, value_name = "FILE")]
        page: Option<PathBuf>,
    },
    /// Start an interactive chat (default)
    Chat {
        /// File whose name and location are shared as page context
        #[arg(long, value_name = "FILE")]
        page: Option<PathBuf>,
    },
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set (multiple words are joined with spaces)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// Show the effective configuration
    Config,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let model = args.model.clone();

    match args.command.unwrap_or(Commands::Chat { page: None }) {
        Commands::Set { key, value } => set_setting(&key, &value.join(" ")),
        Commands::Unset { key } => unset_setting(&key),
        Commands::Config => show_config(),
        Commands::Status => show_status(&load_settings(args.base_url)?).await,
        Commands::Models => list_models(&load_settings(args.base_url)?).await,
        Commands::Chat { page } => {
            let settings = load_settings(args.base_url)?;
            let log = Arc::new(TranscriptLog::new(args.log)?);
            run_chat(settings, model, page, log).await
        }
        Commands::Ask { prompt } => {
            let intent = Intent::Chat(text_or_stdin(prompt).await?);
            one_shot(args.base_url, args.log, model, intent, None).await
        }
        Commands::Explain { text } => {
            let intent = Intent::Explain(text_or_stdin(text).await?);
            one_shot(args.base_url, args.log, model, intent, None).await
        }
        Commands::Summarize { text } => {
            let intent = Intent::Summarize(text_or_stdin(text).await?);
            one_shot(args.base_url, args.log, model, intent, None).await
        }
        Commands::Translate { text } => {
            let intent = Intent::Translate(text_or_stdin(text).await?);
            one_shot(args.base_url, args.log, model, intent, None).await
        }
        Commands::Improve { text } => {
            let intent = Intent::Improve(text_or_stdin(text).await?);
            one_shot(args.base_url, args.log, model, intent, None).await
        }
        Commands::SummarizePage { page } => {
            let page = page_source(page).await?;
            one_shot(args.base_url, args.log, model, Intent::SummarizePage, page).await
        }
    }
}

async fn one_shot(
    base_url: Option<String>,
    log: Option<PathBuf>,
    model: Option<String>,
    intent: Intent,
    page: Option<PageSource>,
) -> Result<(), Box<dyn Error>> {
    let settings = load_settings(base_url)?;
    let log = Arc::new(TranscriptLog::new(log)?);
    run_intent(settings, intent, model, page, log).await
}

/// Saved settings with this run's `--base-url` applied on top.
fn load_settings(base_url: Option<String>) -> Result<SharedSettings, Box<dyn Error>> {
    let mut config = Config::load()?;
    if let Some(url) = base_url.filter(|url| !url.trim().is_empty()) {
        config.base_url = Some(url);
    }
    Ok(SharedSettings::new(config))
}

async fn text_or_stdin(words: Vec<String>) -> Result<String, Box<dyn Error>> {
    let text = words.join(" ");
    if !text.trim().is_empty() {
        return Ok(text);
    }
    if std::io::stdin().is_terminal() {
        return Err("❌ No text given. Pass it as arguments or pipe it on stdin.".into());
    }
    Ok(read_stdin().await?)
}

/// Where a page comes from on the command line.
pub enum PageSource {
    File(PathBuf),
    Piped(String),
}

async fn page_source(page: Option<PathBuf>) -> Result<Option<PageSource>, Box<dyn Error>> {
    if let Some(path) = page {
        return Ok(Some(PageSource::File(path)));
    }
    if std::io::stdin().is_terminal() {
        return Ok(None);
    }
    Ok(Some(PageSource::Piped(read_stdin().await?)))
}

async fn read_stdin() -> std::io::Result<String> {
    let mut text = String::new();
    tokio::io::stdin().read_to_string(&mut text).await?;
    Ok(text)
}
