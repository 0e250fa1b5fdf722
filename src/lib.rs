//! A client for a locally hosted Ollama model server, with a terminal host.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the model-server client, the chunk-invariant stream
//!   decoder, the single-flight conversation session, and the orchestrator
//!   that turns intents (explain, summarize, chat with page context) into
//!   prompts.
//! - [`api`] defines the request and response payloads of the Ollama API.
//! - [`cli`] is the command-line host: argument parsing, the terminal
//!   renderer, and the interactive chat loop.
//! - [`utils`] holds URL helpers and logging setup.
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod utils;
