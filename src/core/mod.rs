pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod orchestrator;
pub mod page_context;
pub mod render;
pub mod session;
pub mod stream_decoder;
