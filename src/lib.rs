//! Terminal chat client for the OpenAI chat completions API.

pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod llm;
pub mod logging;
pub mod session;
pub mod tui;
pub mod ui;

pub use config::{Config, GenerationParams};
pub use error::CompletionError;
pub use llm::{CompletionClient, LlmClient};
pub use session::{ChatSession, RequestState, Sender, SubmitOutcome, Turn};
