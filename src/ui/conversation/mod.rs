//! Conversation UI components for the chat screen

pub mod composer;
pub mod history;
pub mod indicator;
pub mod manager;

pub use composer::{ComposerResult, ConversationComposer};
pub use history::ConversationHistory;
pub use indicator::WaitingIndicator;
pub use manager::{ConversationAction, ConversationLayout, ConversationManager};
