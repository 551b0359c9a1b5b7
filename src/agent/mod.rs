//! The store assistant: chat history plus the tool loop.

pub mod assistant;
pub mod history;

pub use assistant::{StoreAssistant, DEFAULT_INSTRUCTIONS};
pub use history::ChatHistory;
