//! Chat history management.

use crate::types::{ModelMessage, Role};

/// The user/assistant turns of one chat session.
///
/// Tool round trips of a turn are not kept; only what was asked and what
/// was finally answered.
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    messages: Vec<ModelMessage>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user message.
    pub fn add_user_message(&mut self, text: impl Into<String>) {
        self.messages.push(ModelMessage::user(text));
    }

    /// Add an assistant message.
    pub fn add_assistant_message(&mut self, text: impl Into<String>) {
        self.messages.push(ModelMessage::assistant(text));
    }

    /// Get all messages.
    pub fn messages(&self) -> &[ModelMessage] {
        &self.messages
    }

    /// Plain-text transcript, one `role: content` line per turn.
    pub fn transcript(&self) -> String {
        self.messages
            .iter()
            .map(|m| {
                let role = match m.role {
                    Role::System => "system",
                    Role::User => "user",
                    Role::Assistant => "assistant",
                    Role::Tool => "tool",
                };
                format!("{role}: {}", m.text())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Clear all messages.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_lists_turns_in_order() {
        let mut history = ChatHistory::new();
        history.add_user_message("sales for store 110?");
        history.add_assistant_message("$1.2M");
        assert_eq!(history.transcript(), "user: sales for store 110?\nassistant: $1.2M");
        assert_eq!(history.len(), 2);
        history.clear();
        assert!(history.is_empty());
    }
}
