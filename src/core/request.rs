//! Provider request building

use crate::catalog::Model;
use crate::conversation::{ChatMessage, Message};
use crate::providers::ChatOptions;

/// Instruction sent ahead of every conversation
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Everything one provider call needs
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub options: ChatOptions,
}

/// One synthetic system message followed by the whole history, in order.
///
/// Pure: the system message is rebuilt for every request and never stored.
pub fn build_request(system_prompt: &str, history: &[Message], model: &Model) -> ChatRequest {
    let messages = std::iter::once(ChatMessage::system(system_prompt))
        .chain(history.iter().map(ChatMessage::from))
        .collect();

    ChatRequest {
        messages,
        options: ChatOptions::new(model.id.clone()),
    }
}
