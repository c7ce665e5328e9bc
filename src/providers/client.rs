//! Provider client: one call in, reply text or a typed error out

use std::sync::Arc;

use serde_json::Value;

use crate::conversation::{ChatMessage, Role};

use super::{ChatBackend, ChatOptions, ProviderError, ProviderReply};

/// Reply text used when the backend returns nothing usable
pub const NO_RESPONSE: &str = "No response";

/// Stateless wrapper around a [`ChatBackend`]
#[derive(Clone)]
pub struct AiProviderClient {
    backend: Arc<dyn ChatBackend>,
}

impl AiProviderClient {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// Send a conversation and return the normalized reply text.
    ///
    /// The conversation must end with a user message. The backend runs in its
    /// own task, so a panicking backend comes back as [`ProviderError::Aborted`].
    pub async fn send(
        &self,
        conversation: Vec<ChatMessage>,
        options: ChatOptions,
    ) -> Result<String, ProviderError> {
        match conversation.last() {
            Some(last) if last.role == Role::User => {}
            _ => {
                return Err(ProviderError::InvalidRequest(
                    "conversation must end with a user message".into(),
                ))
            }
        }

        let backend = Arc::clone(&self.backend);
        let call = tokio::spawn(async move { backend.chat(&conversation, &options).await });

        let reply = call
            .await
            .map_err(|e| ProviderError::Aborted(e.to_string()))??;

        Ok(normalize_reply(reply))
    }
}

/// Plain text passes through; structured results yield `message.content`.
/// Anything else, or blank text, becomes [`NO_RESPONSE`].
pub fn normalize_reply(reply: ProviderReply) -> String {
    let text = match reply {
        ProviderReply::Text(text) => Some(text),
        ProviderReply::Structured(value) => match value {
            Value::String(text) => Some(text),
            other => other
                .pointer("/message/content")
                .and_then(Value::as_str)
                .map(str::to_string),
        },
    };

    match text {
        Some(text) if !text.trim().is_empty() => text,
        _ => NO_RESPONSE.to_string(),
    }
}
