//! AI provider integrations
//!
//! A provider is split into two capabilities:
//! - [`ChatBackend`] performs one chat-completion call
//! - [`ProviderAvailability`] reports whether the backend can be reached yet
//!
//! [`AiProviderClient`] wraps a backend and turns whatever it returns into
//! plain reply text or a typed [`ProviderError`].

mod client;
mod ollama;
mod openai_compat;
mod readiness;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::{BackendKind, Config};
use crate::conversation::ChatMessage;

pub use client::AiProviderClient;
pub use ollama::OllamaProvider;
pub use openai_compat::{OpenAICompatConfig, OpenAICompatProvider};
pub use readiness::ProviderReadiness;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Provider rejected request: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Provider call aborted: {0}")]
    Aborted(String),
}

/// Per-call options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatOptions {
    pub model: String,
}

impl ChatOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }
}

/// Raw result of a backend call, before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderReply {
    /// Plain reply text
    Text(String),
    /// Structured result; text lives at `message.content`
    Structured(Value),
}

/// The external chat-completion capability
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ProviderReply, ProviderError>;
}

/// Readiness probe for a backend
#[async_trait]
pub trait ProviderAvailability: Send + Sync {
    async fn is_available(&self) -> bool;
}

/// Configured backend
pub enum Provider {
    Ollama(OllamaProvider),
    OpenAICompat(OpenAICompatProvider),
}

impl Provider {
    pub fn from_name(name: &str, config: &Config) -> Result<Self, ProviderError> {
        let kind: BackendKind = name
            .parse()
            .map_err(|_| ProviderError::UnknownProvider(name.to_string()))?;
        Self::from_kind(kind, config)
    }

    /// Build the backend named by `CHAT_BACKEND`
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        Self::from_name(&config.backend, config)
    }

    fn from_kind(kind: BackendKind, config: &Config) -> Result<Self, ProviderError> {
        match kind {
            BackendKind::Ollama => Ok(Provider::Ollama(OllamaProvider::new(
                config.ollama_url.clone(),
            )?)),
            BackendKind::OpenAI => {
                let key = config
                    .openai_api_key
                    .clone()
                    .ok_or_else(|| ProviderError::NotConfigured("OPENAI_API_KEY".into()))?;
                let mut compat = OpenAICompatConfig::openai(key);
                if let Some(ref url) = config.openai_base_url {
                    compat.base_url = url.clone();
                }
                Ok(Provider::OpenAICompat(OpenAICompatProvider::new(compat)?))
            }
            BackendKind::Groq => {
                let key = config
                    .groq_api_key
                    .clone()
                    .ok_or_else(|| ProviderError::NotConfigured("GROQ_API_KEY".into()))?;
                Ok(Provider::OpenAICompat(OpenAICompatProvider::new(
                    OpenAICompatConfig::groq(key),
                )?))
            }
            BackendKind::Local => {
                let url = config
                    .openai_base_url
                    .clone()
                    .ok_or_else(|| ProviderError::NotConfigured("OPENAI_BASE_URL".into()))?;
                let mut compat = OpenAICompatConfig::local(url);
                compat.api_key = config.openai_api_key.clone();
                Ok(Provider::OpenAICompat(OpenAICompatProvider::new(compat)?))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Ollama(_) => "ollama",
            Provider::OpenAICompat(_) => "openai-compatible",
        }
    }
}

#[async_trait]
impl ChatBackend for Provider {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ProviderReply, ProviderError> {
        match self {
            Provider::Ollama(p) => p.chat(messages, &options.model).await,
            Provider::OpenAICompat(p) => p.chat(messages, &options.model).await,
        }
    }
}

#[async_trait]
impl ProviderAvailability for Provider {
    async fn is_available(&self) -> bool {
        match self {
            Provider::Ollama(p) => p.probe().await,
            Provider::OpenAICompat(p) => p.probe().await,
        }
    }
}
