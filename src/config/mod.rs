//! Application configuration

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::DEFAULT_MODEL_ID;
use crate::core::DEFAULT_SYSTEM_PROMPT;

/// Default readiness poll interval
pub const DEFAULT_READINESS_POLL_MS: u64 = 300;

/// Backend used when `CHAT_BACKEND` is unset
pub const DEFAULT_BACKEND: &str = "ollama";

/// Which chat backend serves requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Ollama,
    OpenAI,
    Groq,
    Local,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(BackendKind::Ollama),
            "openai" => Ok(BackendKind::OpenAI),
            "groq" => Ok(BackendKind::Groq),
            "local" => Ok(BackendKind::Local),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Backend name as configured; resolved when the provider is built
    pub backend: String,
    pub ollama_url: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub groq_api_key: Option<String>,
    pub catalog_path: Option<PathBuf>,
    pub default_model: String,
    pub readiness_poll_ms: u64,
    pub system_prompt: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Unparseable numbers fall back
    /// to their defaults. The backend name is kept verbatim so an unknown one
    /// fails when the provider is built.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            backend: lookup("CHAT_BACKEND")
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty())
                .unwrap_or_else(|| DEFAULT_BACKEND.into()),
            ollama_url: lookup("OLLAMA_URL").unwrap_or_else(|| "http://localhost:11434".into()),
            openai_api_key: lookup("OPENAI_API_KEY"),
            openai_base_url: lookup("OPENAI_BASE_URL"),
            groq_api_key: lookup("GROQ_API_KEY"),
            catalog_path: lookup("MODEL_CATALOG").map(PathBuf::from),
            default_model: lookup("DEFAULT_MODEL").unwrap_or_else(|| DEFAULT_MODEL_ID.into()),
            readiness_poll_ms: lookup("READINESS_POLL_MS")
                .and_then(|ms| ms.parse().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(DEFAULT_READINESS_POLL_MS),
            system_prompt: lookup("SYSTEM_PROMPT")
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.into()),
        }
    }

    pub fn readiness_interval(&self) -> Duration {
        Duration::from_millis(self.readiness_poll_ms)
    }
}
