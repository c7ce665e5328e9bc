//! Model catalog
//!
//! A fixed, ordered registry of the models a session may talk to. The catalog
//! is loaded once at startup and never mutated afterwards.
//!
//! # Catalog File
//!
//! Either a JSON array:
//!
//! ```json
//! [{ "id": "gpt-4o", "name": "GPT-4o", "provider": "OpenAI" }]
//! ```
//!
//! or a TOML file with a `models` array of tables:
//!
//! ```toml
//! [[models]]
//! id = "gpt-4o"
//! name = "GPT-4o"
//! provider = "OpenAI"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Catalog shipped with the binary
const BUILTIN_MODELS: &str = include_str!("models.json");

/// Model selected when nothing else is configured
pub const DEFAULT_MODEL_ID: &str = "gpt-4o";

/// A selectable model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Identifier passed to the provider
    pub id: String,

    /// Display name
    pub name: String,

    /// Vendor shown next to the name
    pub provider: String,
}

impl Model {
    /// "GPT-4o (OpenAI)"
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.provider)
    }
}

#[cfg(test)]
impl Model {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            provider: provider.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TomlCatalog {
    models: Vec<Model>,
}

/// Immutable, non-empty list of models
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: Vec<Model>,
}

impl ModelCatalog {
    /// Build a catalog, rejecting empty lists, blank ids and duplicate ids
    pub fn new(models: Vec<Model>) -> Result<Self, CatalogError> {
        if models.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for model in &models {
            if model.id.trim().is_empty() {
                return Err(CatalogError::BlankId(model.name.clone()));
            }
            if !seen.insert(model.id.as_str()) {
                return Err(CatalogError::DuplicateId(model.id.clone()));
            }
        }

        Ok(Self { models })
    }

    /// The catalog compiled into the binary
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_MODELS)
    }

    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let models: Vec<Model> = serde_json::from_str(content)?;
        Self::new(models)
    }

    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let catalog: TomlCatalog = toml::from_str(content)?;
        Self::new(catalog.models)
    }

    /// Load a catalog file, picking the format from its extension
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&content),
            _ => Self::from_json(&content),
        }
    }

    /// All models in catalog order
    pub fn list(&self) -> &[Model] {
        &self.models
    }

    /// Exact lookup
    pub fn get(&self, id: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.id == id)
    }

    /// Look up `id`, falling back to the first catalog entry.
    ///
    /// Never fails: the catalog is non-empty by construction.
    pub fn resolve(&self, id: &str) -> &Model {
        self.get(id).unwrap_or(&self.models[0])
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }
}

/// Catalog loading errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Model catalog is empty")]
    Empty,

    #[error("Duplicate model id: {0}")]
    DuplicateId(String),

    #[error("Model has no id: {0}")]
    BlankId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
