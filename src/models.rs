//! Model catalog - the chat models the assistant can be pointed at
//!
//! The setup form only accepts a model identifier that this catalog knows
//! about; validation and the select widget both read from here.

/// Metadata about a selectable model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    /// Model identifier sent to the backend (e.g., "mistral-large-latest")
    pub id: String,
    /// Human-readable label shown in the form
    pub label: String,
}

impl ModelInfo {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Catalog of known models, in display order
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: Vec<ModelInfo>,
}

impl ModelCatalog {
    /// Create a new catalog seeded with known models
    pub fn new() -> Self {
        let mut catalog = Self { models: Vec::new() };
        catalog.seed_defaults();
        catalog
    }

    /// Get model info by identifier
    pub fn get(&self, id: &str) -> Option<&ModelInfo> {
        self.models.iter().find(|m| m.id == id)
    }

    /// True iff `id` names a model this catalog knows about
    pub fn is_known(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// All models, in display order
    pub fn list(&self) -> &[ModelInfo] {
        &self.models
    }

    /// Position of `id` in display order, if known
    pub fn position(&self, id: &str) -> Option<usize> {
        self.models.iter().position(|m| m.id == id)
    }

    /// Register a custom model at the end of the display order
    pub fn register(&mut self, info: ModelInfo) {
        if let Some(existing) = self.models.iter_mut().find(|m| m.id == info.id) {
            *existing = info;
        } else {
            self.models.push(info);
        }
    }

    fn seed_defaults(&mut self) {
        self.register(ModelInfo::new("mistral-large-latest", "Mistral Large"));
        self.register(ModelInfo::new("mistral-small-latest", "Mistral Small"));
        self.register(ModelInfo::new("open-mistral-nemo", "Mistral Nemo"));
        self.register(ModelInfo::new("codestral-latest", "Codestral"));
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new()
    }
}
