//! Schema bundle - versioned snapshot of every registered model.

use super::{AssociationResolver, ModelDef};
use crate::error::Error;
use serde::{Deserialize, Serialize};

/// A versioned snapshot of the model registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaBundle {
    /// Schema version (assigned by the catalog).
    #[serde(default)]
    pub version: u64,
    /// Models in registration order.
    #[serde(default)]
    pub models: Vec<ModelDef>,
}

impl SchemaBundle {
    /// Create an empty schema bundle.
    pub fn new(version: u64) -> Self {
        Self {
            version,
            models: Vec::new(),
        }
    }

    /// Decode a schema bundle from JSON text and validate it.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        let bundle: Self =
            serde_json::from_str(text).map_err(|e| Error::InvalidSchema(e.to_string()))?;
        bundle.validate()?;
        Ok(bundle)
    }

    /// Add a model to the schema.
    pub fn with_model(mut self, model: ModelDef) -> Self {
        self.models.push(model);
        self
    }

    /// Get a model by name or collection name, in any namespace.
    pub fn get_model(&self, name: &str) -> Option<&ModelDef> {
        self.models.iter().find(|m| m.answers_to(name))
    }

    /// List all model names.
    pub fn model_names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.name.as_str()).collect()
    }

    /// Check registry invariants.
    pub fn validate(&self) -> Result<(), Error> {
        for model in &self.models {
            if let Some(alias) = model.duplicate_alias() {
                return Err(Error::DuplicateAlias {
                    model: model.name.clone(),
                    alias: alias.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl AssociationResolver for SchemaBundle {
    fn resolve_model(&self, namespace: Option<&str>, name: &str) -> Option<&ModelDef> {
        self.models
            .iter()
            .find(|m| m.namespace.as_deref() == namespace && m.answers_to(name))
    }
}
