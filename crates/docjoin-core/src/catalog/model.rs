//! Model definitions.

use super::association::Association;
use serde::{Deserialize, Serialize};

/// A model (document collection schema) and its associations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDef {
    /// Model name.
    pub name: String,
    /// Backing collection name.
    pub collection_name: String,
    /// Namespace (plugin) the model is registered under.
    #[serde(default)]
    pub namespace: Option<String>,
    /// Associations in declaration order.
    #[serde(default)]
    pub associations: Vec<Association>,
}

impl ModelDef {
    /// Create a new model definition.
    pub fn new(name: impl Into<String>, collection_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collection_name: collection_name.into(),
            namespace: None,
            associations: Vec::new(),
        }
    }

    /// Register the model under a namespace.
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Add an association.
    pub fn with_association(mut self, association: Association) -> Self {
        self.associations.push(association);
        self
    }

    /// Get an association by alias.
    pub fn association(&self, alias: &str) -> Option<&Association> {
        self.associations.iter().find(|a| a.alias == alias)
    }

    /// Check whether the model answers to `name` (model or collection name).
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.collection_name == name
    }

    /// First alias declared more than once, if any.
    pub fn duplicate_alias(&self) -> Option<&str> {
        self.associations.iter().enumerate().find_map(|(i, a)| {
            self.associations[..i]
                .iter()
                .any(|earlier| earlier.alias == a.alias)
                .then_some(a.alias.as_str())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_association_lookup() {
        let model = ModelDef::new("Article", "articles")
            .with_association(Association::one("author", "User"))
            .with_association(Association::many("comments", "Comment"));

        assert_eq!(model.association("author").map(|a| a.target.as_str()), Some("User"));
        assert!(model.association("editor").is_none());
    }

    #[test]
    fn test_answers_to_name_or_collection() {
        let model = ModelDef::new("User", "users");
        assert!(model.answers_to("User"));
        assert!(model.answers_to("users"));
        assert!(!model.answers_to("user"));
    }

    #[test]
    fn test_duplicate_alias_detection() {
        let model = ModelDef::new("Article", "articles")
            .with_association(Association::one("author", "User"))
            .with_association(Association::many("author", "User"));
        assert_eq!(model.duplicate_alias(), Some("author"));

        let clean = ModelDef::new("Article", "articles")
            .with_association(Association::one("author", "User"));
        assert_eq!(clean.duplicate_alias(), None);
    }
}
