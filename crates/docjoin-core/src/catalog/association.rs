//! Association definitions between models.

use serde::{Deserialize, Serialize};

/// How many target documents an association yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// A single target document (or none).
    One,
    /// Any number of target documents.
    Many,
}

/// Relationship shape as declared on the owning model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nature {
    /// Single reference with no inverse.
    #[default]
    OneWay,
    OneToOne,
    ManyToOne,
    OneToMany,
    ManyToMany,
    /// Reference list with no inverse.
    ManyWay,
}

/// An association declared on a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    /// Alias (unique within the owning model).
    pub alias: String,
    /// Target model name or collection name.
    pub target: String,
    /// Namespace (plugin) the target model is registered under.
    #[serde(default)]
    pub namespace: Option<String>,
    /// Cardinality of the association.
    pub cardinality: Cardinality,
    /// Relationship shape.
    #[serde(default)]
    pub nature: Nature,
    /// Whether this side stores the link for a many-to-many relation.
    #[serde(default)]
    pub dominant: bool,
    /// Inverse field on the target model.
    #[serde(default)]
    pub via: Option<String>,
    /// Discriminator field inside the target's reference array.
    #[serde(default)]
    pub discriminator: Option<String>,
    /// Expand this association when no explicit populate list is given.
    #[serde(default)]
    pub auto_populate: bool,
}

impl Association {
    fn new(alias: impl Into<String>, target: impl Into<String>, cardinality: Cardinality) -> Self {
        Self {
            alias: alias.into(),
            target: target.into(),
            namespace: None,
            cardinality,
            nature: Nature::OneWay,
            dominant: false,
            via: None,
            discriminator: None,
            auto_populate: false,
        }
    }

    /// Create a single-document association.
    pub fn one(alias: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(alias, target, Cardinality::One)
    }

    /// Create a multi-document association.
    pub fn many(alias: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            nature: Nature::ManyWay,
            ..Self::new(alias, target, Cardinality::Many)
        }
    }

    /// Set the relationship shape.
    pub fn with_nature(mut self, nature: Nature) -> Self {
        self.nature = nature;
        self
    }

    /// Mark this side as the link owner.
    pub fn dominant(mut self) -> Self {
        self.dominant = true;
        self
    }

    /// Set the inverse field on the target.
    pub fn with_via(mut self, via: impl Into<String>) -> Self {
        self.via = Some(via.into());
        self
    }

    /// Make the association polymorphic, discriminated by `field`.
    pub fn with_discriminator(mut self, field: impl Into<String>) -> Self {
        self.discriminator = Some(field.into());
        self
    }

    /// Set the target's namespace.
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Expand automatically.
    pub fn auto_populated(mut self) -> Self {
        self.auto_populate = true;
        self
    }

    /// Check if the owning document physically stores the link.
    ///
    /// True for single-document associations and for the dominant side of a
    /// many-to-many relation.
    pub fn is_dominant_side(&self) -> bool {
        self.cardinality == Cardinality::One
            || (self.dominant && self.nature == Nature::ManyToMany)
    }

    /// Check if the target collection is shared and filtered by a
    /// discriminator.
    pub fn is_polymorphic(&self) -> bool {
        self.discriminator.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_is_dominant_side() {
        let assoc = Association::one("author", "User").with_nature(Nature::ManyToOne);
        assert_eq!(assoc.cardinality, Cardinality::One);
        assert!(assoc.is_dominant_side());
        assert!(!assoc.is_polymorphic());
    }

    #[test]
    fn test_many_to_many_dominance() {
        let owner = Association::many("tags", "Tag")
            .with_nature(Nature::ManyToMany)
            .dominant()
            .with_via("articles");
        let inverse = Association::many("articles", "Article")
            .with_nature(Nature::ManyToMany)
            .with_via("tags");

        assert!(owner.is_dominant_side());
        assert!(!inverse.is_dominant_side());
    }

    #[test]
    fn test_dominant_flag_needs_many_to_many() {
        let assoc = Association::many("comments", "Comment")
            .with_nature(Nature::OneToMany)
            .dominant();
        assert!(!assoc.is_dominant_side());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let assoc: Association = serde_json::from_str(
            r#"{"alias": "cover", "target": "file", "namespace": "upload",
                "cardinality": "one", "via": "related", "discriminator": "field"}"#,
        )
        .unwrap();

        assert_eq!(assoc.nature, Nature::OneWay);
        assert!(!assoc.dominant);
        assert!(!assoc.auto_populate);
        assert!(assoc.is_polymorphic());
        assert_eq!(assoc.namespace.as_deref(), Some("upload"));
    }
}
