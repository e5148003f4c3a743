//! Association resolution capability.

use super::{Association, ModelDef};

/// Read-only access to model and association metadata.
///
/// The compiler receives an implementation explicitly instead of reaching
/// into shared registry state, so tests can run against fixture registries.
pub trait AssociationResolver {
    /// Resolve a model by name or collection name within a namespace.
    fn resolve_model(&self, namespace: Option<&str>, name: &str) -> Option<&ModelDef>;

    /// Resolve an association of `model` by alias.
    fn resolve_association<'m>(&self, model: &'m ModelDef, alias: &str) -> Option<&'m Association> {
        model.association(alias)
    }

    /// Resolve the target model of an association.
    fn resolve_target(&self, association: &Association) -> Option<&ModelDef> {
        self.resolve_model(association.namespace.as_deref(), &association.target)
    }
}
