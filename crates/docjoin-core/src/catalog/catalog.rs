//! Catalog manager holding the current schema.

use super::SchemaBundle;
use crate::error::Error;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Thread-safe holder of the current schema bundle.
///
/// Readers take an [`Arc`] snapshot; applying a new schema swaps the
/// snapshot without affecting compiles already holding the old one.
pub struct Catalog {
    /// Current schema version (cached).
    current_version: AtomicU64,
    /// Current schema.
    current_schema: RwLock<Arc<SchemaBundle>>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            current_version: AtomicU64::new(0),
            current_schema: RwLock::new(Arc::new(SchemaBundle::default())),
        }
    }

    /// Create a catalog and apply an initial schema.
    pub fn with_schema(bundle: SchemaBundle) -> Result<Self, Error> {
        let catalog = Self::new();
        catalog.apply_schema(bundle)?;
        Ok(catalog)
    }

    /// Get the current schema version.
    pub fn current_version(&self) -> u64 {
        self.current_version.load(Ordering::SeqCst)
    }

    /// Apply a new schema bundle.
    ///
    /// The bundle is validated and stamped with the next version number.
    /// Returns the new version number.
    pub fn apply_schema(&self, mut bundle: SchemaBundle) -> Result<u64, Error> {
        bundle.validate()?;

        let mut guard = self.current_schema.write();
        let new_version = self.current_version() + 1;
        bundle.version = new_version;
        *guard = Arc::new(bundle);
        self.current_version.store(new_version, Ordering::SeqCst);

        info!(
            version = new_version,
            models = guard.models.len(),
            "Applied schema"
        );
        Ok(new_version)
    }

    /// Immutable view of the current schema.
    pub fn snapshot(&self) -> Arc<SchemaBundle> {
        Arc::clone(&self.current_schema.read())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Association, ModelDef};

    fn sample_schema() -> SchemaBundle {
        SchemaBundle::new(0)
            .with_model(
                ModelDef::new("Article", "articles")
                    .with_association(Association::one("author", "User")),
            )
            .with_model(ModelDef::new("User", "users"))
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::new();
        assert_eq!(catalog.current_version(), 0);
        assert!(catalog.snapshot().models.is_empty());
    }

    #[test]
    fn test_apply_schema_bumps_version() {
        let catalog = Catalog::new();
        assert_eq!(catalog.apply_schema(sample_schema()).unwrap(), 1);
        assert_eq!(catalog.apply_schema(sample_schema()).unwrap(), 2);
        assert_eq!(catalog.current_version(), 2);
        assert_eq!(catalog.snapshot().version, 2);
    }

    #[test]
    fn test_snapshot_survives_schema_change() {
        let catalog = Catalog::with_schema(sample_schema()).unwrap();
        let before = catalog.snapshot();

        catalog.apply_schema(SchemaBundle::new(0)).unwrap();

        assert_eq!(before.models.len(), 2);
        assert!(catalog.snapshot().models.is_empty());
    }

    #[test]
    fn test_invalid_schema_is_rejected() {
        let catalog = Catalog::new();
        let bad = SchemaBundle::new(0).with_model(
            ModelDef::new("Article", "articles")
                .with_association(Association::one("author", "User"))
                .with_association(Association::one("author", "User")),
        );

        assert!(catalog.apply_schema(bad).is_err());
        assert_eq!(catalog.current_version(), 0);
    }
}
