//! Compiler configuration.

use serde::{Deserialize, Serialize};

/// Default primary key field.
pub const DEFAULT_ID_FIELD: &str = "_id";

/// Default namespace for temporary lookup fields.
pub const DEFAULT_TEMP_FIELD_PREFIX: &str = "__";

/// Default reference key inside a polymorphic reference array.
pub const DEFAULT_POLYMORPHIC_REF_FIELD: &str = "ref";

/// Default `via` value that keeps dominant joins on the id field.
pub const DEFAULT_RELATED_VIA: &str = "related";

/// Pipeline compiler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Primary key field of every collection.
    pub id_field: String,

    /// Prefix of temporary lookup output fields.
    pub temp_field_prefix: String,

    /// Reference key inside a polymorphic association's reference array.
    pub polymorphic_ref_field: String,

    /// `via` value for which a dominant association joins on the id field.
    pub related_via: String,

    /// Expand auto-populate associations when no populate list is given.
    pub auto_populate: bool,
}

impl CompilerConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self {
            id_field: DEFAULT_ID_FIELD.to_string(),
            temp_field_prefix: DEFAULT_TEMP_FIELD_PREFIX.to_string(),
            polymorphic_ref_field: DEFAULT_POLYMORPHIC_REF_FIELD.to_string(),
            related_via: DEFAULT_RELATED_VIA.to_string(),
            auto_populate: false,
        }
    }

    /// Decode a (possibly partial) configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Set the primary key field.
    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    /// Set the temporary field prefix.
    pub fn with_temp_field_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.temp_field_prefix = prefix.into();
        self
    }

    /// Set the polymorphic reference key.
    pub fn with_polymorphic_ref_field(mut self, field: impl Into<String>) -> Self {
        self.polymorphic_ref_field = field.into();
        self
    }

    /// Set the special `via` value.
    pub fn with_related_via(mut self, via: impl Into<String>) -> Self {
        self.related_via = via.into();
        self
    }

    /// Enable or disable automatic population.
    pub fn with_auto_populate(mut self, enabled: bool) -> Self {
        self.auto_populate = enabled;
        self
    }

    /// Temporary field holding the lookup result for `real_path`.
    ///
    /// `.` becomes `__` and a literal `_` becomes `_u`, so distinct paths
    /// never share a temporary field (`a.b` and `a__b` stay apart).
    pub fn temp_field(&self, real_path: &str) -> String {
        let mut name = self.temp_field_prefix.clone();
        for c in real_path.chars() {
            match c {
                '.' => name.push_str("__"),
                '_' => name.push_str("_u"),
                other => name.push(other),
            }
        }
        name
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self::new()
    }
}
