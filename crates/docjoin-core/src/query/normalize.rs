//! Identifier normalization for filter values.

use serde_json::{json, Value};

/// Length of a hex-encoded object id.
const OBJECT_ID_HEX_LEN: usize = 24;

/// Converts caller-supplied values into the store's identifier form.
pub trait IdNormalizer: Send + Sync {
    /// Normalize a single (non-list) value.
    fn normalize(&self, value: &Value) -> Value;
}

/// Turns 24-digit hex strings into extended-JSON object ids.
///
/// Every other value passes through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectIdNormalizer;

impl ObjectIdNormalizer {
    /// Check if `s` is a hex-encoded object id.
    pub fn is_object_id(s: &str) -> bool {
        let mut bytes = [0u8; OBJECT_ID_HEX_LEN / 2];
        s.len() == OBJECT_ID_HEX_LEN && hex::decode_to_slice(s, &mut bytes).is_ok()
    }
}

impl IdNormalizer for ObjectIdNormalizer {
    fn normalize(&self, value: &Value) -> Value {
        match value {
            Value::String(s) if Self::is_object_id(s) => json!({ "$oid": s.to_ascii_lowercase() }),
            other => other.clone(),
        }
    }
}

/// Leaves every value untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughNormalizer;

impl IdNormalizer for PassthroughNormalizer {
    fn normalize(&self, value: &Value) -> Value {
        value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_detection() {
        assert!(ObjectIdNormalizer::is_object_id("5f1b2c3d4e5f6a7b8c9d0e1f"));
        assert!(ObjectIdNormalizer::is_object_id("5F1B2C3D4E5F6A7B8C9D0E1F"));
        assert!(!ObjectIdNormalizer::is_object_id("5f1b2c3d4e5f6a7b8c9d0e1"));
        assert!(!ObjectIdNormalizer::is_object_id("zz1b2c3d4e5f6a7b8c9d0e1f"));
        assert!(!ObjectIdNormalizer::is_object_id("Ada"));
    }

    #[test]
    fn test_object_id_normalization() {
        let n = ObjectIdNormalizer;
        assert_eq!(
            n.normalize(&json!("5F1B2C3D4E5F6A7B8C9D0E1F")),
            json!({ "$oid": "5f1b2c3d4e5f6a7b8c9d0e1f" })
        );
        assert_eq!(n.normalize(&json!("Ada")), json!("Ada"));
        assert_eq!(n.normalize(&json!(42)), json!(42));
        assert_eq!(n.normalize(&json!(null)), json!(null));
    }

    #[test]
    fn test_passthrough() {
        let id = json!("5f1b2c3d4e5f6a7b8c9d0e1f");
        assert_eq!(PassthroughNormalizer.normalize(&id), id);
    }
}
