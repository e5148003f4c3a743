//! Clause values.
//!
//! Raw request values arrive as arbitrary JSON. The scalar/collection
//! distinction is made once, when a [`ClauseValue`] is constructed, so the
//! translator never has to inspect the JSON shape itself.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The right-hand side of a where clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum ClauseValue {
    /// A single value (string, number, bool, null or object).
    Scalar(Value),
    /// A list of values.
    List(Vec<Value>),
}

impl ClauseValue {
    /// Create a scalar value.
    pub fn scalar(value: impl Into<Value>) -> Self {
        ClauseValue::Scalar(value.into())
    }

    /// Create a list value.
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        ClauseValue::List(values.into_iter().map(Into::into).collect())
    }

    /// Check if this is a list value.
    pub fn is_list(&self) -> bool {
        matches!(self, ClauseValue::List(_))
    }

    /// Apply `f` to the scalar, or to every element of the list.
    pub fn map_values(&self, f: impl Fn(&Value) -> Value) -> ClauseValue {
        match self {
            ClauseValue::Scalar(v) => ClauseValue::Scalar(f(v)),
            ClauseValue::List(vs) => ClauseValue::List(vs.iter().map(f).collect()),
        }
    }

    /// Values as a set: scalars are wrapped into a singleton.
    pub fn into_set(self) -> Vec<Value> {
        match self {
            ClauseValue::Scalar(v) => vec![v],
            ClauseValue::List(vs) => vs,
        }
    }

    /// Convert back into a plain JSON value.
    pub fn into_value(self) -> Value {
        match self {
            ClauseValue::Scalar(v) => v,
            ClauseValue::List(vs) => Value::Array(vs),
        }
    }

    /// Text form used when the value is treated as a pattern.
    ///
    /// Strings are used verbatim, other scalars in their JSON text form,
    /// and lists are joined with commas.
    pub fn pattern_text(&self) -> String {
        match self {
            ClauseValue::Scalar(v) => scalar_text(v),
            ClauseValue::List(vs) => vs.iter().map(scalar_text).collect::<Vec<_>>().join(","),
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl From<Value> for ClauseValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(values) => ClauseValue::List(values),
            other => ClauseValue::Scalar(other),
        }
    }
}

impl From<ClauseValue> for Value {
    fn from(value: ClauseValue) -> Self {
        value.into_value()
    }
}

impl From<&str> for ClauseValue {
    fn from(s: &str) -> Self {
        ClauseValue::Scalar(Value::String(s.to_string()))
    }
}

impl From<String> for ClauseValue {
    fn from(s: String) -> Self {
        ClauseValue::Scalar(Value::String(s))
    }
}

impl From<i64> for ClauseValue {
    fn from(n: i64) -> Self {
        ClauseValue::Scalar(Value::from(n))
    }
}

impl From<f64> for ClauseValue {
    fn from(n: f64) -> Self {
        ClauseValue::Scalar(Value::from(n))
    }
}

impl From<bool> for ClauseValue {
    fn from(b: bool) -> Self {
        ClauseValue::Scalar(Value::Bool(b))
    }
}

impl fmt::Display for ClauseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClauseValue::Scalar(v) => write!(f, "{}", v),
            ClauseValue::List(vs) => write!(f, "{}", Value::Array(vs.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_becomes_list() {
        let value = ClauseValue::from(json!(["a", "b"]));
        assert!(value.is_list());
        assert_eq!(value.into_set(), vec![json!("a"), json!("b")]);
    }

    #[test]
    fn test_scalar_wraps_into_singleton_set() {
        let value = ClauseValue::from(json!(42));
        assert!(!value.is_list());
        assert_eq!(value.into_set(), vec![json!(42)]);
    }

    #[test]
    fn test_deserialize_from_json() {
        let value: ClauseValue = serde_json::from_value(json!([1, 2, 3])).unwrap();
        assert_eq!(value, ClauseValue::list([1, 2, 3]));

        let value: ClauseValue = serde_json::from_value(json!({"nested": true})).unwrap();
        assert_eq!(value, ClauseValue::Scalar(json!({"nested": true})));
    }

    #[test]
    fn test_pattern_text() {
        assert_eq!(ClauseValue::from("ada").pattern_text(), "ada");
        assert_eq!(ClauseValue::from(7i64).pattern_text(), "7");
        assert_eq!(ClauseValue::list(["a", "b"]).pattern_text(), "a,b");
    }

    #[test]
    fn test_map_values_per_element() {
        let value = ClauseValue::list([1, 2]);
        let doubled = value.map_values(|v| json!(v.as_i64().unwrap_or(0) * 2));
        assert_eq!(doubled, ClauseValue::list([2, 4]));
    }
}
