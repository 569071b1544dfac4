//! Dynamic value model for captured argument data.
//!
//! Raw backtraces arrive with arbitrarily-typed argument values. This module
//! models the subset the engine can classify, plus an opaque fallback so the
//! export switch stays total.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};

/// A single captured argument value.
///
/// The data-ish variants map directly onto JSON input; `Object`, `Resource`,
/// `DateTime` and `Opaque` are constructed by embedders feeding in-process
/// capture data.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    /// An object receiver or argument, reduced to its class name.
    Object { class: String },
    /// A resource handle, reduced to its resource type.
    Resource { kind: String },
    DateTime(NaiveDateTime),
    /// Anything else, reduced to its runtime type name.
    Opaque(String),
}

impl Value {
    pub fn string(value: impl Into<String>) -> Self {
        Value::String(value.into())
    }

    pub fn object(class: impl Into<String>) -> Self {
        Value::Object {
            class: class.into(),
        }
    }

    pub fn resource(kind: impl Into<String>) -> Self {
        Value::Resource { kind: kind.into() }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_)
        )
    }

    /// Runtime type name used by the fallback export rule.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object { class } => class,
            Value::Resource { .. } => "resource",
            Value::DateTime(_) => "datetime",
            Value::Opaque(name) => name,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            // Associative arrays serialise as JSON objects; only the element
            // values survive, matching the array(N) export rule.
            serde_json::Value::Object(map) => {
                Value::Array(map.into_values().map(Value::from).collect())
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Value::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(Value::from(serde_json::json!(null)), Value::Null);
        assert_eq!(Value::from(serde_json::json!(true)), Value::Bool(true));
        assert_eq!(Value::from(serde_json::json!(42)), Value::Int(42));
        assert_eq!(Value::from(serde_json::json!(1.5)), Value::Float(1.5));
        assert_eq!(
            Value::from(serde_json::json!("hello")),
            Value::String("hello".to_string())
        );
    }

    #[test]
    fn test_from_json_collections() {
        let value = Value::from(serde_json::json!([1, "two"]));
        assert_eq!(
            value,
            Value::Array(vec![Value::Int(1), Value::String("two".to_string())])
        );

        // Associative arrays keep their values only
        let value = Value::from(serde_json::json!({"a": 1, "b": 2}));
        assert_eq!(value, Value::Array(vec![Value::Int(1), Value::Int(2)]));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::object("App\\User").type_name(), "App\\User");
        assert_eq!(Value::Opaque("closure".to_string()).type_name(), "closure");
    }
}
