//! Parameter schemas and resolution.
//!
//! Every preset describes its tunables declaratively with a
//! [`ParameterSchema`]. A schema plus a stack of override maps resolves into a
//! total [`ResolvedParams`] set: each declared key always has a concrete value.

mod definition;
mod resolve;

pub use definition::{Category, ParamKind, ParameterDefinition, ParameterSchema, SelectOption, VisibleWhen};
pub use resolve::{resolve, resolve_layered, visible_parameters, ResolvedParams};

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A flat key to value map, as supplied by a user or an imported payload.
pub type ParamMap = BTreeMap<String, ParamValue>;

// ============================================================================
// ParamValue
// ============================================================================

/// A single parameter value.
///
/// Serializes untagged, so JSON `210`, `"solid"`, and `true` map directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ParamValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Bool(_) => "bool",
            ParamValue::Number(_) => "number",
            ParamValue::Text(_) => "text",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Number(n) => write!(f, "{n}"),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        ParamValue::Number(n)
    }
}

impl From<i32> for ParamValue {
    fn from(n: i32) -> Self {
        ParamValue::Number(n as f64)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_json_values() {
        let map: ParamMap = serde_json::from_str(r#"{"a": 1.5, "b": "solid", "c": true}"#).unwrap();
        assert_eq!(map["a"], ParamValue::Number(1.5));
        assert_eq!(map["b"], ParamValue::Text("solid".into()));
        assert_eq!(map["c"], ParamValue::Bool(true));

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"a":1.5,"b":"solid","c":true}"#);
    }

    #[test]
    fn accessors_are_type_strict() {
        let n = ParamValue::from(3);
        assert_eq!(n.as_number(), Some(3.0));
        assert_eq!(n.as_text(), None);
        assert_eq!(ParamValue::from("x").as_bool(), None);
        assert_eq!(ParamValue::from(false).type_name(), "bool");
        assert_eq!(ParamValue::from(0.25).to_string(), "0.25");
    }
}
