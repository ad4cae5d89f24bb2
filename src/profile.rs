//! Serializable brand preset for import and export.
//!
//! A [`BrandPreset`] captures a preset selection plus its parameter values in
//! a JSON form that can be pasted into, or copied out of, a host.
//!
//! # Example
//!
//! ```
//! use brandmark_renderer::BrandPreset;
//!
//! let json = r##"{
//!     "name": "Ocean",
//!     "preset": "golden-circle",
//!     "params": { "fillColor": "#1e6091", "concentricLayers": 2 },
//!     "tags": ["calm"]
//! }"##;
//!
//! let preset = BrandPreset::from_json(json).unwrap();
//! assert_eq!(preset.preset, "golden-circle");
//!
//! let exported = preset.to_json().unwrap();
//! assert!(exported.contains("\"concentricLayers\""));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ImportError;
use crate::params::ParamMap;

/// A named parameter set for one preset.
///
/// # JSON Format
///
/// ```json
/// {
///   "name": "Ocean",
///   "preset": "golden-circle",
///   "params": { "fillColor": "#1e6091", "concentricLayers": 2 },
///   "description": "Calm blue mark",
///   "tags": ["calm", "blue"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct BrandPreset {
    pub name: String,

    /// Preset identifier, e.g. `clean-triangle`.
    pub preset: String,

    /// Flat parameter map. Exports carry the full resolved set.
    pub params: ParamMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl BrandPreset {
    pub fn new(name: impl Into<String>, preset: impl Into<String>, params: ParamMap) -> Self {
        Self {
            name: name.into(),
            preset: preset.into(),
            params,
            description: None,
            tags: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Serializes the preset to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the preset to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parses a pasted payload, naming the first field that is missing or
    /// has the wrong shape.
    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ImportError> {
        let object = value.as_object().ok_or(ImportError::NotAnObject)?;

        let require = |field: &'static str| object.get(field).ok_or(ImportError::MissingField(field));
        let invalid = |field: &'static str, expected: &'static str| ImportError::InvalidField { field, expected };

        if !require("name")?.is_string() {
            return Err(invalid("name", "a string"));
        }
        if !require("preset")?.is_string() {
            return Err(invalid("preset", "a string"));
        }
        let params = require("params")?
            .as_object()
            .ok_or_else(|| invalid("params", "an object"))?;
        if params.values().any(|v| !(v.is_number() || v.is_string() || v.is_boolean())) {
            return Err(invalid("params", "a map of numbers, strings, or booleans"));
        }

        match object.get("description") {
            None | Some(Value::Null) | Some(Value::String(_)) => {}
            Some(_) => return Err(invalid("description", "a string")),
        }
        match object.get("tags") {
            None | Some(Value::Null) => {}
            Some(Value::Array(tags)) if tags.iter().all(Value::is_string) => {}
            Some(_) => return Err(invalid("tags", "an array of strings")),
        }

        Ok(serde_json::from_value(value)?)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamValue;

    #[test]
    fn serialization_roundtrip() {
        let mut params = ParamMap::new();
        params.insert("fillColor".into(), "#ff0000".into());
        params.insert("complexity".into(), 0.4.into());
        params.insert("luxuryFinish".into(), true.into());
        let preset = BrandPreset::new("Bold", "clean-triangle", params)
            .with_description("Red triangle")
            .with_tags(["bold", "red"]);

        let json = preset.to_json().unwrap();
        let restored = BrandPreset::from_json(&json).unwrap();
        assert_eq!(restored, preset);
        assert_eq!(restored.params["luxuryFinish"], ParamValue::Bool(true));
    }

    #[test]
    fn optional_fields_are_omitted() {
        let preset = BrandPreset::new("Plain", "minimal-line", ParamMap::new());
        let json = preset.to_json_pretty().unwrap();
        assert!(json.contains("\"preset\""));
        assert!(!json.contains("description"));
        assert!(!json.contains("tags"));
    }

    #[test]
    fn missing_fields_are_named() {
        let missing = |json: &str| match BrandPreset::from_json(json) {
            Err(ImportError::MissingField(field)) => field,
            other => panic!("expected a missing field, got {other:?}"),
        };
        assert_eq!(missing(r#"{ "preset": "x", "params": {} }"#), "name");
        assert_eq!(missing(r#"{ "name": "x", "params": {} }"#), "preset");
        assert_eq!(missing(r#"{ "name": "x", "preset": "y" }"#), "params");
    }

    #[test]
    fn wrong_shapes_are_rejected() {
        assert!(matches!(BrandPreset::from_json("[1, 2]"), Err(ImportError::NotAnObject)));
        assert!(matches!(BrandPreset::from_json("{ nope"), Err(ImportError::InvalidJson(_))));
        assert!(matches!(
            BrandPreset::from_json(r#"{ "name": 3, "preset": "y", "params": {} }"#),
            Err(ImportError::InvalidField { field: "name", .. })
        ));
        assert!(matches!(
            BrandPreset::from_json(r#"{ "name": "x", "preset": "y", "params": [] }"#),
            Err(ImportError::InvalidField { field: "params", .. })
        ));
        assert!(matches!(
            BrandPreset::from_json(r#"{ "name": "x", "preset": "y", "params": { "a": [1] } }"#),
            Err(ImportError::InvalidField { field: "params", .. })
        ));
        assert!(matches!(
            BrandPreset::from_json(r#"{ "name": "x", "preset": "y", "params": {}, "tags": [1] }"#),
            Err(ImportError::InvalidField { field: "tags", .. })
        ));
    }

    #[test]
    fn error_message_names_the_field() {
        let err = BrandPreset::from_json(r#"{ "name": "x", "params": {} }"#).unwrap_err();
        assert_eq!(err.to_string(), "missing required field `preset`");
    }

    #[test]
    fn null_optionals_are_accepted() {
        let preset =
            BrandPreset::from_json(r#"{ "name": "x", "preset": "y", "params": {}, "description": null, "tags": null }"#)
                .unwrap();
        assert!(preset.description.is_none());
        assert!(preset.tags.is_none());
    }
}
