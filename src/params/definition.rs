//! Declarative parameter definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ParamMap, ParamValue, ResolvedParams};
use crate::error::TemplateError;

// ============================================================================
// Kinds and Categories
// ============================================================================

/// The control type of a parameter, which also decides type validity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParamKind {
    /// Numeric value. The range is advisory and never enforced.
    Slider {
        min: f64,
        max: f64,
        #[serde(default = "default_step")]
        step: f64,
    },
    /// Text value restricted to the listed options.
    Select { options: Vec<SelectOption> },
    /// Color string (`#rrggbb`, `rgb()`, `hsl()` or `auto`).
    Color,
    Toggle,
    Text,
}

fn default_step() -> f64 {
    0.01
}

/// One entry of a select control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    #[serde(default)]
    pub label: String,
}

/// Grouping used by hosts to lay out controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Background,
    Fill,
    Stroke,
    Geometry,
    Color,
    Effects,
    Animation,
}

// ============================================================================
// Visibility
// ============================================================================

/// Visibility predicate evaluated against the fully resolved set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum VisibleWhen {
    Equals { key: String, value: ParamValue },
    NotEquals { key: String, value: ParamValue },
    OneOf { key: String, values: Vec<ParamValue> },
}

impl VisibleWhen {
    pub fn equals(key: &str, value: impl Into<ParamValue>) -> Self {
        VisibleWhen::Equals { key: key.to_string(), value: value.into() }
    }

    pub fn not_equals(key: &str, value: impl Into<ParamValue>) -> Self {
        VisibleWhen::NotEquals { key: key.to_string(), value: value.into() }
    }

    pub fn one_of<V: Into<ParamValue>>(key: &str, values: impl IntoIterator<Item = V>) -> Self {
        VisibleWhen::OneOf {
            key: key.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// The key this predicate reads.
    pub fn key(&self) -> &str {
        match self {
            VisibleWhen::Equals { key, .. }
            | VisibleWhen::NotEquals { key, .. }
            | VisibleWhen::OneOf { key, .. } => key,
        }
    }

    pub fn evaluate(&self, params: &ResolvedParams) -> bool {
        match self {
            VisibleWhen::Equals { key, value } => params.get(key) == Some(value),
            VisibleWhen::NotEquals { key, value } => params.get(key) != Some(value),
            VisibleWhen::OneOf { key, values } => {
                params.get(key).is_some_and(|current| values.contains(current))
            }
        }
    }
}

// ============================================================================
// ParameterDefinition
// ============================================================================

/// Immutable description of one tunable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDefinition {
    #[serde(flatten)]
    pub kind: ParamKind,
    pub default: ParamValue,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_when: Option<VisibleWhen>,
}

impl ParameterDefinition {
    fn new(kind: ParamKind, label: &str, default: ParamValue) -> Self {
        Self {
            kind,
            default,
            label: label.to_string(),
            category: None,
            visible_when: None,
        }
    }

    pub fn slider(label: &str, default: f64, min: f64, max: f64, step: f64) -> Self {
        Self::new(ParamKind::Slider { min, max, step }, label, ParamValue::Number(default))
    }

    /// Select control; `options` are `(value, label)` pairs.
    pub fn select(label: &str, default: &str, options: &[(&str, &str)]) -> Self {
        let options = options
            .iter()
            .map(|(value, label)| SelectOption {
                value: value.to_string(),
                label: label.to_string(),
            })
            .collect();
        Self::new(ParamKind::Select { options }, label, ParamValue::from(default))
    }

    pub fn color(label: &str, default: &str) -> Self {
        Self::new(ParamKind::Color, label, ParamValue::from(default))
    }

    pub fn toggle(label: &str, default: bool) -> Self {
        Self::new(ParamKind::Toggle, label, ParamValue::Bool(default))
    }

    pub fn text(label: &str, default: &str) -> Self {
        Self::new(ParamKind::Text, label, ParamValue::from(default))
    }

    pub fn in_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn visible_when(mut self, predicate: VisibleWhen) -> Self {
        self.visible_when = Some(predicate);
        self
    }

    /// Returns a copy with a different default.
    pub fn with_default(mut self, default: impl Into<ParamValue>) -> Self {
        self.default = default.into();
        self
    }

    /// True if `value` is type-valid for this definition.
    pub fn accepts(&self, value: &ParamValue) -> bool {
        match (&self.kind, value) {
            (ParamKind::Slider { .. }, ParamValue::Number(n)) => n.is_finite(),
            (ParamKind::Select { options }, ParamValue::Text(s)) => {
                options.iter().any(|option| &option.value == s)
            }
            (ParamKind::Color | ParamKind::Text, ParamValue::Text(_)) => true,
            (ParamKind::Toggle, ParamValue::Bool(_)) => true,
            _ => false,
        }
    }

    /// Converts a raw string (CLI flag, query string) into a value of this kind.
    pub fn coerce(&self, raw: &str) -> Option<ParamValue> {
        let raw = raw.trim();
        let value = match self.kind {
            ParamKind::Slider { .. } => ParamValue::Number(raw.parse().ok()?),
            ParamKind::Toggle => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "on" | "yes" => ParamValue::Bool(true),
                "false" | "0" | "off" | "no" => ParamValue::Bool(false),
                _ => return None,
            },
            _ => ParamValue::from(raw),
        };
        self.accepts(&value).then_some(value)
    }

    /// Checks that the definition is internally consistent.
    pub fn validate(&self, name: &str) -> Result<(), TemplateError> {
        let invalid = |reason: &str| TemplateError::InvalidParameter {
            name: name.to_string(),
            reason: reason.to_string(),
        };
        match &self.kind {
            ParamKind::Slider { min, max, step } => {
                if !(min.is_finite() && max.is_finite() && step.is_finite()) {
                    return Err(invalid("slider bounds must be finite"));
                }
                if min > max {
                    return Err(invalid("slider min exceeds max"));
                }
            }
            ParamKind::Select { options } if options.is_empty() => {
                return Err(invalid("select needs at least one option"));
            }
            _ => {}
        }
        if !self.accepts(&self.default) {
            return Err(invalid("default value does not match the control type"));
        }
        Ok(())
    }
}

// ============================================================================
// ParameterSchema
// ============================================================================

/// Map from parameter name to definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSchema {
    definitions: BTreeMap<String, ParameterDefinition>,
}

impl ParameterSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, definition: ParameterDefinition) -> Self {
        self.insert(name, definition);
        self
    }

    pub fn insert(&mut self, name: &str, definition: ParameterDefinition) {
        self.definitions.insert(name.to_string(), definition);
    }

    pub fn get(&self, name: &str) -> Option<&ParameterDefinition> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterDefinition)> {
        self.definitions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Returns `base` overlaid by this schema's definitions.
    pub fn merged_over(&self, base: &ParameterSchema) -> ParameterSchema {
        let mut definitions = base.definitions.clone();
        definitions.extend(self.definitions.iter().map(|(k, v)| (k.clone(), v.clone())));
        ParameterSchema { definitions }
    }

    /// Default value of every definition.
    pub fn defaults(&self) -> ParamMap {
        self.definitions
            .iter()
            .map(|(k, v)| (k.clone(), v.default.clone()))
            .collect()
    }

    /// Validates every definition and every visibility reference.
    pub fn validate(&self) -> Result<(), TemplateError> {
        for (name, definition) in &self.definitions {
            definition.validate(name)?;
            if let Some(predicate) = &definition.visible_when {
                if !self.contains(predicate.key()) {
                    return Err(TemplateError::UnresolvedReference {
                        binding: format!("{name}.visibleWhen"),
                        param: predicate.key().to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_by_kind() {
        let slider = ParameterDefinition::slider("Size", 1.0, 0.0, 2.0, 0.1);
        assert!(slider.accepts(&ParamValue::Number(5.0)), "range is advisory");
        assert!(!slider.accepts(&ParamValue::Number(f64::NAN)));
        assert!(!slider.accepts(&ParamValue::from("1")));

        let select = ParameterDefinition::select("Mode", "a", &[("a", "A"), ("b", "B")]);
        assert!(select.accepts(&ParamValue::from("b")));
        assert!(!select.accepts(&ParamValue::from("c")));

        assert!(ParameterDefinition::toggle("On", true).accepts(&ParamValue::Bool(false)));
        assert!(ParameterDefinition::color("C", "#fff").accepts(&ParamValue::from("auto")));
    }

    #[test]
    fn coerce_raw_strings() {
        let slider = ParameterDefinition::slider("Size", 1.0, 0.0, 2.0, 0.1);
        assert_eq!(slider.coerce(" 0.5 "), Some(ParamValue::Number(0.5)));
        assert_eq!(slider.coerce("big"), None);

        let toggle = ParameterDefinition::toggle("On", true);
        assert_eq!(toggle.coerce("off"), Some(ParamValue::Bool(false)));

        let select = ParameterDefinition::select("Mode", "a", &[("a", "A")]);
        assert_eq!(select.coerce("z"), None);
    }

    #[test]
    fn definition_json_shape() {
        let def = ParameterDefinition::slider("Height", 1.0, 0.5, 2.0, 0.05)
            .in_category(Category::Geometry)
            .visible_when(VisibleWhen::equals("mode", "tall"));
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["type"], "slider");
        assert_eq!(json["category"], "geometry");
        assert_eq!(json["visibleWhen"]["op"], "equals");

        let parsed: ParameterDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, def);
    }

    #[test]
    fn merged_over_prefers_overlay() {
        let base = ParameterSchema::new()
            .with("backgroundColor", ParameterDefinition::color("Background", "#ffffff"))
            .with("fillType", ParameterDefinition::select("Fill", "solid", &[("solid", "Solid")]));
        let overlay = ParameterSchema::new()
            .with("backgroundColor", ParameterDefinition::color("Background", "#0a0a1a"));
        let merged = overlay.merged_over(&base);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("backgroundColor").unwrap().default, ParamValue::from("#0a0a1a"));
    }

    #[test]
    fn validate_catches_bad_definitions() {
        let bad_default = ParameterSchema::new()
            .with("mode", ParameterDefinition::select("Mode", "x", &[("a", "A")]));
        assert!(matches!(bad_default.validate(), Err(TemplateError::InvalidParameter { .. })));

        let dangling = ParameterSchema::new().with(
            "size",
            ParameterDefinition::slider("Size", 1.0, 0.0, 2.0, 0.1)
                .visible_when(VisibleWhen::equals("missing", true)),
        );
        assert!(matches!(dangling.validate(), Err(TemplateError::UnresolvedReference { .. })));

        let inverted = ParameterSchema::new()
            .with("size", ParameterDefinition::slider("Size", 1.0, 3.0, 2.0, 0.1));
        assert!(inverted.validate().is_err());
    }
}
