//! Schema resolution.

use std::collections::btree_map;

use serde::Serialize;

use super::{ParamMap, ParamValue, ParameterSchema};
use crate::color::Color;

/// A total key to value map produced by [`resolve`].
///
/// Accessors never fail: a key the schema does not declare logs a warning
/// and yields a neutral fallback, so a draw function cannot abort a frame by
/// reading a misspelled parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResolvedParams {
    values: ParamMap,
}

impl ResolvedParams {
    pub fn from_map(values: ParamMap) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<ParamValue>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ParamValue> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_map(&self) -> &ParamMap {
        &self.values
    }

    pub fn into_map(self) -> ParamMap {
        self.values
    }

    /// Numeric value, or `0.0` if absent or not a number.
    pub fn number(&self, key: &str) -> f64 {
        self.number_or(key, 0.0)
    }

    pub fn number_or(&self, key: &str, fallback: f64) -> f64 {
        match self.values.get(key) {
            Some(ParamValue::Number(n)) => *n,
            other => {
                self.report_miss(key, other, "number");
                fallback
            }
        }
    }

    /// Numeric value rounded to the nearest integer.
    pub fn int(&self, key: &str) -> i64 {
        let n = self.number(key);
        if n.is_finite() { n.round() as i64 } else { 0 }
    }

    /// Text value, or `""` if absent or not text.
    pub fn text(&self, key: &str) -> &str {
        match self.values.get(key) {
            Some(ParamValue::Text(s)) => s.as_str(),
            other => {
                self.report_miss(key, other, "text");
                ""
            }
        }
    }

    /// Boolean value, or `false` if absent or not a bool.
    pub fn flag(&self, key: &str) -> bool {
        match self.values.get(key) {
            Some(ParamValue::Bool(b)) => *b,
            other => {
                self.report_miss(key, other, "bool");
                false
            }
        }
    }

    /// Parsed color; unparseable or missing values are neutral gray.
    pub fn color(&self, key: &str) -> Color {
        Color::parse_or_neutral(self.text(key))
    }

    fn report_miss(&self, key: &str, found: Option<&ParamValue>, expected: &str) {
        match found {
            None => tracing::warn!(key, "read of undeclared parameter"),
            Some(value) => tracing::warn!(key, expected, found = value.type_name(), "parameter has unexpected type"),
        }
    }
}

impl<'a> IntoIterator for &'a ResolvedParams {
    type Item = (&'a String, &'a ParamValue);
    type IntoIter = btree_map::Iter<'a, String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// Resolves `schema` (overlaid on `universal`) against a single override map.
///
/// For every declared key the value is the override if present and
/// type-valid, otherwise the definition default. Numeric overrides are passed
/// through unclamped. Override keys the schema does not declare are ignored.
///
/// ```
/// use brandmark_renderer::params::{resolve, ParamMap, ParameterDefinition, ParameterSchema};
///
/// let schema = ParameterSchema::new()
///     .with("size", ParameterDefinition::slider("Size", 1.0, 0.0, 2.0, 0.1));
/// let mut overrides = ParamMap::new();
/// overrides.insert("size".into(), 7.5.into());
///
/// let resolved = resolve(&schema, &overrides, &ParameterSchema::new());
/// assert_eq!(resolved.number("size"), 7.5);
/// ```
pub fn resolve(schema: &ParameterSchema, overrides: &ParamMap, universal: &ParameterSchema) -> ResolvedParams {
    resolve_layered(schema, universal, &[overrides])
}

/// Resolves against a stack of override maps; later layers take precedence.
///
/// A layer whose value is type-invalid for a key does not mask earlier
/// layers: resolution falls through to the next layer down, then the default.
pub fn resolve_layered(schema: &ParameterSchema, universal: &ParameterSchema, layers: &[&ParamMap]) -> ResolvedParams {
    let effective = schema.merged_over(universal);

    for layer in layers {
        for key in layer.keys().filter(|key| !effective.contains(key)) {
            tracing::debug!(key = key.as_str(), "ignoring override for undeclared parameter");
        }
    }

    let values = effective
        .iter()
        .map(|(key, definition)| {
            let chosen = layers.iter().rev().find_map(|layer| {
                let candidate = layer.get(key)?;
                if definition.accepts(candidate) {
                    Some(candidate.clone())
                } else {
                    tracing::debug!(key, found = candidate.type_name(), "override rejected, using fallback");
                    None
                }
            });
            (key.to_string(), chosen.unwrap_or_else(|| definition.default.clone()))
        })
        .collect();

    ResolvedParams { values }
}

/// Keys whose visibility predicate holds on `resolved`, in schema order.
pub fn visible_parameters<'a>(schema: &'a ParameterSchema, resolved: &ResolvedParams) -> Vec<&'a str> {
    schema
        .iter()
        .filter(|(_, definition)| {
            definition
                .visible_when
                .as_ref()
                .is_none_or(|predicate| predicate.evaluate(resolved))
        })
        .map(|(key, _)| key)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ParameterDefinition, VisibleWhen};

    fn universal() -> ParameterSchema {
        ParameterSchema::new()
            .with("fillType", ParameterDefinition::select("Fill", "solid", &[("none", "None"), ("solid", "Solid"), ("gradient", "Gradient")]))
            .with("fillColor", ParameterDefinition::color("Fill color", "#3b82f6").visible_when(VisibleWhen::equals("fillType", "solid")))
            .with("backgroundColor", ParameterDefinition::color("Background", "#ffffff"))
    }

    fn schema() -> ParameterSchema {
        ParameterSchema::new()
            .with("size", ParameterDefinition::slider("Size", 1.0, 0.0, 2.0, 0.1))
            .with("backgroundColor", ParameterDefinition::color("Background", "#0a0a1a"))
    }

    fn map(pairs: &[(&str, ParamValue)]) -> ParamMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn defaults_fill_every_key() {
        let resolved = resolve(&schema(), &ParamMap::new(), &universal());
        assert_eq!(resolved.len(), 4);
        assert_eq!(resolved.number("size"), 1.0);
        assert_eq!(resolved.text("fillType"), "solid");
        assert_eq!(resolved.text("backgroundColor"), "#0a0a1a", "preset overrides universal default");
    }

    #[test]
    fn invalid_overrides_fall_back() {
        let overrides = map(&[
            ("size", ParamValue::from("huge")),
            ("fillType", ParamValue::from("plaid")),
            ("unknown", ParamValue::from(1)),
        ]);
        let resolved = resolve(&schema(), &overrides, &universal());
        assert_eq!(resolved.number("size"), 1.0);
        assert_eq!(resolved.text("fillType"), "solid");
        assert!(!resolved.contains("unknown"));
    }

    #[test]
    fn out_of_range_numbers_pass_through() {
        let overrides = map(&[("size", ParamValue::from(-40.0))]);
        let resolved = resolve(&schema(), &overrides, &universal());
        assert_eq!(resolved.number("size"), -40.0);
    }

    #[test]
    fn later_layers_win_and_invalid_layers_fall_through() {
        let user = map(&[("size", ParamValue::from(1.5)), ("fillType", ParamValue::from("gradient"))]);
        let pasted = map(&[("size", ParamValue::from(0.2)), ("fillType", ParamValue::from(7))]);
        let resolved = resolve_layered(&schema(), &universal(), &[&user, &pasted]);
        assert_eq!(resolved.number("size"), 0.2);
        assert_eq!(resolved.text("fillType"), "gradient");
    }

    #[test]
    fn visibility_uses_resolved_values() {
        let full = schema().merged_over(&universal());
        let solid = resolve(&schema(), &ParamMap::new(), &universal());
        assert!(visible_parameters(&full, &solid).contains(&"fillColor"));

        let none = resolve(&schema(), &map(&[("fillType", ParamValue::from("none"))]), &universal());
        assert!(!visible_parameters(&full, &none).contains(&"fillColor"));
    }

    #[test]
    fn accessors_degrade_on_missing_keys() {
        let resolved = ResolvedParams::default();
        assert_eq!(resolved.number("nope"), 0.0);
        assert_eq!(resolved.text("nope"), "");
        assert!(!resolved.flag("nope"));
        assert_eq!(resolved.color("nope"), Color::NEUTRAL);
        assert_eq!(resolved.int("nope"), 0);
    }

    #[test]
    fn resolution_is_deterministic() {
        let overrides = map(&[("size", ParamValue::from(0.7))]);
        let a = resolve(&schema(), &overrides, &universal());
        let b = resolve(&schema(), &overrides, &universal());
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }
}
