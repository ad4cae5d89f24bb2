//! Host-side driver: preset selection, overrides, and cached rendering.

use std::collections::HashMap;
use std::sync::Arc;

use image::RgbaImage;
use tracing::debug;

use crate::error::EngineError;
use crate::overlay::universal_schema;
use crate::params::{resolve_layered, visible_parameters, ParamMap, ParamValue, ResolvedParams};
use crate::preset::{run_guarded, CleanTriangle, Preset, PresetRegistry};
use crate::profile::BrandPreset;
use crate::surface::{PixmapContext, RenderContext, SvgContext};

/// Rendered images kept before the cache is flushed.
const CACHE_LIMIT: usize = 64;

// ============================================================================
// Configurable Trait
// ============================================================================

/// Trait for types that can be configured from a [`BrandPreset`].
pub trait Configurable {
    /// Applies a payload. Nothing changes if the payload is rejected.
    fn apply_profile(&mut self, profile: &BrandPreset) -> Result<(), EngineError>;

    /// Exports the current resolved parameter set under `name`.
    fn export_profile(&self, name: &str) -> BrandPreset;
}

// ============================================================================
// CacheKey
// ============================================================================

/// Key for cached rendered images.
///
/// Uses width, height, and time (as integer bits) to identify unique frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    width: u32,
    height: u32,
    time_bits: u64,
}

impl CacheKey {
    pub fn new(width: u32, height: u32, time: f64) -> Self {
        Self {
            width,
            height,
            time_bits: time.to_bits(),
        }
    }
}

// ============================================================================
// Studio
// ============================================================================

/// Stateful host for one active preset.
///
/// Parameter layers resolve in this order, later winning: preset defaults,
/// universal defaults, user overrides, then the imported payload. Every
/// change bumps a version number, which drops stale cached frames.
///
/// # Example
///
/// ```
/// use brandmark_renderer::{Configurable, Studio};
///
/// let mut studio = Studio::new();
/// studio.select("golden-circle").unwrap();
/// studio.set_param("concentricLayers", 3.0);
///
/// let image = studio.render_image(64, 64, 0.0).unwrap();
/// assert_eq!(image.dimensions(), (64, 64));
///
/// let profile = studio.export_profile("Three rings");
/// assert_eq!(profile.preset, "golden-circle");
/// ```
pub struct Studio {
    registry: PresetRegistry,
    active: Arc<dyn Preset>,
    overrides: ParamMap,
    imported: ParamMap,
    version: u64,
    cache: HashMap<CacheKey, (RgbaImage, u64)>,
}

impl Default for Studio {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("active", &self.active.id())
            .field("overrides", &self.overrides)
            .field("imported", &self.imported)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl Studio {
    /// A studio over the built-in presets, starting on `clean-triangle`.
    pub fn new() -> Self {
        Self {
            registry: PresetRegistry::builtin(),
            active: Arc::new(CleanTriangle::new()),
            overrides: ParamMap::new(),
            imported: ParamMap::new(),
            version: 0,
            cache: HashMap::new(),
        }
    }

    /// A studio over `registry`, starting on `initial`.
    pub fn with_registry(registry: PresetRegistry, initial: &str) -> Result<Self, EngineError> {
        let active = registry.load(initial)?;
        Ok(Self {
            registry,
            active,
            ..Self::new()
        })
    }

    pub fn registry(&self) -> &PresetRegistry {
        &self.registry
    }

    /// Adds a preset. Replacing the active preset takes effect immediately.
    pub fn register(&mut self, preset: impl Preset + 'static) {
        let preset: Arc<dyn Preset> = Arc::new(preset);
        if preset.id() == self.active.id() {
            self.active = preset.clone();
            self.invalidate();
        }
        self.registry.register_arc(preset);
    }

    pub fn active(&self) -> &Arc<dyn Preset> {
        &self.active
    }

    /// Returns the current version number.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Switches presets and clears every override layer.
    pub fn select(&mut self, id: &str) -> Result<(), EngineError> {
        let preset = self.registry.load(id)?;
        self.active = preset;
        self.overrides.clear();
        self.imported.clear();
        self.invalidate();
        Ok(())
    }

    /// Sets a user override. The key also leaves the imported layer, so the
    /// latest edit is what renders.
    pub fn set_param(&mut self, key: &str, value: impl Into<ParamValue>) {
        self.imported.remove(key);
        self.overrides.insert(key.to_string(), value.into());
        self.invalidate();
    }

    /// Sets an override from text, coerced by the parameter's control type.
    ///
    /// Returns false, changing nothing, when the key is undeclared or the
    /// text does not fit the control.
    pub fn set_param_str(&mut self, key: &str, raw: &str) -> bool {
        let schema = self.active.schema();
        match schema.get(key).and_then(|definition| definition.coerce(raw)) {
            Some(value) => {
                self.set_param(key, value);
                true
            }
            None => {
                debug!(key, raw, "override text rejected");
                false
            }
        }
    }

    pub fn overrides(&self) -> &ParamMap {
        &self.overrides
    }

    /// Drops user overrides and the imported layer.
    pub fn reset(&mut self) {
        self.overrides.clear();
        self.imported.clear();
        self.invalidate();
    }

    pub fn resolved(&self) -> ResolvedParams {
        resolve_layered(
            self.active.parameters(),
            universal_schema(),
            &[&self.overrides, &self.imported],
        )
    }

    /// Keys whose visibility predicate holds for the current values.
    pub fn visible(&self) -> Vec<String> {
        let schema = self.active.schema();
        let resolved = self.resolved();
        visible_parameters(&schema, &resolved)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Renders a raster frame, reusing a cached one when nothing changed.
    pub fn render_image(&mut self, width: u32, height: u32, time: f64) -> Result<RgbaImage, EngineError> {
        let key = CacheKey::new(width, height, time);
        if let Some((image, _)) = self.cache.get(&key).filter(|(_, version)| *version == self.version) {
            debug!(width, height, time, "render cache hit");
            return Ok(image.clone());
        }

        let mut ctx = PixmapContext::new(width, height)?;
        self.render_to(&mut ctx, width as f64, height as f64, time)?;
        let image = ctx.into_image();

        if self.cache.len() >= CACHE_LIMIT {
            self.cache.clear();
        }
        self.cache.insert(key, (image.clone(), self.version));
        Ok(image)
    }

    /// Renders a vector frame.
    pub fn render_svg(&self, width: f64, height: f64, time: f64) -> Result<String, EngineError> {
        let mut ctx = SvgContext::new(width, height);
        self.render_to(&mut ctx, width, height, time)?;
        Ok(ctx.finish())
    }

    /// Renders onto a caller-supplied surface.
    pub fn render_to(&self, ctx: &mut dyn RenderContext, width: f64, height: f64, time: f64) -> Result<(), EngineError> {
        let params = self.resolved();
        run_guarded(self.active.as_ref(), ctx, width, height, &params, time)
    }

    /// Clears cached frames. Useful for freeing memory.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cached_frames(&self) -> usize {
        self.cache.len()
    }

    fn invalidate(&mut self) {
        self.version = self.version.wrapping_add(1);
        self.cache.clear();
    }
}

impl Configurable for Studio {
    /// Selects the payload's preset and installs its params as the imported
    /// layer.
    ///
    /// # Example
    ///
    /// ```
    /// use brandmark_renderer::{BrandPreset, Configurable, Studio};
    ///
    /// let mut studio = Studio::new();
    /// let profile = BrandPreset::from_json(
    ///     r#"{ "name": "Calm", "preset": "minimal-line", "params": { "lineStyle": 1 } }"#,
    /// ).unwrap();
    ///
    /// studio.apply_profile(&profile).unwrap();
    /// assert_eq!(studio.resolved().int("lineStyle"), 1);
    /// ```
    fn apply_profile(&mut self, profile: &BrandPreset) -> Result<(), EngineError> {
        let preset = self.registry.load(&profile.preset)?;
        self.active = preset;
        self.overrides.clear();
        self.imported = profile.params.clone();
        self.invalidate();
        Ok(())
    }

    fn export_profile(&self, name: &str) -> BrandPreset {
        BrandPreset::new(name, self.active.id(), self.resolved().into_map())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingContext;

    #[test]
    fn starts_on_clean_triangle() {
        let studio = Studio::new();
        assert_eq!(studio.active().id(), "clean-triangle");
        assert!(studio.overrides().is_empty());
    }

    #[test]
    fn unknown_preset_changes_nothing() {
        let mut studio = Studio::new();
        studio.set_param("heightRatio", 1.2);
        let version = studio.version();

        assert!(matches!(studio.select("nope"), Err(EngineError::UnknownPreset(id)) if id == "nope"));
        assert_eq!(studio.active().id(), "clean-triangle");
        assert_eq!(studio.version(), version);
        assert_eq!(studio.overrides().len(), 1);
    }

    #[test]
    fn select_clears_overrides() {
        let mut studio = Studio::new();
        studio.set_param("heightRatio", 1.2);
        studio.select("quantum-field").unwrap();
        assert!(studio.overrides().is_empty());
        assert_eq!(studio.resolved().text("seed"), "quantum-field-research");
    }

    #[test]
    fn imported_layer_beats_user_overrides_until_edited() {
        let mut studio = Studio::new();
        studio.set_param("fillColor", "#111111");
        let mut params = ParamMap::new();
        params.insert("fillColor".into(), "#222222".into());
        params.insert("strokeWidth".into(), 4.0.into());
        studio
            .apply_profile(&BrandPreset::new("Imported", "clean-triangle", params))
            .unwrap();
        assert_eq!(studio.resolved().text("fillColor"), "#222222");

        studio.set_param("fillColor", "#333333");
        assert_eq!(studio.resolved().text("fillColor"), "#333333");
        assert_eq!(studio.resolved().number("strokeWidth"), 4.0);

        studio.reset();
        assert_eq!(studio.resolved().text("fillColor"), "auto");
    }

    #[test]
    fn invalid_override_falls_back_to_default() {
        let mut studio = Studio::new();
        studio.set_param("strokeWidth", "wide");
        assert_eq!(studio.resolved().number("strokeWidth"), 0.0);
    }

    #[test]
    fn text_overrides_are_coerced() {
        let mut studio = Studio::new();
        assert!(studio.set_param_str("strokeWidth", "3.5"));
        assert_eq!(studio.resolved().number("strokeWidth"), 3.5);
        assert!(!studio.set_param_str("strokeWidth", "wide"));
        assert!(!studio.set_param_str("undeclared", "1"));
        assert_eq!(studio.overrides().len(), 1);
    }

    #[test]
    fn pasted_payload_resolves_over_defaults() {
        let mut studio = Studio::new();
        let pasted =
            BrandPreset::from_json(r#"{"name":"X","preset":"clean-triangle","params":{"brandHue":210}}"#).unwrap();
        studio.apply_profile(&pasted).unwrap();
        let resolved = studio.resolved();
        assert_eq!(resolved.number("brandHue"), 210.0);
        assert_eq!(resolved.number("heightRatio"), 1.0);
    }

    #[test]
    fn rejected_profile_leaves_state() {
        let mut studio = Studio::new();
        studio.set_param("heightRatio", 1.2);
        let err = studio
            .apply_profile(&BrandPreset::new("Bad", "missing", ParamMap::new()))
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownPreset(_)));
        assert_eq!(studio.overrides().len(), 1);
    }

    #[test]
    fn export_then_apply_reproduces_the_frame() {
        let mut studio = Studio::new();
        studio.select("hand-sketch").unwrap();
        studio.set_param("sketchStyle", 3.0);
        let profile = studio.export_profile("Charcoal");
        assert_eq!(profile.name, "Charcoal");
        assert_eq!(profile.params["sketchStyle"], ParamValue::Number(3.0));
        assert!(profile.params.contains_key("backgroundType"), "export carries the full set");

        let mut other = Studio::new();
        other.apply_profile(&profile).unwrap();
        assert_eq!(other.resolved(), studio.resolved());
    }

    #[test]
    fn visibility_follows_values() {
        let mut studio = Studio::new();
        studio.select("golden-circle").unwrap();
        assert!(!studio.visible().iter().any(|k| k == "spiralTightness"));
        studio.set_param("circleStyle", 2.0);
        assert!(studio.visible().iter().any(|k| k == "spiralTightness"));
    }

    #[test]
    fn render_cache_tracks_version() {
        let mut studio = Studio::new();
        let first = studio.render_image(32, 32, 0.0).unwrap();
        assert_eq!(studio.cached_frames(), 1);
        let again = studio.render_image(32, 32, 0.0).unwrap();
        assert_eq!(first, again);
        assert_eq!(studio.cached_frames(), 1);

        studio.render_image(32, 32, 1.0).unwrap();
        assert_eq!(studio.cached_frames(), 2);

        studio.set_param("fillColor", "#ff0000");
        assert_eq!(studio.cached_frames(), 0);
        let recolored = studio.render_image(32, 32, 0.0).unwrap();
        assert_ne!(first, recolored);
    }

    #[test]
    fn zero_sized_raster_is_a_surface_error() {
        let mut studio = Studio::new();
        assert!(matches!(studio.render_image(0, 10, 0.0), Err(EngineError::Surface(_))));
    }

    #[test]
    fn svg_and_recording_surfaces() {
        let studio = Studio::new();
        let svg = studio.render_svg(100.0, 100.0, 0.0).unwrap();
        assert!(svg.starts_with("<svg"));

        let mut ctx = RecordingContext::new();
        studio.render_to(&mut ctx, 100.0, 100.0, 0.0).unwrap();
        assert!(ctx.paint_count() > 0);
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn registering_over_the_active_preset_invalidates() {
        let mut studio = Studio::new();
        let version = studio.version();
        studio.register(CleanTriangle::new());
        assert!(studio.version() > version);
        assert_eq!(studio.registry().len(), 6);
    }
}
