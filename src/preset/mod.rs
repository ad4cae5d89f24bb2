//! The preset contract and registry.
//!
//! A preset is a self-contained generator: a parameter schema, a draw
//! function, and metadata. Presets hold no per-frame state; everything a
//! frame needs is recomputed from the resolved parameters and the time.

mod clean_triangle;
mod custom;
mod diamond;
mod golden_circle;
mod hand_sketch;
mod minimal_line;
mod quantum_field;

pub use clean_triangle::CleanTriangle;
pub use custom::{run_guarded, Binding, CustomPreset, FamilySpec, PaletteSpec, PassSpec, TemplateDocument};
pub use diamond::DynamicDiamond;
pub use golden_circle::GoldenCirclePreset;
pub use hand_sketch::HandSketch;
pub use minimal_line::MinimalLinePreset;
pub use quantum_field::QuantumFieldPreset;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::error::EngineError;
use crate::geometry::{sanitize_radius, Bounds, Point};
use crate::overlay::{paint_background, universal_schema, BackgroundStyle};
use crate::params::{resolve, ParamMap, ParameterDefinition, ParameterSchema, ResolvedParams};
use crate::rng::Prng;
use crate::surface::RenderContext;

/// Name of the seed parameter every preset declares.
pub const SEED: &str = "seed";

/// Descriptive data shown by hosts next to a preset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetMetadata {
    pub name: String,
    pub description: String,
    /// Resolved defaults, universal controls included.
    pub default_params: ParamMap,
}

/// A parametric logo generator.
pub trait Preset: Send + Sync {
    /// Stable identifier, e.g. `clean-triangle`.
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// The preset's own definitions, without the universal controls.
    fn parameters(&self) -> &ParameterSchema;

    /// Paints one frame. Must not panic on any resolved parameter set.
    fn draw(&self, ctx: &mut dyn RenderContext, width: f64, height: f64, params: &ResolvedParams, time: f64);

    /// Effective schema: universal controls overlaid by the preset's own.
    fn schema(&self) -> ParameterSchema {
        self.parameters().merged_over(universal_schema())
    }

    fn resolve(&self, overrides: &ParamMap) -> ResolvedParams {
        resolve(self.parameters(), overrides, universal_schema())
    }

    fn metadata(&self) -> PresetMetadata {
        PresetMetadata {
            name: self.name().to_string(),
            description: self.description().to_string(),
            default_params: self.schema().defaults(),
        }
    }
}

impl fmt::Debug for dyn Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preset").field("id", &self.id()).finish_non_exhaustive()
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Presets by identifier, in registration order.
#[derive(Clone, Default)]
pub struct PresetRegistry {
    presets: Vec<Arc<dyn Preset>>,
}

impl fmt::Debug for PresetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}

impl PresetRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in preset.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(CleanTriangle::new());
        registry.register(GoldenCirclePreset::new());
        registry.register(HandSketch::new());
        registry.register(DynamicDiamond::new());
        registry.register(QuantumFieldPreset::new());
        registry.register(MinimalLinePreset::new());
        registry
    }

    /// Adds a preset, replacing any preset with the same id.
    pub fn register(&mut self, preset: impl Preset + 'static) {
        self.register_arc(Arc::new(preset));
    }

    pub fn register_arc(&mut self, preset: Arc<dyn Preset>) {
        match self.presets.iter_mut().find(|p| p.id() == preset.id()) {
            Some(slot) => {
                debug!(id = preset.id(), "replacing registered preset");
                *slot = preset;
            }
            None => self.presets.push(preset),
        }
    }

    /// Loads a preset by identifier.
    pub fn load(&self, id: &str) -> Result<Arc<dyn Preset>, EngineError> {
        self.get(id).ok_or_else(|| EngineError::UnknownPreset(id.to_string()))
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Preset>> {
        self.presets.iter().find(|p| p.id() == id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.presets.iter().any(|p| p.id() == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|p| p.id())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Preset>> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

// ============================================================================
// Shared Frame Setup
// ============================================================================

/// Per-frame values every built-in preset starts from.
pub(crate) struct Frame {
    pub canvas: Bounds,
    pub center: Point,
    /// Shorter canvas side.
    pub size: f64,
    pub rng: Prng,
}

impl Frame {
    /// Paints the universal background and creates the frame's generator.
    pub fn begin(ctx: &mut dyn RenderContext, width: f64, height: f64, params: &ResolvedParams, time: f64) -> Self {
        let canvas = Bounds::from_size(sanitize_radius(width), sanitize_radius(height));
        paint_background(ctx, &canvas, &BackgroundStyle::from_params(params));
        Self {
            center: canvas.center(),
            size: canvas.width().min(canvas.height()),
            canvas,
            rng: Prng::for_frame(params.text(SEED), time),
        }
    }
}

pub(crate) fn seed_definition(default: &str) -> ParameterDefinition {
    ParameterDefinition::text("Seed", default)
}
