//! Declarative custom templates.
//!
//! A template is a JSON document that picks a geometry family, binds the
//! family's inputs to literals or to its own parameters, and lists the
//! compositing passes to paint. Templates are validated once, before first
//! use, and then behave like any other [`Preset`].
//!
//! ```
//! use brandmark_renderer::preset::{CustomPreset, Preset};
//! use brandmark_renderer::params::ParamMap;
//! use brandmark_renderer::surface::RecordingContext;
//!
//! let template = CustomPreset::from_json(r#"{
//!     "id": "hex-badge",
//!     "name": "Hex Badge",
//!     "parameters": {
//!         "sides": { "type": "slider", "min": 3, "max": 12, "step": 1, "default": 6 }
//!     },
//!     "family": { "type": "polygon", "sides": "$sides", "scale": 0.4 },
//!     "passes": [{ "pass": "fill" }, { "pass": "stroke" }]
//! }"#).unwrap();
//!
//! let mut ctx = RecordingContext::new();
//! let params = template.resolve(&ParamMap::new());
//! template.draw(&mut ctx, 128.0, 128.0, &params, 0.0);
//! assert!(ctx.paint_count() >= 3);
//! ```

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{seed_definition, Frame, Preset, SEED};
use crate::color::{derive_palette, Color, ColorPalette, HarmonyMode, PaletteBase};
use crate::compositing::{Compositor, Pass};
use crate::error::{EngineError, TemplateError};
use crate::geometry::circular::{CircleStyle, GoldenCircle};
use crate::geometry::crystalline::{CrystalRing, Diamond, DiamondCut};
use crate::geometry::field::{QuantumField, QuantumState};
use crate::geometry::line::MinimalLine;
use crate::geometry::organic::HandDrawn;
use crate::geometry::polygon::{RegularPolygon, Triangle, TriangleKind};
use crate::geometry::{
    offset_path, sanitize, sanitize_radius, scale_about, trace_polyline, trace_smooth, unit, upper_arc,
    GeometryPath, ShapeGenerator, DEFAULT_SMOOTHING,
};
use crate::overlay::{paint_fill, paint_stroke, universal_schema, UniversalStyle, FILL_COLOR};
use crate::params::{ParamKind, ParameterSchema, ResolvedParams};
use crate::surface::{LineCap, Paint, RenderContext};

// ============================================================================
// Template Document
// ============================================================================

/// A numeric input: a literal, or `"$name"` to read a parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Binding {
    Literal(f64),
    Reference(String),
}

impl Binding {
    /// The referenced parameter name, without the `$` sigil.
    pub fn reference(&self) -> Option<&str> {
        match self {
            Binding::Literal(_) => None,
            Binding::Reference(name) => Some(name.strip_prefix('$').unwrap_or(name)),
        }
    }

    pub fn value(&self, params: &ResolvedParams) -> f64 {
        match self {
            Binding::Literal(value) => *value,
            Binding::Reference(_) => self.reference().map_or(0.0, |name| params.number(name)),
        }
    }

    fn is_well_formed(&self) -> bool {
        match self {
            Binding::Literal(_) => true,
            Binding::Reference(name) => name.len() > 1 && name.starts_with('$'),
        }
    }
}

fn default_scale() -> Binding {
    Binding::Literal(0.35)
}

fn full_strength() -> Binding {
    Binding::Literal(1.0)
}

fn default_saturation() -> Binding {
    Binding::Literal(0.7)
}

fn default_harmony() -> String {
    "monochrome".to_string()
}

fn default_passes() -> Vec<PassSpec> {
    vec![PassSpec::new(Pass::Fill), PassSpec::new(Pass::Stroke)]
}

/// Which generator draws the outline, and what feeds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilySpec {
    /// Family name, e.g. `polygon` or `golden-circle`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Generator scale as a fraction of the shorter canvas side.
    #[serde(default = "default_scale")]
    pub scale: Binding,
    /// Curve smoothing; zero draws straight segments. Faceted families
    /// default to zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoothing: Option<Binding>,
    /// Family-specific inputs by name. Missing inputs keep the generator's
    /// default.
    #[serde(flatten)]
    pub inputs: BTreeMap<String, Binding>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteSpec {
    /// Base hue in degrees. Without one, the palette follows `fillColor`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hue: Option<Binding>,
    #[serde(default = "default_saturation")]
    pub saturation: Binding,
    #[serde(default = "default_harmony")]
    pub harmony: String,
}

impl Default for PaletteSpec {
    fn default() -> Self {
        Self {
            hue: None,
            saturation: default_saturation(),
            harmony: default_harmony(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassSpec {
    pub pass: String,
    #[serde(default = "full_strength")]
    pub strength: Binding,
    /// The pass is skipped unless its strength exceeds this.
    #[serde(default)]
    pub threshold: f64,
}

impl PassSpec {
    pub fn new(pass: Pass) -> Self {
        Self {
            pass: pass.as_str().to_string(),
            strength: full_strength(),
            threshold: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDocument {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: ParameterSchema,
    pub family: FamilySpec,
    #[serde(default)]
    pub palette: PaletteSpec,
    #[serde(default = "default_passes")]
    pub passes: Vec<PassSpec>,
}

impl TemplateDocument {
    pub fn from_json(json: &str) -> Result<Self, TemplateError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Every binding in the document with a label naming where it sits.
    fn bindings(&self) -> Vec<(String, &Binding)> {
        let mut bindings = vec![("family.scale".to_string(), &self.family.scale)];
        if let Some(smoothing) = &self.family.smoothing {
            bindings.push(("family.smoothing".to_string(), smoothing));
        }
        bindings.extend(self.family.inputs.iter().map(|(name, b)| (format!("family.{name}"), b)));
        if let Some(hue) = &self.palette.hue {
            bindings.push(("palette.hue".to_string(), hue));
        }
        bindings.push(("palette.saturation".to_string(), &self.palette.saturation));
        bindings.extend(
            self.passes
                .iter()
                .enumerate()
                .map(|(i, pass)| (format!("passes[{i}].strength"), &pass.strength)),
        );
        bindings
    }
}

// ============================================================================
// Geometry Families
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Polygon,
    Triangle,
    GoldenCircle,
    HandDrawn,
    Diamond,
    CrystalRing,
    QuantumField,
    MinimalLine,
}

impl Family {
    const ALL: [Family; 8] = [
        Family::Polygon,
        Family::Triangle,
        Family::GoldenCircle,
        Family::HandDrawn,
        Family::Diamond,
        Family::CrystalRing,
        Family::QuantumField,
        Family::MinimalLine,
    ];

    fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|family| family.name() == name)
    }

    fn name(&self) -> &'static str {
        match self {
            Family::Polygon => "polygon",
            Family::Triangle => "triangle",
            Family::GoldenCircle => "golden-circle",
            Family::HandDrawn => "hand-drawn",
            Family::Diamond => "diamond",
            Family::CrystalRing => "crystal-ring",
            Family::QuantumField => "quantum-field",
            Family::MinimalLine => "minimal-line",
        }
    }

    fn inputs(&self) -> &'static [&'static str] {
        match self {
            Family::Polygon => &["sides", "rotation", "precision", "distortion"],
            Family::Triangle => &["kind", "width", "height", "apexOffset", "precision"],
            Family::GoldenCircle => &["style", "phi", "fibonacci", "organic", "purity", "spiralTightness"],
            Family::HandDrawn => &["tremor", "wobble", "flow", "spontaneity", "pressureVariation"],
            Family::Diamond => &[
                "cut",
                "width",
                "height",
                "precision",
                "symmetry",
                "pavilionDepth",
                "girdleThickness",
            ],
            Family::CrystalRing => &["complexity", "sharpness", "rotation"],
            Family::QuantumField => &["state", "density", "waveFunction", "uncertainty", "levels"],
            Family::MinimalLine => &["precision", "simplicity", "phi", "harmony", "breaks"],
        }
    }

    /// Families drawn with straight edges unless the template asks otherwise.
    fn faceted(&self) -> bool {
        matches!(
            self,
            Family::Polygon | Family::Triangle | Family::Diamond | Family::CrystalRing
        )
    }

    /// Builds the generator, reading each input through `input(name, default)`.
    fn generator(&self, input: impl Fn(&str, f64) -> f64, seed: &str) -> Box<dyn ShapeGenerator> {
        match self {
            Family::Polygon => {
                let d = RegularPolygon::default();
                Box::new(RegularPolygon {
                    sides: sanitize(input("sides", d.sides as f64)).round().clamp(3.0, 64.0) as usize,
                    rotation: input("rotation", d.rotation),
                    precision: input("precision", d.precision),
                    distortion: input("distortion", d.distortion),
                })
            }
            Family::Triangle => {
                let d = Triangle::default();
                Box::new(Triangle {
                    kind: TriangleKind::from_index(input("kind", 0.0)),
                    width: input("width", d.width),
                    height: input("height", d.height),
                    apex_offset: input("apexOffset", d.apex_offset),
                    precision: input("precision", d.precision),
                })
            }
            Family::GoldenCircle => {
                let d = GoldenCircle::default();
                Box::new(GoldenCircle {
                    style: CircleStyle::from_index(input("style", 0.0)),
                    phi: input("phi", d.phi),
                    fibonacci: input("fibonacci", d.fibonacci),
                    organic: input("organic", d.organic),
                    purity: input("purity", d.purity),
                    spiral_tightness: input("spiralTightness", d.spiral_tightness),
                })
            }
            Family::HandDrawn => {
                let d = HandDrawn::default();
                Box::new(HandDrawn {
                    tremor: input("tremor", d.tremor),
                    wobble: input("wobble", d.wobble),
                    flow: input("flow", d.flow),
                    spontaneity: input("spontaneity", d.spontaneity),
                    pressure_variation: input("pressureVariation", d.pressure_variation),
                    seed: seed.to_string(),
                })
            }
            Family::Diamond => {
                let d = Diamond::default();
                Box::new(Diamond {
                    cut: DiamondCut::from_index(input("cut", 0.0)),
                    width: input("width", d.width),
                    height: input("height", d.height),
                    precision: input("precision", d.precision),
                    symmetry: input("symmetry", d.symmetry),
                    pavilion_depth: input("pavilionDepth", d.pavilion_depth),
                    girdle_thickness: input("girdleThickness", d.girdle_thickness),
                })
            }
            Family::CrystalRing => {
                let d = CrystalRing::default();
                Box::new(CrystalRing {
                    complexity: input("complexity", d.complexity),
                    sharpness: input("sharpness", d.sharpness),
                    rotation: input("rotation", d.rotation),
                })
            }
            Family::QuantumField => {
                let d = QuantumField::default();
                Box::new(QuantumField {
                    state: QuantumState::from_index(input("state", 2.0)),
                    density: input("density", d.density),
                    wave_function: input("waveFunction", d.wave_function),
                    uncertainty: input("uncertainty", d.uncertainty),
                    levels: input("levels", d.levels),
                    seed: seed.to_string(),
                })
            }
            Family::MinimalLine => {
                let d = MinimalLine::default();
                Box::new(MinimalLine {
                    precision: input("precision", d.precision),
                    simplicity: input("simplicity", d.simplicity),
                    phi: input("phi", d.phi),
                    harmony: input("harmony", d.harmony),
                    breaks: input("breaks", d.breaks),
                    seed: seed.to_string(),
                })
            }
        }
    }
}

// ============================================================================
// Custom Preset
// ============================================================================

/// A validated template, usable anywhere a built-in preset is.
#[derive(Debug, Clone)]
pub struct CustomPreset {
    document: TemplateDocument,
    schema: ParameterSchema,
    family: Family,
    passes: Vec<(Pass, PassSpec)>,
}

impl CustomPreset {
    pub fn from_json(json: &str) -> Result<Self, TemplateError> {
        Self::from_document(TemplateDocument::from_json(json)?)
    }

    /// Validates `document`. Nothing is drawn until this succeeds.
    pub fn from_document(document: TemplateDocument) -> Result<Self, TemplateError> {
        if document.id.trim().is_empty() {
            return Err(TemplateError::EmptyId);
        }
        document.parameters.validate()?;

        let family = Family::parse(&document.family.kind)
            .ok_or_else(|| TemplateError::UnknownFamily(document.family.kind.clone()))?;
        if let Some(input) = document.family.inputs.keys().find(|k| !family.inputs().contains(&k.as_str())) {
            return Err(TemplateError::UnknownInput {
                family: family.name().to_string(),
                input: input.clone(),
            });
        }

        let mut schema = document.parameters.clone();
        if !schema.contains(SEED) {
            schema.insert(SEED, seed_definition(&document.id));
        }
        let effective = schema.merged_over(universal_schema());
        for (label, binding) in document.bindings() {
            let declared = binding.reference().is_none_or(|name| effective.contains(name));
            if !binding.is_well_formed() || !declared {
                return Err(TemplateError::UnresolvedReference {
                    binding: label,
                    param: binding.reference().unwrap_or_default().to_string(),
                });
            }
            if let Some(name) = binding.reference()
                && !matches!(effective.get(name).map(|d| &d.kind), Some(ParamKind::Slider { .. }))
            {
                return Err(TemplateError::NonNumericReference {
                    binding: label,
                    param: name.to_string(),
                });
            }
        }

        let passes = document
            .passes
            .iter()
            .map(|spec| {
                Pass::parse(&spec.pass)
                    .map(|pass| (pass, spec.clone()))
                    .ok_or_else(|| TemplateError::UnknownPass(spec.pass.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(id = %document.id, family = family.name(), passes = passes.len(), "custom template validated");
        Ok(Self {
            document,
            schema,
            family,
            passes,
        })
    }

    pub fn document(&self) -> &TemplateDocument {
        &self.document
    }

    fn palette(&self, params: &ResolvedParams) -> ColorPalette {
        let spec = &self.document.palette;
        let mode = HarmonyMode::parse(&spec.harmony);
        let saturation = spec.saturation.value(params);
        match &spec.hue {
            Some(hue) => derive_palette(PaletteBase::Hue(hue.value(params)), saturation, 0.6, 0.5, mode),
            None => derive_palette(PaletteBase::Hex(params.text(FILL_COLOR)), saturation, 0.6, 0.5, mode),
        }
    }

    fn smoothing(&self, params: &ResolvedParams) -> f64 {
        match &self.document.family.smoothing {
            Some(binding) => sanitize(binding.value(params)).max(0.0),
            None if self.family.faceted() => 0.0,
            None => DEFAULT_SMOOTHING,
        }
    }
}

fn outline(ctx: &mut dyn RenderContext, path: &GeometryPath, smoothing: f64) {
    if smoothing > 0.0 {
        trace_smooth(ctx, path, smoothing);
    } else {
        trace_polyline(ctx, path);
    }
}

/// Fills `path` with a flat color, softened by `blur`.
fn soft_fill(ctx: &mut dyn RenderContext, path: &GeometryPath, smoothing: f64, color: Color, alpha: f64, blur: f64) {
    let alpha = ctx.global_alpha() * alpha;
    ctx.set_global_alpha(alpha);
    ctx.set_blur(blur);
    ctx.set_fill(Paint::Solid(color));
    outline(ctx, path, smoothing);
    ctx.fill();
}

impl Preset for CustomPreset {
    fn id(&self) -> &str {
        &self.document.id
    }

    fn name(&self) -> &str {
        &self.document.name
    }

    fn description(&self) -> &str {
        &self.document.description
    }

    fn parameters(&self) -> &ParameterSchema {
        &self.schema
    }

    fn draw(&self, ctx: &mut dyn RenderContext, width: f64, height: f64, params: &ResolvedParams, time: f64) {
        let Frame { center, size, .. } = Frame::begin(ctx, width, height, params, time);
        let time = if time.is_finite() { time } else { 0.0 };

        let inputs = &self.document.family.inputs;
        let generator = self.family.generator(
            |name, fallback| inputs.get(name).map_or(fallback, |binding| binding.value(params)),
            params.text(SEED),
        );
        let scale = sanitize_radius(size * self.document.family.scale.value(params));
        let path = generator.generate(center, scale, time);
        let bounds = path.bounds();
        let smoothing = self.smoothing(params);
        let palette = self.palette(params);
        let style = UniversalStyle::from_params(params, &palette);
        let line_width = style.stroke.width.max(1.0);

        let path = &path;
        let mut passes = Compositor::new();
        for (pass, spec) in &self.passes {
            let strength = spec.strength.value(params);
            let amount = unit(strength, 0.0);
            match pass {
                Pass::Shadow => passes.add_if(*pass, strength, spec.threshold, move |ctx| {
                    let shadow = offset_path(path, size * 0.02, size * 0.03);
                    soft_fill(ctx, &shadow, smoothing, Color::BLACK, 0.25 * amount, size * 0.03);
                }),
                Pass::Glow => passes.add_if(*pass, strength, spec.threshold, move |ctx| {
                    let halo = scale_about(path, center, 1.08);
                    soft_fill(ctx, &halo, smoothing, palette.highlight, 0.35 * amount, size * 0.06);
                }),
                Pass::Fill if !style.fill.is_none() => {
                    let mut fill = style.fill;
                    fill.opacity *= amount;
                    passes.add_if(*pass, strength, spec.threshold, move |ctx| {
                        outline(ctx, path, smoothing);
                        paint_fill(ctx, &bounds, &fill);
                    })
                }
                Pass::Texture => passes.add_if(*pass, strength, spec.threshold, move |ctx| {
                    let alpha = ctx.global_alpha() * 0.3 * amount;
                    ctx.set_global_alpha(alpha);
                    ctx.set_stroke(Paint::Solid(palette.secondary));
                    ctx.set_line_width(line_width * 0.5);
                    for ring in 1..=3 {
                        let inner = scale_about(path, center, 1.0 - 0.2 * ring as f64);
                        outline(ctx, &inner, smoothing);
                        ctx.stroke();
                    }
                }),
                Pass::Stroke if !style.stroke.is_none() => {
                    let mut stroke = style.stroke;
                    stroke.opacity *= amount;
                    passes.add_if(*pass, strength, spec.threshold, move |ctx| {
                        outline(ctx, path, smoothing);
                        paint_stroke(ctx, &bounds, &stroke);
                    })
                }
                Pass::Highlight => passes.add_if(*pass, strength, spec.threshold, move |ctx| {
                    let arc = upper_arc(path);
                    let alpha = ctx.global_alpha() * 0.6 * amount;
                    ctx.set_global_alpha(alpha);
                    ctx.set_stroke(Paint::Solid(palette.highlight));
                    ctx.set_line_width(line_width * 0.75);
                    ctx.set_line_cap(LineCap::Round);
                    outline(ctx, &arc, smoothing);
                    ctx.stroke();
                }),
                Pass::Fill | Pass::Stroke => continue,
            };
        }
        passes.run(ctx);
    }
}

// ============================================================================
// Guarded Execution
// ============================================================================

/// Runs `preset.draw`, turning a panic into [`EngineError::TemplateFailed`].
///
/// Scoped guards inside the draw restore the surface state while unwinding,
/// so `ctx` stays usable for the next frame.
pub fn run_guarded(
    preset: &dyn Preset,
    ctx: &mut dyn RenderContext,
    width: f64,
    height: f64,
    params: &ResolvedParams,
    time: f64,
) -> Result<(), EngineError> {
    catch_unwind(AssertUnwindSafe(|| preset.draw(ctx, width, height, params, time))).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "draw panicked".to_string());
        warn!(id = preset.id(), %message, "custom template failed");
        EngineError::TemplateFailed {
            id: preset.id().to_string(),
            message,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ParamMap, ParamValue};
    use crate::preset::PresetRegistry;
    use crate::surface::{DrawCall, RecordingContext, Scoped};

    const BADGE: &str = r#"{
        "id": "badge",
        "name": "Badge",
        "description": "A polygon badge",
        "parameters": {
            "sides": { "type": "slider", "min": 3, "max": 12, "step": 1, "default": 6, "label": "Sides" },
            "glow": { "type": "slider", "min": 0, "max": 1, "default": 0.5 }
        },
        "family": { "type": "polygon", "sides": "$sides", "scale": 0.4 },
        "palette": { "hue": 200, "harmony": "complementary" },
        "passes": [
            { "pass": "stroke" },
            { "pass": "fill" },
            { "pass": "glow", "strength": "$glow", "threshold": 0.2 }
        ]
    }"#;

    fn template(json: &str) -> Result<CustomPreset, TemplateError> {
        CustomPreset::from_json(json)
    }

    fn render(preset: &CustomPreset, overrides: &[(&str, ParamValue)]) -> RecordingContext {
        let overrides: ParamMap = overrides.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        let params = preset.resolve(&overrides);
        let mut ctx = RecordingContext::new();
        preset.draw(&mut ctx, 200.0, 200.0, &params, 0.5);
        ctx
    }

    fn with_family(family: &str) -> String {
        format!(r#"{{ "id": "t", "family": {family} }}"#)
    }

    #[test]
    fn valid_template_draws_deterministically() {
        let preset = template(BADGE).unwrap();
        assert_eq!(preset.id(), "badge");
        assert!(preset.parameters().contains(SEED), "seed is injected");
        let a = render(&preset, &[]);
        let b = render(&preset, &[]);
        assert_eq!(a.calls(), b.calls());
        assert_eq!(a.depth(), 0);
        // background, glow, fill, stroke
        assert_eq!(a.paint_count(), 4);
    }

    #[test]
    fn passes_run_in_compositing_order() {
        let preset = template(BADGE).unwrap();
        let ctx = render(&preset, &[("backgroundType", "none".into()), ("glow", 0.0.into())]);
        let paints: Vec<&DrawCall> = ctx.calls().iter().filter(|c| c.is_paint()).collect();
        assert_eq!(paints, [&DrawCall::Fill, &DrawCall::Stroke]);
    }

    #[test]
    fn bound_parameters_change_the_outline() {
        let preset = template(BADGE).unwrap();
        let lines = |ctx: &RecordingContext| ctx.count(|c| matches!(c, DrawCall::LineTo(..)));
        let triangle = render(&preset, &[("sides", 3.0.into()), ("glow", 0.0.into())]);
        let octagon = render(&preset, &[("sides", 8.0.into()), ("glow", 0.0.into())]);
        assert!(lines(&octagon) > lines(&triangle));
    }

    #[test]
    fn default_passes_are_fill_and_stroke() {
        let preset = template(&with_family(r#"{ "type": "golden-circle" }"#)).unwrap();
        let ctx = render(&preset, &[]);
        assert_eq!(ctx.count(|c| *c == DrawCall::Stroke), 1);
        assert_eq!(ctx.count(|c| *c == DrawCall::Fill), 1);
        assert_eq!(ctx.count(|c| *c == DrawCall::FillRect(0.0, 0.0, 200.0, 200.0)), 1);
    }

    #[test]
    fn none_styles_queue_no_fill_or_stroke_work() {
        let preset = template(&with_family(r#"{ "type": "polygon" }"#)).unwrap();
        let ctx = render(
            &preset,
            &[
                ("backgroundType", "none".into()),
                ("fillType", "none".into()),
                ("strokeType", "none".into()),
            ],
        );
        assert!(ctx.calls().is_empty(), "{:?}", ctx.calls());
    }

    #[test]
    fn every_family_draws() {
        for family in Family::ALL {
            let preset = template(&with_family(&format!(r#"{{ "type": "{}" }}"#, family.name()))).unwrap();
            let ctx = render(&preset, &[]);
            assert!(ctx.paint_count() >= 3, "{}", family.name());
            assert_eq!(ctx.depth(), 0);
        }
    }

    #[test]
    fn rejects_invalid_documents() {
        assert!(matches!(template(r#"{ "id": " ", "family": { "type": "polygon" } }"#), Err(TemplateError::EmptyId)));
        assert!(matches!(
            template(&with_family(r#"{ "type": "blob" }"#)),
            Err(TemplateError::UnknownFamily(name)) if name == "blob"
        ));
        assert!(matches!(
            template(&with_family(r#"{ "type": "polygon", "petals": 5 }"#)),
            Err(TemplateError::UnknownInput { input, .. }) if input == "petals"
        ));
        assert!(matches!(
            template(r#"{ "id": "t", "family": { "type": "polygon" }, "passes": [{ "pass": "sparkle" }] }"#),
            Err(TemplateError::UnknownPass(name)) if name == "sparkle"
        ));
        assert!(matches!(template("{ not json"), Err(TemplateError::Malformed(_))));
    }

    #[test]
    fn rejects_unresolved_references() {
        let err = template(&with_family(r#"{ "type": "polygon", "sides": "$missing" }"#)).unwrap_err();
        assert!(matches!(
            &err,
            TemplateError::UnresolvedReference { binding, param } if binding == "family.sides" && param == "missing"
        ));
        assert!(template(&with_family(r#"{ "type": "polygon", "sides": "six" }"#)).is_err());
        // universal controls are always in scope
        assert!(template(&with_family(r#"{ "type": "polygon", "scale": "$strokeWidth" }"#)).is_ok());
    }

    #[test]
    fn rejects_references_to_non_numeric_parameters() {
        let err = template(&with_family(r#"{ "type": "polygon", "scale": "$fillColor" }"#)).unwrap_err();
        assert!(matches!(
            &err,
            TemplateError::NonNumericReference { binding, param } if binding == "family.scale" && param == "fillColor"
        ));
        assert!(matches!(
            template(&with_family(r#"{ "type": "polygon", "sides": "$fillType" }"#)),
            Err(TemplateError::NonNumericReference { param, .. }) if param == "fillType"
        ));
    }

    #[test]
    fn rejects_invalid_parameter_definitions() {
        let json = r#"{
            "id": "t",
            "parameters": { "size": { "type": "slider", "min": 2, "max": 1, "default": 1 } },
            "family": { "type": "polygon" }
        }"#;
        assert!(matches!(template(json), Err(TemplateError::InvalidParameter { name, .. }) if name == "size"));
    }

    #[test]
    fn registers_alongside_builtins() {
        let mut registry = PresetRegistry::builtin();
        let before = registry.len();
        registry.register(template(BADGE).unwrap());
        assert_eq!(registry.len(), before + 1);
        assert_eq!(registry.load("badge").unwrap().name(), "Badge");
    }

    #[test]
    fn document_survives_export() {
        let preset = template(BADGE).unwrap();
        let json = preset.document().to_json_pretty().unwrap();
        let reparsed = CustomPreset::from_json(&json).unwrap();
        assert_eq!(reparsed.document(), preset.document());
    }

    struct Exploding;

    impl Preset for Exploding {
        fn id(&self) -> &str {
            "exploding"
        }

        fn name(&self) -> &str {
            "Exploding"
        }

        fn description(&self) -> &str {
            ""
        }

        fn parameters(&self) -> &ParameterSchema {
            universal_schema()
        }

        fn draw(&self, ctx: &mut dyn RenderContext, _: f64, _: f64, _: &ResolvedParams, _: f64) {
            let mut ctx = Scoped::new(ctx);
            ctx.translate(10.0, 10.0);
            panic!("boom");
        }
    }

    #[test]
    fn guarded_draw_reports_panics_and_restores_state() {
        let params = Exploding.resolve(&ParamMap::new());
        let mut ctx = RecordingContext::new();
        let err = run_guarded(&Exploding, &mut ctx, 10.0, 10.0, &params, 0.0).unwrap_err();
        assert!(matches!(&err, EngineError::TemplateFailed { id, message } if id == "exploding" && message == "boom"));
        assert_eq!(ctx.depth(), 0);

        let preset = template(BADGE).unwrap();
        let params = preset.resolve(&ParamMap::new());
        assert!(run_guarded(&preset, &mut ctx, 64.0, 64.0, &params, 0.0).is_ok());
    }
}
