//! Golden circle: Fibonacci-proportioned circles with concentric layers.

use super::{seed_definition, Frame, Preset};
use crate::color::{derive_palette, Color, ColorPalette, HarmonyMode, PaletteBase};
use crate::compositing::{layer_alpha, Compositor, Pass};
use crate::geometry::circular::{breathing_pulse, CircleStyle, GoldenCircle};
use crate::geometry::{scale_about, trace_smooth, GeometryPath, Point, ShapeGenerator, DEFAULT_SMOOTHING};
use crate::overlay::{paint_fill, paint_stroke, FillStyle, StrokeStyle, UniversalStyle, FILL_COLOR, STROKE_COLOR};
use crate::params::{Category, ParameterDefinition, ParameterSchema, ResolvedParams, VisibleWhen};
use crate::surface::{GradientStop, Paint, RenderContext};

/// Golden-ratio color stop offsets for the Fibonacci fill.
const FIBONACCI_STOPS: [f64; 5] = [0.0, 0.236, 0.382, 0.618, 1.0];

#[derive(Debug, Clone)]
pub struct GoldenCirclePreset {
    schema: ParameterSchema,
}

impl Default for GoldenCirclePreset {
    fn default() -> Self {
        Self::new()
    }
}

impl GoldenCirclePreset {
    pub fn new() -> Self {
        use Category::{Animation, Color as Colors, Effects, Fill, Geometry, Stroke};

        let schema = ParameterSchema::new()
            .with("seed", seed_definition("golden-circle-brand"))
            .with(
                "circleStyle",
                ParameterDefinition::slider(
                    "Circle Style (0=Perfect, 1=Organic, 2=Spiral, 3=Segmented, 4=Breathing)",
                    0.0,
                    0.0,
                    4.0,
                    1.0,
                )
                .in_category(Geometry),
            )
            .with(
                "goldenProportion",
                ParameterDefinition::slider("Golden Ratio (φ=1.618)", 1.618, 0.5, 2.0, 0.05).in_category(Geometry),
            )
            .with(
                "fibonacciInfluence",
                ParameterDefinition::slider("Fibonacci Curve Influence", 0.3, 0.0, 1.0, 0.05).in_category(Geometry),
            )
            .with(
                "organicVariation",
                ParameterDefinition::slider("Natural Variation", 0.08, 0.0, 0.3, 0.01).in_category(Geometry),
            )
            .with(
                "mathematicalPurity",
                ParameterDefinition::slider("Geometric Precision", 0.9, 0.7, 1.0, 0.01).in_category(Geometry),
            )
            .with(
                "concentricLayers",
                ParameterDefinition::slider("Concentric Rings", 1.0, 1.0, 4.0, 1.0).in_category(Geometry),
            )
            .with(
                "spiralTightness",
                ParameterDefinition::slider("Spiral Tightness", 0.8, 0.1, 2.0, 0.1)
                    .in_category(Geometry)
                    .visible_when(VisibleWhen::equals("circleStyle", 2.0)),
            )
            .with(
                "borderStyle",
                ParameterDefinition::slider("Border (0=None, 1=Clean, 2=Double, 3=Organic)", 0.0, 0.0, 3.0, 1.0)
                    .in_category(Stroke),
            )
            .with(
                "fillStyle",
                ParameterDefinition::slider("Fill (0=None, 1=Solid, 2=Radial, 3=Fibonacci Gradient)", 2.0, 0.0, 3.0, 1.0)
                    .in_category(Fill),
            )
            .with(
                "colorMode",
                ParameterDefinition::select(
                    "Color Mode",
                    "theme",
                    &[("theme", "Use Theme Colors"), ("golden", "Golden Palette"), ("custom", "Custom Colors")],
                )
                .in_category(Colors),
            )
            .with("warmth", ParameterDefinition::slider("Color Warmth", 0.7, 0.3, 1.0, 0.05).in_category(Colors))
            .with(
                "sophistication",
                ParameterDefinition::slider("Color Sophistication", 0.6, 0.4, 0.9, 0.05).in_category(Colors),
            )
            .with("innerGlow", ParameterDefinition::slider("Inner Radiance", 0.15, 0.0, 0.4, 0.05).in_category(Effects))
            .with(
                "breathingMotion",
                ParameterDefinition::slider("Subtle Animation", 0.05, 0.0, 0.2, 0.02).in_category(Animation),
            )
            .with(FILL_COLOR, ParameterDefinition::color("Fill Color", "#d4a574").in_category(Fill))
            .with(STROKE_COLOR, ParameterDefinition::color("Stroke Color", "auto").in_category(Stroke));

        Self { schema }
    }
}

fn palette_for(params: &ResolvedParams) -> ColorPalette {
    let warmth = params.number("warmth");
    let sophistication = params.number("sophistication");
    let fill = params.text(FILL_COLOR);
    match params.text("colorMode") {
        "golden" => derive_palette(PaletteBase::Hue(38.0), sophistication, sophistication, warmth, HarmonyMode::Monochrome),
        "custom" => {
            let (hue, _, _) = Color::parse_or_neutral(fill).to_hsl();
            derive_palette(PaletteBase::Hue(hue), sophistication, sophistication, warmth, HarmonyMode::Analogous)
        }
        _ => derive_palette(PaletteBase::Hex(fill), 0.8, sophistication, warmth, HarmonyMode::ThemeLocked),
    }
}

/// Preset-specific radial paint drawn over a layer. The depth radial of
/// style 2 only stands in when the universal fill is `none`; the Fibonacci
/// radial of style 3 always applies.
fn layer_paint(fill_style: i64, universal: bool, palette: &ColorPalette, center: Point, radius: f64) -> Option<Paint> {
    match fill_style {
        2 if !universal => {
            let offset = Point::new(center.x - radius * 0.3, center.y - radius * 0.3);
            Some(Paint::radial(
                offset,
                0.0,
                radius * 1.1,
                vec![
                    GradientStop::new(0.0, palette.secondary),
                    GradientStop::new(0.6, palette.primary),
                    GradientStop::new(1.0, palette.accent),
                ],
            ))
        }
        3 => {
            let depth = palette.accent.mix(&Color::BLACK, 0.3);
            let colors = [palette.highlight, palette.secondary, palette.primary, palette.accent, depth];
            let stops = FIBONACCI_STOPS
                .iter()
                .zip(colors)
                .map(|(&offset, color)| GradientStop::new(offset, color))
                .collect();
            Some(Paint::radial(center, 0.0, radius, stops))
        }
        _ => None,
    }
}

fn outline(ctx: &mut dyn RenderContext, path: &GeometryPath) {
    trace_smooth(ctx, path, DEFAULT_SMOOTHING);
}

impl Preset for GoldenCirclePreset {
    fn id(&self) -> &str {
        "golden-circle"
    }

    fn name(&self) -> &str {
        "Golden Circle"
    }

    fn description(&self) -> &str {
        "Fibonacci-based proportions with theme-aware colors and organic refinement"
    }

    fn parameters(&self) -> &ParameterSchema {
        &self.schema
    }

    fn draw(&self, ctx: &mut dyn RenderContext, width: f64, height: f64, params: &ResolvedParams, time: f64) {
        let frame = Frame::begin(ctx, width, height, params, time);
        let center = frame.center;
        let radius = frame.size * 0.55 / 2.0 * breathing_pulse(time, params.number("breathingMotion"));

        let circle = GoldenCircle {
            style: CircleStyle::from_index(params.number("circleStyle")),
            phi: params.number("goldenProportion"),
            fibonacci: params.number("fibonacciInfluence"),
            organic: params.number("organicVariation"),
            purity: params.number("mathematicalPurity"),
            spiral_tightness: params.number("spiralTightness"),
        };
        let path = circle.generate(center, radius, time);
        let bounds = path.bounds();

        let palette = palette_for(params);
        let style = UniversalStyle::from_params(params, &palette);
        let fill_style = params.int("fillStyle");
        let glow = params.number("innerGlow");
        let layers = params.int("concentricLayers").clamp(1, 8) as usize;

        let mut passes = Compositor::new();

        if frame.size > 80.0 {
            let path = &path;
            passes.add_if(Pass::Glow, glow, 0.05, move |ctx| {
                let alpha = ctx.global_alpha() * glow;
                ctx.set_global_alpha(alpha);
                ctx.set_fill(Paint::radial(
                    center,
                    radius * 0.3,
                    radius * 1.2,
                    vec![
                        GradientStop::new(0.0, palette.highlight),
                        GradientStop::new(0.7, palette.secondary),
                        GradientStop::new(1.0, Color::TRANSPARENT),
                    ],
                ));
                outline(ctx, path);
                ctx.fill();
            });
        }

        if fill_style > 0 {
            let universal = !style.fill.is_none();
            for layer in 0..layers {
                let shrink = 1.0 - layer as f64 * 0.15;
                let paint = layer_paint(fill_style, universal, &palette, center, radius * shrink);
                if !universal && paint.is_none() {
                    continue;
                }
                let layer_circle = GoldenCircle {
                    fibonacci: circle.fibonacci * (1.0 - layer as f64 * 0.3),
                    ..circle
                };
                let layer_path = layer_circle.generate(center, radius * shrink, time);
                let layer_bounds = layer_path.bounds();
                let fade = layer_alpha(layer);
                let fill = FillStyle {
                    opacity: style.fill.opacity * fade,
                    ..style.fill
                };
                passes.add(Pass::Fill, move |ctx| {
                    outline(ctx, &layer_path);
                    paint_fill(ctx, &layer_bounds, &fill);
                    if let Some(paint) = paint {
                        let alpha = ctx.global_alpha() * fade;
                        ctx.set_global_alpha(alpha);
                        ctx.set_fill(paint);
                        ctx.fill();
                    }
                });
            }
        }

        let border = params.int("borderStyle");
        if border > 0 && !style.stroke.is_none() {
            let stroke = style.stroke;
            let organic = circle.organic;
            let path = &path;
            passes.add(Pass::Stroke, move |ctx| match border {
                2 => {
                    outline(ctx, path);
                    paint_stroke(ctx, &bounds, &stroke);
                    let inner = scale_about(path, center, 0.85);
                    let inner_stroke = StrokeStyle {
                        color: palette.highlight,
                        width: stroke.width * 0.5,
                        ..stroke
                    };
                    outline(ctx, &inner);
                    paint_stroke(ctx, &inner.bounds(), &inner_stroke);
                }
                3 => {
                    let n = path.len();
                    for i in 0..n {
                        let (a, b) = (path.points[i], path.points[(i + 1) % n]);
                        let weight = 1.0 + organic * (1.0 + (a.angle * 3.0).sin().abs() * 4.0);
                        let segment = StrokeStyle {
                            width: stroke.width * weight,
                            ..stroke
                        };
                        ctx.begin_path();
                        ctx.move_to(a.x, a.y);
                        ctx.line_to(b.x, b.y);
                        paint_stroke(ctx, &bounds, &segment);
                    }
                }
                _ => {
                    outline(ctx, path);
                    paint_stroke(ctx, &bounds, &stroke);
                }
            });
        }

        passes.run(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ParamMap, ParamValue};
    use crate::surface::{DrawCall, RecordingContext};

    fn render(overrides: &[(&str, ParamValue)], time: f64) -> RecordingContext {
        let preset = GoldenCirclePreset::new();
        let overrides: ParamMap = overrides.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        let params = preset.resolve(&overrides);
        let mut ctx = RecordingContext::new();
        preset.draw(&mut ctx, 400.0, 400.0, &params, time);
        ctx
    }

    #[test]
    fn defaults_paint_background_glow_and_solid_layer() {
        let ctx = render(&[], 0.0);
        // background, glow, one layer
        assert_eq!(ctx.paint_count(), 3);
        let radial_fills = ctx.count(|c| matches!(c, DrawCall::SetFill(Paint::Radial { .. })));
        assert_eq!(radial_fills, 1);
        let fill = Color::parse_or_neutral("#d4a574");
        assert!(ctx.calls().contains(&DrawCall::SetFill(Paint::Solid(fill))));
    }

    #[test]
    fn gradient_fill_type_reaches_the_layers() {
        let ctx = render(&[("fillType", "gradient".into()), ("innerGlow", 0.0.into())], 0.0);
        let linear = ctx.count(|c| matches!(c, DrawCall::SetFill(Paint::Linear { .. })));
        let radial = ctx.count(|c| matches!(c, DrawCall::SetFill(Paint::Radial { .. })));
        assert_eq!(linear, 1);
        assert_eq!(radial, 0);
    }

    #[test]
    fn concentric_layers_fade_outside_in() {
        let ctx = render(&[("concentricLayers", 3.0.into()), ("innerGlow", 0.0.into())], 0.0);
        let alphas = ctx.paint_alphas();
        assert_eq!(alphas.len(), 4);
        assert_eq!(alphas[1], 1.0);
        assert!((alphas[2] - 0.8).abs() < 1e-9);
        assert!((alphas[3] - 0.6).abs() < 1e-9);
    }

    #[test]
    fn solid_style_goes_through_overlay() {
        let ctx = render(&[("fillStyle", 1.0.into()), ("innerGlow", 0.0.into())], 0.0);
        let fill = Color::parse_or_neutral("#d4a574");
        assert!(ctx.calls().contains(&DrawCall::SetFill(Paint::Solid(fill))));
    }

    #[test]
    fn fill_type_none_falls_back_to_depth_radial() {
        let ctx = render(&[("fillType", "none".into()), ("innerGlow", 0.0.into())], 0.0);
        assert_eq!(ctx.paint_count(), 2);
        assert_eq!(ctx.count(|c| matches!(c, DrawCall::SetFill(Paint::Radial { .. }))), 1);
    }

    #[test]
    fn fill_type_none_with_flat_style_paints_no_layers() {
        let ctx = render(
            &[("fillType", "none".into()), ("fillStyle", 1.0.into()), ("innerGlow", 0.0.into())],
            0.0,
        );
        assert_eq!(ctx.paint_count(), 1);
    }

    #[test]
    fn fibonacci_style_layers_over_the_universal_fill() {
        let ctx = render(&[("fillStyle", 3.0.into()), ("innerGlow", 0.0.into())], 0.0);
        assert_eq!(ctx.paint_count(), 3);
        assert_eq!(ctx.count(|c| matches!(c, DrawCall::SetFill(Paint::Solid(_)))), 2);
        assert_eq!(ctx.count(|c| matches!(c, DrawCall::SetFill(Paint::Radial { .. }))), 1);
    }

    #[test]
    fn fill_style_zero_paints_no_layers() {
        let ctx = render(&[("fillStyle", 0.0.into()), ("innerGlow", 0.0.into())], 0.0);
        assert_eq!(ctx.paint_count(), 1);
    }

    #[test]
    fn double_border_strokes_twice() {
        let ctx = render(&[("borderStyle", 2.0.into())], 0.0);
        assert_eq!(ctx.count(|c| *c == DrawCall::Stroke), 2);
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn organic_border_strokes_each_segment() {
        let ctx = render(&[("borderStyle", 3.0.into())], 0.0);
        let strokes = ctx.count(|c| *c == DrawCall::Stroke);
        assert!(strokes >= 3);
    }

    #[test]
    fn border_is_skipped_when_stroke_is_none() {
        let ctx = render(&[("borderStyle", 1.0.into()), ("strokeType", "none".into())], 0.0);
        assert_eq!(ctx.count(|c| *c == DrawCall::Stroke), 0);
    }

    #[test]
    fn breathing_changes_with_time() {
        let still = render(&[("breathingMotion", 0.0.into())], 0.0);
        let later = render(&[("breathingMotion", 0.0.into())], 2.0);
        let moving = render(&[("breathingMotion", 0.2.into())], 2.0);
        let style = |ctx: &RecordingContext| ctx.calls().to_vec();
        assert_eq!(style(&still), style(&later));
        assert_ne!(style(&still), style(&moving));
    }

    #[test]
    fn golden_mode_uses_golden_hue() {
        let preset = GoldenCirclePreset::new();
        let mut overrides = ParamMap::new();
        overrides.insert("colorMode".into(), "golden".into());
        let palette = palette_for(&preset.resolve(&overrides));
        let (hue, _, _) = palette.primary.to_hsl();
        assert!((hue - 38.0).abs() <= 1.5);
    }
}
