//! Hand sketch: an organic loop drawn with a simulated drawing medium.

use super::{seed_definition, Frame, Preset};
use crate::color::{Color, ColorPalette};
use crate::compositing::{Compositor, Pass};
use crate::geometry::organic::{jitter_path, HandDrawn};
use crate::geometry::{trace_smooth, Bounds, GeometryPath, Point};
use crate::overlay::{
    paint_stroke, StrokeStyle, UniversalStyle, BACKGROUND_GRADIENT_DIRECTION, BACKGROUND_GRADIENT_END,
    BACKGROUND_GRADIENT_START, BACKGROUND_TYPE, FILL_TYPE, STROKE_COLOR, STROKE_WIDTH,
};
use crate::params::{Category, ParameterDefinition, ParameterSchema, ResolvedParams};
use crate::rng::Prng;
use crate::surface::{Paint, RenderContext, Scoped};

/// Reference canvas size for `amplitude`.
const REFERENCE_SIZE: f64 = 320.0;
const MAX_GRAIN: usize = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Medium {
    Pencil,
    Pen,
    Charcoal,
    Marker,
    Brush,
}

impl Medium {
    fn from_index(index: i64) -> Self {
        match index {
            0 => Medium::Pencil,
            2 => Medium::Charcoal,
            3 => Medium::Marker,
            4 => Medium::Brush,
            _ => Medium::Pen,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HandSketch {
    schema: ParameterSchema,
}

impl Default for HandSketch {
    fn default() -> Self {
        Self::new()
    }
}

impl HandSketch {
    pub fn new() -> Self {
        use Category::{Animation, Background, Color as Colors, Effects, Fill, Geometry, Stroke};

        let slider = ParameterDefinition::slider;
        let schema = ParameterSchema::new()
            .with("seed", seed_definition("hand-sketch-artistic"))
            .with("frequency", slider("Drawing Energy", 0.8, 0.2, 1.5, 0.1).in_category(Animation))
            .with("amplitude", slider("Sketch Size", 110.0, 60.0, 180.0, 5.0).in_category(Geometry))
            .with(
                "sketchStyle",
                slider("Sketch Style (0=Pencil, 1=Pen, 2=Charcoal, 3=Marker, 4=Brush)", 1.0, 0.0, 4.0, 1.0)
                    .in_category(Stroke),
            )
            .with("handTremor", slider("Hand Tremor", 0.15, 0.05, 0.4, 0.02).in_category(Geometry))
            .with("lineWobble", slider("Line Wobble", 0.3, 0.1, 0.8, 0.05).in_category(Geometry))
            .with("pressureVariation", slider("Pressure Variation", 0.6, 0.2, 1.0, 0.05).in_category(Stroke))
            .with("gestureSpeed", slider("Drawing Speed", 1.0, 0.3, 2.0, 0.1).in_category(Animation))
            .with("artisticFlow", slider("Artistic Flow", 0.7, 0.4, 1.0, 0.05).in_category(Geometry))
            .with("spontaneity", slider("Spontaneous Marks", 0.5, 0.2, 1.0, 0.05).in_category(Geometry))
            .with("constructionLines", slider("Construction Lines", 0.3, 0.0, 1.0, 0.05).in_category(Effects))
            .with("multipleStrokes", slider("Multiple Stroke Passes", 0.4, 0.0, 1.0, 0.05).in_category(Stroke))
            .with("crossHatching", slider("Cross Hatching", 0.2, 0.0, 1.0, 0.05).in_category(Effects))
            .with("paperTexture", slider("Paper Texture", 0.3, 0.0, 1.0, 0.05).in_category(Effects))
            .with("inkBleed", slider("Ink Bleed", 0.1, 0.0, 0.5, 0.02).in_category(Effects))
            .with("mediumHue", slider("Medium Color", 220.0, 0.0, 360.0, 15.0).in_category(Colors))
            .with("mediumSaturation", slider("Color Intensity", 0.3, 0.0, 1.0, 0.05).in_category(Colors))
            .with("mediumOpacity", slider("Medium Opacity", 0.8, 0.4, 1.0, 0.05).in_category(Colors))
            .with(
                BACKGROUND_TYPE,
                ParameterDefinition::select(
                    "Background Type",
                    "gradient",
                    &[
                        ("none", "None"),
                        ("transparent", "Transparent"),
                        ("solid", "Solid Color"),
                        ("gradient", "Gradient"),
                    ],
                )
                .in_category(Background),
            )
            .with(BACKGROUND_GRADIENT_START, ParameterDefinition::color("Gradient Start", "#fefefe").in_category(Background))
            .with(BACKGROUND_GRADIENT_END, ParameterDefinition::color("Gradient End", "#fafafa").in_category(Background))
            .with(
                BACKGROUND_GRADIENT_DIRECTION,
                slider("Gradient Direction", 45.0, 0.0, 360.0, 15.0).in_category(Background),
            )
            .with(
                FILL_TYPE,
                ParameterDefinition::select(
                    "Fill Type",
                    "none",
                    &[("none", "None"), ("solid", "Solid Color"), ("gradient", "Gradient")],
                )
                .in_category(Fill),
            )
            .with(STROKE_COLOR, ParameterDefinition::color("Stroke Color", "auto").in_category(Stroke))
            .with(STROKE_WIDTH, slider("Line Weight", 1.5, 0.5, 6.0, 0.25).in_category(Stroke));

        Self { schema }
    }
}

/// Medium tones: ink as primary, a light wash as secondary, a dark line as
/// accent and a faint construction tone as highlight.
fn medium_palette(hue: f64, saturation: f64, opacity: f64) -> ColorPalette {
    let sat = saturation.clamp(0.0, 1.0) * 100.0;
    let light = 20.0 + saturation.clamp(0.0, 1.0) * 40.0;
    let opacity = opacity.clamp(0.0, 1.0);
    ColorPalette {
        primary: Color::from_hsla(hue, sat, light, opacity),
        secondary: Color::from_hsla(hue, sat * 0.7, light + 30.0, opacity * 0.6),
        accent: Color::from_hsla(hue, sat * 1.2, light - 10.0, opacity),
        highlight: Color::from_hsla(hue, sat * 0.5, light + 40.0, opacity * 0.3),
    }
}

struct Grain {
    position: Point,
    radius: f64,
    color: Color,
}

struct Line {
    from: Point,
    to: Point,
}

/// Strokes the current path with `base` scaled to `width` and faded by `alpha`.
fn ink(ctx: &mut dyn RenderContext, bounds: &Bounds, base: &StrokeStyle, width: f64, alpha: f64) {
    let style = StrokeStyle {
        width,
        opacity: base.opacity * alpha,
        ..*base
    };
    paint_stroke(ctx, bounds, &style);
}

fn segment(ctx: &mut dyn RenderContext, a: Point, b: Point) {
    ctx.begin_path();
    ctx.move_to(a.x, a.y);
    ctx.line_to(b.x, b.y);
}

impl Preset for HandSketch {
    fn id(&self) -> &str {
        "hand-sketch"
    }

    fn name(&self) -> &str {
        "Hand Sketch"
    }

    fn description(&self) -> &str {
        "Organic hand-drawn aesthetic with tremor, pressure variation, and artistic imperfection"
    }

    fn parameters(&self) -> &ParameterSchema {
        &self.schema
    }

    fn draw(&self, ctx: &mut dyn RenderContext, width: f64, height: f64, params: &ResolvedParams, time: f64) {
        let Frame {
            canvas,
            center,
            size,
            mut rng,
        } = Frame::begin(ctx, width, height, params, time);

        let tremor = params.number("handTremor");
        let phase = time * params.number("frequency") * params.number("gestureSpeed");
        let phase = if phase.is_finite() { phase } else { 0.0 };
        let radius = params.number("amplitude") * size / REFERENCE_SIZE * (1.0 + phase.sin() * 0.05);

        let sketch = HandDrawn {
            tremor,
            wobble: params.number("lineWobble"),
            flow: params.number("artisticFlow"),
            spontaneity: params.number("spontaneity"),
            pressure_variation: params.number("pressureVariation"),
            seed: params.text("seed").to_string(),
        };
        let path = sketch.generate_with(&mut rng, center, radius, phase);
        let bounds = path.bounds();

        let medium = Medium::from_index(params.int("sketchStyle"));
        let mut palette = medium_palette(
            params.number("mediumHue"),
            params.number("mediumSaturation"),
            params.number("mediumOpacity"),
        );
        let wash = palette.accent;
        if medium != Medium::Pen {
            palette.accent = palette.primary;
        }
        let style = UniversalStyle::from_params(params, &palette);
        let weight = style.stroke.width / 1.5;

        let mut passes = Compositor::new();

        let texture = params.number("paperTexture");
        if texture > 0.1 {
            let count = ((canvas.width() * canvas.height() * texture * 0.0001) as usize).min(MAX_GRAIN);
            let grain: Vec<Grain> = (0..count)
                .map(|_| Grain {
                    position: Point::new(rng.next_f64() * canvas.width(), rng.next_f64() * canvas.height()),
                    radius: rng.next_f64() * 2.0,
                    color: if rng.chance(0.5) {
                        Color::rgb(0xf0, 0xf0, 0xf0)
                    } else {
                        Color::rgb(0xe8, 0xe8, 0xe8)
                    },
                })
                .collect();
            passes.add(Pass::Texture, move |ctx| {
                let alpha = ctx.global_alpha() * texture * 0.1;
                ctx.set_global_alpha(alpha);
                for dot in &grain {
                    ctx.set_fill(Paint::Solid(dot.color));
                    ctx.begin_path();
                    ctx.circle(dot.position.x, dot.position.y, dot.radius);
                    ctx.fill();
                }
            });
        }

        let construction = params.number("constructionLines");
        if construction > 0.1 {
            let guide = tremor * 5.0;
            let center = bounds.center();
            let lines = [
                Line {
                    from: Point::new(bounds.min_x, center.y + rng.signed() * guide),
                    to: Point::new(bounds.max_x, center.y + rng.signed() * guide),
                },
                Line {
                    from: Point::new(center.x + rng.signed() * guide, bounds.min_y),
                    to: Point::new(center.x + rng.signed() * guide, bounds.max_y),
                },
            ];
            let color = palette.highlight;
            passes.add(Pass::Texture, move |ctx| {
                let alpha = ctx.global_alpha() * construction * 0.4;
                ctx.set_global_alpha(alpha);
                ctx.set_stroke(Paint::Solid(color));
                ctx.set_line_width(0.5);
                ctx.set_line_dash(&[3.0, 2.0]);
                for line in &lines {
                    segment(ctx, line.from, line.to);
                    ctx.stroke();
                }
            });
        }

        if !style.stroke.is_none() {
            let count = (1.0 + params.number("multipleStrokes").clamp(0.0, 1.0) * 3.0).floor() as usize;
            let bleed = params.number("inkBleed");
            for pass in 0..count {
                let stroke_path = if pass == 0 {
                    path.clone()
                } else {
                    jitter_path(&path, &mut rng, tremor * 5.0)
                };
                let particles = if medium == Medium::Charcoal {
                    charcoal_particles(&stroke_path, &mut rng)
                } else {
                    Vec::new()
                };
                let stroke = style.stroke;
                let layer = pass as f64;
                passes.add(Pass::Stroke, move |ctx| {
                    if pass > 0 {
                        let alpha = ctx.global_alpha() * 0.3;
                        ctx.set_global_alpha(alpha);
                    }
                    draw_medium(ctx, medium, &stroke_path, &bounds, &stroke, weight, layer, bleed);
                    for (p, r, alpha) in &particles {
                        let mut ctx = Scoped::new(ctx);
                        let alpha = ctx.global_alpha() * alpha;
                        ctx.set_global_alpha(alpha);
                        ctx.set_fill(Paint::Solid(wash));
                        ctx.begin_path();
                        ctx.circle(p.x, p.y, *r);
                        ctx.fill();
                    }
                });
            }
        }

        let hatching = params.number("crossHatching");
        if hatching > 0.1 {
            let lines = hatch_lines(bounds.center(), radius, tremor, &mut rng);
            let color = palette.secondary;
            passes.add(Pass::Stroke, move |ctx| {
                let alpha = ctx.global_alpha() * hatching * 0.4;
                ctx.set_global_alpha(alpha);
                ctx.set_stroke(Paint::Solid(color));
                ctx.set_line_width(0.8);
                for line in &lines {
                    segment(ctx, line.from, line.to);
                    ctx.stroke();
                }
            });
        }

        passes.run(ctx);
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_medium(
    ctx: &mut dyn RenderContext,
    medium: Medium,
    path: &GeometryPath,
    bounds: &Bounds,
    stroke: &StrokeStyle,
    weight: f64,
    layer: f64,
    bleed: f64,
) {
    let n = path.len();
    let segments = (0..n).map(|i| (path.points[i], path.points[(i + 1) % n]));
    match medium {
        Medium::Pen => {
            let width = (1.5 + layer * 0.2) * weight;
            trace_smooth(ctx, path, 0.25);
            ink(ctx, bounds, stroke, width, 1.0);
            if bleed > 0.05 {
                ctx.save();
                ctx.set_blur(1.0);
                ink(ctx, bounds, stroke, width * 1.5, bleed * 0.3);
                ctx.restore();
            }
        }
        Medium::Marker => {
            let width = (3.0 + layer * 0.5) * weight;
            trace_smooth(ctx, path, 0.25);
            ink(ctx, bounds, stroke, width, 1.0);
            ink(ctx, bounds, stroke, width * 1.3, 0.2);
        }
        Medium::Pencil => {
            for (a, b) in segments {
                segment(ctx, a.position(), b.position());
                ink(ctx, bounds, stroke, (0.5 + a.weight * 2.0 + layer * 0.3) * weight, 0.7 + a.weight * 0.3);
            }
        }
        Medium::Charcoal => {
            ctx.save();
            ctx.set_blur(0.5);
            for (a, b) in segments {
                segment(ctx, a.position(), b.position());
                ink(ctx, bounds, stroke, (2.0 + a.weight * 4.0 + layer * 0.5) * weight, 0.4 + a.weight * 0.4);
            }
            ctx.restore();
        }
        Medium::Brush => {
            for (a, b) in segments {
                let speed = 0.5 + (a.angle * 4.0).sin() * 0.5;
                let width = (1.0 + a.weight * 6.0 - speed * 2.0 + layer * 0.3).max(0.5) * weight;
                segment(ctx, a.position(), b.position());
                ink(ctx, bounds, stroke, width, 0.6 + a.weight * 0.4);
            }
        }
    }
}

/// Dust particles left by charcoal, denser where the pressure is higher.
fn charcoal_particles(path: &GeometryPath, rng: &mut Prng) -> Vec<(Point, f64, f64)> {
    path.points
        .iter()
        .filter_map(|p| {
            if rng.chance(p.weight * 0.3) {
                let at = Point::new(p.x + rng.signed() * 3.0, p.y + rng.signed() * 3.0);
                Some((at, rng.next_f64() * 1.5, p.weight * 0.5))
            } else {
                None
            }
        })
        .collect()
}

/// Two families of diagonal hatch lines through `center`.
fn hatch_lines(center: Point, scale: f64, tremor: f64, rng: &mut Prng) -> Vec<Line> {
    let spacing = scale * 0.15;
    if !(spacing > 0.0) {
        return Vec::new();
    }
    let mut lines = Vec::new();
    for degrees in [45.0_f64, -45.0] {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let mut offset = -scale;
        while offset < scale {
            let mut shake = || rng.signed() * tremor * 5.0;
            lines.push(Line {
                from: Point::new(
                    center.x + offset * cos - scale * sin + shake(),
                    center.y + offset * sin + scale * cos + shake(),
                ),
                to: Point::new(
                    center.x + offset * cos + scale * sin + shake(),
                    center.y + offset * sin - scale * cos + shake(),
                ),
            });
            offset += spacing;
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ParamMap, ParamValue};
    use crate::surface::{DrawCall, RecordingContext};

    fn render(overrides: &[(&str, ParamValue)]) -> RecordingContext {
        let preset = HandSketch::new();
        let overrides: ParamMap = overrides.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        let params = preset.resolve(&overrides);
        let mut ctx = RecordingContext::new();
        preset.draw(&mut ctx, 320.0, 320.0, &params, 0.5);
        ctx
    }

    fn strokes(ctx: &RecordingContext) -> usize {
        ctx.count(|c| *c == DrawCall::Stroke)
    }

    const QUIET: [(&str, f64); 4] = [
        ("constructionLines", 0.0),
        ("crossHatching", 0.0),
        ("paperTexture", 0.0),
        ("inkBleed", 0.0),
    ];

    fn quiet<'a>(extra: &[(&'a str, ParamValue)]) -> Vec<(&'a str, ParamValue)> {
        let mut all: Vec<(&'a str, ParamValue)> = QUIET.iter().map(|&(k, v)| (k, v.into())).collect();
        all.extend(extra.iter().cloned());
        all
    }

    #[test]
    fn paper_background_is_a_gradient() {
        let ctx = render(&[]);
        let gradient = |c: &DrawCall| matches!(c, DrawCall::SetFill(Paint::Linear { .. }));
        assert_eq!(ctx.count(gradient), 1);
    }

    #[test]
    fn pen_strokes_once_per_pass() {
        let ctx = render(&quiet(&[("multipleStrokes", 1.0.into())]));
        assert_eq!(strokes(&ctx), 4);
        let ctx = render(&quiet(&[]));
        assert_eq!(strokes(&ctx), 2);
    }

    #[test]
    fn later_passes_are_faint() {
        let ctx = render(&quiet(&[]));
        let alphas = ctx.paint_alphas();
        // background, first pass, second pass
        assert_eq!(alphas.len(), 3);
        assert!(alphas[2] < alphas[1]);
    }

    #[test]
    fn pencil_strokes_each_segment() {
        let ctx = render(&quiet(&[("sketchStyle", 0.0.into()), ("multipleStrokes", 0.0.into())]));
        let n = HandDrawn { flow: 0.7, ..HandDrawn::default() }
            .generate_with(&mut Prng::new(1u32), Point::new(0.0, 0.0), 10.0, 0.0)
            .len();
        assert_eq!(strokes(&ctx), n);
    }

    #[test]
    fn stroke_type_none_removes_sketch_lines() {
        let ctx = render(&quiet(&[("strokeType", "none".into())]));
        assert_eq!(strokes(&ctx), 0);
    }

    #[test]
    fn construction_and_hatching_add_lines() {
        let base = strokes(&render(&quiet(&[])));
        let ctx = render(&[("paperTexture", 0.0.into()), ("inkBleed", 0.0.into())]);
        assert!(strokes(&ctx) > base + 2);
    }

    #[test]
    fn every_medium_balances_state() {
        for style in 0..5 {
            let ctx = render(&[("sketchStyle", (style as f64).into()), ("inkBleed", 0.3.into())]);
            assert_eq!(ctx.depth(), 0, "style {style}");
            assert!(strokes(&ctx) > 0);
        }
    }

    #[test]
    fn seed_changes_the_drawing() {
        let a = render(&[]);
        let b = render(&[("seed", "another-hand".into())]);
        assert_ne!(a.calls(), b.calls());
    }

    #[test]
    fn medium_palette_tones() {
        let palette = medium_palette(220.0, 0.3, 0.8);
        assert!((palette.primary.a - 0.8).abs() < 1e-6);
        assert!((palette.highlight.a - 0.24).abs() < 1e-6);
        assert!(palette.accent.luminance() < palette.primary.luminance());
    }
}
