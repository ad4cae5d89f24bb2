//! Minimal line: one refined loop with generous whitespace.

use super::{seed_definition, Frame, Preset};
use crate::color::{Color, ColorPalette};
use crate::compositing::{Compositor, Pass};
use crate::geometry::line::{parallel_offset, MinimalLine};
use crate::geometry::{trace_smooth, GeometryPath, Point};
use crate::overlay::{paint_stroke, StrokeKind, UniversalStyle, FILL_TYPE, STROKE_COLOR, STROKE_WIDTH};
use crate::params::{Category, ParameterDefinition, ParameterSchema, ResolvedParams, VisibleWhen};
use crate::surface::{Paint, RenderContext};

/// Reference canvas size for `amplitude`; larger than the other presets to
/// leave whitespace.
const REFERENCE_SIZE: f64 = 400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineStyle {
    Single,
    Double,
    Dashed,
    Dotted,
    Gradient,
}

impl LineStyle {
    fn from_index(index: i64) -> Self {
        match index {
            1 => LineStyle::Double,
            2 => LineStyle::Dashed,
            3 => LineStyle::Dotted,
            4 => LineStyle::Gradient,
            _ => LineStyle::Single,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MinimalLinePreset {
    schema: ParameterSchema,
}

impl Default for MinimalLinePreset {
    fn default() -> Self {
        Self::new()
    }
}

impl MinimalLinePreset {
    pub fn new() -> Self {
        use Category::{Animation, Color as Colors, Fill, Geometry, Stroke};

        let slider = ParameterDefinition::slider;
        let schema = ParameterSchema::new()
            .with("seed", seed_definition("minimal-line-elegant"))
            .with("frequency", slider("Line Rhythm", 0.3, 0.1, 1.0, 0.05).in_category(Animation))
            .with("amplitude", slider("Scale", 80.0, 40.0, 160.0, 5.0).in_category(Geometry))
            .with(
                "lineStyle",
                slider("Line Style (0=Single, 1=Double, 2=Dashed, 3=Dotted, 4=Gradient)", 0.0, 0.0, 4.0, 1.0)
                    .in_category(Stroke),
            )
            .with("precision", slider("Geometric Precision", 0.95, 0.8, 1.0, 0.01).in_category(Geometry))
            .with("simplicity", slider("Visual Simplicity", 0.9, 0.7, 1.0, 0.02).in_category(Geometry))
            .with("refinement", slider("Line Refinement", 0.8, 0.5, 1.0, 0.05).in_category(Stroke))
            .with(
                "strokeSpacing",
                slider("Double Line Spacing", 6.0, 2.0, 12.0, 1.0)
                    .in_category(Stroke)
                    .visible_when(VisibleWhen::equals("lineStyle", 1.0)),
            )
            .with("breathingSpace", slider("Breathing Animation", 0.03, 0.0, 0.1, 0.01).in_category(Animation))
            .with("lineBreaks", slider("Intentional Breaks", 0.05, 0.0, 0.3, 0.02).in_category(Geometry))
            .with(
                "colorPhilosophy",
                slider("Color (0=Pure Black, 1=Warm Gray, 2=Cool Gray, 3=Accent Color)", 0.0, 0.0, 3.0, 1.0)
                    .in_category(Colors),
            )
            .with(
                "accentHue",
                slider("Accent Hue", 200.0, 0.0, 360.0, 15.0)
                    .in_category(Colors)
                    .visible_when(VisibleWhen::equals("colorPhilosophy", 3.0)),
            )
            .with("sophistication", slider("Color Sophistication", 0.6, 0.3, 0.8, 0.05).in_category(Colors))
            .with("goldenRatio", slider("Golden Ratio (φ)", 1.618, 1.4, 1.8, 0.05).in_category(Geometry))
            .with("proportionalHarmony", slider("Proportional Harmony", 0.9, 0.7, 1.0, 0.05).in_category(Geometry))
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

/// Restrained line colors. The line tone sits in `accent` so an `auto`
/// stroke picks it up; gradients run from `secondary` to `primary`.
fn line_palette(philosophy: i64, hue: f64, sophistication: f64) -> ColorPalette {
    let saturation = sophistication * 30.0;
    let lightness = 20.0 + sophistication * 40.0;
    let (line, light, deep) = match philosophy {
        0 => (Color::BLACK, Color::rgb(0x1a, 0x1a, 0x1a), Color::rgb(0x33, 0x33, 0x33)),
        1 | 2 => {
            let hue = if philosophy == 1 { 30.0 } else { 210.0 };
            (
                Color::from_hsl(hue, saturation * 0.3, lightness),
                Color::from_hsl(hue, saturation * 0.2, lightness + 20.0),
                Color::from_hsl(hue, saturation * 0.4, lightness - 10.0),
            )
        }
        _ => (
            Color::from_hsl(hue, saturation, lightness),
            Color::from_hsl(hue, saturation * 0.7, lightness + 15.0),
            Color::from_hsl(hue, saturation * 1.2, lightness - 5.0),
        ),
    };
    ColorPalette {
        primary: line,
        secondary: light,
        accent: line,
        highlight: deep,
    }
}

/// Evenly spaced dot centers along the unbroken segments of `path`.
fn dot_positions(path: &GeometryPath, spacing: f64) -> Vec<Point> {
    let n = path.len();
    if n < 2 || !(spacing > 0.0) {
        return Vec::new();
    }
    let segments: Vec<(Point, Point)> = (0..n)
        .map(|i| (path.points[i], path.points[(i + 1) % n]))
        .filter(|(a, b)| !a.is_break && !b.is_break)
        .map(|(a, b)| (a.position(), b.position()))
        .collect();
    let total: f64 = segments.iter().map(|(a, b)| a.distance(*b)).sum();
    let count = (total / spacing).floor() as usize;

    let mut dots = Vec::with_capacity(count);
    let mut walked = 0.0;
    let mut segment = segments.iter();
    let mut current = segment.next();
    for i in 0..count {
        let target = i as f64 / count as f64 * total;
        while let Some((a, b)) = current {
            let length = a.distance(*b);
            if walked + length >= target {
                let t = if length > 0.0 { (target - walked) / length } else { 0.0 };
                dots.push(a.lerp(*b, t));
                break;
            }
            walked += length;
            current = segment.next();
        }
    }
    dots
}

impl Preset for MinimalLinePreset {
    fn id(&self) -> &str {
        "minimal-line"
    }

    fn name(&self) -> &str {
        "Minimal Line"
    }

    fn description(&self) -> &str {
        "Ultra-clean single-line aesthetic with sophisticated simplicity and intentional whitespace"
    }

    fn parameters(&self) -> &ParameterSchema {
        &self.schema
    }

    fn draw(&self, ctx: &mut dyn RenderContext, width: f64, height: f64, params: &ResolvedParams, time: f64) {
        let Frame {
            center,
            size,
            mut rng,
            ..
        } = Frame::begin(ctx, width, height, params, time);
        let time = if time.is_finite() { time } else { 0.0 };

        let pulse = 1.0 + (time * params.number("frequency") * 0.5).sin() * params.number("breathingSpace");
        let radius = params.number("amplitude") * size / REFERENCE_SIZE * pulse;
        let line = MinimalLine {
            precision: params.number("precision"),
            simplicity: params.number("simplicity"),
            phi: params.number("goldenRatio"),
            harmony: params.number("proportionalHarmony"),
            breaks: params.number("lineBreaks"),
            seed: params.text("seed").to_string(),
        };
        let path = line.generate_with(&mut rng, center, radius, time);
        let bounds = path.bounds();

        let palette = line_palette(
            params.int("colorPhilosophy"),
            params.number("accentHue"),
            params.number("sophistication"),
        );
        let style = UniversalStyle::from_params(params, &palette);
        if style.stroke.is_none() {
            return;
        }

        let line_style = LineStyle::from_index(params.int("lineStyle"));
        let mut stroke = style.stroke;
        if stroke.kind == StrokeKind::Solid {
            stroke.kind = match line_style {
                LineStyle::Dashed => StrokeKind::Dashed,
                LineStyle::Gradient => StrokeKind::Gradient,
                _ => StrokeKind::Solid,
            };
        }
        let smoothing = params.number("refinement") * 0.3;

        let mut passes = Compositor::new();
        match line_style {
            LineStyle::Dotted => {
                let dots = dot_positions(&path, stroke.width * 5.0);
                let radius = stroke.width * 0.7;
                passes.add(Pass::Stroke, move |ctx| {
                    let alpha = ctx.global_alpha() * stroke.opacity.clamp(0.0, 1.0);
                    ctx.set_global_alpha(alpha);
                    ctx.set_fill(Paint::Solid(stroke.color));
                    for dot in &dots {
                        ctx.begin_path();
                        ctx.circle(dot.x, dot.y, radius);
                        ctx.fill();
                    }
                });
            }
            LineStyle::Double => {
                let half = params.number("strokeSpacing") / 2.0;
                let outer = parallel_offset(&path, half);
                let inner = parallel_offset(&path, -half);
                passes.add(Pass::Stroke, move |ctx| {
                    for side in [&outer, &inner] {
                        trace_smooth(ctx, side, smoothing);
                        paint_stroke(ctx, &bounds, &stroke);
                    }
                });
            }
            _ => {
                let path = &path;
                passes.add(Pass::Stroke, move |ctx| {
                    trace_smooth(ctx, path, smoothing);
                    paint_stroke(ctx, &bounds, &stroke);
                });
            }
        }
        passes.run(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ShapeGenerator;
    use crate::params::{ParamMap, ParamValue};
    use crate::surface::{DrawCall, RecordingContext};

    fn render(overrides: &[(&str, ParamValue)]) -> RecordingContext {
        let preset = MinimalLinePreset::new();
        let overrides: ParamMap = overrides.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        let params = preset.resolve(&overrides);
        let mut ctx = RecordingContext::new();
        preset.draw(&mut ctx, 400.0, 400.0, &params, 0.0);
        ctx
    }

    fn strokes(ctx: &RecordingContext) -> usize {
        ctx.count(|c| *c == DrawCall::Stroke)
    }

    #[test]
    fn single_line_in_pure_black() {
        let ctx = render(&[]);
        assert_eq!(strokes(&ctx), 1);
        assert!(ctx.calls().contains(&DrawCall::SetStroke(Paint::Solid(Color::BLACK))));
        assert!(ctx.calls().contains(&DrawCall::SetLineWidth(1.5)));
    }

    #[test]
    fn double_line_strokes_twice() {
        assert_eq!(strokes(&render(&[("lineStyle", 1.0.into())])), 2);
    }

    #[test]
    fn dashed_style_uses_dash_pattern() {
        let ctx = render(&[("lineStyle", 2.0.into())]);
        assert!(ctx.calls().contains(&DrawCall::SetLineDash(vec![4.5, 3.0])));
    }

    #[test]
    fn explicit_stroke_type_wins_over_line_style() {
        let ctx = render(&[("lineStyle", 2.0.into()), ("strokeType", "dotted".into())]);
        assert!(ctx.calls().contains(&DrawCall::SetLineDash(vec![1.5, 1.5])));
    }

    #[test]
    fn dotted_style_fills_dots() {
        let ctx = render(&[("lineStyle", 3.0.into())]);
        assert_eq!(strokes(&ctx), 0);
        assert!(ctx.count(|c| *c == DrawCall::Fill) > 10);
    }

    #[test]
    fn gradient_style_strokes_with_gradient() {
        let ctx = render(&[("lineStyle", 4.0.into()), ("colorPhilosophy", 3.0.into())]);
        assert_eq!(ctx.count(|c| matches!(c, DrawCall::SetStroke(Paint::Linear { .. }))), 1);
    }

    #[test]
    fn stroke_type_none_leaves_only_background() {
        let ctx = render(&[("strokeType", "none".into())]);
        assert_eq!(ctx.paint_count(), 1);
    }

    #[test]
    fn dots_skip_broken_segments() {
        let mut path = MinimalLine::default().generate(Point::new(0.0, 0.0), 100.0, 0.0);
        let whole = dot_positions(&path, 10.0).len();
        path.points[0] = path.points[0].as_break();
        let broken = dot_positions(&path, 10.0).len();
        assert!(broken < whole);
        assert!(dot_positions(&path, 0.0).is_empty());
    }

    #[test]
    fn philosophies_differ() {
        let black = line_palette(0, 200.0, 0.6);
        let warm = line_palette(1, 200.0, 0.6);
        let accent = line_palette(3, 200.0, 0.6);
        assert_eq!(black.accent, Color::BLACK);
        assert_ne!(warm.accent, accent.accent);
        let (hue, _, _) = accent.accent.to_hsl();
        assert!((hue - 200.0).abs() <= 5.0);
    }
}
