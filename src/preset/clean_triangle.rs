//! Clean triangle: precise geometric triangles for tech brands.

use std::f64::consts::TAU;

use super::{seed_definition, Frame, Preset};
use crate::color::{Color, ColorPalette};
use crate::compositing::{Compositor, Pass};
use crate::geometry::polygon::{rounded_corners, Triangle, TriangleKind};
use crate::geometry::{trace, Point, ShapeGenerator, PHI};
use crate::overlay::{
    paint_fill, paint_stroke, FillKind, UniversalStyle, FILL_COLOR, FILL_GRADIENT_DIRECTION, FILL_GRADIENT_END,
    FILL_GRADIENT_START, STROKE_COLOR, STROKE_WIDTH,
};
use crate::params::{Category, ParameterDefinition, ParameterSchema, ResolvedParams};
use crate::surface::{GradientStop, LineCap, Paint, RenderContext};

const TEXTURE_DOTS: usize = 20;

#[derive(Debug, Clone)]
pub struct CleanTriangle {
    schema: ParameterSchema,
}

impl Default for CleanTriangle {
    fn default() -> Self {
        Self::new()
    }
}

impl CleanTriangle {
    pub fn new() -> Self {
        use Category::{Color as Colors, Effects, Fill, Geometry, Stroke};

        let schema = ParameterSchema::new()
            .with("seed", seed_definition("clean-triangle-brand"))
            .with(
                "triangleType",
                ParameterDefinition::slider(
                    "Triangle Type (0=Equilateral, 1=Isosceles, 2=Scalene, 3=Right, 4=Acute)",
                    0.0,
                    0.0,
                    4.0,
                    1.0,
                )
                .in_category(Geometry),
            )
            .with("heightRatio", ParameterDefinition::slider("Height Ratio", 1.0, 0.6, 1.8, 0.05).in_category(Geometry))
            .with("baseWidth", ParameterDefinition::slider("Base Width", 1.0, 0.7, 1.5, 0.05).in_category(Geometry))
            .with("apexOffset", ParameterDefinition::slider("Apex Offset", 0.0, -0.3, 0.3, 0.05).in_category(Geometry))
            .with(
                "goldenRatio",
                ParameterDefinition::slider("Golden Ratio Influence", 0.2, 0.0, 1.0, 0.05).in_category(Geometry),
            )
            .with("cornerRadius", ParameterDefinition::slider("Corner Softness", 0.0, 0.0, 20.0, 1.0).in_category(Geometry))
            .with(
                "symmetryPerfection",
                ParameterDefinition::slider("Geometric Precision", 1.0, 0.8, 1.0, 0.01).in_category(Geometry),
            )
            .with(
                "fillStyle",
                ParameterDefinition::slider("Fill Style (0=None, 1=Solid, 2=Gradient, 3=Minimal Texture)", 1.0, 0.0, 3.0, 1.0)
                    .in_category(Fill),
            )
            .with("brandHue", ParameterDefinition::slider("Brand Hue", 210.0, 0.0, 360.0, 10.0).in_category(Colors))
            .with(
                "brandSaturation",
                ParameterDefinition::slider("Brand Saturation", 0.8, 0.2, 1.0, 0.05).in_category(Colors),
            )
            .with(
                "brandLightness",
                ParameterDefinition::slider("Brand Lightness", 0.5, 0.3, 0.7, 0.05).in_category(Colors),
            )
            .with("depth", ParameterDefinition::slider("Subtle Depth", 0.1, 0.0, 0.5, 0.05).in_category(Effects))
            .with("highlight", ParameterDefinition::slider("Brand Highlight", 0.15, 0.0, 0.4, 0.05).in_category(Effects))
            .with(FILL_COLOR, ParameterDefinition::color("Fill Color", "auto").in_category(Fill))
            .with(FILL_GRADIENT_START, ParameterDefinition::color("Gradient Start", "auto").in_category(Fill))
            .with(FILL_GRADIENT_END, ParameterDefinition::color("Gradient End", "auto").in_category(Fill))
            .with(
                FILL_GRADIENT_DIRECTION,
                ParameterDefinition::slider("Gradient Direction", 90.0, 0.0, 360.0, 15.0).in_category(Fill),
            )
            .with(STROKE_COLOR, ParameterDefinition::color("Stroke Color", "auto").in_category(Stroke))
            .with(STROKE_WIDTH, ParameterDefinition::slider("Stroke Weight", 0.0, 0.0, 8.0, 0.5).in_category(Stroke));

        Self { schema }
    }
}

/// Brand palette plus the darker depth tone used for the drop shadow.
fn brand_colors(hue: f64, saturation: f64, lightness: f64) -> (ColorPalette, Color) {
    let s = saturation * 100.0;
    let l = lightness * 100.0;
    let palette = ColorPalette {
        primary: Color::from_hsl(hue, s, l),
        secondary: Color::from_hsl(hue, s * 0.7, l + 15.0),
        accent: Color::from_hsl(hue + 15.0, s * 0.9, l - 10.0),
        highlight: Color::from_hsl(hue, s * 0.5, (l + 30.0).min(90.0)),
    };
    (palette, Color::from_hsl(hue, s * 1.2, (l - 20.0).max(10.0)))
}

impl Preset for CleanTriangle {
    fn id(&self) -> &str {
        "clean-triangle"
    }

    fn name(&self) -> &str {
        "Clean Triangle"
    }

    fn description(&self) -> &str {
        "Precise geometric triangles with mathematical proportions, suited to tech and modern brands"
    }

    fn parameters(&self) -> &ParameterSchema {
        &self.schema
    }

    fn draw(&self, ctx: &mut dyn RenderContext, width: f64, height: f64, params: &ResolvedParams, time: f64) {
        let mut frame = Frame::begin(ctx, width, height, params, time);

        let golden = params.number("goldenRatio") * (PHI - 1.0);
        let triangle = Triangle {
            kind: TriangleKind::from_index(params.number("triangleType")),
            width: 0.6 * params.number("baseWidth") * (1.0 + golden * 0.3),
            height: 0.6 * params.number("heightRatio") * (1.0 + golden * 0.2),
            apex_offset: params.number("apexOffset"),
            precision: params.number("symmetryPerfection"),
        };
        let path = triangle.generate(frame.center, frame.size, time);
        let outline = rounded_corners(&path, params.number("cornerRadius"));
        let bounds = path.bounds();

        let (palette, depth_color) = brand_colors(
            params.number("brandHue"),
            params.number("brandSaturation"),
            params.number("brandLightness"),
        );
        let style = UniversalStyle::from_params(params, &palette);
        let fill_style = params.int("fillStyle");
        let mut fill = style.fill;
        match fill_style {
            0 => fill.kind = FillKind::None,
            2 if fill.kind == FillKind::Solid => fill.kind = FillKind::Gradient,
            _ => {}
        }

        // Texture positions are drawn up front so the sequence is fixed.
        let logo = frame.size * 0.6;
        let dots: Vec<Point> = (0..TEXTURE_DOTS)
            .map(|_| {
                let x = frame.center.x + frame.rng.signed() * logo * 0.8;
                let y = frame.center.y + frame.rng.signed() * logo * 0.8;
                Point::new(x, y)
            })
            .filter(|p| path.contains(*p))
            .collect();

        let depth = params.number("depth");
        let highlight = params.number("highlight");
        let outline = &outline;
        let mut passes = Compositor::new();

        if frame.size > 100.0 {
            passes.add_if(Pass::Shadow, depth, 0.05, move |ctx| {
                let alpha = ctx.global_alpha() * depth * 0.4;
                ctx.set_global_alpha(alpha);
                ctx.translate(depth * 8.0, depth * 8.0);
                ctx.set_fill(Paint::Solid(depth_color));
                ctx.begin_path();
                trace(ctx, outline);
                ctx.fill();
            });
        }

        if !fill.is_none() {
            passes.add(Pass::Fill, move |ctx| {
                ctx.begin_path();
                trace(ctx, outline);
                paint_fill(ctx, &bounds, &fill);
            });
        }

        if fill_style == 3 && !fill.is_none() {
            passes.add(Pass::Texture, move |ctx| {
                let alpha = ctx.global_alpha() * 0.1;
                ctx.set_global_alpha(alpha);
                ctx.set_fill(Paint::Solid(palette.accent));
                for dot in &dots {
                    ctx.begin_path();
                    ctx.arc(dot.x, dot.y, 0.5, 0.0, TAU);
                    ctx.fill();
                }
            });
        }

        if !style.stroke.is_none() {
            passes.add(Pass::Stroke, move |ctx| {
                ctx.begin_path();
                trace(ctx, outline);
                paint_stroke(ctx, &bounds, &style.stroke);
            });
        }

        if frame.size > 64.0 && path.len() == 3 {
            let apex = path.points[0].position();
            let base = path.points[1].position().lerp(path.points[2].position(), 0.5);
            passes.add_if(Pass::Highlight, highlight, 0.05, move |ctx| {
                let alpha = ctx.global_alpha() * highlight;
                ctx.set_global_alpha(alpha);
                ctx.set_stroke(Paint::Linear {
                    start: apex,
                    end: base,
                    stops: vec![
                        GradientStop::new(0.0, palette.highlight),
                        GradientStop::new(1.0, Color::TRANSPARENT),
                    ],
                });
                ctx.set_line_width(2.0);
                ctx.set_line_cap(LineCap::Round);
                ctx.begin_path();
                ctx.move_to(apex.x, apex.y);
                ctx.line_to(base.x, base.y);
                ctx.stroke();
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

    fn render(overrides: &[(&str, ParamValue)]) -> RecordingContext {
        let preset = CleanTriangle::new();
        let overrides: ParamMap = overrides.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        let params = preset.resolve(&overrides);
        let mut ctx = RecordingContext::new();
        preset.draw(&mut ctx, 256.0, 256.0, &params, 0.0);
        ctx
    }

    #[test]
    fn default_passes() {
        let ctx = render(&[]);
        let alphas = ctx.paint_alphas();
        // background, shadow, fill, highlight
        assert_eq!(alphas.len(), 4);
        assert_eq!(alphas[0], 1.0);
        assert!((alphas[1] - 0.04).abs() < 1e-9);
        assert_eq!(alphas[2], 1.0);
        assert!((alphas[3] - 0.15).abs() < 1e-9);
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn schema_defaults_match_brand() {
        let params = CleanTriangle::new().resolve(&ParamMap::new());
        assert_eq!(params.number("heightRatio"), 1.0);
        assert_eq!(params.number("brandHue"), 210.0);
        assert_eq!(params.text("seed"), "clean-triangle-brand");
        assert_eq!(params.text(FILL_COLOR), "auto");
        assert_eq!(params.number(STROKE_WIDTH), 0.0);
    }

    #[test]
    fn fill_uses_brand_primary() {
        let ctx = render(&[]);
        let (palette, _) = brand_colors(210.0, 0.8, 0.5);
        assert!(ctx.calls().contains(&DrawCall::SetFill(Paint::Solid(palette.primary))));
    }

    #[test]
    fn small_effects_are_skipped() {
        let ctx = render(&[("depth", 0.0.into()), ("highlight", 0.0.into())]);
        assert_eq!(ctx.paint_count(), 2);
    }

    #[test]
    fn fill_can_be_disabled_either_way() {
        for overrides in [
            vec![("fillStyle", ParamValue::from(0.0))],
            vec![("fillType", ParamValue::from("none"))],
        ] {
            let ctx = render(&overrides);
            // background, shadow, highlight
            assert_eq!(ctx.paint_count(), 3);
        }
    }

    #[test]
    fn gradient_style_uses_secondary_to_primary() {
        let ctx = render(&[("fillStyle", 2.0.into())]);
        let gradient = ctx.calls().iter().find_map(|c| match c {
            DrawCall::SetFill(Paint::Linear { stops, .. }) => Some(stops.clone()),
            _ => None,
        });
        let (palette, _) = brand_colors(210.0, 0.8, 0.5);
        let stops = gradient.expect("gradient fill");
        assert_eq!(stops[0].color, palette.secondary);
        assert_eq!(stops[1].color, palette.primary);
    }

    #[test]
    fn stroke_follows_universal_width() {
        let ctx = render(&[(STROKE_WIDTH, 3.0.into())]);
        assert!(ctx.calls().contains(&DrawCall::SetLineWidth(3.0)));
        assert!(ctx.calls().contains(&DrawCall::Stroke));
    }

    #[test]
    fn corner_radius_rounds_outline() {
        let ctx = render(&[("cornerRadius", 10.0.into())]);
        assert!(ctx.calls().iter().any(|c| matches!(c, DrawCall::QuadTo(..))));
    }

    #[test]
    fn texture_dots_land_inside() {
        let ctx = render(&[("fillStyle", 3.0.into())]);
        assert!(ctx.count(|c| matches!(c, DrawCall::Arc { .. })) <= TEXTURE_DOTS);
        assert_eq!(ctx.depth(), 0);
    }
}
