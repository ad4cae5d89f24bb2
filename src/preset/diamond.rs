//! Dynamic diamond: gem cuts with material palettes and brilliance effects.

use std::f64::consts::TAU;

use super::{seed_definition, Frame, Preset};
use crate::color::{derive_palette, Color, ColorPalette, HarmonyMode, Material, PaletteBase};
use crate::compositing::{Compositor, Pass};
use crate::geometry::crystalline::{facet_lines, Diamond, DiamondCut};
use crate::geometry::{offset_path, trace_polyline, Point, ShapeGenerator};
use crate::overlay::{
    paint_fill, paint_stroke, UniversalStyle, BACKGROUND_GRADIENT_DIRECTION, BACKGROUND_GRADIENT_END,
    BACKGROUND_GRADIENT_START, BACKGROUND_TYPE, FILL_COLOR, STROKE_COLOR,
};
use crate::params::{Category, ParameterDefinition, ParameterSchema, ResolvedParams, VisibleWhen};
use crate::surface::{GradientStop, Paint, RenderContext};

/// Prism offsets as `(hue, offset)`: red through violet.
const DISPERSION: [(f64, f64); 5] = [(0.0, 0.1), (60.0, 0.05), (120.0, 0.0), (240.0, -0.05), (300.0, -0.1)];
const SPARKLE_RADIUS: f64 = 4.0;

#[derive(Debug, Clone)]
pub struct DynamicDiamond {
    schema: ParameterSchema,
}

impl Default for DynamicDiamond {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicDiamond {
    pub fn new() -> Self {
        use Category::{Background, Color as Colors, Effects, Fill, Geometry, Stroke};

        let slider = ParameterDefinition::slider;
        let schema = ParameterSchema::new()
            .with("seed", seed_definition("dynamic-diamond-luxury"))
            .with(
                "diamondStyle",
                slider(
                    "Diamond Style (0=Classic, 1=Elongated, 2=Brilliant, 3=Marquise, 4=Emerald)",
                    0.0,
                    0.0,
                    4.0,
                    1.0,
                )
                .in_category(Geometry),
            )
            .with("carat", slider("Carat (Size Multiplier)", 1.0, 0.5, 2.0, 0.1).in_category(Geometry))
            .with("tableRatio", slider("Table Ratio", 0.65, 0.5, 0.8, 0.02).in_category(Geometry))
            .with("depthRatio", slider("Depth Ratio", 0.8, 0.6, 1.2, 0.05).in_category(Geometry))
            .with("cutPrecision", slider("Cut Precision", 0.95, 0.7, 1.0, 0.01).in_category(Geometry))
            .with("symmetryGrade", slider("Symmetry Grade", 0.92, 0.8, 1.0, 0.01).in_category(Geometry))
            .with("pavilionDepth", slider("Pavilion Depth", 0.6, 0.4, 0.8, 0.02).in_category(Geometry))
            .with("girdleThickness", slider("Girdle Thickness", 0.02, 0.01, 0.05, 0.005).in_category(Geometry))
            .with(
                "facetStyle",
                slider("Facets (0=None, 1=Minimal, 2=Classic, 3=Brilliant)", 1.0, 0.0, 3.0, 1.0).in_category(Stroke),
            )
            .with(
                "materialType",
                ParameterDefinition::select(
                    "Material",
                    "gold",
                    &[
                        ("crystal", "Crystal"),
                        ("platinum", "Platinum"),
                        ("gold", "Gold"),
                        ("carbon", "Carbon"),
                        ("prismatic", "Prismatic"),
                    ],
                )
                .in_category(Colors),
            )
            .with("brandHue", slider("Brand Hue", 45.0, 0.0, 360.0, 10.0).in_category(Colors))
            .with("luxury", slider("Luxury Factor", 0.85, 0.6, 1.0, 0.05).in_category(Colors))
            .with("exclusivity", slider("Exclusivity", 0.8, 0.5, 1.0, 0.05).in_category(Colors))
            .with("luxuryFinish", ParameterDefinition::toggle("Luxury Gradient Finish", true).in_category(Fill))
            .with("brilliance", slider("Brilliance", 0.7, 0.3, 1.0, 0.05).in_category(Effects))
            .with("fireDispersion", slider("Fire Dispersion", 0.2, 0.0, 0.4, 0.02).in_category(Effects))
            .with("scintillation", slider("Scintillation", 0.3, 0.0, 0.6, 0.05).in_category(Effects))
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
            .with(
                BACKGROUND_GRADIENT_START,
                ParameterDefinition::color("Gradient Start", "#fefefe")
                    .in_category(Background)
                    .visible_when(VisibleWhen::equals(BACKGROUND_TYPE, "gradient")),
            )
            .with(
                BACKGROUND_GRADIENT_END,
                ParameterDefinition::color("Gradient End", "#f0f0f0")
                    .in_category(Background)
                    .visible_when(VisibleWhen::equals(BACKGROUND_TYPE, "gradient")),
            )
            .with(
                BACKGROUND_GRADIENT_DIRECTION,
                slider("Gradient Direction", 135.0, 0.0, 360.0, 15.0)
                    .in_category(Background)
                    .visible_when(VisibleWhen::equals(BACKGROUND_TYPE, "gradient")),
            )
            .with(
                FILL_COLOR,
                ParameterDefinition::color("Fill Color", "auto")
                    .in_category(Fill)
                    .visible_when(VisibleWhen::equals("luxuryFinish", false)),
            )
            .with(STROKE_COLOR, ParameterDefinition::color("Stroke Color", "auto").in_category(Stroke));

        Self { schema }
    }
}

/// Material palette plus the dispersion color used for sparkles.
fn luxury_palette(params: &ResolvedParams) -> (ColorPalette, Color) {
    let material = Material::parse(params.text("materialType")).unwrap_or(Material::Crystal);
    let palette = derive_palette(
        PaletteBase::Hue(params.number("brandHue")),
        params.number("luxury"),
        params.number("exclusivity"),
        params.number("exclusivity"),
        HarmonyMode::MaterialLocked(material),
    );
    let fire = palette.primary.rotate_hue(40.0).lighten(20.0);
    (palette, fire)
}

impl Preset for DynamicDiamond {
    fn id(&self) -> &str {
        "dynamic-diamond"
    }

    fn name(&self) -> &str {
        "Dynamic Diamond"
    }

    fn description(&self) -> &str {
        "Luxury diamond cuts with proportional control and premium brilliance effects"
    }

    fn parameters(&self) -> &ParameterSchema {
        &self.schema
    }

    fn draw(&self, ctx: &mut dyn RenderContext, width: f64, height: f64, params: &ResolvedParams, time: f64) {
        let frame = Frame::begin(ctx, width, height, params, time);
        let center = frame.center;
        let logo = frame.size * 0.5 * params.number("carat");
        let time = if time.is_finite() { time } else { 0.0 };

        let gem = Diamond {
            cut: DiamondCut::from_index(params.number("diamondStyle")),
            width: params.number("tableRatio"),
            height: params.number("depthRatio"),
            precision: params.number("cutPrecision"),
            symmetry: params.number("symmetryGrade"),
            pavilion_depth: params.number("pavilionDepth"),
            girdle_thickness: params.number("girdleThickness"),
        };
        let path = gem.generate(center, logo, time);
        let bounds = path.bounds();

        let (palette, fire) = luxury_palette(params);
        let style = UniversalStyle::from_params(params, &palette);
        let brilliance = params.number("brilliance");

        let mut passes = Compositor::new();

        let dispersion = params.number("fireDispersion");
        if frame.size > 120.0 {
            let copies: Vec<_> = DISPERSION
                .iter()
                .map(|&(hue, offset)| {
                    let shifted = offset_path(&path, offset * logo * 0.1, offset * logo * 0.05);
                    (Color::from_hsl(hue, 100.0, 70.0), shifted)
                })
                .collect();
            passes.add_if(Pass::Glow, dispersion, 0.05, move |ctx| {
                let alpha = ctx.global_alpha() * dispersion * 0.3;
                ctx.set_global_alpha(alpha);
                for (color, shifted) in &copies {
                    ctx.set_fill(Paint::Solid(*color));
                    trace_polyline(ctx, shifted);
                    ctx.fill();
                }
            });
        }

        if !style.fill.is_none() {
            let path = &path;
            let finish = params.flag("luxuryFinish");
            let fill = style.fill;
            passes.add(Pass::Fill, move |ctx| {
                trace_polyline(ctx, path);
                if finish {
                    let alpha = ctx.global_alpha() * fill.opacity.clamp(0.0, 1.0);
                    ctx.set_global_alpha(alpha);
                    ctx.set_fill(Paint::radial(
                        Point::new(center.x - logo * 0.2, center.y - logo * 0.3),
                        0.0,
                        logo * 0.8,
                        vec![
                            GradientStop::new(0.0, palette.highlight),
                            GradientStop::new(0.3, palette.secondary),
                            GradientStop::new(0.7, palette.primary.lighten(10.0)),
                            GradientStop::new(1.0, palette.primary),
                        ],
                    ));
                    ctx.fill();
                } else {
                    paint_fill(ctx, &bounds, &fill);
                }
            });
        }

        let path = &path;
        let stroke = style.stroke;
        passes.add(Pass::Stroke, move |ctx| {
            trace_polyline(ctx, path);
            paint_stroke(ctx, &bounds, &stroke);
        });

        let level = params.int("facetStyle").clamp(0, 3) as u8;
        if level > 0 {
            let lines = facet_lines(path, center, level);
            let color = palette.secondary;
            passes.add(Pass::Stroke, move |ctx| {
                let alpha = ctx.global_alpha() * brilliance * 0.6;
                ctx.set_global_alpha(alpha);
                ctx.set_stroke(Paint::Solid(color));
                ctx.set_line_width(1.0);
                for (a, b) in &lines {
                    ctx.begin_path();
                    ctx.move_to(a.x, a.y);
                    ctx.line_to(b.x, b.y);
                    ctx.stroke();
                }
            });
        }

        let scintillation = params.number("scintillation");
        if scintillation > 0.1 {
            let sparkles = sparkles(center, logo, scintillation, time);
            passes.add(Pass::Highlight, move |ctx| {
                for (at, alpha) in &sparkles {
                    ctx.save();
                    let alpha = ctx.global_alpha() * alpha;
                    ctx.set_global_alpha(alpha);
                    ctx.set_fill(Paint::radial(
                        *at,
                        0.0,
                        SPARKLE_RADIUS,
                        vec![
                            GradientStop::new(0.0, palette.highlight),
                            GradientStop::new(0.5, fire),
                            GradientStop::new(1.0, Color::TRANSPARENT),
                        ],
                    ));
                    ctx.begin_path();
                    ctx.circle(at.x, at.y, SPARKLE_RADIUS);
                    ctx.fill();
                    ctx.restore();
                }
            });
        }

        let crown: Vec<Point> = path.points.iter().filter(|p| p.y < center.y).map(|p| p.position()).collect();
        if !crown.is_empty() {
            passes.add_if(Pass::Highlight, brilliance, 0.05, move |ctx| {
                let alpha = ctx.global_alpha() * brilliance * 0.5;
                ctx.set_global_alpha(alpha);
                ctx.set_fill(Paint::Linear {
                    start: Point::new(center.x - logo * 0.3, center.y - logo * 0.5),
                    end: Point::new(center.x + logo * 0.1, center.y - logo * 0.2),
                    stops: vec![
                        GradientStop::new(0.0, palette.highlight),
                        GradientStop::new(0.6, palette.secondary),
                        GradientStop::new(1.0, Color::TRANSPARENT),
                    ],
                });
                ctx.begin_path();
                ctx.move_to(crown[0].x, crown[0].y);
                for p in &crown[1..] {
                    ctx.line_to(p.x, p.y);
                }
                ctx.line_to(center.x, center.y);
                ctx.close_path();
                ctx.fill();
            });
        }

        passes.run(ctx);
    }
}

/// Sparkle positions and alphas at `time`. A sparkle shows only near the
/// crest of its own sine cycle.
fn sparkles(center: Point, size: f64, strength: f64, time: f64) -> Vec<(Point, f64)> {
    let count = (strength * 12.0).round().max(0.0) as usize;
    (0..count)
        .filter_map(|i| {
            let phase = time * 4.0 + i as f64 * 1.3;
            let intensity = phase.sin() * 0.5 + 0.5;
            if intensity <= 0.7 {
                return None;
            }
            let angle = i as f64 / count as f64 * TAU + time * 0.5;
            let distance = ((phase * 0.7).sin() * 0.5 + 0.5) * size * 0.3;
            Some((Point::polar(center, distance, angle), (intensity - 0.7) * strength))
        })
        .collect()
}
