//! Universal background, fill, and stroke controls.
//!
//! Every preset shares one reserved parameter vocabulary for its outer
//! styling. The names are declared once in [`universal_schema`]; presets merge
//! their own definitions over it and hand the resolved values to
//! [`paint_background`], [`paint_fill`], and [`paint_stroke`].
//!
//! A style whose type is `none` makes no surface calls at all, so it cannot
//! disturb alpha, clip, or path state.

use std::sync::LazyLock;

use tracing::debug;

use crate::color::{Color, ColorPalette};
use crate::geometry::Bounds;
use crate::params::{Category, ParameterDefinition, ParameterSchema, ResolvedParams, VisibleWhen};
use crate::surface::{LineCap, LineJoin, Paint, RenderContext, Scoped};

// ============================================================================
// Reserved Names
// ============================================================================

pub const BACKGROUND_TYPE: &str = "backgroundType";
pub const BACKGROUND_COLOR: &str = "backgroundColor";
pub const BACKGROUND_OPACITY: &str = "backgroundOpacity";
pub const BACKGROUND_GRADIENT_START: &str = "backgroundGradientStart";
pub const BACKGROUND_GRADIENT_END: &str = "backgroundGradientEnd";
pub const BACKGROUND_GRADIENT_DIRECTION: &str = "backgroundGradientDirection";

pub const FILL_TYPE: &str = "fillType";
pub const FILL_COLOR: &str = "fillColor";
pub const FILL_OPACITY: &str = "fillOpacity";
pub const FILL_GRADIENT_START: &str = "fillGradientStart";
pub const FILL_GRADIENT_END: &str = "fillGradientEnd";
pub const FILL_GRADIENT_DIRECTION: &str = "fillGradientDirection";

pub const STROKE_TYPE: &str = "strokeType";
pub const STROKE_COLOR: &str = "strokeColor";
pub const STROKE_WIDTH: &str = "strokeWidth";
pub const STROKE_OPACITY: &str = "strokeOpacity";
pub const STROKE_GRADIENT_START: &str = "strokeGradientStart";
pub const STROKE_GRADIENT_END: &str = "strokeGradientEnd";

/// Color value that asks for a palette-derived color.
pub const AUTO: &str = "auto";

/// Every reserved universal name.
pub const RESERVED: [&str; 18] = [
    BACKGROUND_TYPE,
    BACKGROUND_COLOR,
    BACKGROUND_OPACITY,
    BACKGROUND_GRADIENT_START,
    BACKGROUND_GRADIENT_END,
    BACKGROUND_GRADIENT_DIRECTION,
    FILL_TYPE,
    FILL_COLOR,
    FILL_OPACITY,
    FILL_GRADIENT_START,
    FILL_GRADIENT_END,
    FILL_GRADIENT_DIRECTION,
    STROKE_TYPE,
    STROKE_COLOR,
    STROKE_WIDTH,
    STROKE_OPACITY,
    STROKE_GRADIENT_START,
    STROKE_GRADIENT_END,
];

pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

static UNIVERSAL: LazyLock<ParameterSchema> = LazyLock::new(build_universal_schema);

/// Definitions and defaults of the universal controls.
pub fn universal_schema() -> &'static ParameterSchema {
    &UNIVERSAL
}

fn build_universal_schema() -> ParameterSchema {
    use Category::{Background, Fill, Stroke};

    let bg_gradient = || VisibleWhen::equals(BACKGROUND_TYPE, "gradient");
    let fill_gradient = || VisibleWhen::equals(FILL_TYPE, "gradient");
    let stroke_gradient = || VisibleWhen::equals(STROKE_TYPE, "gradient");

    ParameterSchema::new()
        .with(
            BACKGROUND_TYPE,
            ParameterDefinition::select(
                "Background Type",
                "solid",
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
            BACKGROUND_COLOR,
            ParameterDefinition::color("Background Color", "#ffffff")
                .in_category(Background)
                .visible_when(VisibleWhen::equals(BACKGROUND_TYPE, "solid")),
        )
        .with(
            BACKGROUND_OPACITY,
            ParameterDefinition::slider("Background Opacity", 1.0, 0.0, 1.0, 0.05)
                .in_category(Background)
                .visible_when(VisibleWhen::one_of(BACKGROUND_TYPE, ["solid", "gradient"])),
        )
        .with(
            BACKGROUND_GRADIENT_START,
            ParameterDefinition::color("Gradient Start", "#ffffff")
                .in_category(Background)
                .visible_when(bg_gradient()),
        )
        .with(
            BACKGROUND_GRADIENT_END,
            ParameterDefinition::color("Gradient End", "#f8f9fa")
                .in_category(Background)
                .visible_when(bg_gradient()),
        )
        .with(
            BACKGROUND_GRADIENT_DIRECTION,
            ParameterDefinition::slider("Gradient Direction", 0.0, 0.0, 360.0, 15.0)
                .in_category(Background)
                .visible_when(bg_gradient()),
        )
        .with(
            FILL_TYPE,
            ParameterDefinition::select(
                "Fill Type",
                "solid",
                &[("none", "None"), ("solid", "Solid Color"), ("gradient", "Gradient")],
            )
            .in_category(Fill),
        )
        .with(
            FILL_COLOR,
            ParameterDefinition::color("Fill Color", "#3b82f6")
                .in_category(Fill)
                .visible_when(VisibleWhen::equals(FILL_TYPE, "solid")),
        )
        .with(
            FILL_OPACITY,
            ParameterDefinition::slider("Fill Opacity", 1.0, 0.0, 1.0, 0.05)
                .in_category(Fill)
                .visible_when(VisibleWhen::not_equals(FILL_TYPE, "none")),
        )
        .with(
            FILL_GRADIENT_START,
            ParameterDefinition::color("Gradient Start", "#3b82f6")
                .in_category(Fill)
                .visible_when(fill_gradient()),
        )
        .with(
            FILL_GRADIENT_END,
            ParameterDefinition::color("Gradient End", "#1d4ed8")
                .in_category(Fill)
                .visible_when(fill_gradient()),
        )
        .with(
            FILL_GRADIENT_DIRECTION,
            ParameterDefinition::slider("Gradient Direction", 45.0, 0.0, 360.0, 15.0)
                .in_category(Fill)
                .visible_when(fill_gradient()),
        )
        .with(
            STROKE_TYPE,
            ParameterDefinition::select(
                "Stroke Type",
                "solid",
                &[
                    ("none", "None"),
                    ("solid", "Solid"),
                    ("dashed", "Dashed"),
                    ("dotted", "Dotted"),
                    ("gradient", "Gradient"),
                ],
            )
            .in_category(Stroke),
        )
        .with(
            STROKE_COLOR,
            ParameterDefinition::color("Stroke Color", "#1e40af")
                .in_category(Stroke)
                .visible_when(VisibleWhen::one_of(STROKE_TYPE, ["solid", "dashed", "dotted"])),
        )
        .with(
            STROKE_WIDTH,
            ParameterDefinition::slider("Stroke Width", 2.0, 0.0, 10.0, 0.5)
                .in_category(Stroke)
                .visible_when(VisibleWhen::not_equals(STROKE_TYPE, "none")),
        )
        .with(
            STROKE_OPACITY,
            ParameterDefinition::slider("Stroke Opacity", 1.0, 0.0, 1.0, 0.05)
                .in_category(Stroke)
                .visible_when(VisibleWhen::not_equals(STROKE_TYPE, "none")),
        )
        .with(
            STROKE_GRADIENT_START,
            ParameterDefinition::color("Gradient Start", "#1e40af")
                .in_category(Stroke)
                .visible_when(stroke_gradient()),
        )
        .with(
            STROKE_GRADIENT_END,
            ParameterDefinition::color("Gradient End", "#3b82f6")
                .in_category(Stroke)
                .visible_when(stroke_gradient()),
        )
}

// ============================================================================
// Style Records
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundKind {
    /// Nothing is painted; `transparent` is an alias.
    None,
    #[default]
    Solid,
    Gradient,
}

impl BackgroundKind {
    pub fn parse(value: &str) -> Self {
        match value {
            "none" | "transparent" => Self::None,
            "solid" => Self::Solid,
            "gradient" => Self::Gradient,
            other => {
                debug!(value = other, "unknown background type, painting none");
                Self::None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillKind {
    None,
    #[default]
    Solid,
    Gradient,
}

impl FillKind {
    pub fn parse(value: &str) -> Self {
        match value {
            "none" => Self::None,
            "solid" => Self::Solid,
            "gradient" => Self::Gradient,
            other => {
                debug!(value = other, "unknown fill type, painting none");
                Self::None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeKind {
    None,
    #[default]
    Solid,
    Dashed,
    Dotted,
    Gradient,
}

impl StrokeKind {
    pub fn parse(value: &str) -> Self {
        match value {
            "none" => Self::None,
            "solid" => Self::Solid,
            "dashed" => Self::Dashed,
            "dotted" => Self::Dotted,
            "gradient" => Self::Gradient,
            other => {
                debug!(value = other, "unknown stroke type, painting none");
                Self::None
            }
        }
    }

    /// Dash intervals for a line of `width`.
    pub fn dash_pattern(&self, width: f64) -> Vec<f64> {
        match self {
            StrokeKind::Dashed => vec![width * 3.0, width * 2.0],
            StrokeKind::Dotted => vec![width, width],
            _ => Vec::new(),
        }
    }
}

/// Linear gradient description: two colors along an axis at `direction`
/// degrees through the center of the painted bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearSpec {
    pub start: Color,
    pub end: Color,
    pub direction: f64,
}

impl LinearSpec {
    fn paint(&self, bounds: &Bounds) -> Paint {
        let (from, to) = bounds.gradient_axis(self.direction);
        Paint::linear(from, to, self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundStyle {
    pub kind: BackgroundKind,
    pub color: Color,
    pub gradient: LinearSpec,
    pub opacity: f64,
}

impl BackgroundStyle {
    pub fn from_params(params: &ResolvedParams) -> Self {
        Self {
            kind: BackgroundKind::parse(params.text(BACKGROUND_TYPE)),
            color: params.color(BACKGROUND_COLOR),
            gradient: LinearSpec {
                start: params.color(BACKGROUND_GRADIENT_START),
                end: params.color(BACKGROUND_GRADIENT_END),
                direction: params.number(BACKGROUND_GRADIENT_DIRECTION),
            },
            opacity: params.number_or(BACKGROUND_OPACITY, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillStyle {
    pub kind: FillKind,
    pub color: Color,
    pub gradient: LinearSpec,
    pub opacity: f64,
}

impl FillStyle {
    /// Reads the fill controls. `auto` colors come from `palette`: the
    /// primary for solid fills, secondary to primary for gradients.
    pub fn from_params(params: &ResolvedParams, palette: &ColorPalette) -> Self {
        Self {
            kind: FillKind::parse(params.text(FILL_TYPE)),
            color: color_or_auto(params, FILL_COLOR, palette.primary),
            gradient: LinearSpec {
                start: color_or_auto(params, FILL_GRADIENT_START, palette.secondary),
                end: color_or_auto(params, FILL_GRADIENT_END, palette.primary),
                direction: params.number(FILL_GRADIENT_DIRECTION),
            },
            opacity: params.number_or(FILL_OPACITY, 1.0),
        }
    }

    pub fn is_none(&self) -> bool {
        self.kind == FillKind::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub kind: StrokeKind,
    pub color: Color,
    pub gradient: LinearSpec,
    pub width: f64,
    pub opacity: f64,
}

impl StrokeStyle {
    /// Reads the stroke controls. `auto` colors come from `palette`: the
    /// accent for plain strokes, secondary to primary for gradients.
    pub fn from_params(params: &ResolvedParams, palette: &ColorPalette) -> Self {
        Self {
            kind: StrokeKind::parse(params.text(STROKE_TYPE)),
            color: color_or_auto(params, STROKE_COLOR, palette.accent),
            gradient: LinearSpec {
                start: color_or_auto(params, STROKE_GRADIENT_START, palette.secondary),
                end: color_or_auto(params, STROKE_GRADIENT_END, palette.primary),
                direction: 0.0,
            },
            width: params.number_or(STROKE_WIDTH, 2.0),
            opacity: params.number_or(STROKE_OPACITY, 1.0),
        }
    }

    /// True when painting would leave no mark.
    pub fn is_none(&self) -> bool {
        self.kind == StrokeKind::None || !(self.width > 0.0)
    }
}

/// All three universal style records for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniversalStyle {
    pub background: BackgroundStyle,
    pub fill: FillStyle,
    pub stroke: StrokeStyle,
}

impl UniversalStyle {
    pub fn from_params(params: &ResolvedParams, palette: &ColorPalette) -> Self {
        Self {
            background: BackgroundStyle::from_params(params),
            fill: FillStyle::from_params(params, palette),
            stroke: StrokeStyle::from_params(params, palette),
        }
    }
}

fn color_or_auto(params: &ResolvedParams, key: &str, auto: Color) -> Color {
    match params.text(key).trim() {
        value if value.eq_ignore_ascii_case(AUTO) => auto,
        value => Color::parse_or_neutral(value),
    }
}

fn opacity(value: f64) -> f64 {
    if value.is_finite() { value.clamp(0.0, 1.0) } else { 1.0 }
}

// ============================================================================
// Painting
// ============================================================================

/// Paints the background over `bounds`, usually the whole canvas.
pub fn paint_background(ctx: &mut dyn RenderContext, bounds: &Bounds, style: &BackgroundStyle) {
    let paint = match style.kind {
        BackgroundKind::None => return,
        BackgroundKind::Solid => Paint::Solid(style.color),
        BackgroundKind::Gradient => style.gradient.paint(bounds),
    };
    let mut ctx = Scoped::new(ctx);
    let alpha = ctx.global_alpha() * opacity(style.opacity);
    ctx.set_global_alpha(alpha);
    ctx.set_fill(paint);
    ctx.fill_rect(bounds.min_x, bounds.min_y, bounds.width(), bounds.height());
}

/// Fills the context's current path. `bounds` anchors gradients and is
/// normally the bounding box of the path.
pub fn paint_fill(ctx: &mut dyn RenderContext, bounds: &Bounds, style: &FillStyle) {
    let paint = match style.kind {
        FillKind::None => return,
        FillKind::Solid => Paint::Solid(style.color),
        FillKind::Gradient => style.gradient.paint(bounds),
    };
    let mut ctx = Scoped::new(ctx);
    let alpha = ctx.global_alpha() * opacity(style.opacity);
    ctx.set_global_alpha(alpha);
    ctx.set_fill(paint);
    ctx.fill();
}

/// Strokes the context's current path.
pub fn paint_stroke(ctx: &mut dyn RenderContext, bounds: &Bounds, style: &StrokeStyle) {
    if style.is_none() {
        return;
    }
    let paint = match style.kind {
        StrokeKind::Gradient => style.gradient.paint(bounds),
        _ => Paint::Solid(style.color),
    };
    let mut ctx = Scoped::new(ctx);
    let alpha = ctx.global_alpha() * opacity(style.opacity);
    ctx.set_global_alpha(alpha);
    ctx.set_stroke(paint);
    ctx.set_line_width(style.width);
    ctx.set_line_dash(&style.kind.dash_pattern(style.width));
    ctx.set_line_join(LineJoin::Round);
    ctx.set_line_cap(if style.kind == StrokeKind::Dotted {
        LineCap::Round
    } else {
        LineCap::Butt
    });
    ctx.stroke();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{resolve, ParamMap, ParamValue};
    use crate::surface::{DrawCall, RecordingContext};

    fn params(pairs: &[(&str, ParamValue)]) -> ResolvedParams {
        let overrides: ParamMap = pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        resolve(&ParameterSchema::new(), &overrides, universal_schema())
    }

    fn canvas() -> Bounds {
        Bounds::from_size(100.0, 100.0)
    }

    #[test]
    fn universal_defaults() {
        let resolved = params(&[]);
        assert_eq!(resolved.text(BACKGROUND_TYPE), "solid");
        assert_eq!(resolved.text(BACKGROUND_COLOR), "#ffffff");
        assert_eq!(resolved.text(FILL_COLOR), "#3b82f6");
        assert_eq!(resolved.text(STROKE_COLOR), "#1e40af");
        assert_eq!(resolved.number(STROKE_WIDTH), 2.0);
        assert_eq!(resolved.number(FILL_GRADIENT_DIRECTION), 45.0);
        assert!(universal_schema().validate().is_ok());
        assert!(universal_schema().keys().all(is_reserved));
        assert_eq!(universal_schema().len(), RESERVED.len());
    }

    #[test]
    fn none_styles_make_no_calls() {
        let resolved = params(&[
            (BACKGROUND_TYPE, "none".into()),
            (FILL_TYPE, "none".into()),
            (STROKE_TYPE, "none".into()),
        ]);
        let style = UniversalStyle::from_params(&resolved, &ColorPalette::default());

        let mut ctx = RecordingContext::new();
        ctx.set_global_alpha(0.4);
        let before = ctx.len();
        paint_background(&mut ctx, &canvas(), &style.background);
        paint_fill(&mut ctx, &canvas(), &style.fill);
        paint_stroke(&mut ctx, &canvas(), &style.stroke);
        assert_eq!(ctx.len(), before);
        assert_eq!(ctx.global_alpha(), 0.4);
    }

    #[test]
    fn transparent_background_is_none() {
        let style = BackgroundStyle::from_params(&params(&[(BACKGROUND_TYPE, "transparent".into())]));
        assert_eq!(style.kind, BackgroundKind::None);
    }

    #[test]
    fn solid_background_fills_canvas() {
        let style = BackgroundStyle::from_params(&params(&[(BACKGROUND_OPACITY, 0.5.into())]));
        let mut ctx = RecordingContext::new();
        paint_background(&mut ctx, &canvas(), &style);
        assert!(ctx.calls().contains(&DrawCall::FillRect(0.0, 0.0, 100.0, 100.0)));
        assert_eq!(ctx.paint_alphas(), &[0.5]);
        assert_eq!(ctx.depth(), 0);
        assert_eq!(ctx.global_alpha(), 1.0);
    }

    #[test]
    fn gradient_fill_spans_bounds_diagonal() {
        let style = FillStyle::from_params(
            &params(&[(FILL_TYPE, "gradient".into()), (FILL_GRADIENT_DIRECTION, 0.0.into())]),
            &ColorPalette::default(),
        );
        let mut ctx = RecordingContext::new();
        paint_fill(&mut ctx, &canvas(), &style);
        let paint = ctx.calls().iter().find_map(|c| match c {
            DrawCall::SetFill(p) => Some(p.clone()),
            _ => None,
        });
        match paint {
            Some(Paint::Linear { start, end, .. }) => {
                let half = canvas().diagonal() / 2.0;
                assert!((start.x - (50.0 - half)).abs() < 1e-9);
                assert!((end.x - (50.0 + half)).abs() < 1e-9);
            }
            other => panic!("expected a linear gradient, got {other:?}"),
        }
    }

    #[test]
    fn fill_opacity_multiplies_existing_alpha() {
        let style = FillStyle::from_params(&params(&[(FILL_OPACITY, 0.5.into())]), &ColorPalette::default());
        let mut ctx = RecordingContext::new();
        ctx.set_global_alpha(0.5);
        paint_fill(&mut ctx, &canvas(), &style);
        assert_eq!(ctx.paint_alphas(), &[0.25]);
        assert_eq!(ctx.global_alpha(), 0.5);
    }

    #[test]
    fn stroke_dash_patterns() {
        for (kind, expected) in [
            ("dashed", vec![12.0, 8.0]),
            ("dotted", vec![4.0, 4.0]),
            ("solid", vec![]),
        ] {
            let style = StrokeStyle::from_params(
                &params(&[(STROKE_TYPE, kind.into()), (STROKE_WIDTH, 4.0.into())]),
                &ColorPalette::default(),
            );
            let mut ctx = RecordingContext::new();
            paint_stroke(&mut ctx, &canvas(), &style);
            assert!(ctx.calls().contains(&DrawCall::SetLineDash(expected)), "{kind}");
            assert_eq!(ctx.count(|c| *c == DrawCall::Stroke), 1);
        }
    }

    #[test]
    fn zero_width_stroke_is_skipped() {
        let style = StrokeStyle::from_params(&params(&[(STROKE_WIDTH, 0.0.into())]), &ColorPalette::default());
        let mut ctx = RecordingContext::new();
        paint_stroke(&mut ctx, &canvas(), &style);
        assert!(ctx.is_empty());
    }

    #[test]
    fn auto_colors_follow_palette() {
        let palette = ColorPalette::default();
        let resolved = params(&[
            (FILL_COLOR, "auto".into()),
            (STROKE_COLOR, "AUTO".into()),
            (FILL_GRADIENT_START, "auto".into()),
        ]);
        let style = UniversalStyle::from_params(&resolved, &palette);
        assert_eq!(style.fill.color, palette.primary);
        assert_eq!(style.stroke.color, palette.accent);
        assert_eq!(style.fill.gradient.start, palette.secondary);
        assert_eq!(style.fill.gradient.end, Color::parse_or_neutral("#1d4ed8"));
    }

    #[test]
    fn bad_colors_degrade_to_neutral() {
        let style = FillStyle::from_params(&params(&[(FILL_COLOR, "not-a-color".into())]), &ColorPalette::default());
        assert_eq!(style.color, Color::NEUTRAL);
    }
}
