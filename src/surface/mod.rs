//! Drawing surfaces.
//!
//! [`RenderContext`] is the immediate-mode capability set every preset draws
//! through. Three implementations ship with the crate:
//!
//! - [`PixmapContext`]: raster output on tiny-skia, exportable as
//!   [`image::RgbaImage`] or PNG.
//! - [`SvgContext`]: vector output as SVG markup.
//! - [`RecordingContext`]: records every call, for tests and diagnostics.

mod pixmap;
mod recording;
mod svg;

pub use pixmap::PixmapContext;
pub use recording::{DrawCall, RecordingContext};
pub use svg::SvgContext;

use std::f64::consts::{FRAC_PI_2, TAU};
use std::ops::{Deref, DerefMut};

use crate::color::Color;
use crate::geometry::{PathCommand, Point};

// ============================================================================
// Paint and Stroke Styles
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient in `[0, 1]`.
    pub offset: f64,
    pub color: Color,
}

impl GradientStop {
    pub fn new(offset: f64, color: Color) -> Self {
        Self { offset, color }
    }
}

/// Fill or stroke source, in user coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    Linear {
        start: Point,
        end: Point,
        stops: Vec<GradientStop>,
    },
    Radial {
        center: Point,
        inner_radius: f64,
        outer_radius: f64,
        stops: Vec<GradientStop>,
    },
}

impl Default for Paint {
    fn default() -> Self {
        Paint::Solid(Color::BLACK)
    }
}

impl Paint {
    /// Two-stop linear gradient.
    pub fn linear(start: Point, end: Point, from: Color, to: Color) -> Self {
        Paint::Linear {
            start,
            end,
            stops: vec![GradientStop::new(0.0, from), GradientStop::new(1.0, to)],
        }
    }

    /// Radial gradient from `inner_radius` to `outer_radius` around `center`.
    pub fn radial(center: Point, inner_radius: f64, outer_radius: f64, stops: Vec<GradientStop>) -> Self {
        Paint::Radial {
            center,
            inner_radius,
            outer_radius,
            stops,
        }
    }

    /// A representative solid color, used where gradients are unsupported.
    pub fn fallback_color(&self) -> Color {
        match self {
            Paint::Solid(color) => *color,
            Paint::Linear { stops, .. } | Paint::Radial { stops, .. } => {
                stops.first().map(|s| s.color).unwrap_or(Color::NEUTRAL)
            }
        }
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Solid(color)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

// ============================================================================
// RenderContext
// ============================================================================

/// An immediate-mode 2D drawing surface.
///
/// Semantics follow the familiar canvas model: a current path built with
/// `move_to`/`line_to`/…, state pushed and popped with `save`/`restore`, and
/// transforms that apply to subsequently added geometry.
pub trait RenderContext {
    fn save(&mut self);
    fn restore(&mut self);

    /// Sets the global alpha, clamped to `[0, 1]`.
    fn set_global_alpha(&mut self, alpha: f64);
    fn global_alpha(&self) -> f64;

    fn translate(&mut self, dx: f64, dy: f64);
    /// Rotates by `radians`, clockwise in screen space.
    fn rotate(&mut self, radians: f64);
    fn scale(&mut self, sx: f64, sy: f64);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn quad_to(&mut self, cx: f64, cy: f64, x: f64, y: f64);
    fn cubic_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64);
    /// Circular arc from `start` to `end` (radians), clockwise.
    fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64);
    fn close_path(&mut self);

    fn set_fill(&mut self, paint: Paint);
    fn set_stroke(&mut self, paint: Paint);
    fn set_line_width(&mut self, width: f64);
    /// Dash intervals in user units; an empty slice draws solid lines.
    fn set_line_dash(&mut self, pattern: &[f64]);
    fn set_line_cap(&mut self, cap: LineCap);
    fn set_line_join(&mut self, join: LineJoin);
    /// Blur radius applied to subsequent fills and strokes; zero disables.
    fn set_blur(&mut self, radius: f64);

    fn fill(&mut self);
    fn stroke(&mut self);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    /// Intersects the clip region with the current path.
    fn clip(&mut self);

    /// Adds a closed rectangle to the current path.
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.move_to(x, y);
        self.line_to(x + width, y);
        self.line_to(x + width, y + height);
        self.line_to(x, y + height);
        self.close_path();
    }

    /// Adds a full circle as its own subpath.
    fn circle(&mut self, cx: f64, cy: f64, radius: f64) {
        self.move_to(cx + radius.max(0.0), cy);
        self.arc(cx, cy, radius, 0.0, TAU);
        self.close_path();
    }
}

// ============================================================================
// Scoped
// ============================================================================

/// Saves the context on creation and restores it on drop.
///
/// Restoration runs on every exit path, including early returns and
/// unwinding, so a pass cannot leak alpha, transform, or clip state.
pub struct Scoped<'a> {
    ctx: &'a mut dyn RenderContext,
}

impl<'a> Scoped<'a> {
    pub fn new(ctx: &'a mut dyn RenderContext) -> Self {
        ctx.save();
        Self { ctx }
    }
}

impl<'a> Deref for Scoped<'a> {
    type Target = dyn RenderContext + 'a;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl<'a> DerefMut for Scoped<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl Drop for Scoped<'_> {
    fn drop(&mut self) {
        self.ctx.restore();
    }
}

// ============================================================================
// Shared State for Concrete Surfaces
// ============================================================================

/// 2D affine transform, `x' = a·x + c·y + e`, `y' = b·x + d·y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn apply(&self, p: Point) -> Point {
        Point::new(self.a * p.x + self.c * p.y + self.e, self.b * p.x + self.d * p.y + self.f)
    }

    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self {
            e: self.a * dx + self.c * dy + self.e,
            f: self.b * dx + self.d * dy + self.f,
            ..self
        }
    }

    pub fn rotated(self, radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            a: self.a * cos + self.c * sin,
            b: self.b * cos + self.d * sin,
            c: self.c * cos - self.a * sin,
            d: self.d * cos - self.b * sin,
            ..self
        }
    }

    pub fn scaled(self, sx: f64, sy: f64) -> Self {
        Self {
            a: self.a * sx,
            b: self.b * sx,
            c: self.c * sy,
            d: self.d * sy,
            ..self
        }
    }

    /// Geometric mean of the axis scales; used for line widths and radii.
    pub fn mean_scale(&self) -> f64 {
        (self.a * self.d - self.b * self.c).abs().sqrt()
    }

    /// Maps a paint's geometry into device space.
    pub fn apply_paint(&self, paint: &Paint) -> Paint {
        match paint {
            Paint::Solid(color) => Paint::Solid(*color),
            Paint::Linear { start, end, stops } => Paint::Linear {
                start: self.apply(*start),
                end: self.apply(*end),
                stops: stops.clone(),
            },
            Paint::Radial {
                center,
                inner_radius,
                outer_radius,
                stops,
            } => Paint::Radial {
                center: self.apply(*center),
                inner_radius: inner_radius * self.mean_scale(),
                outer_radius: outer_radius * self.mean_scale(),
                stops: stops.clone(),
            },
        }
    }
}

/// Graphics state shared by the concrete surfaces. `C` is the surface's clip
/// representation.
#[derive(Debug, Clone)]
pub(crate) struct DrawState<C> {
    pub transform: Affine,
    pub alpha: f64,
    pub fill: Paint,
    pub stroke: Paint,
    pub line_width: f64,
    pub dash: Vec<f64>,
    pub cap: LineCap,
    pub join: LineJoin,
    pub blur: f64,
    pub clip: Option<C>,
}

impl<C> Default for DrawState<C> {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            alpha: 1.0,
            fill: Paint::Solid(Color::BLACK),
            stroke: Paint::Solid(Color::BLACK),
            line_width: 1.0,
            dash: Vec::new(),
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            blur: 0.0,
            clip: None,
        }
    }
}

/// State stack plus the current path in device coordinates.
#[derive(Debug)]
pub(crate) struct Tracker<C> {
    pub state: DrawState<C>,
    stack: Vec<DrawState<C>>,
    pub path: Vec<PathCommand>,
    current: Option<Point>,
    subpath_start: Option<Point>,
}

impl<C> Default for Tracker<C> {
    fn default() -> Self {
        Self {
            state: DrawState::default(),
            stack: Vec::new(),
            path: Vec::new(),
            current: None,
            subpath_start: None,
        }
    }
}

impl<C: Clone> Tracker<C> {
    pub fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    pub fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    #[cfg(test)]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl<C> Tracker<C> {
    pub fn set_alpha(&mut self, alpha: f64) {
        self.state.alpha = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 1.0 };
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        if dx.is_finite() && dy.is_finite() {
            self.state.transform = self.state.transform.translated(dx, dy);
        }
    }

    pub fn rotate(&mut self, radians: f64) {
        if radians.is_finite() {
            self.state.transform = self.state.transform.rotated(radians);
        }
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        if sx.is_finite() && sy.is_finite() {
            self.state.transform = self.state.transform.scaled(sx, sy);
        }
    }

    pub fn begin_path(&mut self) {
        self.path.clear();
        self.current = None;
        self.subpath_start = None;
    }

    fn device(&self, x: f64, y: f64) -> Option<Point> {
        let p = self.state.transform.apply(Point::new(x, y));
        p.is_finite().then_some(p)
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        if let Some(p) = self.device(x, y) {
            self.path.push(PathCommand::MoveTo(p));
            self.current = Some(p);
            self.subpath_start = Some(p);
        }
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        let Some(p) = self.device(x, y) else { return };
        if self.current.is_none() {
            self.path.push(PathCommand::MoveTo(p));
            self.subpath_start = Some(p);
        } else {
            self.path.push(PathCommand::LineTo(p));
        }
        self.current = Some(p);
    }

    pub fn quad_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        let (Some(c), Some(p)) = (self.device(cx, cy), self.device(x, y)) else { return };
        self.ensure_start(c);
        self.path.push(PathCommand::QuadTo(c, p));
        self.current = Some(p);
    }

    pub fn cubic_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) {
        let (Some(c1), Some(c2), Some(p)) = (self.device(c1x, c1y), self.device(c2x, c2y), self.device(x, y)) else {
            return;
        };
        self.ensure_start(c1);
        self.path.push(PathCommand::CubicTo(c1, c2, p));
        self.current = Some(p);
    }

    pub fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64) {
        let Some((first, segments)) = arc_segments(Point::new(cx, cy), radius, start, end) else { return };
        if self.current.is_some() {
            self.line_to(first.x, first.y);
        } else {
            self.move_to(first.x, first.y);
        }
        for (c1, c2, p) in segments {
            self.cubic_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y);
        }
    }

    pub fn close_path(&mut self) {
        if self.current.is_some() {
            self.path.push(PathCommand::Close);
            self.current = self.subpath_start;
        }
    }

    /// Device-space rectangle corners for `fill_rect`.
    pub fn rect_path(&self, x: f64, y: f64, width: f64, height: f64) -> Vec<PathCommand> {
        let corners = [(x, y), (x + width, y), (x + width, y + height), (x, y + height)];
        let mut path: Vec<PathCommand> = corners
            .iter()
            .filter_map(|&(px, py)| self.device(px, py))
            .enumerate()
            .map(|(i, p)| if i == 0 { PathCommand::MoveTo(p) } else { PathCommand::LineTo(p) })
            .collect();
        if path.len() == 4 {
            path.push(PathCommand::Close);
            path
        } else {
            Vec::new()
        }
    }

    /// Stroke width in device units.
    pub fn device_line_width(&self) -> f64 {
        self.state.line_width * self.state.transform.mean_scale()
    }

    /// Dash intervals in device units.
    pub fn device_dash(&self) -> Vec<f64> {
        let scale = self.state.transform.mean_scale();
        self.state.dash.iter().map(|d| d * scale).collect()
    }

    fn ensure_start(&mut self, at: Point) {
        if self.current.is_none() {
            self.path.push(PathCommand::MoveTo(at));
            self.subpath_start = Some(at);
        }
    }
}

/// Sanitizes a dash pattern: non-finite or negative entries are dropped and an
/// all-zero pattern becomes solid.
pub(crate) fn clean_dash(pattern: &[f64]) -> Vec<f64> {
    let dash: Vec<f64> = pattern.iter().copied().filter(|d| d.is_finite() && *d >= 0.0).collect();
    if dash.iter().all(|d| *d == 0.0) { Vec::new() } else { dash }
}

/// Approximates a clockwise arc with cubic segments of at most a quarter turn.
///
/// Returns the start point and `(c1, c2, end)` triples, or `None` for a
/// degenerate radius or non-finite angles. Sweeps beyond a full turn are
/// capped at one turn.
pub fn arc_segments(center: Point, radius: f64, start: f64, end: f64) -> Option<(Point, Vec<(Point, Point, Point)>)> {
    if !(radius.is_finite() && radius > 0.0 && start.is_finite() && end.is_finite()) {
        return None;
    }
    let mut sweep = end - start;
    if sweep < 0.0 {
        sweep = sweep.rem_euclid(TAU);
    }
    let sweep = sweep.min(TAU);
    let pieces = (sweep / FRAC_PI_2).ceil().max(1.0) as usize;
    let step = sweep / pieces as f64;
    let k = 4.0 / 3.0 * (step / 4.0).tan();

    let at = |angle: f64| Point::polar(center, radius, angle);
    let mut segments = Vec::with_capacity(pieces);
    for i in 0..pieces {
        let a0 = start + step * i as f64;
        let a1 = a0 + step;
        let (p0, p1) = (at(a0), at(a1));
        let c1 = Point::new(p0.x - a0.sin() * radius * k, p0.y + a0.cos() * radius * k);
        let c2 = Point::new(p1.x + a1.sin() * radius * k, p1.y - a1.cos() * radius * k);
        segments.push((c1, c2, p1));
    }
    Some((at(start), segments))
}
