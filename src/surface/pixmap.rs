//! Raster surface backed by tiny-skia (re-exported through resvg).

use image::{Rgba, RgbaImage};
use resvg::tiny_skia::{
    self, FillRule, GradientStop as SkiaStop, LinearGradient, Mask, Path, PathBuilder, Pixmap, RadialGradient, Shader,
    SpreadMode, Stroke, StrokeDash, Transform,
};
use tracing::trace;

use super::{clean_dash, GradientStop, LineCap, LineJoin, Paint, RenderContext, Tracker};
use crate::color::Color;
use crate::error::EngineError;
use crate::geometry::PathCommand;

/// Number of halo passes used to approximate a blur.
const BLUR_STEPS: usize = 4;

/// Anti-aliased raster surface.
///
/// Starts fully transparent. Paint geometry is resolved to device space when
/// set, so later transforms do not move an already configured gradient.
pub struct PixmapContext {
    pixmap: Pixmap,
    tracker: Tracker<Mask>,
}

impl PixmapContext {
    /// Creates a transparent surface of `width × height` pixels.
    pub fn new(width: u32, height: u32) -> Result<Self, EngineError> {
        let pixmap = Pixmap::new(width, height)
            .ok_or_else(|| EngineError::Surface(format!("cannot allocate a {width}x{height} pixmap")))?;
        Ok(Self {
            pixmap,
            tracker: Tracker::default(),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Straight-alpha RGBA of a single pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let px = self.pixmap.pixel(x, y)?;
        let (r, g, b, a) = unpremultiply(px.red(), px.green(), px.blue(), px.alpha());
        Some([r, g, b, a])
    }

    /// Converts the surface to a straight-alpha image.
    pub fn to_image(&self) -> RgbaImage {
        pixmap_to_rgba_image(&self.pixmap)
    }

    pub fn into_image(self) -> RgbaImage {
        self.to_image()
    }

    /// Encodes the surface as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, EngineError> {
        self.pixmap.encode_png().map_err(|e| EngineError::Surface(e.to_string()))
    }

    fn current_path(&self) -> Option<Path> {
        build_path(&self.tracker.path)
    }

    fn fill_device_path(&mut self, path: &Path) {
        let state = &self.tracker.state;
        let alpha = state.alpha;
        let blur = state.blur * state.transform.mean_scale();
        let paint = state.fill.clone();
        let mask = state.clip.clone();

        if blur > 0.0 {
            let halo = Stroke {
                line_join: tiny_skia::LineJoin::Round,
                ..Stroke::default()
            };
            for step in (1..=BLUR_STEPS).rev() {
                let stroke = Stroke {
                    width: (blur * 2.0 * step as f64 / BLUR_STEPS as f64) as f32,
                    ..halo.clone()
                };
                let skia = skia_paint(&paint, alpha / (BLUR_STEPS as f64 + 1.0));
                self.pixmap
                    .stroke_path(path, &skia, &stroke, Transform::identity(), mask.as_ref());
            }
        }

        let skia = skia_paint(&paint, alpha);
        self.pixmap
            .fill_path(path, &skia, FillRule::Winding, Transform::identity(), mask.as_ref());
    }

    fn stroke_device_path(&mut self, path: &Path) {
        let state = &self.tracker.state;
        let width = self.tracker.device_line_width();
        if !(width.is_finite() && width > 0.0) {
            return;
        }
        let blur = state.blur * state.transform.mean_scale();
        let alpha = state.alpha;
        let paint = state.stroke.clone();
        let mask = state.clip.clone();
        let stroke = Stroke {
            width: width as f32,
            line_cap: skia_cap(state.cap),
            line_join: skia_join(state.join),
            dash: skia_dash(&self.tracker.device_dash()),
            ..Stroke::default()
        };

        if blur > 0.0 {
            for step in (1..=BLUR_STEPS).rev() {
                let halo = Stroke {
                    width: (width + blur * 2.0 * step as f64 / BLUR_STEPS as f64) as f32,
                    ..stroke.clone()
                };
                let skia = skia_paint(&paint, alpha / (BLUR_STEPS as f64 + 1.0));
                self.pixmap
                    .stroke_path(path, &skia, &halo, Transform::identity(), mask.as_ref());
            }
        }

        let skia = skia_paint(&paint, alpha);
        self.pixmap
            .stroke_path(path, &skia, &stroke, Transform::identity(), mask.as_ref());
    }
}

impl RenderContext for PixmapContext {
    fn save(&mut self) {
        self.tracker.save();
    }

    fn restore(&mut self) {
        self.tracker.restore();
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.tracker.set_alpha(alpha);
    }

    fn global_alpha(&self) -> f64 {
        self.tracker.state.alpha
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.tracker.translate(dx, dy);
    }

    fn rotate(&mut self, radians: f64) {
        self.tracker.rotate(radians);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.tracker.scale(sx, sy);
    }

    fn begin_path(&mut self) {
        self.tracker.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.tracker.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.tracker.line_to(x, y);
    }

    fn quad_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.tracker.quad_to(cx, cy, x, y);
    }

    fn cubic_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) {
        self.tracker.cubic_to(c1x, c1y, c2x, c2y, x, y);
    }

    fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64) {
        self.tracker.arc(cx, cy, radius, start, end);
    }

    fn close_path(&mut self) {
        self.tracker.close_path();
    }

    fn set_fill(&mut self, paint: Paint) {
        self.tracker.state.fill = self.tracker.state.transform.apply_paint(&paint);
    }

    fn set_stroke(&mut self, paint: Paint) {
        self.tracker.state.stroke = self.tracker.state.transform.apply_paint(&paint);
    }

    fn set_line_width(&mut self, width: f64) {
        if width.is_finite() && width >= 0.0 {
            self.tracker.state.line_width = width;
        }
    }

    fn set_line_dash(&mut self, pattern: &[f64]) {
        self.tracker.state.dash = clean_dash(pattern);
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.tracker.state.cap = cap;
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.tracker.state.join = join;
    }

    fn set_blur(&mut self, radius: f64) {
        self.tracker.state.blur = if radius.is_finite() { radius.max(0.0) } else { 0.0 };
    }

    fn fill(&mut self) {
        if let Some(path) = self.current_path() {
            self.fill_device_path(&path);
        }
    }

    fn stroke(&mut self) {
        if let Some(path) = self.current_path() {
            self.stroke_device_path(&path);
        }
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        if let Some(path) = build_path(&self.tracker.rect_path(x, y, width, height)) {
            self.fill_device_path(&path);
        }
    }

    fn clip(&mut self) {
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        let path = self.current_path();
        let mask = match (self.tracker.state.clip.take(), path) {
            (Some(mut mask), Some(path)) => {
                mask.intersect_path(&path, FillRule::Winding, true, Transform::identity());
                Some(mask)
            }
            (None, Some(path)) => Mask::new(width, height).map(|mut mask| {
                mask.fill_path(&path, FillRule::Winding, true, Transform::identity());
                mask
            }),
            // Clipping to an empty path hides everything.
            (_, None) => Mask::new(width, height),
        };
        trace!(clipped = mask.is_some(), "pixmap clip");
        self.tracker.state.clip = mask;
    }
}

// ============================================================================
// tiny-skia Conversions
// ============================================================================

fn build_path(commands: &[PathCommand]) -> Option<Path> {
    let mut builder = PathBuilder::new();
    for command in commands {
        match *command {
            PathCommand::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathCommand::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathCommand::QuadTo(c, p) => builder.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathCommand::CubicTo(c1, c2, p) => builder.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathCommand::Close => builder.close(),
        }
    }
    builder.finish()
}

fn skia_color(color: Color, alpha: f64) -> tiny_skia::Color {
    let a = (color.a as f64 * alpha).clamp(0.0, 1.0);
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, (a * 255.0).round() as u8)
}

fn skia_stops(stops: &[GradientStop], alpha: f64, remap: impl Fn(f64) -> f64) -> Vec<SkiaStop> {
    stops
        .iter()
        .map(|s| SkiaStop::new(remap(s.offset.clamp(0.0, 1.0)) as f32, skia_color(s.color, alpha)))
        .collect()
}

fn shader(paint: &Paint, alpha: f64) -> Option<Shader<'static>> {
    match paint {
        Paint::Solid(color) => Some(Shader::SolidColor(skia_color(*color, alpha))),
        Paint::Linear { start, end, stops } => LinearGradient::new(
            tiny_skia::Point::from_xy(start.x as f32, start.y as f32),
            tiny_skia::Point::from_xy(end.x as f32, end.y as f32),
            skia_stops(stops, alpha, |t| t),
            SpreadMode::Pad,
            Transform::identity(),
        ),
        Paint::Radial {
            center,
            inner_radius,
            outer_radius,
            stops,
        } => {
            if !(outer_radius.is_finite() && *outer_radius > 0.0) {
                return None;
            }
            // Offsets are relative to the ring between the two radii.
            let inner = inner_radius.clamp(0.0, *outer_radius) / outer_radius;
            let c = tiny_skia::Point::from_xy(center.x as f32, center.y as f32);
            RadialGradient::new(
                c,
                c,
                *outer_radius as f32,
                skia_stops(stops, alpha, |t| inner + t * (1.0 - inner)),
                SpreadMode::Pad,
                Transform::identity(),
            )
        }
    }
}

fn skia_paint(paint: &Paint, alpha: f64) -> tiny_skia::Paint<'static> {
    let shader = shader(paint, alpha)
        .unwrap_or_else(|| Shader::SolidColor(skia_color(paint.fallback_color(), alpha)));
    tiny_skia::Paint {
        shader,
        anti_alias: true,
        ..tiny_skia::Paint::default()
    }
}

fn skia_cap(cap: LineCap) -> tiny_skia::LineCap {
    match cap {
        LineCap::Butt => tiny_skia::LineCap::Butt,
        LineCap::Round => tiny_skia::LineCap::Round,
        LineCap::Square => tiny_skia::LineCap::Square,
    }
}

fn skia_join(join: LineJoin) -> tiny_skia::LineJoin {
    match join {
        LineJoin::Miter => tiny_skia::LineJoin::Miter,
        LineJoin::Round => tiny_skia::LineJoin::Round,
        LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
    }
}

/// Odd-length patterns repeat once, as on a canvas.
fn skia_dash(pattern: &[f64]) -> Option<StrokeDash> {
    if pattern.is_empty() {
        return None;
    }
    let mut intervals: Vec<f32> = pattern.iter().map(|d| *d as f32).collect();
    if intervals.len() % 2 == 1 {
        intervals.extend_from_within(..);
    }
    StrokeDash::new(intervals, 0.0)
}

// ============================================================================
// Image Conversion
// ============================================================================

fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (px, out) in pixmap.pixels().iter().zip(img.pixels_mut()) {
        let (r, g, b, a) = unpremultiply(px.red(), px.green(), px.blue(), px.alpha());
        *out = Rgba([r, g, b, a]);
    }
    img
}

fn unpremultiply(r: u8, g: u8, b: u8, a: u8) -> (u8, u8, u8, u8) {
    if a == 0 {
        return (0, 0, 0, 0);
    }
    let a_f = a as f32 / 255.0;
    let channel = |c: u8| (c as f32 / a_f).round().min(255.0) as u8;
    (channel(r), channel(g), channel(b), a)
}
