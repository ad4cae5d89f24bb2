//! Procedural geometry.
//!
//! Each generator family turns `(center, scale, shape parameters, phase)`
//! into a [`GeometryPath`]: an ordered point sequence with per-point metadata
//! and a closure flag. Paths are rendered through [`smooth_path`], which
//! produces neighbor-aware cubic Bézier segments.
//!
//! Generators are pure. Degenerate input (non-finite values, a radius at or
//! below zero, complexity outside `[0, 1]`) yields a valid path, possibly of
//! zero area, and never NaN coordinates.

pub mod circular;
pub mod crystalline;
pub mod field;
pub mod line;
pub mod organic;
pub mod polygon;

use crate::surface::RenderContext;

/// The canonical golden ratio. Presets expose it as a tunable that defaults
/// to this value.
pub const PHI: f64 = 1.618;

/// Default control-point factor for [`smooth_path`].
pub const DEFAULT_SMOOTHING: f64 = 0.3;

// ============================================================================
// Points and Paths
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `radius` and `angle` (radians) from `center`.
    pub fn polar(center: Point, radius: f64, angle: f64) -> Self {
        Self::new(center.x + angle.cos() * radius, center.y + angle.sin() * radius)
    }

    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn lerp(&self, other: Point, t: f64) -> Self {
        Self::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// One generated vertex with generator metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryPoint {
    pub x: f64,
    pub y: f64,
    /// Angle from the generator's center, in radians.
    pub angle: f64,
    /// Distance from the generator's center.
    pub radius: f64,
    /// Pen pressure or line weight, `1.0` when unused.
    pub weight: f64,
    /// Local smoothing tension, `1.0` when unused.
    pub tension: f64,
    /// Lifts the pen after this point.
    pub is_break: bool,
    /// Generator specific label (facet kind, state name).
    pub tag: Option<&'static str>,
}

impl GeometryPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: sanitize(x),
            y: sanitize(y),
            angle: 0.0,
            radius: 0.0,
            weight: 1.0,
            tension: 1.0,
            is_break: false,
            tag: None,
        }
    }

    /// Point on a circle around `center`, recording angle and radius.
    pub fn polar(center: Point, radius: f64, angle: f64) -> Self {
        let radius = sanitize_radius(radius);
        let angle = sanitize(angle);
        let p = Point::polar(center, radius, angle);
        Self {
            angle,
            radius,
            ..Self::new(p.x, p.y)
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = sanitize(weight);
        self
    }

    pub fn with_tension(mut self, tension: f64) -> Self {
        self.tension = sanitize(tension);
        self
    }

    pub fn as_break(mut self) -> Self {
        self.is_break = true;
        self
    }

    pub fn tagged(mut self, tag: &'static str) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Ordered point sequence. Order defines winding and stroke adjacency.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeometryPath {
    pub points: Vec<GeometryPoint>,
    pub closed: bool,
}

impl GeometryPath {
    pub fn closed(points: Vec<GeometryPoint>) -> Self {
        Self { points, closed: true }
    }

    pub fn open(points: Vec<GeometryPoint>) -> Self {
        Self { points, closed: false }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(self.points.iter().map(GeometryPoint::position))
    }

    pub fn is_finite(&self) -> bool {
        self.points.iter().all(|p| p.x.is_finite() && p.y.is_finite())
    }

    /// Straight segments between consecutive points.
    pub fn polyline(&self) -> Vec<PathCommand> {
        let mut commands = Vec::with_capacity(self.points.len() + 1);
        let mut pen_up = true;
        for point in &self.points {
            let p = point.position();
            if pen_up {
                commands.push(PathCommand::MoveTo(p));
            } else {
                commands.push(PathCommand::LineTo(p));
            }
            pen_up = point.is_break;
        }
        if self.closed && !self.has_breaks() && self.points.len() > 2 {
            commands.push(PathCommand::Close);
        }
        commands
    }

    /// Cubic-smoothed commands, see [`smooth_path`].
    pub fn smoothed(&self, smoothing: f64) -> Vec<PathCommand> {
        smooth_path(self, smoothing)
    }

    fn has_breaks(&self) -> bool {
        self.points.iter().any(|p| p.is_break)
    }

    /// Even-odd point-in-polygon test on the straight outline.
    pub fn contains(&self, p: Point) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (a, b) = (self.points[i], self.points[j]);
            if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

/// A generator family: turns placement plus its own shape parameters into a
/// path.
pub trait ShapeGenerator {
    fn generate(&self, center: Point, scale: f64, phase: f64) -> GeometryPath;
}

// ============================================================================
// Path Commands
// ============================================================================

/// A device-independent path segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    CubicTo(Point, Point, Point),
    Close,
}

/// Appends `commands` to the context's current path.
pub fn trace(ctx: &mut dyn RenderContext, commands: &[PathCommand]) {
    for command in commands {
        match *command {
            PathCommand::MoveTo(p) => ctx.move_to(p.x, p.y),
            PathCommand::LineTo(p) => ctx.line_to(p.x, p.y),
            PathCommand::QuadTo(c, p) => ctx.quad_to(c.x, c.y, p.x, p.y),
            PathCommand::CubicTo(c1, c2, p) => ctx.cubic_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
            PathCommand::Close => ctx.close_path(),
        }
    }
}

/// Begins a new path and traces `path` through cubic smoothing.
pub fn trace_smooth(ctx: &mut dyn RenderContext, path: &GeometryPath, smoothing: f64) {
    ctx.begin_path();
    trace(ctx, &smooth_path(path, smoothing));
}

/// Begins a new path and traces `path` with straight segments.
pub fn trace_polyline(ctx: &mut dyn RenderContext, path: &GeometryPath) {
    ctx.begin_path();
    trace(ctx, &path.polyline());
}

// ============================================================================
// Smoothing
// ============================================================================

/// Converts a path into cubic Bézier segments.
///
/// Control points look one point back and one ahead:
/// `c1 = p[i] + (p[i+1] - p[i-1]) * k` and `c2 = p[i+1] - (p[i+2] - p[i]) * k`,
/// where `k` is `smoothing` scaled by the point's tension. Closed paths wrap
/// around and their last segment ends exactly on the first point. A break
/// point ends the current run; the next point starts a new subpath. Paths with
/// breaks are treated as open.
pub fn smooth_path(path: &GeometryPath, smoothing: f64) -> Vec<PathCommand> {
    let k = if smoothing.is_finite() { smoothing } else { DEFAULT_SMOOTHING };
    let points: Vec<Point> = path.points.iter().map(GeometryPoint::position).collect();

    if path.closed && !path.has_breaks() {
        return smooth_closed(&path.points, &points, k);
    }

    let mut commands = Vec::new();
    let mut start = 0;
    for (i, point) in path.points.iter().enumerate() {
        if point.is_break || i + 1 == path.points.len() {
            smooth_open(&path.points[start..=i], &points[start..=i], k, &mut commands);
            start = i + 1;
        }
    }
    commands
}

fn smooth_closed(meta: &[GeometryPoint], points: &[Point], k: f64) -> Vec<PathCommand> {
    let n = points.len();
    match n {
        0 => return Vec::new(),
        1 | 2 => {
            let mut commands = vec![PathCommand::MoveTo(points[0])];
            commands.extend(points[1..].iter().map(|p| PathCommand::LineTo(*p)));
            commands.push(PathCommand::Close);
            return commands;
        }
        _ => {}
    }

    let mut commands = Vec::with_capacity(n + 2);
    commands.push(PathCommand::MoveTo(points[0]));
    for i in 0..n {
        let prev = points[(i + n - 1) % n];
        let cur = points[i];
        let next = points[(i + 1) % n];
        let after = points[(i + 2) % n];
        commands.push(cubic_segment(prev, cur, next, after, k * meta[i].tension));
    }
    commands.push(PathCommand::Close);
    commands
}

fn smooth_open(meta: &[GeometryPoint], points: &[Point], k: f64, out: &mut Vec<PathCommand>) {
    let n = points.len();
    if n == 0 {
        return;
    }
    out.push(PathCommand::MoveTo(points[0]));
    if n == 2 {
        out.push(PathCommand::LineTo(points[1]));
        return;
    }
    for i in 0..n.saturating_sub(1) {
        let prev = points[i.saturating_sub(1)];
        let after = points[(i + 2).min(n - 1)];
        out.push(cubic_segment(prev, points[i], points[i + 1], after, k * meta[i].tension));
    }
}

fn cubic_segment(prev: Point, cur: Point, next: Point, after: Point, k: f64) -> PathCommand {
    let c1 = Point::new(cur.x + (next.x - prev.x) * k, cur.y + (next.y - prev.y) * k);
    let c2 = Point::new(next.x - (after.x - cur.x) * k, next.y - (after.y - cur.y) * k);
    PathCommand::CubicTo(c1, c2, next)
}

// ============================================================================
// Shared Algorithms
// ============================================================================

/// Replaces non-finite values with zero.
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Radii at or below zero, or non-finite, collapse to zero.
pub fn sanitize_radius(radius: f64) -> f64 {
    if radius.is_finite() && radius > 0.0 { radius } else { 0.0 }
}

/// Clamps a unit scalar, mapping non-finite input to `fallback`.
pub fn unit(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value.clamp(0.0, 1.0) } else { fallback }
}

/// `floor(base + complexity * range)`, with complexity clamped to `[0, 1]`.
///
/// Closed shapes always get at least three points, open ones at least two.
pub fn point_count(base: f64, complexity: f64, range: f64, closed: bool) -> usize {
    let raw = (sanitize(base) + unit(complexity, 0.0) * sanitize(range)).floor();
    let minimum = if closed { 3 } else { 2 };
    if raw.is_finite() && raw > 0.0 {
        (raw as usize).max(minimum)
    } else {
        minimum
    }
}

/// One term of a harmonic radius modulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Harmonic {
    /// Angular frequency.
    pub frequency: f64,
    /// Phase speed multiplier.
    pub phase_rate: f64,
    pub weight: f64,
}

impl Harmonic {
    pub const fn new(frequency: f64, phase_rate: f64, weight: f64) -> Self {
        Self {
            frequency,
            phase_rate,
            weight,
        }
    }
}

/// `base * (1 + Σ sin(angle·f + phase·g) · w)`, never negative.
pub fn harmonic_radius(base: f64, angle: f64, phase: f64, harmonics: &[Harmonic]) -> f64 {
    let angle = sanitize(angle);
    let phase = sanitize(phase);
    let modulation: f64 = harmonics
        .iter()
        .map(|h| (angle * h.frequency + phase * h.phase_rate).sin() * h.weight)
        .sum();
    (sanitize_radius(base) * (1.0 + sanitize(modulation))).max(0.0)
}

/// Linear blend from an organic point (precision 0) to a regular one
/// (precision 1).
pub fn blend_precision(regular: Point, organic: Point, precision: f64) -> Point {
    organic.lerp(regular, unit(precision, 1.0))
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// The full canvas.
    pub fn from_size(width: f64, height: f64) -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            max_x: sanitize(width).max(0.0),
            max_y: sanitize(height).max(0.0),
        }
    }

    /// Bounds of the points; empty input yields a zero box at the origin.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Self {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::default();
        };
        iter.fold(
            Self {
                min_x: first.x,
                min_y: first.y,
                max_x: first.x,
                max_y: first.y,
            },
            |b, p| Self {
                min_x: b.min_x.min(p.x),
                min_y: b.min_y.min(p.y),
                max_x: b.max_x.max(p.x),
                max_y: b.max_y.max(p.y),
            },
        )
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }

    pub fn diagonal(&self) -> f64 {
        self.width().hypot(self.height())
    }

    /// Gradient axis through the center at `degrees`, spanning the diagonal.
    pub fn gradient_axis(&self, degrees: f64) -> (Point, Point) {
        let radians = sanitize(degrees).to_radians();
        let half = self.diagonal() / 2.0;
        let c = self.center();
        let (dx, dy) = (radians.cos() * half, radians.sin() * half);
        (Point::new(c.x - dx, c.y - dy), Point::new(c.x + dx, c.y + dy))
    }
}

// ============================================================================
// Derived Layers
// ============================================================================

/// Translated copy of `path`.
pub fn offset_path(path: &GeometryPath, dx: f64, dy: f64) -> GeometryPath {
    let (dx, dy) = (sanitize(dx), sanitize(dy));
    GeometryPath {
        points: path
            .points
            .iter()
            .map(|p| GeometryPoint { x: p.x + dx, y: p.y + dy, ..*p })
            .collect(),
        closed: path.closed,
    }
}

/// Copy of `path` scaled by `factor` about `center`.
pub fn scale_about(path: &GeometryPath, center: Point, factor: f64) -> GeometryPath {
    let factor = sanitize(factor);
    GeometryPath {
        points: path
            .points
            .iter()
            .map(|p| GeometryPoint {
                x: center.x + (p.x - center.x) * factor,
                y: center.y + (p.y - center.y) * factor,
                radius: p.radius * factor.abs(),
                ..*p
            })
            .collect(),
        closed: path.closed,
    }
}

/// The longest contiguous run of points above the path's vertical center,
/// as an open path. Closed paths are searched cyclically.
pub fn upper_arc(path: &GeometryPath) -> GeometryPath {
    let n = path.points.len();
    if n == 0 {
        return GeometryPath::default();
    }
    let mid = path.bounds().center().y;
    let above: Vec<bool> = path.points.iter().map(|p| p.y < mid).collect();
    if above.iter().all(|a| *a) {
        return GeometryPath::open(path.points.clone());
    }

    let mut best: (usize, usize) = (0, 0);
    for start in 0..n {
        let starts_run = above[start]
            && if path.closed {
                !above[(start + n - 1) % n]
            } else {
                start == 0 || !above[start - 1]
            };
        if !starts_run {
            continue;
        }
        let limit = if path.closed { n } else { n - start };
        let len = (0..limit).take_while(|offset| above[(start + offset) % n]).count();
        if len > best.1 {
            best = (start, len);
        }
    }

    GeometryPath::open((0..best.1).map(|offset| path.points[(best.0 + offset) % n]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> GeometryPath {
        GeometryPath::closed(vec![
            GeometryPoint::new(0.0, 0.0),
            GeometryPoint::new(10.0, 0.0),
            GeometryPoint::new(10.0, 10.0),
            GeometryPoint::new(0.0, 10.0),
        ])
    }

    #[test]
    fn contains_uses_outline() {
        let path = square();
        assert!(path.contains(Point::new(5.0, 5.0)));
        assert!(!path.contains(Point::new(15.0, 5.0)));
        assert!(!GeometryPath::closed(vec![GeometryPoint::new(0.0, 0.0)]).contains(Point::new(0.0, 0.0)));
    }

    #[test]
    fn point_count_clamps() {
        assert_eq!(point_count(8.0, 0.5, 20.0, true), 18);
        assert_eq!(point_count(8.0, 7.0, 20.0, true), 28);
        assert_eq!(point_count(0.0, -3.0, 20.0, true), 3);
        assert_eq!(point_count(0.0, f64::NAN, 1.0, false), 2);
        assert_eq!(point_count(f64::INFINITY, 0.5, 1.0, true), 3);
    }

    #[test]
    fn closed_smoothing_ends_on_first_point() {
        let commands = smooth_path(&square(), DEFAULT_SMOOTHING);
        assert_eq!(commands.first(), Some(&PathCommand::MoveTo(Point::new(0.0, 0.0))));
        assert_eq!(commands.last(), Some(&PathCommand::Close));
        match commands[commands.len() - 2] {
            PathCommand::CubicTo(_, _, end) => assert_eq!(end, Point::new(0.0, 0.0)),
            other => panic!("expected a cubic, got {other:?}"),
        }
        // One segment per edge, including the closing one.
        let cubics = commands.iter().filter(|c| matches!(c, PathCommand::CubicTo(..))).count();
        assert_eq!(cubics, 4);
    }

    #[test]
    fn breaks_lift_the_pen() {
        let path = GeometryPath::open(vec![
            GeometryPoint::new(0.0, 0.0),
            GeometryPoint::new(5.0, 0.0),
            GeometryPoint::new(10.0, 0.0).as_break(),
            GeometryPoint::new(20.0, 0.0),
            GeometryPoint::new(25.0, 5.0),
        ]);
        let commands = smooth_path(&path, DEFAULT_SMOOTHING);
        let moves = commands.iter().filter(|c| matches!(c, PathCommand::MoveTo(_))).count();
        assert_eq!(moves, 2);
        assert!(!commands.contains(&PathCommand::Close));
        assert!(commands.contains(&PathCommand::MoveTo(Point::new(20.0, 0.0))));
    }

    #[test]
    fn polyline_closes() {
        let commands = square().polyline();
        assert_eq!(commands.len(), 5);
        assert_eq!(commands[4], PathCommand::Close);
    }

    #[test]
    fn harmonic_radius_is_total() {
        let h = [Harmonic::new(3.0, 1.0, 0.2), Harmonic::new(PHI, 0.5, 0.1)];
        assert_eq!(harmonic_radius(10.0, 0.0, 0.0, &h), 10.0);
        assert_eq!(harmonic_radius(-5.0, 1.0, 1.0, &h), 0.0);
        assert_eq!(harmonic_radius(f64::NAN, 1.0, 1.0, &h), 0.0);
        assert!(harmonic_radius(10.0, f64::INFINITY, 2.0, &h).is_finite());
        let strong = [Harmonic::new(1.0, 0.0, 5.0)];
        assert!(harmonic_radius(10.0, -std::f64::consts::FRAC_PI_2, 0.0, &strong) >= 0.0);
    }

    #[test]
    fn precision_blend_endpoints() {
        let regular = Point::new(10.0, 0.0);
        let organic = Point::new(12.0, 2.0);
        assert_eq!(blend_precision(regular, organic, 1.0), regular);
        assert_eq!(blend_precision(regular, organic, 0.0), organic);
        assert_eq!(blend_precision(regular, organic, 3.0), regular);
    }

    #[test]
    fn gradient_axis_spans_diagonal() {
        let bounds = Bounds::from_size(100.0, 100.0);
        let (start, end) = bounds.gradient_axis(45.0);
        assert!((start.distance(end) - bounds.diagonal()).abs() < 1e-9);
        assert!((start.lerp(end, 0.5).x - 50.0).abs() < 1e-9);
    }

    #[test]
    fn upper_arc_wraps_around_closed_paths() {
        // Points 3, 0, 1 sit above the vertical center.
        let path = GeometryPath::closed(vec![
            GeometryPoint::new(0.0, 0.0),
            GeometryPoint::new(5.0, 1.0),
            GeometryPoint::new(5.0, 10.0),
            GeometryPoint::new(-5.0, 2.0),
        ]);
        let arc = upper_arc(&path);
        assert!(!arc.closed);
        let xs: Vec<f64> = arc.points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![-5.0, 0.0, 5.0]);
    }

    #[test]
    fn derived_layers() {
        let shifted = offset_path(&square(), 2.0, 3.0);
        assert_eq!(shifted.points[0].position(), Point::new(2.0, 3.0));
        let scaled = scale_about(&square(), Point::new(5.0, 5.0), 0.5);
        assert_eq!(scaled.bounds().width(), 5.0);
        assert!(scaled.closed);
    }

    #[test]
    fn degenerate_points_sanitize() {
        let p = GeometryPoint::polar(Point::new(1.0, 1.0), -4.0, f64::NAN);
        assert_eq!((p.x, p.y, p.radius), (1.0, 1.0, 0.0));
    }
}
