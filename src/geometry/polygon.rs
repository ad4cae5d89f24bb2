//! Polygonal family: triangles and regular polygons.

use std::f64::consts::{PI, TAU};

use super::{
    blend_precision, harmonic_radius, sanitize, sanitize_radius, unit, GeometryPath, GeometryPoint, Harmonic, PathCommand,
    Point, ShapeGenerator,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriangleKind {
    #[default]
    Equilateral,
    Isosceles,
    Scalene,
    Right,
    Acute,
}

impl TriangleKind {
    /// Maps a slider index (rounded, clamped to `0..=4`).
    pub fn from_index(index: f64) -> Self {
        match sanitize(index).round().clamp(0.0, 4.0) as u8 {
            0 => TriangleKind::Equilateral,
            1 => TriangleKind::Isosceles,
            2 => TriangleKind::Scalene,
            3 => TriangleKind::Right,
            _ => TriangleKind::Acute,
        }
    }
}

/// A triangle sized relative to `scale`.
///
/// `width` and `height` are multiples of the scale; `apex_offset` shifts the
/// apex horizontally as a fraction of the width; `precision` in `[0, 1]`
/// removes asymmetry as it approaches one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub kind: TriangleKind,
    pub width: f64,
    pub height: f64,
    pub apex_offset: f64,
    pub precision: f64,
}

impl Default for Triangle {
    fn default() -> Self {
        Self {
            kind: TriangleKind::Equilateral,
            width: 1.0,
            height: 1.0,
            apex_offset: 0.0,
            precision: 1.0,
        }
    }
}

impl ShapeGenerator for Triangle {
    fn generate(&self, center: Point, scale: f64, _phase: f64) -> GeometryPath {
        let scale = sanitize_radius(scale);
        let width = sanitize(self.width) * scale;
        let half_w = width / 2.0;
        let half_h = sanitize(self.height) * scale / 2.0;
        let offset = sanitize(self.apex_offset) * width;
        let precision = unit(self.precision, 1.0);
        let (cx, cy) = (center.x, center.y);

        let corners = match self.kind {
            TriangleKind::Equilateral => {
                let h = half_w * 3f64.sqrt() * precision;
                [
                    (cx, cy - h * 0.67),
                    (cx - half_w * precision, cy + h * 0.33),
                    (cx + half_w * precision, cy + h * 0.33),
                ]
            }
            TriangleKind::Isosceles => [
                (cx + offset * 0.3, cy - half_h),
                (cx - half_w, cy + half_h),
                (cx + half_w, cy + half_h),
            ],
            TriangleKind::Scalene => {
                let asymmetry = (1.0 - precision) * 0.3;
                [
                    (cx + offset * 0.5, cy - half_h),
                    (cx - half_w * (1.0 + asymmetry), cy + half_h),
                    (cx + half_w * (1.0 - asymmetry), cy + half_h),
                ]
            }
            TriangleKind::Right => [
                (cx - half_w, cy - half_h),
                (cx - half_w, cy + half_h),
                (cx + half_w, cy + half_h),
            ],
            TriangleKind::Acute => [
                (cx + offset * 0.2, cy - half_h * 1.2),
                (cx - half_w * 0.8, cy + half_h * 0.6),
                (cx + half_w * 0.8, cy + half_h * 0.6),
            ],
        };

        let points = corners
            .iter()
            .map(|&(x, y)| {
                let mut p = GeometryPoint::new(x, y).with_tension(0.0);
                p.angle = (y - cy).atan2(x - cx);
                p.radius = (x - cx).hypot(y - cy);
                p
            })
            .collect();
        GeometryPath::closed(points)
    }
}

/// Regular polygon with optional harmonic distortion.
///
/// `precision` blends from the distorted outline (0) to the exact polygon (1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegularPolygon {
    pub sides: usize,
    /// Rotation in radians; zero puts a vertex at the top.
    pub rotation: f64,
    pub precision: f64,
    /// Radial distortion amplitude in `[0, 1]`.
    pub distortion: f64,
}

impl Default for RegularPolygon {
    fn default() -> Self {
        Self {
            sides: 6,
            rotation: 0.0,
            precision: 1.0,
            distortion: 0.0,
        }
    }
}

impl ShapeGenerator for RegularPolygon {
    fn generate(&self, center: Point, scale: f64, phase: f64) -> GeometryPath {
        let sides = self.sides.max(3);
        let radius = sanitize_radius(scale);
        let harmonics = [
            Harmonic::new(sides as f64, 1.0, unit(self.distortion, 0.0) * 0.3),
            Harmonic::new(super::PHI * 2.0, 0.5, unit(self.distortion, 0.0) * 0.1),
        ];
        let points = (0..sides)
            .map(|i| {
                let angle = sanitize(self.rotation) - PI / 2.0 + i as f64 / sides as f64 * TAU;
                let regular = Point::polar(center, radius, angle);
                let organic = Point::polar(center, harmonic_radius(radius, angle, phase, &harmonics), angle);
                let p = blend_precision(regular, organic, self.precision);
                let mut point = GeometryPoint::new(p.x, p.y).with_tension(0.0);
                point.angle = angle;
                point.radius = p.distance(center);
                point
            })
            .collect();
        GeometryPath::closed(points)
    }
}

/// Outline of a closed polygon with each corner replaced by a quadratic arc.
///
/// The corner radius is limited to a third of the shorter adjacent edge so
/// neighbouring arcs never overlap. A radius of zero yields the plain polygon.
pub fn rounded_corners(path: &GeometryPath, radius: f64) -> Vec<PathCommand> {
    let radius = sanitize_radius(radius);
    let points: Vec<Point> = path.points.iter().map(GeometryPoint::position).collect();
    let n = points.len();
    if n < 3 || radius == 0.0 {
        return path.polyline();
    }

    let toward = |from: Point, to: Point, r: f64| {
        let len = from.distance(to);
        if len == 0.0 { from } else { from.lerp(to, (r / len).min(1.0)) }
    };

    let mut commands = Vec::with_capacity(n * 2 + 2);
    for i in 0..n {
        let prev = points[(i + n - 1) % n];
        let cur = points[i];
        let next = points[(i + 1) % n];
        let r = radius.min(cur.distance(prev) / 3.0).min(cur.distance(next) / 3.0);
        let entry = toward(cur, prev, r);
        let exit = toward(cur, next, r);
        commands.push(if i == 0 { PathCommand::MoveTo(entry) } else { PathCommand::LineTo(entry) });
        commands.push(PathCommand::QuadTo(cur, exit));
    }
    commands.push(PathCommand::Close);
    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: Point = Point::new(100.0, 100.0);

    #[test]
    fn every_kind_is_a_closed_triangle() {
        for i in 0..5 {
            let triangle = Triangle {
                kind: TriangleKind::from_index(i as f64),
                ..Triangle::default()
            };
            let path = triangle.generate(CENTER, 60.0, 0.0);
            assert!(path.closed);
            assert_eq!(path.len(), 3);
            assert!(path.is_finite());
        }
    }

    #[test]
    fn kind_index_clamps() {
        assert_eq!(TriangleKind::from_index(-3.0), TriangleKind::Equilateral);
        assert_eq!(TriangleKind::from_index(1.4), TriangleKind::Isosceles);
        assert_eq!(TriangleKind::from_index(99.0), TriangleKind::Acute);
        assert_eq!(TriangleKind::from_index(f64::NAN), TriangleKind::Equilateral);
    }

    #[test]
    fn equilateral_is_symmetric() {
        let path = Triangle::default().generate(CENTER, 100.0, 0.0);
        let apex = path.points[0];
        let (left, right) = (path.points[1], path.points[2]);
        assert_eq!(apex.x, CENTER.x);
        assert!((CENTER.x - left.x - (right.x - CENTER.x)).abs() < 1e-9);
        assert_eq!(left.y, right.y);
    }

    #[test]
    fn degenerate_scale_collapses_to_center() {
        for scale in [0.0, -10.0, f64::NAN] {
            let path = Triangle {
                kind: TriangleKind::Scalene,
                precision: f64::INFINITY,
                ..Triangle::default()
            }
            .generate(CENTER, scale, 0.0);
            assert_eq!(path.len(), 3);
            assert!(path.is_finite());
            assert_eq!(path.bounds().width(), 0.0);
        }
    }

    #[test]
    fn polygon_has_at_least_three_sides() {
        let path = RegularPolygon { sides: 1, ..RegularPolygon::default() }.generate(CENTER, 50.0, 0.0);
        assert_eq!(path.len(), 3);
        let hex = RegularPolygon::default().generate(CENTER, 50.0, 0.0);
        assert_eq!(hex.len(), 6);
        for p in &hex.points {
            assert!((p.radius - 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn precision_zero_distorts() {
        let exact = RegularPolygon { distortion: 1.0, ..RegularPolygon::default() }.generate(CENTER, 50.0, 0.7);
        let loose = RegularPolygon {
            distortion: 1.0,
            precision: 0.0,
            ..RegularPolygon::default()
        }
        .generate(CENTER, 50.0, 0.7);
        assert_ne!(exact, loose);
    }

    #[test]
    fn rounded_corners_replace_each_vertex() {
        let path = Triangle::default().generate(CENTER, 90.0, 0.0);
        let commands = rounded_corners(&path, 8.0);
        let quads = commands.iter().filter(|c| matches!(c, PathCommand::QuadTo(..))).count();
        assert_eq!(quads, 3);
        assert_eq!(commands.last(), Some(&PathCommand::Close));
        assert_eq!(rounded_corners(&path, 0.0), path.polyline());
    }

    #[test]
    fn corner_radius_is_limited_by_edges() {
        let path = Triangle::default().generate(CENTER, 30.0, 0.0);
        let commands = rounded_corners(&path, 1e6);
        let apex = path.points[0].position();
        let edge = apex.distance(path.points[1].position());
        match commands[0] {
            PathCommand::MoveTo(entry) => assert!(entry.distance(apex) <= edge / 3.0 + 1e-9),
            other => panic!("unexpected first command {other:?}"),
        }
    }
}
