//! Crystalline family: gem cuts and sharp harmonic rings.

use std::f64::consts::{PI, TAU};

use super::{
    harmonic_radius, point_count, sanitize, sanitize_radius, unit, GeometryPath, GeometryPoint, Harmonic, Point,
    ShapeGenerator,
};

pub const TABLE: &str = "table";
pub const CROWN: &str = "crown";
pub const GIRDLE: &str = "girdle";
pub const PAVILION: &str = "pavilion";
pub const CULET: &str = "culet";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiamondCut {
    #[default]
    Classic,
    Elongated,
    Brilliant,
    Marquise,
    Emerald,
}

impl DiamondCut {
    pub fn from_index(index: f64) -> Self {
        match sanitize(index).round().clamp(0.0, 4.0) as u8 {
            0 => DiamondCut::Classic,
            1 => DiamondCut::Elongated,
            2 => DiamondCut::Brilliant,
            3 => DiamondCut::Marquise,
            _ => DiamondCut::Emerald,
        }
    }
}

/// A gem outline whose vertices are tagged with the facet they belong to.
///
/// `width` and `height` are multiples of the generator scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diamond {
    pub cut: DiamondCut,
    pub width: f64,
    pub height: f64,
    /// Cut precision in `[0, 1]`; widens the table.
    pub precision: f64,
    /// Symmetry grade in `[0, 1]`; pulls the crown in when low.
    pub symmetry: f64,
    /// Share of the half-height below the girdle.
    pub pavilion_depth: f64,
    /// Girdle thickness as a fraction of the height.
    pub girdle_thickness: f64,
}

impl Default for Diamond {
    fn default() -> Self {
        Self {
            cut: DiamondCut::Classic,
            width: 0.65,
            height: 0.8,
            precision: 0.95,
            symmetry: 0.92,
            pavilion_depth: 0.6,
            girdle_thickness: 0.02,
        }
    }
}

impl ShapeGenerator for Diamond {
    fn generate(&self, center: Point, scale: f64, _phase: f64) -> GeometryPath {
        let scale = sanitize_radius(scale);
        let width = sanitize(self.width).abs() * scale;
        let height = sanitize(self.height).abs() * scale;
        let hw = width / 2.0;
        let hh = height / 2.0;
        let pavilion_depth = unit(self.pavilion_depth, 0.6);
        let precision = unit(self.precision, 1.0);
        let symmetry = unit(self.symmetry, 1.0);
        let girdle = height * sanitize(self.girdle_thickness).clamp(0.0, 0.5);
        let crown = hh * (1.0 - pavilion_depth);
        let pavilion = hh * pavilion_depth;
        let table = hw * precision;
        let (cx, cy) = (center.x, center.y);

        let vertices: Vec<(f64, f64, &'static str)> = match self.cut {
            DiamondCut::Classic => vec![
                (cx - table * 0.3, cy - crown, TABLE),
                (cx + table * 0.3, cy - crown, TABLE),
                (cx + hw * symmetry, cy - girdle, CROWN),
                (cx + hw, cy, GIRDLE),
                (cx + hw * symmetry, cy + girdle, GIRDLE),
                (cx, cy + pavilion, CULET),
                (cx - hw * symmetry, cy + girdle, GIRDLE),
                (cx - hw, cy, GIRDLE),
                (cx - hw * symmetry, cy - girdle, CROWN),
            ],
            DiamondCut::Elongated => vec![
                (cx, cy - crown * 1.5, TABLE),
                (cx + hw * 0.7, cy - crown * 0.3, CROWN),
                (cx + hw, cy, GIRDLE),
                (cx + hw * 0.7, cy + pavilion * 0.3, GIRDLE),
                (cx, cy + pavilion * 1.5, CULET),
                (cx - hw * 0.7, cy + pavilion * 0.3, GIRDLE),
                (cx - hw, cy, GIRDLE),
                (cx - hw * 0.7, cy - crown * 0.3, CROWN),
            ],
            DiamondCut::Brilliant => {
                let bp = precision * 1.1;
                vec![
                    (cx - table * 0.4, cy - crown, TABLE),
                    (cx + table * 0.4, cy - crown, TABLE),
                    (cx + hw * 0.8 * bp, cy - crown * 0.6, CROWN),
                    (cx + hw * bp, cy, GIRDLE),
                    (cx + hw * 0.6, cy + pavilion * 0.5, PAVILION),
                    (cx, cy + pavilion, CULET),
                    (cx - hw * 0.6, cy + pavilion * 0.5, PAVILION),
                    (cx - hw * bp, cy, GIRDLE),
                    (cx - hw * 0.8 * bp, cy - crown * 0.6, CROWN),
                ]
            }
            DiamondCut::Marquise => vec![
                (cx, cy - crown * 1.3, TABLE),
                (cx + hw * 0.9, cy - crown * 0.5, CROWN),
                (cx + hw * 1.1, cy, GIRDLE),
                (cx + hw * 0.9, cy + pavilion * 0.5, PAVILION),
                (cx, cy + pavilion * 1.3, CULET),
                (cx - hw * 0.9, cy + pavilion * 0.5, PAVILION),
                (cx - hw * 1.1, cy, GIRDLE),
                (cx - hw * 0.9, cy - crown * 0.5, CROWN),
            ],
            DiamondCut::Emerald => {
                let step = hw * 0.8;
                vec![
                    (cx - step * 0.6, cy - crown, TABLE),
                    (cx + step * 0.6, cy - crown, TABLE),
                    (cx + step * 0.8, cy - crown * 0.8, TABLE),
                    (cx + step, cy - crown * 0.3, CROWN),
                    (cx + hw, cy, GIRDLE),
                    (cx + step, cy + pavilion * 0.3, PAVILION),
                    (cx + step * 0.6, cy + pavilion, CULET),
                    (cx - step * 0.6, cy + pavilion, CULET),
                    (cx - step, cy + pavilion * 0.3, PAVILION),
                    (cx - hw, cy, GIRDLE),
                    (cx - step, cy - crown * 0.3, CROWN),
                    (cx - step * 0.8, cy - crown * 0.8, TABLE),
                ]
            }
        };

        let points = vertices
            .into_iter()
            .map(|(x, y, tag)| {
                let mut p = GeometryPoint::new(x, y).with_tension(0.0).tagged(tag);
                p.angle = (y - cy).atan2(x - cx);
                p.radius = (x - cx).hypot(y - cy);
                p
            })
            .collect();
        GeometryPath::closed(points)
    }
}

/// Interior facet lines for a tagged gem outline.
///
/// `level` 0 draws nothing; 1 joins the table to the culet; 2 adds crown to
/// culet lines and table to girdle lines; 3 adds a spoke from every vertex to
/// the center.
pub fn facet_lines(path: &GeometryPath, center: Point, level: u8) -> Vec<(Point, Point)> {
    let by_tag = |tag: &str| -> Vec<Point> {
        path.points
            .iter()
            .filter(|p| p.tag == Some(tag))
            .map(GeometryPoint::position)
            .collect()
    };
    let tables = by_tag(TABLE);
    let crowns = by_tag(CROWN);
    let girdles = by_tag(GIRDLE);
    let culet = by_tag(CULET).first().copied().unwrap_or(center);

    let mut lines = Vec::new();
    if level >= 1 {
        lines.extend(tables.iter().map(|t| (*t, culet)));
    }
    if level >= 2 {
        lines.extend(crowns.iter().map(|c| (*c, culet)));
        for t in &tables {
            lines.extend(girdles.iter().map(|g| (*t, *g)));
        }
    }
    if level >= 3 {
        lines.extend(path.points.iter().map(|p| (p.position(), center)));
    }
    lines
}

/// Ring with sharp low-order harmonics and straight edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrystalRing {
    /// Detail in `[0, 1]`, mapped to 5..=17 vertices.
    pub complexity: f64,
    /// Harmonic strength in `[0, 1]`.
    pub sharpness: f64,
    pub rotation: f64,
}

impl Default for CrystalRing {
    fn default() -> Self {
        Self {
            complexity: 0.5,
            sharpness: 0.6,
            rotation: 0.0,
        }
    }
}

impl ShapeGenerator for CrystalRing {
    fn generate(&self, center: Point, scale: f64, phase: f64) -> GeometryPath {
        let radius = sanitize_radius(scale);
        let sharp = unit(self.sharpness, 0.0);
        let count = point_count(5.0, self.complexity, 12.0, true);
        let harmonics = [
            Harmonic::new(3.0, 0.3, 0.15 * sharp),
            Harmonic::new(6.0, 0.0, 0.08 * sharp),
        ];
        let points = (0..count)
            .map(|i| {
                let angle = sanitize(self.rotation) - PI / 2.0 + i as f64 / count as f64 * TAU;
                let r = harmonic_radius(radius, angle, phase, &harmonics);
                let r = if i % 2 == 1 { r * (1.0 - 0.2 * sharp) } else { r };
                GeometryPoint::polar(center, r, angle).with_tension(0.0).tagged("facet")
            })
            .collect();
        GeometryPath::closed(points)
    }
}
