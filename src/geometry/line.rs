//! Line family: minimal single-line marks with intentional breaks.

use std::f64::consts::TAU;

use super::{point_count, sanitize, sanitize_radius, unit, GeometryPath, GeometryPoint, Point, ShapeGenerator, PHI};
use crate::rng::Prng;

/// A sparse loop drawn as one refined line.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimalLine {
    /// Geometric precision in `[0, 1]`; lower adds a slow wobble.
    pub precision: f64,
    /// Visual simplicity in `[0, 1]`; higher means fewer points (4..=12).
    pub simplicity: f64,
    pub phi: f64,
    /// Overall radius factor.
    pub harmony: f64,
    /// Probability that an eligible point lifts the pen.
    pub breaks: f64,
    pub seed: String,
}

impl Default for MinimalLine {
    fn default() -> Self {
        Self {
            precision: 0.95,
            simplicity: 0.9,
            phi: PHI,
            harmony: 0.9,
            breaks: 0.05,
            seed: "minimal-line".to_string(),
        }
    }
}

impl MinimalLine {
    pub fn generate_with(&self, rng: &mut Prng, center: Point, radius: f64, time: f64) -> GeometryPath {
        let radius = sanitize_radius(radius);
        let time = sanitize(time);
        let precision = unit(self.precision, 1.0);
        let simplicity = unit(self.simplicity, 1.0);
        let phi = sanitize(self.phi);
        let harmony = sanitize(self.harmony).max(0.0);
        let breaks = unit(self.breaks, 0.0);

        let count = point_count(4.0, 1.0 - simplicity, 8.0, true);
        let points = (0..count)
            .map(|i| {
                let angle = i as f64 / count as f64 * TAU;
                let golden = (angle * phi).sin() * (1.0 - simplicity) * 0.1;
                let proportional = radius * (0.85 + golden) * harmony;
                let variation = (angle * 2.0 + time * 0.2).sin() * (1.0 - precision) * 0.05;
                let r = (proportional * (1.0 + variation)).max(0.0);

                // The draw is consumed for every point so the sequence does
                // not depend on which points are eligible.
                let roll = rng.next_f64();
                let eligible = (angle * 7.0 + time * 0.1).sin() < -0.8;

                let point = GeometryPoint::polar(center, r, angle).with_weight(precision + angle.sin() * 0.02);
                if eligible && roll < breaks { point.as_break() } else { point }
            })
            .collect();
        GeometryPath::closed(points)
    }
}

impl ShapeGenerator for MinimalLine {
    fn generate(&self, center: Point, scale: f64, phase: f64) -> GeometryPath {
        let mut rng = Prng::for_frame(&self.seed, phase);
        self.generate_with(&mut rng, center, scale, phase)
    }
}

/// Copy of `path` pushed `distance` outward along each point's angle.
pub fn parallel_offset(path: &GeometryPath, distance: f64) -> GeometryPath {
    let distance = sanitize(distance);
    GeometryPath {
        points: path
            .points
            .iter()
            .map(|p| GeometryPoint {
                x: p.x + p.angle.cos() * distance,
                y: p.y + p.angle.sin() * distance,
                radius: (p.radius + distance).max(0.0),
                ..*p
            })
            .collect(),
        closed: path.closed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{smooth_path, PathCommand, DEFAULT_SMOOTHING};

    const CENTER: Point = Point::new(100.0, 100.0);

    #[test]
    fn simplicity_reduces_points() {
        let minimal = MinimalLine { simplicity: 1.0, ..MinimalLine::default() };
        assert_eq!(minimal.generate(CENTER, 80.0, 0.0).len(), 4);
        let busy = MinimalLine { simplicity: 0.0, ..MinimalLine::default() };
        assert_eq!(busy.generate(CENTER, 80.0, 0.0).len(), 12);
    }

    #[test]
    fn no_breaks_without_probability() {
        let line = MinimalLine { breaks: 0.0, simplicity: 0.0, ..MinimalLine::default() };
        let path = line.generate(CENTER, 80.0, 0.0);
        assert!(path.points.iter().all(|p| !p.is_break));
        let commands = smooth_path(&path, DEFAULT_SMOOTHING);
        assert_eq!(commands.last(), Some(&PathCommand::Close));
    }

    #[test]
    fn certain_breaks_lift_the_pen() {
        let line = MinimalLine { breaks: 1.0, simplicity: 0.0, ..MinimalLine::default() };
        let path = line.generate(CENTER, 80.0, 0.0);
        // sin(7a) < -0.8 holds for some of the twelve sample angles.
        assert!(path.points.iter().any(|p| p.is_break));
        let commands = smooth_path(&path, DEFAULT_SMOOTHING);
        let moves = commands.iter().filter(|c| matches!(c, PathCommand::MoveTo(_))).count();
        assert!(moves >= 2);
        assert!(!commands.contains(&PathCommand::Close));
    }

    #[test]
    fn parallel_offset_grows_radius() {
        let line = MinimalLine { breaks: 0.0, ..MinimalLine::default() };
        let path = line.generate(CENTER, 80.0, 0.0);
        let outer = parallel_offset(&path, 6.0);
        for (a, b) in path.points.iter().zip(&outer.points) {
            assert!((b.radius - a.radius - 6.0).abs() < 1e-9);
            assert!((b.position().distance(CENTER) - a.position().distance(CENTER) - 6.0).abs() < 1e-6);
        }
    }

    #[test]
    fn degenerate_line_is_finite() {
        let line = MinimalLine {
            precision: f64::NAN,
            phi: f64::INFINITY,
            harmony: -1.0,
            ..MinimalLine::default()
        };
        let path = line.generate(CENTER, f64::NAN, f64::NAN);
        assert!(path.len() >= 3);
        assert!(path.is_finite());
    }
}
