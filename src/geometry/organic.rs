//! Organic family: hand-drawn outlines with tremor and pen pressure.

use std::f64::consts::TAU;

use super::{point_count, sanitize, sanitize_radius, unit, GeometryPath, GeometryPoint, Point, ShapeGenerator};
use crate::rng::Prng;

/// A loose, hand-drawn loop.
#[derive(Debug, Clone, PartialEq)]
pub struct HandDrawn {
    /// Random positional jitter, as a fraction of the radius.
    pub tremor: f64,
    /// Sinusoidal wobble strength.
    pub wobble: f64,
    /// Artistic flow in `[0, 1]`; also drives the point count.
    pub flow: f64,
    /// Chance of a spontaneous deviation per point.
    pub spontaneity: f64,
    /// How much the pen pressure varies, in `[0, 1]`.
    pub pressure_variation: f64,
    /// Seed used when generating through [`ShapeGenerator`].
    pub seed: String,
}

impl Default for HandDrawn {
    fn default() -> Self {
        Self {
            tremor: 0.15,
            wobble: 0.3,
            flow: 0.7,
            spontaneity: 0.5,
            pressure_variation: 0.6,
            seed: "hand-sketch".to_string(),
        }
    }
}

impl HandDrawn {
    /// Generates the outline drawing every random value from `rng`.
    pub fn generate_with(&self, rng: &mut Prng, center: Point, radius: f64, phase: f64) -> GeometryPath {
        let radius = sanitize_radius(radius);
        let phase = sanitize(phase);
        let tremor = sanitize(self.tremor).clamp(0.0, 1.0);
        let wobble = sanitize(self.wobble).clamp(0.0, 1.0);
        let flow = unit(self.flow, 0.7);
        let spontaneity = unit(self.spontaneity, 0.0);
        let pressure_variation = unit(self.pressure_variation, 0.0);

        let count = point_count(12.0, flow, 16.0, true);
        let points = (0..count)
            .map(|i| {
                let angle = i as f64 / count as f64 * TAU;
                let tremor_x = rng.signed() * tremor * radius * 0.1;
                let tremor_y = rng.signed() * tremor * radius * 0.1;

                let wobble_effect = (angle * 7.0 + phase).sin() * wobble * 0.1;
                let flow_effect = (angle * 3.0 + phase * flow).sin() * flow * 0.15;
                let r = radius * (0.8 + (angle * 2.0 + phase).sin() * 0.2 + wobble_effect + flow_effect);

                let spontaneous = if rng.chance(spontaneity * 0.1) {
                    rng.signed() * radius * 0.2
                } else {
                    0.0
                };

                let pen = 0.3 + rng.next_f64() * 0.7;
                let pressure = (1.0 - pressure_variation) + pressure_variation * pen;

                let p = Point::polar(center, r, angle);
                let mut point = GeometryPoint::new(p.x + tremor_x + spontaneous, p.y + tremor_y)
                    .with_weight(pressure)
                    .with_tension(0.8 + wobble * 0.4);
                point.angle = angle;
                point.radius = r.max(0.0);
                point
            })
            .collect();
        GeometryPath::closed(points)
    }
}

impl ShapeGenerator for HandDrawn {
    fn generate(&self, center: Point, scale: f64, phase: f64) -> GeometryPath {
        let mut rng = Prng::for_frame(&self.seed, phase);
        self.generate_with(&mut rng, center, scale, phase)
    }
}

/// Copy of `path` with every point displaced by up to `amount / 2` on each
/// axis, for repeated sketch passes.
pub fn jitter_path(path: &GeometryPath, rng: &mut Prng, amount: f64) -> GeometryPath {
    let amount = sanitize(amount).abs();
    GeometryPath {
        points: path
            .points
            .iter()
            .map(|p| GeometryPoint {
                x: p.x + rng.signed() * amount,
                y: p.y + rng.signed() * amount,
                ..*p
            })
            .collect(),
        closed: path.closed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: Point = Point::new(200.0, 200.0);

    #[test]
    fn point_count_follows_flow() {
        let sketch = HandDrawn { flow: 0.5, ..HandDrawn::default() };
        assert_eq!(sketch.generate(CENTER, 100.0, 0.0).len(), 20);
        let wild = HandDrawn { flow: 9.0, ..HandDrawn::default() };
        assert_eq!(wild.generate(CENTER, 100.0, 0.0).len(), 28);
    }

    #[test]
    fn same_seed_same_sketch() {
        let sketch = HandDrawn::default();
        assert_eq!(sketch.generate(CENTER, 100.0, 1.5), sketch.generate(CENTER, 100.0, 1.5));

        let other = HandDrawn { seed: "different".into(), ..HandDrawn::default() };
        assert_ne!(sketch.generate(CENTER, 100.0, 1.5), other.generate(CENTER, 100.0, 1.5));
    }

    #[test]
    fn pressure_stays_in_range() {
        let path = HandDrawn { pressure_variation: 1.0, ..HandDrawn::default() }.generate(CENTER, 100.0, 0.0);
        for p in &path.points {
            assert!((0.3..=1.0).contains(&p.weight), "{}", p.weight);
        }
        let steady = HandDrawn { pressure_variation: 0.0, ..HandDrawn::default() }.generate(CENTER, 100.0, 0.0);
        assert!(steady.points.iter().all(|p| p.weight == 1.0));
    }

    #[test]
    fn degenerate_inputs_are_finite() {
        let sketch = HandDrawn {
            tremor: f64::NAN,
            wobble: f64::INFINITY,
            flow: -1.0,
            spontaneity: 2.0,
            pressure_variation: f64::NAN,
            seed: String::new(),
        };
        for radius in [0.0, -5.0, f64::NAN] {
            let path = sketch.generate(CENTER, radius, f64::NAN);
            assert!(path.len() >= 3);
            assert!(path.is_finite());
        }
    }

    #[test]
    fn jitter_keeps_shape_and_closure() {
        let path = HandDrawn::default().generate(CENTER, 100.0, 0.0);
        let mut rng = Prng::new("jitter");
        let moved = jitter_path(&path, &mut rng, 4.0);
        assert_eq!(moved.len(), path.len());
        assert!(moved.closed);
        for (a, b) in path.points.iter().zip(&moved.points) {
            assert!((a.x - b.x).abs() <= 2.0 && (a.y - b.y).abs() <= 2.0);
        }
    }
}
