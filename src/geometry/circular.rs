//! Circular family: golden-ratio circles.

use std::f64::consts::TAU;

use super::{
    blend_precision, harmonic_radius, point_count, sanitize, sanitize_radius, unit, GeometryPath, GeometryPoint,
    Harmonic, Point, ShapeGenerator, PHI,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CircleStyle {
    #[default]
    Perfect,
    Organic,
    Spiral,
    Segmented,
    Breathing,
}

impl CircleStyle {
    pub fn from_index(index: f64) -> Self {
        match sanitize(index).round().clamp(0.0, 4.0) as u8 {
            0 => CircleStyle::Perfect,
            1 => CircleStyle::Organic,
            2 => CircleStyle::Spiral,
            3 => CircleStyle::Segmented,
            _ => CircleStyle::Breathing,
        }
    }
}

/// Circle whose point count, harmonics, and proportions follow `phi`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoldenCircle {
    pub style: CircleStyle,
    pub phi: f64,
    /// Spiral displacement strength in `[0, 1]`.
    pub fibonacci: f64,
    /// Organic variation amplitude, typically `[0, 0.3]`.
    pub organic: f64,
    /// Geometric precision in `[0, 1]`.
    pub purity: f64,
    pub spiral_tightness: f64,
}

impl Default for GoldenCircle {
    fn default() -> Self {
        Self {
            style: CircleStyle::Perfect,
            phi: PHI,
            fibonacci: 0.3,
            organic: 0.08,
            purity: 0.9,
            spiral_tightness: 0.8,
        }
    }
}

impl GoldenCircle {
    fn phi(&self) -> f64 {
        let phi = sanitize(self.phi);
        if phi > 0.0 { phi.min(4.0) } else { PHI }
    }
}

impl ShapeGenerator for GoldenCircle {
    fn generate(&self, center: Point, scale: f64, phase: f64) -> GeometryPath {
        let radius = sanitize_radius(scale);
        let phase = sanitize(phase);
        let phi = self.phi();
        let organic = sanitize(self.organic).clamp(0.0, 1.0);
        let fib = unit(self.fibonacci, 0.0);

        let count = match self.style {
            CircleStyle::Perfect => point_count(8.0 + phi * 4.0, 0.0, 0.0, true),
            CircleStyle::Organic => point_count(12.0, organic / 0.3, 6.0, true),
            CircleStyle::Spiral => point_count(8.0, fib, 16.0, true),
            CircleStyle::Segmented => point_count(6.0 + phi * 2.0, 0.0, 0.0, true),
            CircleStyle::Breathing => point_count(10.0 + phi * 3.0, 0.0, 0.0, true),
        };

        let points = (0..count)
            .map(|i| {
                let angle = i as f64 / count as f64 * TAU;
                match self.style {
                    CircleStyle::Perfect => {
                        let regular = Point::polar(center, radius, angle);
                        let wobble = radius * (1.0 + (angle * phi).sin() * organic);
                        let organic_point = Point::polar(center, wobble, angle);
                        let p = blend_precision(regular, organic_point, self.purity);
                        radial_point(center, p, angle)
                    }
                    CircleStyle::Organic => {
                        let harmonics = [
                            Harmonic::new(3.0, 0.5, organic * 0.3),
                            Harmonic::new(5.0, 0.3, organic * 0.15),
                            Harmonic::new(phi, 0.2, organic * 0.1),
                        ];
                        GeometryPoint::polar(center, harmonic_radius(radius, angle, phase, &harmonics), angle)
                    }
                    CircleStyle::Spiral => {
                        let tight = sanitize(self.spiral_tightness);
                        let r = harmonic_radius(radius, angle, 0.0, &[Harmonic::new(phi * tight, 0.0, fib * 0.2)]);
                        let drift = fib * radius * 0.05 * (angle * phi).sin();
                        let p = Point::polar(center, r, angle);
                        radial_point(center, Point::new(p.x + drift, p.y), angle)
                    }
                    CircleStyle::Segmented => {
                        let r = radius * (0.95 + (angle * 2.0).sin() * organic * 0.1);
                        GeometryPoint::polar(center, r, angle).with_tension(0.0)
                    }
                    CircleStyle::Breathing => {
                        let r = harmonic_radius(radius, angle, phase, &[Harmonic::new(2.0, 2.0, organic * 0.4)]);
                        GeometryPoint::polar(center, r, angle)
                    }
                }
            })
            .collect();
        GeometryPath::closed(points)
    }
}

fn radial_point(center: Point, p: Point, angle: f64) -> GeometryPoint {
    let mut point = GeometryPoint::new(p.x, p.y);
    point.angle = angle;
    point.radius = p.distance(center);
    point
}

/// Radius multiplier for a slow breathing pulse, `1 ± amplitude`.
pub fn breathing_pulse(time: f64, amplitude: f64) -> f64 {
    1.0 + (sanitize(time) * 0.8).sin() * sanitize(amplitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: Point = Point::new(256.0, 256.0);

    fn styles() -> [CircleStyle; 5] {
        [
            CircleStyle::Perfect,
            CircleStyle::Organic,
            CircleStyle::Spiral,
            CircleStyle::Segmented,
            CircleStyle::Breathing,
        ]
    }

    #[test]
    fn every_style_is_closed_with_three_or_more_points() {
        for style in styles() {
            let path = GoldenCircle { style, ..GoldenCircle::default() }.generate(CENTER, 100.0, 1.3);
            assert!(path.closed);
            assert!(path.len() >= 3, "{style:?}");
            assert!(path.is_finite());
        }
    }

    #[test]
    fn perfect_point_count_follows_phi() {
        let path = GoldenCircle::default().generate(CENTER, 100.0, 0.0);
        assert_eq!(path.len(), (8.0 + PHI * 4.0).floor() as usize);
    }

    #[test]
    fn full_purity_is_a_true_circle() {
        let circle = GoldenCircle { purity: 1.0, ..GoldenCircle::default() };
        for p in circle.generate(CENTER, 100.0, 0.0).points {
            assert!((p.radius - 100.0).abs() < 1e-6);
        }
    }

    #[test]
    fn degenerate_inputs_never_produce_nan() {
        for style in styles() {
            for (radius, organic, phi) in [(0.0, 0.1, PHI), (-20.0, 5.0, -1.0), (f64::NAN, f64::NAN, f64::NAN)] {
                let circle = GoldenCircle {
                    style,
                    organic,
                    phi,
                    fibonacci: 7.0,
                    purity: -2.0,
                    spiral_tightness: f64::INFINITY,
                };
                let path = circle.generate(CENTER, radius, f64::INFINITY);
                assert!(path.len() >= 3);
                assert!(path.is_finite(), "{style:?} r={radius}");
            }
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let circle = GoldenCircle {
            style: CircleStyle::Organic,
            ..GoldenCircle::default()
        };
        assert_eq!(circle.generate(CENTER, 90.0, 2.5), circle.generate(CENTER, 90.0, 2.5));
    }

    #[test]
    fn breathing_pulse_bounds() {
        for t in [0.0, 1.0, 2.0, 10.0] {
            let pulse = breathing_pulse(t, 0.05);
            assert!((0.95..=1.05).contains(&pulse));
        }
    }
}
