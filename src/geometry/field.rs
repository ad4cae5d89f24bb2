//! Field family: harmonic quantum-state outlines and particle scatter.

use std::f64::consts::TAU;

use super::{point_count, sanitize, sanitize_radius, unit, GeometryPath, GeometryPoint, Harmonic, Point, ShapeGenerator};
use crate::rng::Prng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuantumState {
    Ground,
    Excited,
    #[default]
    Superposition,
    Entangled,
    Collapsed,
}

impl QuantumState {
    pub fn from_index(index: f64) -> Self {
        match sanitize(index).round().clamp(0.0, 4.0) as u8 {
            0 => QuantumState::Ground,
            1 => QuantumState::Excited,
            2 => QuantumState::Superposition,
            3 => QuantumState::Entangled,
            _ => QuantumState::Collapsed,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            QuantumState::Ground => "ground",
            QuantumState::Excited => "excited",
            QuantumState::Superposition => "superposition",
            QuantumState::Entangled => "entangled",
            QuantumState::Collapsed => "collapsed",
        }
    }

    /// Base radius factor and the state's harmonic terms.
    fn harmonics(&self, wave: f64, uncertainty: f64, density: f64) -> (f64, Vec<Harmonic>) {
        match self {
            QuantumState::Ground => (
                0.92,
                vec![
                    Harmonic::new(2.0, 1.0, (1.0 - wave) * 0.08),
                    Harmonic::new(4.0, 0.5, uncertainty * 0.05),
                ],
            ),
            QuantumState::Excited => (
                0.85,
                vec![
                    Harmonic::new(5.0, 1.0, wave * 0.15),
                    Harmonic::new(9.0, 1.3, uncertainty * 0.1),
                    Harmonic::new(13.0, 0.8, density * 0.08),
                ],
            ),
            QuantumState::Superposition => (
                0.8,
                vec![
                    Harmonic::new(7.0, 1.0, wave * 0.2),
                    Harmonic::new(11.0, 1.7, uncertainty * 0.15),
                    Harmonic::new(17.0, 2.3, density * 0.12),
                    Harmonic::new(3.0, 0.4, 0.1),
                ],
            ),
            QuantumState::Entangled => (
                0.82,
                vec![
                    Harmonic::new(6.0, 1.0, wave * 0.18),
                    Harmonic::new(14.0, 1.9, uncertainty * 0.13),
                    Harmonic::new(19.0, 2.7, density * 0.15),
                ],
            ),
            QuantumState::Collapsed => (
                0.9 + (1.0 - uncertainty) * 0.05,
                vec![Harmonic::new(4.0, 1.0, (1.0 - wave) * 0.1)],
            ),
        }
    }
}

/// Closed field outline whose shape encodes a quantum state.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantumField {
    pub state: QuantumState,
    /// Field density in `[0, 1]`; drives the point count (8..=28).
    pub density: f64,
    /// Wave function complexity in `[0, 1]`.
    pub wave_function: f64,
    /// Random radial jitter in `[0, 1]`.
    pub uncertainty: f64,
    /// Energy level count, used as an angular frequency.
    pub levels: f64,
    pub seed: String,
}

impl Default for QuantumField {
    fn default() -> Self {
        Self {
            state: QuantumState::Superposition,
            density: 0.7,
            wave_function: 0.8,
            uncertainty: 0.4,
            levels: 7.0,
            seed: "quantum-field".to_string(),
        }
    }
}

impl QuantumField {
    pub fn generate_with(&self, rng: &mut Prng, center: Point, radius: f64, phase: f64) -> GeometryPath {
        let radius = sanitize_radius(radius);
        let phase = sanitize(phase);
        let density = unit(self.density, 0.7);
        let wave = unit(self.wave_function, 0.8);
        let uncertainty = unit(self.uncertainty, 0.4);
        let levels = sanitize(self.levels).clamp(1.0, 32.0).round();
        let (base, harmonics) = self.state.harmonics(wave, uncertainty, density);

        let count = point_count(8.0, density, 20.0, true);
        let points = (0..count)
            .map(|i| {
                let angle = i as f64 / count as f64 * TAU;
                let state_term: f64 = harmonics
                    .iter()
                    .map(|h| (angle * h.frequency + phase * h.phase_rate).sin() * h.weight)
                    .sum();
                let staircase = if self.state == QuantumState::Collapsed {
                    ((angle * 8.0 + phase).sin() * 3.0).floor() / 3.0 * uncertainty * 0.08
                } else {
                    0.0
                };
                let field_radius = radius * (base + state_term + staircase);

                let jitter = rng.signed() * uncertainty * 0.1;
                let wave_term = (angle * levels + phase * wave).sin() * wave * 0.08;
                let fluctuation = (angle * 23.0 + phase * 3.1).sin() * density * 0.06;
                let r = (field_radius * (1.0 + jitter + wave_term + fluctuation)).max(0.0);

                let probability = ((angle * 3.0 + phase).sin() * 0.5 + 0.5).powi(2);
                GeometryPoint::polar(center, r, angle)
                    .with_weight(probability)
                    .with_tension(0.5 + wave * 0.5)
                    .tagged(self.state.name())
            })
            .collect();
        GeometryPath::closed(points)
    }
}

impl ShapeGenerator for QuantumField {
    fn generate(&self, center: Point, scale: f64, phase: f64) -> GeometryPath {
        let mut rng = Prng::for_frame(&self.seed, phase);
        self.generate_with(&mut rng, center, scale, phase)
    }
}

// ============================================================================
// Particles
// ============================================================================

/// A round mark with its own opacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Point,
    pub radius: f64,
    pub alpha: f64,
}

/// Orbiting probability blobs. Fully determined by `time`.
pub fn probability_cloud(center: Point, scale: f64, strength: f64, time: f64) -> Vec<Particle> {
    let scale = sanitize_radius(scale);
    let strength = unit(strength, 0.0);
    let time = sanitize(time);
    let count = (strength * 25.0).floor() as usize;
    (0..count)
        .filter_map(|c| {
            let cloud_phase = time * 1.2 + c as f64 * 0.6;
            let life = (cloud_phase.sin() + 1.0) / 2.0;
            if life <= 0.2 {
                return None;
            }
            let angle = c as f64 / count as f64 * TAU + time * 0.4;
            let distance = scale * (0.5 + (cloud_phase * 0.8).sin() * 0.4);
            Some(Particle {
                position: Point::polar(center, distance, angle),
                radius: scale * 0.12 * life * strength,
                alpha: strength * life * 0.3,
            })
        })
        .collect()
}

/// Short-lived particles scattered around `center`, positions drawn from `rng`.
pub fn virtual_particles(rng: &mut Prng, center: Point, scale: f64, strength: f64, time: f64) -> Vec<Particle> {
    let scale = sanitize_radius(scale);
    let strength = unit(strength, 0.0);
    let time = sanitize(time);
    let count = (strength * 15.0).floor() as usize;
    (0..count)
        .filter_map(|v| {
            let dx = rng.signed() * scale * 0.8;
            let dy = rng.signed() * scale * 0.8;
            let life = (time * 4.0 + v as f64 * 0.5).sin().abs();
            (life > 0.1).then(|| Particle {
                position: Point::new(center.x + dx, center.y + dy),
                radius: 0.5 + life * 1.5,
                alpha: strength * life * 0.7,
            })
        })
        .collect()
}

/// Radii of `levels` concentric energy rings inside `radius`.
pub fn energy_level_radii(radius: f64, levels: f64, spacing: f64) -> Vec<f64> {
    let radius = sanitize_radius(radius);
    let levels = sanitize(levels).clamp(0.0, 32.0).round() as usize;
    let spacing = sanitize(spacing).clamp(0.1, 4.0);
    (0..levels)
        .map(|i| radius * (0.2 + 0.8 * (i + 1) as f64 / levels as f64) * (spacing / 1.2).min(1.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: Point = Point::new(256.0, 256.0);

    #[test]
    fn every_state_is_closed_and_finite() {
        for i in 0..5 {
            let field = QuantumField {
                state: QuantumState::from_index(i as f64),
                ..QuantumField::default()
            };
            let path = field.generate(CENTER, 120.0, 2.0);
            assert!(path.closed);
            assert_eq!(path.len(), (8.0 + 0.7 * 20.0f64).floor() as usize);
            assert!(path.is_finite());
            assert!(path.points.iter().all(|p| p.tag == Some(field.state.name())));
        }
    }

    #[test]
    fn same_frame_same_field() {
        let field = QuantumField::default();
        assert_eq!(field.generate(CENTER, 100.0, 0.5), field.generate(CENTER, 100.0, 0.5));
    }

    #[test]
    fn probability_weights_are_unit() {
        let path = QuantumField::default().generate(CENTER, 100.0, 0.0);
        assert!(path.points.iter().all(|p| (0.0..=1.0).contains(&p.weight)));
    }

    #[test]
    fn degenerate_field() {
        let field = QuantumField {
            density: f64::NAN,
            levels: f64::INFINITY,
            uncertainty: 40.0,
            ..QuantumField::default()
        };
        for radius in [0.0, -3.0] {
            let path = field.generate(CENTER, radius, f64::NAN);
            assert!(path.len() >= 3);
            assert!(path.is_finite());
        }
    }

    #[test]
    fn particle_counts_follow_strength() {
        assert!(probability_cloud(CENTER, 100.0, 0.0, 1.0).is_empty());
        assert!(probability_cloud(CENTER, 100.0, 1.0, 1.0).len() <= 25);

        let mut rng = Prng::for_frame("particles", 0.3);
        let particles = virtual_particles(&mut rng, CENTER, 100.0, 0.6, 0.3);
        assert!(particles.len() <= 9);
        for p in particles {
            assert!((p.position.x - CENTER.x).abs() <= 40.0);
            assert!(p.alpha > 0.0);
        }
    }

    #[test]
    fn energy_levels_are_increasing() {
        let radii = energy_level_radii(100.0, 7.0, 1.2);
        assert_eq!(radii.len(), 7);
        assert!(radii.windows(2).all(|w| w[0] < w[1]));
        assert!((radii[6] - 100.0).abs() < 1e-9);
        assert!(energy_level_radii(100.0, f64::NAN, 1.0).is_empty());
    }
}
