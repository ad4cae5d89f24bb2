//! Quantum field: a state-shaped field body with energy orbits and particles.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use super::{seed_definition, Frame, Preset};
use crate::color::{Color, ColorPalette};
use crate::compositing::{Compositor, Pass};
use crate::geometry::field::{energy_level_radii, probability_cloud, virtual_particles, QuantumField, QuantumState};
use crate::geometry::{trace_smooth, Point, DEFAULT_SMOOTHING};
use crate::overlay::{
    paint_fill, paint_stroke, FillStyle, UniversalStyle, BACKGROUND_GRADIENT_DIRECTION, BACKGROUND_GRADIENT_END,
    BACKGROUND_GRADIENT_START, BACKGROUND_TYPE, FILL_GRADIENT_DIRECTION, FILL_GRADIENT_END, FILL_GRADIENT_START,
    FILL_TYPE, STROKE_COLOR, STROKE_OPACITY,
};
use crate::params::{Category, ParameterDefinition, ParameterSchema, ResolvedParams};
use crate::surface::{GradientStop, Paint, RenderContext, Scoped};

/// Reference canvas size for `amplitude`.
const REFERENCE_SIZE: f64 = 380.0;
const ORBIT_STEP: f64 = 0.1;
const FIELD_LINE_SEGMENTS: usize = 8;

/// Energy colors for one frame. The palette carries the field (primary),
/// high (secondary), low (accent) and quantum (highlight) tones.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spectrum {
    hue: f64,
    palette: ColorPalette,
    probability: Color,
    virtual_tone: Color,
}

impl Spectrum {
    fn at(hue: f64, width: f64, glow: f64, time: f64) -> Self {
        let hue = hue + (time * 0.8).sin() * width * 0.3;
        let glow = glow * 80.0;
        Self {
            hue,
            palette: ColorPalette {
                primary: Color::from_hsl(hue, 70.0, 60.0 + glow * 0.3),
                secondary: Color::from_hsl(hue + width * 0.3, 80.0, 70.0 + glow * 0.4),
                accent: Color::from_hsl(hue - width * 0.3, 60.0, 50.0 + glow * 0.2),
                highlight: Color::from_hsl(hue + width * 0.6, 90.0, 80.0 + glow * 0.2),
            },
            probability: Color::from_hsl(hue - width * 0.5, 60.0, 65.0),
            virtual_tone: Color::from_hsl(hue + width * 0.8, 85.0, 85.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuantumFieldPreset {
    schema: ParameterSchema,
}

impl Default for QuantumFieldPreset {
    fn default() -> Self {
        Self::new()
    }
}

impl QuantumFieldPreset {
    pub fn new() -> Self {
        use Category::{Animation, Background, Color as Colors, Effects, Fill, Geometry, Stroke};

        let slider = ParameterDefinition::slider;
        let schema = ParameterSchema::new()
            .with("seed", seed_definition("quantum-field-research"))
            .with("frequency", slider("Quantum Frequency", 1.8, 0.8, 3.0, 0.1).in_category(Animation))
            .with("amplitude", slider("Field Amplitude", 160.0, 90.0, 220.0, 5.0).in_category(Geometry))
            .with(
                "quantumState",
                slider(
                    "Quantum State (0=Ground, 1=Excited, 2=Superposition, 3=Entangled, 4=Collapsed)",
                    2.0,
                    0.0,
                    4.0,
                    1.0,
                )
                .in_category(Geometry),
            )
            .with("fieldDensity", slider("Field Density", 0.7, 0.4, 1.0, 0.05).in_category(Geometry))
            .with("waveFunction", slider("Wave Function Complexity", 0.8, 0.3, 1.0, 0.05).in_category(Geometry))
            .with("uncertainty", slider("Heisenberg Uncertainty", 0.4, 0.2, 0.8, 0.05).in_category(Geometry))
            .with("superposition", slider("Superposition State", 0.6, 0.0, 1.0, 0.05).in_category(Fill))
            .with("energyLevels", slider("Energy Level Count", 7.0, 3.0, 12.0, 1.0).in_category(Stroke))
            .with("energySpacing", slider("Level Spacing", 1.2, 0.5, 2.0, 0.1).in_category(Stroke))
            .with("quantumJumps", slider("Quantum Jump Rate", 0.4, 0.0, 1.0, 0.05).in_category(Animation))
            .with("probabilityCloud", slider("Probability Cloud", 0.6, 0.2, 1.0, 0.05).in_category(Effects))
            .with("fieldLines", slider("Field Line Visibility", 0.7, 0.3, 1.0, 0.05).in_category(Effects))
            .with("virtualParticles", slider("Virtual Particles", 0.3, 0.0, 0.6, 0.05).in_category(Effects))
            .with("energySpectrum", slider("Energy Spectrum Hue", 240.0, 0.0, 360.0, 20.0).in_category(Colors))
            .with("spectralWidth", slider("Spectral Range", 60.0, 30.0, 120.0, 10.0).in_category(Colors))
            .with("quantumGlow", slider("Quantum Luminescence", 0.8, 0.4, 1.0, 0.05).in_category(Effects))
            .with(
                BACKGROUND_TYPE,
                ParameterDefinition::select(
                    "Background Type",
                    "gradient",
                    &[
                        ("none", "None"),
                        ("transparent", "Transparent"),
                        ("solid", "Solid Color"),
                        ("gradient", "Gradient"),
                    ],
                )
                .in_category(Background),
            )
            .with(BACKGROUND_GRADIENT_START, ParameterDefinition::color("Gradient Start", "#0a0a12").in_category(Background))
            .with(BACKGROUND_GRADIENT_END, ParameterDefinition::color("Gradient End", "#000000").in_category(Background))
            .with(BACKGROUND_GRADIENT_DIRECTION, slider("Gradient Direction", 90.0, 0.0, 360.0, 15.0).in_category(Background))
            .with(
                FILL_TYPE,
                ParameterDefinition::select(
                    "Fill Type",
                    "gradient",
                    &[("none", "None"), ("solid", "Solid Color"), ("gradient", "Gradient")],
                )
                .in_category(Fill),
            )
            .with(FILL_GRADIENT_START, ParameterDefinition::color("Gradient Start", "auto").in_category(Fill))
            .with(FILL_GRADIENT_END, ParameterDefinition::color("Gradient End", "auto").in_category(Fill))
            .with(FILL_GRADIENT_DIRECTION, slider("Gradient Direction", 135.0, 0.0, 360.0, 15.0).in_category(Fill))
            .with(STROKE_COLOR, ParameterDefinition::color("Stroke Color", "auto").in_category(Stroke))
            .with(STROKE_OPACITY, slider("Stroke Opacity", 0.8, 0.0, 1.0, 0.05).in_category(Stroke));

        Self { schema }
    }
}

struct Orbit {
    points: Vec<Point>,
    color: Color,
    active: bool,
    jump: Point,
}

/// Concentric energy orbits, each wobbling with the field.
fn orbits(center: Point, scale: f64, params: &ResolvedParams, hue: f64, time: f64) -> Vec<Orbit> {
    let jumps = params.number("quantumJumps");
    let radii = energy_level_radii(scale, params.number("energyLevels"), params.number("energySpacing"));
    let levels = radii.len();
    let steps = (TAU / ORBIT_STEP).ceil() as usize;
    radii
        .into_iter()
        .enumerate()
        .map(|(level, radius)| {
            let energy = level as f64 / levels as f64;
            let active = (time * 3.0 + level as f64 * 0.7).sin() > 1.0 - jumps * 2.0;
            let points = (0..steps)
                .map(|s| {
                    let angle = s as f64 * ORBIT_STEP;
                    let r = radius * (1.0 + (angle * 7.0 + time * 2.0).sin() * 0.05);
                    Point::polar(center, r, angle)
                })
                .collect();
            Orbit {
                points,
                color: Color::from_hsl(hue + level as f64 * 15.0, 70.0, 60.0 + energy * 30.0),
                active: active && jumps > 0.2,
                jump: Point::polar(center, radius, time * 4.0 + level as f64),
            }
        })
        .collect()
}

/// Wavy field lines radiating from `center`.
fn field_lines(center: Point, scale: f64, visibility: f64, wave: f64) -> Vec<(Vec<Point>, f64)> {
    let count = (visibility * wave * 12.0).floor().max(0.0) as usize;
    (0..count)
        .map(|l| {
            let angle = l as f64 / count as f64 * TAU;
            let strength = 0.5 + (angle * 7.0).sin() * 0.5;
            let end = Point::polar(center, scale * strength, angle);
            let normal = angle + FRAC_PI_2;
            let mut points = vec![center];
            points.extend((1..=FIELD_LINE_SEGMENTS).map(|s| {
                let t = s as f64 / FIELD_LINE_SEGMENTS as f64;
                let along = center.lerp(end, t);
                let offset = (t * PI * 4.0 + angle * 3.0).sin() * wave * 5.0;
                Point::polar(along, offset, normal)
            }));
            (points, strength)
        })
        .collect()
}

fn polyline(ctx: &mut dyn RenderContext, points: &[Point]) {
    ctx.begin_path();
    if let Some((first, rest)) = points.split_first() {
        ctx.move_to(first.x, first.y);
        for p in rest {
            ctx.line_to(p.x, p.y);
        }
    }
}

impl Preset for QuantumFieldPreset {
    fn id(&self) -> &str {
        "quantum-field"
    }

    fn name(&self) -> &str {
        "Quantum Field"
    }

    fn description(&self) -> &str {
        "Abstract quantum physics visualization with probability clouds and energy levels"
    }

    fn parameters(&self) -> &ParameterSchema {
        &self.schema
    }

    fn draw(&self, ctx: &mut dyn RenderContext, width: f64, height: f64, params: &ResolvedParams, time: f64) {
        let Frame {
            center,
            size,
            mut rng,
            ..
        } = Frame::begin(ctx, width, height, params, time);
        let time = if time.is_finite() { time } else { 0.0 };

        let uncertainty = params.number("uncertainty");
        let wave = params.number("waveFunction");
        let phase = time * params.number("frequency") * 2.0;
        let scale = params.number("amplitude") * size / REFERENCE_SIZE;
        let radius = scale * (1.0 + phase.sin() * uncertainty * 0.1);

        let field = QuantumField {
            state: QuantumState::from_index(params.number("quantumState")),
            density: params.number("fieldDensity"),
            wave_function: wave,
            uncertainty,
            levels: params.number("energyLevels"),
            seed: params.text("seed").to_string(),
        };
        let path = field.generate_with(&mut rng, center, radius, phase);
        let bounds = path.bounds();
        let focus = bounds.center();

        let spectrum = Spectrum::at(
            params.number("energySpectrum"),
            params.number("spectralWidth"),
            params.number("quantumGlow"),
            time,
        );
        let palette = spectrum.palette;
        let style = UniversalStyle::from_params(params, &palette);

        let mut passes = Compositor::new();

        let cloud_strength = params.number("probabilityCloud");
        let cloud = probability_cloud(center, scale, cloud_strength, time);
        let probability = spectrum.probability;
        passes.add_if(Pass::Glow, cloud_strength, 0.2, move |ctx| {
            for particle in &cloud {
                let mut ctx = Scoped::new(ctx);
                let alpha = ctx.global_alpha() * particle.alpha;
                ctx.set_global_alpha(alpha);
                ctx.set_fill(Paint::radial(
                    particle.position,
                    0.0,
                    particle.radius,
                    vec![
                        GradientStop::new(0.0, probability),
                        GradientStop::new(0.7, palette.primary),
                        GradientStop::new(1.0, Color::TRANSPARENT),
                    ],
                ));
                ctx.begin_path();
                ctx.circle(particle.position.x, particle.position.y, particle.radius);
                ctx.fill();
            }
        });

        let visibility = params.number("fieldLines");
        let lines = field_lines(focus, scale, visibility, wave);
        passes.add_if(Pass::Glow, visibility, 0.3, move |ctx| {
            ctx.set_stroke(Paint::Solid(palette.primary));
            let base = ctx.global_alpha();
            for (points, strength) in &lines {
                ctx.set_global_alpha(base * visibility * strength * 0.6);
                ctx.set_line_width(0.5 + strength * 1.5);
                polyline(ctx, points);
                ctx.stroke();
            }
        });

        if !style.fill.is_none() {
            let path = &path;
            let fill = FillStyle {
                opacity: style.fill.opacity * (0.6 + params.number("superposition").clamp(0.0, 1.0) * 0.4),
                ..style.fill
            };
            passes.add(Pass::Fill, move |ctx| {
                trace_smooth(ctx, path, DEFAULT_SMOOTHING);
                paint_fill(ctx, &bounds, &fill);
            });
        }

        let path = &path;
        let stroke = style.stroke;
        passes.add(Pass::Stroke, move |ctx| {
            trace_smooth(ctx, path, DEFAULT_SMOOTHING);
            paint_stroke(ctx, &bounds, &stroke);
        });

        let orbits = orbits(focus, scale, params, spectrum.hue, time);
        passes.add(Pass::Stroke, move |ctx| {
            let base = ctx.global_alpha();
            for orbit in &orbits {
                ctx.set_global_alpha(base * if orbit.active { 0.8 } else { 0.3 });
                ctx.set_stroke(Paint::Solid(orbit.color));
                ctx.set_line_width(if orbit.active { 2.0 } else { 1.0 });
                polyline(ctx, &orbit.points);
                ctx.close_path();
                ctx.stroke();
            }
            ctx.set_fill(Paint::Solid(palette.highlight));
            for orbit in orbits.iter().filter(|o| o.active) {
                ctx.begin_path();
                ctx.circle(orbit.jump.x, orbit.jump.y, 2.0);
                ctx.fill();
            }
        });

        let strength = params.number("virtualParticles");
        let particles = virtual_particles(&mut rng, focus, scale, strength, time);
        let tone = spectrum.virtual_tone;
        passes.add_if(Pass::Highlight, strength, 0.1, move |ctx| {
            ctx.set_fill(Paint::Solid(tone));
            let base = ctx.global_alpha();
            for particle in &particles {
                ctx.set_global_alpha(base * particle.alpha);
                ctx.begin_path();
                ctx.circle(particle.position.x, particle.position.y, particle.radius);
                ctx.fill();
            }
        });

        passes.run(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ParamMap, ParamValue};
    use crate::surface::{DrawCall, RecordingContext};

    fn resolved(overrides: &[(&str, ParamValue)]) -> ResolvedParams {
        let overrides: ParamMap = overrides.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        QuantumFieldPreset::new().resolve(&overrides)
    }

    fn render(overrides: &[(&str, ParamValue)], time: f64) -> RecordingContext {
        let mut ctx = RecordingContext::new();
        QuantumFieldPreset::new().draw(&mut ctx, 380.0, 380.0, &resolved(overrides), time);
        ctx
    }

    #[test]
    fn one_orbit_per_energy_level() {
        let params = resolved(&[("energyLevels", 5.0.into())]);
        let orbits = orbits(Point::new(0.0, 0.0), 100.0, &params, 240.0, 0.0);
        assert_eq!(orbits.len(), 5);
        assert!(orbits.iter().all(|o| o.points.len() == 63));
    }

    #[test]
    fn jumps_need_a_rate() {
        let params = resolved(&[("quantumJumps", 0.0.into())]);
        let orbits = orbits(Point::new(0.0, 0.0), 100.0, &params, 240.0, 1.0);
        assert!(orbits.iter().all(|o| !o.active));
    }

    #[test]
    fn field_lines_scale_with_visibility() {
        let center = Point::new(0.0, 0.0);
        assert_eq!(field_lines(center, 100.0, 1.0, 1.0).len(), 12);
        assert_eq!(field_lines(center, 100.0, 0.5, 0.5).len(), 3);
        assert!(field_lines(center, 100.0, 0.0, 1.0).is_empty());
    }

    #[test]
    fn spectrum_drifts_over_time() {
        let still = Spectrum::at(240.0, 60.0, 0.8, 0.0);
        let later = Spectrum::at(240.0, 60.0, 0.8, 2.0);
        assert_eq!(still.hue, 240.0);
        assert_ne!(still.palette.primary, later.palette.primary);
    }

    #[test]
    fn body_uses_overlay_gradient() {
        let ctx = render(&[], 0.0);
        let linear = ctx.count(|c| matches!(c, DrawCall::SetFill(Paint::Linear { .. })));
        // background and body
        assert_eq!(linear, 2);
    }

    #[test]
    fn fill_type_none_drops_body() {
        let with_body = render(&[], 0.0);
        let without = render(&[("fillType", "none".into())], 0.0);
        assert_eq!(with_body.paint_count(), without.paint_count() + 1);
    }

    #[test]
    fn virtual_particles_are_optional() {
        let none = render(&[("virtualParticles", 0.0.into())], 0.7);
        let some = render(&[("virtualParticles", 0.6.into())], 0.7);
        assert!(some.paint_count() > none.paint_count());
    }

    #[test]
    fn states_shape_the_field() {
        let ground = render(&[("quantumState", 0.0.into())], 0.3);
        let excited = render(&[("quantumState", 1.0.into())], 0.3);
        assert_ne!(ground.calls(), excited.calls());
        assert_eq!(ground.depth(), 0);
    }
}
