//! Field state for one sphere visualization.
//!
//! A [`SphereField`] owns a fixed-length particle buffer plus the scalar
//! state that drives it: blend, blend target, rotation, speed multiplier,
//! and an elapsed-time clock. Every [`advance`](SphereField::advance)
//! recomposes all particles; there are no partial updates.

use crate::error::EngineError;
use crate::generator::{generate, FieldConfig};
use crate::particle::Particle;
use crate::prng::Xorshift64;
use crate::projection::Rotation;
use crate::transition::{BlendEngine, TransitionLaw, TransitionPhase};
use glam::DVec3;
use tracing::debug;

/// Particles plus the animation state of one visualization.
#[derive(Debug, Clone)]
pub struct SphereField {
    particles: Vec<Particle>,
    blend: BlendEngine,
    rotation: Rotation,
    speed: f64,
    clock: f64,
}

impl SphereField {
    /// Generates particles from `config` and recomposes them at `initial_blend`.
    pub fn new(
        config: &FieldConfig,
        law: TransitionLaw,
        initial_blend: f64,
        seed: u64,
    ) -> Result<Self, EngineError> {
        let mut rng = Xorshift64::new(seed);
        let particles = generate(config, &mut rng)?;
        debug!(
            count = particles.len(),
            layout = ?config.layout,
            ?law,
            "sphere field created"
        );
        Ok(Self::from_particles(particles, law, initial_blend))
    }

    /// Builds a field from explicit rest and scattered positions.
    ///
    /// All particles get radius 1 and hue 0. Returns
    /// `EngineError::InvalidParticleCount` if the lists are empty or differ in length.
    pub fn from_positions(
        rest: &[DVec3],
        scattered: &[DVec3],
        law: TransitionLaw,
        initial_blend: f64,
    ) -> Result<Self, EngineError> {
        if rest.is_empty() || rest.len() != scattered.len() {
            return Err(EngineError::InvalidParticleCount);
        }
        let particles = rest
            .iter()
            .zip(scattered)
            .enumerate()
            .map(|(i, (&r, &s))| Particle::new(i, r, s, 1.0, 0.0))
            .collect();
        Ok(Self::from_particles(particles, law, initial_blend))
    }

    fn from_particles(particles: Vec<Particle>, law: TransitionLaw, initial_blend: f64) -> Self {
        let mut field = Self {
            particles,
            blend: BlendEngine::new(law, initial_blend),
            rotation: Rotation::IDENTITY,
            speed: 1.0,
            clock: 0.0,
        };
        field.recompose();
        field
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn blend(&self) -> f64 {
        self.blend.blend()
    }

    pub fn target(&self) -> f64 {
        self.blend.target()
    }

    pub fn phase(&self) -> TransitionPhase {
        self.blend.phase()
    }

    pub fn law(&self) -> TransitionLaw {
        self.blend.law()
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Seconds of animation this field has run.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn set_target(&mut self, target: f64) {
        self.blend.set_target(target, self.clock);
    }

    /// Forces the blend and recomposes immediately.
    pub fn set_blend(&mut self, blend: f64) {
        self.blend.set_blend(blend, self.clock);
        self.recompose();
    }

    /// Sets the speed multiplier; negative values are treated as 0.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = if speed.is_nan() { 0.0 } else { speed.max(0.0) };
    }

    pub fn rotate(&mut self, dx_deg: f64, dy_deg: f64) {
        self.rotation.advance(dx_deg, dy_deg);
    }

    /// Advances the clock and blend by `dt` seconds, then recomposes every particle.
    pub fn advance(&mut self, dt: f64) {
        self.clock += dt;
        self.blend.step(self.clock, dt);
        self.recompose();
    }

    fn recompose(&mut self) {
        recompose(&mut self.particles, self.blend.blend());
    }
}

/// Writes `current = lerp(scattered, rest, blend)` for every particle.
pub fn recompose(particles: &mut [Particle], blend: f64) {
    for p in particles.iter_mut() {
        p.current = p.position_at(blend);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::HueScheme;
    use crate::generator::{ScatterVolume, SphereLayout};

    const FRAME: f64 = 1.0 / 60.0;

    fn sprite_config() -> FieldConfig {
        FieldConfig {
            count: 150,
            radius: 80.0,
            layout: SphereLayout::Spiral,
            scatter: ScatterVolume::Jitter { half_extent: 50.0 },
            particle_radius: (1.0, 4.0),
            hue: HueScheme::GoldenAngle,
        }
    }

    fn cardinal_field(law: TransitionLaw) -> SphereField {
        let rest = [
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(-1.0, 0.0, 0.0),
            DVec3::new(0.0, -1.0, 0.0),
        ];
        let scattered = [
            DVec3::new(3.0, 2.0, -1.0),
            DVec3::new(-2.0, 4.0, 0.5),
            DVec3::new(0.0, -3.0, 2.0),
            DVec3::new(5.0, 5.0, 5.0),
        ];
        SphereField::from_positions(&rest, &scattered, law, 0.0).unwrap()
    }

    #[test]
    fn invalid_config_fails_fast() {
        let cfg = FieldConfig {
            count: 0,
            ..sprite_config()
        };
        assert!(matches!(
            SphereField::new(&cfg, TransitionLaw::smoothing(0.05), 0.0, 1),
            Err(EngineError::InvalidParticleCount)
        ));
    }

    #[test]
    fn mismatched_positions_are_rejected() {
        let result = SphereField::from_positions(
            &[DVec3::X],
            &[DVec3::X, DVec3::Y],
            TransitionLaw::ramp(1.0),
            0.0,
        );
        assert!(result.is_err());
        assert!(SphereField::from_positions(&[], &[], TransitionLaw::ramp(1.0), 0.0).is_err());
    }

    #[test]
    fn blend_zero_is_scattered_and_one_is_rest_exactly() {
        let mut field =
            SphereField::new(&sprite_config(), TransitionLaw::smoothing(0.05), 0.0, 42).unwrap();
        for p in field.particles() {
            assert_eq!(p.current(), p.scattered());
        }
        field.set_blend(1.0);
        for p in field.particles() {
            assert_eq!(p.current(), p.rest());
        }
    }

    #[test]
    fn current_lies_on_segment_between_scattered_and_rest() {
        let mut field =
            SphereField::new(&sprite_config(), TransitionLaw::smoothing(0.05), 0.0, 7).unwrap();
        for step in 0..=20 {
            let blend = step as f64 / 20.0;
            field.set_blend(blend);
            for p in field.particles() {
                let (s, r, c) = (p.scattered(), p.rest(), p.current());
                for axis in 0..3 {
                    let lo = s[axis].min(r[axis]) - 1e-9;
                    let hi = s[axis].max(r[axis]) + 1e-9;
                    assert!((lo..=hi).contains(&c[axis]), "axis {axis} off segment");
                    let expected = s[axis] + (r[axis] - s[axis]) * blend;
                    assert!((c[axis] - expected).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn cardinal_scenario_converges_linearly_over_ten_steps() {
        let mut field = cardinal_field(TransitionLaw::smoothing(0.05));
        let mut previous: Vec<f64> = field
            .particles()
            .iter()
            .map(|p| p.current().distance(p.rest()))
            .collect();
        for tick in 1..=10 {
            field.set_blend(tick as f64 * 0.1);
            for (p, prev) in field.particles().iter().zip(previous.iter_mut()) {
                let remaining = p.current().distance(p.rest());
                let total = p.scattered().distance(p.rest());
                let expected = total * (1.0 - field.blend());
                assert!((remaining - expected).abs() < 1e-9, "tick {tick}");
                assert!(remaining <= *prev + 1e-12);
                *prev = remaining;
            }
        }
        for p in field.particles() {
            assert!(p.current().distance(p.rest()) < 1e-9);
        }
    }

    #[test]
    fn cardinal_scenario_under_one_second_ramp() {
        let mut field = cardinal_field(TransitionLaw::ramp(1.0));
        field.set_target(1.0);
        for tick in 1..=10 {
            field.advance(0.1);
            assert!((field.blend() - tick as f64 * 0.1).abs() < 1e-9, "tick {tick}");
        }
        assert_eq!(field.blend(), 1.0);
        for p in field.particles() {
            assert_eq!(p.current(), p.rest());
        }
    }

    #[test]
    fn leaving_while_integrated_settles_near_scattered() {
        let mut field =
            SphereField::new(&sprite_config(), TransitionLaw::smoothing(0.05), 1.0, 3).unwrap();
        field.set_target(0.0);
        assert_eq!(field.target(), 0.0);
        for _ in 0..120 {
            field.advance(FRAME);
        }
        assert!(field.blend() < 0.01, "blend {}", field.blend());
    }

    #[test]
    fn advance_never_touches_rest_or_scattered() {
        let mut field =
            SphereField::new(&sprite_config(), TransitionLaw::smoothing(0.05), 0.0, 5).unwrap();
        let before: Vec<(DVec3, DVec3)> = field
            .particles()
            .iter()
            .map(|p| (p.rest(), p.scattered()))
            .collect();
        field.set_target(1.0);
        for _ in 0..50 {
            field.advance(FRAME);
        }
        for (p, (rest, scattered)) in field.particles().iter().zip(before) {
            assert_eq!(p.rest(), rest);
            assert_eq!(p.scattered(), scattered);
        }
        assert_eq!(field.len(), 150);
    }

    #[test]
    fn speed_is_never_negative() {
        let mut field = cardinal_field(TransitionLaw::ramp(1.0));
        field.set_speed(-3.0);
        assert_eq!(field.speed(), 0.0);
        field.set_speed(f64::NAN);
        assert_eq!(field.speed(), 0.0);
        field.set_speed(3.0);
        assert_eq!(field.speed(), 3.0);
    }

    #[test]
    fn clock_accumulates() {
        let mut field = cardinal_field(TransitionLaw::ramp(1.0));
        field.advance(0.25);
        field.advance(0.5);
        assert!((field.clock() - 0.75).abs() < 1e-12);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn recompose_matches_per_particle_lerp(seed: u64, blend in 0.0_f64..=1.0) {
                let mut field = SphereField::new(
                    &sprite_config(),
                    TransitionLaw::smoothing(0.05),
                    0.0,
                    seed,
                ).unwrap();
                field.set_blend(blend);
                for p in field.particles() {
                    prop_assert_eq!(p.current(), p.position_at(blend));
                }
            }
        }
    }
}
