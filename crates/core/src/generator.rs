//! Particle field generation: sphere-surface rest positions, scattered
//! positions, visual radii, and hues.
//!
//! Rest positions are deterministic in the particle index and equal-area in
//! the polar angle, so points do not bunch up at the poles. Scattered
//! positions and radii come from the seeded [`Xorshift64`].

use crate::color::HueScheme;
use crate::error::EngineError;
use crate::particle::Particle;
use crate::prng::Xorshift64;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Golden angle in radians, `π (3 - √5)`.
const GOLDEN_ANGLE_RAD: f64 = 2.399_963_229_728_653;

/// How rest positions are laid out over the sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SphereLayout {
    /// `phi = acos(-1 + 2i/N)` with azimuth `sqrt(N π) * phi`: a single
    /// continuous spiral from pole to pole.
    Spiral,
    /// `z = 1 - (2i + 1)/N` with azimuth stepping by the golden angle.
    Fibonacci,
}

impl SphereLayout {
    /// Unit-sphere direction for particle `index` of `count`.
    pub fn direction(self, index: usize, count: usize) -> DVec3 {
        let n = count as f64;
        let i = index as f64;
        let (phi, theta) = match self {
            SphereLayout::Spiral => {
                let phi = (-1.0 + 2.0 * i / n).clamp(-1.0, 1.0).acos();
                (phi, (n * PI).sqrt() * phi)
            }
            SphereLayout::Fibonacci => {
                let z = 1.0 - (2.0 * i + 1.0) / n;
                (z.clamp(-1.0, 1.0).acos(), i * GOLDEN_ANGLE_RAD)
            }
        };
        DVec3::new(theta.cos() * phi.sin(), theta.sin() * phi.sin(), phi.cos())
    }
}

/// The volume scattered positions are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScatterVolume {
    /// Uniform per axis in `[-half_extent, half_extent)` around the origin.
    Cube { half_extent: f64 },
    /// The rest position plus a uniform per-axis offset in `[-half_extent, half_extent)`.
    Jitter { half_extent: f64 },
}

impl ScatterVolume {
    fn half_extent(self) -> f64 {
        match self {
            ScatterVolume::Cube { half_extent } | ScatterVolume::Jitter { half_extent } => {
                half_extent
            }
        }
    }

    fn sample(self, rest: DVec3, rng: &mut Xorshift64) -> DVec3 {
        match self {
            ScatterVolume::Cube { half_extent } => rng.next_in_cube(half_extent),
            ScatterVolume::Jitter { half_extent } => rest + rng.next_in_cube(half_extent),
        }
    }
}

/// Everything needed to build the particles of one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub count: usize,
    pub radius: f64,
    pub layout: SphereLayout,
    pub scatter: ScatterVolume,
    /// Visual radius is drawn uniformly from `[min, max)`; equal bounds give a constant size.
    pub particle_radius: (f64, f64),
    pub hue: HueScheme,
}

impl FieldConfig {
    /// Checks the construction preconditions.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.count == 0 {
            return Err(EngineError::InvalidParticleCount);
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(EngineError::InvalidRadius(self.radius));
        }
        let extent = self.scatter.half_extent();
        if !extent.is_finite() || extent < 0.0 {
            return Err(EngineError::InvalidExtent(format!(
                "scatter half_extent must be finite and non-negative, got {extent}"
            )));
        }
        let (min, max) = self.particle_radius;
        if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
            return Err(EngineError::InvalidExtent(format!(
                "particle radius range [{min}, {max}) is not a valid non-negative range"
            )));
        }
        Ok(())
    }
}

/// Builds the fixed particle sequence for `config`.
///
/// Rest positions and hues depend only on the index. Scatter and radius draws
/// consume `rng` in index order, so a given seed always yields the same field.
pub fn generate(config: &FieldConfig, rng: &mut Xorshift64) -> Result<Vec<Particle>, EngineError> {
    config.validate()?;
    let (radius_min, radius_max) = config.particle_radius;
    let particles = (0..config.count)
        .map(|i| {
            let rest = config.layout.direction(i, config.count) * config.radius;
            let scattered = config.scatter.sample(rest, rng);
            let size = if radius_max > radius_min {
                rng.next_range(radius_min, radius_max)
            } else {
                radius_min
            };
            let hue = config.hue.hue(i, config.count);
            Particle::new(i, rest, scattered, size, hue)
        })
        .collect();
    Ok(particles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(count: usize, layout: SphereLayout) -> FieldConfig {
        FieldConfig {
            count,
            radius: 80.0,
            layout,
            scatter: ScatterVolume::Jitter { half_extent: 50.0 },
            particle_radius: (1.0, 4.0),
            hue: HueScheme::GoldenAngle,
        }
    }

    #[test]
    fn zero_count_fails_fast() {
        let mut rng = Xorshift64::new(1);
        let result = generate(&config(0, SphereLayout::Spiral), &mut rng);
        assert!(matches!(result, Err(EngineError::InvalidParticleCount)));
    }

    #[test]
    fn non_positive_radius_fails_fast() {
        let mut rng = Xorshift64::new(1);
        for radius in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let cfg = FieldConfig {
                radius,
                ..config(10, SphereLayout::Spiral)
            };
            assert!(
                matches!(generate(&cfg, &mut rng), Err(EngineError::InvalidRadius(_))),
                "radius {radius} accepted"
            );
        }
    }

    #[test]
    fn bad_extent_or_radius_range_fails_fast() {
        let mut rng = Xorshift64::new(1);
        let cfg = FieldConfig {
            scatter: ScatterVolume::Cube { half_extent: -1.0 },
            ..config(10, SphereLayout::Fibonacci)
        };
        assert!(matches!(
            generate(&cfg, &mut rng),
            Err(EngineError::InvalidExtent(_))
        ));
        let cfg = FieldConfig {
            particle_radius: (4.0, 1.0),
            ..config(10, SphereLayout::Fibonacci)
        };
        assert!(matches!(
            generate(&cfg, &mut rng),
            Err(EngineError::InvalidExtent(_))
        ));
    }

    #[test]
    fn generates_requested_count_with_stable_indices() {
        let mut rng = Xorshift64::new(42);
        let particles = generate(&config(150, SphereLayout::Spiral), &mut rng).unwrap();
        assert_eq!(particles.len(), 150);
        for (i, p) in particles.iter().enumerate() {
            assert_eq!(p.index(), i);
        }
    }

    #[test]
    fn mean_distance_from_center_equals_radius() {
        for layout in [SphereLayout::Spiral, SphereLayout::Fibonacci] {
            let mut rng = Xorshift64::new(9);
            let cfg = FieldConfig {
                radius: 1.5,
                ..config(1000, layout)
            };
            let particles = generate(&cfg, &mut rng).unwrap();
            let mean = particles.iter().map(|p| p.rest().length()).sum::<f64>() / 1000.0;
            assert!((mean - 1.5).abs() < 1e-9, "{layout:?}: mean distance {mean}");
            for p in &particles {
                assert!((p.rest().length() - 1.5).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn polar_bands_have_near_uniform_density() {
        // Equal-height z bands have equal area on a sphere.
        const BANDS: usize = 10;
        for layout in [SphereLayout::Spiral, SphereLayout::Fibonacci] {
            let mut rng = Xorshift64::new(3);
            let cfg = FieldConfig {
                radius: 1.0,
                ..config(1000, layout)
            };
            let particles = generate(&cfg, &mut rng).unwrap();
            let mut counts = [0usize; BANDS];
            for p in &particles {
                let band = (((p.rest().z + 1.0) / 2.0) * BANDS as f64) as usize;
                counts[band.min(BANDS - 1)] += 1;
            }
            let expected = 1000.0 / BANDS as f64;
            for (band, &count) in counts.iter().enumerate() {
                assert!(
                    (count as f64) <= expected * 1.5,
                    "{layout:?}: band {band} holds {count}, expected about {expected}"
                );
                assert!(count > 0, "{layout:?}: band {band} is empty");
            }
        }
    }

    #[test]
    fn cube_scatter_stays_inside_extent() {
        let mut rng = Xorshift64::new(5);
        let cfg = FieldConfig {
            scatter: ScatterVolume::Cube { half_extent: 6.0 },
            ..config(3000, SphereLayout::Fibonacci)
        };
        for p in generate(&cfg, &mut rng).unwrap() {
            assert!(p.scattered().abs().max_element() <= 6.0);
        }
    }

    #[test]
    fn jitter_scatter_stays_near_rest() {
        let mut rng = Xorshift64::new(5);
        for p in generate(&config(150, SphereLayout::Spiral), &mut rng).unwrap() {
            let offset = p.scattered() - p.rest();
            assert!(offset.abs().max_element() <= 50.0 + 1e-9, "offset {offset:?}");
        }
    }

    #[test]
    fn visual_radius_within_range_and_constant_when_degenerate() {
        let mut rng = Xorshift64::new(11);
        for p in generate(&config(200, SphereLayout::Spiral), &mut rng).unwrap() {
            assert!((1.0..4.0).contains(&p.radius()));
        }
        let cfg = FieldConfig {
            particle_radius: (0.03, 0.03),
            ..config(20, SphereLayout::Fibonacci)
        };
        for p in generate(&cfg, &mut rng).unwrap() {
            assert_eq!(p.radius(), 0.03);
        }
    }

    #[test]
    fn same_seed_same_field() {
        let cfg = config(100, SphereLayout::Spiral);
        let a = generate(&cfg, &mut Xorshift64::new(77)).unwrap();
        let b = generate(&cfg, &mut Xorshift64::new(77)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn hue_ignores_seed() {
        let cfg = config(50, SphereLayout::Spiral);
        let a = generate(&cfg, &mut Xorshift64::new(1)).unwrap();
        let b = generate(&cfg, &mut Xorshift64::new(2)).unwrap();
        for (pa, pb) in a.iter().zip(b.iter()) {
            assert_eq!(pa.hue().to_bits(), pb.hue().to_bits());
        }
    }

    #[test]
    fn single_particle_field_is_valid() {
        for layout in [SphereLayout::Spiral, SphereLayout::Fibonacci] {
            let mut rng = Xorshift64::new(1);
            let particles = generate(&config(1, layout), &mut rng).unwrap();
            assert!(particles[0].rest().is_finite());
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn rest_positions_lie_on_sphere(
                count in 1_usize..2000,
                radius in 0.01_f64..500.0,
                fibonacci: bool,
            ) {
                let layout = if fibonacci { SphereLayout::Fibonacci } else { SphereLayout::Spiral };
                let cfg = FieldConfig { radius, ..config(count, layout) };
                let particles = generate(&cfg, &mut Xorshift64::new(1)).unwrap();
                for p in &particles {
                    prop_assert!((p.rest().length() - radius).abs() < radius * 1e-9);
                }
            }
        }
    }
}
