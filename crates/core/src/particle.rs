//! A single point of a sphere visualization.

use glam::DVec3;

/// One particle of a [`SphereField`](crate::field::SphereField).
///
/// `rest` and `scattered` are fixed at construction and only readable from
/// outside the crate. `current` is derived every tick from the field's blend.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    index: usize,
    rest: DVec3,
    scattered: DVec3,
    pub(crate) current: DVec3,
    radius: f64,
    hue: f64,
}

impl Particle {
    pub(crate) fn new(index: usize, rest: DVec3, scattered: DVec3, radius: f64, hue: f64) -> Self {
        Self {
            index,
            rest,
            scattered,
            current: scattered,
            radius,
            hue,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Position on the sphere surface (the integrated state).
    pub fn rest(&self) -> DVec3 {
        self.rest
    }

    /// Position in the scatter volume (the disintegrated state).
    pub fn scattered(&self) -> DVec3 {
        self.scattered
    }

    /// Position as of the last recomposition.
    pub fn current(&self) -> DVec3 {
        self.current
    }

    /// Visual radius before perspective scaling.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Hue in degrees, fixed per index.
    pub fn hue(&self) -> f64 {
        self.hue
    }

    /// Where this particle sits at `blend` (0 = scattered, 1 = rest).
    ///
    /// Exact at both ends: `blend == 0` returns `scattered` and `blend == 1`
    /// returns `rest` bit for bit.
    pub fn position_at(&self, blend: f64) -> DVec3 {
        if blend <= 0.0 {
            self.scattered
        } else if blend >= 1.0 {
            self.rest
        } else {
            self.scattered + (self.rest - self.scattered) * blend
        }
    }
}
