//! Rotation and perspective projection for the sprite-rendered sphere.
//!
//! Particles are rotated about X first, then Y, then projected with a fixed
//! perspective distance onto a 2D container. The results are written into a
//! [`SpriteBuffer`] that is allocated once and updated in place every frame.

use crate::color::{Hsl, Srgb};
use crate::particle::Particle;
use glam::{DMat3, DVec2, DVec3, Mat4};
use serde::{Deserialize, Serialize};

/// Orientation as a pair of tilt angles in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub x_deg: f64,
    pub y_deg: f64,
}

impl Rotation {
    pub const IDENTITY: Rotation = Rotation {
        x_deg: 0.0,
        y_deg: 0.0,
    };

    pub fn new(x_deg: f64, y_deg: f64) -> Self {
        Self { x_deg, y_deg }
    }

    /// Adds to both angles.
    pub fn advance(&mut self, dx_deg: f64, dy_deg: f64) {
        self.x_deg += dx_deg;
        self.y_deg += dy_deg;
    }

    /// `Ry * Rx`: applied to a column vector this rotates about X first.
    pub fn matrix(&self) -> DMat3 {
        DMat3::from_rotation_y(self.y_deg.to_radians())
            * DMat3::from_rotation_x(self.x_deg.to_radians())
    }

    pub fn rotate(&self, p: DVec3) -> DVec3 {
        self.matrix() * p
    }

    /// Single-precision model matrix for hosts that transform on the GPU.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_y(self.y_deg.to_radians() as f32)
            * Mat4::from_rotation_x(self.x_deg.to_radians() as f32)
    }
}

/// A rotated point after perspective division.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub screen: DVec2,
    pub scale: f64,
    /// Post-rotation z; larger is farther from the viewer.
    pub depth: f64,
}

/// Fixed-distance perspective onto a container centered at `center`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projector {
    pub perspective: f64,
    pub center: [f64; 2],
}

impl Default for Projector {
    fn default() -> Self {
        Self {
            perspective: 400.0,
            center: [150.0, 150.0],
        }
    }
}

impl Projector {
    /// Projects an already rotated point. Returns `None` when the point is at
    /// or behind the eye (`perspective + z <= 0`).
    pub fn project(&self, p: DVec3) -> Option<Projected> {
        let denom = self.perspective + p.z;
        if denom <= 0.0 {
            return None;
        }
        let scale = self.perspective / denom;
        let center = DVec2::from(self.center);
        Some(Projected {
            screen: center + DVec2::new(p.x, p.y) * scale,
            scale,
            depth: p.z,
        })
    }
}

/// HSL lightness (percent) for a point at post-rotation `depth`; farther is dimmer.
pub fn depth_lightness(depth: f64) -> f64 {
    (75.0 - depth / 4.0).clamp(20.0, 90.0)
}

/// Sprite opacity for a field at `blend`; a fully integrated sphere is opaque.
pub fn blend_opacity(blend: f64) -> f64 {
    0.6 + blend.clamp(0.0, 1.0) * 0.4
}

/// One screen-space primitive per particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: Srgb,
    pub opacity: f64,
    pub glow: bool,
    pub visible: bool,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            size: 0.0,
            color: Srgb::BLACK,
            opacity: 0.0,
            glow: false,
            visible: false,
        }
    }
}

/// Retained sprites, one slot per particle, rewritten in place each frame.
#[derive(Debug, Clone)]
pub struct SpriteBuffer {
    sprites: Vec<Sprite>,
    saturation: f64,
}

impl SpriteBuffer {
    pub fn new(len: usize, saturation: f64) -> Self {
        Self {
            sprites: vec![Sprite::default(); len],
            saturation: saturation.clamp(0.0, 1.0),
        }
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    /// Rotates, projects, and shades every particle into its slot.
    ///
    /// The buffer never changes length; a particle behind the eye keeps its
    /// slot with `visible = false`.
    pub fn update(
        &mut self,
        particles: &[Particle],
        rotation: Rotation,
        projector: &Projector,
        blend: f64,
        glow: bool,
    ) {
        debug_assert_eq!(particles.len(), self.sprites.len());
        let matrix = rotation.matrix();
        let opacity = blend_opacity(blend);
        for (sprite, particle) in self.sprites.iter_mut().zip(particles) {
            match projector.project(matrix * particle.current()) {
                Some(p) => {
                    let lightness = depth_lightness(p.depth) / 100.0;
                    *sprite = Sprite {
                        x: p.screen.x,
                        y: p.screen.y,
                        size: particle.radius() * p.scale,
                        color: Hsl::new(particle.hue(), self.saturation, lightness).into(),
                        opacity,
                        glow,
                        visible: true,
                    };
                }
                None => sprite.visible = false,
            }
        }
    }
}
