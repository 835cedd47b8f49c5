//! Hover-reactive sphere drawn as individual screen-space sprites.
//!
//! A few hundred particles start scattered around the sphere surface. While
//! the pointer hovers, they ease together into the sphere and the spin speeds
//! up; on leave they drift apart again. Blend follows exponential smoothing.

use crate::color::HueScheme;
use crate::engine::{check_time_step, Frame, Visualization};
use crate::error::EngineError;
use crate::field::SphereField;
use crate::generator::{FieldConfig, ScatterVolume, SphereLayout};
use crate::interaction::{HoverController, PointerEvent};
use crate::params::{integer_schema, number_schema, param_f64, param_f64_clamped, param_usize};
use crate::projection::{Projector, SpriteBuffer};
use crate::transition::TransitionLaw;
use serde_json::{json, Value};

const DEFAULT_COUNT: usize = 150;
const DEFAULT_RADIUS: f64 = 80.0;
const DEFAULT_SCATTER: f64 = 50.0;
const DEFAULT_PARTICLE_MIN: f64 = 1.0;
const DEFAULT_PARTICLE_MAX: f64 = 4.0;
const DEFAULT_SMOOTHING: f64 = 0.05;
const DEFAULT_SPEED_SMOOTHING: f64 = 0.1;
const DEFAULT_IDLE_SPEED: f64 = 1.0;
const DEFAULT_HOVER_SPEED: f64 = 3.0;
const DEFAULT_PERSPECTIVE: f64 = 400.0;
const DEFAULT_CONTAINER: f64 = 300.0;
const DEFAULT_SATURATION: f64 = 0.7;
/// 0.5 degrees per frame at 60 Hz.
const DEFAULT_SPIN_X: f64 = 30.0;
/// 0.8 degrees per frame at 60 Hz.
const DEFAULT_SPIN_Y: f64 = 48.0;

/// Tunable settings for [`SpriteSphere`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteSphereParams {
    pub count: usize,
    pub radius: f64,
    /// Half-width of the per-axis jitter applied to scattered positions.
    pub scatter: f64,
    pub particle_min: f64,
    pub particle_max: f64,
    pub smoothing: f64,
    pub speed_smoothing: f64,
    pub idle_speed: f64,
    pub hover_speed: f64,
    pub perspective: f64,
    /// Side of the square container, in pixels.
    pub container: f64,
    pub saturation: f64,
    /// Base spin about X, degrees per second at speed 1.
    pub spin_x: f64,
    /// Base spin about Y, degrees per second at speed 1.
    pub spin_y: f64,
}

impl Default for SpriteSphereParams {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            radius: DEFAULT_RADIUS,
            scatter: DEFAULT_SCATTER,
            particle_min: DEFAULT_PARTICLE_MIN,
            particle_max: DEFAULT_PARTICLE_MAX,
            smoothing: DEFAULT_SMOOTHING,
            speed_smoothing: DEFAULT_SPEED_SMOOTHING,
            idle_speed: DEFAULT_IDLE_SPEED,
            hover_speed: DEFAULT_HOVER_SPEED,
            perspective: DEFAULT_PERSPECTIVE,
            container: DEFAULT_CONTAINER,
            saturation: DEFAULT_SATURATION,
            spin_x: DEFAULT_SPIN_X,
            spin_y: DEFAULT_SPIN_Y,
        }
    }
}

impl SpriteSphereParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    pub fn from_json(params: &Value) -> Self {
        Self {
            count: param_usize(params, "count", DEFAULT_COUNT),
            radius: param_f64(params, "radius", DEFAULT_RADIUS),
            scatter: param_f64(params, "scatter", DEFAULT_SCATTER),
            particle_min: param_f64(params, "particle_min", DEFAULT_PARTICLE_MIN),
            particle_max: param_f64(params, "particle_max", DEFAULT_PARTICLE_MAX),
            smoothing: param_f64_clamped(params, "smoothing", DEFAULT_SMOOTHING, 0.0, 1.0),
            speed_smoothing: param_f64_clamped(
                params,
                "speed_smoothing",
                DEFAULT_SPEED_SMOOTHING,
                0.0,
                1.0,
            ),
            idle_speed: param_f64(params, "idle_speed", DEFAULT_IDLE_SPEED),
            hover_speed: param_f64(params, "hover_speed", DEFAULT_HOVER_SPEED),
            perspective: param_f64(params, "perspective", DEFAULT_PERSPECTIVE),
            container: param_f64(params, "container", DEFAULT_CONTAINER),
            saturation: param_f64_clamped(params, "saturation", DEFAULT_SATURATION, 0.0, 1.0),
            spin_x: param_f64(params, "spin_x", DEFAULT_SPIN_X),
            spin_y: param_f64(params, "spin_y", DEFAULT_SPIN_Y),
        }
    }

    fn field_config(&self) -> FieldConfig {
        FieldConfig {
            count: self.count,
            radius: self.radius,
            layout: SphereLayout::Spiral,
            scatter: ScatterVolume::Jitter {
                half_extent: self.scatter,
            },
            particle_radius: (self.particle_min, self.particle_max),
            hue: HueScheme::GoldenAngle,
        }
    }
}

/// Sprite-rendered sphere that integrates while hovered.
pub struct SpriteSphere {
    field: SphereField,
    hover: HoverController,
    projector: Projector,
    sprites: SpriteBuffer,
    params: SpriteSphereParams,
}

impl SpriteSphere {
    /// Builds the field scattered, with sprites already projected for the first frame.
    pub fn new(seed: u64, params: SpriteSphereParams) -> Result<Self, EngineError> {
        if !params.perspective.is_finite() || params.perspective <= 0.0 {
            return Err(EngineError::InvalidExtent(format!(
                "perspective must be finite and positive, got {}",
                params.perspective
            )));
        }
        if !params.container.is_finite() || params.container <= 0.0 {
            return Err(EngineError::InvalidExtent(format!(
                "container must be finite and positive, got {}",
                params.container
            )));
        }
        let field = SphereField::new(
            &params.field_config(),
            TransitionLaw::smoothing(params.smoothing),
            0.0,
            seed,
        )?;
        let half = params.container / 2.0;
        let projector = Projector {
            perspective: params.perspective,
            center: [half, half],
        };
        let mut sphere = Self {
            sprites: SpriteBuffer::new(field.len(), params.saturation),
            hover: HoverController::new(
                params.idle_speed,
                params.hover_speed,
                params.speed_smoothing,
            ),
            field,
            projector,
            params,
        };
        sphere.refresh_sprites();
        Ok(sphere)
    }

    /// Creates a sprite sphere from a JSON params object.
    pub fn from_json(seed: u64, json_params: &Value) -> Result<Self, EngineError> {
        Self::new(seed, SpriteSphereParams::from_json(json_params))
    }

    pub fn hovered(&self) -> bool {
        self.hover.hovered()
    }

    pub fn sprites(&self) -> &SpriteBuffer {
        &self.sprites
    }

    fn refresh_sprites(&mut self) {
        self.sprites.update(
            self.field.particles(),
            self.field.rotation(),
            &self.projector,
            self.field.blend(),
            self.hover.glow(),
        );
    }
}

impl Visualization for SpriteSphere {
    fn tick(&mut self, dt: f64) -> Result<(), EngineError> {
        check_time_step(dt)?;
        self.hover.step(dt);
        self.field.set_speed(self.hover.speed());
        let speed = self.field.speed();
        self.field
            .rotate(self.params.spin_x * speed * dt, self.params.spin_y * speed * dt);
        self.field.advance(dt);
        self.refresh_sprites();
        Ok(())
    }

    fn handle_pointer(&mut self, event: PointerEvent) {
        if let Some(target) = self.hover.handle(event) {
            self.field.set_target(target);
        }
    }

    fn frame(&self) -> Frame<'_> {
        Frame::Sprites {
            sprites: self.sprites.sprites(),
            viewport: [self.params.container, self.params.container],
        }
    }

    fn params(&self) -> Value {
        let p = &self.params;
        json!({
            "count": p.count,
            "radius": p.radius,
            "scatter": p.scatter,
            "particle_min": p.particle_min,
            "particle_max": p.particle_max,
            "smoothing": p.smoothing,
            "speed_smoothing": p.speed_smoothing,
            "idle_speed": p.idle_speed,
            "hover_speed": p.hover_speed,
            "perspective": p.perspective,
            "container": p.container,
            "saturation": p.saturation,
            "spin_x": p.spin_x,
            "spin_y": p.spin_y,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "count": integer_schema(DEFAULT_COUNT, 1, 2000, "Number of particles"),
            "radius": number_schema(DEFAULT_RADIUS, 1.0, 140.0, "Sphere radius in pixels"),
            "scatter": number_schema(DEFAULT_SCATTER, 0.0, 200.0, "Per-axis jitter of the scattered state"),
            "particle_min": number_schema(DEFAULT_PARTICLE_MIN, 0.0, 20.0, "Smallest sprite radius"),
            "particle_max": number_schema(DEFAULT_PARTICLE_MAX, 0.0, 20.0, "Largest sprite radius (exclusive)"),
            "smoothing": number_schema(DEFAULT_SMOOTHING, 0.0, 1.0, "Share of the blend gap closed per 60 Hz frame"),
            "speed_smoothing": number_schema(DEFAULT_SPEED_SMOOTHING, 0.0, 1.0, "Share of the speed gap closed per 60 Hz frame"),
            "idle_speed": number_schema(DEFAULT_IDLE_SPEED, 0.0, 10.0, "Spin multiplier without hover"),
            "hover_speed": number_schema(DEFAULT_HOVER_SPEED, 0.0, 10.0, "Spin multiplier while hovered"),
            "perspective": number_schema(DEFAULT_PERSPECTIVE, 1.0, 5000.0, "Perspective distance"),
            "container": number_schema(DEFAULT_CONTAINER, 1.0, 4096.0, "Container side in pixels"),
            "saturation": number_schema(DEFAULT_SATURATION, 0.0, 1.0, "Sprite color saturation"),
            "spin_x": number_schema(DEFAULT_SPIN_X, -720.0, 720.0, "Base spin about X in degrees per second"),
            "spin_y": number_schema(DEFAULT_SPIN_Y, -720.0, 720.0, "Base spin about Y in degrees per second"),
        })
    }

    fn field(&self) -> Option<&SphereField> {
        Some(&self.field)
    }
}
