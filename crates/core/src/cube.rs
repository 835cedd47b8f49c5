//! A solid cube whose spin follows the pointer.
//!
//! The pointer's offset from the container center picks the rotation
//! velocity: farther from center spins faster, and hovering raises both the
//! base rate and the boost. Velocity is kept in degrees per 60 Hz frame.

use crate::engine::{check_time_step, Frame, Visualization};
use crate::error::EngineError;
use crate::interaction::PointerEvent;
use crate::params::{number_schema, param_f64};
use crate::projection::Rotation;
use crate::transition::REFERENCE_FPS;
use glam::DVec2;
use serde_json::{json, Value};

const DEFAULT_CONTAINER: f64 = 200.0;
const DEFAULT_IDLE_BASE: f64 = 0.35;
const DEFAULT_IDLE_BOOST: f64 = 0.4;
const DEFAULT_HOVER_BASE: f64 = 0.9;
const DEFAULT_HOVER_BOOST: f64 = 1.1;
const DEFAULT_VELOCITY_X: f64 = 0.2;
const DEFAULT_VELOCITY_Y: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeParams {
    /// Side of the square container, in pixels.
    pub container: f64,
    pub idle_base: f64,
    pub idle_boost: f64,
    pub hover_base: f64,
    pub hover_boost: f64,
    pub velocity_x: f64,
    pub velocity_y: f64,
}

impl Default for CubeParams {
    fn default() -> Self {
        Self {
            container: DEFAULT_CONTAINER,
            idle_base: DEFAULT_IDLE_BASE,
            idle_boost: DEFAULT_IDLE_BOOST,
            hover_base: DEFAULT_HOVER_BASE,
            hover_boost: DEFAULT_HOVER_BOOST,
            velocity_x: DEFAULT_VELOCITY_X,
            velocity_y: DEFAULT_VELOCITY_Y,
        }
    }
}

impl CubeParams {
    pub fn from_json(params: &Value) -> Self {
        Self {
            container: param_f64(params, "container", DEFAULT_CONTAINER),
            idle_base: param_f64(params, "idle_base", DEFAULT_IDLE_BASE),
            idle_boost: param_f64(params, "idle_boost", DEFAULT_IDLE_BOOST),
            hover_base: param_f64(params, "hover_base", DEFAULT_HOVER_BASE),
            hover_boost: param_f64(params, "hover_boost", DEFAULT_HOVER_BOOST),
            velocity_x: param_f64(params, "velocity_x", DEFAULT_VELOCITY_X),
            velocity_y: param_f64(params, "velocity_y", DEFAULT_VELOCITY_Y),
        }
    }
}

/// `+1` for zero so a centered pointer still spins the cube.
fn sign(v: f64) -> f64 {
    if v < 0.0 {
        -1.0
    } else {
        1.0
    }
}

pub struct SpinningCube {
    rotation: Rotation,
    /// Degrees per reference frame about x and y.
    velocity: DVec2,
    hovered: bool,
    params: CubeParams,
}

impl SpinningCube {
    pub fn new(params: CubeParams) -> Result<Self, EngineError> {
        if !params.container.is_finite() || params.container <= 0.0 {
            return Err(EngineError::InvalidExtent(format!(
                "container must be positive, got {}",
                params.container
            )));
        }
        Ok(Self {
            rotation: Rotation::IDENTITY,
            velocity: DVec2::new(params.velocity_x, params.velocity_y),
            hovered: false,
            params,
        })
    }

    pub fn from_json(json_params: &Value) -> Result<Self, EngineError> {
        Self::new(CubeParams::from_json(json_params))
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn velocity(&self) -> DVec2 {
        self.velocity
    }

    pub fn hovered(&self) -> bool {
        self.hovered
    }

    /// Retargets the velocity from a pointer at `(x, y)` in container coordinates.
    /// Non-finite coordinates are ignored.
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        if !(x.is_finite() && y.is_finite()) {
            return;
        }
        let half = self.params.container / 2.0;
        let n = ((DVec2::new(x, y) - DVec2::splat(half)) / half).clamp(-DVec2::ONE, DVec2::ONE);
        let (base, boost) = if self.hovered {
            (self.params.hover_base, self.params.hover_boost)
        } else {
            (self.params.idle_base, self.params.idle_boost)
        };
        self.velocity = DVec2::new(
            -(base + n.y.abs() * boost) * sign(n.y),
            (base + n.x.abs() * boost) * sign(n.x),
        );
    }
}

impl Visualization for SpinningCube {
    fn tick(&mut self, dt: f64) -> Result<(), EngineError> {
        check_time_step(dt)?;
        let frames = dt * REFERENCE_FPS;
        self.rotation
            .advance(self.velocity.x * frames, self.velocity.y * frames);
        Ok(())
    }

    fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Enter => self.hovered = true,
            PointerEvent::Leave => self.hovered = false,
            PointerEvent::Move { x, y, .. } => self.pointer_moved(x, y),
            PointerEvent::Down { .. } | PointerEvent::Up => {}
        }
    }

    fn frame(&self) -> Frame<'_> {
        Frame::Transform {
            rotation: self.rotation,
            glow: self.hovered,
        }
    }

    fn params(&self) -> Value {
        let p = &self.params;
        json!({
            "container": p.container,
            "idle_base": p.idle_base,
            "idle_boost": p.idle_boost,
            "hover_base": p.hover_base,
            "hover_boost": p.hover_boost,
            "velocity_x": p.velocity_x,
            "velocity_y": p.velocity_y,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "container": number_schema(DEFAULT_CONTAINER, 10.0, 4000.0, "Container side in pixels"),
            "idle_base": number_schema(DEFAULT_IDLE_BASE, 0.0, 10.0, "Minimum spin in degrees per frame when not hovered"),
            "idle_boost": number_schema(DEFAULT_IDLE_BOOST, 0.0, 10.0, "Extra spin at the container edge when not hovered"),
            "hover_base": number_schema(DEFAULT_HOVER_BASE, 0.0, 10.0, "Minimum spin in degrees per frame while hovered"),
            "hover_boost": number_schema(DEFAULT_HOVER_BOOST, 0.0, 10.0, "Extra spin at the container edge while hovered"),
            "velocity_x": number_schema(DEFAULT_VELOCITY_X, -10.0, 10.0, "Initial spin about X in degrees per frame"),
            "velocity_y": number_schema(DEFAULT_VELOCITY_Y, -10.0, 10.0, "Initial spin about Y in degrees per frame"),
        })
    }
}
