//! Click-to-disintegrate sphere rendered as a single point cloud.
//!
//! Thousands of points start assembled on the sphere. Each press toggles
//! between integrating and disintegrating on a fixed-duration ramp that starts
//! at the press; dragging rotates the cloud, otherwise it drifts slowly.
//! Positions and colors are dense `f32` buffers the host uploads as-is;
//! rotation is exposed as a model matrix for the host's camera pipeline.

use crate::color::{Hsl, HueScheme, Srgb};
use crate::engine::{check_time_step, Frame, Visualization};
use crate::error::EngineError;
use crate::field::SphereField;
use crate::generator::{FieldConfig, ScatterVolume, SphereLayout};
use crate::interaction::{DragController, PointerEvent};
use crate::params::{
    integer_schema, number_schema, param_bool, param_f64, param_f64_clamped, param_usize,
};
use crate::transition::TransitionLaw;
use serde_json::{json, Value};

const DEFAULT_COUNT: usize = 3000;
const DEFAULT_RADIUS: f64 = 1.5;
const DEFAULT_SCATTER: f64 = 6.0;
const DEFAULT_POINT_SIZE: f64 = 0.03;
const DEFAULT_OPACITY: f64 = 0.9;
const DEFAULT_RAMP_SECONDS: f64 = 2.0;
/// 0.1 rad/s.
const DEFAULT_DRIFT_X: f64 = 5.729_577_951_308_232;
/// 0.2 rad/s.
const DEFAULT_DRIFT_Y: f64 = 11.459_155_902_616_464;
/// 0.01 rad per pixel of pointer travel.
const DEFAULT_DRAG_SENSITIVITY: f64 = 0.572_957_795_130_823_2;
const DEFAULT_HUE_START: f64 = 0.5;
const DEFAULT_HUE_SPAN: f64 = 0.3;
const DEFAULT_SATURATION: f64 = 0.8;
const DEFAULT_LIGHTNESS: f64 = 0.6;

/// Tunable settings for [`PointCloudSphere`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointCloudParams {
    pub count: usize,
    pub radius: f64,
    /// Half-width of the cube scattered points are drawn from.
    pub scatter: f64,
    pub point_size: f64,
    pub opacity: f64,
    pub ramp_seconds: f64,
    /// Idle rotation about X, degrees per second.
    pub drift_x: f64,
    /// Idle rotation about Y, degrees per second.
    pub drift_y: f64,
    /// Degrees of rotation per pixel dragged.
    pub drag_sensitivity: f64,
    pub hue_start: f64,
    pub hue_span: f64,
    pub saturation: f64,
    pub lightness: f64,
    pub start_integrated: bool,
}

impl Default for PointCloudParams {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            radius: DEFAULT_RADIUS,
            scatter: DEFAULT_SCATTER,
            point_size: DEFAULT_POINT_SIZE,
            opacity: DEFAULT_OPACITY,
            ramp_seconds: DEFAULT_RAMP_SECONDS,
            drift_x: DEFAULT_DRIFT_X,
            drift_y: DEFAULT_DRIFT_Y,
            drag_sensitivity: DEFAULT_DRAG_SENSITIVITY,
            hue_start: DEFAULT_HUE_START,
            hue_span: DEFAULT_HUE_SPAN,
            saturation: DEFAULT_SATURATION,
            lightness: DEFAULT_LIGHTNESS,
            start_integrated: true,
        }
    }
}

impl PointCloudParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    pub fn from_json(params: &Value) -> Self {
        Self {
            count: param_usize(params, "count", DEFAULT_COUNT),
            radius: param_f64(params, "radius", DEFAULT_RADIUS),
            scatter: param_f64(params, "scatter", DEFAULT_SCATTER),
            point_size: param_f64(params, "point_size", DEFAULT_POINT_SIZE),
            opacity: param_f64_clamped(params, "opacity", DEFAULT_OPACITY, 0.0, 1.0),
            ramp_seconds: param_f64(params, "ramp_seconds", DEFAULT_RAMP_SECONDS),
            drift_x: param_f64(params, "drift_x", DEFAULT_DRIFT_X),
            drift_y: param_f64(params, "drift_y", DEFAULT_DRIFT_Y),
            drag_sensitivity: param_f64(params, "drag_sensitivity", DEFAULT_DRAG_SENSITIVITY),
            hue_start: param_f64(params, "hue_start", DEFAULT_HUE_START),
            hue_span: param_f64(params, "hue_span", DEFAULT_HUE_SPAN),
            saturation: param_f64_clamped(params, "saturation", DEFAULT_SATURATION, 0.0, 1.0),
            lightness: param_f64_clamped(params, "lightness", DEFAULT_LIGHTNESS, 0.0, 1.0),
            start_integrated: param_bool(params, "start_integrated", true),
        }
    }

    fn field_config(&self) -> FieldConfig {
        FieldConfig {
            count: self.count,
            radius: self.radius,
            layout: SphereLayout::Fibonacci,
            scatter: ScatterVolume::Cube {
                half_extent: self.scatter,
            },
            particle_radius: (self.point_size, self.point_size),
            hue: HueScheme::Band {
                start: self.hue_start,
                span: self.hue_span,
            },
        }
    }
}

/// Point-cloud sphere toggled by pointer presses.
pub struct PointCloudSphere {
    field: SphereField,
    drag: DragController,
    positions: Vec<f32>,
    colors: Vec<f32>,
    params: PointCloudParams,
}

impl PointCloudSphere {
    pub fn new(seed: u64, params: PointCloudParams) -> Result<Self, EngineError> {
        if !params.ramp_seconds.is_finite() || params.ramp_seconds < 0.0 {
            return Err(EngineError::InvalidExtent(format!(
                "ramp_seconds must be finite and non-negative, got {}",
                params.ramp_seconds
            )));
        }
        let initial = if params.start_integrated { 1.0 } else { 0.0 };
        let field = SphereField::new(
            &params.field_config(),
            TransitionLaw::ramp(params.ramp_seconds),
            initial,
            seed,
        )?;
        let colors = field
            .particles()
            .iter()
            .flat_map(|p| {
                Srgb::from(Hsl::new(p.hue(), params.saturation, params.lightness)).to_f32_array()
            })
            .collect();
        let drag = if params.start_integrated {
            DragController::new()
        } else {
            DragController::disintegrated()
        };
        let mut cloud = Self {
            positions: vec![0.0; field.len() * 3],
            field,
            drag,
            colors,
            params,
        };
        cloud.write_positions();
        Ok(cloud)
    }

    /// Creates a point-cloud sphere from a JSON params object.
    pub fn from_json(seed: u64, json_params: &Value) -> Result<Self, EngineError> {
        Self::new(seed, PointCloudParams::from_json(json_params))
    }

    pub fn disintegrating(&self) -> bool {
        self.drag.disintegrating()
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    fn write_positions(&mut self) {
        for (slot, particle) in self
            .positions
            .chunks_exact_mut(3)
            .zip(self.field.particles())
        {
            slot.copy_from_slice(&particle.current().as_vec3().to_array());
        }
    }
}

impl Visualization for PointCloudSphere {
    fn tick(&mut self, dt: f64) -> Result<(), EngineError> {
        check_time_step(dt)?;
        let delta = self.drag.take_drag();
        let sensitivity = self.params.drag_sensitivity;
        self.field.rotate(delta.y * sensitivity, delta.x * sensitivity);
        if !self.drag.dragging() {
            self.field
                .rotate(self.params.drift_x * dt, self.params.drift_y * dt);
        }
        self.field.advance(dt);
        self.write_positions();
        Ok(())
    }

    fn handle_pointer(&mut self, event: PointerEvent) {
        if let Some(target) = self.drag.handle(event) {
            self.field.set_target(target);
        }
    }

    fn frame(&self) -> Frame<'_> {
        Frame::PointCloud {
            positions: &self.positions,
            colors: &self.colors,
            point_size: self.params.point_size as f32,
            opacity: self.params.opacity as f32,
            model: self.field.rotation().model_matrix(),
        }
    }

    fn params(&self) -> Value {
        let p = &self.params;
        json!({
            "count": p.count,
            "radius": p.radius,
            "scatter": p.scatter,
            "point_size": p.point_size,
            "opacity": p.opacity,
            "ramp_seconds": p.ramp_seconds,
            "drift_x": p.drift_x,
            "drift_y": p.drift_y,
            "drag_sensitivity": p.drag_sensitivity,
            "hue_start": p.hue_start,
            "hue_span": p.hue_span,
            "saturation": p.saturation,
            "lightness": p.lightness,
            "start_integrated": p.start_integrated,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "count": integer_schema(DEFAULT_COUNT, 1, 100_000, "Number of points"),
            "radius": number_schema(DEFAULT_RADIUS, 0.01, 100.0, "Sphere radius in world units"),
            "scatter": number_schema(DEFAULT_SCATTER, 0.0, 100.0, "Half-width of the scatter cube"),
            "point_size": number_schema(DEFAULT_POINT_SIZE, 0.001, 1.0, "Point size in world units"),
            "opacity": number_schema(DEFAULT_OPACITY, 0.0, 1.0, "Point opacity"),
            "ramp_seconds": number_schema(DEFAULT_RAMP_SECONDS, 0.0, 30.0, "Duration of one integrate or disintegrate ramp"),
            "drift_x": number_schema(DEFAULT_DRIFT_X, -360.0, 360.0, "Idle rotation about X in degrees per second"),
            "drift_y": number_schema(DEFAULT_DRIFT_Y, -360.0, 360.0, "Idle rotation about Y in degrees per second"),
            "drag_sensitivity": number_schema(DEFAULT_DRAG_SENSITIVITY, 0.0, 10.0, "Degrees of rotation per dragged pixel"),
            "hue_start": number_schema(DEFAULT_HUE_START, 0.0, 1.0, "First hue as a fraction of the wheel"),
            "hue_span": number_schema(DEFAULT_HUE_SPAN, 0.0, 1.0, "Hue range swept across the points"),
            "saturation": number_schema(DEFAULT_SATURATION, 0.0, 1.0, "Point color saturation"),
            "lightness": number_schema(DEFAULT_LIGHTNESS, 0.0, 1.0, "Point color lightness"),
            "start_integrated": {
                "type": "boolean",
                "default": true,
                "description": "Whether the cloud starts assembled"
            },
        })
    }

    fn field(&self) -> Option<&SphereField> {
        Some(&self.field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::TransitionPhase;

    const FRAME: f64 = 1.0 / 60.0;

    fn small(seed: u64) -> PointCloudSphere {
        let params = PointCloudParams {
            count: 300,
            ..Default::default()
        };
        PointCloudSphere::new(seed, params).unwrap()
    }

    fn press(viz: &mut PointCloudSphere) {
        viz.handle_pointer(PointerEvent::Down { x: 0.0, y: 0.0 });
        viz.handle_pointer(PointerEvent::Up);
    }

    #[test]
    fn buffers_are_dense_and_start_on_the_sphere() {
        let viz = small(1);
        assert_eq!(viz.positions().len(), 900);
        assert_eq!(viz.colors().len(), 900);
        for chunk in viz.positions().chunks_exact(3) {
            let r = (chunk[0] * chunk[0] + chunk[1] * chunk[1] + chunk[2] * chunk[2]).sqrt();
            assert!((r - 1.5).abs() < 1e-4, "radius {r}");
        }
    }

    #[test]
    fn default_cloud_has_three_thousand_points() {
        let viz = PointCloudSphere::new(1, PointCloudParams::default()).unwrap();
        assert_eq!(viz.field().unwrap().len(), 3000);
    }

    #[test]
    fn press_disintegrates_over_the_ramp() {
        let mut viz = small(2);
        // Let the clock run first so the ramp start is not at zero.
        for _ in 0..37 {
            viz.tick(FRAME).unwrap();
        }
        press(&mut viz);
        assert!(viz.disintegrating());
        let field = viz.field().unwrap();
        assert_eq!(field.target(), 0.0);
        assert_eq!(field.phase(), TransitionPhase::Scattering);

        for _ in 0..60 {
            viz.tick(FRAME).unwrap();
        }
        let halfway = viz.field().unwrap().blend();
        assert!((halfway - 0.5).abs() < 1e-6, "blend after 1 s: {halfway}");

        for _ in 0..61 {
            viz.tick(FRAME).unwrap();
        }
        let field = viz.field().unwrap();
        assert_eq!(field.blend(), 0.0);
        for p in field.particles() {
            assert_eq!(p.current(), p.scattered());
        }
    }

    #[test]
    fn second_press_reassembles() {
        let mut viz = small(3);
        press(&mut viz);
        for _ in 0..150 {
            viz.tick(FRAME).unwrap();
        }
        press(&mut viz);
        assert!(!viz.disintegrating());
        for _ in 0..150 {
            viz.tick(FRAME).unwrap();
        }
        assert_eq!(viz.field().unwrap().blend(), 1.0);
    }

    #[test]
    fn idle_drift_rotates_with_time() {
        let mut viz = small(4);
        viz.tick(1.0).unwrap();
        let r = viz.field().unwrap().rotation();
        assert!((r.x_deg - DEFAULT_DRIFT_X).abs() < 1e-9);
        assert!((r.y_deg - DEFAULT_DRIFT_Y).abs() < 1e-9);
    }

    #[test]
    fn drag_rotates_by_pointer_delta_not_time() {
        let mut viz = small(5);
        viz.handle_pointer(PointerEvent::Down { x: 0.0, y: 0.0 });
        viz.handle_pointer(PointerEvent::Move {
            x: 10.0,
            y: -4.0,
            dx: 10.0,
            dy: -4.0,
        });
        viz.tick(1.0).unwrap();
        let r = viz.field().unwrap().rotation();
        assert!((r.y_deg - 10.0 * DEFAULT_DRAG_SENSITIVITY).abs() < 1e-9);
        assert!((r.x_deg + 4.0 * DEFAULT_DRAG_SENSITIVITY).abs() < 1e-9);

        // No further movement: a held pointer does not keep spinning.
        viz.tick(1.0).unwrap();
        assert_eq!(viz.field().unwrap().rotation(), r);
    }

    #[test]
    fn colors_are_deterministic_and_seed_independent() {
        let a = small(10);
        let b = small(11);
        assert_eq!(a.colors(), b.colors());
    }

    #[test]
    fn model_matrix_tracks_rotation() {
        let mut viz = small(6);
        viz.tick(0.5).unwrap();
        match viz.frame() {
            Frame::PointCloud { model, .. } => {
                assert_eq!(model, viz.field().unwrap().rotation().model_matrix());
            }
            other => panic!("unexpected frame {other:?}"),
        }
    }

    #[test]
    fn starting_scattered_assembles_on_first_press() {
        let params = PointCloudParams {
            count: 50,
            start_integrated: false,
            ..Default::default()
        };
        let mut viz = PointCloudSphere::new(1, params).unwrap();
        assert_eq!(viz.field().unwrap().blend(), 0.0);
        press(&mut viz);
        assert_eq!(viz.field().unwrap().target(), 1.0);
    }

    #[test]
    fn negative_ramp_is_rejected() {
        let params = PointCloudParams {
            ramp_seconds: -1.0,
            ..Default::default()
        };
        assert!(PointCloudSphere::new(1, params).is_err());
    }
}
