#![deny(unsafe_code)]
//! Visualization registry: maps names to implementations and provides
//! CPU-side snapshot rendering.
//!
//! This crate sits between `particle-sphere-core` (which defines the
//! `Visualization` trait and its implementations) and the CLI, so dispatch by
//! name lives in one place.

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use particle_sphere_core::error::EngineError;
use particle_sphere_core::field::SphereField;
use particle_sphere_core::interaction::PointerEvent;
use particle_sphere_core::{Frame, PointCloudSphere, SpinningCube, SpriteSphere, Visualization};
use serde_json::Value;

/// All available visualization names.
const VISUALIZATION_NAMES: &[&str] = &["sprite-sphere", "point-cloud-sphere", "cube"];

/// Enumeration of all available visualizations.
///
/// Wraps each implementation and delegates `Visualization` trait methods.
/// Use [`VisualizationKind::from_name`] for string-based construction.
pub enum VisualizationKind {
    /// Hover-to-integrate sprite sphere.
    SpriteSphere(SpriteSphere),
    /// Click-to-disintegrate point cloud.
    PointCloudSphere(PointCloudSphere),
    /// Pointer-following spinning cube.
    Cube(SpinningCube),
}

impl VisualizationKind {
    /// Constructs a visualization by name.
    ///
    /// Returns `EngineError::UnknownVisualization` if the name is not recognized.
    pub fn from_name(name: &str, seed: u64, params: &Value) -> Result<Self, EngineError> {
        match name {
            "sprite-sphere" => Ok(VisualizationKind::SpriteSphere(SpriteSphere::from_json(
                seed, params,
            )?)),
            "point-cloud-sphere" => Ok(VisualizationKind::PointCloudSphere(
                PointCloudSphere::from_json(seed, params)?,
            )),
            "cube" => Ok(VisualizationKind::Cube(SpinningCube::from_json(params)?)),
            _ => Err(EngineError::UnknownVisualization(name.to_string())),
        }
    }

    /// Returns a slice of all recognized visualization names.
    pub fn list_visualizations() -> &'static [&'static str] {
        VISUALIZATION_NAMES
    }

    pub fn name(&self) -> &'static str {
        match self {
            VisualizationKind::SpriteSphere(_) => "sprite-sphere",
            VisualizationKind::PointCloudSphere(_) => "point-cloud-sphere",
            VisualizationKind::Cube(_) => "cube",
        }
    }

    /// Rotation of whatever the visualization draws, in degrees.
    pub fn rotation(&self) -> particle_sphere_core::Rotation {
        match self {
            VisualizationKind::Cube(v) => v.rotation(),
            other => other
                .field()
                .map(SphereField::rotation)
                .unwrap_or_default(),
        }
    }
}

impl Visualization for VisualizationKind {
    fn tick(&mut self, dt: f64) -> Result<(), EngineError> {
        match self {
            VisualizationKind::SpriteSphere(v) => v.tick(dt),
            VisualizationKind::PointCloudSphere(v) => v.tick(dt),
            VisualizationKind::Cube(v) => v.tick(dt),
        }
    }

    fn handle_pointer(&mut self, event: PointerEvent) {
        match self {
            VisualizationKind::SpriteSphere(v) => v.handle_pointer(event),
            VisualizationKind::PointCloudSphere(v) => v.handle_pointer(event),
            VisualizationKind::Cube(v) => v.handle_pointer(event),
        }
    }

    fn frame(&self) -> Frame<'_> {
        match self {
            VisualizationKind::SpriteSphere(v) => v.frame(),
            VisualizationKind::PointCloudSphere(v) => v.frame(),
            VisualizationKind::Cube(v) => v.frame(),
        }
    }

    fn params(&self) -> Value {
        match self {
            VisualizationKind::SpriteSphere(v) => v.params(),
            VisualizationKind::PointCloudSphere(v) => v.params(),
            VisualizationKind::Cube(v) => v.params(),
        }
    }

    fn param_schema(&self) -> Value {
        match self {
            VisualizationKind::SpriteSphere(v) => v.param_schema(),
            VisualizationKind::PointCloudSphere(v) => v.param_schema(),
            VisualizationKind::Cube(v) => v.param_schema(),
        }
    }

    fn field(&self) -> Option<&SphereField> {
        match self {
            VisualizationKind::SpriteSphere(v) => v.field(),
            VisualizationKind::PointCloudSphere(v) => v.field(),
            VisualizationKind::Cube(v) => v.field(),
        }
    }
}
