#![deny(unsafe_code)]
//! Core types and traits for the particle-sphere visualizations.
//!
//! Provides the particle data model (`Particle`, `SphereField`), the field
//! generator, blend laws (`TransitionLaw`, `BlendEngine`), rotation and
//! perspective projection, pointer controllers, the object-safe
//! `Visualization` trait with its three implementations, the `Mount` frame
//! loop over a host `Surface`, the `Xorshift64` PRNG, `Seed`, and parameter
//! helpers.

pub mod color;
pub mod cube;
pub mod engine;
pub mod error;
pub mod field;
pub mod frame_loop;
pub mod generator;
pub mod interaction;
pub mod params;
pub mod particle;
pub mod point_cloud;
pub mod prng;
pub mod projection;
pub mod seed;
pub mod sprite_sphere;
pub mod transition;

pub use color::{HueScheme, Srgb};
pub use cube::{CubeParams, SpinningCube};
pub use engine::{Frame, Visualization};
pub use error::EngineError;
pub use field::SphereField;
pub use frame_loop::{FrameId, HeadlessSurface, ListenerId, Mount, Surface};
pub use generator::{generate, FieldConfig, ScatterVolume, SphereLayout};
pub use interaction::PointerEvent;
pub use particle::Particle;
pub use point_cloud::{PointCloudParams, PointCloudSphere};
pub use prng::Xorshift64;
pub use projection::{Projector, Rotation, Sprite};
pub use seed::Seed;
pub use sprite_sphere::{SpriteSphere, SpriteSphereParams};
pub use transition::{BlendEngine, TransitionLaw, TransitionPhase};
