//! The `Visualization` trait every animated component implements, and the
//! [`Frame`] it hands to the rendering surface.
//!
//! The trait is object-safe so the registry and the frame loop can drive any
//! component as `dyn Visualization`.

use crate::error::EngineError;
use crate::field::SphereField;
use crate::interaction::PointerEvent;
use crate::projection::{Rotation, Sprite};
use glam::Mat4;
use serde_json::Value;

/// What a visualization wants drawn this frame.
#[derive(Debug, Clone, Copy)]
pub enum Frame<'a> {
    /// Screen-space sprites inside a `viewport` sized container.
    Sprites {
        sprites: &'a [Sprite],
        viewport: [f64; 2],
    },
    /// Interleaved xyz positions and rgb colors, one entry per point, in model
    /// space. The host applies `model` and its own camera.
    PointCloud {
        positions: &'a [f32],
        colors: &'a [f32],
        point_size: f32,
        opacity: f32,
        model: Mat4,
    },
    /// A solid object that only needs its orientation updated.
    Transform { rotation: Rotation, glow: bool },
}

/// An animated component driven by a per-frame callback.
pub trait Visualization {
    /// Advances the animation by `dt` seconds.
    ///
    /// Returns `EngineError::InvalidTimeStep` if `dt` is negative or not finite.
    fn tick(&mut self, dt: f64) -> Result<(), EngineError>;

    /// Records pointer input; takes effect on the next tick.
    fn handle_pointer(&mut self, event: PointerEvent);

    /// The buffers produced by the most recent tick.
    fn frame(&self) -> Frame<'_>;

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all available parameters, their types, ranges, and defaults.
    fn param_schema(&self) -> Value;

    /// The particle field behind this visualization, if it has one.
    fn field(&self) -> Option<&SphereField> {
        None
    }

    /// Number of particles animated, 0 for solid components.
    fn particle_count(&self) -> usize {
        self.field().map_or(0, SphereField::len)
    }
}

impl<V: Visualization + ?Sized> Visualization for Box<V> {
    fn tick(&mut self, dt: f64) -> Result<(), EngineError> {
        (**self).tick(dt)
    }

    fn handle_pointer(&mut self, event: PointerEvent) {
        (**self).handle_pointer(event)
    }

    fn frame(&self) -> Frame<'_> {
        (**self).frame()
    }

    fn params(&self) -> Value {
        (**self).params()
    }

    fn param_schema(&self) -> Value {
        (**self).param_schema()
    }

    fn field(&self) -> Option<&SphereField> {
        (**self).field()
    }

    fn particle_count(&self) -> usize {
        (**self).particle_count()
    }
}

impl<V: Visualization + ?Sized> Visualization for &mut V {
    fn tick(&mut self, dt: f64) -> Result<(), EngineError> {
        (**self).tick(dt)
    }

    fn handle_pointer(&mut self, event: PointerEvent) {
        (**self).handle_pointer(event)
    }

    fn frame(&self) -> Frame<'_> {
        (**self).frame()
    }

    fn params(&self) -> Value {
        (**self).params()
    }

    fn param_schema(&self) -> Value {
        (**self).param_schema()
    }

    fn field(&self) -> Option<&SphereField> {
        (**self).field()
    }

    fn particle_count(&self) -> usize {
        (**self).particle_count()
    }
}

/// Rejects negative, NaN, and infinite frame deltas.
pub fn check_time_step(dt: f64) -> Result<(), EngineError> {
    if dt.is_finite() && dt >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidTimeStep(dt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Minimal visualization used to verify trait object safety.
    struct Spinner {
        rotation: Rotation,
        ticks: usize,
    }

    impl Visualization for Spinner {
        fn tick(&mut self, dt: f64) -> Result<(), EngineError> {
            check_time_step(dt)?;
            self.rotation.advance(0.0, 90.0 * dt);
            self.ticks += 1;
            Ok(())
        }

        fn handle_pointer(&mut self, _event: PointerEvent) {}

        fn frame(&self) -> Frame<'_> {
            Frame::Transform {
                rotation: self.rotation,
                glow: false,
            }
        }

        fn params(&self) -> Value {
            json!({"ticks": self.ticks})
        }

        fn param_schema(&self) -> Value {
            json!({"ticks": {"type": "integer", "default": 0}})
        }
    }

    fn spinner() -> Spinner {
        Spinner {
            rotation: Rotation::IDENTITY,
            ticks: 0,
        }
    }

    #[test]
    fn visualization_trait_is_object_safe() {
        let mut viz: Box<dyn Visualization> = Box::new(spinner());
        viz.tick(1.0).unwrap();
        match viz.frame() {
            Frame::Transform { rotation, .. } => assert_eq!(rotation.y_deg, 90.0),
            other => panic!("unexpected frame {other:?}"),
        }
        assert_eq!(viz.params()["ticks"], 1);
    }

    #[test]
    fn default_field_is_none() {
        let viz = spinner();
        assert!(viz.field().is_none());
        assert_eq!(viz.particle_count(), 0);
    }

    #[test]
    fn check_time_step_rejects_bad_deltas() {
        assert!(check_time_step(0.0).is_ok());
        assert!(check_time_step(1.0 / 60.0).is_ok());
        for dt in [-0.01, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                check_time_step(dt),
                Err(EngineError::InvalidTimeStep(_))
            ));
        }
    }

    #[test]
    fn invalid_tick_leaves_state_unchanged() {
        let mut viz = spinner();
        assert!(viz.tick(-1.0).is_err());
        assert_eq!(viz.ticks, 0);
    }
}
