//! Integration blend engine: moves a field's blend toward its target under a
//! single transition law and reports the resulting transition phase.
//!
//! Two laws are available and a field picks exactly one:
//!
//! - [`TransitionLaw::Smoothing`] closes a fixed fraction of the remaining gap
//!   each reference frame (60 Hz), scaled by the real frame delta.
//! - [`TransitionLaw::Ramp`] moves linearly from wherever the blend was when
//!   the target last changed, finishing `duration` seconds after that moment.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Frame rate the smoothing factor is expressed against.
pub const REFERENCE_FPS: f64 = 60.0;

/// Ramp progress this close to 1 counts as finished (absorbs clock rounding).
const RAMP_EPSILON: f64 = 1e-9;

/// How blend approaches its target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionLaw {
    /// Exponential smoothing: `blend += (target - blend) * factor` per reference
    /// frame, snapping to the target once the gap is below `snap_epsilon`.
    Smoothing { factor: f64, snap_epsilon: f64 },
    /// Linear ramp over `duration` seconds starting when the target changes.
    Ramp { duration: f64 },
}

impl TransitionLaw {
    pub fn smoothing(factor: f64) -> Self {
        TransitionLaw::Smoothing {
            factor,
            snap_epsilon: 0.001,
        }
    }

    pub fn ramp(duration: f64) -> Self {
        TransitionLaw::Ramp { duration }
    }
}

/// Where a field is in its integrate/disintegrate cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPhase {
    Scattered,
    Integrating,
    Integrated,
    Scattering,
}

impl TransitionPhase {
    fn of(blend: f64, target: f64) -> Self {
        if blend == target {
            if blend >= 0.5 {
                TransitionPhase::Integrated
            } else {
                TransitionPhase::Scattered
            }
        } else if target > blend {
            TransitionPhase::Integrating
        } else {
            TransitionPhase::Scattering
        }
    }

    /// Whether the blend is still moving.
    pub fn is_transitioning(self) -> bool {
        matches!(
            self,
            TransitionPhase::Integrating | TransitionPhase::Scattering
        )
    }
}

/// Fraction of the remaining gap an exponential smoother closes over `dt` seconds.
///
/// Equals `factor` when `dt` is exactly one reference frame.
pub fn smoothing_alpha(factor: f64, dt: f64) -> f64 {
    let factor = factor.clamp(0.0, 1.0);
    1.0 - (1.0 - factor).powf(dt * REFERENCE_FPS)
}

/// Moves `value` toward `target` by one exponential-smoothing step.
pub fn ease_toward(value: f64, target: f64, factor: f64, snap_epsilon: f64, dt: f64) -> f64 {
    let gap = target - value;
    if gap.abs() < snap_epsilon {
        target
    } else {
        value + gap * smoothing_alpha(factor, dt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RampWindow {
    start_time: f64,
    start_blend: f64,
}

/// Blend state for one field: current value, target, and the law between them.
#[derive(Debug, Clone)]
pub struct BlendEngine {
    law: TransitionLaw,
    blend: f64,
    target: f64,
    window: RampWindow,
    phase: TransitionPhase,
}

impl BlendEngine {
    /// Creates an engine resting at `initial` (clamped to [0, 1]).
    pub fn new(law: TransitionLaw, initial: f64) -> Self {
        let blend = clamp_unit(initial);
        Self {
            law,
            blend,
            target: blend,
            window: RampWindow {
                start_time: 0.0,
                start_blend: blend,
            },
            phase: TransitionPhase::of(blend, blend),
        }
    }

    pub fn law(&self) -> TransitionLaw {
        self.law
    }

    /// Current blend in [0, 1]: 0 = scattered, 1 = integrated.
    pub fn blend(&self) -> f64 {
        self.blend
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    /// Sets a new target. `clock` is the field's elapsed time and opens a new
    /// ramp window; setting the current target again changes nothing.
    pub fn set_target(&mut self, target: f64, clock: f64) {
        let target = clamp_unit(target);
        if target == self.target {
            return;
        }
        debug!(from = self.target, to = target, blend = self.blend, "blend target changed");
        self.target = target;
        self.window = RampWindow {
            start_time: clock,
            start_blend: self.blend,
        };
        self.update_phase();
    }

    /// Forces the blend, e.g. to drive a field by hand. The target follows so
    /// the next step does not pull it back.
    pub fn set_blend(&mut self, blend: f64, clock: f64) {
        self.blend = clamp_unit(blend);
        self.target = self.blend;
        self.window = RampWindow {
            start_time: clock,
            start_blend: self.blend,
        };
        self.update_phase();
    }

    /// Advances the blend. `clock` is the field's elapsed time after this
    /// frame and `dt` the frame's duration.
    pub fn step(&mut self, clock: f64, dt: f64) {
        if self.blend == self.target {
            return;
        }
        let next = match self.law {
            TransitionLaw::Smoothing {
                factor,
                snap_epsilon,
            } => ease_toward(self.blend, self.target, factor, snap_epsilon, dt),
            TransitionLaw::Ramp { duration } => {
                let progress = if duration <= 0.0 {
                    1.0
                } else {
                    ((clock - self.window.start_time) / duration).clamp(0.0, 1.0)
                };
                if progress >= 1.0 - RAMP_EPSILON {
                    self.target
                } else {
                    let start = self.window.start_blend;
                    start + (self.target - start) * progress
                }
            }
        };
        self.blend = clamp_unit(next);
        self.update_phase();
    }

    fn update_phase(&mut self) {
        let phase = TransitionPhase::of(self.blend, self.target);
        if phase != self.phase {
            debug!(?phase, blend = self.blend, "transition phase changed");
            self.phase = phase;
        }
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}
