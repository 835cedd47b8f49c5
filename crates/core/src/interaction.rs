//! Pointer input and the controllers that turn it into field-state changes.
//!
//! Handlers run synchronously when an event arrives and only record small
//! pieces of state (hover flag, drag delta, toggle). The frame tick reads that
//! state later; nothing here touches particle positions.

use crate::transition::ease_toward;
use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Pointer input in container-local screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerEvent {
    Enter,
    Leave,
    Down { x: f64, y: f64 },
    Up,
    /// `dx`/`dy` are the movement since the previous move event.
    Move { x: f64, y: f64, dx: f64, dy: f64 },
}

/// Hover-driven integration: entering assembles the sphere and speeds up its spin.
#[derive(Debug, Clone)]
pub struct HoverController {
    hovered: bool,
    speed: f64,
    idle_speed: f64,
    hover_speed: f64,
    speed_smoothing: f64,
}

impl HoverController {
    pub fn new(idle_speed: f64, hover_speed: f64, speed_smoothing: f64) -> Self {
        Self {
            hovered: false,
            speed: idle_speed.max(0.0),
            idle_speed: idle_speed.max(0.0),
            hover_speed: hover_speed.max(0.0),
            speed_smoothing,
        }
    }

    /// Applies an event. Returns the new blend target if it changed.
    pub fn handle(&mut self, event: PointerEvent) -> Option<f64> {
        let hovered = match event {
            PointerEvent::Enter => true,
            PointerEvent::Leave => false,
            _ => return None,
        };
        if hovered == self.hovered {
            return None;
        }
        debug!(hovered, "hover changed");
        self.hovered = hovered;
        Some(self.blend_target())
    }

    pub fn hovered(&self) -> bool {
        self.hovered
    }

    /// Glow is shown only while the pointer is over the sphere.
    pub fn glow(&self) -> bool {
        self.hovered
    }

    pub fn blend_target(&self) -> f64 {
        if self.hovered {
            1.0
        } else {
            0.0
        }
    }

    fn speed_target(&self) -> f64 {
        if self.hovered {
            self.hover_speed
        } else {
            self.idle_speed
        }
    }

    /// Current speed multiplier, always non-negative.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Eases the speed multiplier toward the hover or idle speed.
    pub fn step(&mut self, dt: f64) {
        let target = self.speed_target();
        self.speed = ease_toward(self.speed, target, self.speed_smoothing, 0.001, dt).max(0.0);
    }
}

/// Click-to-toggle disintegration plus drag-to-rotate.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    disintegrating: bool,
    dragging: bool,
    pending: DVec2,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// A controller whose first press assembles rather than scatters.
    pub fn disintegrated() -> Self {
        Self {
            disintegrating: true,
            ..Self::default()
        }
    }

    /// Applies an event. Returns the new blend target when a press toggles the state.
    pub fn handle(&mut self, event: PointerEvent) -> Option<f64> {
        match event {
            PointerEvent::Down { .. } => {
                self.disintegrating = !self.disintegrating;
                self.dragging = true;
                debug!(disintegrating = self.disintegrating, "toggled disintegration");
                Some(self.blend_target())
            }
            PointerEvent::Up | PointerEvent::Leave => {
                self.dragging = false;
                None
            }
            PointerEvent::Move { dx, dy, .. } if self.dragging => {
                self.pending += DVec2::new(dx, dy);
                None
            }
            _ => None,
        }
    }

    pub fn disintegrating(&self) -> bool {
        self.disintegrating
    }

    pub fn dragging(&self) -> bool {
        self.dragging
    }

    pub fn blend_target(&self) -> f64 {
        if self.disintegrating {
            0.0
        } else {
            1.0
        }
    }

    /// Drains the movement accumulated since the last call.
    pub fn take_drag(&mut self) -> DVec2 {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f64 = 1.0 / 60.0;

    fn moved(dx: f64, dy: f64) -> PointerEvent {
        PointerEvent::Move {
            x: 0.0,
            y: 0.0,
            dx,
            dy,
        }
    }

    #[test]
    fn hover_enter_and_leave_set_blend_target() {
        let mut hover = HoverController::new(1.0, 3.0, 0.1);
        assert_eq!(hover.handle(PointerEvent::Enter), Some(1.0));
        assert!(hover.glow());
        assert_eq!(hover.handle(PointerEvent::Leave), Some(0.0));
        assert!(!hover.glow());
    }

    #[test]
    fn repeated_hover_events_are_ignored() {
        let mut hover = HoverController::new(1.0, 3.0, 0.1);
        assert_eq!(hover.handle(PointerEvent::Leave), None);
        hover.handle(PointerEvent::Enter);
        assert_eq!(hover.handle(PointerEvent::Enter), None);
    }

    #[test]
    fn hover_ignores_press_and_move() {
        let mut hover = HoverController::new(1.0, 3.0, 0.1);
        assert_eq!(hover.handle(PointerEvent::Down { x: 1.0, y: 1.0 }), None);
        assert_eq!(hover.handle(moved(3.0, 4.0)), None);
        assert!(!hover.hovered());
    }

    #[test]
    fn hover_speed_eases_up_and_back_down() {
        let mut hover = HoverController::new(1.0, 3.0, 0.1);
        hover.handle(PointerEvent::Enter);
        hover.step(FRAME);
        assert!((hover.speed() - 1.2).abs() < 1e-9);
        for _ in 0..200 {
            hover.step(FRAME);
        }
        assert_eq!(hover.speed(), 3.0);
        hover.handle(PointerEvent::Leave);
        for _ in 0..200 {
            hover.step(FRAME);
        }
        assert_eq!(hover.speed(), 1.0);
    }

    #[test]
    fn press_toggles_disintegration_and_starts_drag() {
        let mut drag = DragController::new();
        assert_eq!(drag.handle(PointerEvent::Down { x: 0.0, y: 0.0 }), Some(0.0));
        assert!(drag.disintegrating() && drag.dragging());
        assert_eq!(drag.handle(PointerEvent::Up), None);
        assert!(!drag.dragging());
        assert_eq!(drag.handle(PointerEvent::Down { x: 0.0, y: 0.0 }), Some(1.0));
        assert!(!drag.disintegrating());
    }

    #[test]
    fn moves_only_count_while_dragging() {
        let mut drag = DragController::new();
        drag.handle(moved(5.0, 5.0));
        assert_eq!(drag.take_drag(), DVec2::ZERO);
        drag.handle(PointerEvent::Down { x: 0.0, y: 0.0 });
        drag.handle(moved(3.0, -1.0));
        drag.handle(moved(2.0, 4.0));
        assert_eq!(drag.take_drag(), DVec2::new(5.0, 3.0));
        assert_eq!(drag.take_drag(), DVec2::ZERO, "delta must drain");
        drag.handle(PointerEvent::Up);
        drag.handle(moved(9.0, 9.0));
        assert_eq!(drag.take_drag(), DVec2::ZERO);
    }

    #[test]
    fn disintegrated_controller_assembles_on_first_press() {
        let mut drag = DragController::disintegrated();
        assert_eq!(drag.blend_target(), 0.0);
        assert_eq!(drag.handle(PointerEvent::Down { x: 0.0, y: 0.0 }), Some(1.0));
    }

    #[test]
    fn leaving_ends_drag_capture() {
        let mut drag = DragController::new();
        drag.handle(PointerEvent::Down { x: 0.0, y: 0.0 });
        drag.handle(PointerEvent::Leave);
        assert!(!drag.dragging());
    }

    #[test]
    fn pointer_event_serializes_with_kind_tag() {
        let v = serde_json::to_value(PointerEvent::Down { x: 1.0, y: 2.0 }).unwrap();
        assert_eq!(v["kind"], "down");
        let back: PointerEvent = serde_json::from_value(v).unwrap();
        assert_eq!(back, PointerEvent::Down { x: 1.0, y: 2.0 });
    }
}
