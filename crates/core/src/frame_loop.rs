//! Frame scheduling and teardown against a host rendering surface.
//!
//! A [`Mount`] ties one visualization to one [`Surface`] for as long as it
//! lives. At most one frame request is outstanding at a time; each delivered
//! frame ticks the visualization, presents the result, and requests the
//! next. Cancelling (explicitly or by drop) releases the frame request and
//! the pointer subscription, after which nothing reaches the visualization.

use crate::engine::{Frame, Visualization};
use crate::error::EngineError;
use crate::interaction::PointerEvent;
use tracing::{debug, warn};

/// Handle for one pending frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

/// Handle for one pointer subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// The host side of a mount: frame scheduling, pointer delivery, presentation.
pub trait Surface {
    /// Whether the surface is in a state that can host a visualization.
    fn is_attached(&self) -> bool;

    fn request_frame(&mut self) -> FrameId;

    fn cancel_frame(&mut self, id: FrameId);

    fn subscribe_pointer(&mut self) -> ListenerId;

    fn unsubscribe_pointer(&mut self, id: ListenerId);

    fn present(&mut self, frame: &Frame<'_>);
}

/// A visualization mounted on a surface.
///
/// Dropping the mount cancels it.
pub struct Mount<'s, S: Surface + ?Sized, V: Visualization> {
    surface: &'s mut S,
    visualization: V,
    pending: Option<FrameId>,
    listener: Option<ListenerId>,
}

impl<'s, S: Surface + ?Sized, V: Visualization> Mount<'s, S, V> {
    /// Subscribes to pointer input, presents the initial frame and requests
    /// the first tick. Returns `None` without touching the surface if it is
    /// not attached.
    pub fn attach(surface: &'s mut S, visualization: V) -> Option<Self> {
        if !surface.is_attached() {
            debug!("surface not attached, skipping mount");
            return None;
        }
        let listener = surface.subscribe_pointer();
        surface.present(&visualization.frame());
        let pending = surface.request_frame();
        debug!(
            particles = visualization.particle_count(),
            frame = pending.0,
            "visualization mounted"
        );
        Some(Self {
            surface,
            visualization,
            pending: Some(pending),
            listener: Some(listener),
        })
    }

    /// Delivers frame `id`, `dt` seconds after the previous one.
    ///
    /// Returns `Ok(false)` when `id` is not the outstanding request or the
    /// mount is cancelled. A rejected `dt` leaves the request outstanding.
    pub fn frame(&mut self, id: FrameId, dt: f64) -> Result<bool, EngineError> {
        match self.pending {
            Some(pending) if pending == id => {}
            Some(pending) => {
                warn!(got = id.0, expected = pending.0, "ignoring stale frame");
                return Ok(false);
            }
            None => return Ok(false),
        }
        self.visualization.tick(dt)?;
        self.surface.present(&self.visualization.frame());
        self.pending = Some(self.surface.request_frame());
        Ok(true)
    }

    /// Forwards pointer input while mounted.
    pub fn pointer(&mut self, event: PointerEvent) {
        if self.listener.is_some() {
            self.visualization.handle_pointer(event);
        }
    }

    /// Runs `frames` consecutive frames of `dt` seconds each. Returns the number delivered.
    pub fn run(&mut self, frames: usize, dt: f64) -> Result<usize, EngineError> {
        let mut delivered = 0;
        for _ in 0..frames {
            let Some(id) = self.pending else { break };
            if self.frame(id, dt)? {
                delivered += 1;
            }
        }
        Ok(delivered)
    }

    /// Cancels the pending frame and the pointer subscription. Idempotent.
    pub fn cancel(&mut self) {
        let frame = self.pending.take();
        let listener = self.listener.take();
        if let Some(id) = frame {
            self.surface.cancel_frame(id);
        }
        if let Some(id) = listener {
            self.surface.unsubscribe_pointer(id);
        }
        if frame.is_some() || listener.is_some() {
            debug!("visualization unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_frame(&self) -> Option<FrameId> {
        self.pending
    }

    pub fn visualization(&self) -> &V {
        &self.visualization
    }

    pub fn surface(&self) -> &S {
        &*self.surface
    }
}

impl<S: Surface + ?Sized, V: Visualization> Drop for Mount<'_, S, V> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// In-memory surface that counts what a mount asks of it.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    attached: bool,
    next_id: u64,
    pending: Option<FrameId>,
    listeners: Vec<ListenerId>,
    requested: usize,
    cancelled: usize,
    presented: usize,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self {
            attached: true,
            ..Self::default()
        }
    }

    /// A surface with no backing container; mounts on it are skipped.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<FrameId> {
        self.pending
    }

    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled
    }

    pub fn presented(&self) -> usize {
        self.presented
    }

    pub fn active_listeners(&self) -> usize {
        self.listeners.len()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl Surface for HeadlessSurface {
    fn is_attached(&self) -> bool {
        self.attached
    }

    fn request_frame(&mut self) -> FrameId {
        let id = FrameId(self.next_id());
        self.pending = Some(id);
        self.requested += 1;
        id
    }

    fn cancel_frame(&mut self, id: FrameId) {
        if self.pending == Some(id) {
            self.pending = None;
            self.cancelled += 1;
        }
    }

    fn subscribe_pointer(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id());
        self.listeners.push(id);
        id
    }

    fn unsubscribe_pointer(&mut self, id: ListenerId) {
        self.listeners.retain(|&l| l != id);
    }

    fn present(&mut self, _frame: &Frame<'_>) {
        self.presented += 1;
    }
}
