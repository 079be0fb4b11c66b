use std::time::{Duration, Instant};

use crate::config::DragActivationConfig;
use crate::models::NoteId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn distance_to(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// What a pointer event means for the pending gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    /// Nothing decided yet.
    Pending,
    /// Hold threshold met: start a drag of this note.
    Activate(NoteId),
    /// Pointer moved too far before the hold completed (a scroll, not a drag).
    Abort,
    /// Released before activation: a plain tap/click on this note.
    Tap(NoteId),
    /// No gesture in progress.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum GateState {
    Idle,
    Pending {
        id: NoteId,
        origin: Point,
        pressed_at: Instant,
    },
    Active(NoteId),
}

/// Distinguishes a long-press drag from a tap or a scroll.
///
/// A press becomes a drag once it has been held for `delay` without the
/// pointer leaving a `tolerance` radius around where it went down.
#[derive(Debug, Clone)]
pub struct ActivationGate {
    delay: Duration,
    tolerance: f64,
    state: GateState,
}

impl ActivationGate {
    pub fn new(config: &DragActivationConfig) -> Self {
        Self {
            delay: config.delay(),
            tolerance: config.tolerance_px,
            state: GateState::Idle,
        }
    }

    pub const fn is_active(&self) -> bool {
        matches!(self.state, GateState::Active(_))
    }

    pub fn press(&mut self, id: NoteId, at_point: Point, at: Instant) {
        self.state = GateState::Pending {
            id,
            origin: at_point,
            pressed_at: at,
        };
    }

    pub fn pointer_moved(&mut self, to: Point, at: Instant) -> GestureEvent {
        let GateState::Pending { origin, .. } = self.state else {
            return self.poll(at);
        };
        if let GestureEvent::Activate(id) = self.poll(at) {
            return GestureEvent::Activate(id);
        }
        if origin.distance_to(to) > self.tolerance {
            self.state = GateState::Idle;
            return GestureEvent::Abort;
        }
        GestureEvent::Pending
    }

    /// Check the hold timer; call from a timer tick as well as on movement.
    pub fn poll(&mut self, at: Instant) -> GestureEvent {
        match self.state {
            GateState::Pending { id, pressed_at, .. } => {
                if at.saturating_duration_since(pressed_at) >= self.delay {
                    self.state = GateState::Active(id);
                    GestureEvent::Activate(id)
                } else {
                    GestureEvent::Pending
                }
            }
            GateState::Active(_) => GestureEvent::Pending,
            GateState::Idle => GestureEvent::Ignored,
        }
    }

    pub fn release(&mut self, at: Instant) -> GestureEvent {
        let event = match self.state {
            GateState::Pending { id, pressed_at, .. }
                if at.saturating_duration_since(pressed_at) < self.delay =>
            {
                GestureEvent::Tap(id)
            }
            GateState::Pending { .. } | GateState::Active(_) | GateState::Idle => {
                GestureEvent::Ignored
            }
        };
        self.state = GateState::Idle;
        event
    }
}
