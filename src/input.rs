// Pointer events as the drawing surface sees them, plus the small state
// machine that turns "is the button down / where is the mouse" samples into
// down/move/up/cancel.

use crate::types::Point;

/// One single-pointer event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
    Cancel(Point),
}

/// What the drawing surface tells its host after an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Handled {
    /// The host should route the rest of this gesture here and not let an
    /// enclosing scroller or gesture recognizer take it over.
    pub claims_gesture: bool,
}

/// Derives pointer events from sampled mouse state, one sample per UI tick.
#[derive(Clone, Debug, Default)]
pub struct PointerTracker {
    pressed: bool,
    last: Option<Point>,
}

impl PointerTracker {
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// `position` is `None` when the pointer is outside the surface.
    pub fn sample(&mut self, button_down: bool, position: Option<Point>) -> Option<PointerEvent> {
        match (self.pressed, button_down, position) {
            // press inside the surface starts a stroke
            (false, true, Some(p)) => {
                self.pressed = true;
                self.last = Some(p);
                Some(PointerEvent::Down(p))
            }
            // drag; a sample that did not move is not an event
            (true, true, Some(p)) => {
                if self.last == Some(p) {
                    return None;
                }
                self.last = Some(p);
                Some(PointerEvent::Move(p))
            }
            // dragged off the surface: the platform took the pointer away
            (true, true, None) => {
                self.pressed = false;
                self.last.take().map(PointerEvent::Cancel)
            }
            (true, false, p) => {
                self.pressed = false;
                let last = self.last.take();
                p.or(last).map(PointerEvent::Up)
            }
            (false, _, _) => None,
        }
    }
}
