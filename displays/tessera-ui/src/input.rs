//! Pointer input
//!
//! The application registers a read callback that returns the current
//! pointer state. Each poll is turned into widget events: a press over a
//! button presses it, sliding off loses the press, and releasing while still
//! pressed clicks it.

use alloc::boxed::Box;
use embedded_graphics::prelude::Point;
use heapless::Vec;

use crate::event::EventCode;
use crate::widget::{WidgetId, WidgetTree};

/// Read callback type
pub type ReadCallback<'a> = Box<dyn FnMut() -> PointerEvent + 'a>;

/// Maximum events produced by one poll
pub const MAX_EVENTS_PER_POLL: usize = 4;

/// Pointer contact state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PointerState {
    Pressed,
    #[default]
    Released,
}

/// One pointer sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PointerEvent {
    /// Contact position; `None` keeps the last known position
    pub point: Option<Point>,
    pub state: PointerState,
}

impl PointerEvent {
    /// Finger down at (`x`, `y`)
    pub const fn pressed(x: i32, y: i32) -> Self {
        Self {
            point: Some(Point::new(x, y)),
            state: PointerState::Pressed,
        }
    }

    /// No contact, position unspecified
    pub const fn released() -> Self {
        Self {
            point: None,
            state: PointerState::Released,
        }
    }

    pub const fn is_pressed(&self) -> bool {
        matches!(self.state, PointerState::Pressed)
    }
}

/// Registered pointer device and its press tracking
pub struct InputDevice<'a> {
    read_cb: ReadCallback<'a>,
    last_point: Point,
    /// Pointer was down on the previous poll
    was_pressed: bool,
    /// Widget holding the current press, cleared when the press is lost
    active: Option<WidgetId>,
}

impl<'a> InputDevice<'a> {
    pub fn new(read_cb: impl FnMut() -> PointerEvent + 'a) -> Self {
        Self {
            read_cb: Box::new(read_cb),
            last_point: Point::zero(),
            was_pressed: false,
            active: None,
        }
    }

    /// Last known pointer position
    pub fn last_point(&self) -> Point {
        self.last_point
    }

    /// Read the device once and translate the sample into widget events
    pub(crate) fn poll(&mut self, tree: &mut WidgetTree) -> Vec<(WidgetId, EventCode), MAX_EVENTS_PER_POLL> {
        let sample = (self.read_cb)();
        if let Some(point) = sample.point {
            self.last_point = point;
        }
        self.process(sample.state, tree)
    }

    fn process(
        &mut self,
        state: PointerState,
        tree: &mut WidgetTree,
    ) -> Vec<(WidgetId, EventCode), MAX_EVENTS_PER_POLL> {
        let mut events = Vec::new();
        let point = self.last_point;

        match state {
            PointerState::Pressed if !self.was_pressed => {
                self.was_pressed = true;
                if let Some(id) = tree.hit_test(point) {
                    self.active = Some(id);
                    tree.set_pressed(id, true);
                    let _ = events.push((id, EventCode::Pressed));
                }
            }
            PointerState::Pressed => {
                if let Some(id) = self.active {
                    let still_over = tree.get(id).is_some_and(|w| w.area().contains(point));
                    if still_over {
                        let _ = events.push((id, EventCode::Pressing));
                    } else {
                        self.active = None;
                        tree.set_pressed(id, false);
                        let _ = events.push((id, EventCode::PressLost));
                    }
                }
            }
            PointerState::Released if self.was_pressed => {
                self.was_pressed = false;
                if let Some(id) = self.active.take() {
                    tree.set_pressed(id, false);
                    let _ = events.push((id, EventCode::Released));
                    let _ = events.push((id, EventCode::Clicked));
                }
            }
            PointerState::Released => {}
        }

        events
    }
}
