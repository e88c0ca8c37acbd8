//! Widget events and handler bindings

use heapless::Vec;

use crate::widget::{WidgetId, WidgetTree};
use crate::UiError;

/// Maximum number of handler bindings
pub const MAX_BINDINGS: usize = 8;

/// Event handler
///
/// Plain function pointers keep the binding table `Copy` and free of
/// captured borrows; per-binding state travels in `user_data`.
pub type EventHandler = fn(&mut Event<'_>);

/// Kinds of widget events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventCode {
    /// Pointer went down over the widget
    Pressed,
    /// Pointer is still down over the widget
    Pressing,
    /// Pointer slid off the widget while down
    PressLost,
    /// Pointer came up over the widget
    Released,
    /// Press and release on the same widget
    Clicked,
    /// Matches every code when used in a binding filter
    All,
}

impl EventCode {
    /// Whether a binding registered for `self` receives `code`
    pub fn matches(self, code: EventCode) -> bool {
        self == EventCode::All || self == code
    }
}

/// Event passed to a handler
pub struct Event<'t> {
    target: WidgetId,
    code: EventCode,
    user_data: Option<WidgetId>,
    tree: &'t mut WidgetTree,
}

impl<'t> Event<'t> {
    pub(crate) fn new(
        target: WidgetId,
        code: EventCode,
        user_data: Option<WidgetId>,
        tree: &'t mut WidgetTree,
    ) -> Self {
        Self {
            target,
            code,
            user_data,
            tree,
        }
    }

    /// Widget the event was raised on
    pub fn target(&self) -> WidgetId {
        self.target
    }

    pub fn code(&self) -> EventCode {
        self.code
    }

    /// Widget handle supplied when the handler was bound
    pub fn user_data(&self) -> Option<WidgetId> {
        self.user_data
    }

    /// Change a label's text from inside the handler
    pub fn set_text(&mut self, id: WidgetId, text: &str) -> Result<(), UiError> {
        self.tree.set_text(id, text)
    }

    pub fn text(&self, id: WidgetId) -> Option<&str> {
        self.tree.text(id)
    }
}

/// One registered handler
#[derive(Clone, Copy)]
pub(crate) struct Binding {
    pub target: WidgetId,
    pub filter: EventCode,
    pub handler: EventHandler,
    pub user_data: Option<WidgetId>,
}

/// Handler table
#[derive(Default)]
pub(crate) struct Bindings {
    entries: Vec<Binding, MAX_BINDINGS>,
}

impl Bindings {
    pub fn add(&mut self, binding: Binding) -> Result<(), UiError> {
        self.entries
            .push(binding)
            .map_err(|_| UiError::TooManyBindings)
    }

    /// Run every handler bound to `target` for `code`
    ///
    /// Returns the number of handlers invoked.
    pub fn dispatch(&self, tree: &mut WidgetTree, target: WidgetId, code: EventCode) -> usize {
        let mut invoked = 0;
        for binding in self
            .entries
            .iter()
            .filter(|b| b.target == target && b.filter.matches(code))
        {
            let mut event = Event::new(target, code, binding.user_data, tree);
            (binding.handler)(&mut event);
            invoked += 1;
        }
        invoked
    }
}
