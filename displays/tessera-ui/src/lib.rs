//! Tessera UI
//!
//! A small retained-mode widget library with a software renderer, sized for
//! microcontroller displays.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                        Ui                            │
//! │  ┌────────────┐   ┌──────────────┐   ┌────────────┐  │
//! │  │ WidgetTree │──▶│   renderer   │──▶│  flush_cb  │──┼──▶ panel
//! │  └────────────┘   │ (stripes in  │   └────────────┘  │
//! │        ▲          │ draw buffer) │                   │
//! │        │          └──────────────┘                   │
//! │  ┌────────────┐   ┌──────────────┐                   │
//! │  │  bindings  │◀──│ InputDevice  │◀──────────────────┼─── read_cb
//! │  └────────────┘   └──────────────┘                   │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! The application drives everything through [`Ui::tick`] with a
//! millisecond timestamp. Input is polled and the screen refreshed on their
//! own periods; nothing runs outside `tick`.
//!
//! # Example
//!
//! ```
//! use tessera_ui::{Align, EventCode, Ui};
//!
//! let mut ui = Ui::new();
//! let label = ui.create_label(ui.screen(), "Hello").unwrap();
//! ui.align(label, Align::Center, 0, 0).unwrap();
//! assert_eq!(ui.text(label), Some("Hello"));
//! assert!(!ui.has_display());
//! # let _ = EventCode::Clicked;
//! ```

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod area;
pub mod display;
pub mod event;
pub mod input;
pub mod invalid;
pub mod render;
pub mod style;
pub mod widget;

pub use area::Area;
pub use display::{DisplayDriver, FlushRequest};
pub use event::{Event, EventCode, EventHandler, MAX_BINDINGS};
pub use input::{InputDevice, PointerEvent, PointerState};
pub use style::Theme;
pub use widget::{Align, WidgetId, WidgetKind, MAX_TEXT_LEN, MAX_WIDGETS};

use heapless::String;

use event::{Binding, Bindings};
use widget::WidgetTree;

/// UI errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UiError {
    /// Widget handle does not exist
    InvalidWidget,
    /// Widget arena is full
    TooManyWidgets,
    /// Text operation on a widget that is not a label
    NotALabel,
    /// Handler table is full
    TooManyBindings,
    /// Draw buffer cannot hold a single row of the area
    BufferTooSmall,
    /// Flush callback returned without acknowledging the stripe
    FlushNotReady,
}

/// Timer periods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UiConfig {
    /// Screen refresh period in milliseconds
    pub refresh_period_ms: u32,
    /// Input polling period in milliseconds
    pub input_period_ms: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_period_ms: 30,
            input_period_ms: 30,
        }
    }
}

/// Work performed by one [`Ui::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Input device was read
    pub polled: bool,
    /// Handlers invoked
    pub handlers: u16,
    /// Stripes handed to the flush callback
    pub flushed: u16,
}

/// Periodic timer keyed on caller-supplied milliseconds
#[derive(Debug, Clone, Copy)]
struct Period {
    period_ms: u32,
    last_ms: Option<u64>,
}

impl Period {
    const fn new(period_ms: u32) -> Self {
        Self {
            period_ms,
            last_ms: None,
        }
    }

    /// Fire on the first call, then once `period_ms` has elapsed
    fn due(&mut self, now_ms: u64) -> bool {
        let fire = match self.last_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.period_ms as u64,
        };
        if fire {
            self.last_ms = Some(now_ms);
        }
        fire
    }
}

/// UI context: widgets, handlers, and the registered devices
pub struct Ui<'a> {
    tree: WidgetTree,
    bindings: Bindings,
    display: Option<DisplayDriver<'a>>,
    input: Option<InputDevice<'a>>,
    refresh: Period,
    poll: Period,
}

impl Default for Ui<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Ui<'a> {
    pub fn new() -> Self {
        Self::with_config(UiConfig::default())
    }

    pub fn with_config(config: UiConfig) -> Self {
        Self::with_theme(config, Theme::default())
    }

    pub fn with_theme(config: UiConfig, theme: Theme) -> Self {
        Self {
            tree: WidgetTree::new(theme),
            bindings: Bindings::default(),
            display: None,
            input: None,
            refresh: Period::new(config.refresh_period_ms),
            poll: Period::new(config.input_period_ms),
        }
    }

    /// Root widget covering the whole display
    pub fn screen(&self) -> WidgetId {
        WidgetId::SCREEN
    }

    /// Read-only view of the widget tree
    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    /// Register the display; the whole screen is redrawn on the next refresh
    pub fn register_display(&mut self, driver: DisplayDriver<'a>) {
        self.tree.set_resolution(driver.hor_res, driver.ver_res);
        self.display = Some(driver);
    }

    pub fn register_input(&mut self, device: InputDevice<'a>) {
        self.input = Some(device);
    }

    pub fn has_display(&self) -> bool {
        self.display.is_some()
    }

    pub fn has_input(&self) -> bool {
        self.input.is_some()
    }

    pub fn create_label(&mut self, parent: WidgetId, text: &str) -> Result<WidgetId, UiError> {
        let id = self.tree.create(parent, WidgetKind::Label { text: String::new() })?;
        self.tree.set_text(id, text)?;
        Ok(id)
    }

    pub fn create_button(&mut self, parent: WidgetId) -> Result<WidgetId, UiError> {
        self.tree.create(parent, WidgetKind::Button { pressed: false })
    }

    pub fn set_text(&mut self, id: WidgetId, text: &str) -> Result<(), UiError> {
        self.tree.set_text(id, text)
    }

    pub fn text(&self, id: WidgetId) -> Option<&str> {
        self.tree.text(id)
    }

    pub fn align(&mut self, id: WidgetId, align: Align, x_ofs: i32, y_ofs: i32) -> Result<(), UiError> {
        self.tree.align(id, align, x_ofs, y_ofs)
    }

    /// Bind `handler` to events on `target` matching `filter`
    pub fn add_event_cb(
        &mut self,
        target: WidgetId,
        handler: EventHandler,
        filter: EventCode,
        user_data: Option<WidgetId>,
    ) -> Result<(), UiError> {
        if self.tree.get(target).is_none() {
            return Err(UiError::InvalidWidget);
        }
        self.bindings.add(Binding {
            target,
            filter,
            handler,
            user_data,
        })
    }

    /// Raise `code` on `target` as if it came from the input device
    pub fn send_event(&mut self, target: WidgetId, code: EventCode) -> usize {
        self.bindings.dispatch(&mut self.tree, target, code)
    }

    /// Run whatever input polling and refresh work is due at `now_ms`
    pub fn tick(&mut self, now_ms: u64) -> Result<TickReport, UiError> {
        let mut report = TickReport::default();

        if self.poll.due(now_ms) {
            if let Some(input) = self.input.as_mut() {
                // Hit testing needs current widget areas
                self.tree.layout();
                report.polled = true;
                for (target, code) in input.poll(&mut self.tree) {
                    let n = self.bindings.dispatch(&mut self.tree, target, code);
                    report.handlers = report.handlers.saturating_add(n as u16);
                }
            }
        }

        if self.refresh.due(now_ms) {
            if let Some(display) = self.display.as_mut() {
                report.flushed = display.refresh(&mut self.tree)?;
            }
        }

        Ok(report)
    }
}
