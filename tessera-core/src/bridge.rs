//! Render bridge
//!
//! Adapters between the UI library's callbacks and the hardware traits:
//! the flush adapter pushes rendered stripes to a [`DisplayPanel`], the input
//! adapter turns [`TouchController`] state into a [`PointerEvent`].

use alloc::rc::Rc;
use core::cell::Cell;

use tessera_hal::panel::{ByteOrder, DisplayPanel};
use tessera_hal::touch::TouchController;
use tessera_ui::{Area, DisplayDriver, FlushRequest, InputDevice, PointerEvent};

/// Width and height of an inclusive area
///
/// Areas handed to the flush callback are never empty, so both are at
/// least 1.
pub fn area_size(area: &Area) -> (u16, u16) {
    ((area.x2 - area.x1 + 1) as u16, (area.y2 - area.y1 + 1) as u16)
}

/// Push one rendered stripe to the panel
///
/// The request is acknowledged exactly once, after the draw, whether or not
/// the draw succeeded; the draw result is returned to the caller.
pub fn flush<P: DisplayPanel + ?Sized>(
    panel: &mut P,
    order: ByteOrder,
    request: &mut FlushRequest<'_>,
) -> Result<(), P::Error> {
    let area = request.area();
    let (w, h) = area_size(&area);
    let result = panel.draw_pixel_block(area.x1 as u16, area.y1 as u16, request.pixels(), w, h, order);
    request.flush_ready();
    result
}

/// Sample the touch controller
///
/// No signal means released at an unspecified point. With a signal, a
/// touch wins over a release.
pub fn read_input<T: TouchController + ?Sized>(touch: &mut T) -> PointerEvent {
    if !touch.has_signal() {
        return PointerEvent::released();
    }
    if touch.is_touched() {
        let (x, y) = touch.last_point();
        return PointerEvent::pressed(x, y);
    }
    // Queried for its side effects on the controller
    let _ = touch.is_released();
    PointerEvent::released()
}

/// Flush counters shared between the display callback and its owner
#[derive(Debug, Default)]
pub struct FlushStats {
    flushes: Cell<u32>,
    errors: Cell<u32>,
}

impl FlushStats {
    /// Stripes pushed to the panel
    pub fn flushes(&self) -> u32 {
        self.flushes.get()
    }

    /// Panel draws that returned an error
    pub fn errors(&self) -> u32 {
        self.errors.get()
    }

    fn record(&self, ok: bool) {
        self.flushes.set(self.flushes.get().wrapping_add(1));
        if !ok {
            self.errors.set(self.errors.get().wrapping_add(1));
        }
    }
}

/// Display registration that flushes into `panel`
pub fn display_driver<'a, P>(
    panel: P,
    buffer: &'a mut [u16],
    swap_bytes: bool,
    stats: Rc<FlushStats>,
) -> DisplayDriver<'a>
where
    P: DisplayPanel + 'a,
{
    let (width, height) = (panel.width(), panel.height());
    let order = ByteOrder::from_swap(swap_bytes);
    let mut panel = panel;
    DisplayDriver::new(width, height, buffer, move |request: &mut FlushRequest<'_>| {
        let ok = flush(&mut panel, order, request).is_ok();
        stats.record(ok);
    })
    .with_swap_bytes(swap_bytes)
}

/// Input registration that reads `touch`
pub fn input_device<'a, T>(touch: T) -> InputDevice<'a>
where
    T: TouchController + 'a,
{
    let mut touch = touch;
    InputDevice::new(move || read_input(&mut touch))
}
