//! Display driver registration and screen refresh
//!
//! The application registers one display: its resolution, a partial draw
//! buffer, and a flush callback. Refresh renders each invalidated area in
//! horizontal stripes that fit the buffer and hands every stripe to the
//! callback, which must acknowledge it with [`FlushRequest::flush_ready`]
//! before the buffer is reused.

use alloc::boxed::Box;

use crate::area::Area;
use crate::render::{draw_tree, StripeTarget};
use crate::widget::WidgetTree;
use crate::UiError;

/// Flush callback type
pub type FlushCallback<'a> = Box<dyn FnMut(&mut FlushRequest<'_>) + 'a>;

/// One rendered stripe waiting to be pushed to the panel
pub struct FlushRequest<'b> {
    area: Area,
    pixels: &'b [u16],
    last: bool,
    acks: u8,
}

impl<'b> FlushRequest<'b> {
    /// Build a request for `area`; `pixels` holds at least `area.pixel_count()` words
    pub fn new(area: Area, pixels: &'b [u16], last: bool) -> Self {
        Self {
            area,
            pixels,
            last,
            acks: 0,
        }
    }

    /// Screen area covered by the pixels (inclusive corners)
    pub fn area(&self) -> Area {
        self.area
    }

    /// Rendered pixels, row-major, exactly `area().pixel_count()` words
    pub fn pixels(&self) -> &'b [u16] {
        self.pixels
    }

    /// Whether this is the final stripe of the current refresh
    pub fn is_last(&self) -> bool {
        self.last
    }

    /// Signal that the pixels were consumed and the buffer may be reused
    pub fn flush_ready(&mut self) {
        self.acks = self.acks.saturating_add(1);
    }

    pub fn is_ready(&self) -> bool {
        self.acks > 0
    }

    /// Number of times [`flush_ready`](Self::flush_ready) was called
    pub fn ack_count(&self) -> u8 {
        self.acks
    }
}

/// Registered display
pub struct DisplayDriver<'a> {
    /// Horizontal resolution in pixels
    pub hor_res: u16,
    /// Vertical resolution in pixels
    pub ver_res: u16,
    /// Partial draw buffer, owned for the lifetime of the UI
    pub buffer: &'a mut [u16],
    /// Render byte-swapped RGB565 words
    pub swap_bytes: bool,
    /// Pushes a rendered stripe to the panel
    pub flush_cb: FlushCallback<'a>,
}

impl<'a> DisplayDriver<'a> {
    pub fn new(
        hor_res: u16,
        ver_res: u16,
        buffer: &'a mut [u16],
        flush_cb: impl FnMut(&mut FlushRequest<'_>) + 'a,
    ) -> Self {
        Self {
            hor_res,
            ver_res,
            buffer,
            swap_bytes: false,
            flush_cb: Box::new(flush_cb),
        }
    }

    /// Render words byte-swapped
    pub fn with_swap_bytes(mut self, swap: bool) -> Self {
        self.swap_bytes = swap;
        self
    }

    /// Redraw every invalidated area
    ///
    /// Returns the number of stripes flushed. If a flush is not acknowledged
    /// the unflushed remainder is queued again and
    /// [`UiError::FlushNotReady`] is returned.
    pub(crate) fn refresh(&mut self, tree: &mut WidgetTree) -> Result<u16, UiError> {
        tree.layout();

        let areas = tree.invalid_mut().take();
        let mut flushed = 0u16;

        for (n, area) in areas.iter().enumerate() {
            let width = area.width() as usize;
            let rows = (self.buffer.len() / width.max(1)) as i32;
            if rows == 0 {
                return Err(UiError::BufferTooSmall);
            }

            let mut y = area.y1;
            while y <= area.y2 {
                let stripe = Area::new(area.x1, y, area.x2, (y + rows - 1).min(area.y2));
                let last = n + 1 == areas.len() && stripe.y2 == area.y2;

                let mut target = StripeTarget::new(stripe, &mut *self.buffer, self.swap_bytes);
                draw_tree(tree, &mut target);

                let mut request = FlushRequest::new(stripe, &self.buffer[..stripe.pixel_count()], last);
                (self.flush_cb)(&mut request);

                if !request.is_ready() {
                    tree.invalidate(Area::new(area.x1, y, area.x2, area.y2));
                    for rest in &areas[n + 1..] {
                        tree.invalidate(*rest);
                    }
                    return Err(UiError::FlushNotReady);
                }

                flushed += 1;
                y = stripe.y2 + 1;
            }
        }

        Ok(flushed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_request_acks() {
        let pixels = [0u16; 4];
        let mut request = FlushRequest::new(Area::new(0, 0, 1, 1), &pixels, true);
        assert!(!request.is_ready());
        request.flush_ready();
        assert!(request.is_ready());
        assert_eq!(request.ack_count(), 1);
        assert!(request.is_last());
        assert_eq!(request.pixels().len(), 4);
    }
}
