//! Software renderer
//!
//! Widgets are drawn with `embedded-graphics` into a [`StripeTarget`], a
//! window onto the partial draw buffer that clips everything outside the
//! stripe currently being rendered.

use core::convert::Infallible;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::{IntoStorage, Rgb565};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle, RoundedRectangle};
use embedded_graphics::text::{Baseline, Text};

use crate::area::Area;
use crate::widget::{WidgetKind, WidgetTree};

/// Draw target covering one stripe of the screen
///
/// Pixels are stored row-major, `area.width()` words per row, optionally
/// byte-swapped for panels that expect big-endian words in memory.
pub struct StripeTarget<'b> {
    area: Area,
    buf: &'b mut [u16],
    swap: bool,
}

impl<'b> StripeTarget<'b> {
    /// Wrap the first `area.pixel_count()` words of `buf`
    pub fn new(area: Area, buf: &'b mut [u16], swap: bool) -> Self {
        let len = area.pixel_count().min(buf.len());
        Self {
            area,
            buf: &mut buf[..len],
            swap,
        }
    }

    #[inline]
    fn word(&self, color: Rgb565) -> u16 {
        let raw = color.into_storage();
        if self.swap {
            raw.swap_bytes()
        } else {
            raw
        }
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> usize {
        (y - self.area.y1) as usize * self.area.width() as usize + (x - self.area.x1) as usize
    }
}

impl Dimensions for StripeTarget<'_> {
    fn bounding_box(&self) -> Rectangle {
        self.area.to_rectangle()
    }
}

impl DrawTarget for StripeTarget<'_> {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if self.area.contains(point) {
                let idx = self.offset(point.x, point.y);
                let word = self.word(color);
                if let Some(slot) = self.buf.get_mut(idx) {
                    *slot = word;
                }
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, rect: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let Some(clip) = self.area.intersection(&Area::from_rectangle(rect)) else {
            return Ok(());
        };
        let word = self.word(color);
        for y in clip.y1..=clip.y2 {
            let start = self.offset(clip.x1, y);
            let end = start + clip.width() as usize;
            if let Some(row) = self.buf.get_mut(start..end) {
                row.fill(word);
            }
        }
        Ok(())
    }
}

/// Render every widget that overlaps `target`'s stripe
pub fn draw_tree(tree: &WidgetTree, target: &mut StripeTarget<'_>) {
    let theme = tree.theme();
    let stripe = target.area;

    // Infallible target, results can be ignored
    let _ = target.fill_solid(&stripe.to_rectangle(), theme.background);

    for (_, widget) in tree.iter() {
        if stripe.intersection(&widget.area()).is_none() {
            continue;
        }

        match widget.kind() {
            WidgetKind::Screen => {}
            WidgetKind::Button { pressed } => {
                let fill = if *pressed {
                    theme.primary_pressed
                } else {
                    theme.primary
                };
                let radius = Size::new(theme.radius, theme.radius);
                let _ = RoundedRectangle::with_equal_corners(widget.area().to_rectangle(), radius)
                    .into_styled(PrimitiveStyle::with_fill(fill))
                    .draw(target);
            }
            WidgetKind::Label { text } => {
                let on_button = widget
                    .parent()
                    .and_then(|p| tree.get(p))
                    .is_some_and(|p| p.is_clickable());
                let color = if on_button { theme.on_primary } else { theme.text };
                let style = MonoTextStyle::new(theme.font, color);
                let _ = Text::with_baseline(text.as_str(), widget.area().top_left(), style, Baseline::Top)
                    .draw(target);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stripe_clips_pixels() {
        let area = Area::new(10, 10, 13, 11);
        let mut buf = [0u16; 8];
        let mut target = StripeTarget::new(area, &mut buf, false);

        let white = Rgb565::WHITE;
        target
            .draw_iter([
                Pixel(Point::new(10, 10), white),
                Pixel(Point::new(13, 11), white),
                Pixel(Point::new(9, 10), white),
                Pixel(Point::new(10, 12), white),
            ])
            .unwrap();

        assert_eq!(buf[0], 0xFFFF);
        assert_eq!(buf[7], 0xFFFF);
        assert_eq!(buf.iter().filter(|&&w| w != 0).count(), 2);
    }

    #[test]
    fn test_draw_iter_swapped() {
        let area = Area::new(0, 0, 1, 1);
        let mut buf = [0u16; 4];
        let mut target = StripeTarget::new(area, &mut buf, true);

        target
            .draw_iter([Pixel(Point::new(1, 1), Rgb565::RED), Pixel(Point::new(0, 0), Rgb565::BLUE)])
            .unwrap();

        assert_eq!(buf, [0x001Fu16.swap_bytes(), 0, 0, 0xF800u16.swap_bytes()]);
    }

    #[test]
    fn test_fill_solid_swapped() {
        let area = Area::new(0, 0, 3, 1);
        let mut buf = [0u16; 8];
        let mut target = StripeTarget::new(area, &mut buf, true);

        target
            .fill_solid(&Rectangle::new(Point::new(2, 0), Size::new(10, 10)), Rgb565::RED)
            .unwrap();

        let red_swapped = 0xF800u16.swap_bytes();
        assert_eq!(buf, [0, 0, red_swapped, red_swapped, 0, 0, red_swapped, red_swapped]);
    }
}
