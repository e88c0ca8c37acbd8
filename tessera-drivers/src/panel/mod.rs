//! Display panel drivers

pub mod ili9341;
pub mod rgb;

pub use ili9341::Ili9341;
pub use rgb::RgbPanel;

/// Panel driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelError {
    /// Underlying bus or frame sink failed
    Bus,
    /// Block extends past the panel edge
    OutOfBounds,
    /// Fewer pixels than `w * h`
    ShortBuffer,
    /// Frame sink is smaller than the panel
    FrameSize,
}

/// Check that a `w` x `h` block at (`x`, `y`) fits a `width` x `height`
/// panel and that `pixels` holds enough words
pub(crate) fn check_block(
    width: u16,
    height: u16,
    x: u16,
    y: u16,
    w: u16,
    h: u16,
    pixels: usize,
) -> Result<(), PanelError> {
    if w == 0 || h == 0 || x as u32 + w as u32 > width as u32 || y as u32 + h as u32 > height as u32 {
        return Err(PanelError::OutOfBounds);
    }
    if pixels < w as usize * h as usize {
        return Err(PanelError::ShortBuffer);
    }
    Ok(())
}
