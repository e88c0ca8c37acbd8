//! Display panel abstractions
//!
//! A panel accepts rectangular blocks of RGB565 pixels. Pixel data always
//! arrives as `u16` words; [`ByteOrder`] tells the panel how those words were
//! laid out by the renderer.

/// Word layout of RGB565 pixel data handed to a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ByteOrder {
    /// Host-order RGB565 words
    #[default]
    Native,
    /// Words with their two bytes pre-swapped (big-endian in memory)
    Swapped,
}

impl ByteOrder {
    /// Select the byte order from a "swap bytes" configuration flag
    pub const fn from_swap(swap: bool) -> Self {
        if swap {
            ByteOrder::Swapped
        } else {
            ByteOrder::Native
        }
    }

    /// Convert a pixel word in this order to big-endian wire bytes
    ///
    /// SPI panel controllers expect the high byte first.
    #[inline]
    pub const fn to_be_bytes(self, word: u16) -> [u8; 2] {
        match self {
            ByteOrder::Native => word.to_be_bytes(),
            // Already swapped in memory: the little-endian view is the
            // original big-endian byte sequence.
            ByteOrder::Swapped => word.to_le_bytes(),
        }
    }

    /// Convert a pixel word in this order to little-endian bytes
    ///
    /// Parallel RGB scan-out reads 16-bit words from memory little-endian.
    #[inline]
    pub const fn to_le_bytes(self, word: u16) -> [u8; 2] {
        match self {
            ByteOrder::Native => word.to_le_bytes(),
            ByteOrder::Swapped => word.to_be_bytes(),
        }
    }
}

/// Display panel
///
/// The panel owns its bus and knows its own resolution. Drawing is blocking:
/// `draw_pixel_block` returns once the pixels have been handed to hardware.
pub trait DisplayPanel {
    /// Error type for panel operations
    type Error;

    /// Bring the panel up (reset, init sequence, display on)
    fn begin(&mut self) -> Result<(), Self::Error>;

    /// Panel width in pixels
    fn width(&self) -> u16;

    /// Panel height in pixels
    fn height(&self) -> u16;

    /// Draw a `w` x `h` block of pixels with its top-left corner at (`x`, `y`)
    ///
    /// `pixels` holds at least `w * h` words in row-major order.
    fn draw_pixel_block(
        &mut self,
        x: u16,
        y: u16,
        pixels: &[u16],
        w: u16,
        h: u16,
        order: ByteOrder,
    ) -> Result<(), Self::Error>;
}

/// Full-frame scan-out target
///
/// Parallel RGB panels have no frame memory of their own; the MCU keeps the
/// whole frame in RAM and streams it out. Implementations own that buffer.
pub trait FrameSink {
    /// Error type for scan-out operations
    type Error;

    /// Start continuous scan-out of the frame
    ///
    /// The panel is refreshed from the frame from here on, whether or not
    /// anything is drawn.
    fn begin(&mut self) -> Result<(), Self::Error>;

    /// Mutable access to the frame bytes (2 bytes per pixel, row-major)
    fn frame_mut(&mut self) -> &mut [u8];

    /// Make writes through [`frame_mut`](Self::frame_mut) visible to the scan-out
    fn present(&mut self) -> Result<(), Self::Error>;
}
