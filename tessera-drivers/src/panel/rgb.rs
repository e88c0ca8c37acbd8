//! Parallel RGB panel
//!
//! An RGB panel has no frame memory of its own; the LCD peripheral scans a
//! full frame out of RAM. Blocks are copied into that frame at their screen
//! position as little-endian RGB565 words, then the frame is presented.

use tessera_hal::panel::{ByteOrder, DisplayPanel, FrameSink};

use super::{check_block, PanelError};

/// Bytes per RGB565 pixel
const BYTES_PER_PIXEL: usize = 2;

/// RGB panel backed by a [`FrameSink`]
pub struct RgbPanel<S> {
    sink: S,
    width: u16,
    height: u16,
}

impl<S: FrameSink> RgbPanel<S> {
    pub fn new(sink: S, width: u16, height: u16) -> Self {
        Self { sink, width, height }
    }

    /// Access the frame sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * BYTES_PER_PIXEL
    }
}

impl<S: FrameSink> DisplayPanel for RgbPanel<S> {
    type Error = PanelError;

    fn begin(&mut self) -> Result<(), PanelError> {
        self.sink.begin().map_err(|_| PanelError::Bus)?;
        let len = self.frame_len();
        let frame = self.sink.frame_mut();
        if frame.len() < len {
            return Err(PanelError::FrameSize);
        }
        frame[..len].fill(0);
        self.sink.present().map_err(|_| PanelError::Bus)
    }

    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }

    fn draw_pixel_block(
        &mut self,
        x: u16,
        y: u16,
        pixels: &[u16],
        w: u16,
        h: u16,
        order: ByteOrder,
    ) -> Result<(), PanelError> {
        check_block(self.width, self.height, x, y, w, h, pixels.len())?;

        let stride = self.width as usize * BYTES_PER_PIXEL;
        let len = self.frame_len();
        let frame = self.sink.frame_mut();
        if frame.len() < len {
            return Err(PanelError::FrameSize);
        }

        for (row, src) in pixels.chunks_exact(w as usize).take(h as usize).enumerate() {
            let start = (y as usize + row) * stride + x as usize * BYTES_PER_PIXEL;
            let dst = &mut frame[start..start + w as usize * BYTES_PER_PIXEL];
            for (bytes, &word) in dst.chunks_exact_mut(BYTES_PER_PIXEL).zip(src) {
                bytes.copy_from_slice(&order.to_le_bytes(word));
            }
        }

        self.sink.present().map_err(|_| PanelError::Bus)
    }
}
