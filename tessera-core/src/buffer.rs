//! Draw buffer allocation
//!
//! The UI renders into one partial buffer of RGB565 words. DMA-capable
//! internal RAM is preferred so the panel driver can stream straight from it;
//! general memory (PSRAM on boards that have it) is the fallback. The buffer
//! is allocated once and never freed.

/// Memory pool a buffer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MemoryRegion {
    /// DMA-capable internal RAM
    Dma,
    /// General-purpose heap
    General,
}

/// Neither pool could provide the requested buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AllocationFailure {
    /// Pixel units requested
    pub requested: usize,
}

/// Pool-aware allocator for pixel storage
///
/// Implementations hand out zero-initialized slices that are never returned.
pub trait PixelAllocator {
    /// Allocate `len` pixel units from `region`, or `None` if the pool is
    /// exhausted or absent
    fn alloc_pixels(&mut self, region: MemoryRegion, len: usize) -> Option<&'static mut [u16]>;
}

/// Allocated draw buffer
#[derive(Debug)]
pub struct FrameBuffer {
    pixels: &'static mut [u16],
    region: MemoryRegion,
}

impl FrameBuffer {
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Pool that satisfied the request
    pub fn region(&self) -> MemoryRegion {
        self.region
    }

    /// Hand the pixels over to the display registration
    pub fn into_pixels(self) -> &'static mut [u16] {
        self.pixels
    }
}

/// Pixel units for a `width` x `height` screen split `divisor` ways
pub fn pixel_units(width: u16, height: u16, divisor: u32) -> usize {
    if divisor == 0 {
        return 0;
    }
    width as usize * height as usize / divisor as usize
}

/// Allocate the draw buffer, DMA pool first
///
/// A request that works out to zero pixel units fails like an exhausted
/// pool.
pub fn allocate<A: PixelAllocator + ?Sized>(
    width: u16,
    height: u16,
    divisor: u32,
    allocator: &mut A,
) -> Result<FrameBuffer, AllocationFailure> {
    let requested = pixel_units(width, height, divisor);
    if requested == 0 {
        return Err(AllocationFailure { requested });
    }

    [MemoryRegion::Dma, MemoryRegion::General]
        .into_iter()
        .find_map(|region| {
            allocator
                .alloc_pixels(region, requested)
                .filter(|pixels| pixels.len() == requested)
                .map(|pixels| FrameBuffer { pixels, region })
        })
        .ok_or(AllocationFailure { requested })
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::boxed::Box;
    use std::vec;
    use std::vec::Vec;

    /// Pools with fixed capacities, recording every request
    struct MockAllocator {
        dma_free: usize,
        general_free: usize,
        requests: Vec<(MemoryRegion, usize)>,
    }

    impl MockAllocator {
        fn new(dma_free: usize, general_free: usize) -> Self {
            Self {
                dma_free,
                general_free,
                requests: Vec::new(),
            }
        }
    }

    impl PixelAllocator for MockAllocator {
        fn alloc_pixels(&mut self, region: MemoryRegion, len: usize) -> Option<&'static mut [u16]> {
            self.requests.push((region, len));
            let free = match region {
                MemoryRegion::Dma => &mut self.dma_free,
                MemoryRegion::General => &mut self.general_free,
            };
            if *free < len {
                return None;
            }
            *free -= len;
            Some(Box::leak(vec![0u16; len].into_boxed_slice()))
        }
    }

    #[test]
    fn test_quarter_screen_request() {
        assert_eq!(pixel_units(800, 480, 4), 96_000);
        assert_eq!(pixel_units(320, 240, 4), 19_200);
        assert_eq!(pixel_units(800, 480, 0), 0);
    }

    #[test]
    fn test_prefers_dma_pool() {
        let mut alloc = MockAllocator::new(200_000, 200_000);
        let buffer = allocate(800, 480, 4, &mut alloc).unwrap();
        assert_eq!(buffer.len(), 96_000);
        assert_eq!(buffer.region(), MemoryRegion::Dma);
        assert_eq!(alloc.requests, [(MemoryRegion::Dma, 96_000)]);
    }

    #[test]
    fn test_falls_back_to_general_pool() {
        let mut alloc = MockAllocator::new(50_000, 200_000);
        let buffer = allocate(800, 480, 4, &mut alloc).unwrap();
        assert_eq!(buffer.region(), MemoryRegion::General);
        assert_eq!(
            alloc.requests,
            [(MemoryRegion::Dma, 96_000), (MemoryRegion::General, 96_000)]
        );
    }

    #[test]
    fn test_both_pools_exhausted() {
        let mut alloc = MockAllocator::new(0, 1000);
        assert_eq!(
            allocate(800, 480, 4, &mut alloc).unwrap_err(),
            AllocationFailure { requested: 96_000 }
        );
    }

    #[test]
    fn test_zero_sized_request_fails() {
        let mut alloc = MockAllocator::new(1000, 1000);
        assert!(allocate(0, 480, 4, &mut alloc).is_err());
        assert!(allocate(2, 1, 4, &mut alloc).is_err());
        assert!(alloc.requests.is_empty());
    }
}
