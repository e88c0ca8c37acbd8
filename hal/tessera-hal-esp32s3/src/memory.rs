//! Memory pools
//!
//! Three `LlffHeap`s back the firmware:
//!
//! - the global allocator in internal RAM (UI bookkeeping, boxed callbacks)
//! - a DMA-capable pool in internal RAM, preferred for the draw buffer
//! - a general pool covering PSRAM, the fallback for the draw buffer and
//!   home of the RGB frame
//!
//! Pool allocations are never freed.

use core::alloc::{GlobalAlloc, Layout};
use core::mem::MaybeUninit;

use embedded_alloc::LlffHeap as Heap;
use esp_hal::peripherals::PSRAM;
use tessera_core::buffer::{MemoryRegion, PixelAllocator};

/// Suggested internal RAM reserved for DMA-capable draw buffers
pub const DMA_POOL_SIZE: usize = 64 * 1024;

static DMA_HEAP: Heap = Heap::empty();
static PSRAM_HEAP: Heap = Heap::empty();

/// Draw buffer pools
pub struct MemoryPools {
    dma: &'static Heap,
    general: Option<&'static Heap>,
}

impl MemoryPools {
    /// Initialize the pools
    ///
    /// `dma_region` must live in internal SRAM. PSRAM is mapped and added as
    /// the general pool when the chip has it. Call once.
    pub fn init(dma_region: &'static mut [MaybeUninit<u8>], psram: &PSRAM<'_>) -> Self {
        // SAFETY: the region is 'static, exclusively borrowed, and handed
        // to the heap exactly once.
        unsafe { DMA_HEAP.init(dma_region.as_mut_ptr() as usize, dma_region.len()) }

        let (start, size) = esp_hal::psram::psram_raw_parts(psram);
        let general = if size > 0 {
            // SAFETY: esp-hal mapped this range for our exclusive use.
            unsafe { PSRAM_HEAP.init(start as usize, size) }
            Some(&PSRAM_HEAP)
        } else {
            None
        };

        Self {
            dma: &DMA_HEAP,
            general,
        }
    }

    /// Free bytes in the general pool, zero without PSRAM
    pub fn general_free(&self) -> usize {
        self.general.map_or(0, |heap| heap.free())
    }

    pub fn dma_free(&self) -> usize {
        self.dma.free()
    }

    fn heap(&self, region: MemoryRegion) -> Option<&'static Heap> {
        match region {
            MemoryRegion::Dma => Some(self.dma),
            MemoryRegion::General => self.general,
        }
    }

    /// Zeroed allocation that is never returned to the pool
    fn alloc_zeroed(&mut self, region: MemoryRegion, layout: Layout) -> Option<*mut u8> {
        let heap = self.heap(region)?;
        // SAFETY: layout has non-zero size (checked by callers).
        let ptr = unsafe { heap.alloc_zeroed(layout) };
        (!ptr.is_null()).then_some(ptr)
    }

    /// Allocate `len` bytes, for frame memory
    pub fn alloc_bytes(&mut self, region: MemoryRegion, len: usize) -> Option<&'static mut [u8]> {
        if len == 0 {
            return None;
        }
        let layout = Layout::from_size_align(len, 4).ok()?;
        let ptr = self.alloc_zeroed(region, layout)?;
        // SAFETY: fresh zeroed allocation of `len` bytes, never freed.
        Some(unsafe { core::slice::from_raw_parts_mut(ptr, len) })
    }
}

impl PixelAllocator for MemoryPools {
    fn alloc_pixels(&mut self, region: MemoryRegion, len: usize) -> Option<&'static mut [u16]> {
        if len == 0 {
            return None;
        }
        let layout = Layout::array::<u16>(len).ok()?;
        let ptr = self.alloc_zeroed(region, layout)? as *mut u16;
        // SAFETY: fresh zeroed allocation of `len` u16s with u16
        // alignment, never freed.
        Some(unsafe { core::slice::from_raw_parts_mut(ptr, len) })
    }
}
