//! GPU virtual address space: translation to guest CPU addresses and cached-region tracking.

use std::cell::RefCell;
use std::collections::BTreeMap;

use tegra_hw::{GpuVAddr, VAddr};

/// Translation of guest GPU virtual addresses, as owned by the GPU memory manager.
pub trait GpuAddressSpace {
    /// Returns the guest CPU address backing `gpu_addr`, or `None` if it is unmapped.
    fn gpu_to_cpu_address(&self, gpu_addr: GpuVAddr) -> Option<VAddr>;

    /// Notifies the guest write tracker that `[gpu_addr, gpu_addr + size)` gained (`cached ==
    /// true`) or lost its last cached surface.
    fn mark_region_cached(&self, gpu_addr: GpuVAddr, size: u64, cached: bool) {
        let _ = (gpu_addr, size, cached);
    }
}

impl<A: GpuAddressSpace + ?Sized> GpuAddressSpace for &A {
    fn gpu_to_cpu_address(&self, gpu_addr: GpuVAddr) -> Option<VAddr> {
        (**self).gpu_to_cpu_address(gpu_addr)
    }

    fn mark_region_cached(&self, gpu_addr: GpuVAddr, size: u64, cached: bool) {
        (**self).mark_region_cached(gpu_addr, size, cached)
    }
}

/// One `mark_region_cached` notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedRegionEvent {
    pub addr: GpuVAddr,
    pub size: u64,
    pub cached: bool,
}

/// Page-granular GPU to CPU mapping table.
///
/// Records every cached-region notification so the caller can forward it to its write tracker
/// (see [`GpuMemoryManager::take_cached_region_events`]).
#[derive(Debug)]
pub struct GpuMemoryManager {
    page_bits: u32,
    pages: BTreeMap<u64, VAddr>,
    events: RefCell<Vec<CachedRegionEvent>>,
}

impl GpuMemoryManager {
    pub const DEFAULT_PAGE_BITS: u32 = 16;

    pub fn new() -> Self {
        Self::with_page_bits(Self::DEFAULT_PAGE_BITS)
    }

    pub fn with_page_bits(page_bits: u32) -> Self {
        assert!(page_bits < 64, "page_bits {page_bits} out of range");
        Self {
            page_bits,
            pages: BTreeMap::new(),
            events: RefCell::new(Vec::new()),
        }
    }

    pub fn page_size(&self) -> u64 {
        1 << self.page_bits
    }

    /// Maps `size` bytes at `gpu_addr` to guest CPU memory at `cpu_addr`.
    ///
    /// # Panics
    ///
    /// Panics if either address or `size` is not page aligned.
    pub fn map(&mut self, gpu_addr: GpuVAddr, cpu_addr: VAddr, size: u64) {
        let mask = self.page_size() - 1;
        assert!(
            gpu_addr & mask == 0 && cpu_addr & mask == 0 && size & mask == 0,
            "unaligned mapping gpu=0x{gpu_addr:x} cpu=0x{cpu_addr:x} size=0x{size:x}"
        );
        let first = gpu_addr >> self.page_bits;
        for i in 0..(size >> self.page_bits) {
            self.pages.insert(first + i, cpu_addr + (i << self.page_bits));
        }
    }

    pub fn unmap(&mut self, gpu_addr: GpuVAddr, size: u64) {
        let first = gpu_addr >> self.page_bits;
        let last = (gpu_addr + size).div_ceil(self.page_size());
        let doomed: Vec<u64> = self.pages.range(first..last).map(|(&p, _)| p).collect();
        for page in doomed {
            self.pages.remove(&page);
        }
    }

    pub fn take_cached_region_events(&self) -> Vec<CachedRegionEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

impl Default for GpuMemoryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl GpuAddressSpace for GpuMemoryManager {
    fn gpu_to_cpu_address(&self, gpu_addr: GpuVAddr) -> Option<VAddr> {
        let base = self.pages.get(&(gpu_addr >> self.page_bits))?;
        Some(base + (gpu_addr & (self.page_size() - 1)))
    }

    fn mark_region_cached(&self, addr: GpuVAddr, size: u64, cached: bool) {
        self.events
            .borrow_mut()
            .push(CachedRegionEvent { addr, size, cached });
    }
}
