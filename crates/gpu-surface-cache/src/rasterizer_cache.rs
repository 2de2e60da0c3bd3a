//! The surface cache manager.

use std::rc::Rc;

use hashbrown::HashMap;
use tegra_hw::{FramebufferRegs, FullTextureInfo, GpuVAddr, Rectangle, VAddr};

use crate::address_space::GpuAddressSpace;
use crate::backend::SurfaceBackend;
use crate::cached_surface::CachedSurface;
use crate::config::RasterizerCacheConfig;
use crate::error::SurfaceResult;
use crate::guest_memory::GuestMemory;
use crate::page_index::PageIndex;
use crate::stats::SurfaceCacheStats;
use crate::surface_params::{SurfaceKey, SurfaceParams};

/// Shared handle to a cached surface.
pub type Surface<B> = Rc<CachedSurface<B>>;

/// Surfaces bound as the current render targets.
pub struct FramebufferSurfaces<B: SurfaceBackend> {
    pub color: Option<Surface<B>>,
    pub depth: Option<Surface<B>>,
    /// Viewport clipped to the bound surfaces; empty when nothing is bound.
    pub rect: Rectangle<u32>,
}

/// Maps guest GPU memory onto host textures.
///
/// Surfaces are looked up by exact [`SurfaceParams`] match. Each registered surface bumps the
/// occupancy of the GPU pages it spans, which lets [`RasterizerCache::flush_region`] and
/// [`RasterizerCache::invalidate_region`] skip regions no surface touches.
pub struct RasterizerCache<B: SurfaceBackend, M, A> {
    backend: B,
    memory: M,
    address_space: A,
    config: RasterizerCacheConfig,

    surface_cache: HashMap<SurfaceKey, Surface<B>>,
    cached_pages: PageIndex,

    read_framebuffer: B::Framebuffer,
    draw_framebuffer: B::Framebuffer,

    stats: SurfaceCacheStats,
}

impl<B, M, A> RasterizerCache<B, M, A>
where
    B: SurfaceBackend,
    M: GuestMemory,
    A: GpuAddressSpace,
{
    pub fn new(backend: B, memory: M, address_space: A, config: RasterizerCacheConfig) -> Self {
        let read_framebuffer = backend.create_framebuffer();
        let draw_framebuffer = backend.create_framebuffer();
        Self {
            backend,
            memory,
            address_space,
            cached_pages: PageIndex::new(config.page_bits),
            config,
            surface_cache: HashMap::new(),
            read_framebuffer,
            draw_framebuffer,
            stats: SurfaceCacheStats::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }

    pub fn address_space(&self) -> &A {
        &self.address_space
    }

    pub fn config(&self) -> &RasterizerCacheConfig {
        &self.config
    }

    pub fn stats(&self) -> &SurfaceCacheStats {
        &self.stats
    }

    pub fn cached_pages(&self) -> &PageIndex {
        &self.cached_pages
    }

    pub fn surface_count(&self) -> usize {
        self.surface_cache.len()
    }

    /// Whether any registered surface touches a page of `[addr, addr + size)`.
    pub fn is_region_cached(&self, addr: GpuVAddr, size: u64) -> bool {
        self.cached_pages.intersects(addr, size)
    }

    pub fn read_framebuffer(&self) -> &B::Framebuffer {
        &self.read_framebuffer
    }

    pub fn draw_framebuffer(&self) -> &B::Framebuffer {
        &self.draw_framebuffer
    }

    /// Surface backing a sampled texture, or `None` for a null texture.
    pub fn get_texture_surface(
        &mut self,
        config: &FullTextureInfo,
    ) -> SurfaceResult<Option<Surface<B>>> {
        let params = SurfaceParams::create_for_texture(config)?;
        self.get_surface(params)
    }

    /// Resolves the colour (render target 0) and depth surfaces of the bound framebuffer.
    pub fn get_framebuffer_surfaces(
        &mut self,
        regs: &FramebufferRegs,
        using_color_fb: bool,
        using_depth_fb: bool,
        viewport: &Rectangle<i32>,
    ) -> SurfaceResult<FramebufferSurfaces<B>> {
        let color = if using_color_fb {
            self.get_surface(SurfaceParams::create_for_framebuffer(&regs.color)?)?
        } else {
            None
        };
        let depth = if using_depth_fb {
            self.get_surface(SurfaceParams::create_for_depth_buffer(&regs.zeta)?)?
        } else {
            None
        };

        let bound = color
            .iter()
            .chain(depth.iter())
            .map(|surface| surface.params().rect())
            .reduce(|a, b| a.intersect(&b));
        let rect = match bound {
            Some(bound) => {
                let clipped = viewport.intersect(&bound.to_signed()).to_unsigned();
                if clipped.is_empty() {
                    Rectangle::default()
                } else {
                    clipped
                }
            }
            None => Rectangle::default(),
        };

        Ok(FramebufferSurfaces { color, depth, rect })
    }

    /// Records that `surface`'s texture was rendered to and no longer matches guest memory.
    ///
    /// With accurate framebuffers the texture is written back immediately instead.
    pub fn mark_surface_as_dirty(&mut self, surface: &Surface<B>) -> SurfaceResult<()> {
        if self.config.use_accurate_framebuffers {
            self.write_back(surface)?;
        } else {
            surface.set_dirty(true);
        }
        Ok(())
    }

    /// Finds the registered surface backing guest CPU address `cpu_addr`.
    ///
    /// Scanout framebuffers are configured by CPU address, so this searches by translated
    /// range. A surface starting exactly at `cpu_addr` wins over one merely containing it.
    pub fn try_find_framebuffer_surface(&self, cpu_addr: VAddr) -> Option<Surface<B>> {
        self.surface_cache
            .values()
            .filter_map(|surface| {
                let params = surface.params();
                let start = params.cpu_addr(&self.address_space)?;
                let end = start.saturating_add(params.size_in_bytes);
                (start..end)
                    .contains(&cpu_addr)
                    .then_some((start != cpu_addr, start, params.addr, surface))
            })
            .min_by_key(|&(inexact, start, gpu_addr, _)| (inexact, start, gpu_addr))
            .map(|(.., surface)| Rc::clone(surface))
    }

    /// Writes every dirty surface overlapping `[addr, addr + size)` back to guest memory.
    pub fn flush_region(&mut self, addr: GpuVAddr, size: u64) -> SurfaceResult<()> {
        if !self.overlaps_cached_pages(addr, size) {
            return Ok(());
        }

        let mut dirty: Vec<Surface<B>> = self
            .surface_cache
            .values()
            .filter(|s| s.is_dirty() && s.params().is_overlapping_region(addr, size))
            .cloned()
            .collect();
        dirty.sort_by_key(|s| s.params().addr);

        for surface in dirty {
            self.write_back(&surface)?;
            surface.set_dirty(false);
        }
        Ok(())
    }

    /// Drops every surface overlapping `[addr, addr + size)` from the cache.
    ///
    /// Pending writes of dirty surfaces are discarded.
    pub fn invalidate_region(&mut self, addr: GpuVAddr, size: u64) {
        if !self.overlaps_cached_pages(addr, size) {
            return;
        }

        let doomed: Vec<Surface<B>> = self
            .surface_cache
            .values()
            .filter(|s| s.params().is_overlapping_region(addr, size))
            .cloned()
            .collect();

        for surface in doomed {
            if surface.is_dirty() {
                self.stats.inc_dirty_discards();
                tracing::debug!(
                    addr = surface.params().addr,
                    size = surface.params().size_in_bytes,
                    "discarding dirty surface"
                );
            }
            self.unregister_surface(&surface);
            self.stats.inc_invalidations();
        }
    }

    /// Page-index prefilter; widened by one byte on each side to match the inclusive overlap
    /// test.
    fn overlaps_cached_pages(&self, addr: GpuVAddr, size: u64) -> bool {
        let start = addr.saturating_sub(1);
        let end = addr.saturating_add(size).saturating_add(1);
        self.cached_pages.intersects(start, end - start)
    }

    fn write_back(&self, surface: &Surface<B>) -> SurfaceResult<()> {
        surface.download_texture(&self.backend, &self.read_framebuffer, &self.draw_framebuffer)?;
        self.stats.inc_downloads();
        surface.flush_staging_buffer(&self.memory, &self.address_space)?;
        self.stats.inc_flushes();
        tracing::debug!(
            addr = surface.params().addr,
            size = surface.params().size_in_bytes,
            "flushed surface"
        );
        Ok(())
    }

    fn load_surface(&self, surface: &Surface<B>) -> SurfaceResult<()> {
        surface.load_staging_buffer(&self.memory, &self.address_space)?;
        self.stats.inc_loads();
        surface.upload_texture(&self.backend, &self.read_framebuffer, &self.draw_framebuffer)?;
        self.stats.inc_uploads();
        Ok(())
    }

    fn get_surface(&mut self, params: SurfaceParams) -> SurfaceResult<Option<Surface<B>>> {
        if params.addr == 0 || u64::from(params.width) * u64::from(params.height) == 0 {
            return Ok(None);
        }
        if params.cpu_addr(&self.address_space).is_none() {
            tracing::debug!(addr = params.addr, "surface address is not mapped");
            return Ok(None);
        }

        let key = SurfaceKey::new(params);
        if let Some(surface) = self.surface_cache.get(&key) {
            let surface = Rc::clone(surface);
            self.stats.inc_hits();
            if self.config.use_accurate_framebuffers {
                self.load_surface(&surface)?;
            }
            return Ok(Some(surface));
        }

        self.stats.inc_misses();
        tracing::debug!(
            addr = params.addr,
            format = ?params.pixel_format,
            width = params.width,
            height = params.height,
            "creating surface"
        );
        let surface = Rc::new(CachedSurface::new(&self.backend, params)?);
        self.register_surface(key, &surface);
        if let Err(err) = self.load_surface(&surface) {
            self.unregister_surface(&surface);
            return Err(err);
        }
        Ok(Some(surface))
    }

    fn register_surface(&mut self, key: SurfaceKey, surface: &Surface<B>) {
        let params = *surface.params();
        let previous = self.surface_cache.insert(key, Rc::clone(surface));
        assert!(
            previous.is_none(),
            "surface at 0x{:x} registered twice",
            params.addr
        );
        self.update_pages_cached_count(params.addr, params.size_in_bytes, 1);
    }

    fn unregister_surface(&mut self, surface: &Surface<B>) {
        let params = *surface.params();
        let removed = self.surface_cache.remove(&SurfaceKey::new(params));
        assert!(
            removed.is_some(),
            "surface at 0x{:x} is not registered",
            params.addr
        );
        self.update_pages_cached_count(params.addr, params.size_in_bytes, -1);
    }

    /// Applies `delta` to the pages covering `[addr, addr + size)` and reports pages that
    /// became (un)cached to the address space.
    fn update_pages_cached_count(&mut self, addr: GpuVAddr, size: u64, delta: i32) {
        let page_bits = self.cached_pages.page_bits();
        for t in self.cached_pages.update(addr, size, delta) {
            self.address_space.mark_region_cached(
                t.start << page_bits,
                (t.end - t.start) << page_bits,
                t.cached,
            );
        }
    }
}
