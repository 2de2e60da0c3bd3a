use core::fmt;
use std::cell::{Cell, Ref, RefCell};

use tegra_hw::block_linear;

use crate::address_space::GpuAddressSpace;
use crate::backend::SurfaceBackend;
use crate::error::{SurfaceError, SurfaceResult};
use crate::guest_memory::GuestMemory;
use crate::surface_params::{SurfaceParams, SurfaceType};

/// One host texture backing a guest surface, plus its CPU staging copy.
///
/// Data moves in two hops: guest memory <-> staging buffer (`load_staging_buffer` /
/// `flush_staging_buffer`, handling tiling) and staging buffer <-> texture (`upload_texture` /
/// `download_texture`, the only calls that reach the graphics API).
pub struct CachedSurface<B: SurfaceBackend> {
    texture: B::Texture,
    params: SurfaceParams,
    staging: RefCell<Vec<u8>>,
    dirty: Cell<bool>,
}

impl<B: SurfaceBackend> CachedSurface<B> {
    pub fn new(backend: &B, params: SurfaceParams) -> SurfaceResult<Self> {
        let texture = backend.create_texture(&params)?;
        Ok(Self {
            texture,
            params,
            staging: RefCell::new(vec![0u8; params.size_in_bytes as usize]),
            dirty: Cell::new(false),
        })
    }

    pub fn texture(&self) -> &B::Texture {
        &self.texture
    }

    pub fn params(&self) -> &SurfaceParams {
        &self.params
    }

    /// Whether the texture holds writes not yet flushed to guest memory.
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub(crate) fn set_dirty(&self, dirty: bool) {
        self.dirty.set(dirty);
    }

    pub fn staging_data(&self) -> Ref<'_, [u8]> {
        Ref::map(self.staging.borrow(), |v| v.as_slice())
    }

    fn guest_cpu_addr(&self, address_space: &impl GpuAddressSpace) -> SurfaceResult<u64> {
        self.params
            .cpu_addr(address_space)
            .ok_or(SurfaceError::UnmappedAddress(self.params.addr))
    }

    fn assert_transferable(&self) {
        assert_ne!(
            self.params.surface_type,
            SurfaceType::Fill,
            "fill surface at 0x{:x} has no guest memory backing",
            self.params.addr
        );
        assert_eq!(
            self.staging.borrow().len() as u64,
            self.params.size_in_bytes,
            "staging buffer of surface at 0x{:x} does not match its size",
            self.params.addr
        );
    }

    /// Copies guest memory into the staging buffer, de-tiling block-linear surfaces.
    pub fn load_staging_buffer(
        &self,
        memory: &impl GuestMemory,
        address_space: &impl GpuAddressSpace,
    ) -> SurfaceResult<()> {
        self.assert_transferable();
        let cpu_addr = self.guest_cpu_addr(address_space)?;
        let params = &self.params;
        let mut staging = self.staging.borrow_mut();

        if params.is_tiled {
            let mut tiled = vec![0u8; params.guest_footprint() as usize];
            memory.read(cpu_addr, &mut tiled)?;
            block_linear::unswizzle(
                &tiled,
                &mut staging,
                params.width_in_blocks(),
                params.height_in_blocks(),
                params.bytes_per_block(),
                params.block_height,
            );
        } else {
            memory.read(cpu_addr, &mut staging)?;
        }
        Ok(())
    }

    /// Writes the staging buffer back to guest memory, re-tiling block-linear surfaces.
    ///
    /// Tiled surfaces read their guest footprint first so bytes in the alignment padding are
    /// preserved.
    pub fn flush_staging_buffer(
        &self,
        memory: &impl GuestMemory,
        address_space: &impl GpuAddressSpace,
    ) -> SurfaceResult<()> {
        self.assert_transferable();
        let cpu_addr = self.guest_cpu_addr(address_space)?;
        let params = &self.params;
        let staging = self.staging.borrow();

        if params.is_tiled {
            let mut tiled = vec![0u8; params.guest_footprint() as usize];
            memory.read(cpu_addr, &mut tiled)?;
            block_linear::swizzle(
                &staging,
                &mut tiled,
                params.width_in_blocks(),
                params.height_in_blocks(),
                params.bytes_per_block(),
                params.block_height,
            );
            memory.write(cpu_addr, &tiled)?;
        } else {
            memory.write(cpu_addr, &staging)?;
        }
        Ok(())
    }

    pub fn upload_texture(
        &self,
        backend: &B,
        read_fb: &B::Framebuffer,
        draw_fb: &B::Framebuffer,
    ) -> SurfaceResult<()> {
        backend.upload_texture(
            &self.texture,
            &self.params,
            &self.staging.borrow(),
            read_fb,
            draw_fb,
        )
    }

    pub fn download_texture(
        &self,
        backend: &B,
        read_fb: &B::Framebuffer,
        draw_fb: &B::Framebuffer,
    ) -> SurfaceResult<()> {
        backend.download_texture(
            &self.texture,
            &self.params,
            &mut self.staging.borrow_mut(),
            read_fb,
            draw_fb,
        )
    }
}

impl<B: SurfaceBackend> fmt::Debug for CachedSurface<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedSurface")
            .field("params", &self.params)
            .field("dirty", &self.dirty.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address_space::GpuMemoryManager;
    use crate::backend::SoftwareBackend;
    use crate::guest_memory::VecGuestMemory;
    use crate::surface_params::{ComponentType, PixelFormat};
    use pretty_assertions::assert_eq;

    fn params(is_tiled: bool) -> SurfaceParams {
        let mut p = SurfaceParams {
            addr: 0x10_0000,
            is_tiled,
            block_height: 1,
            pixel_format: PixelFormat::ABGR8,
            component_type: ComponentType::UNorm,
            surface_type: SurfaceType::ColorTexture,
            width: 16,
            height: 8,
            unaligned_height: 8,
            size_in_bytes: 0,
        };
        p.size_in_bytes = p.compute_size_in_bytes();
        p
    }

    fn setup() -> (VecGuestMemory, GpuMemoryManager) {
        let mut mm = GpuMemoryManager::with_page_bits(12);
        mm.map(0x10_0000, 0x4000, 0x1000);
        (VecGuestMemory::new(0x8000), mm)
    }

    #[test]
    fn linear_load_copies_guest_bytes() {
        let (mem, mm) = setup();
        let pattern: Vec<u8> = (0..512u32).map(|i| i as u8).collect();
        mem.write(0x4000, &pattern).unwrap();

        let backend = SoftwareBackend::new();
        let surface = CachedSurface::new(&backend, params(false)).unwrap();
        surface.load_staging_buffer(&mem, &mm).unwrap();
        assert_eq!(&*surface.staging_data(), pattern.as_slice());
    }

    #[test]
    fn tiled_load_unswizzles() {
        let (mem, mm) = setup();
        // First 16 bytes of row 1 live at intra-GOB offset 16.
        mem.write(0x4000 + 16, &[0xAA; 16]).unwrap();

        let backend = SoftwareBackend::new();
        let surface = CachedSurface::new(&backend, params(true)).unwrap();
        surface.load_staging_buffer(&mem, &mm).unwrap();
        let staging = surface.staging_data();
        assert_eq!(&staging[64..80], &[0xAA; 16]);
        assert_eq!(&staging[0..16], &[0; 16]);
    }

    #[test]
    fn tiled_flush_round_trips_through_guest_memory() {
        let (mem, mm) = setup();
        let pattern: Vec<u8> = (0..512u32).map(|i| (i * 7) as u8).collect();
        mem.write(0x4000, &pattern).unwrap();

        let backend = SoftwareBackend::new();
        let (read_fb, draw_fb) = (backend.create_framebuffer(), backend.create_framebuffer());
        let surface = CachedSurface::new(&backend, params(true)).unwrap();
        surface.load_staging_buffer(&mem, &mm).unwrap();
        surface.upload_texture(&backend, &read_fb, &draw_fb).unwrap();

        mem.write(0x4000, &[0u8; 512]).unwrap();
        surface.download_texture(&backend, &read_fb, &draw_fb).unwrap();
        surface.flush_staging_buffer(&mem, &mm).unwrap();
        assert_eq!(&mem.as_slice()[0x4000..0x4200], pattern.as_slice());
    }

    #[test]
    fn unmapped_surface_fails_to_load() {
        let (mem, _) = setup();
        let backend = SoftwareBackend::new();
        let surface = CachedSurface::new(&backend, params(false)).unwrap();
        assert_eq!(
            surface.load_staging_buffer(&mem, &GpuMemoryManager::new()),
            Err(SurfaceError::UnmappedAddress(0x10_0000))
        );
    }

    #[test]
    #[should_panic(expected = "fill surface")]
    fn fill_surfaces_cannot_be_loaded() {
        let (mem, mm) = setup();
        let mut p = params(false);
        p.surface_type = SurfaceType::Fill;
        let surface = CachedSurface::new(&SoftwareBackend::new(), p).unwrap();
        let _ = surface.load_staging_buffer(&mem, &mm);
    }
}
