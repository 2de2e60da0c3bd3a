//! Graphics API seam of the surface cache.
//!
//! A backend owns the host textures and the two scratch framebuffer objects the cache uses to
//! move pixel data between CPU staging buffers and textures.

mod software;
#[cfg(feature = "wgpu")]
mod wgpu_backend;

pub use software::{SoftwareBackend, SoftwareFramebuffer, SoftwareTexture};
#[cfg(feature = "wgpu")]
pub use wgpu_backend::{WgpuFramebuffer, WgpuSurfaceBackend, WgpuTexture};

use crate::error::SurfaceResult;
use crate::surface_params::SurfaceParams;

pub trait SurfaceBackend {
    type Texture;
    /// Scratch object used as the read or draw side of a transfer.
    type Framebuffer;

    /// Allocates a texture matching `params` (format, width, height).
    fn create_texture(&self, params: &SurfaceParams) -> SurfaceResult<Self::Texture>;

    fn create_framebuffer(&self) -> Self::Framebuffer;

    /// Replaces the texture contents with `data`, a tightly packed linear image of
    /// `params.size_in_bytes` bytes.
    fn upload_texture(
        &self,
        texture: &Self::Texture,
        params: &SurfaceParams,
        data: &[u8],
        read_fb: &Self::Framebuffer,
        draw_fb: &Self::Framebuffer,
    ) -> SurfaceResult<()>;

    /// Reads the texture contents back into `data` (same layout as for upload).
    fn download_texture(
        &self,
        texture: &Self::Texture,
        params: &SurfaceParams,
        data: &mut [u8],
        read_fb: &Self::Framebuffer,
        draw_fb: &Self::Framebuffer,
    ) -> SurfaceResult<()>;
}
