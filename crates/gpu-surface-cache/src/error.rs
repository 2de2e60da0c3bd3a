use thiserror::Error;

use crate::guest_memory::GuestMemoryError;
use crate::surface_params::PixelFormat;

/// Errors surfaced by the surface cache and its backends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("unimplemented texture format 0x{0:02x}")]
    UnimplementedTextureFormat(u32),

    #[error("unimplemented render target format 0x{0:02x}")]
    UnimplementedRenderTargetFormat(u32),

    #[error("unimplemented depth format 0x{0:02x}")]
    UnimplementedDepthFormat(u32),

    #[error("unimplemented component type {0}")]
    UnimplementedComponentType(u32),

    #[error("unimplemented framebuffer pixel format {0}")]
    UnimplementedFramebufferPixelFormat(u32),

    /// The pixel format has no encoding on the requested side (guest texture format or host
    /// texture format).
    #[error("pixel format {format:?} has no {target} representation")]
    UnsupportedPixelFormat {
        format: PixelFormat,
        target: &'static str,
    },

    #[error("GPU address 0x{0:x} is not mapped to guest memory")]
    UnmappedAddress(u64),

    #[error(transparent)]
    GuestMemory(#[from] GuestMemoryError),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("no suitable graphics adapter found")]
    AdapterNotFound,
}

pub type SurfaceResult<T> = Result<T, SurfaceError>;
