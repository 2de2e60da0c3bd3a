//! Guest GPU hardware definitions consumed by the host-side surface cache.
//!
//! This crate is the "engine side" of the cache boundary: it describes what the guest GPU
//! register state says about textures and render targets, without knowing anything about
//! host textures. It provides:
//! - texture image control entries and texture formats (see [`texture`]),
//! - render target / depth (zeta) configuration and formats (see [`render_target`]),
//! - the block-linear (GOB) tiling transform (see [`block_linear`]),
//! - a small rectangle type shared by viewports and surface extents (see [`Rectangle`]).

#[macro_use]
mod macros;

pub mod block_linear;
mod rect;
pub mod render_target;
pub mod texture;

pub use rect::Rectangle;
pub use render_target::{
    DepthFormat, FramebufferPixelFormat, FramebufferRegs, RenderTargetConfig,
    RenderTargetFormat, ZetaConfig,
};
pub use texture::{ComponentType, FullTextureInfo, TextureFormat, TicEntry};

/// Guest GPU virtual address.
pub type GpuVAddr = u64;

/// Guest CPU virtual address.
pub type VAddr = u64;
