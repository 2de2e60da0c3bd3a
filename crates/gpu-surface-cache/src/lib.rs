//! Host-side cache of guest GPU surfaces.
//!
//! Guest textures and render targets live in emulated memory; the renderer needs them as host
//! textures. [`RasterizerCache`] keeps one [`CachedSurface`] per distinct [`SurfaceParams`],
//! tracks which GPU pages are backed by cached surfaces, and keeps the two sides coherent:
//! - guest writes call [`RasterizerCache::invalidate_region`] (drop stale surfaces) or
//!   [`RasterizerCache::flush_region`] (write rendered data back first),
//! - render passes call [`RasterizerCache::mark_surface_as_dirty`] on their targets.
//!
//! The graphics API is abstracted by [`SurfaceBackend`]; [`SoftwareBackend`] keeps textures in
//! host memory, `WgpuSurfaceBackend` (feature `wgpu`) uses real GPU textures.
//!
//! Everything here is single-threaded: surfaces are shared with `Rc` and mutated through
//! `Cell`/`RefCell`.

pub mod address_space;
pub mod backend;
mod cached_surface;
mod config;
mod error;
pub mod guest_memory;
pub mod page_index;
mod rasterizer_cache;
mod stats;
pub mod surface_params;

pub use address_space::{CachedRegionEvent, GpuAddressSpace, GpuMemoryManager};
pub use backend::{SoftwareBackend, SurfaceBackend};
#[cfg(feature = "wgpu")]
pub use backend::WgpuSurfaceBackend;
pub use cached_surface::CachedSurface;
pub use config::RasterizerCacheConfig;
pub use error::{SurfaceError, SurfaceResult};
pub use guest_memory::{GuestMemory, GuestMemoryError, VecGuestMemory};
pub use page_index::{PageIndex, PageTransition};
pub use rasterizer_cache::{FramebufferSurfaces, RasterizerCache, Surface};
pub use stats::{SurfaceCacheStats, SurfaceCacheStatsSnapshot};
pub use surface_params::{ComponentType, PixelFormat, SurfaceKey, SurfaceParams, SurfaceType};
