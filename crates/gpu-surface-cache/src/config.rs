use serde::Deserialize;

/// Tunables of a [`crate::RasterizerCache`].
///
/// Deserializes from the frontend's `Renderer` settings group; missing keys keep their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RasterizerCacheConfig {
    /// Reload surfaces from guest memory on every lookup and write dirty surfaces back
    /// immediately, instead of relying on invalidate/flush callbacks.
    pub use_accurate_framebuffers: bool,
    /// log2 of the page size used by the page index (and for cached-region notifications).
    pub page_bits: u32,
}

impl RasterizerCacheConfig {
    pub const DEFAULT_PAGE_BITS: u32 = 16;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn use_accurate_framebuffers(mut self, enabled: bool) -> Self {
        self.use_accurate_framebuffers = enabled;
        self
    }

    pub fn page_bits(mut self, page_bits: u32) -> Self {
        self.page_bits = page_bits;
        self
    }
}

impl Default for RasterizerCacheConfig {
    fn default() -> Self {
        Self {
            use_accurate_framebuffers: false,
            page_bits: Self::DEFAULT_PAGE_BITS,
        }
    }
}
