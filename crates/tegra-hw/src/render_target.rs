//! Render target and depth buffer (zeta) configuration of the 3D engine.

use crate::GpuVAddr;

register_enum! {
    /// Colour render target format register.
    pub enum RenderTargetFormat {
        NONE = 0x0,
        RGBA32_FLOAT = 0xC0,
        RGBA32_UINT = 0xC2,
        RGBA16_UNORM = 0xC6,
        RGBA16_UINT = 0xC9,
        RGBA16_FLOAT = 0xCA,
        RG32_FLOAT = 0xCB,
        BGRA8_UNORM = 0xCF,
        RGB10_A2_UNORM = 0xD1,
        RGBA8_UNORM = 0xD5,
        RGBA8_SRGB = 0xD6,
        RGBA8_SNORM = 0xD7,
        RG16_UNORM = 0xDA,
        RG16_SNORM = 0xDB,
        RG16_SINT = 0xDC,
        RG16_UINT = 0xDD,
        RG16_FLOAT = 0xDE,
        R11G11B10_FLOAT = 0xE0,
        R32_FLOAT = 0xE5,
        B5G6R5_UNORM = 0xE8,
        RG8_UNORM = 0xEA,
        RG8_SNORM = 0xEB,
        R16_UNORM = 0xEE,
        R16_FLOAT = 0xF2,
        R8_UNORM = 0xF3,
    }
}

register_enum! {
    /// Depth/stencil (zeta) buffer format register.
    pub enum DepthFormat {
        Z32_FLOAT = 0x0A,
        Z16_UNORM = 0x13,
        S8_Z24_UNORM = 0x14,
        Z24_X8_UNORM = 0x15,
        Z24_S8_UNORM = 0x16,
        Z24_C8_UNORM = 0x18,
        Z32_S8_X24_FLOAT = 0x19,
    }
}

register_enum! {
    /// Pixel format of the display (scanout) framebuffer configuration.
    pub enum FramebufferPixelFormat {
        ABGR8 = 1,
        RGB565 = 4,
        BGRA8 = 5,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetConfig {
    pub address_high: u32,
    pub address_low: u32,
    pub width: u32,
    pub height: u32,
    pub format: RenderTargetFormat,
}

impl RenderTargetConfig {
    pub fn address(&self) -> GpuVAddr {
        (u64::from(self.address_high) << 32) | u64::from(self.address_low)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZetaConfig {
    pub address_high: u32,
    pub address_low: u32,
    pub width: u32,
    pub height: u32,
    pub format: DepthFormat,
}

impl ZetaConfig {
    pub fn address(&self) -> GpuVAddr {
        (u64::from(self.address_high) << 32) | u64::from(self.address_low)
    }
}

/// Render target state the surface cache needs to resolve the bound framebuffer.
///
/// Only render target 0 is consumed; additional colour targets are not resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferRegs {
    pub color: RenderTargetConfig,
    pub zeta: ZetaConfig,
}
