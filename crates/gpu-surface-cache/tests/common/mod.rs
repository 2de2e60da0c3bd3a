//! Shared helpers for `gpu-surface-cache` integration tests.
#![allow(dead_code)]

use tegra_hw::{
    ComponentType, DepthFormat, FramebufferRegs, FullTextureInfo, RenderTargetConfig,
    RenderTargetFormat, TextureFormat, TicEntry, ZetaConfig,
};

pub fn require_webgpu() -> bool {
    let Ok(raw) = std::env::var("GPU_SURFACE_CACHE_REQUIRE_WEBGPU") else {
        return false;
    };

    let v = raw.trim();
    v == "1"
        || v.eq_ignore_ascii_case("true")
        || v.eq_ignore_ascii_case("yes")
        || v.eq_ignore_ascii_case("on")
}

pub fn skip_or_panic(test_name: &str, reason: &str) {
    if require_webgpu() {
        panic!("GPU_SURFACE_CACHE_REQUIRE_WEBGPU is enabled but {test_name} cannot run: {reason}");
    }
    eprintln!("skipping {test_name}: {reason}");
}

/// Linear texture descriptor bound to texture unit 0.
pub fn texture(format: TextureFormat, addr: u64, width: u32, height: u32) -> FullTextureInfo {
    FullTextureInfo {
        index: 0,
        enabled: true,
        tic: TicEntry {
            format,
            r_type: ComponentType::UNORM,
            g_type: ComponentType::UNORM,
            b_type: ComponentType::UNORM,
            a_type: ComponentType::UNORM,
            address_low: addr as u32,
            address_high: (addr >> 32) as u32,
            tiled: false,
            block_height_log2: 0,
            width_minus_1: width - 1,
            height_minus_1: height - 1,
        },
    }
}

pub fn abgr8_texture(addr: u64, width: u32, height: u32) -> FullTextureInfo {
    texture(TextureFormat::A8R8G8B8, addr, width, height)
}

pub fn render_target(addr: u64, width: u32, height: u32) -> RenderTargetConfig {
    RenderTargetConfig {
        address_high: (addr >> 32) as u32,
        address_low: addr as u32,
        width,
        height,
        format: RenderTargetFormat::RGBA8_UNORM,
    }
}

pub fn zeta(addr: u64, width: u32, height: u32) -> ZetaConfig {
    ZetaConfig {
        address_high: (addr >> 32) as u32,
        address_low: addr as u32,
        width,
        height,
        format: DepthFormat::Z24_S8_UNORM,
    }
}

pub fn framebuffer(color: RenderTargetConfig, zeta: ZetaConfig) -> FramebufferRegs {
    FramebufferRegs { color, zeta }
}

/// Deterministic non-trivial byte pattern.
pub fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(13).wrapping_add(seed))
        .collect()
}
