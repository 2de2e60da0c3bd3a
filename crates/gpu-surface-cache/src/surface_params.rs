//! Surface descriptors: the identity of a cached surface and the translation from guest
//! hardware formats.

use core::hash::{Hash, Hasher};

use tegra_hw::texture::DEFAULT_BLOCK_HEIGHT;
use tegra_hw::{
    DepthFormat, FramebufferPixelFormat, FullTextureInfo, GpuVAddr, Rectangle,
    RenderTargetConfig, RenderTargetFormat, TextureFormat, VAddr, ZetaConfig,
};
use xxhash_rust::xxh3::Xxh3;

use crate::address_space::GpuAddressSpace;
use crate::error::{SurfaceError, SurfaceResult};

/// Host-side pixel format of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(non_camel_case_types)]
pub enum PixelFormat {
    ABGR8 = 0,
    B5G6R5 = 1,
    A2B10G10R10 = 2,
    A1B5G5R5 = 3,
    R8 = 4,
    RGBA16F = 5,
    R11FG11FB10F = 6,
    DXT1 = 7,
    DXT23 = 8,
    DXT45 = 9,
    /// Also known as BC4.
    DXN1 = 10,
    ASTC_2D_4X4 = 11,

    Z24S8 = 12,
    S8Z24 = 13,
    Z32F = 14,
    Z16 = 15,

    Invalid = 255,
}

impl PixelFormat {
    pub const ALL: [PixelFormat; 16] = [
        PixelFormat::ABGR8,
        PixelFormat::B5G6R5,
        PixelFormat::A2B10G10R10,
        PixelFormat::A1B5G5R5,
        PixelFormat::R8,
        PixelFormat::RGBA16F,
        PixelFormat::R11FG11FB10F,
        PixelFormat::DXT1,
        PixelFormat::DXT23,
        PixelFormat::DXT45,
        PixelFormat::DXN1,
        PixelFormat::ASTC_2D_4X4,
        PixelFormat::Z24S8,
        PixelFormat::S8Z24,
        PixelFormat::Z32F,
        PixelFormat::Z16,
    ];

    pub fn is_compressed(self) -> bool {
        compression_factor(self) > 1
    }

    pub fn is_astc(self) -> bool {
        matches!(self, PixelFormat::ASTC_2D_4X4)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ComponentType {
    Invalid = 0,
    SNorm = 1,
    UNorm = 2,
    SInt = 3,
    UInt = 4,
    Float = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SurfaceType {
    ColorTexture = 0,
    Depth = 1,
    DepthStencil = 2,
    Fill = 3,
    Invalid = 4,
}

/// Width/height (in texels) covered by one block of `format`: 4 for the BCn and ASTC formats,
/// 1 for everything else, 0 for [`PixelFormat::Invalid`].
pub fn compression_factor(format: PixelFormat) -> u32 {
    use PixelFormat::*;
    match format {
        ABGR8 | B5G6R5 | A2B10G10R10 | A1B5G5R5 | R8 | RGBA16F | R11FG11FB10F => 1,
        DXT1 | DXT23 | DXT45 | DXN1 | ASTC_2D_4X4 => 4,
        Z24S8 | S8Z24 | Z32F | Z16 => 1,
        Invalid => 0,
    }
}

/// Bits per block of `format` (bits per texel for uncompressed formats).
pub fn format_bpp(format: PixelFormat) -> u32 {
    use PixelFormat::*;
    match format {
        ABGR8 => 32,
        B5G6R5 => 16,
        A2B10G10R10 => 32,
        A1B5G5R5 => 16,
        R8 => 8,
        RGBA16F => 64,
        R11FG11FB10F => 32,
        DXT1 => 64,
        DXT23 => 128,
        DXT45 => 128,
        DXN1 => 64,
        // Every ASTC block is 128 bits regardless of footprint.
        ASTC_2D_4X4 => 128,
        Z24S8 | S8Z24 | Z32F => 32,
        Z16 => 16,
        Invalid => 0,
    }
}

pub fn format_type(format: PixelFormat) -> SurfaceType {
    use PixelFormat::*;
    match format {
        Z24S8 | S8Z24 => SurfaceType::DepthStencil,
        Z32F | Z16 => SurfaceType::Depth,
        Invalid => SurfaceType::Invalid,
        _ => SurfaceType::ColorTexture,
    }
}

pub fn pixel_format_from_texture_format(format: TextureFormat) -> SurfaceResult<PixelFormat> {
    Ok(match format {
        TextureFormat::A8R8G8B8 => PixelFormat::ABGR8,
        TextureFormat::B5G6R5 => PixelFormat::B5G6R5,
        TextureFormat::A2B10G10R10 => PixelFormat::A2B10G10R10,
        TextureFormat::A1B5G5R5 => PixelFormat::A1B5G5R5,
        TextureFormat::R8 => PixelFormat::R8,
        TextureFormat::R16_G16_B16_A16 => PixelFormat::RGBA16F,
        TextureFormat::BF10GF11RF11 => PixelFormat::R11FG11FB10F,
        TextureFormat::DXT1 => PixelFormat::DXT1,
        TextureFormat::DXT23 => PixelFormat::DXT23,
        TextureFormat::DXT45 => PixelFormat::DXT45,
        TextureFormat::DXN1 => PixelFormat::DXN1,
        TextureFormat::ASTC_2D_4X4 => PixelFormat::ASTC_2D_4X4,
        other => {
            tracing::error!(format = other.raw(), "unimplemented texture format");
            return Err(SurfaceError::UnimplementedTextureFormat(other.raw()));
        }
    })
}

/// Inverse of [`pixel_format_from_texture_format`] over the colour formats.
pub fn texture_format_from_pixel_format(format: PixelFormat) -> SurfaceResult<TextureFormat> {
    Ok(match format {
        PixelFormat::ABGR8 => TextureFormat::A8R8G8B8,
        PixelFormat::B5G6R5 => TextureFormat::B5G6R5,
        PixelFormat::A2B10G10R10 => TextureFormat::A2B10G10R10,
        PixelFormat::A1B5G5R5 => TextureFormat::A1B5G5R5,
        PixelFormat::R8 => TextureFormat::R8,
        PixelFormat::RGBA16F => TextureFormat::R16_G16_B16_A16,
        PixelFormat::R11FG11FB10F => TextureFormat::BF10GF11RF11,
        PixelFormat::DXT1 => TextureFormat::DXT1,
        PixelFormat::DXT23 => TextureFormat::DXT23,
        PixelFormat::DXT45 => TextureFormat::DXT45,
        PixelFormat::DXN1 => TextureFormat::DXN1,
        PixelFormat::ASTC_2D_4X4 => TextureFormat::ASTC_2D_4X4,
        PixelFormat::Z24S8
        | PixelFormat::S8Z24
        | PixelFormat::Z32F
        | PixelFormat::Z16
        | PixelFormat::Invalid => {
            return Err(SurfaceError::UnsupportedPixelFormat {
                format,
                target: "guest texture",
            })
        }
    })
}

pub fn pixel_format_from_render_target_format(
    format: RenderTargetFormat,
) -> SurfaceResult<PixelFormat> {
    Ok(match format {
        RenderTargetFormat::RGBA8_UNORM | RenderTargetFormat::RGBA8_SRGB => PixelFormat::ABGR8,
        RenderTargetFormat::RGB10_A2_UNORM => PixelFormat::A2B10G10R10,
        RenderTargetFormat::RGBA16_FLOAT => PixelFormat::RGBA16F,
        RenderTargetFormat::R11G11B10_FLOAT => PixelFormat::R11FG11FB10F,
        other => {
            tracing::error!(format = other.raw(), "unimplemented render target format");
            return Err(SurfaceError::UnimplementedRenderTargetFormat(other.raw()));
        }
    })
}

pub fn pixel_format_from_depth_format(format: DepthFormat) -> SurfaceResult<PixelFormat> {
    Ok(match format {
        DepthFormat::S8_Z24_UNORM => PixelFormat::S8Z24,
        DepthFormat::Z24_S8_UNORM => PixelFormat::Z24S8,
        DepthFormat::Z32_FLOAT => PixelFormat::Z32F,
        DepthFormat::Z16_UNORM => PixelFormat::Z16,
        other => {
            tracing::error!(format = other.raw(), "unimplemented depth format");
            return Err(SurfaceError::UnimplementedDepthFormat(other.raw()));
        }
    })
}

/// Format of the display (scanout) framebuffer.
pub fn pixel_format_from_gpu_pixel_format(
    format: FramebufferPixelFormat,
) -> SurfaceResult<PixelFormat> {
    match format {
        FramebufferPixelFormat::ABGR8 => Ok(PixelFormat::ABGR8),
        other => {
            tracing::error!(format = other.raw(), "unimplemented framebuffer pixel format");
            Err(SurfaceError::UnimplementedFramebufferPixelFormat(
                other.raw(),
            ))
        }
    }
}

pub fn component_type_from_texture(
    ty: tegra_hw::ComponentType,
) -> SurfaceResult<ComponentType> {
    match ty {
        tegra_hw::ComponentType::UNORM => Ok(ComponentType::UNorm),
        other => {
            tracing::error!(component_type = other.raw(), "unimplemented component type");
            Err(SurfaceError::UnimplementedComponentType(other.raw()))
        }
    }
}

pub fn component_type_from_render_target(
    format: RenderTargetFormat,
) -> SurfaceResult<ComponentType> {
    match format {
        RenderTargetFormat::RGBA8_UNORM
        | RenderTargetFormat::RGBA8_SRGB
        | RenderTargetFormat::RGB10_A2_UNORM => Ok(ComponentType::UNorm),
        RenderTargetFormat::RGBA16_FLOAT | RenderTargetFormat::R11G11B10_FLOAT => {
            Ok(ComponentType::Float)
        }
        other => {
            tracing::error!(format = other.raw(), "unimplemented render target format");
            Err(SurfaceError::UnimplementedRenderTargetFormat(other.raw()))
        }
    }
}

pub fn component_type_from_depth_format(format: DepthFormat) -> SurfaceResult<ComponentType> {
    match format {
        DepthFormat::S8_Z24_UNORM | DepthFormat::Z24_S8_UNORM | DepthFormat::Z16_UNORM => {
            Ok(ComponentType::UNorm)
        }
        DepthFormat::Z32_FLOAT => Ok(ComponentType::Float),
        other => {
            tracing::error!(format = other.raw(), "unimplemented depth format");
            Err(SurfaceError::UnimplementedDepthFormat(other.raw()))
        }
    }
}

fn align_up(value: u32, align: u32) -> u32 {
    value.div_ceil(align) * align
}

/// Shape and placement of a cached surface.
///
/// Built once by one of the `create_for_*` factories and then only copied around; two
/// descriptors that compare equal denote the same cached surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceParams {
    pub addr: GpuVAddr,
    pub is_tiled: bool,
    /// Block height in GOBs, only meaningful when `is_tiled`.
    pub block_height: u32,
    pub pixel_format: PixelFormat,
    pub component_type: ComponentType,
    pub surface_type: SurfaceType,
    /// Width in texels, a multiple of the compression factor.
    pub width: u32,
    /// Height in texels, a multiple of the compression factor.
    pub height: u32,
    /// Height as configured by the guest, before block alignment.
    pub unaligned_height: u32,
    pub size_in_bytes: u64,
}

impl SurfaceParams {
    pub fn create_for_texture(config: &FullTextureInfo) -> SurfaceResult<Self> {
        let tic = &config.tic;
        let pixel_format = pixel_format_from_texture_format(tic.format)?;
        let component_type = component_type_from_texture(tic.r_type)?;
        let cf = compression_factor(pixel_format);

        Ok(Self {
            addr: tic.address(),
            is_tiled: tic.is_tiled(),
            block_height: tic.block_height(),
            pixel_format,
            component_type,
            surface_type: format_type(pixel_format),
            width: align_up(tic.width(), cf),
            height: align_up(tic.height(), cf),
            unaligned_height: tic.height(),
            size_in_bytes: 0,
        }
        .with_computed_size())
    }

    pub fn create_for_framebuffer(config: &RenderTargetConfig) -> SurfaceResult<Self> {
        let pixel_format = pixel_format_from_render_target_format(config.format)?;
        let component_type = component_type_from_render_target(config.format)?;

        Ok(Self {
            addr: config.address(),
            is_tiled: true,
            block_height: DEFAULT_BLOCK_HEIGHT,
            pixel_format,
            component_type,
            surface_type: format_type(pixel_format),
            width: config.width,
            height: config.height,
            unaligned_height: config.height,
            size_in_bytes: 0,
        }
        .with_computed_size())
    }

    pub fn create_for_depth_buffer(config: &ZetaConfig) -> SurfaceResult<Self> {
        let pixel_format = pixel_format_from_depth_format(config.format)?;
        let component_type = component_type_from_depth_format(config.format)?;

        Ok(Self {
            addr: config.address(),
            is_tiled: true,
            block_height: DEFAULT_BLOCK_HEIGHT,
            pixel_format,
            component_type,
            surface_type: format_type(pixel_format),
            width: config.width,
            height: config.height,
            unaligned_height: config.height,
            size_in_bytes: 0,
        }
        .with_computed_size())
    }

    fn with_computed_size(mut self) -> Self {
        self.size_in_bytes = self.compute_size_in_bytes();
        self
    }

    /// Backing size in bytes, adjusted for block compression.
    ///
    /// # Panics
    ///
    /// Panics if the width or height is not a multiple of the compression factor.
    pub fn compute_size_in_bytes(&self) -> u64 {
        let cf = compression_factor(self.pixel_format);
        if cf == 0 {
            return 0;
        }
        assert!(
            self.width % cf == 0,
            "width {} of {:?} surface is not a multiple of {cf}",
            self.width,
            self.pixel_format
        );
        assert!(
            self.height % cf == 0,
            "height {} of {:?} surface is not a multiple of {cf}",
            self.height,
            self.pixel_format
        );
        u64::from(self.width / cf) * u64::from(self.height / cf)
            * u64::from(format_bpp(self.pixel_format))
            / 8
    }

    pub fn compression_factor(&self) -> u32 {
        compression_factor(self.pixel_format)
    }

    pub fn format_bpp(&self) -> u32 {
        format_bpp(self.pixel_format)
    }

    pub fn bytes_per_block(&self) -> u32 {
        self.format_bpp() / 8
    }

    /// Width in blocks of the pixel format.
    pub fn width_in_blocks(&self) -> u32 {
        self.width.checked_div(self.compression_factor()).unwrap_or(0)
    }

    /// Height in blocks of the pixel format.
    pub fn height_in_blocks(&self) -> u32 {
        self.height.checked_div(self.compression_factor()).unwrap_or(0)
    }

    /// Guest bytes spanned by the surface's memory layout (the tiled footprint when tiled).
    pub fn guest_footprint(&self) -> u64 {
        if self.is_tiled {
            tegra_hw::block_linear::tiled_size(
                self.width_in_blocks(),
                self.height_in_blocks(),
                self.bytes_per_block(),
                self.block_height,
            ) as u64
        } else {
            self.size_in_bytes
        }
    }

    /// Surface extent in bottom-up orientation.
    ///
    /// ASTC surfaces stop at the last whole block row.
    pub fn rect(&self) -> Rectangle<u32> {
        let mut actual_height = self.unaligned_height;
        if self.pixel_format.is_astc() {
            let block = compression_factor(self.pixel_format);
            actual_height -= actual_height % block;
        }
        Rectangle::new(0, actual_height, self.width, 0)
    }

    pub fn cpu_addr(&self, address_space: &impl GpuAddressSpace) -> Option<VAddr> {
        address_space.gpu_to_cpu_address(self.addr)
    }

    /// Whether `[region_addr, region_addr + region_size]` touches this surface.
    ///
    /// Both ends are inclusive: a region ending exactly where the surface starts (or starting
    /// exactly where it ends) overlaps.
    pub fn is_overlapping_region(&self, region_addr: GpuVAddr, region_size: u64) -> bool {
        self.addr <= region_addr.saturating_add(region_size)
            && region_addr <= self.addr.saturating_add(self.size_in_bytes)
    }
}

/// Cache key wrapping a [`SurfaceParams`] with its precomputed hash.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceKey {
    params: SurfaceParams,
    hash: u64,
}

impl SurfaceKey {
    pub fn new(params: SurfaceParams) -> Self {
        let mut hasher = Xxh3::new();
        hasher.update(&params.addr.to_le_bytes());
        hasher.update(&[
            params.is_tiled as u8,
            params.pixel_format as u8,
            params.component_type as u8,
            params.surface_type as u8,
        ]);
        for v in [
            params.block_height,
            params.width,
            params.height,
            params.unaligned_height,
        ] {
            hasher.update(&v.to_le_bytes());
        }
        hasher.update(&params.size_in_bytes.to_le_bytes());
        Self {
            params,
            hash: hasher.digest(),
        }
    }

    pub fn params(&self) -> &SurfaceParams {
        &self.params
    }

    pub fn hash_value(&self) -> u64 {
        self.hash
    }
}

impl From<SurfaceParams> for SurfaceKey {
    fn from(params: SurfaceParams) -> Self {
        Self::new(params)
    }
}

impl PartialEq for SurfaceKey {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params
    }
}

impl Eq for SurfaceKey {}

impl Hash for SurfaceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tegra_hw::{TicEntry, ZetaConfig};

    fn tic(format: TextureFormat, width: u32, height: u32) -> FullTextureInfo {
        FullTextureInfo {
            index: 0,
            enabled: true,
            tic: TicEntry {
                format,
                r_type: tegra_hw::ComponentType::UNORM,
                g_type: tegra_hw::ComponentType::UNORM,
                b_type: tegra_hw::ComponentType::UNORM,
                a_type: tegra_hw::ComponentType::UNORM,
                address_low: 0x1000,
                address_high: 0,
                tiled: false,
                block_height_log2: 0,
                width_minus_1: width - 1,
                height_minus_1: height - 1,
            },
        }
    }

    #[test]
    fn size_formula_for_every_format() {
        for format in PixelFormat::ALL {
            let cf = compression_factor(format);
            let params = SurfaceParams {
                addr: 0x1000,
                is_tiled: false,
                block_height: 0,
                pixel_format: format,
                component_type: ComponentType::UNorm,
                surface_type: format_type(format),
                width: 16,
                height: 8,
                unaligned_height: 8,
                size_in_bytes: 0,
            };
            let expected = u64::from((16 / cf) * (8 / cf) * format_bpp(format) / 8);
            assert_eq!(params.compute_size_in_bytes(), expected, "{format:?}");
        }
    }

    #[test]
    fn invalid_format_has_no_size() {
        assert_eq!(compression_factor(PixelFormat::Invalid), 0);
        assert_eq!(format_bpp(PixelFormat::Invalid), 0);
        assert_eq!(format_type(PixelFormat::Invalid), SurfaceType::Invalid);
    }

    #[test]
    fn texture_format_round_trips_for_colour_formats() {
        for format in PixelFormat::ALL {
            match texture_format_from_pixel_format(format) {
                Ok(tex) => assert_eq!(pixel_format_from_texture_format(tex), Ok(format)),
                Err(_) => assert_ne!(format_type(format), SurfaceType::ColorTexture),
            }
        }
    }

    #[test]
    fn unimplemented_formats_are_errors() {
        assert_eq!(
            pixel_format_from_texture_format(TextureFormat::R32_G32_B32_A32),
            Err(SurfaceError::UnimplementedTextureFormat(0x01))
        );
        assert_eq!(
            pixel_format_from_render_target_format(RenderTargetFormat::R8_UNORM),
            Err(SurfaceError::UnimplementedRenderTargetFormat(0xF3))
        );
        assert_eq!(
            component_type_from_texture(tegra_hw::ComponentType::SNORM),
            Err(SurfaceError::UnimplementedComponentType(1))
        );
        assert_eq!(
            pixel_format_from_depth_format(DepthFormat::Z24_X8_UNORM),
            Err(SurfaceError::UnimplementedDepthFormat(0x15))
        );
        assert_eq!(
            pixel_format_from_gpu_pixel_format(FramebufferPixelFormat::RGB565),
            Err(SurfaceError::UnimplementedFramebufferPixelFormat(4))
        );
        assert_eq!(
            pixel_format_from_gpu_pixel_format(FramebufferPixelFormat::ABGR8),
            Ok(PixelFormat::ABGR8)
        );
    }

    #[test]
    fn render_target_translation() {
        assert_eq!(
            pixel_format_from_render_target_format(RenderTargetFormat::RGBA8_SRGB),
            Ok(PixelFormat::ABGR8)
        );
        assert_eq!(
            component_type_from_render_target(RenderTargetFormat::R11G11B10_FLOAT),
            Ok(ComponentType::Float)
        );
        assert_eq!(
            component_type_from_render_target(RenderTargetFormat::RGB10_A2_UNORM),
            Ok(ComponentType::UNorm)
        );
    }

    #[test]
    fn texture_factory_aligns_compressed_dimensions() {
        let params = SurfaceParams::create_for_texture(&tic(TextureFormat::DXT1, 30, 18)).unwrap();
        assert_eq!(params.pixel_format, PixelFormat::DXT1);
        assert_eq!((params.width, params.height), (32, 20));
        assert_eq!(params.unaligned_height, 18);
        assert_eq!(params.size_in_bytes, 8 * 5 * 8);
        assert_eq!(params.surface_type, SurfaceType::ColorTexture);
        assert!(!params.is_tiled);
    }

    #[test]
    fn bytes_per_block_counts_texels_or_compressed_blocks() {
        let abgr8 = SurfaceParams::create_for_texture(&tic(TextureFormat::A8R8G8B8, 8, 8)).unwrap();
        assert_eq!(abgr8.bytes_per_block(), 4);
        assert_eq!(abgr8.width_in_blocks(), 8);

        let dxt1 = SurfaceParams::create_for_texture(&tic(TextureFormat::DXT1, 16, 8)).unwrap();
        assert_eq!(dxt1.bytes_per_block(), 8);
        assert_eq!(dxt1.width_in_blocks(), 4);
        assert_eq!(dxt1.height_in_blocks(), 2);
    }

    #[test]
    fn astc_rect_stops_at_block_boundary() {
        let params =
            SurfaceParams::create_for_texture(&tic(TextureFormat::ASTC_2D_4X4, 16, 18)).unwrap();
        assert_eq!(params.height, 20);
        assert_eq!(params.rect(), Rectangle::new(0, 16, 16, 0));

        let params = SurfaceParams::create_for_texture(&tic(TextureFormat::R8, 16, 18)).unwrap();
        assert_eq!(params.rect(), Rectangle::new(0, 18, 16, 0));
    }

    #[test]
    fn framebuffer_factories_are_tiled_with_default_block_height() {
        let color = SurfaceParams::create_for_framebuffer(&RenderTargetConfig {
            address_high: 0,
            address_low: 0x2_0000,
            width: 64,
            height: 32,
            format: RenderTargetFormat::RGBA16_FLOAT,
        })
        .unwrap();
        assert!(color.is_tiled);
        assert_eq!(color.block_height, DEFAULT_BLOCK_HEIGHT);
        assert_eq!(color.component_type, ComponentType::Float);
        assert_eq!(color.size_in_bytes, 64 * 32 * 8);

        let depth = SurfaceParams::create_for_depth_buffer(&ZetaConfig {
            address_high: 0,
            address_low: 0x4_0000,
            width: 64,
            height: 32,
            format: DepthFormat::S8_Z24_UNORM,
        })
        .unwrap();
        assert_eq!(depth.pixel_format, PixelFormat::S8Z24);
        assert_eq!(depth.surface_type, SurfaceType::DepthStencil);
        assert_eq!(depth.size_in_bytes, 64 * 32 * 4);
    }

    #[test]
    fn overlap_is_inclusive_at_both_ends() {
        let params = SurfaceParams::create_for_texture(&tic(TextureFormat::A8R8G8B8, 16, 16)).unwrap();
        // [0x1000, 0x1400)
        assert!(params.is_overlapping_region(0x1200, 4));
        assert!(params.is_overlapping_region(0x0f00, 0x100));
        assert!(params.is_overlapping_region(0x1400, 0x10));
        assert!(!params.is_overlapping_region(0x0f00, 0xff));
        assert!(!params.is_overlapping_region(0x1401, 0x10));
    }

    #[test]
    fn key_equality_follows_params() {
        let a = SurfaceParams::create_for_texture(&tic(TextureFormat::A8R8G8B8, 16, 16)).unwrap();
        let mut b = a;
        assert_eq!(SurfaceKey::new(a), SurfaceKey::new(b));
        assert_eq!(SurfaceKey::new(a).hash_value(), SurfaceKey::new(b).hash_value());

        b.block_height = 2;
        assert_ne!(SurfaceKey::new(a), SurfaceKey::new(b));
        assert_ne!(SurfaceKey::new(a).hash_value(), SurfaceKey::new(b).hash_value());
    }

    #[test]
    #[should_panic(expected = "not a multiple of 4")]
    fn size_rejects_unaligned_compressed_dimensions() {
        let mut params =
            SurfaceParams::create_for_texture(&tic(TextureFormat::DXT45, 16, 16)).unwrap();
        params.width = 15;
        params.compute_size_in_bytes();
    }
}
