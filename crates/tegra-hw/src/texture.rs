//! Texture image control (TIC) state as decoded from the guest's texture descriptor pool.

use crate::GpuVAddr;

/// Block height (in GOBs) used for render targets, which the guest always lays out tiled.
pub const DEFAULT_BLOCK_HEIGHT: u32 = 16;

register_enum! {
    /// Texel format field of a TIC entry.
    pub enum TextureFormat {
        R32_G32_B32_A32 = 0x01,
        R16_G16_B16_A16 = 0x03,
        R32_G32 = 0x04,
        R32_B24G8 = 0x05,
        X8B8G8R8 = 0x07,
        A8R8G8B8 = 0x08,
        A2B10G10R10 = 0x09,
        R16_G16 = 0x0c,
        G8R24 = 0x0d,
        G24R8 = 0x0e,
        R32 = 0x0f,
        A4B4G4R4 = 0x12,
        A5B5G5R1 = 0x13,
        A1B5G5R5 = 0x14,
        B5G6R5 = 0x15,
        B6G5R5 = 0x16,
        G8R8 = 0x18,
        R16 = 0x1b,
        Y8Video = 0x1c,
        R8 = 0x1d,
        G4R4 = 0x1e,
        R1 = 0x1f,
        E5B9G9R9_SHAREDEXP = 0x20,
        BF10GF11RF11 = 0x21,
        G8B8G8R8 = 0x22,
        B8G8R8G8 = 0x23,
        DXT1 = 0x24,
        DXT23 = 0x25,
        DXT45 = 0x26,
        DXN1 = 0x27,
        DXN2 = 0x28,
        Z24S8 = 0x29,
        X8Z24 = 0x2a,
        S8Z24 = 0x2b,
        ZF32 = 0x2f,
        ZF32_X24S8 = 0x30,
        Z16 = 0x3a,
        ASTC_2D_4X4 = 0x40,
        ASTC_2D_5X5 = 0x41,
        ASTC_2D_6X6 = 0x42,
        ASTC_2D_8X8 = 0x44,
        ASTC_2D_10X10 = 0x45,
        ASTC_2D_12X12 = 0x46,
    }
}

register_enum! {
    /// Per-channel numeric interpretation field of a TIC entry.
    pub enum ComponentType {
        SNORM = 1,
        UNORM = 2,
        SINT = 3,
        UINT = 4,
        SNORM_FORCE_FP16 = 5,
        UNORM_FORCE_FP16 = 6,
        FLOAT = 7,
    }
}

/// Bits the TIC stores for `width_minus_1` and `height_minus_1`.
pub const TIC_EXTENT_MASK: u32 = 0xffff;
/// Bits the TIC stores for `block_height_log2`.
pub const TIC_BLOCK_HEIGHT_LOG2_MASK: u32 = 0x7;

/// Decoded texture image control entry.
///
/// Fields hold raw register values; accessors only look at the bits the hardware defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicEntry {
    pub format: TextureFormat,
    pub r_type: ComponentType,
    pub g_type: ComponentType,
    pub b_type: ComponentType,
    pub a_type: ComponentType,
    pub address_low: u32,
    pub address_high: u32,
    /// Whether the texture uses the block-linear layout (as opposed to pitch-linear).
    pub tiled: bool,
    /// log2 of the block height in GOBs.
    pub block_height_log2: u32,
    pub width_minus_1: u32,
    pub height_minus_1: u32,
}

impl TicEntry {
    pub fn address(&self) -> GpuVAddr {
        (u64::from(self.address_high) << 32) | u64::from(self.address_low)
    }

    pub fn width(&self) -> u32 {
        (self.width_minus_1 & TIC_EXTENT_MASK) + 1
    }

    pub fn height(&self) -> u32 {
        (self.height_minus_1 & TIC_EXTENT_MASK) + 1
    }

    pub fn is_tiled(&self) -> bool {
        self.tiled
    }

    /// Block height in GOBs.
    pub fn block_height(&self) -> u32 {
        1 << (self.block_height_log2 & TIC_BLOCK_HEIGHT_LOG2_MASK)
    }
}

/// A TIC entry bound to a texture unit, as handed out by the 3D engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullTextureInfo {
    pub index: u32,
    pub tic: TicEntry,
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tic() -> TicEntry {
        TicEntry {
            format: TextureFormat::A8R8G8B8,
            r_type: ComponentType::UNORM,
            g_type: ComponentType::UNORM,
            b_type: ComponentType::UNORM,
            a_type: ComponentType::UNORM,
            address_low: 0x2000_0000,
            address_high: 0x1,
            tiled: true,
            block_height_log2: 4,
            width_minus_1: 255,
            height_minus_1: 127,
        }
    }

    #[test]
    fn tic_accessors_decode_packed_fields() {
        let tic = tic();
        assert_eq!(tic.address(), 0x1_2000_0000);
        assert_eq!(tic.width(), 256);
        assert_eq!(tic.height(), 128);
        assert_eq!(tic.block_height(), DEFAULT_BLOCK_HEIGHT);
        assert!(tic.is_tiled());
    }

    #[test]
    fn accessors_ignore_bits_outside_the_register_fields() {
        let tic = TicEntry {
            width_minus_1: u32::MAX,
            height_minus_1: 0x1_0003,
            block_height_log2: 35,
            ..tic()
        };
        assert_eq!(tic.width(), 0x1_0000);
        assert_eq!(tic.height(), 4);
        assert_eq!(tic.block_height(), 8);
    }

    #[test]
    fn from_raw_rejects_unknown_values() {
        assert_eq!(TextureFormat::from_raw(0x24), Some(TextureFormat::DXT1));
        assert_eq!(TextureFormat::from_raw(0x02), None);
        assert_eq!(ComponentType::from_raw(7), Some(ComponentType::FLOAT));
        assert_eq!(ComponentType::from_raw(0), None);
        assert_eq!(TextureFormat::ASTC_2D_4X4.raw(), 0x40);
    }
}
