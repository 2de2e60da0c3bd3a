use pretty_assertions::assert_eq;
use tegra_hw::block_linear::{gob_offset, swizzle, tiled_size, unswizzle, GOB_SIZE};
use tegra_hw::{ComponentType, FullTextureInfo, TextureFormat, TicEntry};

fn tiled_tic(width: u32, height: u32, block_height_log2: u32) -> FullTextureInfo {
    FullTextureInfo {
        index: 3,
        enabled: true,
        tic: TicEntry {
            format: TextureFormat::A8R8G8B8,
            r_type: ComponentType::UNORM,
            g_type: ComponentType::UNORM,
            b_type: ComponentType::UNORM,
            a_type: ComponentType::UNORM,
            address_low: 0,
            address_high: 0,
            tiled: true,
            block_height_log2,
            width_minus_1: width - 1,
            height_minus_1: height - 1,
        },
    }
}

#[test]
fn second_block_row_starts_after_full_row_of_blocks() {
    let info = tiled_tic(32, 32, 1);
    let (w, h, bh) = (info.tic.width(), info.tic.height(), info.tic.block_height());
    assert_eq!(bh, 2);

    // 128 bytes per row = 2 GOBs; blocks are 16 rows tall.
    assert_eq!(tiled_size(w, h, 4, bh), 2 * 2 * 2 * GOB_SIZE as usize);

    let mut linear = vec![0u8; (w * h * 4) as usize];
    // Texel (0, 16) opens block row 1.
    linear[(16 * w * 4) as usize] = 0x5A;
    let mut tiled = vec![0u8; tiled_size(w, h, 4, bh)];
    swizzle(&linear, &mut tiled, w, h, 4, bh);

    let block_row_stride = 2 * bh as usize * GOB_SIZE as usize;
    assert_eq!(tiled[block_row_stride], 0x5A);
    assert_eq!(tiled.iter().filter(|&&b| b != 0).count(), 1);
}

#[test]
fn compressed_blocks_tile_as_16_byte_units() {
    // 8x8 texels of a 4x4/16-byte format are 2x2 blocks.
    let linear: Vec<u8> = (0..64u8).collect();
    let mut tiled = vec![0u8; tiled_size(2, 2, 16, 1)];
    swizzle(&linear, &mut tiled, 2, 2, 16, 1);

    // Block (1, 0) sits at byte column 16 of GOB row 0; block (0, 1) on GOB row 1.
    assert_eq!(&tiled[gob_offset(16, 0) as usize..][..16], &linear[16..32]);
    assert_eq!(&tiled[gob_offset(0, 1) as usize..][..16], &linear[32..48]);

    let mut back = vec![0u8; 64];
    unswizzle(&tiled, &mut back, 2, 2, 16, 1);
    assert_eq!(back, linear);
}
