//! Block-linear (GOB) surface layout.
//!
//! Tiled guest surfaces are stored as a grid of blocks. Each block is one GOB (64 bytes x 8
//! rows, 512 bytes) wide and `block_height` GOBs tall; blocks are laid out row-major, GOBs within
//! a block are stacked vertically, and bytes within a GOB follow a fixed swizzle.
//!
//! All dimensions here are in *blocks of the pixel format*: plain texels for uncompressed
//! formats, compression blocks (e.g. 4x4 texels) for BCn/ASTC.

/// GOB width in bytes.
pub const GOB_SIZE_X: u32 = 64;
/// GOB height in rows.
pub const GOB_SIZE_Y: u32 = 8;
/// Bytes per GOB.
pub const GOB_SIZE: u32 = GOB_SIZE_X * GOB_SIZE_Y;

// Bytes within a GOB are contiguous in runs of 16.
const GOB_RUN: u32 = 16;

/// Byte offset of `(x, y)` inside a GOB, where `x` is a byte column and `y` a row.
pub fn gob_offset(x: u32, y: u32) -> u32 {
    ((x % 64) / 32) * 256 + ((y % 8) / 2) * 64 + ((x % 32) / 16) * 32 + (y % 2) * 16 + (x % 16)
}

fn align_up(value: u32, align: u32) -> u32 {
    value.div_ceil(align) * align
}

/// Number of guest bytes spanned by a tiled surface.
pub fn tiled_size(width: u32, height: u32, bytes_per_block: u32, block_height: u32) -> usize {
    let block_height = block_height.max(1);
    let aligned_width = align_up(width * bytes_per_block, GOB_SIZE_X) as usize;
    let aligned_height = align_up(height, GOB_SIZE_Y * block_height) as usize;
    aligned_width * aligned_height
}

struct Layout {
    row_bytes: u32,
    height: u32,
    block_height: u32,
    block_row_stride: usize,
}

impl Layout {
    fn new(width: u32, height: u32, bytes_per_block: u32, block_height: u32) -> Self {
        let block_height = block_height.max(1);
        let gobs_in_x = align_up(width * bytes_per_block, GOB_SIZE_X) / GOB_SIZE_X;
        Self {
            row_bytes: width * bytes_per_block,
            height,
            block_height,
            block_row_stride: (gobs_in_x * GOB_SIZE * block_height) as usize,
        }
    }

    fn tiled_offset(&self, x_bytes: u32, y: u32) -> usize {
        let gob_y = y / GOB_SIZE_Y;
        let block_y = (gob_y / self.block_height) as usize;
        let gob_in_block = gob_y % self.block_height;
        let gob_x = x_bytes / GOB_SIZE_X;
        block_y * self.block_row_stride
            + (gob_x * GOB_SIZE * self.block_height) as usize
            + (gob_in_block * GOB_SIZE) as usize
            + gob_offset(x_bytes % GOB_SIZE_X, y % GOB_SIZE_Y) as usize
    }

    /// Visits every contiguous run as `(linear_offset, tiled_offset, len)`.
    fn for_each_run(&self, mut f: impl FnMut(usize, usize, usize)) {
        for y in 0..self.height {
            let row_start = (y * self.row_bytes) as usize;
            let mut x = 0;
            while x < self.row_bytes {
                let len = GOB_RUN.min(self.row_bytes - x);
                f(
                    row_start + x as usize,
                    self.tiled_offset(x, y),
                    len as usize,
                );
                x += GOB_RUN;
            }
        }
    }
}

/// Converts a block-linear surface into a tightly packed row-major one.
///
/// # Panics
///
/// Panics if `tiled` is shorter than [`tiled_size`] or `linear` is shorter than the packed
/// surface size.
pub fn unswizzle(
    tiled: &[u8],
    linear: &mut [u8],
    width: u32,
    height: u32,
    bytes_per_block: u32,
    block_height: u32,
) {
    let layout = Layout::new(width, height, bytes_per_block, block_height);
    assert!(tiled.len() >= tiled_size(width, height, bytes_per_block, block_height));
    assert!(linear.len() >= (layout.row_bytes * height) as usize);
    layout.for_each_run(|lin, til, len| {
        linear[lin..lin + len].copy_from_slice(&tiled[til..til + len]);
    });
}

/// Writes a tightly packed row-major surface into block-linear layout.
///
/// Bytes of `tiled` that fall in the alignment padding are left untouched.
///
/// # Panics
///
/// Same conditions as [`unswizzle`].
pub fn swizzle(
    linear: &[u8],
    tiled: &mut [u8],
    width: u32,
    height: u32,
    bytes_per_block: u32,
    block_height: u32,
) {
    let layout = Layout::new(width, height, bytes_per_block, block_height);
    assert!(tiled.len() >= tiled_size(width, height, bytes_per_block, block_height));
    assert!(linear.len() >= (layout.row_bytes * height) as usize);
    layout.for_each_run(|lin, til, len| {
        tiled[til..til + len].copy_from_slice(&linear[lin..lin + len]);
    });
}
