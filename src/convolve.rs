//! Generic N x N integer convolution over pixel regions.
//!
//! The kernel is applied independently to every channel. A margin of
//! `size / 2` pixels on every edge is not convolved: those rows and columns
//! are copied from the source unchanged. Interior rows are computed in
//! parallel since each reads only the immutable source.

use rayon::prelude::*;

use crate::basics::clamp_u8;
use crate::error::{Error, Result};
use crate::pixel_region::{check_congruent, PixelRegion, PixelRegionMut, RegionGeometry};

/// Offset added to the divided sum in [`ConvolveMode::Negative`].
pub const NEGATIVE_OFFSET: i64 = 128;

/// Largest accepted kernel edge. With `i32` weights and byte samples the
/// `i64` channel sum of a kernel this size cannot overflow.
pub const MAX_KERNEL_SIZE: usize = 255;

/// Output policy for the signed weighted sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConvolveMode {
    /// Negative results clamp to 0.
    #[default]
    Normal,
    /// Magnitude of the signed result (edge strength).
    Absolute,
    /// Result re-centred on mid-gray by adding 128.
    Negative,
}

impl ConvolveMode {
    #[inline]
    fn finish(self, total: i64, divisor: i64) -> u8 {
        let v = total / divisor;
        match self {
            ConvolveMode::Normal => clamp_u8(v),
            ConvolveMode::Absolute => clamp_u8(v.abs()),
            ConvolveMode::Negative => clamp_u8(v + NEGATIVE_OFFSET),
        }
    }
}

/// Convolve `src` into `dest` with the row-major `size` x `size` kernel
/// `matrix`.
///
/// Each channel sum is computed in `i64`, divided by `divisor` (truncating
/// toward zero), then shaped by `mode` and clamped to `0..=255`. Inputs
/// smaller than `size - 1` in either direction leave `dest` untouched.
pub fn convolve_region(
    src: &PixelRegion<'_>,
    dest: &mut PixelRegionMut<'_>,
    matrix: &[i32],
    size: usize,
    divisor: i32,
    mode: ConvolveMode,
) -> Result<()> {
    if size == 0 || size % 2 == 0 {
        return Err(Error::invalid(format!("kernel size must be odd, got {size}")));
    }
    if size > MAX_KERNEL_SIZE {
        return Err(Error::invalid(format!(
            "kernel size {size} exceeds the maximum of {MAX_KERNEL_SIZE}"
        )));
    }
    if matrix.len() != size * size {
        return Err(Error::invalid(format!(
            "kernel of size {size} needs {} weights, got {}",
            size * size,
            matrix.len()
        )));
    }
    if divisor == 0 {
        return Err(Error::invalid("convolution divisor must be nonzero"));
    }
    check_congruent(src, &*dest)?;

    let (w, h, bytes) = (src.width(), src.height(), src.bytes());
    if w < size - 1 || h < size - 1 {
        log::debug!("convolve: {w}x{h} is smaller than a {size}x{size} kernel, skipping");
        return Ok(());
    }

    let margin = size / 2;
    let divisor = divisor as i64;
    let src = *src;
    dest.par_rows_mut().enumerate().for_each(|(y, out)| {
        let input = src.row(y);
        if y < margin || y + margin >= h {
            out.copy_from_slice(input);
            return;
        }
        let border = margin * bytes;
        out[..border].copy_from_slice(&input[..border]);
        let right = w.saturating_sub(margin).max(margin) * bytes;
        out[right..].copy_from_slice(&input[right..]);

        for x in margin..w.saturating_sub(margin) {
            for b in 0..bytes {
                let mut total = 0i64;
                for (ky, weights) in matrix.chunks_exact(size).enumerate() {
                    let row = src.row(y + ky - margin);
                    let base = (x - margin) * bytes + b;
                    for (kx, &k) in weights.iter().enumerate() {
                        total += k as i64 * row[base + kx * bytes] as i64;
                    }
                }
                out[x * bytes + b] = mode.finish(total, divisor);
            }
        }
    });
    Ok(())
}

/// Commonly used kernels, each paired with the divisor it is meant for.
pub mod kernels {
    /// 3 x 3 box blur, divisor 9.
    pub const BOX_BLUR_3: ([i32; 9], i32) = ([1, 1, 1, 1, 1, 1, 1, 1, 1], 9);

    /// 3 x 3 sharpen, divisor 1.
    pub const SHARPEN_3: ([i32; 9], i32) = ([0, -1, 0, -1, 5, -1, 0, -1, 0], 1);

    /// Horizontal-gradient Sobel operator, divisor 1.
    pub const SOBEL_H: ([i32; 9], i32) = ([-1, 0, 1, -2, 0, 2, -1, 0, 1], 1);

    /// Vertical-gradient Sobel operator, divisor 1.
    pub const SOBEL_V: ([i32; 9], i32) = ([-1, -2, -1, 0, 0, 0, 1, 2, 1], 1);

    /// 4-neighbour Laplacian, divisor 1.
    pub const LAPLACIAN_3: ([i32; 9], i32) = ([0, 1, 0, 1, -4, 1, 0, 1, 0], 1);

    /// `size` x `size` box blur kernel and its divisor.
    pub fn box_blur(size: usize) -> (Vec<i32>, i32) {
        (vec![1; size * size], (size * size) as i32)
    }
}

// ============================================================================
// Tests
// ============================================================================
