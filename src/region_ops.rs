//! Region primitives: the row primitives lifted over whole pixel regions.
//!
//! Each function checks once that its operands describe congruent
//! rectangles, then applies the matching row primitive to every scanline.
//! Sources and destination advance by their own `rowstride`, so any of them
//! may be a sub-rectangle of a larger buffer.
//!
//! Rows are independent, so the two-source operations run row-parallel on
//! the rayon pool: every task writes one destination row and reads only the
//! immutable sources.

use rayon::prelude::*;

use crate::error::Result;
use crate::paint_mode::{apply_paint_mode, PaintMode};
use crate::pixel_ops;
use crate::pixel_region::{check_congruent, check_mask, PixelRegion, PixelRegionMut, RegionGeometry};

/// Run `f(y, dest_row)` over every destination row in parallel.
#[inline]
fn for_each_row<F>(dest: &mut PixelRegionMut<'_>, f: F) -> Result<()>
where
    F: Fn(usize, &mut [u8]) -> Result<()> + Sync + Send,
{
    dest.par_rows_mut()
        .enumerate()
        .try_for_each(|(y, row)| f(y, row))
}

// ============================================================================
// Single-source ops
// ============================================================================

/// Fill every pixel of `dest` with `color`.
pub fn color_region(dest: &mut PixelRegionMut<'_>, color: &[u8]) -> Result<()> {
    let (w, bytes) = (dest.width(), dest.bytes());
    for row in dest.rows_mut() {
        pixel_ops::color_pixels(row, color, w, bytes)?;
    }
    Ok(())
}

pub fn copy_region(src: &PixelRegion<'_>, dest: &mut PixelRegionMut<'_>) -> Result<()> {
    check_congruent(src, &*dest)?;
    let (w, bytes) = (src.width(), src.bytes());
    for (y, row) in dest.rows_mut().enumerate() {
        pixel_ops::copy_pixels(src.row(y), row, w, bytes)?;
    }
    Ok(())
}

/// Blend every pixel of `src` toward `color` by `blend`.
pub fn shade_region(
    src: &PixelRegion<'_>,
    dest: &mut PixelRegionMut<'_>,
    color: &[u8],
    blend: u8,
) -> Result<()> {
    check_congruent(src, &*dest)?;
    let (w, bytes) = (src.width(), src.bytes());
    for_each_row(dest, |y, row| {
        pixel_ops::shade_pixels(src.row(y), row, color, blend, w, bytes)
    })
}

pub fn black_white_region(src: &PixelRegion<'_>, dest: &mut PixelRegionMut<'_>) -> Result<()> {
    check_congruent(src, &*dest)?;
    let (w, bytes) = (src.width(), src.bytes());
    for_each_row(dest, |y, row| {
        pixel_ops::black_white_pixels(src.row(y), row, w, bytes)
    })
}

pub fn scale_region(src: &PixelRegion<'_>, dest: &mut PixelRegionMut<'_>, scale: u8) -> Result<()> {
    check_congruent(src, &*dest)?;
    let (w, bytes) = (src.width(), src.bytes());
    for_each_row(dest, |y, row| {
        pixel_ops::scale_pixels(src.row(y), row, scale, w, bytes)
    })
}

pub fn invert_region(src: &PixelRegion<'_>, dest: &mut PixelRegionMut<'_>) -> Result<()> {
    check_congruent(src, &*dest)?;
    let (w, bytes) = (src.width(), src.bytes());
    for_each_row(dest, |y, row| pixel_ops::invert_pixels(src.row(y), row, w, bytes))
}

// ============================================================================
// Two-source ops
// ============================================================================

#[inline]
fn check_pair(
    src1: &PixelRegion<'_>,
    src2: &PixelRegion<'_>,
    dest: &PixelRegionMut<'_>,
) -> Result<()> {
    check_congruent(src1, src2)?;
    check_congruent(src1, dest)
}

/// `dest = (src1 * blend + src2 * (255 - blend)) / 255` over whole regions.
pub fn blend_region(
    src1: &PixelRegion<'_>,
    src2: &PixelRegion<'_>,
    dest: &mut PixelRegionMut<'_>,
    blend: u8,
) -> Result<()> {
    check_pair(src1, src2, dest)?;
    let (w, bytes) = (src1.width(), src1.bytes());
    for_each_row(dest, |y, row| {
        pixel_ops::blend_pixels(src1.row(y), src2.row(y), row, blend, w, bytes)
    })
}

/// Blend `src1` over `src2` with a per-pixel factor from the one-byte
/// `mask` region.
pub fn composite_region(
    src1: &PixelRegion<'_>,
    src2: &PixelRegion<'_>,
    dest: &mut PixelRegionMut<'_>,
    mask: &PixelRegion<'_>,
) -> Result<()> {
    check_pair(src1, src2, dest)?;
    check_mask(src1, mask)?;
    let (w, bytes) = (src1.width(), src1.bytes());
    for_each_row(dest, |y, row| {
        pixel_ops::composite_pixels(src1.row(y), src2.row(y), row, mask.row(y), w, bytes)
    })
}

pub fn darken_region(
    src1: &PixelRegion<'_>,
    src2: &PixelRegion<'_>,
    dest: &mut PixelRegionMut<'_>,
) -> Result<()> {
    check_pair(src1, src2, dest)?;
    let (w, bytes) = (src1.width(), src1.bytes());
    for_each_row(dest, |y, row| {
        pixel_ops::darken_pixels(src1.row(y), src2.row(y), row, w, bytes)
    })
}

pub fn lighten_region(
    src1: &PixelRegion<'_>,
    src2: &PixelRegion<'_>,
    dest: &mut PixelRegionMut<'_>,
) -> Result<()> {
    check_pair(src1, src2, dest)?;
    let (w, bytes) = (src1.width(), src1.bytes());
    for_each_row(dest, |y, row| {
        pixel_ops::lighten_pixels(src1.row(y), src2.row(y), row, w, bytes)
    })
}

/// Saturating addition of two regions.
pub fn add_region(
    src1: &PixelRegion<'_>,
    src2: &PixelRegion<'_>,
    dest: &mut PixelRegionMut<'_>,
) -> Result<()> {
    check_pair(src1, src2, dest)?;
    let (w, bytes) = (src1.width(), src1.bytes());
    for_each_row(dest, |y, row| {
        pixel_ops::add_pixels(src1.row(y), src2.row(y), row, w, bytes)
    })
}

/// Combine paint `src1` with the underlying `src2` under `mode`.
pub fn apply_paint_mode_region(
    src1: &PixelRegion<'_>,
    src2: &PixelRegion<'_>,
    dest: &mut PixelRegionMut<'_>,
    mode: PaintMode,
) -> Result<()> {
    check_pair(src1, src2, dest)?;
    let (w, bytes) = (src1.width(), src1.bytes());
    for_each_row(dest, |y, row| {
        apply_paint_mode(src1.row(y), src2.row(y), row, w, bytes, mode)
    })
}

// ============================================================================
// Tests
// ============================================================================
