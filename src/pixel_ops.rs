//! Row primitives: per-pixel operations over one row of interleaved bytes.
//!
//! Every function walks `w` pixels of `bytes` channels. Slices must hold at
//! least `w * bytes` bytes (`w` bytes for a mask); shorter slices are
//! rejected with [`Error::OutOfBounds`](crate::Error::OutOfBounds) before any
//! byte is written. Extra trailing bytes are ignored.
//!
//! Blending uses 8-bit fixed point with truncating division by 255:
//! `dest = (src1 * a + src2 * (255 - a)) / 255`. `a == 255` reproduces
//! `src1` and `a == 0` reproduces `src2` exactly.

use std::sync::OnceLock;

use crate::color_space::{hsv_to_pixel, pixel_to_hsv, OrderRgb};
use crate::error::{ensure_len, Error, Result};

/// Size of the saturating-add lookup table (covers sums `0..=510`).
pub const ADD_BOUNDS_LEN: usize = 512;

static ADD_BOUNDS: OnceLock<[u8; ADD_BOUNDS_LEN]> = OnceLock::new();

/// Clamp table for saturating addition: `add_bounds()[a + b] == min(a + b, 255)`.
///
/// Built on first use, read-only afterwards.
pub fn add_bounds() -> &'static [u8; ADD_BOUNDS_LEN] {
    ADD_BOUNDS.get_or_init(|| {
        let mut table = [0u8; ADD_BOUNDS_LEN];
        for (i, v) in table.iter_mut().enumerate() {
            *v = i.min(255) as u8;
        }
        table
    })
}

/// Single RGB channel selector for the channel-only operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RgbChannel {
    Red,
    Green,
    Blue,
}

impl RgbChannel {
    #[inline]
    fn offset(self) -> usize {
        match self {
            RgbChannel::Red => OrderRgb::R,
            RgbChannel::Green => OrderRgb::G,
            RgbChannel::Blue => OrderRgb::B,
        }
    }
}

/// Single HSV component selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HsvChannel {
    Hue,
    Saturation,
    Value,
}

impl HsvChannel {
    #[inline]
    fn index(self) -> usize {
        match self {
            HsvChannel::Hue => 0,
            HsvChannel::Saturation => 1,
            HsvChannel::Value => 2,
        }
    }
}

/// Per-pixel walkers need at least one channel to step over.
#[inline]
fn check_depth(bytes: usize) -> Result<()> {
    if bytes == 0 {
        return Err(Error::invalid("bytes per pixel must be at least 1"));
    }
    Ok(())
}

#[inline]
fn check2(a: &[u8], dest: &[u8], len: usize) -> Result<()> {
    ensure_len(len, a.len())?;
    ensure_len(len, dest.len())
}

#[inline]
fn check3(a: &[u8], b: &[u8], dest: &[u8], len: usize) -> Result<()> {
    ensure_len(len, a.len())?;
    ensure_len(len, b.len())?;
    ensure_len(len, dest.len())
}

#[inline]
fn lerp(a: u8, b: u8, alpha: u32) -> u8 {
    ((a as u32 * alpha + b as u32 * (255 - alpha)) / 255) as u8
}

/// Per-channel binary op applied over `w * bytes` bytes.
#[inline]
fn zip_channels(
    src1: &[u8],
    src2: &[u8],
    dest: &mut [u8],
    len: usize,
    op: impl Fn(u8, u8) -> u8,
) -> Result<()> {
    check3(src1, src2, dest, len)?;
    for ((d, &a), &b) in dest[..len].iter_mut().zip(&src1[..len]).zip(&src2[..len]) {
        *d = op(a, b);
    }
    Ok(())
}

// ============================================================================
// Fill and copy
// ============================================================================

/// Broadcast `color` (its first `bytes` entries) into every pixel.
pub fn color_pixels(dest: &mut [u8], color: &[u8], w: usize, bytes: usize) -> Result<()> {
    check_depth(bytes)?;
    ensure_len(bytes, color.len())?;
    ensure_len(w * bytes, dest.len())?;
    for px in dest[..w * bytes].chunks_exact_mut(bytes) {
        px.copy_from_slice(&color[..bytes]);
    }
    Ok(())
}

pub fn copy_pixels(src: &[u8], dest: &mut [u8], w: usize, bytes: usize) -> Result<()> {
    let len = w * bytes;
    check2(src, dest, len)?;
    dest[..len].copy_from_slice(&src[..len]);
    Ok(())
}

// ============================================================================
// Blending
// ============================================================================

/// `dest = (src1 * blend + src2 * (255 - blend)) / 255`, per channel.
pub fn blend_pixels(
    src1: &[u8],
    src2: &[u8],
    dest: &mut [u8],
    blend: u8,
    w: usize,
    bytes: usize,
) -> Result<()> {
    let alpha = blend as u32;
    zip_channels(src1, src2, dest, w * bytes, |a, b| lerp(a, b, alpha))
}

/// Blend every pixel of `src` toward the constant `color`:
/// `dest = (color * blend + src * (255 - blend)) / 255`.
pub fn shade_pixels(
    src: &[u8],
    dest: &mut [u8],
    color: &[u8],
    blend: u8,
    w: usize,
    bytes: usize,
) -> Result<()> {
    check_depth(bytes)?;
    ensure_len(bytes, color.len())?;
    let len = w * bytes;
    check2(src, dest, len)?;
    let alpha = blend as u32;
    for (d, s) in dest[..len]
        .chunks_exact_mut(bytes)
        .zip(src[..len].chunks_exact(bytes))
    {
        for b in 0..bytes {
            d[b] = lerp(color[b], s[b], alpha);
        }
    }
    Ok(())
}

/// Blend with a per-pixel factor taken from `mask` (one byte per pixel):
/// `dest = (src1 * mask + src2 * (255 - mask)) / 255`.
pub fn composite_pixels(
    src1: &[u8],
    src2: &[u8],
    dest: &mut [u8],
    mask: &[u8],
    w: usize,
    bytes: usize,
) -> Result<()> {
    check_depth(bytes)?;
    let len = w * bytes;
    check3(src1, src2, dest, len)?;
    ensure_len(w, mask.len())?;
    for (((d, a), b), &m) in dest[..len]
        .chunks_exact_mut(bytes)
        .zip(src1[..len].chunks_exact(bytes))
        .zip(src2[..len].chunks_exact(bytes))
        .zip(&mask[..w])
    {
        let alpha = m as u32;
        for c in 0..bytes {
            d[c] = lerp(a[c], b[c], alpha);
        }
    }
    Ok(())
}

// ============================================================================
// Comparison and arithmetic modes
// ============================================================================

/// Per-channel minimum.
pub fn darken_pixels(src1: &[u8], src2: &[u8], dest: &mut [u8], w: usize, bytes: usize) -> Result<()> {
    zip_channels(src1, src2, dest, w * bytes, |a, b| a.min(b))
}

/// Per-channel maximum.
pub fn lighten_pixels(src1: &[u8], src2: &[u8], dest: &mut [u8], w: usize, bytes: usize) -> Result<()> {
    zip_channels(src1, src2, dest, w * bytes, |a, b| a.max(b))
}

/// Saturating per-channel addition through [`add_bounds`].
pub fn add_pixels(src1: &[u8], src2: &[u8], dest: &mut [u8], w: usize, bytes: usize) -> Result<()> {
    let table = add_bounds();
    zip_channels(src1, src2, dest, w * bytes, |a, b| {
        table[a as usize + b as usize]
    })
}

/// `dest = max(src1 - src2, 0)` per channel.
pub fn subtract_pixels(
    src1: &[u8],
    src2: &[u8],
    dest: &mut [u8],
    w: usize,
    bytes: usize,
) -> Result<()> {
    zip_channels(src1, src2, dest, w * bytes, |a, b| a.saturating_sub(b))
}

/// `dest = src1 * src2 / 255` per channel.
pub fn multiply_pixels(
    src1: &[u8],
    src2: &[u8],
    dest: &mut [u8],
    w: usize,
    bytes: usize,
) -> Result<()> {
    zip_channels(src1, src2, dest, w * bytes, |a, b| {
        (a as u32 * b as u32 / 255) as u8
    })
}

/// `dest = 255 - (255 - src1) * (255 - src2) / 255` per channel.
pub fn screen_pixels(src1: &[u8], src2: &[u8], dest: &mut [u8], w: usize, bytes: usize) -> Result<()> {
    zip_channels(src1, src2, dest, w * bytes, |a, b| {
        255 - ((255 - a as u32) * (255 - b as u32) / 255) as u8
    })
}

/// `dest = |src1 - src2|` per channel.
pub fn difference_pixels(
    src1: &[u8],
    src2: &[u8],
    dest: &mut [u8],
    w: usize,
    bytes: usize,
) -> Result<()> {
    zip_channels(src1, src2, dest, w * bytes, |a, b| a.abs_diff(b))
}

// ============================================================================
// Channel-only modes
// ============================================================================

/// Take `channel` from `src1` and every other channel from `src2`.
///
/// Only meaningful for 3-byte RGB pixels; any other depth copies `src1`
/// through unchanged.
pub fn rgb_channel_only_pixels(
    src1: &[u8],
    src2: &[u8],
    dest: &mut [u8],
    channel: RgbChannel,
    w: usize,
    bytes: usize,
) -> Result<()> {
    if bytes != OrderRgb::N {
        return copy_pixels(src1, dest, w, bytes);
    }
    let len = w * bytes;
    check3(src1, src2, dest, len)?;
    let off = channel.offset();
    for ((d, a), b) in dest[..len]
        .chunks_exact_mut(bytes)
        .zip(src1[..len].chunks_exact(bytes))
        .zip(src2[..len].chunks_exact(bytes))
    {
        d.copy_from_slice(b);
        d[off] = a[off];
    }
    Ok(())
}

pub fn red_only_pixels(src1: &[u8], src2: &[u8], dest: &mut [u8], w: usize, bytes: usize) -> Result<()> {
    rgb_channel_only_pixels(src1, src2, dest, RgbChannel::Red, w, bytes)
}

pub fn green_only_pixels(src1: &[u8], src2: &[u8], dest: &mut [u8], w: usize, bytes: usize) -> Result<()> {
    rgb_channel_only_pixels(src1, src2, dest, RgbChannel::Green, w, bytes)
}

pub fn blue_only_pixels(src1: &[u8], src2: &[u8], dest: &mut [u8], w: usize, bytes: usize) -> Result<()> {
    rgb_channel_only_pixels(src1, src2, dest, RgbChannel::Blue, w, bytes)
}

/// Convert both pixels to HSV, substitute `channel` from `src1` into
/// `src2`'s HSV triple, convert back. Non-RGB depths copy `src1`.
pub fn hsv_channel_only_pixels(
    src1: &[u8],
    src2: &[u8],
    dest: &mut [u8],
    channel: HsvChannel,
    w: usize,
    bytes: usize,
) -> Result<()> {
    if bytes != OrderRgb::N {
        return copy_pixels(src1, dest, w, bytes);
    }
    let len = w * bytes;
    check3(src1, src2, dest, len)?;
    let k = channel.index();
    for ((d, a), b) in dest[..len]
        .chunks_exact_mut(bytes)
        .zip(src1[..len].chunks_exact(bytes))
        .zip(src2[..len].chunks_exact(bytes))
    {
        let from = pixel_to_hsv(a);
        let mut hsv = pixel_to_hsv(b);
        hsv[k] = from[k];
        hsv_to_pixel(hsv, d);
    }
    Ok(())
}

pub fn hue_only_pixels(src1: &[u8], src2: &[u8], dest: &mut [u8], w: usize, bytes: usize) -> Result<()> {
    hsv_channel_only_pixels(src1, src2, dest, HsvChannel::Hue, w, bytes)
}

pub fn saturation_only_pixels(
    src1: &[u8],
    src2: &[u8],
    dest: &mut [u8],
    w: usize,
    bytes: usize,
) -> Result<()> {
    hsv_channel_only_pixels(src1, src2, dest, HsvChannel::Saturation, w, bytes)
}

pub fn value_only_pixels(src1: &[u8], src2: &[u8], dest: &mut [u8], w: usize, bytes: usize) -> Result<()> {
    hsv_channel_only_pixels(src1, src2, dest, HsvChannel::Value, w, bytes)
}

// ============================================================================
// Single-source ops
// ============================================================================

/// Threshold: any nonzero byte becomes 255, zero stays 0.
pub fn black_white_pixels(src: &[u8], dest: &mut [u8], w: usize, bytes: usize) -> Result<()> {
    let len = w * bytes;
    check2(src, dest, len)?;
    for (d, &s) in dest[..len].iter_mut().zip(&src[..len]) {
        *d = if s != 0 { 255 } else { 0 };
    }
    Ok(())
}

/// `dest = src * scale / 255` per channel.
pub fn scale_pixels(src: &[u8], dest: &mut [u8], scale: u8, w: usize, bytes: usize) -> Result<()> {
    let len = w * bytes;
    check2(src, dest, len)?;
    let scale = scale as u32;
    for (d, &s) in dest[..len].iter_mut().zip(&src[..len]) {
        *d = (s as u32 * scale / 255) as u8;
    }
    Ok(())
}

/// `dest = 255 - src` per channel.
pub fn invert_pixels(src: &[u8], dest: &mut [u8], w: usize, bytes: usize) -> Result<()> {
    let len = w * bytes;
    check2(src, dest, len)?;
    for (d, &s) in dest[..len].iter_mut().zip(&src[..len]) {
        *d = 255 - s;
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_color_pixels() {
        let mut dest = vec![0u8; 9];
        color_pixels(&mut dest, &[1, 2, 3], 3, 3).unwrap();
        assert_eq!(dest, vec![1, 2, 3, 1, 2, 3, 1, 2, 3]);

        // Zero-width row is a no-op.
        let mut empty: Vec<u8> = Vec::new();
        color_pixels(&mut empty, &[7], 0, 1).unwrap();
    }

    #[test]
    fn test_blend_identity_all_values() {
        let a: Vec<u8> = (0..=255).collect();
        let b: Vec<u8> = (0..=255).rev().collect();
        let mut dest = vec![0u8; 256];
        blend_pixels(&a, &b, &mut dest, 255, 256, 1).unwrap();
        assert_eq!(dest, a);
        blend_pixels(&a, &b, &mut dest, 0, 256, 1).unwrap();
        assert_eq!(dest, b);
    }

    #[test]
    fn test_blend_truncates() {
        let mut dest = [0u8; 1];
        blend_pixels(&[100], &[200], &mut dest, 128, 1, 1).unwrap();
        // (100*128 + 200*127) / 255 = 38200 / 255 = 149.8 -> 149
        assert_eq!(dest[0], 149);
    }

    #[test]
    fn test_shade_toward_color() {
        let src = [0u8, 100, 200];
        let mut dest = [0u8; 3];
        shade_pixels(&src, &mut dest, &[255, 255, 255], 255, 1, 3).unwrap();
        assert_eq!(dest, [255, 255, 255]);
        shade_pixels(&src, &mut dest, &[255, 255, 255], 0, 1, 3).unwrap();
        assert_eq!(dest, src);
        shade_pixels(&src, &mut dest, &[0, 0, 0], 51, 1, 3).unwrap();
        // src * 204 / 255
        assert_eq!(dest, [0, 80, 160]);
    }

    #[test]
    fn test_composite_per_pixel_mask() {
        let a = [255u8, 255, 255, 255];
        let b = [0u8, 0, 0, 0];
        let mut dest = [0u8; 4];
        composite_pixels(&a, &b, &mut dest, &[255, 0], 2, 2).unwrap();
        assert_eq!(dest, [255, 255, 0, 0]);
        composite_pixels(&a, &b, &mut dest, &[128, 64], 2, 2).unwrap();
        assert_eq!(dest, [128, 128, 64, 64]);
    }

    #[test]
    fn test_darken_lighten_complement() {
        for a in (0..=255u32).step_by(3) {
            for b in (0..=255u32).step_by(7) {
                let (a, b) = (a as u8, b as u8);
                let mut lo = [0u8];
                let mut hi = [0u8];
                darken_pixels(&[a], &[b], &mut lo, 1, 1).unwrap();
                lighten_pixels(&[a], &[b], &mut hi, 1, 1).unwrap();
                assert!(lo[0] <= a && lo[0] <= b);
                assert!(hi[0] >= a && hi[0] >= b);
                assert_eq!(lo[0] as u32 + hi[0] as u32, a as u32 + b as u32);
            }
        }
    }

    #[test]
    fn test_add_bounds_table() {
        let table = add_bounds();
        for i in 0..=510usize {
            assert_eq!(table[i] as usize, i.min(255));
        }
        // Same table on every call.
        assert!(std::ptr::eq(table, add_bounds()));
    }

    #[test]
    fn test_add_saturates() {
        for a in 0..=255u32 {
            let src1 = vec![a as u8; 256];
            let src2: Vec<u8> = (0..=255).collect();
            let mut dest = vec![0u8; 256];
            add_pixels(&src1, &src2, &mut dest, 256, 1).unwrap();
            for b in 0..=255u32 {
                assert_eq!(dest[b as usize] as u32, (a + b).min(255));
            }
        }
    }

    #[test]
    fn test_arithmetic_modes() {
        let mut d = [0u8; 1];
        subtract_pixels(&[10], &[30], &mut d, 1, 1).unwrap();
        assert_eq!(d[0], 0);
        subtract_pixels(&[30], &[10], &mut d, 1, 1).unwrap();
        assert_eq!(d[0], 20);
        multiply_pixels(&[255], &[77], &mut d, 1, 1).unwrap();
        assert_eq!(d[0], 77);
        multiply_pixels(&[128], &[128], &mut d, 1, 1).unwrap();
        assert_eq!(d[0], 64);
        screen_pixels(&[0], &[77], &mut d, 1, 1).unwrap();
        assert_eq!(d[0], 77);
        screen_pixels(&[255], &[3], &mut d, 1, 1).unwrap();
        assert_eq!(d[0], 255);
        difference_pixels(&[3], &[250], &mut d, 1, 1).unwrap();
        assert_eq!(d[0], 247);
    }

    #[test]
    fn test_rgb_channel_only() {
        let a = [10u8, 20, 30];
        let b = [100u8, 110, 120];
        let mut d = [0u8; 3];
        red_only_pixels(&a, &b, &mut d, 1, 3).unwrap();
        assert_eq!(d, [10, 110, 120]);
        green_only_pixels(&a, &b, &mut d, 1, 3).unwrap();
        assert_eq!(d, [100, 20, 120]);
        blue_only_pixels(&a, &b, &mut d, 1, 3).unwrap();
        assert_eq!(d, [100, 110, 30]);
    }

    #[test]
    fn test_channel_only_degrades_to_copy() {
        let a = [1u8, 2, 3, 4];
        let b = [9u8, 9, 9, 9];
        let mut d = [0u8; 4];
        red_only_pixels(&a, &b, &mut d, 1, 4).unwrap();
        assert_eq!(d, a);
        hue_only_pixels(&a, &b, &mut d, 4, 1).unwrap();
        assert_eq!(d, a);
    }

    #[test]
    fn test_value_only_keeps_hue_and_saturation() {
        // Pure red takes the value of a dark gray.
        let a = [64u8, 64, 64];
        let b = [255u8, 0, 0];
        let mut d = [0u8; 3];
        value_only_pixels(&a, &b, &mut d, 1, 3).unwrap();
        assert_eq!(d[1], 0);
        assert_eq!(d[2], 0);
        assert!((63..=64).contains(&d[0]), "red = {}", d[0]);
    }

    #[test]
    fn test_saturation_only_from_gray_desaturates() {
        let a = [50u8, 50, 50];
        let b = [200u8, 40, 40];
        let mut d = [0u8; 3];
        saturation_only_pixels(&a, &b, &mut d, 1, 3).unwrap();
        assert_eq!(d, [200, 200, 200]);
    }

    #[test]
    fn test_black_white() {
        let src = [0u8, 1, 128, 255];
        let mut d = [9u8; 4];
        black_white_pixels(&src, &mut d, 4, 1).unwrap();
        assert_eq!(d, [0, 255, 255, 255]);
    }

    #[test]
    fn test_scale_and_invert() {
        let src = [0u8, 100, 255];
        let mut d = [0u8; 3];
        scale_pixels(&src, &mut d, 128, 3, 1).unwrap();
        assert_eq!(d, [0, 50, 128]);
        scale_pixels(&src, &mut d, 255, 3, 1).unwrap();
        assert_eq!(d, src);
        invert_pixels(&src, &mut d, 3, 1).unwrap();
        assert_eq!(d, [255, 155, 0]);
    }

    #[test]
    fn test_short_slices_rejected() {
        let mut d = [0u8; 5];
        let err = blend_pixels(&[0; 6], &[0; 6], &mut d, 10, 2, 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfBounds);
        let err = composite_pixels(&[0; 6], &[0; 6], &mut [0; 6], &[0], 2, 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfBounds);
        // Nothing was written on failure.
        assert_eq!(d, [0; 5]);
    }
}
