//! Affine resampling of pixel regions and their selection masks.
//!
//! A transform is built around a center as
//! `translate(-center) · op · translate(center)`. The result covers the
//! integer bounding box of the transformed source rectangle. Every result
//! pixel is mapped back through the inverse matrix and sampled from the
//! source, either bilinearly or by nearest neighbour. The selection mask
//! travels through the same mapping as an extra coverage channel.
//!
//! Rotations within [`ROTATION_EPSILON`] of a multiple of 90° skip
//! resampling altogether and rearrange pixels exactly, so axis-aligned
//! turns are lossless.

use rayon::prelude::*;

use crate::basics::{ifloor, PI};
use crate::error::{Error, Result};
use crate::matrix::Matrix3;
use crate::pixel_region::{PixelBuffer, PixelRegion, RegionGeometry};
use crate::region::Region;

/// Angular tolerance (radians, about 1°) for the exact quarter-turn path.
pub const ROTATION_EPSILON: f64 = 0.018;

/// Upper bound on result pixels; larger bounding boxes are rejected.
pub const MAX_RESULT_PIXELS: usize = 1 << 28;

// ============================================================================
// Options
// ============================================================================

/// Geometric operation applied by [`transform_region`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TransformOp {
    /// Rotation in radians; positive turns clockwise with y pointing down.
    Rotate { angle: f64 },
    Scale { x: f64, y: f64 },
    /// `x' = x + amount * y`.
    XShear(f64),
    /// `y' = y + amount * x`.
    YShear(f64),
    /// Arbitrary matrix, applied about the center like the others.
    Matrix(Matrix3),
}

impl TransformOp {
    /// The operation's matrix about the origin.
    pub fn matrix(&self) -> Matrix3 {
        match *self {
            TransformOp::Rotate { angle } => Matrix3::new_rotation(angle),
            TransformOp::Scale { x, y } => Matrix3::new_scaling(x, y),
            TransformOp::XShear(a) => Matrix3::new_xshear(a),
            TransformOp::YShear(a) => Matrix3::new_yshear(a),
            TransformOp::Matrix(m) => m,
        }
    }
}

/// Tunables for [`transform_region`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TransformOptions {
    /// Bilinear sampling when `true`, nearest neighbour otherwise.
    pub interpolation: bool,
    /// Fill for result pixels that map outside the source. Only the first
    /// `bytes` entries are used.
    pub background: [u8; 4],
    /// Pivot in source coordinates; `None` means the middle of the source.
    pub center: Option<(f64, f64)>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            interpolation: true,
            background: [0, 0, 0, 0],
            center: None,
        }
    }
}

impl TransformOptions {
    pub fn with_interpolation(mut self, on: bool) -> Self {
        self.interpolation = on;
        self
    }

    pub fn with_background(mut self, color: [u8; 4]) -> Self {
        self.background = color;
        self
    }

    pub fn with_center(mut self, cx: f64, cy: f64) -> Self {
        self.center = Some((cx, cy));
        self
    }

    fn pivot(&self, w: usize, h: usize) -> (f64, f64) {
        self.center
            .unwrap_or((w as f64 / 2.0, h as f64 / 2.0))
    }
}

/// Mirror axis for [`flip_region`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FlipAxis {
    /// Mirror left to right.
    Horizontal,
    /// Mirror top to bottom.
    Vertical,
}

/// Newly allocated pixels plus their coverage.
///
/// `offset_x`/`offset_y` locate the buffer's top-left pixel in the source's
/// coordinate system.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformResult {
    pub buffer: PixelBuffer,
    pub region: Region,
    pub offset_x: i32,
    pub offset_y: i32,
}

// ============================================================================
// Entry points
// ============================================================================

/// Full transform matrix for `op` pivoting on `center`.
pub fn transform_matrix(op: &TransformOp, center: (f64, f64)) -> Matrix3 {
    let mut m = Matrix3::new_translation(-center.0, -center.1);
    m.multiply(&op.matrix()).translate(center.0, center.1);
    m
}

/// Number of quarter turns (0..4) when `angle` lies within
/// [`ROTATION_EPSILON`] of a multiple of 90°.
pub fn right_angle_turns(angle: f64) -> Option<u32> {
    if !angle.is_finite() {
        return None;
    }
    let quarter = PI / 2.0;
    let k = (angle / quarter).round();
    if (angle - k * quarter).abs() < ROTATION_EPSILON {
        Some(k.rem_euclid(4.0) as u32)
    } else {
        None
    }
}

/// Transform `src` (and its selection `mask`, which defaults to full
/// coverage) by `op`.
pub fn transform_region(
    src: &PixelRegion<'_>,
    mask: Option<&Region>,
    op: &TransformOp,
    options: &TransformOptions,
) -> Result<TransformResult> {
    if let TransformOp::Rotate { angle } = *op {
        if let Some(turns) = right_angle_turns(angle) {
            log::debug!("transform: {angle} rad taken as {turns} exact quarter turns");
            return rotate_quarter_turns(src, mask, turns, options);
        }
    }
    let (w, h) = (src.width(), src.height());
    let coverage = source_coverage(mask, w, h)?;
    let m = transform_matrix(op, options.pivot(w, h));
    resample(src, &coverage, &m, options)
}

/// Lossless rotation by `turns` quarter turns clockwise.
pub fn rotate_quarter_turns(
    src: &PixelRegion<'_>,
    mask: Option<&Region>,
    turns: u32,
    options: &TransformOptions,
) -> Result<TransformResult> {
    let (w, h) = (src.width(), src.height());
    let turns = turns % 4;
    let (dw, dh) = if turns % 2 == 1 { (h, w) } else { (w, h) };

    let map = move |x: usize, y: usize| match turns {
        0 => (x, y),
        1 => (y, h - 1 - x),
        2 => (w - 1 - x, h - 1 - y),
        _ => (w - 1 - y, x),
    };
    let buffer = rearrange(src, dw, dh, map)?;
    let coverage = source_coverage(mask, w, h)?;
    let cov = rearrange(&coverage.as_region(), dw, dh, map)?;

    // Exact image of the source rectangle under the quarter turn.
    let (cx, cy) = options.pivot(w, h);
    let turn = |dx: f64, dy: f64| match turns {
        0 => (dx, dy),
        1 => (-dy, dx),
        2 => (-dx, -dy),
        _ => (dy, -dx),
    };
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    for (x, y) in [(0.0, 0.0), (w as f64, 0.0), (0.0, h as f64), (w as f64, h as f64)] {
        let (tx, ty) = turn(x - cx, y - cy);
        min_x = min_x.min(cx + tx);
        min_y = min_y.min(cy + ty);
    }

    Ok(TransformResult {
        region: Region::from_coverage(dw as i32, dh as i32, cov.data())?,
        buffer,
        offset_x: to_coord(min_x.floor())?,
        offset_y: to_coord(min_y.floor())?,
    })
}

/// Whole-pixel result coordinate; fails outside the `i32` range.
fn to_coord(v: f64) -> Result<i32> {
    if (i32::MIN as f64..=i32::MAX as f64).contains(&v) {
        Ok(v as i32)
    } else {
        Err(Error::invalid(format!("transformed coordinate {v} is out of range")))
    }
}

/// Lossless mirror of `src` and its mask.
pub fn flip_region(
    src: &PixelRegion<'_>,
    mask: Option<&Region>,
    axis: FlipAxis,
) -> Result<TransformResult> {
    let (w, h) = (src.width(), src.height());
    let map = move |x: usize, y: usize| match axis {
        FlipAxis::Horizontal => (w - 1 - x, y),
        FlipAxis::Vertical => (x, h - 1 - y),
    };
    let buffer = rearrange(src, w, h, map)?;
    let coverage = source_coverage(mask, w, h)?;
    let cov = rearrange(&coverage.as_region(), w, h, map)?;
    Ok(TransformResult {
        region: Region::from_coverage(w as i32, h as i32, cov.data())?,
        buffer,
        offset_x: 0,
        offset_y: 0,
    })
}

// ============================================================================
// Exact index rearrangement
// ============================================================================

/// Build a `dw` x `dh` buffer where pixel (x, y) is `src` at `map(x, y)`.
fn rearrange<F>(src: &PixelRegion<'_>, dw: usize, dh: usize, map: F) -> Result<PixelBuffer>
where
    F: Fn(usize, usize) -> (usize, usize) + Sync,
{
    let bytes = src.bytes();
    let mut out = PixelBuffer::new(dw, dh, bytes)?;
    let src = *src;
    out.as_region_mut()
        .par_rows_mut()
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.chunks_exact_mut(bytes).enumerate() {
                let (sx, sy) = map(x, y);
                px.copy_from_slice(src.pixel(sx, sy));
            }
        });
    Ok(out)
}

/// Packed one-byte coverage of the source selection.
fn source_coverage(mask: Option<&Region>, w: usize, h: usize) -> Result<PixelBuffer> {
    let Some(mask) = mask else {
        return PixelBuffer::filled(w, h, 1, &[255]);
    };
    if mask.width() as usize != w || mask.height() as usize != h {
        return Err(Error::invalid(format!(
            "mask is {}x{}, source is {w}x{h}",
            mask.width(),
            mask.height()
        )));
    }
    let mut cov = PixelBuffer::new(w, h, 1)?;
    for (y, row) in cov.as_region_mut().rows_mut().enumerate() {
        mask.fill_row_coverage(y as i32, row);
    }
    Ok(cov)
}

// ============================================================================
// Resampling
// ============================================================================

/// Source accessor that reports out-of-range pixels as background with
/// zero coverage.
struct Sampler<'a> {
    src: PixelRegion<'a>,
    coverage: PixelRegion<'a>,
    background: [u8; 4],
}

impl<'a> Sampler<'a> {
    #[inline]
    fn fetch(&self, x: i32, y: i32) -> Option<(&'a [u8], u8)> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.src.width() || y >= self.src.height() {
            return None;
        }
        Some((self.src.pixel(x, y), self.coverage.pixel(x, y)[0]))
    }

    /// Nearest source pixel to the point (u, v); returns its coverage.
    fn nearest(&self, u: f64, v: f64, out: &mut [u8]) -> u8 {
        match self.fetch(ifloor(u), ifloor(v)) {
            Some((px, c)) => {
                out.copy_from_slice(px);
                c
            }
            None => {
                out.copy_from_slice(&self.background[..out.len()]);
                0
            }
        }
    }

    /// Bilinear blend of the four pixels around (u, v); returns coverage.
    fn bilinear(&self, u: f64, v: f64, out: &mut [u8]) -> u8 {
        // Pixel centres sit on half-integers.
        let (sx, sy) = (u - 0.5, v - 0.5);
        let (x0, y0) = (ifloor(sx), ifloor(sy));
        let (dx, dy) = (sx - x0 as f64, sy - y0 as f64);

        let taps = [
            self.fetch(x0, y0),
            self.fetch(x0.saturating_add(1), y0),
            self.fetch(x0, y0.saturating_add(1)),
            self.fetch(x0.saturating_add(1), y0.saturating_add(1)),
        ];
        if taps.iter().all(Option::is_none) {
            out.copy_from_slice(&self.background[..out.len()]);
            return 0;
        }

        let lerp2 = |p00: f64, p10: f64, p01: f64, p11: f64| {
            (1.0 - dy) * ((1.0 - dx) * p00 + dx * p10) + dy * ((1.0 - dx) * p01 + dx * p11)
        };
        let channel = |i: usize, b: usize| match taps[i] {
            Some((px, _)) => px[b] as f64,
            None => self.background[b] as f64,
        };
        for (b, o) in out.iter_mut().enumerate() {
            *o = lerp2(channel(0, b), channel(1, b), channel(2, b), channel(3, b)) as u8;
        }
        let cov = |i: usize| taps[i].map_or(0.0, |(_, c)| c as f64);
        lerp2(cov(0), cov(1), cov(2), cov(3)) as u8
    }
}

fn resample(
    src: &PixelRegion<'_>,
    coverage: &PixelBuffer,
    m: &Matrix3,
    options: &TransformOptions,
) -> Result<TransformResult> {
    let (w, h, bytes) = (src.width(), src.height(), src.bytes());

    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for (x, y) in [(0.0, 0.0), (w as f64, 0.0), (0.0, h as f64), (w as f64, h as f64)] {
        let (tx, ty) = m.transform_point(x, y);
        min_x = min_x.min(tx);
        min_y = min_y.min(ty);
        max_x = max_x.max(tx);
        max_y = max_y.max(ty);
    }
    if ![min_x, min_y, max_x, max_y].iter().all(|v| v.is_finite()) {
        return Err(Error::invalid("transform maps the source to infinity"));
    }
    let (x1, y1) = (to_coord(min_x.floor())?, to_coord(min_y.floor())?);
    let (x2, y2) = (to_coord(max_x.ceil())?, to_coord(max_y.ceil())?);
    let dw = (x2 as i64 - x1 as i64).max(0) as usize;
    let dh = (y2 as i64 - y1 as i64).max(0) as usize;
    if dw.checked_mul(dh).map_or(true, |n| n > MAX_RESULT_PIXELS) {
        return Err(Error::invalid(format!("transformed size {dw}x{dh} is too large")));
    }
    log::debug!("transform: {w}x{h} -> {dw}x{dh} at ({x1}, {y1})");

    let mut buffer = PixelBuffer::filled(dw, dh, bytes, &options.background[..bytes])?;
    let inv = match m.invert() {
        Ok(inv) => inv,
        Err(e) => {
            log::warn!("transform: {e}; result left as background");
            return Ok(TransformResult {
                buffer,
                region: Region::new(dw as i32, dh as i32),
                offset_x: x1,
                offset_y: y1,
            });
        }
    };

    let sampler = Sampler {
        src: *src,
        coverage: coverage.as_region(),
        background: options.background,
    };
    let mut cov = vec![0u8; dw * dh];
    if dw > 0 && dh > 0 {
        buffer
            .as_region_mut()
            .par_rows_mut()
            .zip(cov.par_chunks_mut(dw))
            .enumerate()
            .for_each(|(y, (row, cov_row))| {
                let cy = (y1 as i64 + y as i64) as f64 + 0.5;
                for (x, (px, c)) in row.chunks_exact_mut(bytes).zip(cov_row.iter_mut()).enumerate() {
                    let cx = (x1 as i64 + x as i64) as f64 + 0.5;
                    let (u, v) = inv.transform_point(cx, cy);
                    *c = if options.interpolation {
                        sampler.bilinear(u, v, px)
                    } else {
                        sampler.nearest(u, v, px)
                    };
                }
            });
    }

    Ok(TransformResult {
        region: Region::from_coverage(dw as i32, dh as i32, &cov)?,
        buffer,
        offset_x: x1,
        offset_y: y1,
    })
}

// ============================================================================
// Tests
// ============================================================================
