//! Stencils: pixel operations masked by a selection region.
//!
//! Where the row primitives take a parallel mask array, a stencil walks the
//! run-length segments of a [`Region`] and applies its operation only to the
//! covered spans. The strength at each pixel is the segment coverage scaled
//! by the stencil [`Opacity`].
//!
//! Sources play fixed roles: `src1` is the paint, `src2` the underlying
//! layer. When `src2` is absent the destination's current pixels serve as
//! the underlying layer, so the common "paint onto the canvas in place" call
//! needs only `src1` and `dest`.

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::paint_mode::{apply_paint_mode, PaintMode};
use crate::pixel_ops;
use crate::pixel_region::{check_congruent, PixelRegion, PixelRegionMut, RegionGeometry};
use crate::region::Region;

// ============================================================================
// Opacity
// ============================================================================

/// Stencil strength in `[0, 1]`.
///
/// Interactive sliders report opacity as an integer in `[0, 1000]` while the
/// engine works with fractions; both constructors clamp into range.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Opacity(f64);

impl Opacity {
    pub const OPAQUE: Opacity = Opacity(1.0);
    pub const TRANSPARENT: Opacity = Opacity(0.0);

    /// Opacity from a fraction; NaN counts as transparent.
    pub fn from_fraction(v: f64) -> Self {
        if v.is_nan() {
            return Self::TRANSPARENT;
        }
        Opacity(v.clamp(0.0, 1.0))
    }

    /// Opacity from a slider value in thousandths.
    pub fn from_permille(v: u32) -> Self {
        Opacity(v.min(1000) as f64 / 1000.0)
    }

    pub fn fraction(self) -> f64 {
        self.0
    }

    pub fn permille(self) -> u32 {
        (self.0 * 1000.0).round() as u32
    }

    /// `coverage * opacity`, truncated.
    #[inline]
    pub fn scale(self, coverage: u8) -> u8 {
        (coverage as f64 * self.0) as u8
    }
}

impl Default for Opacity {
    fn default() -> Self {
        Self::OPAQUE
    }
}

// ============================================================================
// Stencil operations
// ============================================================================

/// Operation applied under a stencil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StencilOp {
    /// Copy `src1` verbatim onto every pixel with nonzero strength.
    Copy,
    /// Blend `src1` over the underlying layer by the stencil strength.
    Blend,
    /// Blend the underlying layer toward a constant color.
    Shade([u8; 4]),
    /// Combine `src1` with the underlying layer under a paint mode, then
    /// blend the result over the underlying layer by the stencil strength.
    Paint(PaintMode),
}

impl StencilOp {
    fn needs_paint(self) -> bool {
        !matches!(self, StencilOp::Shade(_))
    }
}

/// Apply `op` to `dest` wherever `region` has coverage.
///
/// Destination pixel (x, y) is governed by region pixel
/// (`x + offset.0`, `y + offset.1`). `src1` (the paint) is required for
/// every op except [`StencilOp::Shade`]; `src2` (the underlying layer)
/// defaults to `dest` itself. All given sources must be congruent with
/// `dest`.
pub fn apply_stencil(
    region: &Region,
    offset: (i32, i32),
    opacity: Opacity,
    op: StencilOp,
    src1: Option<&PixelRegion<'_>>,
    src2: Option<&PixelRegion<'_>>,
    dest: &mut PixelRegionMut<'_>,
) -> Result<()> {
    if op.needs_paint() && src1.is_none() {
        return Err(Error::invalid(format!("stencil {op:?} needs a paint source")));
    }
    for src in [src1, src2].into_iter().flatten() {
        check_congruent(src, &*dest)?;
    }
    if opacity.fraction() <= 0.0 {
        return Ok(());
    }

    let (w, bytes) = (dest.width(), dest.bytes());
    let (off_x, off_y) = offset;
    let src1 = src1.copied();
    let src2 = src2.copied();

    dest.par_rows_mut().enumerate().try_for_each_init(
        || (Vec::new(), Vec::new()),
        |(base_buf, paint_buf), (y, row)| -> Result<()> {
            for seg in region.segments(y as i32 + off_y) {
                let alpha = opacity.scale(seg.value);
                if alpha == 0 {
                    continue;
                }
                let x1 = (seg.start - off_x).clamp(0, w as i32) as usize;
                let x2 = (seg.end - off_x).clamp(0, w as i32) as usize;
                if x1 >= x2 {
                    continue;
                }
                let (a, b) = (x1 * bytes, x2 * bytes);
                let n = x2 - x1;
                let out = &mut row[a..b];

                let base: &[u8] = match src2 {
                    Some(s) => &s.row(y)[a..b],
                    None => {
                        base_buf.clear();
                        base_buf.extend_from_slice(out);
                        base_buf
                    }
                };
                let paint = src1.map(|s| &s.row(y)[a..b]);

                match (op, paint) {
                    (StencilOp::Copy, Some(p)) => pixel_ops::copy_pixels(p, out, n, bytes)?,
                    (StencilOp::Blend, Some(p)) => {
                        pixel_ops::blend_pixels(p, base, out, alpha, n, bytes)?
                    }
                    (StencilOp::Shade(color), _) => {
                        pixel_ops::shade_pixels(base, out, &color, alpha, n, bytes)?
                    }
                    (StencilOp::Paint(mode), Some(p)) => {
                        paint_buf.resize(b - a, 0);
                        apply_paint_mode(p, base, paint_buf, n, bytes, mode)?;
                        pixel_ops::blend_pixels(paint_buf, base, out, alpha, n, bytes)?
                    }
                    (_, None) => {
                        return Err(Error::invalid(format!("stencil {op:?} needs a paint source")))
                    }
                }
            }
            Ok(())
        },
    )
}

// ============================================================================
// Tests
// ============================================================================
