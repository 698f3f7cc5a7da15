//! Pixel regions: row-oriented views over interleaved 8-bit pixel data.
//!
//! Three types share the same geometry (`w`, `h`, `bytes` per pixel and an
//! independent `rowstride`):
//!
//! - [`PixelRegion`]: read-only view. `Copy`, cheap to pass around and to
//!   share across worker threads.
//! - [`PixelRegionMut`]: mutable view, the destination of every operation.
//! - [`PixelBuffer`]: owned, tightly packed storage (`rowstride == w * bytes`),
//!   used for temporary results such as a transformed selection.
//!
//! A view starts at the top-left pixel of the rectangle it describes. Row `y`
//! occupies `data[y * rowstride .. y * rowstride + w * bytes]`; bytes between
//! the end of a row and the next stride belong to the owning buffer and are
//! never touched. Construction validates that all `h` rows fit inside the
//! slice, so row access afterwards is plain slice indexing.

use rayon::prelude::*;

use crate::basics::RectI;
use crate::error::{ensure_len, Error, Result};

/// Largest supported number of interleaved channels.
pub const MAX_CHANNELS: usize = 4;

/// Geometry shared by every pixel container.
pub trait RegionGeometry {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn bytes(&self) -> usize;
    fn rowstride(&self) -> usize;

    /// Number of meaningful bytes in one row.
    fn row_len(&self) -> usize {
        self.width() * self.bytes()
    }
}

/// Minimum slice length holding `h` rows of `row_len` bytes at `rowstride`.
#[inline]
pub(crate) fn required_len(rowstride: usize, row_len: usize, h: usize) -> usize {
    if h == 0 {
        0
    } else {
        (h - 1) * rowstride + row_len
    }
}

fn validate(len: usize, rowstride: usize, w: usize, h: usize, bytes: usize) -> Result<()> {
    if bytes == 0 || bytes > MAX_CHANNELS {
        return Err(Error::invalid(format!(
            "bytes per pixel must be 1..={MAX_CHANNELS}, got {bytes}"
        )));
    }
    let row_len = w * bytes;
    if h > 0 && rowstride < row_len {
        return Err(Error::invalid(format!(
            "rowstride {rowstride} is shorter than a row of {row_len} bytes"
        )));
    }
    ensure_len(required_len(rowstride, row_len, h), len)
}

fn sub_rect_offset<G: RegionGeometry>(g: &G, x: usize, y: usize, w: usize, h: usize) -> Result<usize> {
    if x + w > g.width() || y + h > g.height() {
        return Err(Error::invalid(format!(
            "sub-region {w}x{h}+{x}+{y} exceeds {}x{}",
            g.width(),
            g.height()
        )));
    }
    if w == 0 || h == 0 {
        return Ok(0);
    }
    Ok(y * g.rowstride() + x * g.bytes())
}

/// Fail with `InvalidArgument` unless both regions describe congruent
/// rectangles of the same pixel depth.
pub fn check_congruent<A, B>(a: &A, b: &B) -> Result<()>
where
    A: RegionGeometry + ?Sized,
    B: RegionGeometry + ?Sized,
{
    if a.width() != b.width() || a.height() != b.height() || a.bytes() != b.bytes() {
        return Err(Error::invalid(format!(
            "region shape mismatch: {}x{}x{} vs {}x{}x{}",
            a.width(),
            a.height(),
            a.bytes(),
            b.width(),
            b.height(),
            b.bytes()
        )));
    }
    Ok(())
}

/// Fail with `InvalidArgument` unless `mask` is a one-byte region with the
/// same width and height as `region`.
pub fn check_mask<A, M>(region: &A, mask: &M) -> Result<()>
where
    A: RegionGeometry + ?Sized,
    M: RegionGeometry + ?Sized,
{
    if mask.bytes() != 1 || mask.width() != region.width() || mask.height() != region.height() {
        return Err(Error::invalid(format!(
            "mask must be {}x{}x1, got {}x{}x{}",
            region.width(),
            region.height(),
            mask.width(),
            mask.height(),
            mask.bytes()
        )));
    }
    Ok(())
}

// ============================================================================
// PixelRegion
// ============================================================================

/// Read-only view over a rectangle of pixels.
#[derive(Debug, Clone, Copy)]
pub struct PixelRegion<'a> {
    data: &'a [u8],
    rowstride: usize,
    w: usize,
    h: usize,
    bytes: usize,
}

impl<'a> PixelRegion<'a> {
    /// Lay a `w` x `h` view with `bytes` channels over `data`.
    pub fn new(data: &'a [u8], rowstride: usize, w: usize, h: usize, bytes: usize) -> Result<Self> {
        validate(data.len(), rowstride, w, h, bytes)?;
        Ok(Self {
            data,
            rowstride,
            w,
            h,
            bytes,
        })
    }

    /// View over tightly packed rows (`rowstride == w * bytes`).
    pub fn packed(data: &'a [u8], w: usize, h: usize, bytes: usize) -> Result<Self> {
        Self::new(data, w * bytes, w, h, bytes)
    }

    /// The `row_len()` meaningful bytes of row `y`.
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: usize) -> &'a [u8] {
        assert!(y < self.h, "row {} out of bounds (height={})", y, self.h);
        let start = y * self.rowstride;
        &self.data[start..start + self.w * self.bytes]
    }

    /// Channels of the pixel at (x, y).
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &'a [u8] {
        let off = x * self.bytes;
        &self.row(y)[off..off + self.bytes]
    }

    /// Iterate all rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        (0..self.h).map(move |y| self.row(y))
    }

    /// View of the `w` x `h` rectangle whose top-left pixel is (x, y).
    pub fn sub_region(&self, x: usize, y: usize, w: usize, h: usize) -> Result<PixelRegion<'a>> {
        let off = sub_rect_offset(self, x, y, w, h)?;
        PixelRegion::new(&self.data[off..], self.rowstride, w, h, self.bytes)
    }

    /// Bounding rectangle in the view's own coordinates.
    pub fn rect(&self) -> RectI {
        RectI::new(0, 0, self.w as i32, self.h as i32)
    }
}

impl RegionGeometry for PixelRegion<'_> {
    fn width(&self) -> usize {
        self.w
    }
    fn height(&self) -> usize {
        self.h
    }
    fn bytes(&self) -> usize {
        self.bytes
    }
    fn rowstride(&self) -> usize {
        self.rowstride
    }
}

// ============================================================================
// PixelRegionMut
// ============================================================================

/// Mutable view over a rectangle of pixels.
#[derive(Debug)]
pub struct PixelRegionMut<'a> {
    data: &'a mut [u8],
    rowstride: usize,
    w: usize,
    h: usize,
    bytes: usize,
}

impl<'a> PixelRegionMut<'a> {
    pub fn new(
        data: &'a mut [u8],
        rowstride: usize,
        w: usize,
        h: usize,
        bytes: usize,
    ) -> Result<Self> {
        validate(data.len(), rowstride, w, h, bytes)?;
        Ok(Self {
            data,
            rowstride,
            w,
            h,
            bytes,
        })
    }

    pub fn packed(data: &'a mut [u8], w: usize, h: usize, bytes: usize) -> Result<Self> {
        Self::new(data, w * bytes, w, h, bytes)
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        assert!(y < self.h, "row {} out of bounds (height={})", y, self.h);
        let start = y * self.rowstride;
        &self.data[start..start + self.w * self.bytes]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        assert!(y < self.h, "row {} out of bounds (height={})", y, self.h);
        let start = y * self.rowstride;
        let len = self.w * self.bytes;
        &mut self.data[start..start + len]
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let off = x * self.bytes;
        let bytes = self.bytes;
        &self.row(y)[off..off + bytes]
    }

    #[inline]
    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [u8] {
        let off = x * self.bytes;
        let bytes = self.bytes;
        &mut self.row_mut(y)[off..off + bytes]
    }

    /// Reborrow as a read-only view.
    pub fn as_region(&self) -> PixelRegion<'_> {
        PixelRegion {
            data: &self.data[..],
            rowstride: self.rowstride,
            w: self.w,
            h: self.h,
            bytes: self.bytes,
        }
    }

    /// Mutable view of a sub-rectangle.
    pub fn sub_region_mut(
        &mut self,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
    ) -> Result<PixelRegionMut<'_>> {
        let off = sub_rect_offset(self, x, y, w, h)?;
        PixelRegionMut::new(&mut self.data[off..], self.rowstride, w, h, self.bytes)
    }

    /// Iterate rows mutably, top to bottom.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [u8]> + '_ {
        let len = self.w * self.bytes;
        let stride = self.rowstride.max(1);
        self.data
            .chunks_mut(stride)
            .take(self.h)
            .map(move |row| &mut row[..len])
    }

    /// Rows as a rayon parallel iterator. Each item is one row; rows never
    /// alias, so workers may write them concurrently.
    pub fn par_rows_mut(&mut self) -> impl IndexedParallelIterator<Item = &mut [u8]> + '_ {
        let len = self.w * self.bytes;
        let stride = self.rowstride.max(1);
        self.data
            .par_chunks_mut(stride)
            .take(self.h)
            .map(move |row| &mut row[..len])
    }

    /// Fill every pixel with `value` in every channel.
    pub fn clear(&mut self, value: u8) {
        for row in self.rows_mut() {
            row.fill(value);
        }
    }
}

impl RegionGeometry for PixelRegionMut<'_> {
    fn width(&self) -> usize {
        self.w
    }
    fn height(&self) -> usize {
        self.h
    }
    fn bytes(&self) -> usize {
        self.bytes
    }
    fn rowstride(&self) -> usize {
        self.rowstride
    }
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// Owned, tightly packed pixel storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    bytes: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Zero-filled buffer.
    pub fn new(width: usize, height: usize, bytes: usize) -> Result<Self> {
        validate(width * height * bytes, width * bytes, width, height, bytes)?;
        Ok(Self {
            width,
            height,
            bytes,
            data: vec![0; width * height * bytes],
        })
    }

    /// Buffer with every pixel set to `color` (first `bytes` entries used).
    pub fn filled(width: usize, height: usize, bytes: usize, color: &[u8]) -> Result<Self> {
        let mut buf = Self::new(width, height, bytes)?;
        ensure_len(bytes, color.len())?;
        for px in buf.data.chunks_exact_mut(bytes) {
            px.copy_from_slice(&color[..bytes]);
        }
        Ok(buf)
    }

    /// Wrap existing packed pixel data.
    pub fn from_vec(width: usize, height: usize, bytes: usize, data: Vec<u8>) -> Result<Self> {
        validate(data.len(), width * bytes, width, height, bytes)?;
        if data.len() != width * height * bytes {
            return Err(Error::invalid(format!(
                "expected {} bytes for {width}x{height}x{bytes}, got {}",
                width * height * bytes,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            bytes,
            data,
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let off = (y * self.width + x) * self.bytes;
        &self.data[off..off + self.bytes]
    }

    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [u8] {
        let off = (y * self.width + x) * self.bytes;
        &mut self.data[off..off + self.bytes]
    }

    /// Read-only view of the whole buffer.
    pub fn as_region(&self) -> PixelRegion<'_> {
        PixelRegion {
            data: &self.data,
            rowstride: self.width * self.bytes,
            w: self.width,
            h: self.height,
            bytes: self.bytes,
        }
    }

    /// Mutable view of the whole buffer.
    pub fn as_region_mut(&mut self) -> PixelRegionMut<'_> {
        PixelRegionMut {
            rowstride: self.width * self.bytes,
            w: self.width,
            h: self.height,
            bytes: self.bytes,
            data: &mut self.data,
        }
    }

    /// Read-only view of a sub-rectangle.
    pub fn region(&self, x: usize, y: usize, w: usize, h: usize) -> Result<PixelRegion<'_>> {
        self.as_region().sub_region(x, y, w, h)
    }

    /// Mutable view of a sub-rectangle.
    pub fn region_mut(
        &mut self,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
    ) -> Result<PixelRegionMut<'_>> {
        let off = sub_rect_offset(self, x, y, w, h)?;
        let stride = self.width * self.bytes;
        PixelRegionMut::new(&mut self.data[off..], stride, w, h, self.bytes)
    }
}

impl RegionGeometry for PixelBuffer {
    fn width(&self) -> usize {
        self.width
    }
    fn height(&self) -> usize {
        self.height
    }
    fn bytes(&self) -> usize {
        self.bytes
    }
    fn rowstride(&self) -> usize {
        self.width * self.bytes
    }
}

// ============================================================================
// Tests
// ============================================================================
