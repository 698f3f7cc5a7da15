//! Selection regions stored as per-scanline coverage segments.
//!
//! A [`Region`] covers a `width` x `height` canvas. Each scanline holds a
//! list of [`Segment`]s sorted by `start` and pairwise non-overlapping; a
//! pixel's coverage is the value of the segment containing it, 0 when none
//! does. Segments with value 0 are never stored.
//!
//! Boolean combination flattens both rows into coverage arrays, combines
//! them pixel by pixel and re-emits runs of equal coverage.

use crate::basics::RectI;
use crate::error::{Error, Result};

/// Half-open interval `[start, end)` on one scanline with a coverage value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
    pub start: i32,
    pub end: i32,
    pub value: u8,
}

impl Segment {
    pub fn new(start: i32, end: i32, value: u8) -> Self {
        Self { start, end, value }
    }

    #[inline]
    pub fn len(&self) -> i32 {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    #[inline]
    pub fn contains(&self, x: i32) -> bool {
        x >= self.start && x < self.end
    }
}

/// Boolean operation for [`Region::combine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CombineOp {
    /// Union; overlapping coverage takes the maximum.
    Add,
    /// Remove the operand: `a * (255 - b) / 255`.
    Sub,
    /// Overlap only; coverage takes the minimum.
    Intersect,
}

impl CombineOp {
    #[inline]
    fn apply(self, a: u8, b: u8) -> u8 {
        match self {
            CombineOp::Add => a.max(b),
            CombineOp::Sub => (a as u32 * (255 - b as u32) / 255) as u8,
            CombineOp::Intersect => a.min(b),
        }
    }
}

/// Selection mask over a `width` x `height` canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    width: i32,
    height: i32,
    rows: Vec<Vec<Segment>>,
}

/// Append runs of equal nonzero coverage in `cov` (starting at column 0).
fn emit_runs(cov: &[u8], out: &mut Vec<Segment>) {
    let mut x = 0;
    while x < cov.len() {
        let v = cov[x];
        let start = x;
        while x < cov.len() && cov[x] == v {
            x += 1;
        }
        if v != 0 {
            out.push(Segment::new(start as i32, x as i32, v));
        }
    }
}

impl Region {
    /// Empty region. Negative dimensions are treated as zero.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            rows: vec![Vec::new(); height as usize],
        }
    }

    /// Region covering `rect` (clipped to the canvas) with coverage `value`.
    pub fn rect(width: i32, height: i32, rect: RectI, value: u8) -> Self {
        let mut region = Self::new(width, height);
        let r = rect.normalized();
        let x1 = r.x1.max(0);
        let x2 = r.x2.min(region.width);
        if value == 0 || x1 >= x2 {
            return region;
        }
        for y in r.y1.max(0)..r.y2.min(region.height) {
            region.rows[y as usize].push(Segment::new(x1, x2, value));
        }
        region
    }

    /// Hard-edged ellipse centred on (`cx`, `cy`) with radii `rx`, `ry`.
    ///
    /// A pixel is inside when its centre is.
    pub fn ellipse(width: i32, height: i32, cx: f64, cy: f64, rx: f64, ry: f64) -> Self {
        let mut region = Self::new(width, height);
        if rx <= 0.0 || ry <= 0.0 {
            return region;
        }
        for y in 0..region.height {
            let dy = (y as f64 + 0.5 - cy) / ry;
            if dy.abs() >= 1.0 {
                continue;
            }
            let half = rx * (1.0 - dy * dy).sqrt();
            // Pixel x is inside when x + 0.5 lies in (cx - half, cx + half).
            let x1 = ((cx - half - 0.5).floor() as i32 + 1).max(0);
            let x2 = ((cx + half - 0.5).ceil() as i32).min(region.width);
            if x1 < x2 {
                region.rows[y as usize].push(Segment::new(x1, x2, 255));
            }
        }
        region
    }

    /// Scan-convert a closed polygon with the even-odd rule.
    ///
    /// Each scanline is sampled through pixel centres. A scanline that yields
    /// an odd number of crossings is logged and its unmatched rightmost
    /// crossing dropped.
    pub fn from_polygon(width: i32, height: i32, points: &[(f64, f64)]) -> Self {
        let mut region = Self::new(width, height);
        if points.len() < 3 {
            return region;
        }
        let mut crossings: Vec<f64> = Vec::with_capacity(points.len());
        for y in 0..region.height {
            let sy = y as f64 + 0.5;
            crossings.clear();
            for (i, &(x0, y0)) in points.iter().enumerate() {
                let (x1, y1) = points[(i + 1) % points.len()];
                if y0 == y1 {
                    continue;
                }
                let (lo, hi) = if y0 < y1 { (y0, y1) } else { (y1, y0) };
                if sy >= lo && sy < hi {
                    crossings.push(x0 + (sy - y0) * (x1 - x0) / (y1 - y0));
                }
            }
            if crossings.is_empty() {
                continue;
            }
            crossings.sort_by(f64::total_cmp);
            if crossings.len() % 2 != 0 {
                log::warn!(
                    "polygon scan conversion: {} crossings on scanline {y}, skipping the rightmost",
                    crossings.len()
                );
                crossings.pop();
            }

            let row = &mut region.rows[y as usize];
            for pair in crossings.chunks_exact(2) {
                let start = (pair[0].round() as i32).max(0);
                let end = (pair[1].round() as i32).min(region.width);
                if start >= end {
                    continue;
                }
                match row.last_mut() {
                    Some(last) if last.end >= start => last.end = last.end.max(end),
                    _ => row.push(Segment::new(start, end, 255)),
                }
            }
        }
        region
    }

    /// Build a region from a packed `width * height` coverage map.
    pub fn from_coverage(width: i32, height: i32, coverage: &[u8]) -> Result<Self> {
        let mut region = Self::new(width, height);
        let w = region.width as usize;
        let needed = w * region.height as usize;
        if coverage.len() != needed {
            return Err(Error::invalid(format!(
                "coverage map for {width}x{height} needs {needed} bytes, got {}",
                coverage.len()
            )));
        }
        if w > 0 {
            for (row, cov) in region.rows.iter_mut().zip(coverage.chunks_exact(w)) {
                emit_runs(cov, row);
            }
        }
        Ok(region)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Segments of scanline `y`; empty outside the canvas.
    pub fn segments(&self, y: i32) -> &[Segment] {
        if y < 0 || y >= self.height {
            return &[];
        }
        &self.rows[y as usize]
    }

    /// Write the coverage of scanline `y` into `out[..width]`; zero outside
    /// the canvas.
    pub fn fill_row_coverage(&self, y: i32, out: &mut [u8]) {
        let w = (self.width as usize).min(out.len());
        out[..w].fill(0);
        for seg in self.segments(y) {
            let end = (seg.end as usize).min(w);
            let start = (seg.start as usize).min(end);
            out[start..end].fill(seg.value);
        }
    }

    /// Coverage of scanline `y` as a fresh `width`-byte vector.
    pub fn row_coverage(&self, y: i32) -> Vec<u8> {
        let mut out = vec![0u8; self.width as usize];
        self.fill_row_coverage(y, &mut out);
        out
    }

    /// Insert a segment on row `y`, clipped to the canvas.
    ///
    /// Zero-valued or empty segments are ignored. Overlapping an existing
    /// segment on the row is an error; callers merge first.
    pub fn add_segment(&mut self, y: i32, start: i32, end: i32, value: u8) -> Result<()> {
        if y < 0 || y >= self.height {
            return Err(Error::invalid(format!(
                "scanline {y} outside region of height {}",
                self.height
            )));
        }
        let start = start.max(0);
        let end = end.min(self.width);
        if value == 0 || start >= end {
            return Ok(());
        }
        let row = &mut self.rows[y as usize];
        let pos = row.partition_point(|s| s.start < start);
        let overlaps_prev = pos > 0 && row[pos - 1].end > start;
        let overlaps_next = pos < row.len() && row[pos].start < end;
        if overlaps_prev || overlaps_next {
            return Err(Error::invalid(format!(
                "segment [{start}, {end}) overlaps an existing segment on scanline {y}"
            )));
        }
        row.insert(pos, Segment::new(start, end, value));
        Ok(())
    }

    /// Combine with `other` shifted by (`dx`, `dy`), producing a new region
    /// with this region's dimensions.
    pub fn combine(&self, other: &Region, op: CombineOp, dx: i32, dy: i32) -> Region {
        let mut result = Region::new(self.width, self.height);
        let w = self.width as usize;
        let mut a = vec![0u8; w];
        let mut b = vec![0u8; w];
        for y in 0..self.height {
            let mine = self.segments(y);
            let theirs = other.segments(y - dy);
            if theirs.is_empty() {
                if op == CombineOp::Intersect {
                    continue;
                }
                result.rows[y as usize] = mine.to_vec();
                continue;
            }
            if mine.is_empty() && op != CombineOp::Add {
                continue;
            }
            self.fill_row_coverage(y, &mut a);
            b.fill(0);
            for seg in theirs {
                let start = (seg.start + dx).clamp(0, self.width) as usize;
                let end = (seg.end + dx).clamp(0, self.width) as usize;
                b[start..end].fill(seg.value);
            }
            for (ca, &cb) in a.iter_mut().zip(&b) {
                *ca = op.apply(*ca, cb);
            }
            emit_runs(&a, &mut result.rows[y as usize]);
        }
        result
    }

    /// Smallest rectangle holding every covered pixel, `None` when empty.
    pub fn find_bounds(&self) -> Option<RectI> {
        let mut bounds: Option<RectI> = None;
        for (y, row) in self.rows.iter().enumerate() {
            let (Some(first), Some(last)) = (row.first(), row.last()) else {
                continue;
            };
            let y = y as i32;
            bounds = Some(match bounds {
                None => RectI::new(first.start, y, last.end, y + 1),
                Some(b) => RectI::new(b.x1.min(first.start), b.y1, b.x2.max(last.end), y + 1),
            });
        }
        bounds
    }

    /// Coverage of pixel (x, y), 0 outside the region.
    pub fn value_at(&self, x: i32, y: i32) -> u8 {
        let row = self.segments(y);
        let i = row.partition_point(|s| s.end <= x);
        match row.get(i) {
            Some(seg) if seg.contains(x) => seg.value,
            _ => 0,
        }
    }

    /// `true` when pixel (x, y) has nonzero coverage.
    pub fn point_inside(&self, x: i32, y: i32) -> bool {
        self.value_at(x, y) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }

    /// Complement over the whole canvas: coverage becomes `255 - coverage`.
    pub fn invert(&self) -> Region {
        let mut result = Region::new(self.width, self.height);
        let mut cov = vec![0u8; self.width as usize];
        for y in 0..self.height {
            self.fill_row_coverage(y, &mut cov);
            for c in cov.iter_mut() {
                *c = 255 - *c;
            }
            emit_runs(&cov, &mut result.rows[y as usize]);
        }
        result
    }

    /// Same region shifted by (`dx`, `dy`) and clipped to the canvas.
    pub fn translate(&self, dx: i32, dy: i32) -> Region {
        let mut result = Region::new(self.width, self.height);
        for y in 0..self.height {
            let row = &mut result.rows[y as usize];
            for seg in self.segments(y - dy) {
                let start = (seg.start + dx).max(0);
                let end = (seg.end + dx).min(self.width);
                if start < end {
                    row.push(Segment::new(start, end, seg.value));
                }
            }
        }
        result
    }

    /// Iterate `(y, segments)` over every scanline.
    pub fn rows(&self) -> impl Iterator<Item = (i32, &[Segment])> + '_ {
        self.rows
            .iter()
            .enumerate()
            .map(|(y, row)| (y as i32, row.as_slice()))
    }
}

// ============================================================================
// Tests
// ============================================================================
