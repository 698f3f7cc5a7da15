//! Foundation types and small numeric helpers.
//!
//! Rectangles here are half-open: `x2`/`y2` sit one past the last covered
//! pixel, so a rectangle with `x1 == x2` is empty.

use core::ops::Sub;

// ============================================================================
// Rounding and conversion functions
// ============================================================================

/// Floor of a double as a signed integer. Values beyond the `i32` range
/// saturate and NaN maps to zero.
#[inline]
pub fn ifloor(v: f64) -> i32 {
    v.floor() as i32
}

/// Clamp a signed intermediate into the byte range.
#[inline]
pub fn clamp_u8(v: i64) -> u8 {
    v.clamp(0, 255) as u8
}

// ============================================================================
// Mathematical constants
// ============================================================================

pub const PI: f64 = std::f64::consts::PI;

// ============================================================================
// Rect
// ============================================================================

/// A half-open rectangle `[x1, x2) x [y1, y2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect<T: Copy> {
    pub x1: T,
    pub y1: T,
    pub x2: T,
    pub y2: T,
}

impl<T: Copy + PartialOrd> Rect<T> {
    pub fn new(x1: T, y1: T, x2: T, y2: T) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// The same rectangle with its corners ordered so `x1 <= x2`, `y1 <= y2`.
    pub fn normalized(self) -> Self {
        Self {
            x1: lesser(self.x1, self.x2),
            y1: lesser(self.y1, self.y2),
            x2: greater(self.x1, self.x2),
            y2: greater(self.y1, self.y2),
        }
    }

    /// `true` when the rectangle covers no pixel.
    pub fn is_empty(&self) -> bool {
        self.x1 >= self.x2 || self.y1 >= self.y2
    }

    /// `true` if the pixel at (x, y) lies inside.
    pub fn contains(&self, x: T, y: T) -> bool {
        x >= self.x1 && x < self.x2 && y >= self.y1 && y < self.y2
    }
}

impl<T: Copy + PartialOrd + Sub<Output = T>> Rect<T> {
    pub fn width(&self) -> T {
        self.x2 - self.x1
    }

    pub fn height(&self) -> T {
        self.y2 - self.y1
    }
}

/// Smallest rectangle holding both `a` and `b`.
pub fn unite_rectangles<T: Copy + PartialOrd>(a: &Rect<T>, b: &Rect<T>) -> Rect<T> {
    Rect {
        x1: lesser(a.x1, b.x1),
        y1: lesser(a.y1, b.y1),
        x2: greater(a.x2, b.x2),
        y2: greater(a.y2, b.y2),
    }
}

// `min`/`max` for coordinate types that are only `PartialOrd`.
#[inline]
fn lesser<T: PartialOrd>(a: T, b: T) -> T {
    if b < a { b } else { a }
}

#[inline]
fn greater<T: PartialOrd>(a: T, b: T) -> T {
    if b > a { b } else { a }
}

/// Rectangle with `i32` coordinates.
pub type RectI = Rect<i32>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ifloor() {
        assert_eq!(ifloor(1.5), 1);
        assert_eq!(ifloor(-1.5), -2);
        assert_eq!(ifloor(-0.25), -1);
        assert_eq!(ifloor(3.0), 3);
        assert_eq!(ifloor(-3.0), -3);
    }

    #[test]
    fn test_ifloor_saturates_out_of_range() {
        assert_eq!(ifloor(-1e12), i32::MIN);
        assert_eq!(ifloor(1e12), i32::MAX);
        assert_eq!(ifloor(-2147483648.5), i32::MIN);
        assert_eq!(ifloor(f64::NAN), 0);
    }

    #[test]
    fn test_clamp_u8() {
        assert_eq!(clamp_u8(-7), 0);
        assert_eq!(clamp_u8(128), 128);
        assert_eq!(clamp_u8(300), 255);
        assert_eq!(clamp_u8(i64::MIN), 0);
    }

    #[test]
    fn test_rect_half_open() {
        let r = RectI::new(2, 3, 5, 7);
        assert_eq!(r.width(), 3);
        assert_eq!(r.height(), 4);
        assert!(r.contains(2, 3));
        assert!(r.contains(4, 6));
        assert!(!r.contains(5, 6));
        assert!(!r.contains(4, 7));
        assert!(!r.is_empty());
        assert!(RectI::new(4, 4, 4, 9).is_empty());
    }

    #[test]
    fn test_rect_normalized() {
        let r = RectI::new(30, 40, 10, 20).normalized();
        assert_eq!(r, RectI::new(10, 20, 30, 40));
        // Already ordered on one axis.
        assert_eq!(RectI::new(1, 9, 4, 2).normalized(), RectI::new(1, 2, 4, 9));
    }

    #[test]
    fn test_unite_rectangles() {
        let r = unite_rectangles(&RectI::new(10, 20, 30, 40), &RectI::new(50, 60, 70, 80));
        assert_eq!(r, RectI::new(10, 20, 70, 80));
        // Overlapping, with `b` extending only to the left and below.
        let r = unite_rectangles(&RectI::new(5, 0, 9, 4), &RectI::new(2, 1, 6, 8));
        assert_eq!(r, RectI::new(2, 0, 9, 8));
    }
}
