//! Paint modes: how freshly painted pixels combine with what lies beneath.
//!
//! `src1` is always the paint (the incoming pixels) and `src2` the
//! underlying layer. Modes that only make sense on RGB data (the single
//! channel and HSV component modes) copy `src1` through for other depths.

use crate::error::Result;
use crate::pixel_ops;

/// Compositing rule applied by [`apply_paint_mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PaintMode {
    /// The paint replaces the underlying pixel.
    #[default]
    Normal,
    DarkenOnly,
    LightenOnly,
    RedOnly,
    GreenOnly,
    BlueOnly,
    HueOnly,
    SaturationOnly,
    ValueOnly,
    Multiply,
    Screen,
    Difference,
    Addition,
    /// Underlying minus paint, clamped at zero.
    Subtract,
}

impl PaintMode {
    /// Every mode, in declaration order.
    pub const ALL: [PaintMode; 14] = [
        PaintMode::Normal,
        PaintMode::DarkenOnly,
        PaintMode::LightenOnly,
        PaintMode::RedOnly,
        PaintMode::GreenOnly,
        PaintMode::BlueOnly,
        PaintMode::HueOnly,
        PaintMode::SaturationOnly,
        PaintMode::ValueOnly,
        PaintMode::Multiply,
        PaintMode::Screen,
        PaintMode::Difference,
        PaintMode::Addition,
        PaintMode::Subtract,
    ];

    /// `true` for modes whose result ignores the underlying pixel.
    pub fn is_opaque(self) -> bool {
        matches!(self, PaintMode::Normal)
    }

    /// `true` for modes that need 3-byte RGB pixels to act as described.
    pub fn requires_rgb(self) -> bool {
        matches!(
            self,
            PaintMode::RedOnly
                | PaintMode::GreenOnly
                | PaintMode::BlueOnly
                | PaintMode::HueOnly
                | PaintMode::SaturationOnly
                | PaintMode::ValueOnly
        )
    }
}

/// Combine `length` pixels of paint (`src1`) with the underlying pixels
/// (`src2`) into `dest` according to `mode`.
pub fn apply_paint_mode(
    src1: &[u8],
    src2: &[u8],
    dest: &mut [u8],
    length: usize,
    bytes: usize,
    mode: PaintMode,
) -> Result<()> {
    use pixel_ops::*;
    match mode {
        PaintMode::Normal => copy_pixels(src1, dest, length, bytes),
        PaintMode::DarkenOnly => darken_pixels(src1, src2, dest, length, bytes),
        PaintMode::LightenOnly => lighten_pixels(src1, src2, dest, length, bytes),
        PaintMode::RedOnly => red_only_pixels(src1, src2, dest, length, bytes),
        PaintMode::GreenOnly => green_only_pixels(src1, src2, dest, length, bytes),
        PaintMode::BlueOnly => blue_only_pixels(src1, src2, dest, length, bytes),
        PaintMode::HueOnly => hue_only_pixels(src1, src2, dest, length, bytes),
        PaintMode::SaturationOnly => saturation_only_pixels(src1, src2, dest, length, bytes),
        PaintMode::ValueOnly => value_only_pixels(src1, src2, dest, length, bytes),
        PaintMode::Multiply => multiply_pixels(src1, src2, dest, length, bytes),
        PaintMode::Screen => screen_pixels(src1, src2, dest, length, bytes),
        PaintMode::Difference => difference_pixels(src1, src2, dest, length, bytes),
        PaintMode::Addition => add_pixels(src1, src2, dest, length, bytes),
        PaintMode::Subtract => subtract_pixels(src2, src1, dest, length, bytes),
    }
}

// ============================================================================
// Tests
// ============================================================================
