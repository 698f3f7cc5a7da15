//! RGB <-> HSV conversion on packed 8-bit triples.
//!
//! Hue is stored in `0..=255` covering the full 0–360° circle (42.5 units per
//! 60° sector), saturation and value in `0..=255`. Intermediate math is done
//! in `f32` and results are truncated, never rounded, so the hue channel is
//! quantised to 256 steps. A saturated channel can therefore drift by a few
//! units after a round trip; grays and the three primaries convert back
//! exactly.

/// RGB component order: R=0, G=1, B=2
pub struct OrderRgb;
impl OrderRgb {
    pub const R: usize = 0;
    pub const G: usize = 1;
    pub const B: usize = 2;
    pub const N: usize = 3;
}

/// Hue units per 60° sector.
const HUE_PER_SECTOR: f32 = 42.5;

/// Convert an RGB triple to packed `(hue, saturation, value)`.
///
/// A zero saturation (any gray, including black) reports hue `0`.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let (red, green, blue) = (r as i32, g as i32, b as i32);
    let max = red.max(green).max(blue);
    let min = red.min(green).min(blue);

    let v = max;
    let s: f32 = if max != 0 {
        ((max - min) * 255) as f32 / max as f32
    } else {
        0.0
    };

    let mut h: f32 = 0.0;
    if s != 0.0 {
        let delta = (max - min) as f32;
        h = if red == max {
            (green - blue) as f32 / delta
        } else if green == max {
            2.0 + (blue - red) as f32 / delta
        } else {
            4.0 + (red - green) as f32 / delta
        };
        h *= HUE_PER_SECTOR;
        if h < 0.0 {
            h += 255.0;
        }
        if h > 255.0 {
            h -= 255.0;
        }
    }

    (h as u8, s as u8, v as u8)
}

/// Convert packed `(hue, saturation, value)` back to RGB.
///
/// With zero saturation every output channel equals `v`. A hue of `255`
/// lands exactly on the 360° seam and is treated as sector 0.
pub fn hsv_to_rgb(h: u8, s: u8, v: u8) -> (u8, u8, u8) {
    if s == 0 {
        return (v, v, v);
    }

    let hue = (h as f64 * 6.0 / 255.0) as f32;
    let saturation = s as f32 / 255.0;
    let value = v as f32 / 255.0;

    let sector = hue as i32;
    let f = hue - sector as f32;
    let p = value * (1.0 - saturation);
    let q = value * (1.0 - saturation * f);
    let t = value * (1.0 - saturation * (1.0 - f));

    let to_byte = |c: f32| (c * 255.0) as u8;
    let (r, g, b) = match sector % 6 {
        0 => (value, t, p),
        1 => (q, value, p),
        2 => (p, value, t),
        3 => (p, q, value),
        4 => (t, p, value),
        _ => (value, p, q),
    };
    (to_byte(r), to_byte(g), to_byte(b))
}

/// HSV triple of the first three channels of `px`.
#[inline]
pub(crate) fn pixel_to_hsv(px: &[u8]) -> [u8; 3] {
    let (h, s, v) = rgb_to_hsv(px[OrderRgb::R], px[OrderRgb::G], px[OrderRgb::B]);
    [h, s, v]
}

#[inline]
pub(crate) fn hsv_to_pixel(hsv: [u8; 3], out: &mut [u8]) {
    let (r, g, b) = hsv_to_rgb(hsv[0], hsv[1], hsv[2]);
    out[OrderRgb::R] = r;
    out[OrderRgb::G] = g;
    out[OrderRgb::B] = b;
}

// ============================================================================
// Tests
// ============================================================================
