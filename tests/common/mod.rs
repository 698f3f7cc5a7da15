//! Synthetic buffers shared by the integration tests.

#![allow(dead_code)]

use paintcore::PixelBuffer;

/// Route `log` output through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `w` x `h` buffer with every pixel set to `color`.
pub fn solid(w: usize, h: usize, color: &[u8]) -> PixelBuffer {
    PixelBuffer::filled(w, h, color.len(), color).unwrap()
}

/// One-channel checkerboard alternating `a` and `b`, `a` at the origin.
pub fn checkerboard(w: usize, h: usize, a: u8, b: u8) -> PixelBuffer {
    let data = (0..h)
        .flat_map(|y| (0..w).map(move |x| if (x + y) % 2 == 0 { a } else { b }))
        .collect();
    PixelBuffer::from_vec(w, h, 1, data).unwrap()
}

/// RGB buffer where every pixel is distinct: (x, y, x ^ y) scaled.
pub fn gradient_rgb(w: usize, h: usize) -> PixelBuffer {
    let data = (0..h)
        .flat_map(|y| {
            (0..w).flat_map(move |x| {
                [
                    (x * 255 / w.max(1)) as u8,
                    (y * 255 / h.max(1)) as u8,
                    ((x ^ y) & 0xff) as u8,
                ]
            })
        })
        .collect();
    PixelBuffer::from_vec(w, h, 3, data).unwrap()
}

/// Reference 90° clockwise rotation: dest(x, y) = src(y, h - 1 - x).
pub fn rotate90_reference(src: &PixelBuffer) -> PixelBuffer {
    use paintcore::RegionGeometry;
    let (w, h, b) = (src.width(), src.height(), src.bytes());
    let mut out = PixelBuffer::new(h, w, b).unwrap();
    for y in 0..w {
        for x in 0..h {
            out.pixel_mut(x, y).copy_from_slice(src.pixel(y, h - 1 - x));
        }
    }
    out
}
