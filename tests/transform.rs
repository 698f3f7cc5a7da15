mod common;

use paintcore::basics::{RectI, PI};
use paintcore::region::Region;
use paintcore::transform::{
    flip_region, transform_region, FlipAxis, TransformOp, TransformOptions,
};
use paintcore::{PixelBuffer, RegionGeometry};

use common::{gradient_rgb, init_logging, rotate90_reference, solid};

fn rotate(src: &PixelBuffer, mask: Option<&Region>, angle: f64) -> paintcore::transform::TransformResult {
    transform_region(
        &src.as_region(),
        mask,
        &TransformOp::Rotate { angle },
        &TransformOptions::default(),
    )
    .unwrap()
}

#[test]
fn test_quarter_turn_matches_reference() {
    init_logging();
    let src = gradient_rgb(7, 4);
    let r = rotate(&src, None, PI / 2.0);
    assert_eq!(r.buffer, rotate90_reference(&src));
    // Full source coverage comes through as full result coverage.
    for y in 0..7 {
        assert!(r.region.segments(y).iter().all(|s| s.value == 255));
        assert_eq!(r.region.row_coverage(y), vec![255; 4]);
    }
}

#[test]
fn test_half_turn_reverses_pixels() {
    let src = gradient_rgb(5, 3);
    let r = rotate(&src, None, PI);
    assert_eq!((r.buffer.width(), r.buffer.height()), (5, 3));
    assert_eq!((r.offset_x, r.offset_y), (0, 0));
    for y in 0..3 {
        for x in 0..5 {
            assert_eq!(r.buffer.pixel(x, y), src.pixel(4 - x, 2 - y));
        }
    }
}

#[test]
fn test_three_quarter_turn_undoes_quarter_turn() {
    let src = gradient_rgb(6, 9);
    let once = rotate(&src, None, PI / 2.0);
    let back = rotate(&once.buffer, None, 1.5 * PI);
    assert_eq!(back.buffer, src);
    let back = rotate(&once.buffer, None, -PI / 2.0);
    assert_eq!(back.buffer, src);
}

#[test]
fn test_near_right_angle_takes_exact_path() {
    let src = gradient_rgb(5, 3);
    let exact = rotate(&src, None, PI / 2.0);
    let near = rotate(&src, None, PI / 2.0 + 0.01);
    assert_eq!(near, exact);

    // Outside the tolerance the source is resampled into a larger box.
    let off = rotate(&src, None, PI / 2.0 + 0.02);
    assert!(off.buffer.width() > 3 && off.buffer.height() > 5);
}

#[test]
fn test_mask_travels_with_quarter_turn() {
    // Only the left column of the source is selected.
    let mask = Region::rect(5, 3, RectI::new(0, 0, 1, 3), 255);
    let src = gradient_rgb(5, 3);
    let r = rotate(&src, Some(&mask), PI / 2.0);
    // dest(x, y) = src(y, h - 1 - x), so source column 0 lands on row 0.
    assert_eq!(r.region.width(), 3);
    assert_eq!(r.region.height(), 5);
    for y in 0..5 {
        for x in 0..3 {
            assert_eq!(r.region.point_inside(x, y), y == 0, "({x}, {y})");
        }
    }
}

#[test]
fn test_flip_twice_is_identity() {
    let src = gradient_rgb(6, 4);
    let mask = Region::ellipse(6, 4, 1.5, 1.5, 1.5, 1.5);
    for axis in [FlipAxis::Horizontal, FlipAxis::Vertical] {
        let once = flip_region(&src.as_region(), Some(&mask), axis).unwrap();
        assert_ne!(once.buffer, src);
        let twice = flip_region(&once.buffer.as_region(), Some(&once.region), axis).unwrap();
        assert_eq!(twice.buffer, src);
        assert_eq!(twice.region, mask);
    }
}

#[test]
fn test_flip_moves_selection() {
    let mask = Region::rect(6, 4, RectI::new(0, 0, 2, 1), 255);
    let src = solid(6, 4, &[1]);
    let r = flip_region(&src.as_region(), Some(&mask), FlipAxis::Horizontal).unwrap();
    assert_eq!(r.region.find_bounds(), Some(RectI::new(4, 0, 6, 1)));
    let r = flip_region(&src.as_region(), Some(&mask), FlipAxis::Vertical).unwrap();
    assert_eq!(r.region.find_bounds(), Some(RectI::new(0, 3, 2, 4)));
}

#[test]
fn test_diagonal_rotation_of_solid_square() {
    let src = solid(20, 20, &[200, 100, 50]);
    let options = TransformOptions::default().with_background([7, 7, 7, 0]);
    let r = transform_region(&src.as_region(), None, &TransformOp::Rotate { angle: PI / 4.0 }, &options)
        .unwrap();
    // Half diagonal 10 * sqrt(2) around the pivot (10, 10).
    assert_eq!((r.offset_x, r.offset_y), (-5, -5));
    assert_eq!((r.buffer.width(), r.buffer.height()), (30, 30));

    // Interior samples interpolate between equal pixels; allow rounding.
    let centre = r.buffer.pixel(15, 15);
    assert!(centre.iter().zip([200u8, 100, 50]).all(|(&a, b)| a.abs_diff(b) <= 1), "{centre:?}");
    assert!(r.region.value_at(15, 15) >= 254);
    for (x, y) in [(0, 0), (29, 0), (0, 29), (29, 29)] {
        assert_eq!(r.buffer.pixel(x, y), &[7, 7, 7]);
        assert_eq!(r.region.value_at(x as i32, y as i32), 0);
    }
}

#[test]
fn test_scale_about_custom_center() {
    let src = gradient_rgb(4, 4);
    let options = TransformOptions::default()
        .with_interpolation(false)
        .with_center(0.0, 0.0);
    let r = transform_region(&src.as_region(), None, &TransformOp::Scale { x: 3.0, y: 3.0 }, &options)
        .unwrap();
    assert_eq!((r.offset_x, r.offset_y), (0, 0));
    assert_eq!((r.buffer.width(), r.buffer.height()), (12, 12));
    for y in 0..12 {
        for x in 0..12 {
            assert_eq!(r.buffer.pixel(x, y), src.pixel(x / 3, y / 3));
        }
    }
}
