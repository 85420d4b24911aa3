use super::*;

use image::Rgba;

fn solid(w: u32, h: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba(color))
}

fn whole(img: &RgbaImage) -> Rect {
    Rect::new(0.0, 0.0, img.width() as f64, img.height() as f64)
}

#[test]
fn every_qualifying_pixel_is_counted_once() {
    let mut img = solid(37, 11, [255, 255, 255, 255]);
    let bounds = whole(&img);
    let count = mask_pixels(&mut img, &MaskParams::white_to_transparent(), bounds, 0);
    assert_eq!(count, 37 * 11);
    assert!(img.pixels().all(|p| p.0 == [255, 255, 255, 0]));
}

#[test]
fn only_specified_channels_are_written() {
    let mut img = solid(4, 4, [200, 210, 220, 128]);
    let params = MaskParams {
        threshold: [100, 100, 100],
        replace: [Some(0), Some(0), Some(255), None],
        overflow: false,
    };
    let bounds = whole(&img);
    assert_eq!(mask_pixels(&mut img, &params, bounds, 0), 16);
    assert!(img.pixels().all(|p| p.0 == [0, 0, 255, 128]));
}

#[test]
fn threshold_is_inclusive_per_channel() {
    let mut img = solid(2, 1, [255, 255, 255, 255]);
    img.put_pixel(1, 0, Rgba([254, 255, 255, 255]));
    let bounds = whole(&img);
    assert_eq!(mask_pixels(&mut img, &MaskParams::white_to_transparent(), bounds, 0), 1);
    assert_eq!(img.get_pixel(0, 0).0[3], 0);
    assert_eq!(img.get_pixel(1, 0).0, [254, 255, 255, 255]);
}

#[test]
fn without_overflow_outside_pixels_are_left_alone() {
    let mut img = solid(10, 10, [0, 0, 0, 255]);
    let params = MaskParams { overflow: false, ..MaskParams::white_to_transparent() };
    assert_eq!(mask_pixels(&mut img, &params, Rect::new(2.0, 2.0, 4.0, 4.0), 1), 0);
    assert!(img.pixels().all(|p| p.0 == [0, 0, 0, 255]));
}

#[test]
fn overflow_clears_outside_bounds_and_edge_guard() {
    let mut img = solid(10, 10, [0, 0, 0, 255]);
    let params = MaskParams { overflow: true, ..MaskParams::white_to_transparent() };

    // Kept region shrinks to x, y in [2, 5) with a one pixel guard.
    assert_eq!(mask_pixels(&mut img, &params, Rect::new(2.0, 2.0, 4.0, 4.0), 1), 100 - 9);
    assert_eq!(img.get_pixel(2, 2).0[3], 255);
    assert_eq!(img.get_pixel(4, 4).0[3], 255);
    assert_eq!(img.get_pixel(5, 5).0[3], 0);
    assert_eq!(img.get_pixel(5, 3).0[3], 0);
    assert_eq!(img.get_pixel(1, 3).0[3], 0);
}

#[test]
fn overflow_without_guard_keeps_full_bounds() {
    let mut img = solid(10, 10, [0, 0, 0, 255]);
    let params = MaskParams { overflow: true, ..MaskParams::white_to_transparent() };
    assert_eq!(mask_pixels(&mut img, &params, Rect::new(2.0, 2.0, 4.0, 4.0), 0), 100 - 16);
    assert_eq!(img.get_pixel(5, 5).0[3], 255);
}

#[test]
fn empty_image_masks_nothing() {
    let mut img = RgbaImage::new(0, 0);
    assert_eq!(mask_pixels(&mut img, &MaskParams::default(), Rect::new(0.0, 0.0, 1.0, 1.0), 1), 0);
}
