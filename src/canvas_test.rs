use super::*;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

fn surface(w: u32, h: u32) -> RasterSurface {
    RasterSurface::new(w, h, FontBook::new())
}

fn solid(w: u32, h: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba(color))
}

fn px(s: &RasterSurface, x: u32, y: u32) -> [u8; 4] {
    s.pixels().get_pixel(x, y).0
}

// ============================================================================
// Blend modes
// ============================================================================

#[test]
fn source_over_opaque_replaces_base() {
    assert_eq!(BlendMode::SourceOver.blend_pixel(BLUE, RED), RED);
}

#[test]
fn transparent_top_keeps_base() {
    for &mode in BlendMode::all() {
        if matches!(mode, BlendMode::Copy) {
            continue;
        }
        assert_eq!(mode.blend_pixel(BLUE, CLEAR), BLUE, "{}", mode.name());
    }
}

#[test]
fn half_alpha_over_transparent_keeps_color() {
    let out = BlendMode::SourceOver.blend_pixel(CLEAR, [255, 0, 0, 128]);
    assert_eq!(out, [255, 0, 0, 128]);
}

#[test]
fn multiply_with_white_is_identity() {
    let base = [120, 60, 30, 255];
    assert_eq!(BlendMode::Multiply.blend_pixel(base, [255, 255, 255, 255]), base);
}

#[test]
fn destination_out_erases_base() {
    assert_eq!(BlendMode::DestinationOut.blend_pixel(BLUE, RED)[3], 0);
}

#[test]
fn copy_ignores_base() {
    assert_eq!(BlendMode::Copy.blend_pixel(BLUE, CLEAR), CLEAR);
}

#[test]
fn mode_names_round_trip() {
    for &mode in BlendMode::all() {
        assert_eq!(BlendMode::from_name(mode.name()), Some(mode));
    }
    assert_eq!(BlendMode::from_name("nonsense"), None);
}

// ============================================================================
// RasterSurface
// ============================================================================

#[test]
fn draw_bitmap_fills_exactly_the_destination() {
    let mut s = surface(10, 10);
    s.draw_bitmap(&solid(4, 4, RED), Rect::new(2.0, 2.0, 4.0, 4.0));
    assert_eq!(px(&s, 2, 2), RED);
    assert_eq!(px(&s, 5, 5), RED);
    assert_eq!(px(&s, 1, 1), CLEAR);
    assert_eq!(px(&s, 6, 6), CLEAR);
}

#[test]
fn draw_bitmap_scales_to_destination() {
    let mut s = surface(8, 8);
    s.draw_bitmap(&solid(1, 1, BLUE), Rect::new(0.0, 0.0, 8.0, 8.0));
    assert!(s.pixels().pixels().all(|p| p.0 == BLUE));
}

#[test]
fn half_turn_mirrors_bitmap() {
    let mut bitmap = solid(4, 1, RED);
    bitmap.put_pixel(2, 0, Rgba(BLUE));
    bitmap.put_pixel(3, 0, Rgba(BLUE));

    let mut s = surface(6, 1);
    s.set_transform(Transform::rotation_about(Point::new(3.0, 0.5), 180.0));
    s.draw_bitmap(&bitmap, Rect::new(1.0, 0.0, 4.0, 1.0));
    assert_eq!(px(&s, 1, 0), BLUE);
    assert_eq!(px(&s, 4, 0), RED);
    assert_eq!(px(&s, 0, 0), CLEAR);
}

#[test]
fn clear_rect_only_touches_region() {
    let mut s = surface(4, 4);
    s.draw_bitmap(&solid(4, 4, RED), Rect::new(0.0, 0.0, 4.0, 4.0));
    s.clear_rect(Rect::new(0.0, 0.0, 2.0, 4.0));
    assert_eq!(px(&s, 1, 3), CLEAR);
    assert_eq!(px(&s, 2, 0), RED);
    s.clear();
    assert!(s.pixels().pixels().all(|p| p.0 == CLEAR));
}

#[test]
fn restore_brings_back_saved_state() {
    let mut s = surface(2, 2);
    s.save();
    s.set_transform(Transform::translation(5.0, 5.0));
    s.set_blend_mode(BlendMode::Multiply);
    s.restore();
    assert!(s.transform().is_identity());
    assert_eq!(s.blend_mode(), BlendMode::SourceOver);
    // Unbalanced restore is ignored.
    s.restore();
    assert_eq!(s.blend_mode(), BlendMode::SourceOver);
}

#[test]
fn set_size_clears_and_resizes() {
    let mut s = surface(2, 2);
    s.draw_bitmap(&solid(2, 2, RED), Rect::new(0.0, 0.0, 2.0, 2.0));
    s.set_size(6, 3);
    assert_eq!((s.width(), s.height()), (6, 3));
    assert!(s.pixels().pixels().all(|p| p.0 == CLEAR));
}

#[test]
fn stroke_rect_leaves_interior_untouched() {
    let mut s = surface(40, 40);
    s.stroke_rect(Rect::new(10.0, 10.0, 20.0, 20.0), BLUE, 4.0);
    assert_eq!(px(&s, 10, 10), BLUE);
    assert_eq!(px(&s, 29, 20), BLUE);
    assert_eq!(px(&s, 20, 20), CLEAR);
    assert_eq!(px(&s, 2, 2), CLEAR);
}

#[test]
fn fill_circle_covers_disc() {
    let mut s = surface(40, 40);
    s.fill_circle(Point::new(20.0, 20.0), 5.0, RED);
    assert_eq!(px(&s, 20, 20), RED);
    assert_eq!(px(&s, 23, 20), RED);
    assert_eq!(px(&s, 26, 20), CLEAR);
    assert_eq!(px(&s, 0, 0), CLEAR);
}

#[test]
fn text_without_fonts_draws_nothing() {
    let mut s = surface(20, 20);
    let font = FontSpec::new(12.0, "NoSuchFamily");
    s.fill_text("hi", &font, 10.0, 10.0, &TextStyle::centered(RED));
    assert!(s.pixels().pixels().all(|p| p.0 == CLEAR));
}

// ============================================================================
// Surfaces
// ============================================================================

#[test]
fn flush_composites_workspace_then_clears_it() {
    let mut pair = Surfaces::raster(4, 4, &FontBook::new());
    pair.workspace.draw_bitmap(&solid(2, 2, RED), Rect::new(0.0, 0.0, 2.0, 2.0));
    pair.display.set_transform(Transform::translation(1.0, 1.0));
    pair.flush_workspace();

    assert_eq!(px(&pair.display, 0, 0), RED);
    assert_eq!(px(&pair.display, 3, 3), CLEAR);
    assert!(pair.workspace.pixels().pixels().all(|p| p.0 == CLEAR));
    // Display state is restored after the flush.
    assert_eq!(pair.display.transform(), Transform::translation(1.0, 1.0));
}

#[test]
fn get_mut_selects_surface_by_context() {
    let mut pair = Surfaces::raster(3, 3, &FontBook::new());
    pair.get_mut(Context::Workspace).set_size(5, 5);
    assert_eq!(pair.workspace.width(), 5);
    assert_eq!(pair.size(), (3, 3));
    pair.set_size(7, 2);
    assert_eq!(pair.size(), (7, 2));
    assert_eq!((pair.workspace.width(), pair.workspace.height()), (7, 2));
}
