// ============================================================================
// Item geometry: align, move, resize, rotate
// ============================================================================

use image::RgbaImage;

use crate::actions::{ActionKind, ActionValue};
use crate::error::RenderError;
use crate::geometry::{self, Anchor, Direction, Point, Transform};
use crate::item::Item;
use crate::ops::text::FontSpec;

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

/// Place `item` on `anchor` of a `surface_w x surface_h` surface.
pub fn align_item(item: &mut Item, anchor: Anchor, surface_w: f64, surface_h: f64) {
    let p = geometry::align_position(
        anchor,
        item.origin(),
        Point::new(item.dx, item.dy),
        (item.width, item.height),
        (surface_w, surface_h),
    );
    item.dx = p.x;
    item.dy = p.y;
    item.needs_origin = false;
}

/// One unit step in `direction`.
pub fn move_item(item: &mut Item, direction: Direction) {
    let (ddx, ddy) = direction.delta();
    item.dx += ddx;
    item.dy += ddy;
}

/// Apply the item's Resize slot.
///
/// Images treat the value as a pixel delta against the previous value; text
/// treats it as the absolute font size. `0` restores the original size in
/// both cases. `measure` gives the advance width of a string in a font.
pub fn resize_item(item: &mut Item, measure: impl Fn(&str, &FontSpec) -> f64) -> Result<(), RenderError> {
    let Some(action) = item.actions.get(ActionKind::Resize) else {
        return Ok(());
    };
    let value = action.value.as_number().unwrap_or(0.0);
    let previous = action.previous_number();

    if item.original_width.is_none() || item.original_height.is_none() {
        item.original_width = Some(item.width);
        item.original_height = Some(item.height);
    }

    if item.actions.contains(ActionKind::DrawImage) {
        let original = (
            item.original_width.unwrap_or(item.width),
            item.original_height.unwrap_or(item.height),
        );
        let (w, h) = geometry::resized_dimensions((item.width, item.height), original, value, previous);
        item.width = w;
        item.height = h;
        return Ok(());
    }

    if item.actions.contains(ActionKind::DrawText) {
        let size = if value == 0.0 {
            item.original_height.unwrap_or(item.font.size_px)
        } else {
            value
        };
        item.font = item.font.with_size(size);
        refresh_text_metrics(item, measure);
        return Ok(());
    }

    Err(RenderError::UnknownItemType(item.id))
}

/// Height follows the font size and width the measured text.
pub fn refresh_text_metrics(item: &mut Item, measure: impl Fn(&str, &FontSpec) -> f64) {
    item.height = item.font.size_px;
    item.width = item.text_value().map(|t| measure(t, &item.font)).unwrap_or(0.0);
}

/// Capture the rotation transform about the item's visual center.
///
/// `0` and `360` are built as a full turn and the slot value is reset to
/// `0` afterwards, so repeated full turns always land on identity.
pub fn rotate_item(item: &mut Item) {
    let Some(action) = item.actions.get_mut(ActionKind::Rotate) else {
        return;
    };
    let degrees = action.value.as_number().unwrap_or(0.0);
    let turn = geometry::normalized_turn(degrees);
    if turn == 360.0 {
        action.value = ActionValue::Rotate(0.0);
    }

    let pivot = item.pivot();
    item.transform = Transform::rotation_about(pivot, turn);
    item.transform_pivot = Some(pivot);
}

/// The cached transform was built for a different pivot.
pub fn rotation_is_stale(item: &Item) -> bool {
    item.actions.contains(ActionKind::Rotate) && item.transform_pivot != Some(item.pivot())
}

// ============================================================================
// Sampling
// ============================================================================

/// Bilinear interpolation sampling from an RgbaImage, clamped at the edges.
pub fn bilinear_sample(img: &RgbaImage, x: f32, y: f32) -> [u8; 4] {
    if img.width() == 0 || img.height() == 0 {
        return [0; 4];
    }
    let max_x = img.width() as i32 - 1;
    let max_y = img.height() as i32 - 1;
    let x = x.clamp(0.0, max_x as f32);
    let y = y.clamp(0.0, max_y as f32);
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let sample = |sx: i32, sy: i32| -> [f32; 4] {
        let p = img.get_pixel(sx.min(max_x) as u32, sy.min(max_y) as u32);
        [p[0] as f32, p[1] as f32, p[2] as f32, p[3] as f32]
    };

    let tl = sample(x0, y0);
    let tr = sample(x0 + 1, y0);
    let bl = sample(x0, y0 + 1);
    let br = sample(x0 + 1, y0 + 1);

    let lerp = |a: f32, b: f32, t: f32| a + (b - a) * t;
    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = lerp(tl[c], tr[c], fx);
        let bot = lerp(bl[c], br[c], fx);
        out[c] = lerp(top, bot, fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}
