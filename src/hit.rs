//! Pointer hit testing.
//!
//! Hit boxes are the unrotated bounding boxes: text boxes are centered on
//! the item's position, image boxes hang from it. A rotated item is hit
//! where it would be without rotation.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::geometry::Point;
use crate::item::{Item, ItemId, OVERLAY_LAYER};
use crate::store::ItemStore;

/// On-screen rectangle a surface is displayed in, in client (CSS) pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }
}

/// Map client coordinates to surface pixels, undoing any CSS scaling of a
/// `surface_w x surface_h` surface shown in `rect`.
pub fn cursor_to_surface(client: Point, rect: ScreenRect, surface_w: u32, surface_h: u32) -> Point {
    let scale_x = if rect.width > 0.0 { surface_w as f64 / rect.width } else { 1.0 };
    let scale_y = if rect.height > 0.0 { surface_h as f64 / rect.height } else { 1.0 };
    Point::new((client.x - rect.left) * scale_x, (client.y - rect.top) * scale_y)
}

pub fn is_inside(item: &Item, point: Point) -> bool {
    item.bounds().contains(point)
}

/// Items a pointer may pick: visible, selectable, painted in full passes,
/// and not an overlay.
pub fn is_pickable(item: &Item) -> bool {
    item.visible && item.selectable && item.layer >= 0 && item.layer != OVERLAY_LAYER
}

/// Topmost pickable item under `point`, skipping `exclude`.
pub fn topmost_at(store: &ItemStore, point: Point, exclude: Option<ItemId>) -> Option<ItemId> {
    store
        .ordered_items()
        .iter()
        .rev()
        .filter(|item| Some(item.id) != exclude && is_pickable(item))
        .find(|item| is_inside(item, point))
        .map(|item| item.id)
}
