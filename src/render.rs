//! Replays item action logs onto surfaces.
//!
//! A pass selects the item's surface, runs every present slot in precedence
//! order, draws the selection overlay, and flushes the workspace onto the
//! display. Geometry slots (Align, Move, Resize) change the item itself, so
//! they only run while their value is pending; once applied they are marked
//! painted and later passes skip them. Draw and mask slots run every pass.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::actions::{ActionKind, ActionValue};
use crate::canvas::{BlendMode, Surface, Surfaces};
use crate::error::RenderError;
use crate::geometry::Transform;
use crate::item::{Context, Item, ItemKind};
use crate::ops::color_removal::mask_pixels;
use crate::ops::text::TextStyle;
use crate::ops::transform::{
    align_item, move_item, refresh_text_metrics, resize_item, rotate_item, rotation_is_stale,
};
use crate::settings::EditorSettings;
use crate::store::ItemStore;

/// Selection overlay and masking knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub selection_color: [u8; 4],
    pub selection_line_width: f64,
    pub handle_radius: f64,
    pub mask_edge_guard: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&EditorSettings::default())
    }
}

impl From<&EditorSettings> for RenderOptions {
    fn from(s: &EditorSettings) -> Self {
        Self {
            selection_color: s.selection_color,
            selection_line_width: s.selection_line_width,
            handle_radius: s.handle_radius,
            mask_edge_guard: s.mask_edge_guard,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Clear both surfaces and render every item with a non-negative layer
    /// in ascending layer order. The finished frame is on the display.
    pub fn render_all<S: Surface>(
        &self,
        store: &mut ItemStore,
        surfaces: &mut Surfaces<S>,
    ) -> Result<(), RenderError> {
        surfaces.workspace.clear();
        surfaces.display.clear();
        let selection = store.selection();
        let order = store.paint_order();
        tracing::debug!(items = order.len(), "render pass");
        for id in order {
            if let Some(item) = store.get_mut(id) {
                self.render_item(item, selection == Some(id), surfaces)?;
            }
        }
        Ok(())
    }

    /// Render a single item onto its surface.
    pub fn render_item<S: Surface>(
        &self,
        item: &mut Item,
        selected: bool,
        surfaces: &mut Surfaces<S>,
    ) -> Result<(), RenderError> {
        validate(item)?;
        if !item.visible {
            return Ok(());
        }
        if item.awaiting_bitmap() {
            tracing::debug!(item = %item.id, "image not decoded yet; skipping");
            return Ok(());
        }
        item.actions.clear_rendered();

        let surface = surfaces.get_mut(item.context);
        let surface_w = surface.width() as f64;
        let surface_h = surface.height() as f64;

        if item.actions.contains(ActionKind::DrawText) {
            if item.needs_origin {
                item.dx = surface_w / 2.0;
                item.dy = surface_h / 2.0;
                item.needs_origin = false;
            }
            refresh_text_metrics(item, |t, f| surface.measure_text(t, f));
        }

        for kind in ActionKind::ORDER {
            let Some(action) = item.actions.get(kind) else {
                continue;
            };
            let pending = action.is_pending();
            let value = if matches!(kind, ActionKind::Align | ActionKind::Move | ActionKind::MaskColor) {
                Some(action.value.clone())
            } else {
                None
            };

            match (kind, value) {
                (ActionKind::Align, Some(ActionValue::Align(anchor))) if pending => {
                    align_item(item, anchor, surface_w, surface_h);
                }
                (ActionKind::Move, Some(ActionValue::Move(direction))) if pending => {
                    move_item(item, direction);
                }
                (ActionKind::Resize, _) if pending => {
                    resize_item(item, |t, f| surface.measure_text(t, f))?;
                }
                (ActionKind::Rotate, _) if pending || rotation_is_stale(item) => {
                    rotate_item(item);
                }
                (ActionKind::DrawImage, _) => draw_image(item, surface),
                (ActionKind::MaskColor, Some(ActionValue::MaskColor(params))) => {
                    let masked = mask_pixels(surface.pixels_mut(), &params, item.bounds(), self.options.mask_edge_guard);
                    tracing::trace!(item = %item.id, masked, "mask applied");
                }
                (ActionKind::DrawText, _) => draw_text(item, surface),
                _ => {}
            }

            if let Some(action) = item.actions.get_mut(kind) {
                action.is_painted = Some(true);
                action.is_rendered = true;
            }
        }

        if selected {
            self.draw_selection(item, surface);
        }

        if item.context == Context::Workspace {
            surfaces.flush_workspace();
        }
        Ok(())
    }

    /// Bounding box plus eight handles, unrotated.
    fn draw_selection<S: Surface>(&self, item: &Item, surface: &mut S) {
        let bounds = item.bounds();
        let color = self.options.selection_color;
        surface.save();
        surface.set_transform(Transform::IDENTITY);
        surface.set_blend_mode(BlendMode::SourceOver);
        surface.stroke_rect(bounds, color, self.options.selection_line_width);
        for handle in bounds.handles() {
            surface.fill_circle(handle, self.options.handle_radius, color);
        }
        surface.restore();
    }
}

/// Every present slot must carry its painted flag.
fn validate(item: &Item) -> Result<(), RenderError> {
    match item.actions.iter().find(|a| a.is_painted.is_none()) {
        Some(action) => Err(RenderError::MalformedAction { item: item.id, kind: action.kind() }),
        None => Ok(()),
    }
}

fn draw_image<S: Surface>(item: &mut Item, surface: &mut S) {
    let Some(bitmap) = item.bitmap.clone() else {
        return;
    };
    surface.save();
    surface.set_transform(item.transform);
    surface.set_blend_mode(item.blend);
    surface.draw_bitmap(&bitmap, item.origin().bounds(item.dx, item.dy, item.width, item.height));
    surface.restore();
    item.kind = ItemKind::Image;
}

fn draw_text<S: Surface>(item: &mut Item, surface: &mut S) {
    let Some(text) = item.text_value().map(str::to_string) else {
        return;
    };
    refresh_text_metrics(item, |t, f| surface.measure_text(t, f));
    surface.save();
    surface.set_transform(item.transform);
    surface.set_blend_mode(item.blend);
    surface.fill_text(&text, &item.font, item.dx, item.dy, &TextStyle::centered(item.color));
    surface.restore();
    item.kind = ItemKind::Text;
}
