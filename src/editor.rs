//! Command surface for UI collaborators.
//!
//! `Editor` owns the item store, the two surfaces and the renderer. Every
//! command mutates an item's action log or state and then re-renders the
//! whole frame, so the display surface always reflects the store. Commands
//! aimed at an id that is not in the store are no-ops.

#[cfg(test)]
#[path = "editor_test.rs"]
mod editor_test;

use std::path::Path;
use std::sync::Arc;

use image::RgbaImage;

use crate::actions::{ActionKind, ActionValue};
use crate::canvas::{BlendMode, RasterSurface, Surface, Surfaces};
use crate::error::{EditorError, ExportError, RenderError};
use crate::geometry::{Anchor, Direction, Point, Transform};
use crate::io::{self, ImageSource};
use crate::item::{Context, Item, ItemId, PLACEHOLDER_LAYER};
use crate::ops::color_removal::MaskParams;
use crate::ops::text::FontBook;
use crate::ops::transform::move_item;
use crate::render::{RenderOptions, Renderer};
use crate::settings::EditorSettings;
use crate::store::ItemStore;

/// Text shown while images load.
pub const LOADING_TEXT: &str = "Loading...";

/// One image to load and place.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub source: ImageSource,
    pub layer: i32,
    pub context: Context,
}

impl ImageRequest {
    pub fn new(source: ImageSource, layer: i32) -> Self {
        Self { source, layer, context: Context::Display }
    }
}

/// An encoded snapshot of the display surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Export {
    pub file_name: String,
    pub data_url: String,
}

pub struct Editor<S: Surface = RasterSurface> {
    store: ItemStore,
    surfaces: Surfaces<S>,
    renderer: Renderer,
    fonts: FontBook,
    settings: EditorSettings,
}

impl Editor<RasterSurface> {
    /// Editor with in-memory raster surfaces sized from `settings`.
    pub fn new(settings: EditorSettings) -> Self {
        let fonts = FontBook::new();
        for path in &settings.font_files {
            if let Err(e) = fonts.register_file(path) {
                tracing::warn!(error = %e, "skipping font file");
            }
        }
        let surfaces = Surfaces::raster(settings.display_width, settings.display_height, &fonts);
        Self::with_surfaces(surfaces, fonts, settings)
    }
}

impl<S: Surface> Editor<S> {
    pub fn with_surfaces(surfaces: Surfaces<S>, fonts: FontBook, settings: EditorSettings) -> Self {
        Self {
            store: ItemStore::new(),
            surfaces,
            renderer: Renderer::new(RenderOptions::from(&settings)),
            fonts,
            settings,
        }
    }

    pub fn store(&self) -> &ItemStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ItemStore {
        &mut self.store
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.store.get(id)
    }

    pub fn surfaces(&self) -> &Surfaces<S> {
        &self.surfaces
    }

    pub fn display(&self) -> &S {
        &self.surfaces.display
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn selection(&self) -> Option<ItemId> {
        self.store.selection()
    }

    // ========================================================================
    // Placement
    // ========================================================================

    /// Add an item without rendering.
    pub fn place(&mut self, item: Item) -> ItemId {
        let id = self.store.place(item);
        tracing::debug!(item = %id, "placed item");
        id
    }

    /// Add a text item in the default font and color.
    pub fn place_text(&mut self, text: &str, layer: i32) -> ItemId {
        let item = Item::text(text, self.settings.default_font.clone())
            .with_color(self.settings.text_color)
            .with_layer(layer);
        self.place(item)
    }

    /// Show a non-selectable text item below layer zero. Full passes skip it,
    /// so it is rendered on its own.
    pub fn show_placeholder(&mut self, text: &str) -> Result<ItemId, RenderError> {
        let mut item = Item::text(text, self.settings.default_font.clone())
            .with_color(self.settings.text_color)
            .with_layer(PLACEHOLDER_LAYER);
        item.selectable = false;
        let id = self.place(item);
        self.render_item(id)?;
        Ok(id)
    }

    /// Load and place one image. Sources already decoded for another item
    /// share that bitmap.
    pub async fn load_image(&mut self, request: ImageRequest) -> Result<ItemId, EditorError> {
        let bitmap = match self.cached_bitmap(&request.source) {
            Some(bitmap) => bitmap,
            None => io::load_bitmap(&request.source).await?,
        };
        Ok(self.place_loaded(request, bitmap))
    }

    /// Load every request concurrently and place them all, or none.
    ///
    /// A loading placeholder is shown while waiting. On success it is
    /// removed, the surfaces take the size of the first image and the frame
    /// is re-rendered. On failure the placeholder stays visible and the
    /// error is returned.
    pub async fn load_images(&mut self, requests: Vec<ImageRequest>) -> Result<Vec<ItemId>, EditorError> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }
        let placeholder = self.show_placeholder(LOADING_TEXT)?;

        let sources: Vec<ImageSource> = requests.iter().map(|r| r.source.clone()).collect();
        let cached: Vec<Option<Arc<RgbaImage>>> = sources.iter().map(|s| self.cached_bitmap(s)).collect();
        let missing: Vec<ImageSource> = sources
            .iter()
            .zip(&cached)
            .filter(|(_, hit)| hit.is_none())
            .map(|(s, _)| s.clone())
            .collect();

        let mut fetched = match io::load_all(&missing).await {
            Ok(bitmaps) => bitmaps.into_iter(),
            Err(e) => {
                tracing::error!(error = %e, "image load failed");
                return Err(e.into());
            }
        };

        let mut ids = Vec::with_capacity(requests.len());
        for (request, hit) in requests.into_iter().zip(cached) {
            let bitmap = match hit.or_else(|| fetched.next()) {
                Some(bitmap) => bitmap,
                None => continue,
            };
            ids.push(self.place_loaded(request, bitmap));
        }

        self.store.remove(placeholder);
        if let Some(first) = ids.first().copied() {
            self.fit_display_to(first)?;
        } else {
            self.render_all()?;
        }
        tracing::info!(count = ids.len(), "images loaded");
        Ok(ids)
    }

    fn cached_bitmap(&self, source: &ImageSource) -> Option<Arc<RgbaImage>> {
        self.store.find_by_source(source).and_then(|item| item.bitmap.clone())
    }

    fn place_loaded(&mut self, request: ImageRequest, bitmap: Arc<RgbaImage>) -> ItemId {
        let item = Item::with_bitmap(request.source, bitmap)
            .with_layer(request.layer)
            .with_context(request.context);
        self.place(item)
    }

    pub fn remove(&mut self, id: ItemId) -> Result<(), RenderError> {
        self.store.remove(id);
        tracing::debug!(item = %id, "removed item");
        self.render_all()
    }

    // ========================================================================
    // Selection and visibility
    // ========================================================================

    pub fn select(&mut self, id: ItemId) -> Result<bool, RenderError> {
        if !self.store.select(id) {
            return Ok(false);
        }
        self.render_all()?;
        Ok(true)
    }

    pub fn deselect(&mut self) -> Result<Option<ItemId>, RenderError> {
        let previous = self.store.clear_selection();
        if previous.is_some() {
            self.render_all()?;
        }
        Ok(previous)
    }

    pub fn set_visible(&mut self, id: ItemId, visible: bool) -> Result<(), RenderError> {
        self.update(id, |item| item.visible = visible)
    }

    pub fn toggle_visibility(&mut self, id: ItemId) -> Result<(), RenderError> {
        self.update(id, |item| item.visible = !item.visible)
    }

    pub fn set_selectable(&mut self, id: ItemId, selectable: bool) -> Result<(), RenderError> {
        self.update(id, |item| item.selectable = selectable)
    }

    pub fn set_layer(&mut self, id: ItemId, layer: i32) -> Result<(), RenderError> {
        if self.store.set_layer(id, layer) {
            self.render_all()?;
        }
        Ok(())
    }

    pub fn set_composite(&mut self, id: ItemId, mode: BlendMode) -> Result<(), RenderError> {
        self.update(id, |item| item.blend = mode)
    }

    pub fn set_color(&mut self, id: ItemId, color: [u8; 4]) -> Result<(), RenderError> {
        self.update(id, |item| item.color = color)
    }

    // ========================================================================
    // Actions
    // ========================================================================

    pub fn align(&mut self, id: ItemId, anchor: Anchor) -> Result<(), RenderError> {
        self.apply_action(id, ActionValue::Align(anchor))
    }

    /// One unit step.
    pub fn nudge(&mut self, id: ItemId, direction: Direction) -> Result<(), RenderError> {
        self.apply_action(id, ActionValue::Move(direction))
    }

    pub fn resize(&mut self, id: ItemId, value: f64) -> Result<(), RenderError> {
        self.apply_action(id, ActionValue::Resize(value))
    }

    pub fn rotate(&mut self, id: ItemId, degrees: f64) -> Result<(), RenderError> {
        self.apply_action(id, ActionValue::Rotate(degrees))
    }

    pub fn mask(&mut self, id: ItemId, params: MaskParams) -> Result<(), RenderError> {
        self.apply_action(id, ActionValue::MaskColor(params))
    }

    pub fn white_to_transparent(&mut self, id: ItemId) -> Result<(), RenderError> {
        self.mask(id, MaskParams::white_to_transparent())
    }

    pub fn edit_text(&mut self, id: ItemId, text: &str) -> Result<(), RenderError> {
        self.apply_action(id, ActionValue::DrawText(text.to_string()))
    }

    /// Swap the font family, keeping the current size.
    pub fn change_font(&mut self, id: ItemId, family: &str) -> Result<(), RenderError> {
        self.update(id, |item| item.font = item.font.with_family(family))
    }

    /// Move the item so `point` is its visual center.
    pub fn drag_to(&mut self, id: ItemId, point: Point) -> Result<(), RenderError> {
        self.update(id, |item| {
            if item.is_text() {
                item.dx = point.x;
                item.dy = point.y;
            } else {
                item.dx = point.x - item.width / 2.0;
                item.dy = point.y - item.height / 2.0;
            }
        })
    }

    /// Drop the Align and Move slots so they never reapply.
    pub fn clear_motion(&mut self, id: ItemId) {
        if let Some(item) = self.store.get_mut(id) {
            item.actions.remove(ActionKind::Align);
            item.actions.remove(ActionKind::Move);
        }
    }

    /// Undo the effect of one slot and remove it. Returns whether anything
    /// was reverted; Align and the draw slots cannot be.
    pub fn revert(&mut self, id: ItemId, kind: ActionKind) -> Result<bool, RenderError> {
        let Some(item) = self.store.get_mut(id) else {
            return Ok(false);
        };
        let reverted = revert_slot(item, kind);
        if reverted {
            self.render_all()?;
        }
        Ok(reverted)
    }

    /// Revert Resize and Rotate on every item and clear the selection.
    pub fn restore(&mut self) -> Result<(), RenderError> {
        for item in self.store.iter_mut() {
            revert_slot(item, ActionKind::Resize);
            revert_slot(item, ActionKind::Rotate);
        }
        self.store.clear_selection();
        self.render_all()
    }

    // ========================================================================
    // Rendering and surfaces
    // ========================================================================

    pub fn render_all(&mut self) -> Result<(), RenderError> {
        self.renderer.render_all(&mut self.store, &mut self.surfaces)
    }

    /// Render one item on top of the current frame, whatever its layer.
    pub fn render_item(&mut self, id: ItemId) -> Result<(), RenderError> {
        let selected = self.store.selection() == Some(id);
        match self.store.get_mut(id) {
            Some(item) => self.renderer.render_item(item, selected, &mut self.surfaces),
            None => Ok(()),
        }
    }

    /// Clear both surfaces and mark every draw slot unpainted so the next
    /// pass repaints. Geometry is kept.
    pub fn reset(&mut self) {
        self.surfaces.workspace.clear();
        self.surfaces.display.clear();
        for item in self.store.iter_mut() {
            item.actions.clear_rendered();
            for kind in [ActionKind::DrawImage, ActionKind::MaskColor, ActionKind::DrawText] {
                if let Some(action) = item.actions.get_mut(kind) {
                    action.is_painted = Some(false);
                }
            }
        }
    }

    /// Resize both surfaces and redraw.
    pub fn resize_display(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.surfaces.set_size(width, height);
        tracing::debug!(width, height, "display resized");
        self.render_all()
    }

    /// Size the surfaces to an item's bounds.
    pub fn fit_display_to(&mut self, id: ItemId) -> Result<(), RenderError> {
        let Some(item) = self.store.get(id) else {
            return Ok(());
        };
        let (w, h) = (item.width.round().max(1.0) as u32, item.height.round().max(1.0) as u32);
        self.resize_display(w, h)
    }

    /// Encode the display surface as a PNG data URL.
    pub fn export(&self, file_name: Option<&str>) -> Result<Export, ExportError> {
        let file_name = file_name.unwrap_or(&self.settings.export_file_name).to_string();
        let data_url = io::png_data_url(self.surfaces.display.pixels())?;
        tracing::info!(file = %file_name, "exported display");
        Ok(Export { file_name, data_url })
    }

    pub fn save_png(&self, path: &Path) -> Result<(), ExportError> {
        io::write_png(self.surfaces.display.pixels(), path)?;
        tracing::info!(path = %path.display(), "wrote PNG");
        Ok(())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Write one action value and re-render.
    pub fn apply_action(&mut self, id: ItemId, value: ActionValue) -> Result<(), RenderError> {
        let kind = value.kind();
        if self.store.set_action(id, value).is_none() {
            tracing::debug!(item = %id, ?kind, "no such item");
            return Ok(());
        }
        tracing::debug!(item = %id, ?kind, "action set");
        self.render_all()
    }

    fn update(&mut self, id: ItemId, f: impl FnOnce(&mut Item)) -> Result<(), RenderError> {
        let Some(item) = self.store.get_mut(id) else {
            tracing::debug!(item = %id, "no such item");
            return Ok(());
        };
        f(item);
        self.render_all()
    }
}

fn revert_slot(item: &mut Item, kind: ActionKind) -> bool {
    let back = match item.actions.get(kind).map(|a| &a.value) {
        None => return false,
        Some(ActionValue::Move(direction)) => Some(direction.opposite()),
        Some(_) => None,
    };
    match kind {
        ActionKind::Resize => {
            if item.is_text() {
                if let Some(h) = item.original_height {
                    item.font = item.font.with_size(h);
                    item.height = h;
                }
            } else if let (Some(w), Some(h)) = (item.original_width, item.original_height) {
                item.width = w;
                item.height = h;
            }
        }
        ActionKind::Rotate => {
            item.transform = Transform::IDENTITY;
            item.transform_pivot = None;
        }
        ActionKind::Move => {
            if let Some(direction) = back {
                move_item(item, direction);
            }
        }
        ActionKind::MaskColor => {}
        _ => return false,
    }
    item.actions.remove(kind);
    true
}
