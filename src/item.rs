//! Placed visual objects.

use std::sync::Arc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actions::{ActionKind, ActionLog, ActionValue};
use crate::canvas::BlendMode;
use crate::geometry::{Origin, Point, Rect, Transform};
use crate::io::ImageSource;
use crate::ops::text::FontSpec;

/// Unique identifier for an item. The nil UUID means "not assigned yet".
pub type ItemId = Uuid;

/// Layer of the transient "loading" placeholder; negative layers never take
/// part in a full render pass.
pub const PLACEHOLDER_LAYER: i32 = -1;

/// Reserved layer for overlay-only items. They paint last and are never
/// picked by pointer selection.
pub const OVERLAY_LAYER: i32 = 9999;

/// What an item has turned into once a draw action has executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Nothing drawn yet.
    #[default]
    Pending,
    Image,
    Text,
}

/// Which surface an item is rendered onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Context {
    /// Transient surface, composited onto the display after each item.
    Workspace,
    #[default]
    Display,
}

/// A placed image or text object.
#[derive(Debug, Clone)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    pub context: Context,

    /// Top-left for images, center for text.
    pub dx: f64,
    pub dy: f64,
    pub width: f64,
    pub height: f64,
    pub original_width: Option<f64>,
    pub original_height: Option<f64>,

    pub visible: bool,
    pub selectable: bool,
    pub layer: i32,
    pub blend: BlendMode,

    /// Rotation captured by the last Rotate execution.
    pub transform: Transform,
    /// Pivot the cached transform was built around.
    pub transform_pivot: Option<Point>,

    pub color: [u8; 4],
    pub font: FontSpec,
    pub bitmap: Option<Arc<RgbaImage>>,
    pub actions: ActionLog,

    /// Text items start centered on the surface on their first draw.
    pub(crate) needs_origin: bool,
}

impl Default for Item {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            kind: ItemKind::Pending,
            context: Context::Display,
            dx: 0.0,
            dy: 0.0,
            width: 0.0,
            height: 0.0,
            original_width: None,
            original_height: None,
            visible: true,
            selectable: true,
            layer: 0,
            blend: BlendMode::SourceOver,
            transform: Transform::IDENTITY,
            transform_pivot: None,
            color: [0, 0, 0, 255],
            font: FontSpec::default(),
            bitmap: None,
            actions: ActionLog::new(),
            needs_origin: false,
        }
    }
}

impl Item {
    /// An image item that draws from `source`. Size stays unknown until a
    /// bitmap is attached.
    pub fn image(source: ImageSource) -> Self {
        let mut item = Self::default();
        item.actions.set(ActionValue::DrawImage(source));
        item
    }

    /// An image item with an already decoded bitmap.
    pub fn with_bitmap(source: ImageSource, bitmap: Arc<RgbaImage>) -> Self {
        let mut item = Self::image(source);
        item.attach_bitmap(bitmap);
        item
    }

    /// A text item, centered on the surface when first drawn.
    pub fn text(text: impl Into<String>, font: FontSpec) -> Self {
        let mut item = Self::default();
        item.height = font.size_px;
        item.font = font;
        item.needs_origin = true;
        item.actions.set(ActionValue::DrawText(text.into()));
        item
    }

    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn with_position(mut self, dx: f64, dy: f64) -> Self {
        self.dx = dx;
        self.dy = dy;
        self.needs_origin = false;
        self
    }

    pub fn with_color(mut self, color: [u8; 4]) -> Self {
        self.color = color;
        self
    }

    /// Record decoded pixel dimensions and keep them as the original size.
    pub fn attach_bitmap(&mut self, bitmap: Arc<RgbaImage>) {
        let (w, h) = (bitmap.width() as f64, bitmap.height() as f64);
        self.width = w;
        self.height = h;
        self.original_width = Some(w);
        self.original_height = Some(h);
        self.bitmap = Some(bitmap);
    }

    pub fn is_text(&self) -> bool {
        self.kind == ItemKind::Text || self.actions.contains(ActionKind::DrawText)
    }

    pub fn is_image(&self) -> bool {
        self.kind == ItemKind::Image || self.actions.contains(ActionKind::DrawImage)
    }

    /// An image whose bytes have not been decoded yet.
    pub fn awaiting_bitmap(&self) -> bool {
        self.actions.contains(ActionKind::DrawImage) && self.bitmap.is_none()
    }

    pub fn origin(&self) -> Origin {
        if self.is_text() { Origin::Center } else { Origin::TopLeft }
    }

    /// Unrotated bounding box.
    pub fn bounds(&self) -> Rect {
        self.origin().bounds(self.dx, self.dy, self.width, self.height)
    }

    /// Rotation pivot for the current geometry.
    pub fn pivot(&self) -> Point {
        self.origin().pivot(self.dx, self.dy, self.width, self.height)
    }

    pub fn text_value(&self) -> Option<&str> {
        match self.actions.get(ActionKind::DrawText).map(|a| &a.value) {
            Some(ActionValue::DrawText(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn source(&self) -> Option<&ImageSource> {
        match self.actions.get(ActionKind::DrawImage).map(|a| &a.value) {
            Some(ActionValue::DrawImage(source)) => Some(source),
            _ => None,
        }
    }
}
