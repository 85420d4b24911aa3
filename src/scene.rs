// ============================================================================
// Scene files: JSON descriptions of a composition
// ============================================================================
//
// {
//   "width": 500, "height": 500,
//   "items": [
//     { "image": "phone.png", "layer": 2, "actions": [{ "align": "center" }] },
//     { "text": "Apple", "layer": 4, "color": "#ffffff",
//       "actions": [{ "resize": 160 }, { "rotate": 15 }] }
//   ]
// }
//
// Images load first (all or nothing), then the optional explicit size is
// applied, then text items are placed and every item's actions are applied
// in listed order.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::actions::ActionValue;
use crate::canvas::{BlendMode, Surface};
use crate::editor::{Editor, ImageRequest};
use crate::error::{EditorError, RenderError};
use crate::io::ImageSource;
use crate::item::{Context, ItemId};
use crate::ops::text::FontSpec;

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("failed to read scene {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scene: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("item {0} needs exactly one of \"image\" or \"text\"")]
    Content(usize),
    #[error("invalid color {0:?}, expected #rrggbb or #rrggbbaa")]
    Color(String),
    #[error(transparent)]
    Editor(#[from] EditorError),
}

impl From<RenderError> for SceneError {
    fn from(e: RenderError) -> Self {
        SceneError::Editor(e.into())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub items: Vec<SceneItem>,
}

fn yes() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneItem {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub layer: i32,
    #[serde(default)]
    pub context: Context,
    #[serde(default)]
    pub font: Option<FontSpec>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub composite: Option<BlendMode>,
    #[serde(default = "yes")]
    pub visible: bool,
    #[serde(default = "yes")]
    pub selectable: bool,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub actions: Vec<ActionValue>,
}

impl Scene {
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let content = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(json: &str) -> Result<Self, SceneError> {
        let scene: Scene = serde_json::from_str(json)?;
        for (idx, item) in scene.items.iter().enumerate() {
            if item.image.is_some() == item.text.is_some() {
                return Err(SceneError::Content(idx));
            }
        }
        Ok(scene)
    }

    /// Build the scene in `editor` and render it. Returns item ids in scene
    /// order.
    pub async fn apply<S: Surface>(&self, editor: &mut Editor<S>) -> Result<Vec<ItemId>, SceneError> {
        let requests: Vec<ImageRequest> = self
            .items
            .iter()
            .filter_map(|item| {
                item.image.as_deref().map(|src| ImageRequest {
                    source: ImageSource::parse(src),
                    layer: item.layer,
                    context: item.context,
                })
            })
            .collect();
        let mut images = editor.load_images(requests).await?.into_iter();

        if let (Some(w), Some(h)) = (self.width, self.height) {
            editor.resize_display(w, h)?;
        }

        let mut ids = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let id = match &item.text {
                Some(text) => editor.place_text(text, item.layer),
                None => match images.next() {
                    Some(id) => id,
                    None => continue,
                },
            };
            self.configure(editor, id, item)?;
            ids.push(id);
        }

        editor.render_all()?;
        tracing::info!(items = ids.len(), "scene applied");
        Ok(ids)
    }

    fn configure<S: Surface>(&self, editor: &mut Editor<S>, id: ItemId, spec: &SceneItem) -> Result<(), SceneError> {
        let color = spec.color.as_deref().map(parse_hex_color).transpose()?;
        if let Some(entry) = editor.store_mut().get_mut(id) {
            entry.context = spec.context;
            entry.visible = spec.visible;
            entry.selectable = spec.selectable;
            if let Some(font) = &spec.font {
                entry.font = font.clone();
                entry.height = font.size_px;
            }
            if let Some(color) = color {
                entry.color = color;
            }
            if let Some(mode) = spec.composite {
                entry.blend = mode;
            }
        }
        for action in &spec.actions {
            editor.apply_action(id, action.clone())?;
        }
        if spec.selected {
            editor.select(id)?;
        }
        Ok(())
    }
}

/// `#rgb`, `#rrggbb` or `#rrggbbaa`.
pub fn parse_hex_color(s: &str) -> Result<[u8; 4], SceneError> {
    let err = || SceneError::Color(s.to_string());
    let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2).unwrap_or("zz"), 16).map_err(|_| err());
    match hex.len() {
        3 => {
            let nib = |i: usize| {
                u8::from_str_radix(hex.get(i..i + 1).unwrap_or("z"), 16)
                    .map(|v| v * 17)
                    .map_err(|_| err())
            };
            Ok([nib(0)?, nib(1)?, nib(2)?, 255])
        }
        6 => Ok([byte(0)?, byte(2)?, byte(4)?, 255]),
        8 => Ok([byte(0)?, byte(2)?, byte(4)?, byte(6)?]),
        _ => Err(err()),
    }
}
