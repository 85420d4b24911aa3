// ============================================================================
// Error types
// ============================================================================

use std::path::PathBuf;

use crate::actions::ActionKind;
use crate::item::ItemId;

/// Fatal conditions raised while replaying an item's actions. They point at
/// a caller bug and halt the current operation.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("unknown item type: {0} has neither DrawImage nor DrawText")]
    UnknownItemType(ItemId),
    #[error("malformed action {kind:?} on {item}: painted flag is required")]
    MalformedAction { item: ItemId, kind: ActionKind },
}

/// Failures fetching or decoding image bytes. No partial state is applied
/// to the target item when one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("GET {url} returned {status}")]
    Status { url: String, status: u16 },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed data URL: {0}")]
    DataUrl(String),
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Any failure surfaced through the editor command surface.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
