//! ComposeFE: a layered image and text compositor.
//!
//! Items (images and text) live in an [`ItemStore`] ordered by layer. Each
//! item carries an action log of edits (align, move, resize, rotate, mask,
//! draw) which the [`Renderer`] replays onto a pair of surfaces every frame.
//! The [`Editor`] wraps all of it behind a command surface, and
//! [`Interaction`] turns pointer events into selection and drag commands.

pub mod actions;
pub mod canvas;
pub mod cli;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod hit;
pub mod input;
pub mod io;
pub mod item;
pub mod logger;
pub mod ops;
pub mod render;
pub mod scene;
pub mod settings;
pub mod store;

pub use actions::{Action, ActionKind, ActionLog, ActionValue};
pub use canvas::{BlendMode, RasterSurface, Surface, Surfaces};
pub use editor::{Editor, Export, ImageRequest};
pub use error::{EditorError, ExportError, LoadError, RenderError};
pub use geometry::{Anchor, Direction, Point, Rect, Transform};
pub use input::{Effect, InputEvent, Interaction};
pub use io::ImageSource;
pub use item::{Context, Item, ItemId, ItemKind};
pub use render::Renderer;
pub use settings::EditorSettings;
pub use store::ItemStore;
