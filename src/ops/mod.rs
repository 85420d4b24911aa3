pub mod color_removal;
pub mod text;
pub mod transform;
