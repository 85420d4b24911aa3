// ============================================================================
// Drawing surfaces
// ============================================================================
//
// The renderer talks to surfaces only through the `Surface` trait. The
// in-process implementation, `RasterSurface`, is an RGBA buffer with a
// canvas-like state stack (transform + composite mode) and CPU rasterization
// parallelized per row with rayon.

#[cfg(test)]
#[path = "canvas_test.rs"]
mod canvas_test;

use image::{Rgba, RgbaImage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect, Transform};
use crate::item::Context;
use crate::ops::text::{placement_offset, rasterize_text, FontBook, FontSpec, TextStyle};
use crate::ops::transform::bilinear_sample;

/// Composite operations, named after their canvas counterparts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    #[default]
    SourceOver,
    Multiply,
    Screen,
    Lighter,
    Darken,
    Lighten,
    Difference,
    Xor,
    Copy,
    DestinationOut,
}

impl BlendMode {
    pub fn all() -> &'static [BlendMode] {
        &[
            BlendMode::SourceOver,
            BlendMode::Multiply,
            BlendMode::Screen,
            BlendMode::Lighter,
            BlendMode::Darken,
            BlendMode::Lighten,
            BlendMode::Difference,
            BlendMode::Xor,
            BlendMode::Copy,
            BlendMode::DestinationOut,
        ]
    }

    /// Canvas `globalCompositeOperation` name.
    pub fn name(&self) -> &'static str {
        match self {
            BlendMode::SourceOver => "source-over",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Lighter => "lighter",
            BlendMode::Darken => "darken",
            BlendMode::Lighten => "lighten",
            BlendMode::Difference => "difference",
            BlendMode::Xor => "xor",
            BlendMode::Copy => "copy",
            BlendMode::DestinationOut => "destination-out",
        }
    }

    pub fn from_name(name: &str) -> Option<BlendMode> {
        Self::all().iter().copied().find(|m| m.name().eq_ignore_ascii_case(name))
    }

    /// Composite one straight-alpha `top` pixel over `base`.
    pub fn blend_pixel(self, base: [u8; 4], top: [u8; 4]) -> [u8; 4] {
        match self {
            BlendMode::Copy => return top,
            BlendMode::DestinationOut => {
                let keep = 1.0 - top[3] as f32 / 255.0;
                return [base[0], base[1], base[2], (base[3] as f32 * keep).round() as u8];
            }
            _ => {}
        }

        // Fast paths: nothing to draw, or an opaque pixel replacing the base
        if top[3] == 0 {
            return base;
        }
        if self == BlendMode::SourceOver && top[3] == 255 {
            return top;
        }

        let ba = base[3] as f32 / 255.0;
        let ta = top[3] as f32 / 255.0;
        let bc = [base[0] as f32 / 255.0, base[1] as f32 / 255.0, base[2] as f32 / 255.0];
        let tc = [top[0] as f32 / 255.0, top[1] as f32 / 255.0, top[2] as f32 / 255.0];

        let to_u8 = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;

        match self {
            BlendMode::Xor => {
                let out_a = ba * (1.0 - ta) + ta * (1.0 - ba);
                if out_a <= 0.0 {
                    return [0, 0, 0, 0];
                }
                let ch = |c: usize| (bc[c] * ba * (1.0 - ta) + tc[c] * ta * (1.0 - ba)) / out_a;
                [to_u8(ch(0)), to_u8(ch(1)), to_u8(ch(2)), to_u8(out_a)]
            }
            BlendMode::Lighter => {
                let out_a = (ta + ba).min(1.0);
                if out_a <= 0.0 {
                    return [0, 0, 0, 0];
                }
                let ch = |c: usize| ((tc[c] * ta + bc[c] * ba) / out_a).min(1.0);
                [to_u8(ch(0)), to_u8(ch(1)), to_u8(ch(2)), to_u8(out_a)]
            }
            _ => {
                // Separable blend then source-over.
                let mix = |b: f32, t: f32| -> f32 {
                    match self {
                        BlendMode::Multiply => b * t,
                        BlendMode::Screen => 1.0 - (1.0 - b) * (1.0 - t),
                        BlendMode::Darken => b.min(t),
                        BlendMode::Lighten => b.max(t),
                        BlendMode::Difference => (b - t).abs(),
                        _ => t,
                    }
                };
                let out_a = ta + ba * (1.0 - ta);
                if out_a <= 0.0 {
                    return [0, 0, 0, 0];
                }
                let ch = |c: usize| {
                    let src = (1.0 - ba) * tc[c] + ba * mix(bc[c], tc[c]);
                    (src * ta + bc[c] * ba * (1.0 - ta)) / out_a
                };
                [to_u8(ch(0)), to_u8(ch(1)), to_u8(ch(2)), to_u8(out_a)]
            }
        }
    }
}

// ============================================================================
// Surface interface
// ============================================================================

/// A 2D raster target with a save/restore state stack.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Resize the backing buffer. Contents are cleared and the state stack
    /// reset, like assigning a canvas' width.
    fn set_size(&mut self, width: u32, height: u32);

    /// Make `rect` (device pixels) fully transparent.
    fn clear_rect(&mut self, rect: Rect);

    fn clear(&mut self) {
        let rect = Rect::new(0.0, 0.0, self.width() as f64, self.height() as f64);
        self.clear_rect(rect);
    }

    fn save(&mut self);
    fn restore(&mut self);
    fn transform(&self) -> Transform;
    fn set_transform(&mut self, transform: Transform);
    fn blend_mode(&self) -> BlendMode;
    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Draw `bitmap` scaled into `dest` (user space) through the current
    /// transform and composite mode.
    fn draw_bitmap(&mut self, bitmap: &RgbaImage, dest: Rect);

    /// Draw a single line of text anchored at `(x, y)` per `style`.
    fn fill_text(&mut self, text: &str, font: &FontSpec, x: f64, y: f64, style: &TextStyle);

    fn measure_text(&self, text: &str, font: &FontSpec) -> f64;

    /// Outline `rect` with a stroke of `line_width` centered on its edges.
    fn stroke_rect(&mut self, rect: Rect, color: [u8; 4], line_width: f64);

    fn fill_circle(&mut self, center: Point, radius: f64, color: [u8; 4]);

    fn pixels(&self) -> &RgbaImage;
    fn pixels_mut(&mut self) -> &mut RgbaImage;
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct DrawState {
    transform: Transform,
    blend: BlendMode,
}

impl Default for DrawState {
    fn default() -> Self {
        Self { transform: Transform::IDENTITY, blend: BlendMode::SourceOver }
    }
}

/// CPU surface backed by an `RgbaImage`.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixels: RgbaImage,
    state: DrawState,
    stack: Vec<DrawState>,
    fonts: FontBook,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32, fonts: FontBook) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
            state: DrawState::default(),
            stack: Vec::new(),
            fonts,
        }
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    /// Blend `color` into every device pixel whose center, mapped back to
    /// user space, satisfies `inside`. `region` bounds the user-space area.
    fn fill_where<F>(&mut self, region: Rect, color: [u8; 4], inside: F)
    where
        F: Fn(Point) -> bool + Sync,
    {
        let transform = self.state.transform;
        let Some(inv) = transform.invert() else {
            return;
        };
        let (w, h) = self.pixels.dimensions();
        let Some((x0, y0, x1, y1)) = region.transformed_bounds(&transform).pixel_span(w, h) else {
            return;
        };
        let mode = self.state.blend;
        let row_bytes = w as usize * 4;
        let raw: &mut [u8] = self.pixels.as_mut();

        raw.par_chunks_mut(row_bytes)
            .enumerate()
            .skip(y0 as usize)
            .take((y1 - y0) as usize)
            .for_each(|(py, row)| {
                for px in x0 as usize..x1 as usize {
                    let u = inv.apply(Point::new(px as f64 + 0.5, py as f64 + 0.5));
                    if !inside(u) {
                        continue;
                    }
                    let i = px * 4;
                    let base = [row[i], row[i + 1], row[i + 2], row[i + 3]];
                    row[i..i + 4].copy_from_slice(&mode.blend_pixel(base, color));
                }
            });
    }
}

impl Surface for RasterSurface {
    fn width(&self) -> u32 {
        self.pixels.width()
    }

    fn height(&self) -> u32 {
        self.pixels.height()
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.pixels = RgbaImage::new(width, height);
        self.state = DrawState::default();
        self.stack.clear();
    }

    fn clear_rect(&mut self, rect: Rect) {
        let (w, h) = self.pixels.dimensions();
        let Some((x0, y0, x1, y1)) = rect.pixel_span(w, h) else {
            return;
        };
        if x0 == 0 && y0 == 0 && x1 == w && y1 == h {
            self.pixels.as_mut().fill(0);
            return;
        }
        for y in y0..y1 {
            for x in x0..x1 {
                self.pixels.put_pixel(x, y, Rgba([0, 0, 0, 0]));
            }
        }
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn transform(&self) -> Transform {
        self.state.transform
    }

    fn set_transform(&mut self, transform: Transform) {
        self.state.transform = transform;
    }

    fn blend_mode(&self) -> BlendMode {
        self.state.blend
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.blend = mode;
    }

    fn draw_bitmap(&mut self, bitmap: &RgbaImage, dest: Rect) {
        if bitmap.width() == 0 || bitmap.height() == 0 || dest.width <= 0.0 || dest.height <= 0.0 {
            return;
        }
        let transform = self.state.transform;
        let Some(inv) = transform.invert() else {
            return;
        };
        let (w, h) = self.pixels.dimensions();
        let Some((x0, y0, x1, y1)) = dest.transformed_bounds(&transform).pixel_span(w, h) else {
            return;
        };

        let scale_x = bitmap.width() as f64 / dest.width;
        let scale_y = bitmap.height() as f64 / dest.height;
        let mode = self.state.blend;
        let row_bytes = w as usize * 4;
        let raw: &mut [u8] = self.pixels.as_mut();

        raw.par_chunks_mut(row_bytes)
            .enumerate()
            .skip(y0 as usize)
            .take((y1 - y0) as usize)
            .for_each(|(py, row)| {
                for px in x0 as usize..x1 as usize {
                    let u = inv.apply(Point::new(px as f64 + 0.5, py as f64 + 0.5));
                    if u.x < dest.x || u.x >= dest.right() || u.y < dest.y || u.y >= dest.bottom() {
                        continue;
                    }
                    let sx = ((u.x - dest.x) * scale_x - 0.5) as f32;
                    let sy = ((u.y - dest.y) * scale_y - 0.5) as f32;
                    let top = bilinear_sample(bitmap, sx, sy);
                    let i = px * 4;
                    let base = [row[i], row[i + 1], row[i + 2], row[i + 3]];
                    row[i..i + 4].copy_from_slice(&mode.blend_pixel(base, top));
                }
            });
    }

    fn fill_text(&mut self, text: &str, font: &FontSpec, x: f64, y: f64, style: &TextStyle) {
        let Some(face) = self.fonts.resolve(font.primary_family()) else {
            return;
        };
        let Some(run) = rasterize_text(&face, text, font.size_px as f32, style.color) else {
            return;
        };
        let (ox, oy) = placement_offset(style, run.width, run.ascent, run.descent);
        let dest = Rect::new(
            x + (ox + run.left) as f64,
            y + (oy + run.top) as f64,
            run.image.width() as f64,
            run.image.height() as f64,
        );
        self.draw_bitmap(&run.image, dest);
    }

    fn measure_text(&self, text: &str, font: &FontSpec) -> f64 {
        self.fonts.measure(text, font)
    }

    fn stroke_rect(&mut self, rect: Rect, color: [u8; 4], line_width: f64) {
        let half = line_width / 2.0;
        let outer = rect.inflate(half);
        let inner = rect.inflate(-half);
        self.fill_where(outer, color, |p| {
            let in_outer = p.x >= outer.x && p.x < outer.right() && p.y >= outer.y && p.y < outer.bottom();
            let in_inner = inner.width > 0.0
                && inner.height > 0.0
                && p.x >= inner.x
                && p.x < inner.right()
                && p.y >= inner.y
                && p.y < inner.bottom();
            in_outer && !in_inner
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: [u8; 4]) {
        let region = Rect::centered(center.x, center.y, radius * 2.0, radius * 2.0);
        let r2 = radius * radius;
        self.fill_where(region, color, |p| {
            let (dx, dy) = (p.x - center.x, p.y - center.y);
            dx * dx + dy * dy <= r2
        });
    }

    fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    fn pixels_mut(&mut self) -> &mut RgbaImage {
        &mut self.pixels
    }
}

// ============================================================================
// Surface pair
// ============================================================================

/// The two render targets: a transient workspace and the persistent display.
#[derive(Debug, Clone)]
pub struct Surfaces<S: Surface = RasterSurface> {
    pub workspace: S,
    pub display: S,
}

impl Surfaces<RasterSurface> {
    /// Two surfaces of the same size sharing one font book.
    pub fn raster(width: u32, height: u32, fonts: &FontBook) -> Self {
        Self {
            workspace: RasterSurface::new(width, height, fonts.clone()),
            display: RasterSurface::new(width, height, fonts.clone()),
        }
    }
}

impl<S: Surface> Surfaces<S> {
    pub fn get_mut(&mut self, context: Context) -> &mut S {
        match context {
            Context::Workspace => &mut self.workspace,
            Context::Display => &mut self.display,
        }
    }

    /// Resize both surfaces, clearing them.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.workspace.set_size(width, height);
        self.display.set_size(width, height);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.display.width(), self.display.height())
    }

    /// Composite the workspace onto the display, then clear the workspace.
    pub fn flush_workspace(&mut self) {
        let rect = Rect::new(0.0, 0.0, self.workspace.width() as f64, self.workspace.height() as f64);
        self.display.save();
        self.display.set_transform(Transform::IDENTITY);
        self.display.set_blend_mode(BlendMode::SourceOver);
        self.display.draw_bitmap(self.workspace.pixels(), rect);
        self.display.restore();
        self.workspace.clear();
    }
}
