use ab_glyph::{point, Font, FontArc, GlyphId, PxScale, ScaleFont};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

#[cfg(test)]
#[path = "text_test.rs"]
mod text_test;

/// Families tried, in order, when a requested family cannot be found.
#[cfg(target_os = "linux")]
const FALLBACK_FAMILIES: &[&str] = &["DejaVu Sans", "Liberation Sans"];
#[cfg(not(target_os = "linux"))]
const FALLBACK_FAMILIES: &[&str] = &["Arial", "Helvetica"];

// ============================================================================
// Font descriptor
// ============================================================================

/// A CSS-like font descriptor such as `30px Arial`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FontSpec {
    pub size_px: f64,
    /// Everything after the size token, kept verbatim.
    pub family: String,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid font descriptor {0:?}, expected \"<size>px <family>\"")]
pub struct FontSpecError(pub String);

impl FontSpec {
    pub fn new(size_px: f64, family: impl Into<String>) -> Self {
        Self { size_px, family: family.into() }
    }

    /// Same family at a different size.
    pub fn with_size(&self, size_px: f64) -> Self {
        Self { size_px, family: self.family.clone() }
    }

    /// Same size with a different family.
    pub fn with_family(&self, family: impl Into<String>) -> Self {
        Self { size_px: self.size_px, family: family.into() }
    }

    /// First family of a comma-separated list, unquoted.
    pub fn primary_family(&self) -> &str {
        self.family
            .split(',')
            .next()
            .unwrap_or_default()
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::new(30.0, "Arial")
    }
}

impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px {}", self.size_px, self.family)
    }
}

impl FromStr for FontSpec {
    type Err = FontSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (size, family) = s
            .trim()
            .split_once("px")
            .ok_or_else(|| FontSpecError(s.to_string()))?;
        let size_px: f64 = size.trim().parse().map_err(|_| FontSpecError(s.to_string()))?;
        let family = family.trim();
        if family.is_empty() || !size_px.is_finite() || size_px < 0.0 {
            return Err(FontSpecError(s.to_string()));
        }
        Ok(Self::new(size_px, family))
    }
}

impl TryFrom<String> for FontSpec {
    type Error = FontSpecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FontSpec> for String {
    fn from(value: FontSpec) -> Self {
        value.to_string()
    }
}

// ============================================================================
// Canvas-style text placement
// ============================================================================

/// Horizontal anchor of the text run relative to the draw position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextAlignment {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical anchor of the text run relative to the draw position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextBaseline {
    Top,
    #[default]
    Middle,
    Alphabetic,
    Bottom,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub align: TextAlignment,
    pub baseline: TextBaseline,
    pub color: [u8; 4],
}

impl TextStyle {
    /// Centered on both axes, the way items place their text.
    pub fn centered(color: [u8; 4]) -> Self {
        Self { align: TextAlignment::Center, baseline: TextBaseline::Middle, color }
    }
}

/// Scale for an em size in pixels. ab_glyph scales by line height, canvas
/// fonts by em.
fn em_scale(font: &FontArc, size_px: f32) -> PxScale {
    let upem = font.units_per_em().unwrap_or(1.0);
    PxScale::from(size_px * font.height_unscaled() / upem)
}

/// Lay out a single line of text, left-aligned at x = 0.
/// Returns `(glyphs, total_width, ascent, descent)`.
pub fn layout_text(
    font: &FontArc,
    text: &str,
    size_px: f32,
) -> (Vec<(GlyphId, f32)>, f32, f32, f32) {
    let scaled = font.as_scaled(em_scale(font, size_px));
    let mut glyphs = Vec::with_capacity(text.len());
    let mut cursor_x = 0.0f32;
    let mut last_glyph: Option<GlyphId> = None;

    for ch in text.chars() {
        let glyph_id = font.glyph_id(ch);
        if let Some(prev) = last_glyph {
            cursor_x += scaled.kern(prev, glyph_id);
        }
        glyphs.push((glyph_id, cursor_x));
        cursor_x += scaled.h_advance(glyph_id);
        last_glyph = Some(glyph_id);
    }

    (glyphs, cursor_x, scaled.ascent(), scaled.descent())
}

/// A rasterized run plus where its top-left sits relative to the text
/// start on the baseline.
pub struct RasterizedText {
    pub image: RgbaImage,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub ascent: f32,
    pub descent: f32,
}

/// Largest coverage buffer a text run may allocate, in pixels.
pub const MAX_TEXT_PIXELS: usize = 1 << 24;

/// Rasterize one line of text into a tightly padded RGBA buffer.
///
/// Returns `None` for empty runs and for runs whose buffer would exceed
/// [`MAX_TEXT_PIXELS`].
pub fn rasterize_text(font: &FontArc, text: &str, size_px: f32, color: [u8; 4]) -> Option<RasterizedText> {
    const PAD: f32 = 2.0;

    let scale = em_scale(font, size_px);
    let (glyphs, width, ascent, descent) = layout_text(font, text, size_px);
    let buf_w = (width + 2.0 * PAD).ceil();
    let buf_h = (ascent - descent + 2.0 * PAD).ceil();
    if glyphs.is_empty() || !(buf_w >= 1.0 && buf_h >= 1.0) || buf_w > u32::MAX as f32 || buf_h > u32::MAX as f32 {
        return None;
    }
    let (buf_w, buf_h) = (buf_w as usize, buf_h as usize);
    let len = buf_w.checked_mul(buf_h).filter(|&n| n <= MAX_TEXT_PIXELS)?;

    let mut coverage = vec![0.0f32; len];
    for (id, x) in glyphs {
        let glyph = id.with_scale_and_position(scale, point(x + PAD, ascent + PAD));
        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, c| {
            let px = bounds.min.x as i64 + gx as i64;
            let py = bounds.min.y as i64 + gy as i64;
            if px < 0 || py < 0 || px >= buf_w as i64 || py >= buf_h as i64 {
                return;
            }
            let idx = py as usize * buf_w + px as usize;
            coverage[idx] = (coverage[idx] + c).min(1.0);
        });
    }

    let image = RgbaImage::from_fn(buf_w as u32, buf_h as u32, |x, y| {
        let c = coverage[y as usize * buf_w + x as usize];
        let a = (color[3] as f32 * c).round().clamp(0.0, 255.0) as u8;
        image::Rgba([color[0], color[1], color[2], a])
    });

    Some(RasterizedText { image, left: -PAD, top: -(ascent + PAD), width, ascent, descent })
}

/// Offset from the draw position to the start of the run on the baseline.
pub fn placement_offset(style: &TextStyle, width: f32, ascent: f32, descent: f32) -> (f32, f32) {
    let x = match style.align {
        TextAlignment::Left => 0.0,
        TextAlignment::Center => -width * 0.5,
        TextAlignment::Right => -width,
    };
    let y = match style.baseline {
        TextBaseline::Top => ascent,
        TextBaseline::Middle => (ascent + descent) * 0.5,
        TextBaseline::Alphabetic => 0.0,
        TextBaseline::Bottom => descent,
    };
    (x, y)
}

// ============================================================================
// Font book
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("failed to read font file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid font data for {0}")]
    Invalid(String),
}

#[derive(Default)]
struct FontCache {
    registered: HashMap<String, FontArc>,
    resolved: HashMap<String, Option<FontArc>>,
}

/// Shared, cached family → font resolution.
///
/// Cloning is cheap and clones share the cache, so both surfaces resolve
/// fonts once.
#[derive(Clone, Default)]
pub struct FontBook {
    cache: Arc<Mutex<FontCache>>,
}

impl fmt::Debug for FontBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontBook").finish_non_exhaustive()
    }
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `bytes` available under `family`, ahead of any system font.
    pub fn register(&self, family: &str, bytes: Vec<u8>) -> Result<(), FontError> {
        let font = FontArc::try_from_vec(bytes).map_err(|_| FontError::Invalid(family.to_string()))?;
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let key = family.to_lowercase();
        cache.resolved.clear();
        cache.registered.insert(key, font);
        Ok(())
    }

    /// Register a font file under its file stem. Returns the family name used.
    pub fn register_file(&self, path: &Path) -> Result<String, FontError> {
        let bytes = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let family = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        self.register(&family, bytes)?;
        tracing::info!(family = %family, path = %path.display(), "registered font");
        Ok(family)
    }

    /// Resolve `family`: registered fonts, then the system, then fallbacks.
    pub fn resolve(&self, family: &str) -> Option<FontArc> {
        let key = family.to_lowercase();
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(font) = cache.registered.get(&key) {
            return Some(font.clone());
        }
        if let Some(hit) = cache.resolved.get(&key) {
            return hit.clone();
        }

        let found = load_system_font(family)
            .or_else(|| FALLBACK_FAMILIES.iter().find_map(|f| load_system_font(f)))
            .or_else(|| {
                // Deterministic pick among registered fonts.
                let mut keys: Vec<&String> = cache.registered.keys().collect();
                keys.sort();
                keys.first().and_then(|k| cache.registered.get(*k).cloned())
            });
        if found.is_none() {
            tracing::warn!(family = %family, "no font available; text will not be drawn");
        }
        cache.resolved.insert(key, found.clone());
        found
    }

    /// Advance width of `text` in pixels, 0 when no font resolves.
    pub fn measure(&self, text: &str, font: &FontSpec) -> f64 {
        match self.resolve(font.primary_family()) {
            Some(face) => layout_text(&face, text, font.size_px as f32).1 as f64,
            None => 0.0,
        }
    }
}

/// Load a regular-weight font by family name from the system.
#[cfg(feature = "system-fonts")]
pub fn load_system_font(family: &str) -> Option<FontArc> {
    use font_kit::family_name::FamilyName;
    use font_kit::properties::Properties;
    use font_kit::source::SystemSource;

    let source = SystemSource::new();
    let handle = source
        .select_best_match(&[FamilyName::Title(family.to_string())], &Properties::new())
        .ok()?;

    let font_data = handle.load().ok()?;
    let bytes: Vec<u8> = (*font_data.copy_font_data()?).clone();
    FontArc::try_from_vec(bytes).ok()
}

#[cfg(not(feature = "system-fonts"))]
pub fn load_system_font(_family: &str) -> Option<FontArc> {
    None
}
