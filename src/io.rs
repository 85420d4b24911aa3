// ============================================================================
// Image I/O: fetch + decode, PNG export
// ============================================================================

#[cfg(test)]
#[path = "io_test.rs"]
mod io_test;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use futures::future::try_join_all;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{ExportError, LoadError};

/// Where an image's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    /// `http://` or `https://` URL.
    Url(String),
    /// Local file.
    Path(PathBuf),
    /// `data:<mime>;base64,<payload>`.
    DataUrl(String),
    /// Bytes already in memory.
    Bytes(Vec<u8>),
}

impl ImageSource {
    /// Classify a user-supplied string.
    pub fn parse(s: &str) -> Self {
        let lower = s.trim_start().to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            ImageSource::Url(s.trim().to_string())
        } else if lower.starts_with("data:") {
            ImageSource::DataUrl(s.trim().to_string())
        } else {
            ImageSource::Path(PathBuf::from(s))
        }
    }

    /// Short description for logs.
    pub fn describe(&self) -> String {
        match self {
            ImageSource::Url(url) => url.clone(),
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::DataUrl(data) => format!("data URL ({} chars)", data.len()),
            ImageSource::Bytes(bytes) => format!("{} bytes", bytes.len()),
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Fetch the raw bytes behind `source`. Single-shot, no retry.
pub async fn fetch_bytes(source: &ImageSource) -> Result<Vec<u8>, LoadError> {
    match source {
        ImageSource::Url(url) => {
            let response = reqwest::get(url).await?;
            let status = response.status();
            if !status.is_success() {
                return Err(LoadError::Status { url: url.clone(), status: status.as_u16() });
            }
            Ok(response.bytes().await?.to_vec())
        }
        ImageSource::Path(path) => tokio::fs::read(path)
            .await
            .map_err(|source| LoadError::Io { path: path.clone(), source }),
        ImageSource::DataUrl(data) => decode_data_url(data),
        ImageSource::Bytes(bytes) => Ok(bytes.clone()),
    }
}

/// Payload of a base64 data URL.
pub fn decode_data_url(data: &str) -> Result<Vec<u8>, LoadError> {
    let (header, payload) = data
        .split_once(',')
        .ok_or_else(|| LoadError::DataUrl("missing ',' separator".to_string()))?;
    if !header.starts_with("data:") || !header.ends_with(";base64") {
        return Err(LoadError::DataUrl(format!("unsupported header {header:?}")));
    }
    BASE64_STANDARD
        .decode(payload.trim())
        .map_err(|e| LoadError::DataUrl(e.to_string()))
}

/// Decode image bytes into RGBA.
pub fn decode_bitmap(bytes: &[u8]) -> Result<RgbaImage, LoadError> {
    Ok(image::load_from_memory(bytes)?.into_rgba8())
}

/// Fetch and decode one image.
pub async fn load_bitmap(source: &ImageSource) -> Result<Arc<RgbaImage>, LoadError> {
    let bytes = fetch_bytes(source).await?;
    let bitmap = decode_bitmap(&bytes)?;
    tracing::debug!(
        source = %source.describe(),
        width = bitmap.width(),
        height = bitmap.height(),
        "decoded image"
    );
    Ok(Arc::new(bitmap))
}

/// Load every source concurrently. Either all succeed, in input order, or
/// the first failure is returned.
pub async fn load_all(sources: &[ImageSource]) -> Result<Vec<Arc<RgbaImage>>, LoadError> {
    try_join_all(sources.iter().map(|source| load_bitmap(source))).await
}

// ============================================================================
// Export
// ============================================================================

/// Encode RGBA pixels as PNG.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ColorType::Rgba8,
    )?;
    Ok(buf)
}

/// `data:image/png;base64,...` for `image`.
pub fn png_data_url(image: &RgbaImage) -> Result<String, ExportError> {
    let png = encode_png(image)?;
    Ok(format!("data:image/png;base64,{}", BASE64_STANDARD.encode(png)))
}

/// Encode and write a PNG file.
pub fn write_png(image: &RgbaImage, path: &Path) -> Result<(), ExportError> {
    let png = encode_png(image)?;
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&png)?;
    writer.flush()?;
    Ok(())
}
