//! Reference image inputs.
//!
//! The endpoints accept either remote URLs or inline `data:` URIs. Local
//! files are inlined as base64 data URIs.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;

use crate::error::{Result, SeedreamError};

/// Trims entries and drops the blank ones, keeping order.
pub fn normalize_images<S: AsRef<str>>(images: &[S]) -> Vec<String> {
    images
        .iter()
        .map(|image| image.as_ref().trim())
        .filter(|image| !image.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn is_inline_or_remote(reference: &str) -> bool {
    let lower = reference.trim_start().to_ascii_lowercase();
    lower.starts_with("data:") || lower.starts_with("http://") || lower.starts_with("https://")
}

/// MIME type for image file extensions the endpoints accept.
pub fn image_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => return None,
    };
    Some(mime)
}

/// Reads an image file and returns it as a `data:` URI.
pub fn load_data_uri(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let mime = image_mime_type(path)
        .ok_or_else(|| SeedreamError::UnsupportedImage(path.display().to_string()))?;

    let bytes = std::fs::read(path)
        .map_err(|e| SeedreamError::Io(format!("{}: {}", path.display(), e)))?;

    log::debug!(
        "Inlined reference image {} ({} bytes, {})",
        path.display(),
        bytes.len(),
        mime
    );

    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

/// URLs and data URIs pass through; anything else is treated as a local path.
pub fn resolve_reference(reference: &str) -> Result<String> {
    let reference = reference.trim();
    if is_inline_or_remote(reference) {
        Ok(reference.to_string())
    } else {
        load_data_uri(reference)
    }
}
