//! Image format utilities and type-safe format handling
//!
//! Only the containers the scrubber accepts as input are modelled here:
//! JPEG (`.jpg`/`.jpeg`) and WebP. Extension matching is case-insensitive.

use crate::constants::{JPEG_EXTENSIONS, SUPPORTED_IMAGE_EXTENSIONS};
use std::fmt;
use std::path::Path;

/// Accepted input image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// JPEG, eligible for WebP conversion after stripping
    Jpeg,
    /// WebP, stripped only
    WebP,
}

impl InputFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(InputFormat::Jpeg),
            "webp" => Some(InputFormat::WebP),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn supports_alpha(&self) -> bool {
        matches!(self, InputFormat::WebP)
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputFormat::Jpeg => "JPEG",
            InputFormat::WebP => "WebP",
        };
        write!(f, "{}", name)
    }
}

fn extension_in(path: &Path, set: &[&str]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext_lower = ext.to_lowercase();
            set.contains(&ext_lower.as_str())
        })
        .unwrap_or(false)
}

/// Check if a file path carries one of the accepted image extensions
pub fn is_image_file(path: &Path) -> bool {
    extension_in(path, SUPPORTED_IMAGE_EXTENSIONS)
}

/// Check if a file path carries a JPEG extension (`.jpg` or `.jpeg`)
pub fn is_jpeg_file(path: &Path) -> bool {
    extension_in(path, JPEG_EXTENSIONS)
}
