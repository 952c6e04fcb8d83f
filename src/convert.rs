use crate::config::validate_quality;
use crate::constants::CONVERTED_EXTENSION;
use crate::error::{Result, ScrubError};
use crate::formats::is_jpeg_file;
use crate::strip::load_image;
use image::DynamicImage;
use std::fs;
use std::path::{Path, PathBuf};
use webp::Encoder;

#[derive(Debug)]
pub struct ConvertedImage {
    pub path: PathBuf,
    pub size: u64,
    /// Set when the intermediate JPEG was meant to be deleted and could not be.
    pub warning: Option<ScrubError>,
}

/// `_photo.jpg` becomes `_photo.webp`; the JPEG extension is replaced, not
/// appended to.
pub fn converted_path(stripped: &Path) -> PathBuf {
    stripped.with_extension(CONVERTED_EXTENSION)
}

/// Lossy WebP encoding through libwebp. Alpha is carried over when present.
pub fn encode_webp(img: &DynamicImage, quality: u8) -> std::result::Result<Vec<u8>, String> {
    let quality = f32::from(quality);

    let encoded = if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        let encoder = Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height());
        encoder.encode_simple(false, quality).map(|memory| memory.to_vec())
    } else {
        let rgb = img.to_rgb8();
        let encoder = Encoder::from_rgb(rgb.as_raw(), rgb.width(), rgb.height());
        encoder.encode_simple(false, quality).map(|memory| memory.to_vec())
    };

    encoded.map_err(|e| format!("libwebp rejected the image: {:?}", e))
}

/// Re-encodes a stripped JPEG as lossy WebP at `quality` (0-100).
///
/// Unless `keep_intermediate` is set, the stripped JPEG is removed once the
/// WebP file is on disk; a failed removal comes back as a warning.
pub fn convert_to_webp(
    stripped: &Path,
    quality: u8,
    keep_intermediate: bool,
) -> Result<ConvertedImage> {
    let quality = validate_quality(quality)?;
    if !is_jpeg_file(stripped) {
        return Err(ScrubError::decode(
            stripped,
            "only JPEG files are converted to WebP",
        ));
    }

    let img = load_image(stripped)?;
    let bytes = encode_webp(&img, quality).map_err(|reason| ScrubError::encode(stripped, reason))?;
    drop(img);

    let target = converted_path(stripped);
    if let Err(e) = fs::write(&target, &bytes) {
        let _ = fs::remove_file(&target);
        return Err(ScrubError::encode(&target, e));
    }
    crate::verbose!(
        "Converted {} to {} at quality {}",
        stripped.display(),
        target.display(),
        quality
    );

    let warning = if keep_intermediate {
        None
    } else {
        fs::remove_file(stripped)
            .err()
            .map(|source| ScrubError::FileDeletion {
                path: stripped.to_path_buf(),
                source,
            })
    };

    Ok(ConvertedImage {
        path: target,
        size: bytes.len() as u64,
        warning,
    })
}
