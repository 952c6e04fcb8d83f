use crate::constants::{STRIPPED_PREFIX, STRIP_JPEG_QUALITY};
use crate::error::{Result, ScrubError};
use crate::formats::InputFormat;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, GenericImageView, ImageReader, ImageResult};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// A freshly written copy of an image that carries pixels and nothing else.
#[derive(Debug)]
pub struct StrippedImage {
    pub path: PathBuf,
    pub original_size: u64,
    pub stripped_size: u64,
    /// Set when the original was meant to be deleted and could not be.
    pub warning: Option<ScrubError>,
}

/// Builds `{dir}/_{stem}{.ext}` for a source path. The extension keeps its
/// original spelling and case.
pub fn stripped_path(source: &Path) -> Result<PathBuf> {
    let stem = source
        .file_stem()
        .ok_or_else(|| ScrubError::InvalidFileName(source.to_path_buf()))?;

    let mut name = OsString::from(STRIPPED_PREFIX);
    name.push(stem);
    if let Some(ext) = source.extension() {
        name.push(".");
        name.push(ext);
    }

    Ok(source.with_file_name(name))
}

/// Decodes an image, sniffing the container from its content rather than
/// trusting the extension.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    ImageReader::open(path)
        .map_err(|e| ScrubError::decode(path, e))?
        .with_guessed_format()
        .map_err(|e| ScrubError::decode(path, e))?
        .decode()
        .map_err(|e| ScrubError::decode(path, e))
}

/// Copies the pixel grid into a new 8-bit buffer of the same dimensions.
///
/// Nothing from the source container survives this step: EXIF, ICC profiles,
/// orientation tags and comments live outside the pixel data. Alpha is kept
/// only when requested and present.
pub fn rebuild_pixels(img: &DynamicImage, keep_alpha: bool) -> DynamicImage {
    if keep_alpha && img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    }
}

pub fn save_stripped(img: &DynamicImage, path: &Path, format: InputFormat) -> Result<()> {
    let file = File::create(path).map_err(|e| ScrubError::encode(path, e))?;

    let written = write_encoded(img, file, format).map_err(|e| ScrubError::encode(path, e));
    if written.is_err() {
        // Don't leave a truncated file behind
        let _ = fs::remove_file(path);
    }
    written
}

fn write_encoded(img: &DynamicImage, file: File, format: InputFormat) -> ImageResult<()> {
    let mut writer = BufWriter::new(file);
    match format {
        InputFormat::Jpeg => {
            img.write_with_encoder(JpegEncoder::new_with_quality(&mut writer, STRIP_JPEG_QUALITY))?
        }
        InputFormat::WebP => img.write_with_encoder(WebPEncoder::new_lossless(&mut writer))?,
    }
    writer.flush()?;
    Ok(())
}

/// Size of a file this run just wrote.
pub(crate) fn written_size(path: &Path) -> Result<u64> {
    fs::metadata(path)
        .map(|metadata| metadata.len())
        .map_err(|e| ScrubError::encode(path, e))
}

/// Strips all metadata from `source` by decoding it and re-encoding the bare
/// pixels into `_{stem}{.ext}` next to it.
///
/// When `delete_original` is set the source is removed, but only after the
/// stripped copy has been written. A failed removal is returned as a warning
/// on the result rather than as an error.
pub fn strip_metadata(source: &Path, delete_original: bool) -> Result<StrippedImage> {
    let format = InputFormat::from_path(source)
        .ok_or_else(|| ScrubError::decode(source, "unsupported file extension"))?;
    let target = stripped_path(source)?;

    let original_size = fs::metadata(source)
        .map_err(|e| ScrubError::decode(source, e))?
        .len();

    let img = load_image(source)?;
    let (width, height) = img.dimensions();
    crate::verbose!(
        "Decoded {} ({}x{}, {:?})",
        source.display(),
        width,
        height,
        img.color()
    );

    let pixels = rebuild_pixels(&img, format.supports_alpha());
    drop(img);
    save_stripped(&pixels, &target, format)?;

    let stripped_size = written_size(&target)?;
    crate::verbose!("Stripped copy written to {}", target.display());

    let warning = if delete_original {
        fs::remove_file(source)
            .err()
            .map(|source_err| ScrubError::FileDeletion {
                path: source.to_path_buf(),
                source: source_err,
            })
    } else {
        None
    };

    Ok(StrippedImage {
        path: target,
        original_size,
        stripped_size,
        warning,
    })
}
