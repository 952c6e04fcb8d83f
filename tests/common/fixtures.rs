//! Image fixtures. This file is compiled twice: as `img_scrub::test_support`
//! for the unit tests and as `common::fixtures` for the CLI tests.

#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::fs;
use std::io::Cursor;
use std::path::Path;

pub fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x * 7) ^ (y * 13)) as u8,
        ])
    }))
}

pub fn translucent(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        Rgba([x as u8, y as u8, 128, ((x + y) % 255 + 1) as u8])
    }))
}

pub fn write_image(path: &Path, img: &DynamicImage, format: ImageFormat) {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
    fs::write(path, bytes).unwrap();
}

/// Writes a JPEG carrying an EXIF segment and a comment right after SOI.
pub fn write_jpeg_with_metadata(path: &Path, width: u32, height: u32) {
    let mut encoded = Vec::new();
    gradient(width, height)
        .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Jpeg)
        .unwrap();

    let exif: &[u8] = b"Exif\0\0MM\0\x2a\0\0\0\x08\0\0\0\0\0\0";
    let comment: &[u8] = b"owner: jane doe, gps 48.8584N 2.2945E";

    let mut out = vec![0xFF, 0xD8];
    push_segment(&mut out, 0xE1, exif);
    push_segment(&mut out, 0xFE, comment);
    out.extend_from_slice(&encoded[2..]);
    fs::write(path, out).unwrap();
}

fn push_segment(out: &mut Vec<u8>, marker: u8, payload: &[u8]) {
    out.extend_from_slice(&[0xFF, marker]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(payload);
}

pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

/// Drops write permission on a directory until the guard goes away, so
/// files inside can still be rewritten but not removed. Returns `None` when
/// the current user bypasses permission bits (root in CI containers).
#[cfg(unix)]
pub fn lock_directory(dir: &Path) -> Option<DirectoryLock> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(dir, fs::Permissions::from_mode(0o555)).unwrap();
    let lock = DirectoryLock(dir.to_path_buf());

    let check = dir.join(".write_check");
    if fs::write(&check, b"").is_ok() {
        let _ = fs::remove_file(&check);
        return None;
    }
    Some(lock)
}

#[cfg(unix)]
pub struct DirectoryLock(std::path::PathBuf);

#[cfg(unix)]
impl Drop for DirectoryLock {
    fn drop(&mut self) {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(&self.0, fs::Permissions::from_mode(0o755));
    }
}
