pub const DEFAULT_QUALITY: u8 = 80;
pub const MIN_QUALITY: u8 = 0;
pub const MAX_QUALITY: u8 = 100;

/// JPEG quality used when re-encoding a stripped JPEG.
pub const STRIP_JPEG_QUALITY: u8 = 95;

/// Prepended to the base name of every stripped file.
pub const STRIPPED_PREFIX: &str = "_";

pub const JPEG_EXTENSIONS: &[&str] = &["jpg", "jpeg"];
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "webp"];
pub const CONVERTED_EXTENSION: &str = "webp";

pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";
pub const PROGRESS_BAR_CHARS: &str = "=>-";

// Common output message prefixes
pub const SUCCESS_PREFIX: &str = "✅";
pub const WARNING_PREFIX: &str = "⚠️";
pub const ERROR_PREFIX: &str = "❌";
pub const INFO_PREFIX: &str = "📋";
pub const VERBOSE_PREFIX: &str = "🔍";
pub const SIZE_PREFIX: &str = "📊";
