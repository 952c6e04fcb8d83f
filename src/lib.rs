pub mod batch;
pub mod cli;
pub mod config;
pub mod constants;
pub mod convert;
pub mod error;
pub mod formats;
pub mod interactive;
pub mod logger;
pub mod report;
pub mod strip;
pub mod utils;

#[cfg(test)]
#[path = "../tests/common/fixtures.rs"]
pub(crate) mod test_support;

pub use batch::{collect_image_files, process_directory, process_single_image};
pub use config::ScrubConfig;
pub use convert::{convert_to_webp, converted_path, ConvertedImage};
pub use error::{Result, ScrubError};
pub use formats::{is_image_file, is_jpeg_file, InputFormat};
pub use report::{BatchReport, FailedFile, ProcessedFile};
pub use strip::{strip_metadata, stripped_path, StrippedImage};
