use crate::constants::{DEFAULT_QUALITY, MAX_QUALITY, MIN_QUALITY};
use crate::error::{Result, ScrubError};
use std::path::{Path, PathBuf};

/// Everything one batch run needs, fixed before the first file is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrubConfig {
    pub directory: PathBuf,
    pub delete_original: bool,
    /// WebP quality when conversion is enabled, `None` when it is not.
    pub convert: Option<u8>,
    pub keep_intermediate: bool,
    pub threads: Option<usize>,
}

impl ScrubConfig {
    pub fn new(
        directory: impl Into<PathBuf>,
        delete_original: bool,
        convert: bool,
        quality: Option<u8>,
    ) -> Result<Self> {
        let convert = if convert {
            Some(validate_quality(quality.unwrap_or(DEFAULT_QUALITY))?)
        } else {
            None
        };

        Ok(Self {
            directory: directory.into(),
            delete_original,
            convert,
            keep_intermediate: false,
            threads: None,
        })
    }

    pub fn with_keep_intermediate(mut self, keep: bool) -> Self {
        self.keep_intermediate = keep;
        self
    }

    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn quality(&self) -> Option<u8> {
        self.convert
    }
}

pub fn validate_quality(quality: u8) -> Result<u8> {
    if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
        return Err(ScrubError::InvalidQuality(quality));
    }
    Ok(quality)
}
