use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrubError {
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Failed to decode {}: {reason}", path.display())]
    ImageDecode { path: PathBuf, reason: String },

    #[error("Failed to encode {}: {reason}", path.display())]
    ImageEncode { path: PathBuf, reason: String },

    #[error("Failed to delete {}: {source}", path.display())]
    FileDeletion {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "{} is already written by {} in this run",
        path.display(),
        claimed_by.display()
    )]
    OutputConflict { path: PathBuf, claimed_by: PathBuf },

    #[error("Invalid quality value: {0}. Must be between 0 and 100")]
    InvalidQuality(u8),

    #[error("Invalid file name: {}", .0.display())]
    InvalidFileName(PathBuf),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),
}

impl ScrubError {
    pub(crate) fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ScrubError::ImageDecode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn encode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ScrubError::ImageEncode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Deletion failures are reported as warnings, never as a failed file.
    pub fn is_warning(&self) -> bool {
        matches!(self, ScrubError::FileDeletion { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScrubError>;
