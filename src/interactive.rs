use crate::config::{validate_quality, ScrubConfig};
use crate::constants::{DEFAULT_QUALITY, MAX_QUALITY, MIN_QUALITY};
use crate::error::{Result, ScrubError};
use dialoguer::{Confirm, Input};
use std::path::PathBuf;

fn prompt_error(e: dialoguer::Error) -> ScrubError {
    ScrubError::Prompt(e.to_string())
}

pub fn prompt_directory() -> Result<PathBuf> {
    Input::<String>::new()
        .with_prompt("Enter the directory path with images")
        .interact_text()
        .map(|input| PathBuf::from(input.trim()))
        .map_err(prompt_error)
}

pub fn prompt_delete_original() -> Result<bool> {
    Confirm::new()
        .with_prompt("Delete the original files after stripping?")
        .default(false)
        .interact()
        .map_err(prompt_error)
}

pub fn prompt_convert() -> Result<bool> {
    Confirm::new()
        .with_prompt("Convert JPEG files to WebP?")
        .default(false)
        .interact()
        .map_err(prompt_error)
}

pub fn prompt_quality() -> Result<u8> {
    Input::<u8>::new()
        .with_prompt(format!("WebP quality ({}-{})", MIN_QUALITY, MAX_QUALITY))
        .default(DEFAULT_QUALITY)
        .validate_with(|quality: &u8| -> std::result::Result<(), String> {
            validate_quality(*quality)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_error)
}

/// Asks for every setting a run needs, in the same order the questions are
/// answered on a terminal. The quality is only asked for when converting.
pub fn prompt_config() -> Result<ScrubConfig> {
    let directory = prompt_directory()?;
    let delete_original = prompt_delete_original()?;
    let convert = prompt_convert()?;
    let quality = if convert { Some(prompt_quality()?) } else { None };

    ScrubConfig::new(directory, delete_original, convert, quality)
}
