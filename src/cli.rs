use crate::config::ScrubConfig;
use crate::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "img-scrub",
    about = "Strip embedded metadata from the images in a directory",
    long_about = "img-scrub removes EXIF data, color profiles, orientation tags and comments from \
                  every .jpg, .jpeg and .webp file directly inside a directory by rebuilding each \
                  image from its pixels. Stripped copies are written next to the originals as \
                  _<name>.<ext>. JPEG files can additionally be converted to lossy WebP.",
    version,
    after_help = "EXAMPLES:\n  \
    img-scrub ./photos\n  \
    img-scrub ./photos --delete-original\n  \
    img-scrub ./photos -c -q 75 --keep-intermediate\n  \
    img-scrub            (prompts for every setting)"
)]
pub struct Args {
    #[arg(
        help = "Directory containing the images",
        long_help = "Directory containing the images. Only its direct children are processed. \
                     When omitted, every setting is asked for interactively."
    )]
    pub directory: Option<PathBuf>,

    #[arg(
        short = 'd',
        long,
        help = "Delete each original after its stripped copy is written"
    )]
    pub delete_original: bool,

    #[arg(short = 'c', long, help = "Convert stripped JPEG files to WebP")]
    pub convert: bool,

    #[arg(
        short = 'q',
        long,
        value_parser = clap::value_parser!(u8).range(0..=100),
        help = "WebP quality (0-100, default: 80)",
        long_help = "WebP quality from 0 (smallest) to 100 (best). Only used with --convert."
    )]
    pub quality: Option<u8>,

    #[arg(
        short = 'k',
        long,
        help = "Keep the stripped JPEG next to its WebP conversion",
        long_help = "By default the stripped _<name>.jpg is deleted once _<name>.webp has been \
                     written. With this flag both files are kept."
    )]
    pub keep_intermediate: bool,

    #[arg(
        short = 'j',
        long,
        help = "Number of worker threads (default: CPU cores)",
        long_help = "Number of files processed at the same time. Capped at the number of CPU cores."
    )]
    pub threads: Option<usize>,

    #[arg(long, help = "Only print errors")]
    pub quiet: bool,

    #[arg(short = 'v', long, help = "Print per-file details")]
    pub verbose: bool,
}

impl Args {
    /// Builds the run configuration from the flags, or `None` when no
    /// directory was given and the caller should prompt instead.
    pub fn to_config(&self) -> Result<Option<ScrubConfig>> {
        let Some(directory) = &self.directory else {
            return Ok(None);
        };

        let config = ScrubConfig::new(
            directory.clone(),
            self.delete_original,
            self.convert,
            self.quality,
        )?;
        Ok(Some(self.apply_run_options(config)))
    }

    /// Options that are never prompted for.
    pub fn apply_run_options(&self, config: ScrubConfig) -> ScrubConfig {
        config
            .with_keep_intermediate(self.keep_intermediate)
            .with_threads(self.threads)
    }
}
