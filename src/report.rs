use crate::constants::{INFO_PREFIX, SIZE_PREFIX, SUCCESS_PREFIX, WARNING_PREFIX};
use crate::error::ScrubError;
use crate::utils::{calculate_size_reduction, format_file_size};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A source file that made it through every requested step.
#[derive(Debug)]
pub struct ProcessedFile {
    pub source: PathBuf,
    pub stripped: PathBuf,
    pub converted: Option<PathBuf>,
    pub original_size: u64,
    pub output_size: u64,
    pub warnings: Vec<ScrubError>,
}

impl ProcessedFile {
    /// The file this source ended up as: the WebP when converted, otherwise
    /// the stripped copy.
    pub fn output(&self) -> &Path {
        self.converted.as_deref().unwrap_or(&self.stripped)
    }

    /// `photo.jpg -> _photo.webp (1.2 MB -> 640.0 KB)`
    pub fn describe(&self) -> String {
        format!(
            "{} -> {} ({} -> {})",
            self.source.display(),
            self.output().display(),
            format_file_size(self.original_size),
            format_file_size(self.output_size)
        )
    }
}

/// A source file whose strip or conversion failed.
#[derive(Debug)]
pub struct FailedFile {
    pub source: PathBuf,
    pub error: ScrubError,
    pub warnings: Vec<ScrubError>,
}

pub type FileOutcome = std::result::Result<ProcessedFile, FailedFile>;

/// In-memory summary of one batch run, in directory-listing order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<ProcessedFile>,
    pub failed: Vec<FailedFile>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = FileOutcome>, elapsed: Duration) -> Self {
        let mut report = BatchReport {
            elapsed,
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                Ok(processed) => report.succeeded.push(processed),
                Err(failed) => report.failed.push(failed),
            }
        }
        report
    }

    pub fn processed_count(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn succeeded_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn output_paths(&self) -> impl Iterator<Item = &Path> {
        self.succeeded.iter().map(ProcessedFile::output)
    }

    /// Deletion warnings from every file, failed or not.
    pub fn warnings(&self) -> impl Iterator<Item = (&Path, &ScrubError)> {
        let from_succeeded = self
            .succeeded
            .iter()
            .flat_map(|f| f.warnings.iter().map(move |w| (f.source.as_path(), w)));
        let from_failed = self
            .failed
            .iter()
            .flat_map(|f| f.warnings.iter().map(move |w| (f.source.as_path(), w)));
        from_succeeded.chain(from_failed)
    }

    pub fn total_original_size(&self) -> u64 {
        self.succeeded.iter().map(|f| f.original_size).sum()
    }

    pub fn total_output_size(&self) -> u64 {
        self.succeeded.iter().map(|f| f.output_size).sum()
    }

    pub fn print_summary(&self) {
        if self.processed_count() == 0 {
            crate::info!("{}  No .jpg, .jpeg or .webp files found", WARNING_PREFIX);
            return;
        }

        let before = self.total_original_size();
        let after = self.total_output_size();

        crate::info!("\n{} Scrub Summary:", SIZE_PREFIX);
        crate::info!("  📁 Files processed: {}", self.processed_count());
        crate::info!("  {} Succeeded: {}", SUCCESS_PREFIX, self.succeeded_count());
        crate::info!("  ❌ Failed: {}", self.failed_count());
        crate::info!(
            "  {} Size: {} -> {} ({:.1}% smaller)",
            SIZE_PREFIX,
            format_file_size(before),
            format_file_size(after),
            calculate_size_reduction(before, after)
        );
        crate::info!("  ⏱️  Total time: {:?}", self.elapsed);

        for processed in &self.succeeded {
            crate::verbose!("{}", processed.describe());
        }

        for (source, warning) in self.warnings() {
            crate::warn!("{}: {}", source.display(), warning);
        }

        if self.has_failures() {
            crate::error!("{} file(s) failed:", self.failed_count());
            for failed in &self.failed {
                crate::error!("  {}: {}", failed.source.display(), failed.error);
            }
        } else {
            crate::info!("{} All files scrubbed", INFO_PREFIX);
        }
    }
}
