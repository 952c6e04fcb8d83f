use crate::config::ScrubConfig;
use crate::convert::{convert_to_webp, converted_path};
use crate::error::{Result, ScrubError};
use crate::formats::{is_image_file, is_jpeg_file};
use crate::report::{BatchReport, FailedFile, FileOutcome, ProcessedFile};
use crate::strip::{strip_metadata, stripped_path};
use crate::utils::create_progress_bar;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

/// Lists the direct children of `directory` that are regular files with an
/// accepted image extension, sorted by file name. Subdirectories are never
/// entered.
pub fn collect_image_files(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut image_files = Vec::new();

    let walker = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry?;
        let path = entry.path();

        if path.is_file() && is_image_file(path) {
            image_files.push(path.to_path_buf());
        }
    }

    Ok(image_files)
}

/// Worker count for the batch pool: the requested count, capped at the
/// number of CPU cores, never below one.
pub fn worker_count(requested: Option<usize>) -> usize {
    let cores = num_cpus::get().max(1);
    requested.unwrap_or(cores).clamp(1, cores)
}

/// Files a pipeline writes: the stripped copy, plus the WebP when the file
/// will be converted. The intermediate counts even when it is deleted later.
fn planned_outputs(source: &Path, config: &ScrubConfig) -> Vec<PathBuf> {
    let Ok(stripped) = stripped_path(source) else {
        return Vec::new();
    };
    let mut outputs = Vec::with_capacity(2);
    if config.convert.is_some() && is_jpeg_file(&stripped) {
        outputs.push(converted_path(&stripped));
    }
    outputs.push(stripped);
    outputs
}

/// Hands every output path to the first file in listing order that writes
/// it. A later file that would write a claimed path gets a conflict back and
/// must not run at all: `photo.jpg` converted and `photo.webp` stripped both
/// produce `_photo.webp`, as do `photo.jpeg` and `photo.jpg` when converting.
fn find_output_conflicts(files: &[PathBuf], config: &ScrubConfig) -> Vec<Option<ScrubError>> {
    let mut claimed: HashMap<PathBuf, usize> = HashMap::new();

    files
        .iter()
        .enumerate()
        .map(|(index, source)| {
            let outputs = planned_outputs(source, config);
            if let Some((path, &owner)) = outputs
                .iter()
                .find_map(|path| claimed.get(path).map(|owner| (path, owner)))
            {
                return Some(ScrubError::OutputConflict {
                    path: path.clone(),
                    claimed_by: files[owner].clone(),
                });
            }
            for path in outputs {
                claimed.insert(path, index);
            }
            None
        })
        .collect()
}

/// Splits the runnable file indices into those that can run in parallel and
/// those whose output is another file's input (`photo.jpg` writes
/// `_photo.jpg`, which is itself in the listing). The second group is meant
/// to run sequentially in the returned order.
fn partition_by_shared_paths(
    files: &[PathBuf],
    runnable: &[usize],
    config: &ScrubConfig,
) -> (Vec<usize>, Vec<usize>) {
    let inputs: HashSet<&Path> = runnable.iter().map(|&i| files[i].as_path()).collect();
    let written: HashSet<PathBuf> = runnable
        .iter()
        .flat_map(|&i| planned_outputs(&files[i], config))
        .collect();

    let (independent, shared): (Vec<usize>, Vec<usize>) =
        runnable.iter().copied().partition(|&index| {
            !written.contains(&files[index])
                && planned_outputs(&files[index], config)
                    .iter()
                    .all(|output| !inputs.contains(output.as_path()))
        });
    (independent, readers_first(files, shared, config))
}

/// Orders files so each one runs before the file that rewrites its input,
/// keeping listing order otherwise. An output name is always longer than its
/// input name, so the writes never form a cycle.
fn readers_first(files: &[PathBuf], mut pending: Vec<usize>, config: &ScrubConfig) -> Vec<usize> {
    let mut ordered = Vec::with_capacity(pending.len());
    while !pending.is_empty() {
        let ready = pending.iter().position(|&writer| {
            let outputs = planned_outputs(&files[writer], config);
            !pending
                .iter()
                .any(|&reader| reader != writer && outputs.contains(&files[reader]))
        });
        ordered.push(pending.remove(ready.unwrap_or(0)));
    }
    ordered
}

/// Runs the strip and optional conversion for one file. Errors stay local to
/// the file and come back as a `FailedFile`.
pub fn process_single_image(source: &Path, config: &ScrubConfig) -> FileOutcome {
    let fail = |error: ScrubError, warnings: Vec<ScrubError>| FailedFile {
        source: source.to_path_buf(),
        error,
        warnings,
    };

    let stripped = strip_metadata(source, config.delete_original).map_err(|e| fail(e, Vec::new()))?;
    let mut warnings: Vec<ScrubError> = stripped.warning.into_iter().collect();
    let mut output_size = stripped.stripped_size;
    let mut converted = None;

    if let Some(quality) = config.convert {
        if is_jpeg_file(&stripped.path) {
            match convert_to_webp(&stripped.path, quality, config.keep_intermediate) {
                Ok(webp) => {
                    warnings.extend(webp.warning);
                    output_size = webp.size;
                    converted = Some(webp.path);
                }
                Err(e) => return Err(fail(e, warnings)),
            }
        }
    }

    Ok(ProcessedFile {
        source: source.to_path_buf(),
        stripped: stripped.path,
        converted,
        original_size: stripped.original_size,
        output_size,
        warnings,
    })
}

/// Strips (and optionally converts) every eligible image directly inside
/// `config.directory`.
///
/// Fails as a whole only when the directory is missing or unreadable; any
/// per-file problem is recorded in the returned report and the batch moves on.
pub fn process_directory(config: &ScrubConfig) -> Result<BatchReport> {
    let directory = config.directory();
    if !directory.is_dir() {
        return Err(ScrubError::DirectoryNotFound(directory.to_path_buf()));
    }

    crate::info!("🚀 Scrubbing metadata in {}", directory.display());
    if let Some(quality) = config.convert {
        crate::info!("🔄 JPEG files will be converted to WebP at quality {}", quality);
    }

    let start_time = Instant::now();
    let image_files = collect_image_files(directory)?;
    let total_files = image_files.len();
    if total_files == 0 {
        return Ok(BatchReport::from_outcomes(Vec::new(), start_time.elapsed()));
    }

    let threads = worker_count(config.threads);
    crate::info!(
        "📊 Found {} image files, using {} worker thread(s)",
        total_files,
        threads
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| ScrubError::ThreadPool(e.to_string()))?;

    let progress = create_progress_bar(total_files as u64);
    let report_failure = |failed: &FailedFile| {
        progress.suspend(|| {
            crate::error!("Failed to process {}: {}", failed.source.display(), failed.error);
        });
    };

    let mut outcomes: Vec<(usize, FileOutcome)> = Vec::with_capacity(total_files);
    let mut runnable = Vec::with_capacity(total_files);
    for (index, conflict) in find_output_conflicts(&image_files, config).into_iter().enumerate() {
        match conflict {
            Some(error) => {
                let failed = FailedFile {
                    source: image_files[index].clone(),
                    error,
                    warnings: Vec::new(),
                };
                report_failure(&failed);
                progress.inc(1);
                outcomes.push((index, Err(failed)));
            }
            None => runnable.push(index),
        }
    }

    let (independent, shared) = partition_by_shared_paths(&image_files, &runnable, config);
    if !shared.is_empty() {
        crate::verbose!(
            "{} file(s) read another file's output and will run sequentially",
            shared.len()
        );
    }

    let run = |index: usize| {
        let outcome = process_single_image(&image_files[index], config);
        if let Err(failed) = &outcome {
            report_failure(failed);
        }
        progress.inc(1);
        (index, outcome)
    };

    outcomes.extend(pool.install(|| independent.par_iter().map(|&i| run(i)).collect::<Vec<_>>()));
    outcomes.extend(shared.into_iter().map(run));
    outcomes.sort_by_key(|(index, _)| *index);

    progress.finish_with_message("done");

    Ok(BatchReport::from_outcomes(
        outcomes.into_iter().map(|(_, outcome)| outcome),
        start_time.elapsed(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(unix)]
    use crate::test_support::lock_directory;
    use crate::test_support::{gradient, write_image, write_jpeg_with_metadata};
    use image::{GenericImageView, ImageFormat};
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn config(dir: &Path) -> ScrubConfig {
        ScrubConfig::new(dir, false, false, None).unwrap()
    }

    #[test]
    fn test_collect_image_files_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("b.JPG")).unwrap();
        File::create(temp_dir.path().join("a.webp")).unwrap();
        File::create(temp_dir.path().join("c.jpeg")).unwrap();
        File::create(temp_dir.path().join("notes.txt")).unwrap();
        File::create(temp_dir.path().join("icon.png")).unwrap();
        fs::create_dir(temp_dir.path().join("folder.jpg")).unwrap();

        let files = collect_image_files(temp_dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.webp", "b.JPG", "c.jpeg"]);
    }

    #[test]
    fn test_collect_image_files_is_not_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();
        File::create(temp_dir.path().join("top.jpg")).unwrap();
        File::create(subdir.join("nested.jpg")).unwrap();

        let files = collect_image_files(temp_dir.path()).unwrap();
        assert_eq!(files, vec![temp_dir.path().join("top.jpg")]);
    }

    #[test]
    fn test_collect_image_files_includes_hidden() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join(".hidden.jpg")).unwrap();

        let files = collect_image_files(temp_dir.path()).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_worker_count_bounds() {
        let cores = num_cpus::get().max(1);
        assert_eq!(worker_count(None), cores);
        assert_eq!(worker_count(Some(0)), 1);
        assert_eq!(worker_count(Some(1)), 1);
        assert_eq!(worker_count(Some(cores + 8)), cores);
    }

    #[test]
    fn test_partition_detects_shared_paths() {
        let dir = Path::new("/photos");
        let files = vec![
            dir.join("_photo.jpg"),
            dir.join("other.webp"),
            dir.join("photo.jpg"),
        ];

        let (independent, shared) = partition_by_shared_paths(&files, &[0, 1, 2], &config(dir));
        assert_eq!(independent, vec![1]);
        assert_eq!(shared, vec![0, 2]);
    }

    #[test]
    fn test_shared_files_read_before_rewritten() {
        // "P" sorts before "_", so listing order would rewrite _Photo.jpg first
        let dir = Path::new("/photos");
        let files = vec![dir.join("Photo.jpg"), dir.join("_Photo.jpg"), dir.join("__Photo.jpg")];

        let (independent, shared) = partition_by_shared_paths(&files, &[0, 1, 2], &config(dir));
        assert!(independent.is_empty());
        assert_eq!(shared, vec![2, 1, 0]);
    }

    #[test]
    fn test_output_conflicts_only_when_converting() {
        let dir = Path::new("/photos");
        let files = vec![dir.join("photo.jpeg"), dir.join("photo.jpg"), dir.join("photo.webp")];

        let plain = find_output_conflicts(&files, &config(dir));
        assert!(plain.iter().all(Option::is_none));

        let converting = ScrubConfig::new(dir, false, true, Some(50)).unwrap();
        let conflicts = find_output_conflicts(&files, &converting);
        assert!(conflicts[0].is_none());
        for conflict in &conflicts[1..] {
            match conflict {
                Some(ScrubError::OutputConflict { path, claimed_by }) => {
                    assert_eq!(path, &dir.join("_photo.webp"));
                    assert_eq!(claimed_by, &dir.join("photo.jpeg"));
                }
                other => panic!("expected a conflict, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_conflicting_file_leaves_earlier_claim_alone() {
        let dir = Path::new("/photos");
        let files = vec![dir.join("photo.jpg"), dir.join("photo.webp"), dir.join("zebra.jpg")];
        let converting = ScrubConfig::new(dir, false, true, Some(50)).unwrap();

        let conflicts = find_output_conflicts(&files, &converting);
        assert!(conflicts[0].is_none());
        assert!(matches!(conflicts[1], Some(ScrubError::OutputConflict { .. })));
        assert!(conflicts[2].is_none());

        let (independent, shared) = partition_by_shared_paths(&files, &[0, 2], &converting);
        assert_eq!(independent, vec![0, 2]);
        assert!(shared.is_empty());
    }

    #[test]
    fn test_process_directory_missing() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");

        let result = process_directory(&config(&missing));
        assert!(matches!(result, Err(ScrubError::DirectoryNotFound(_))));
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_process_directory_rejects_file_path() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("photo.jpg");
        write_image(&file, &gradient(4, 4), ImageFormat::Jpeg);

        let result = process_directory(&config(&file));
        assert!(matches!(result, Err(ScrubError::DirectoryNotFound(_))));
    }

    #[test]
    fn test_process_directory_strip_only() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write_jpeg_with_metadata(&dir.join("photo.jpg"), 24, 24);
        fs::write(dir.join("notes.txt"), b"keep me").unwrap();

        let report = process_directory(&config(dir)).unwrap();
        assert_eq!(report.processed_count(), 1);
        assert_eq!(report.succeeded_count(), 1);
        assert!(!report.has_failures());

        assert!(dir.join("photo.jpg").exists());
        assert!(dir.join("_photo.jpg").exists());
        assert_eq!(fs::read(dir.join("notes.txt")).unwrap(), b"keep me");
        assert!(!dir.join("_notes.txt").exists());
    }

    #[test]
    fn test_process_directory_delete_and_convert() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write_jpeg_with_metadata(&dir.join("photo.jpg"), 24, 24);
        write_image(&dir.join("art.webp"), &gradient(8, 8), ImageFormat::WebP);

        let config = ScrubConfig::new(dir, true, true, Some(50)).unwrap();
        let report = process_directory(&config).unwrap();
        assert_eq!(report.succeeded_count(), 2);

        assert!(!dir.join("photo.jpg").exists());
        assert!(!dir.join("_photo.jpg").exists());
        assert!(dir.join("_photo.webp").exists());

        assert!(!dir.join("art.webp").exists());
        assert!(dir.join("_art.webp").exists());

        let photo = report
            .succeeded
            .iter()
            .find(|f| f.source == dir.join("photo.jpg"))
            .unwrap();
        assert_eq!(photo.converted.as_deref(), Some(dir.join("_photo.webp").as_path()));
    }

    #[test]
    fn test_process_directory_isolates_failures() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("a_broken.jpg"), b"not an image").unwrap();
        write_image(&dir.join("b_good.jpg"), &gradient(10, 10), ImageFormat::Jpeg);
        write_image(&dir.join("c_good.webp"), &gradient(10, 10), ImageFormat::WebP);

        let config = ScrubConfig::new(dir, true, false, None).unwrap();
        let report = process_directory(&config).unwrap();
        assert_eq!(report.processed_count(), 3);
        assert_eq!(report.succeeded_count(), 2);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.failed[0].source, dir.join("a_broken.jpg"));
        assert!(matches!(report.failed[0].error, ScrubError::ImageDecode { .. }));

        // the failed original is left alone even with deletion enabled
        assert!(dir.join("a_broken.jpg").exists());
        assert!(dir.join("_b_good.jpg").exists());
        assert!(dir.join("_c_good.webp").exists());
    }

    #[test]
    fn test_process_directory_same_output_fails_later_file() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write_image(&dir.join("photo.jpg"), &gradient(64, 48), ImageFormat::Jpeg);
        write_image(&dir.join("photo.webp"), &gradient(10, 10), ImageFormat::WebP);

        let config = ScrubConfig::new(dir, true, true, Some(50)).unwrap();
        let report = process_directory(&config).unwrap();
        assert_eq!(report.succeeded_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.succeeded[0].source, dir.join("photo.jpg"));
        assert_eq!(report.failed[0].source, dir.join("photo.webp"));
        assert!(matches!(report.failed[0].error, ScrubError::OutputConflict { .. }));

        // the losing file is untouched and the winner's pixels are intact
        assert!(!dir.join("photo.jpg").exists());
        assert!(dir.join("photo.webp").exists());
        let webp = crate::strip::load_image(&dir.join("_photo.webp")).unwrap();
        assert_eq!(webp.dimensions(), (64, 48));
    }

    #[cfg(unix)]
    #[test]
    fn test_process_single_image_deletion_failures_are_warnings() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let source = dir.join("photo.jpg");
        write_image(&source, &gradient(16, 16), ImageFormat::Jpeg);
        fs::write(dir.join("_photo.jpg"), b"").unwrap();
        fs::write(dir.join("_photo.webp"), b"").unwrap();

        let Some(_lock) = lock_directory(dir) else {
            return;
        };

        let config = ScrubConfig::new(dir, true, true, Some(50)).unwrap();
        let processed = process_single_image(&source, &config).unwrap();
        assert_eq!(processed.warnings.len(), 2);
        assert!(processed.warnings.iter().all(ScrubError::is_warning));
        assert_eq!(processed.converted.as_deref(), Some(dir.join("_photo.webp").as_path()));

        assert!(source.exists());
        assert!(fs::metadata(dir.join("_photo.jpg")).unwrap().len() > 0);
        assert!(fs::metadata(dir.join("_photo.webp")).unwrap().len() > 0);
    }

    #[test]
    fn test_process_directory_report_order_is_listing_order() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        for name in ["d.jpg", "a.jpg", "c.webp", "b.jpg"] {
            let format = if name.ends_with("webp") {
                ImageFormat::WebP
            } else {
                ImageFormat::Jpeg
            };
            write_image(&dir.join(name), &gradient(6, 6), format);
        }

        let config = config(dir).with_threads(Some(4));
        let report = process_directory(&config).unwrap();
        let sources: Vec<PathBuf> = report.succeeded.iter().map(|f| f.source.clone()).collect();
        assert_eq!(
            sources,
            vec![dir.join("a.jpg"), dir.join("b.jpg"), dir.join("c.webp"), dir.join("d.jpg")]
        );
    }

    #[test]
    fn test_process_directory_empty() {
        let temp_dir = TempDir::new().unwrap();
        let report = process_directory(&config(temp_dir.path())).unwrap();
        assert_eq!(report.processed_count(), 0);
    }
}
