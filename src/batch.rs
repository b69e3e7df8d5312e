//! Batch profile-photo optimization.
//!
//! Turns a list of files and directories into square, size-targeted profile
//! photos. Directories are walked recursively and filtered to decodable image
//! extensions. Files are processed in parallel with rayon; a failure on one
//! file is reported and counted, never fatal to the batch.
//!
//! Outputs are named after the source stem. Stems that repeat within one batch
//! get a numeric suffix in input order (`jane.jpg`, `jane-2.jpg`), so no two
//! workers ever write the same file.
//!
//! Progress is streamed as [`BatchEvent`]s over an optional channel so the CLI
//! can print while workers are still running.

use crate::editor::FacePosition;
use crate::imaging::{ImageBackend, OptimizeSettings, is_supported_input, optimize_profile_photo};
use log::warn;
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to read directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Progress reported while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Optimized {
        source: PathBuf,
        output: PathBuf,
        width: u32,
        height: u32,
        size_kb: u64,
        quality: u32,
    },
    Failed {
        source: PathBuf,
        error: String,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub optimized: usize,
    pub failed: usize,
}

/// Expand inputs into image files.
///
/// Files named explicitly are kept whatever their extension; files found by
/// walking a directory must have a supported extension. Directory results are
/// sorted for a stable order.
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, BatchError> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        let mut found = Vec::new();
        for entry in WalkDir::new(input).follow_links(true) {
            let entry = entry?;
            if entry.file_type().is_file() && is_supported_input(entry.path()) {
                found.push(entry.into_path());
            }
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

fn source_stem(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo".to_string())
}

/// `<out_dir>/<stem>.<ext>`.
pub fn output_path(out_dir: &Path, stem: &str, extension: &str) -> PathBuf {
    out_dir.join(format!("{stem}.{extension}"))
}

/// One distinct output stem per file, in input order.
///
/// The first file keeps its stem; later files with the same stem (compared
/// case-insensitively) get `-2`, `-3`, ... appended.
pub fn output_stems(files: &[PathBuf]) -> Vec<String> {
    let mut taken = HashSet::new();
    files
        .iter()
        .map(|source| {
            let stem = source_stem(source);
            let mut candidate = stem.clone();
            let mut n = 2;
            while !taken.insert(candidate.to_lowercase()) {
                candidate = format!("{stem}-{n}");
                n += 1;
            }
            candidate
        })
        .collect()
}

/// Optimize every file into `out_dir`.
pub fn optimize_photos(
    backend: &impl ImageBackend,
    files: &[PathBuf],
    out_dir: &Path,
    face: Option<FacePosition>,
    settings: &OptimizeSettings,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchSummary, BatchError> {
    std::fs::create_dir_all(out_dir)?;
    let stems = output_stems(files);

    let outcomes: Vec<bool> = files
        .par_iter()
        .zip(stems.par_iter())
        .map_with(events, |events, (source, stem)| {
            let event = match optimize_one(backend, source, stem, out_dir, face, settings) {
                Ok(event) => event,
                Err(error) => {
                    warn!("{}: {}", source.display(), error);
                    BatchEvent::Failed {
                        source: source.clone(),
                        error,
                    }
                }
            };
            let ok = matches!(event, BatchEvent::Optimized { .. });
            if let Some(tx) = events {
                // The printer going away must not stop the batch
                let _ = tx.send(event);
            }
            ok
        })
        .collect();

    let optimized = outcomes.iter().filter(|ok| **ok).count();
    Ok(BatchSummary {
        optimized,
        failed: outcomes.len() - optimized,
    })
}

fn optimize_one(
    backend: &impl ImageBackend,
    source: &Path,
    stem: &str,
    out_dir: &Path,
    face: Option<FacePosition>,
    settings: &OptimizeSettings,
) -> Result<BatchEvent, String> {
    let image = backend.decode(source).map_err(|e| e.to_string())?;
    let encoded = optimize_profile_photo(backend, &image, face.map(FacePosition::as_tuple), settings)
        .map_err(|e| e.to_string())?;
    let output = output_path(out_dir, stem, encoded.format.extension());
    std::fs::write(&output, &encoded.bytes)
        .map_err(|e| format!("failed to write {}: {}", output.display(), e))?;
    Ok(BatchEvent::Optimized {
        source: source.to_path_buf(),
        output,
        width: encoded.width,
        height: encoded.height,
        size_kb: encoded.size_kb(),
        quality: encoded.quality.value(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::test_helpers::create_test_jpeg;
    use std::sync::mpsc;
    use tempfile::TempDir;

    #[test]
    fn expand_walks_directories_and_filters_extensions() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("team/2024");
        std::fs::create_dir_all(&nested).unwrap();
        create_test_jpeg(&tmp.path().join("team/b.jpg"), 8, 8);
        create_test_jpeg(&nested.join("a.JPG"), 8, 8);
        std::fs::write(tmp.path().join("team/notes.txt"), "hi").unwrap();

        let files = expand_inputs(&[tmp.path().join("team")]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.jpg"]);
    }

    #[test]
    fn expand_keeps_explicit_files() {
        let explicit = PathBuf::from("/somewhere/portrait.heic");
        let files = expand_inputs(std::slice::from_ref(&explicit)).unwrap();
        assert_eq!(files, vec![explicit]);
    }

    #[test]
    fn output_path_uses_stem() {
        let stems = output_stems(&[PathBuf::from("in/jane.doe.png")]);
        assert_eq!(stems, vec!["jane.doe"]);
        assert_eq!(
            output_path(Path::new("out"), &stems[0], "jpg"),
            PathBuf::from("out/jane.doe.jpg")
        );
    }

    #[test]
    fn repeated_stems_are_numbered_in_input_order() {
        let files = [
            PathBuf::from("a/jane.png"),
            PathBuf::from("b/jane.jpg"),
            PathBuf::from("c/Jane.webp"),
            PathBuf::from("jane-2.png"),
            PathBuf::from("bo.png"),
        ];
        assert_eq!(
            output_stems(&files),
            vec!["jane", "jane-2", "Jane-3", "jane-2-2", "bo"]
        );
    }

    #[test]
    fn same_stem_inputs_get_separate_outputs() {
        let tmp = TempDir::new().unwrap();
        let out_dir = tmp.path().join("out");
        let files = vec![
            PathBuf::from("/team/a/jane.jpg"),
            PathBuf::from("/team/b/jane.png"),
        ];

        let summary = optimize_photos(
            &MockBackend::new(),
            &files,
            &out_dir,
            None,
            &OptimizeSettings::default(),
            None,
        )
        .unwrap();

        assert_eq!(summary, BatchSummary { optimized: 2, failed: 0 });
        assert!(out_dir.join("jane.jpg").exists());
        assert!(out_dir.join("jane-2.jpg").exists());
    }

    #[test]
    fn optimize_photos_writes_files_and_reports() {
        let tmp = TempDir::new().unwrap();
        let out_dir = tmp.path().join("out");
        let backend = MockBackend::new();
        let files = vec![PathBuf::from("/in/one.jpg"), PathBuf::from("/in/two.jpg")];
        let (tx, rx) = mpsc::channel();

        let summary = optimize_photos(
            &backend,
            &files,
            &out_dir,
            None,
            &OptimizeSettings::default(),
            Some(tx),
        )
        .unwrap();

        assert_eq!(summary, BatchSummary { optimized: 2, failed: 0 });
        assert!(out_dir.join("one.jpg").exists());
        assert!(out_dir.join("two.jpg").exists());

        let events: Vec<BatchEvent> = rx.iter().collect();
        assert_eq!(events.len(), 2);
        for event in events {
            match event {
                BatchEvent::Optimized { width, height, .. } => assert_eq!((width, height), (512, 512)),
                other => panic!("unexpected event {other:?}"),
            }
        }
        let crops = backend
            .get_operations()
            .into_iter()
            .filter(|op| matches!(op, RecordedOp::Crop { .. }))
            .count();
        assert_eq!(crops, 2);
    }

    #[test]
    fn failures_are_counted_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let broken = tmp.path().join("broken.jpg");
        std::fs::write(&broken, b"not an image").unwrap();
        let good = tmp.path().join("good.jpg");
        create_test_jpeg(&good, 40, 30);
        let (tx, rx) = mpsc::channel();

        let summary = optimize_photos(
            &crate::imaging::RustBackend::new(),
            &[broken.clone(), good],
            &tmp.path().join("out"),
            None,
            &OptimizeSettings::default(),
            Some(tx),
        )
        .unwrap();

        assert_eq!(summary, BatchSummary { optimized: 1, failed: 1 });
        let failed: Vec<_> = rx
            .iter()
            .filter_map(|e| match e {
                BatchEvent::Failed { source, .. } => Some(source),
                _ => None,
            })
            .collect();
        assert_eq!(failed, vec![broken]);
    }
}
