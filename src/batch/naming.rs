//! Input discovery and output file naming.

use super::BatchError;
use crate::codec::is_supported_extension;
use crate::constants::OUTPUT_EXTENSION;
use crate::watermark::OutputNaming;
use std::path::{Path, PathBuf};

/// `{base}_{index:03}.jpg`
pub fn batch_file_name(base_name: &str, index: u32) -> String {
    format!("{}_{:03}.{}", base_name, index, OUTPUT_EXTENSION)
}

/// Return `candidate` if it is free, otherwise the first free
/// `{stem}_{n}.{ext}` for n = 1, 2, ...
///
/// Probe-and-increment; not atomic, which is fine for a sequential batch.
pub fn deduplicate(candidate: PathBuf) -> PathBuf {
    if !candidate.exists() {
        return candidate;
    }

    let stem = candidate
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = candidate
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| OUTPUT_EXTENSION.to_string());

    let mut n = 1u32;
    loop {
        let next = candidate.with_file_name(format!("{}_{}.{}", stem, n, ext));
        if !next.exists() {
            return next;
        }
        n += 1;
    }
}

/// Force a JPEG extension on an explicit output path.
pub fn jpeg_path(path: &Path) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") => {
            path.to_path_buf()
        }
        _ => path.with_extension(OUTPUT_EXTENSION),
    }
}

/// Free output path for the input at `position` of the batch.
pub fn output_path(naming: &OutputNaming, dir: &Path, position: usize) -> PathBuf {
    match naming {
        OutputNaming::Batch {
            base_name,
            start_index,
        } => {
            let index = start_index.saturating_add(position as u32);
            deduplicate(dir.join(batch_file_name(base_name, index)))
        }
        OutputNaming::Single { path } => {
            let path = jpeg_path(path);
            if path.is_absolute() || path.parent().map_or(false, |p| !p.as_os_str().is_empty()) {
                deduplicate(path)
            } else {
                deduplicate(dir.join(path))
            }
        }
    }
}

/// Collect the images to process from a directory or a single file.
///
/// In a directory, files with a supported extension are taken in name
/// order, skipping files whose name starts with `output_prefix` (outputs of
/// a previous run).
pub fn collect_inputs(input: &Path, output_prefix: Option<&str>) -> Result<Vec<PathBuf>, BatchError> {
    if input.as_os_str().is_empty() {
        return Err(BatchError::NoInputSelected);
    }

    if input.is_file() {
        return if is_supported_extension(input) {
            Ok(vec![input.to_path_buf()])
        } else {
            Err(BatchError::NoImagesFound {
                path: input.to_path_buf(),
            })
        };
    }

    if !input.is_dir() {
        return Err(BatchError::NoImagesFound {
            path: input.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(input).map_err(|source| BatchError::ReadInput {
        path: input.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_supported_extension(path))
        .filter(|path| {
            let Some(prefix) = output_prefix else {
                return true;
            };
            path.file_name()
                .map(|name| !name.to_string_lossy().starts_with(prefix))
                .unwrap_or(true)
        })
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(BatchError::NoImagesFound {
            path: input.to_path_buf(),
        });
    }

    tracing::debug!(input = %input.display(), count = files.len(), "Collected input images");
    Ok(files)
}
