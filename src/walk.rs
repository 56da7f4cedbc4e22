//! File discovery and batch processing for HTML/XHTML trees.
//!
//! A path argument may name a single file or a directory; directories are
//! walked recursively for `.html`/`.xhtml` files. Per-file failures inside
//! a directory walk are logged and skipped so one broken chapter does not
//! abort a whole book.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::TypesetError;

/// True for the file extensions the tools operate on.
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("xhtml")
        })
}

/// Collect every supported file under `path`, sorted for deterministic
/// processing order.
///
/// A single supported file yields itself; an unsupported file or a missing
/// path is an error.
pub fn collect_supported_files(path: &Path) -> Result<Vec<PathBuf>, TypesetError> {
    if path.is_dir() {
        let mut files = Vec::new();
        collect_dir(path, &mut files)?;
        files.sort();
        Ok(files)
    } else if path.is_file() {
        if has_supported_extension(path) {
            Ok(vec![path.to_path_buf()])
        } else {
            Err(TypesetError::UnsupportedExtension {
                path: path.display().to_string(),
            })
        }
    } else {
        Err(TypesetError::InvalidPath {
            path: path.display().to_string(),
        })
    }
}

fn collect_dir(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), TypesetError> {
    let entries = fs::read_dir(dir).map_err(|e| TypesetError::io(dir.display().to_string(), e))?;
    for entry in entries {
        let entry = entry.map_err(|e| TypesetError::io(dir.display().to_string(), e))?;
        let path = entry.path();
        if path.is_dir() {
            collect_dir(&path, files)?;
        } else if has_supported_extension(&path) {
            files.push(path);
        }
    }
    Ok(())
}

/// Run `op` over every supported file under `path`.
///
/// Returns the number of files processed successfully. Inside a directory
/// walk a failing file is logged with `log::warn!` and skipped; for a
/// single-file path the error is returned to the caller.
pub fn process_path<F>(path: &Path, mut op: F) -> Result<usize, TypesetError>
where
    F: FnMut(&Path) -> Result<(), TypesetError>,
{
    let batch = path.is_dir();
    let files = collect_supported_files(path)?;
    let mut processed = 0usize;

    for file in &files {
        match op(file) {
            Ok(()) => processed += 1,
            Err(err) if batch => {
                log::warn!("skipping '{}': {}", file.display(), err);
            }
            Err(err) => return Err(err),
        }
    }
    Ok(processed)
}
