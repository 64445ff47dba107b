//! Directory scanner - lists the candidate audio files of one directory

use std::path::{Path, PathBuf};

use crate::error::{MergeError, Result};

/// List the files directly inside `dir` whose extension matches one of
/// `extensions` (case-insensitive), sorted by file name. Symlinks count when
/// they resolve to a file.
pub fn scan_directory<P: AsRef<Path>>(dir: P, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(MergeError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            tracing::debug!("Skipping non-file entry {:?}", path);
            continue;
        }
        if has_extension(&path, extensions) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    tracing::debug!("Found {} candidate file(s) in {:?}", files.len(), dir);
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}
