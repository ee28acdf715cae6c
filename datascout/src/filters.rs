/// File discovery for a scan: the regular files directly inside the root
/// directory, narrowed by the optional extension whitelist and glob ignore
/// list from `ScanConfig`.
///
/// Subdirectories are never descended into. Paths come back sorted by file
/// name so repeated runs visit files in the same order.
use glob::Pattern;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::config::ScanConfig;
use crate::errors::{ScanError, ScanResult};

/// Checks if a file should be included based on its extension
pub fn has_valid_extension(path: &Path, extensions: &Option<Vec<String>>) -> bool {
    match extensions {
        None => true,
        Some(exts) => {
            if let Some(ext) = path.extension() {
                if let Some(ext_str) = ext.to_str() {
                    return exts
                        .iter()
                        .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(ext_str));
                }
            }
            false
        }
    }
}

/// Checks if a file should be ignored based on its file name
pub fn should_ignore(path: &Path, ignore_patterns: &[String]) -> bool {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
        return false;
    };

    ignore_patterns.iter().any(|pattern| match Pattern::new(pattern) {
        Ok(p) => p.matches(&name),
        Err(_) => false,
    })
}

/// Determines if a listed file takes part in the scan
pub fn should_include_file(
    path: &Path,
    extensions: &Option<Vec<String>>,
    ignore_patterns: &[String],
) -> bool {
    has_valid_extension(path, extensions) && !should_ignore(path, ignore_patterns)
}

/// Lists the regular files directly contained in `dir`.
///
/// Symlinks are followed, so a link to a regular file is listed. A path
/// that is not a directory is reported as `DirectoryNotFound` rather than
/// as an empty listing.
pub fn list_dir(dir: &Path) -> ScanResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        error!("Directory not found: {}", dir.display());
        return Err(ScanError::directory_not_found(dir));
    }

    let mut walker = WalkBuilder::new(dir);
    walker
        .standard_filters(false)
        .follow_links(true)
        .max_depth(Some(1))
        .sort_by_file_name(|a, b| a.cmp(b));

    let files: Vec<PathBuf> = walker
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.depth() == 1)
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .map(|entry| entry.into_path())
        .collect();

    debug!("Listed {} files in {}", files.len(), dir.display());
    Ok(files)
}

/// Lists the files a scan with `config` will visit
pub fn list_files(config: &ScanConfig) -> ScanResult<Vec<PathBuf>> {
    let files = list_dir(&config.root_path)?
        .into_iter()
        .filter(|path| {
            should_include_file(path, &config.file_extensions, &config.ignore_patterns)
        })
        .collect();
    Ok(files)
}
