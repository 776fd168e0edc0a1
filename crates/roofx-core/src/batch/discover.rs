//! Input document discovery.

use std::path::{Path, PathBuf};

use glob::{glob, Pattern};
use tracing::{debug, trace, warn};

use crate::error::{Result, RoofError};

/// List the documents to process.
///
/// `input` is either a directory (every file directly inside it) or a glob
/// pattern. Only files whose extension is in `extensions` are kept, compared
/// case-insensitively. The result is sorted by file name, then by full path,
/// with duplicates removed.
pub fn discover(input: &str, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let pattern = if Path::new(input).is_dir() {
        let escaped = Pattern::escape(input.trim_end_matches(['/', '\\']));
        format!("{}/*", escaped)
    } else {
        input.to_string()
    };
    debug!("Discovering documents with pattern {}", pattern);

    let mut files: Vec<PathBuf> = glob(&pattern)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                trace!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|path| path.is_file())
        .filter(|path| has_extension(path, extensions))
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()).then_with(|| a.cmp(b)));
    files.dedup();

    if files.is_empty() && !Path::new(input).exists() && !is_glob(input) {
        return Err(RoofError::Discover(format!("input not found: {}", input)));
    }

    for name in duplicate_names(&files) {
        warn!("Several documents are named {}; their records share that file name", name);
    }

    debug!("Found {} documents", files.len());
    Ok(files)
}

/// File names carried by more than one path.
///
/// `paths` must be sorted by file name, as [`discover`] returns them.
pub fn duplicate_names(paths: &[PathBuf]) -> Vec<String> {
    let mut names: Vec<String> = paths
        .windows(2)
        .filter(|pair| pair[0].file_name() == pair[1].file_name())
        .filter_map(|pair| pair[0].file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect();
    names.dedup();
    names
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
}

fn is_glob(input: &str) -> bool {
    input.contains(['*', '?', '['])
}
