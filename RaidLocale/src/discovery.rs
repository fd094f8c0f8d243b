//! Raidboss file discovery
//!
//! A target is a `.ts`/`.js` trigger file with a sibling `.txt` timeline.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Path segments excluded by default
pub const DEFAULT_EXCLUDES: &[&str] = &["00-misc"];

/// The timeline next to a trigger file
#[must_use]
pub fn timeline_path(trigger: &Path) -> PathBuf {
    trigger.with_extension("txt")
}

/// Find every trigger file under `root` that has a timeline.
///
/// Paths containing an excluded segment are skipped. With a `filter`, only
/// files whose path ends with it are kept; the filter may use either path
/// separator and may carry a `.ts`/`.js`/`.txt` extension.
///
/// # Returns
/// A sorted list of trigger file paths.
///
/// # Errors
/// [`Error::TargetNotFound`] if a filter was given and nothing matched.
pub fn find_target_files<S: AsRef<str>>(
    root: &Path,
    filter: Option<&str>,
    excludes: &[S],
) -> Result<Vec<PathBuf>> {
    let filter = filter.map(normalize_filter).filter(|f| !f.is_empty());

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file() && is_trigger_file(e.path()))
        .map(walkdir::DirEntry::into_path)
        .filter(|path| !is_excluded(path, excludes))
        .filter(|path| timeline_path(path).is_file())
        .filter(|path| {
            filter
                .as_deref()
                .is_none_or(|f| normalized_stem(path).ends_with(f))
        })
        .collect();

    files.sort();

    if let Some(filter) = filter.filter(|_| files.is_empty()) {
        return Err(Error::TargetNotFound(filter));
    }

    tracing::debug!("Found {} raidboss files under {}", files.len(), root.display());
    Ok(files)
}

fn is_trigger_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == "ts" || ext == "js")
}

fn is_excluded<S: AsRef<str>>(path: &Path, excludes: &[S]) -> bool {
    path.components().any(|component| {
        let segment = component.as_os_str().to_string_lossy();
        excludes.iter().any(|ex| segment == ex.as_ref())
    })
}

/// `/`-separated path without the extension
fn normalized_stem(path: &Path) -> String {
    path.with_extension("")
        .to_string_lossy()
        .replace('\\', "/")
}

fn normalize_filter(filter: &str) -> String {
    let filter = filter.trim().replace('\\', "/");
    for ext in [".ts", ".js", ".txt"] {
        if let Some(stripped) = filter.strip_suffix(ext) {
            return stripped.to_string();
        }
    }
    filter
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn layout() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "07-dt/raid/r12s.ts");
        touch(dir.path(), "07-dt/raid/r12s.txt");
        touch(dir.path(), "07-dt/raid/r11s.ts");
        touch(dir.path(), "07-dt/raid/r11s.txt");
        touch(dir.path(), "07-dt/raid/r10s.ts");
        touch(dir.path(), "00-misc/general.ts");
        touch(dir.path(), "00-misc/general.txt");
        dir
    }

    #[test]
    fn test_finds_files_with_timelines() {
        let dir = layout();
        let files = find_target_files(dir.path(), None, DEFAULT_EXCLUDES).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["r11s.ts", "r12s.ts"]);
    }

    #[test]
    fn test_filter_matches_path_suffix() {
        let dir = layout();
        let files = find_target_files(dir.path(), Some("raid\\r12s.txt"), DEFAULT_EXCLUDES).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("07-dt/raid/r12s.ts"));
    }

    #[test]
    fn test_unmatched_filter_is_an_error() {
        let dir = layout();
        let err = find_target_files(dir.path(), Some("r99s"), DEFAULT_EXCLUDES).unwrap_err();
        assert!(matches!(err, Error::TargetNotFound(f) if f == "r99s"));
    }

    #[test]
    fn test_timeline_path() {
        assert_eq!(
            timeline_path(Path::new("data/07-dt/raid/r12s.ts")),
            PathBuf::from("data/07-dt/raid/r12s.txt")
        );
    }
}
