//! Batch processing
//!
//! Files are independent, so they go through the rayon pool with shared
//! atomic counters. Each file is isolated: an error or a panic while
//! processing it is recorded as a failure and the batch moves on.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use super::pipeline::{FileOutcome, FileStatus, Options, process_file};
use crate::catalog::CatalogData;
use crate::error::{Error, Result};

/// Progress of a running batch
#[derive(Debug, Clone)]
pub struct BatchProgress {
    /// Files started so far, including this one
    pub current: usize,
    pub total: usize,
    /// File being started
    pub file: String,
}

/// Result of a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// Files whose table changed (written unless dry-running)
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
    /// One message per file, sorted by path
    pub results: Vec<String>,
}

impl BatchSummary {
    /// Total number of files seen
    #[must_use]
    pub fn total(&self) -> usize {
        self.updated + self.unchanged + self.skipped + self.failed
    }
}

/// Process `files` in parallel
///
/// Changed files are written back only when `write` is set. Review notes are
/// flushed per file as soon as that file completes.
pub fn run_batch<F>(
    files: &[PathBuf],
    data: &CatalogData,
    options: &Options,
    write: bool,
    progress: F,
) -> BatchSummary
where
    F: Fn(&BatchProgress) + Send + Sync,
{
    let updated = AtomicUsize::new(0);
    let unchanged = AtomicUsize::new(0);
    let skipped = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let processed = AtomicUsize::new(0);
    let total = files.len();

    tracing::info!("Processing {total} raidboss files");

    let mut results: Vec<(&PathBuf, String)> = files
        .par_iter()
        .map(|path| {
            let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
            progress(&BatchProgress {
                current,
                total,
                file: path.display().to_string(),
            });

            let message = match isolate(path, || process_file(path, data, options)) {
                Ok(outcome) => {
                    outcome.report.flush();
                    match settle(outcome, write) {
                        Ok(Settled::Updated(message)) => {
                            updated.fetch_add(1, Ordering::SeqCst);
                            message
                        }
                        Ok(Settled::Unchanged(message)) => {
                            unchanged.fetch_add(1, Ordering::SeqCst);
                            message
                        }
                        Ok(Settled::Skipped(message)) => {
                            skipped.fetch_add(1, Ordering::SeqCst);
                            message
                        }
                        Err(e) => {
                            failed.fetch_add(1, Ordering::SeqCst);
                            tracing::error!("{}: {e}", path.display());
                            format!("Failed {}: {e}", path.display())
                        }
                    }
                }
                Err(e) => {
                    failed.fetch_add(1, Ordering::SeqCst);
                    tracing::error!("{}: {e}", path.display());
                    format!("Failed {}: {e}", path.display())
                }
            };
            (path, message)
        })
        .collect();

    results.sort_by(|a, b| a.0.cmp(b.0));

    BatchSummary {
        updated: updated.load(Ordering::SeqCst),
        unchanged: unchanged.load(Ordering::SeqCst),
        skipped: skipped.load(Ordering::SeqCst),
        failed: failed.load(Ordering::SeqCst),
        results: results.into_iter().map(|(_, message)| message).collect(),
    }
}

enum Settled {
    Updated(String),
    Unchanged(String),
    Skipped(String),
}

fn settle(outcome: FileOutcome, write: bool) -> Result<Settled> {
    let shown = outcome.path.display().to_string();
    Ok(match outcome.status {
        FileStatus::Updated { content } => {
            if write {
                std::fs::write(&outcome.path, content)?;
                tracing::info!("Updated {shown}");
                Settled::Updated(format!("Updated: {shown}"))
            } else {
                Settled::Updated(format!("Would update: {shown}"))
            }
        }
        FileStatus::Unchanged => Settled::Unchanged(format!("Unchanged: {shown}")),
        FileStatus::Skipped(reason) => {
            tracing::debug!("Skipped {shown}: {reason}");
            Settled::Skipped(format!("Skipped {shown}: {reason}"))
        }
    })
}

/// Run `work`, turning a panic into [`Error::FilePanicked`]
fn isolate<T>(path: &Path, work: impl FnOnce() -> Result<T>) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(work)).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(Error::FilePanicked {
            path: path.to_path_buf(),
            message,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isolate_catches_panics() {
        let result: Result<()> = isolate(Path::new("r12s.ts"), || panic!("boom"));
        match result {
            Err(Error::FilePanicked { path, message }) => {
                assert_eq!(path, PathBuf::from("r12s.ts"));
                assert_eq!(message, "boom");
            }
            other => panic!("expected FilePanicked, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_files_fail_without_stopping_batch() {
        let files = vec![PathBuf::from("/nonexistent/a.ts"), PathBuf::from("/nonexistent/b.ts")];
        let data = CatalogData::builder().build();
        let summary = run_batch(&files, &data, &Options::default(), false, |_| {});
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.total(), 2);
        assert!(summary.results[0].contains("a.ts"));
    }
}
