//! The sort engine: ties the phases together around one run context
//!
//! Two parallel phases run back to back and never overlap: capture-time
//! extraction over the whole catalog, then the copy stage over the
//! records slated for copying. Classification and duplicate resolution
//! run single-threaded in between, over the fully-populated catalog.

use crate::catalog::{Category, FileRecord, catalog};
use crate::classify::classify;
use crate::config::RunOptions;
use crate::copy::{CopyProgress, CopyStats, copy_all};
use crate::duplicates::resolve_duplicates;
use crate::error::Result;
use crate::time::extract_timestamp;
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use tracing::{info, warn};

/// Counters for one run, shared with front-ends for live display
#[derive(Debug, Default)]
pub struct SortStats {
    pub found: AtomicUsize,
    pub sortable: AtomicUsize,
    pub failed_extraction: AtomicUsize,
    pub excluded: AtomicUsize,
    pub duplicates: AtomicUsize,
    pub copied: AtomicUsize,
    pub copy_failed: AtomicUsize,
}

impl SortStats {
    pub fn summary(&self) -> String {
        format!(
            "Found: {}, Sortable: {}, Failed: {}, Other: {}, Duplicates: {}, Copied: {}, Copy failures: {}",
            self.found.load(Ordering::Relaxed),
            self.sortable.load(Ordering::Relaxed),
            self.failed_extraction.load(Ordering::Relaxed),
            self.excluded.load(Ordering::Relaxed),
            self.duplicates.load(Ordering::Relaxed),
            self.copied.load(Ordering::Relaxed),
            self.copy_failed.load(Ordering::Relaxed),
        )
    }
}

/// Run context for one sort operation.
///
/// Holds the option snapshot, the cancellation flag and the running
/// counters; the presentation layer never appears here. Front-ends drive
/// [`Sorter::analyze`] and [`Sorter::sort`] and drain the progress channel
/// they hand to `sort`.
pub struct Sorter {
    options: RunOptions,
    cancel: Arc<AtomicBool>,
    stats: Arc<SortStats>,
}

impl Sorter {
    pub fn new(options: RunOptions) -> Self {
        Self {
            options,
            cancel: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(SortStats::default()),
        }
    }

    /// Flag a front-end can set to stop issuing new per-file work.
    /// In-flight copies finish; a half-written destination file is
    /// acceptable, the source is never touched.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn stats(&self) -> Arc<SortStats> {
        Arc::clone(&self.stats)
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Discovery, extraction, classification and duplicate resolution.
    ///
    /// Returns the fully staged catalog, ready for [`Sorter::sort`].
    pub fn analyze(&self, source_root: &Path) -> Result<Vec<FileRecord>> {
        let mut records = catalog(source_root)?;
        self.stats.found.store(records.len(), Ordering::Relaxed);

        // Phase 1: extract capture times in parallel
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.worker_count())
            .build()?;
        let cancel = &self.cancel;
        pool.install(|| {
            records.par_iter_mut().for_each(|record| {
                if cancel.load(Ordering::Relaxed) {
                    return;
                }
                match extract_timestamp(&record.full_path, &record.extension) {
                    Ok(time) => record.capture_time = Some(time),
                    Err(e) => {
                        warn!(path = %record.full_path.display(), error = %e, "No capture time");
                        record.extract_failure = Some(e);
                    }
                }
            });
        });

        // Single-threaded passes over the immutable, fully-extracted set
        classify(&mut records, &self.options);
        let duplicates = resolve_duplicates(&mut records, &self.options);

        let count = |cat: Category| records.iter().filter(|r| r.category == Some(cat)).count();
        let sortable = count(Category::Sortable);
        let failed = count(Category::FailedExtraction);
        let excluded = count(Category::Excluded);
        self.stats.sortable.store(sortable, Ordering::Relaxed);
        self.stats.failed_extraction.store(failed, Ordering::Relaxed);
        self.stats.excluded.store(excluded, Ordering::Relaxed);
        self.stats.duplicates.store(duplicates, Ordering::Relaxed);

        info!(source = %source_root.display(), sortable, "Files that will sort");
        if failed > 0 {
            info!(
                count = failed,
                "Requested files without an extractable capture time; they go to failed_to_sort/"
            );
        }
        if excluded > 0 {
            info!(
                count = excluded,
                copied = self.options.copy_unmatched,
                "Files of unrequested types"
            );
        }

        Ok(records)
    }

    /// Copy the staged records under `destination_root`, emitting one
    /// progress event per attempted file.
    pub fn sort(
        &self,
        records: &[FileRecord],
        destination_root: &Path,
        progress: &Sender<CopyProgress>,
    ) -> Result<CopyStats> {
        let stats = copy_all(
            records,
            destination_root,
            self.options.worker_count(),
            &self.cancel,
            progress,
        )?;
        self.stats.copied.store(stats.copied, Ordering::Relaxed);
        self.stats.copy_failed.store(stats.failed, Ordering::Relaxed);
        info!("{}", self.stats.summary());
        Ok(stats)
    }
}
