//! Bounded-parallel copy stage with progress events

use crate::catalog::FileRecord;
use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use tracing::{debug, error, info};

/// Outcome of one copy attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// File was written to the destination
    Copied,
    /// Copy failed; the message is the underlying I/O error
    Failed(String),
}

/// One progress event per attempted file, emitted through the channel
#[derive(Debug, Clone)]
pub struct CopyProgress {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub outcome: CopyOutcome,
}

/// Aggregate result of a copy phase
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CopyStats {
    /// Files written successfully
    pub copied: usize,
    /// Files whose copy failed; the run is "completed with N failures"
    pub failed: usize,
    /// Files not attempted because the run was cancelled
    pub cancelled: usize,
}

/// Copy every `should_copy` record under `destination_root`.
///
/// A fixed pool of `worker_count` workers drains the eligible records;
/// each worker handles one record fully (directory create, copy, event)
/// before taking the next. Destinations are overwritten when they exist.
/// Per-file failures are reported as events and never abort the batch.
/// Once `cancel` is set no new record is started; in-flight copies finish.
///
/// The function returns only after all workers have drained the queue.
pub fn copy_all(
    records: &[FileRecord],
    destination_root: &Path,
    worker_count: usize,
    cancel: &AtomicBool,
    progress: &Sender<CopyProgress>,
) -> Result<CopyStats> {
    if !destination_root.is_dir() {
        return Err(Error::DirectoryNotFound {
            path: destination_root.to_path_buf(),
        });
    }

    let eligible: Vec<&FileRecord> = records.iter().filter(|r| r.should_copy).collect();
    info!(
        count = eligible.len(),
        workers = worker_count.max(1),
        destination = %destination_root.display(),
        "Copying files"
    );

    let copied = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let cancelled = AtomicUsize::new(0);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(worker_count.max(1))
        .build()?;

    pool.install(|| {
        use rayon::prelude::*;

        eligible
            .par_iter()
            .for_each_with(progress.clone(), |tx, record| {
                if cancel.load(Ordering::Relaxed) {
                    cancelled.fetch_add(1, Ordering::Relaxed);
                    return;
                }

                let (Some(rel_dir), Some(file_name)) =
                    (&record.dest_relative_dir, &record.dest_file_name)
                else {
                    // The classifier stages every copied record; a bare one
                    // is a bug upstream, not a user-visible condition.
                    debug_assert!(false, "record reached the copy stage unstaged");
                    failed.fetch_add(1, Ordering::Relaxed);
                    return;
                };

                let dest_dir = destination_root.join(rel_dir);
                let dest_path = dest_dir.join(file_name);

                let outcome = match copy_one(&record.full_path, &dest_dir, &dest_path) {
                    Ok(()) => {
                        debug!(
                            source = %record.full_path.display(),
                            destination = %dest_path.display(),
                            "Copied"
                        );
                        copied.fetch_add(1, Ordering::Relaxed);
                        CopyOutcome::Copied
                    }
                    Err(e) => {
                        error!(
                            source = %record.full_path.display(),
                            destination = %dest_path.display(),
                            error = %e,
                            "Copy failed"
                        );
                        failed.fetch_add(1, Ordering::Relaxed);
                        CopyOutcome::Failed(e.to_string())
                    }
                };

                // A dropped receiver only means no one is watching anymore.
                let _ = tx.send(CopyProgress {
                    source: record.full_path.clone(),
                    destination: dest_path,
                    outcome,
                });
            });
    });

    let stats = CopyStats {
        copied: copied.load(Ordering::Relaxed),
        failed: failed.load(Ordering::Relaxed),
        cancelled: cancelled.load(Ordering::Relaxed),
    };
    info!(
        copied = stats.copied,
        failed = stats.failed,
        cancelled = stats.cancelled,
        "Copy phase complete"
    );
    Ok(stats)
}

/// Create the bucket directory and copy one file, overwriting any
/// existing destination. Directory creation is idempotent, so concurrent
/// workers targeting the same bucket cannot race each other into failure.
fn copy_one(source: &Path, dest_dir: &Path, dest_path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dest_dir)?;
    copy_file(source, dest_path)?;

    // Keep the source's modification time on the copy
    if let Ok(metadata) = fs::metadata(source)
        && let Ok(mtime) = metadata.modified()
    {
        let _ = filetime::set_file_mtime(dest_path, filetime::FileTime::from_system_time(mtime));
    }

    Ok(())
}

/// Buffered copy; 256 KiB chunks
fn copy_file(source: &Path, dest: &Path) -> std::io::Result<()> {
    let src_file = File::open(source)?;
    let dest_file = File::create(dest)?;

    let mut reader = BufReader::with_capacity(256 * 1024, src_file);
    let mut writer = BufWriter::with_capacity(256 * 1024, dest_file);

    let mut buffer = vec![0u8; 256 * 1024];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        writer.write_all(&buffer[..bytes_read])?;
    }

    writer.flush()
}
