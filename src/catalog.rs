//! File discovery and the per-file record type

use crate::error::{Error, ExtractError, Result};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Category a record is assigned by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Extension was requested and a capture time was extracted
    Sortable,
    /// Extension was requested but no capture time could be extracted
    FailedExtraction,
    /// Extension was not requested by the current run
    Excluded,
}

/// One discovered filesystem entry, staged through the pipeline.
///
/// Created by [`catalog`]; `capture_time`/`extract_failure` are filled by
/// the extraction phase, `category` and the destination fields by
/// [`crate::classify`], `duplicate_rank` by [`crate::resolve_duplicates`].
/// The copy executor only reads.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Absolute path to the source file
    pub full_path: PathBuf,
    /// Base name component, with extension
    pub file_name: String,
    /// Lower-cased extension including the leading dot; empty when the
    /// file has none. Used for case-insensitive matching.
    pub extension: String,
    /// Extracted capture time, if any
    pub capture_time: Option<NaiveDateTime>,
    /// Why extraction failed, when it did
    pub extract_failure: Option<ExtractError>,
    /// Assigned category; set by the classifier
    pub category: Option<Category>,
    /// Destination directory relative to the destination root,
    /// e.g. `2019/12`, `failed_to_sort` or `other_files`
    pub dest_relative_dir: Option<PathBuf>,
    /// Final filename to write, after any duplicate suffix
    pub dest_file_name: Option<String>,
    /// 1-based rank among records sharing this capture time and extension
    pub duplicate_rank: Option<u32>,
    /// Whether this record is slated for the copy phase
    pub should_copy: bool,
}

impl FileRecord {
    /// Create a record for a discovered file. The path is made absolute so
    /// later log lines and progress events are unambiguous.
    pub fn new(path: &Path) -> std::io::Result<Self> {
        let full_path = std::path::absolute(path)?;
        let file_name = full_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = full_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default();

        Ok(Self {
            full_path,
            file_name,
            extension,
            capture_time: None,
            extract_failure: None,
            category: None,
            dest_relative_dir: None,
            dest_file_name: None,
            duplicate_rank: None,
            should_copy: false,
        })
    }
}

/// Walk `source_root` recursively and produce one record per regular file.
///
/// Symlinked directories are not descended into (cycle safety); files
/// reached via a symlink entry are included. The result is sorted by full
/// path so the catalog order is reproducible regardless of the platform's
/// directory iteration order.
pub fn catalog(source_root: &Path) -> Result<Vec<FileRecord>> {
    if !source_root.is_dir() {
        return Err(Error::DirectoryNotFound {
            path: source_root.to_path_buf(),
        });
    }

    let mut records = Vec::new();
    for entry in WalkDir::new(source_root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };

        let is_file =
            entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }

        records.push(FileRecord::new(entry.path())?);
    }

    // Traversal order is platform-dependent; sort for reproducible output.
    records.sort_by(|a, b| a.full_path.cmp(&b.full_path));

    info!(count = records.len(), source = %source_root.display(), "Cataloged files");
    debug!(files = ?records.iter().map(|r| &r.full_path).collect::<Vec<_>>());

    Ok(records)
}
