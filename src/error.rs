//! Error types for snapsort

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for snapsort operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal, run-level errors.
///
/// Per-file problems never surface here; they are captured as
/// [`ExtractError`] on the affected record or reported as a failed copy
/// event, and the run continues.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory not found or not a directory: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Per-file timestamp extraction failures.
///
/// Extraction always resolves to a timestamp or one of these; it never
/// aborts a run. The classifier routes affected records to the
/// `failed_to_sort` bucket when their extension was requested.
#[derive(Error, Debug, Clone)]
pub enum ExtractError {
    #[error("no usable capture-time tag in metadata of {path}: {message}")]
    MetadataUnavailable { path: PathBuf, message: String },

    #[error("no year between 1970 and 2099 in filename {name:?}")]
    NoYearInFilename { name: String },

    #[error("digit run {digits:?} from filename does not form a date-time")]
    UnparsableDigits { digits: String },

    #[error("IO error reading {path}: {message}")]
    Io { path: PathBuf, message: String },
}
