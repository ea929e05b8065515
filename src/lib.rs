//! Snapsort - sorts media files into a date-partitioned folder tree
//!
//! This library provides the classification-and-copy engine:
//! - Recursive, deterministic file discovery
//! - Capture-time extraction (EXIF metadata with a filename fallback)
//! - Classification into sortable / failed / other buckets
//! - Stable duplicate-timestamp disambiguation
//! - Bounded-parallel copying with progress events over a channel
//!
//! The CLI in `main.rs` is a thin consumer; any front-end that can drain
//! an `mpsc` channel of [`CopyProgress`] events can drive a [`Sorter`].

pub mod catalog;
pub mod classify;
pub mod cli;
pub mod config;
pub mod copy;
pub mod duplicates;
pub mod error;
pub mod sort;
pub mod time;

pub use catalog::{Category, FileRecord, catalog};
pub use classify::classify;
pub use cli::Cli;
pub use config::{ConfigError, RunOptions};
pub use copy::{CopyOutcome, CopyProgress, CopyStats, copy_all};
pub use duplicates::resolve_duplicates;
pub use error::{Error, ExtractError, Result};
pub use sort::{SortStats, Sorter};
pub use time::extract_timestamp;
