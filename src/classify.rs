//! Classification of cataloged records into destination buckets

use crate::catalog::{Category, FileRecord};
use crate::config::RunOptions;
use chrono::{Datelike, NaiveDateTime, Timelike};
use std::path::PathBuf;
use tracing::debug;

/// Assign every record its category, destination fields and copy flag.
///
/// Pure per record: the outcome depends only on that record and the
/// options, so classifying twice yields identical destinations.
///
/// Rules, in priority order:
/// - requested extension + extracted capture time: sortable, filed under
///   `YYYY/MM/` with a generated `YYYYMMDD_HHMMSS` name
/// - requested extension, extraction failed: preserved byte-for-byte under
///   `failed_to_sort/` for manual review; the user asked for these files,
///   so they are never silently dropped
/// - anything else: `other_files/`, copied only when `copy_unmatched` is on
pub fn classify(records: &mut [FileRecord], options: &RunOptions) {
    for record in records.iter_mut() {
        let requested = options.is_requested(&record.extension);

        match (record.capture_time, requested) {
            (Some(time), true) => {
                record.category = Some(Category::Sortable);
                record.dest_relative_dir = Some(
                    PathBuf::from(format!("{:04}", time.year())).join(format!("{:02}", time.month())),
                );
                record.dest_file_name = Some(generated_file_name(&time, &record.extension));
                record.should_copy = true;
            }
            (None, true) => {
                record.category = Some(Category::FailedExtraction);
                record.dest_relative_dir = Some(PathBuf::from("failed_to_sort"));
                record.dest_file_name = Some(record.file_name.clone());
                record.should_copy = true;
            }
            (_, false) => {
                record.category = Some(Category::Excluded);
                record.dest_relative_dir = Some(PathBuf::from("other_files"));
                record.dest_file_name = Some(record.file_name.clone());
                record.should_copy = options.copy_unmatched;
            }
        }

        debug!(
            path = %record.full_path.display(),
            category = ?record.category,
            dest = ?record.dest_relative_dir,
            name = ?record.dest_file_name,
            copy = record.should_copy,
            "Classified"
        );
    }
}

/// `YYYYMMDD_HHMMSS<ext>`, zero-padded, lower-cased extension.
fn generated_file_name(time: &NaiveDateTime, extension: &str) -> String {
    format!(
        "{:04}{:02}{:02}_{:02}{:02}{:02}{}",
        time.year(),
        time.month(),
        time.day(),
        time.hour(),
        time.minute(),
        time.second(),
        extension
    )
}
