//! Capture-time extraction
//!
//! Two-tier fallback chain:
//! 1. EXIF metadata, for the JPEG family only
//! 2. Digits parsed out of the filename
//!
//! Cameras and phones embed reliable structured timestamps in JPEGs;
//! screenshots, GIFs and videos generally don't, so for those the digits
//! that messaging apps and cameras stamp into the name are the best
//! available signal.

pub mod exif;
pub mod filename;

use crate::config::JPEG_EXTENSIONS;
use crate::error::ExtractError;
use chrono::NaiveDateTime;
use std::path::Path;
use tracing::debug;

/// Extract the capture time for a file.
///
/// `extension` is the record's lower-cased extension (with leading dot).
/// Any EXIF failure, an unreadable file included, falls through to the
/// filename heuristic rather than failing the extraction outright.
pub fn extract_timestamp(path: &Path, extension: &str) -> Result<NaiveDateTime, ExtractError> {
    if JPEG_EXTENSIONS.contains(&extension) {
        match exif::extract_exif_time(path) {
            Ok(time) => {
                debug!(?path, %time, "Extracted capture time from EXIF");
                return Ok(time);
            }
            Err(e) => {
                debug!(?path, error = %e, "No EXIF capture time, trying filename");
            }
        }
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let time = filename::parse_filename_time(&name)?;
    debug!(?path, %time, "Extracted capture time from filename");
    Ok(time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use std::fs;

    #[test]
    fn test_non_jpeg_uses_filename_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Animated_2018-0305_093556.gif");
        fs::write(&path, b"GIF89a").unwrap();

        let time = extract_timestamp(&path, ".gif").unwrap();
        assert_eq!(
            (time.year(), time.month(), time.day()),
            (2018, 3, 5)
        );
        assert_eq!(
            (time.hour(), time.minute(), time.second()),
            (9, 35, 56)
        );
    }

    #[test]
    fn test_jpeg_without_exif_falls_back_to_filename() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("20130407_132135.jpg");
        fs::write(&path, b"not a real jpeg").unwrap();

        let time = extract_timestamp(&path, ".jpg").unwrap();
        assert_eq!(
            (time.year(), time.month(), time.day()),
            (2013, 4, 7)
        );
    }

    #[test]
    fn test_jpeg_without_exif_or_digits_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_exif.jpg");
        fs::write(&path, b"junk").unwrap();

        assert!(matches!(
            extract_timestamp(&path, ".jpg"),
            Err(ExtractError::NoYearInFilename { .. })
        ));
    }

    #[test]
    fn test_jpeg_with_exif_prefers_exif_over_filename() {
        let dir = tempfile::tempdir().unwrap();
        // Filename digits say 2000; the EXIF block says 2013.
        let path = dir.path().join("20000101_010101.jpg");
        fs::write(
            &path,
            super::exif::tests::minimal_exif_jpeg("2013:04:07 13:21:35"),
        )
        .unwrap();

        let time = extract_timestamp(&path, ".jpg").unwrap();
        assert_eq!(time.year(), 2013);
        assert_eq!(time.hour(), 13);
    }
}
