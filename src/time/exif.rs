//! EXIF capture-time extraction for the JPEG family

use crate::error::ExtractError;
use chrono::NaiveDateTime;
use exif::{In, Reader, Tag};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::trace;

/// EXIF tags to try for date extraction, in priority order
const DATE_TAGS: &[Tag] = &[
    Tag::DateTimeOriginal,  // When the original image was taken
    Tag::DateTimeDigitized, // When the image was digitized
    Tag::DateTime,          // File modification date/time
];

/// Extract the capture time from a file's EXIF metadata.
pub fn extract_exif_time(path: &Path) -> Result<NaiveDateTime, ExtractError> {
    let file = File::open(path).map_err(|e| ExtractError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let mut reader = BufReader::new(file);

    let exif = Reader::new().read_from_container(&mut reader).map_err(|e| {
        ExtractError::MetadataUnavailable {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    // Try each date tag in priority order
    for tag in DATE_TAGS {
        if let Some(field) = exif.get_field(*tag, In::PRIMARY)
            && let Some(datetime) = parse_exif_datetime(&field.display_value().to_string())
        {
            trace!(?path, ?tag, "Found EXIF date");
            return Ok(datetime);
        }
    }

    Err(ExtractError::MetadataUnavailable {
        path: path.to_path_buf(),
        message: "no valid date tag in EXIF data".to_string(),
    })
}

/// Parse an EXIF datetime string.
///
/// The on-disk tag format is "YYYY:MM:DD HH:MM:SS", but
/// `Field::display_value()` renders datetime ASCII tags dash-separated
/// ("YYYY-MM-DD HH:MM:SS"), so both spellings must be accepted.
fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim().trim_matches('"');

    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y:%m:%d %H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }

    // Subsecond suffix, seen from some phone firmwares
    let formats = ["%Y:%m:%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
    for format in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    None
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use std::fs;

    /// Build the smallest JPEG that carries an EXIF `DateTimeOriginal`:
    /// SOI, one APP1 segment with a little-endian TIFF body, EOI.
    pub(crate) fn minimal_exif_jpeg(datetime: &str) -> Vec<u8> {
        assert_eq!(datetime.len(), 19, "EXIF datetimes are 19 chars");

        let mut tiff = Vec::new();
        tiff.extend_from_slice(b"II\x2a\x00");
        tiff.extend_from_slice(&8u32.to_le_bytes()); // IFD0 offset
        // IFD0: a single pointer to the Exif sub-IFD at offset 26
        tiff.extend_from_slice(&1u16.to_le_bytes());
        tiff.extend_from_slice(&0x8769u16.to_le_bytes());
        tiff.extend_from_slice(&4u16.to_le_bytes()); // LONG
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff.extend_from_slice(&26u32.to_le_bytes());
        tiff.extend_from_slice(&0u32.to_le_bytes()); // no next IFD
        // Exif IFD: DateTimeOriginal, ASCII x20, value at offset 44
        tiff.extend_from_slice(&1u16.to_le_bytes());
        tiff.extend_from_slice(&0x9003u16.to_le_bytes());
        tiff.extend_from_slice(&2u16.to_le_bytes()); // ASCII
        tiff.extend_from_slice(&20u32.to_le_bytes());
        tiff.extend_from_slice(&44u32.to_le_bytes());
        tiff.extend_from_slice(&0u32.to_le_bytes()); // no next IFD
        tiff.extend_from_slice(datetime.as_bytes());
        tiff.push(0);

        let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
        let app1_len = (2 + 6 + tiff.len()) as u16;
        jpeg.extend_from_slice(&app1_len.to_be_bytes());
        jpeg.extend_from_slice(b"Exif\x00\x00");
        jpeg.extend_from_slice(&tiff);
        jpeg.extend_from_slice(&[0xFF, 0xD9]);
        jpeg
    }

    #[test]
    fn test_parse_exif_datetime() {
        let dt = parse_exif_datetime("2024:01:15 14:30:00").unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 15);
        assert_eq!(dt.hour(), 14);
        assert_eq!(dt.minute(), 30);
        assert_eq!(dt.second(), 0);

        // display_value() can wrap ASCII fields in quotes
        let dt = parse_exif_datetime("\"2024:01:15 14:30:00\"").unwrap();
        assert_eq!(dt.year(), 2024);

        // display_value() renders datetime tags dash-separated
        let dt = parse_exif_datetime("2024-01-15 14:30:00").unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.minute(), 30);

        let dt = parse_exif_datetime("2024-01-15 14:30:00.123").unwrap();
        assert_eq!(dt.second(), 0);

        assert!(parse_exif_datetime("invalid").is_none());
        assert!(parse_exif_datetime("2024/01/15 14:30:00").is_none());
    }

    #[test]
    fn test_extract_from_minimal_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IMG_001.jpg");
        fs::write(&path, minimal_exif_jpeg("2013:04:07 13:21:35")).unwrap();

        let dt = extract_exif_time(&path).unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2013, 4, 7));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (13, 21, 35));
    }

    #[test]
    fn test_extract_from_non_jpeg_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.jpg");
        fs::write(&path, b"definitely not a jpeg").unwrap();

        assert!(matches!(
            extract_exif_time(&path),
            Err(ExtractError::MetadataUnavailable { .. })
        ));
    }

    #[test]
    fn test_extract_missing_file() {
        assert!(matches!(
            extract_exif_time(Path::new("/definitely/missing.jpg")),
            Err(ExtractError::Io { .. })
        ));
    }
}
