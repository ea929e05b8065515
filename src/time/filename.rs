//! Filename timestamp parsing
//!
//! Strips the extension, requires a plausible 4-digit year somewhere in
//! the stem, then concatenates every digit of the stem and reads the run
//! as `YYYY[MM[DD[HH[MM[SS]]]]]`. This handles the digit stamps that
//! cameras, phones and messaging apps put into filenames, e.g.
//! `IMG_20130408_131738.jpg` or `Animated_2018-0305_093556.gif`.

use crate::error::ExtractError;
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;
use tracing::trace;

/// Years 1970-2099 as a bare substring, anywhere in the stem
static YEAR_PATTERN: OnceLock<Regex> = OnceLock::new();

fn year_pattern() -> &'static Regex {
    YEAR_PATTERN.get_or_init(|| Regex::new(r"(19[7-9][0-9]|20[0-9][0-9])").unwrap())
}

/// Parse a capture time out of a filename.
pub fn parse_filename_time(file_name: &str) -> Result<NaiveDateTime, ExtractError> {
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => file_name,
    };

    if !year_pattern().is_match(stem) {
        return Err(ExtractError::NoYearInFilename {
            name: file_name.to_string(),
        });
    }

    let digits: String = stem.chars().filter(|c| c.is_ascii_digit()).collect();
    trace!(file_name, digits, "Parsing digit run from filename");
    parse_digit_run(&digits)
}

/// Interpret a digit run as year/month/day[/hour[/minute[/second]]].
///
/// At least a full date (8 digits) is required; time components may be
/// truncated at any pair boundary and default to zero. Anything longer
/// than 14 digits or with a dangling half-pair is rejected rather than
/// guessed at.
fn parse_digit_run(digits: &str) -> Result<NaiveDateTime, ExtractError> {
    let unparsable = || ExtractError::UnparsableDigits {
        digits: digits.to_string(),
    };

    if digits.len() < 8 || digits.len() > 14 || digits.len() % 2 != 0 {
        return Err(unparsable());
    }

    let field = |range: std::ops::Range<usize>| -> Option<u32> {
        digits.get(range).and_then(|s| s.parse().ok())
    };

    let year = field(0..4).ok_or_else(unparsable)? as i32;
    let month = field(4..6).ok_or_else(unparsable)?;
    let day = field(6..8).ok_or_else(unparsable)?;
    let hour = if digits.len() >= 10 {
        field(8..10).ok_or_else(unparsable)?
    } else {
        0
    };
    let minute = if digits.len() >= 12 {
        field(10..12).ok_or_else(unparsable)?
    } else {
        0
    };
    let second = if digits.len() >= 14 {
        field(12..14).ok_or_else(unparsable)?
    } else {
        0
    };

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .ok_or_else(unparsable)
}
