//! Duplicate-timestamp detection and deterministic disambiguation

use crate::catalog::{Category, FileRecord};
use crate::config::RunOptions;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use tracing::{debug, info};

/// Detect sortable records whose generated destination would collide and
/// assign each a stable 1-based rank.
///
/// Records are grouped by `(capture_time, extension)`; within a group
/// ranks follow ascending `full_path`, so reruns over the same file set
/// always hand the same rank to the same file. When `rename_duplicates`
/// is on, `_{rank:03}` is inserted before the extension. When off, names
/// are left alone and duplicates overwrite one another at the destination
/// (last writer wins) - intentional default behavior, surfaced only as an
/// aggregate count.
///
/// Returns the number of duplicate records found.
pub fn resolve_duplicates(records: &mut [FileRecord], options: &RunOptions) -> usize {
    // Group member indices by collision key; capture_time is always
    // present on sortable records.
    let mut groups: HashMap<(NaiveDateTime, String), Vec<usize>> = HashMap::new();
    for (index, record) in records.iter().enumerate() {
        if record.category != Some(Category::Sortable) {
            continue;
        }
        if let Some(time) = record.capture_time {
            groups
                .entry((time, record.extension.clone()))
                .or_default()
                .push(index);
        }
    }

    let mut duplicate_count = 0;
    for ((time, _ext), mut members) in groups {
        if members.len() < 2 {
            continue;
        }

        members.sort_by(|&a, &b| records[a].full_path.cmp(&records[b].full_path));
        for (rank0, index) in members.iter().enumerate() {
            let record = &mut records[*index];
            let rank = (rank0 + 1) as u32;
            record.duplicate_rank = Some(rank);
            duplicate_count += 1;

            if options.rename_duplicates
                && let Some(name) = record.dest_file_name.take()
            {
                record.dest_file_name = Some(ranked_file_name(&name, &record.extension, rank));
            }

            debug!(
                path = %record.full_path.display(),
                %time,
                rank,
                renamed = options.rename_duplicates,
                "Duplicate capture time"
            );
        }
    }

    if duplicate_count > 0 {
        info!(
            count = duplicate_count,
            renaming = options.rename_duplicates,
            "Found records with duplicate capture timestamps"
        );
    }

    duplicate_count
}

/// Insert `_{rank:03}` immediately before the extension.
fn ranked_file_name(name: &str, extension: &str, rank: u32) -> String {
    let stem = name.strip_suffix(extension).unwrap_or(name);
    format!("{stem}_{rank:03}{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use chrono::NaiveDate;
    use std::path::Path;

    fn sortable(path: &str, time: NaiveDateTime) -> FileRecord {
        let mut r = FileRecord::new(Path::new(path)).unwrap();
        r.capture_time = Some(time);
        r
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_ranks_follow_ascending_path() {
        let t = at(2013, 4, 8, 13, 17, 38);
        let mut records = vec![
            sortable("z/second.jpg", t),
            sortable("a/first.jpg", t),
            sortable("m/middle.jpg", t),
        ];
        let options = RunOptions {
            rename_duplicates: true,
            ..RunOptions::default()
        };
        classify(&mut records, &options);
        let count = resolve_duplicates(&mut records, &options);
        assert_eq!(count, 3);

        let rank_of = |needle: &str| {
            records
                .iter()
                .find(|r| r.full_path.to_string_lossy().contains(needle))
                .and_then(|r| r.duplicate_rank)
                .unwrap()
        };
        assert_eq!(rank_of("first"), 1);
        assert_eq!(rank_of("middle"), 2);
        assert_eq!(rank_of("second"), 3);
    }

    #[test]
    fn test_rename_inserts_padded_rank_before_extension() {
        let t = at(2013, 4, 8, 13, 17, 38);
        let mut records = vec![sortable("a.jpeg", t), sortable("b.jpeg", t)];
        let options = RunOptions {
            rename_duplicates: true,
            ..RunOptions::default()
        };
        classify(&mut records, &options);
        resolve_duplicates(&mut records, &options);

        assert_eq!(
            records[0].dest_file_name.as_deref(),
            Some("20130408_131738_001.jpeg")
        );
        assert_eq!(
            records[1].dest_file_name.as_deref(),
            Some("20130408_131738_002.jpeg")
        );
    }

    #[test]
    fn test_no_rename_leaves_colliding_names() {
        let t = at(2013, 4, 8, 13, 17, 38);
        let mut records = vec![sortable("a.jpg", t), sortable("b.jpg", t)];
        let options = RunOptions::default();
        classify(&mut records, &options);
        let count = resolve_duplicates(&mut records, &options);

        assert_eq!(count, 2);
        assert_eq!(records[0].duplicate_rank, Some(1));
        assert_eq!(records[1].duplicate_rank, Some(2));
        // Names untouched: the second copy overwrites the first.
        assert_eq!(
            records[0].dest_file_name,
            records[1].dest_file_name
        );
    }

    #[test]
    fn test_same_time_different_extension_is_no_collision() {
        let t = at(2013, 4, 8, 13, 17, 38);
        let mut records = vec![sortable("a.jpg", t), sortable("b.jpeg", t)];
        let options = RunOptions::default();
        classify(&mut records, &options);
        let count = resolve_duplicates(&mut records, &options);

        assert_eq!(count, 0);
        assert_eq!(records[0].duplicate_rank, None);
        assert_eq!(records[1].duplicate_rank, None);
    }

    #[test]
    fn test_unique_timestamps_get_no_rank() {
        let mut records = vec![
            sortable("a.jpg", at(2013, 4, 8, 13, 17, 38)),
            sortable("b.jpg", at(2013, 4, 8, 13, 17, 39)),
        ];
        let options = RunOptions::default();
        classify(&mut records, &options);
        assert_eq!(resolve_duplicates(&mut records, &options), 0);
        assert!(records.iter().all(|r| r.duplicate_rank.is_none()));
    }

    #[test]
    fn test_reruns_assign_identical_ranks() {
        let t = at(2013, 4, 8, 13, 17, 38);
        let build = || {
            vec![
                sortable("d.jpg", t),
                sortable("b.jpg", t),
                sortable("c.jpg", t),
                sortable("a.jpg", t),
            ]
        };
        let options = RunOptions {
            rename_duplicates: true,
            ..RunOptions::default()
        };

        let mut first = build();
        classify(&mut first, &options);
        resolve_duplicates(&mut first, &options);

        let mut second = build();
        // Different input order must not change the rank a path receives.
        second.reverse();
        classify(&mut second, &options);
        resolve_duplicates(&mut second, &options);

        for a in &first {
            let b = second
                .iter()
                .find(|r| r.full_path == a.full_path)
                .unwrap();
            assert_eq!(a.duplicate_rank, b.duplicate_rank);
            assert_eq!(a.dest_file_name, b.dest_file_name);
        }
    }
}
