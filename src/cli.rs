//! CLI argument parsing with clap

use crate::config::RunOptions;
use clap::Parser;
use std::path::PathBuf;

/// Snapsort - sort photos and videos into a date-partitioned folder tree
///
/// Copies media files from SOURCE into DEST/YYYY/MM/ based on their
/// capture time, read from EXIF metadata when possible and from digits
/// in the filename otherwise. Requested files without an extractable
/// capture time go to DEST/failed_to_sort/; source files are never
/// modified or removed.
#[derive(Parser, Debug)]
#[command(name = "snapsort")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Source directory to scan recursively
    pub source: Option<PathBuf>,

    /// Destination root for the sorted tree
    pub destination: Option<PathBuf>,

    /// Path to a configuration file (TOML format)
    ///
    /// When given, the file supplies defaults and CLI flags override it.
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Do not sort the JPEG family (on by default)
    #[arg(long)]
    pub no_jpeg: bool,

    /// Also sort PNG files
    #[arg(long)]
    pub png: bool,

    /// Also sort GIF files
    #[arg(long)]
    pub gif: bool,

    /// Also sort MP4 files
    #[arg(long)]
    pub mp4: bool,

    /// Copy files of unrequested types into other_files/
    #[arg(long)]
    pub copy_other: bool,

    /// Rename capture-time collisions with a _001/_002/... suffix instead
    /// of letting the last copy win
    #[arg(short = 'r', long)]
    pub rename_duplicates: bool,

    /// Worker pool size (0 = auto: half the logical CPUs, minimum 1)
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Print a sample configuration file and exit
    #[arg(long)]
    pub sample_config: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Merge CLI flags over options loaded from a config file.
    /// Flags are additive overrides; absent flags leave the file's values.
    pub fn merge_with_options(&self, mut options: RunOptions) -> RunOptions {
        if self.no_jpeg {
            options.sort_jpeg = false;
        }
        if self.png {
            options.sort_png = true;
        }
        if self.gif {
            options.sort_gif = true;
        }
        if self.mp4 {
            options.sort_mp4 = true;
        }
        if self.copy_other {
            options.copy_unmatched = true;
        }
        if self.rename_duplicates {
            options.rename_duplicates = true;
        }
        if let Some(threads) = self.threads {
            options.threads = threads;
        }
        options
    }

    /// Build options from CLI flags alone (no config file given)
    pub fn to_options(&self) -> RunOptions {
        self.merge_with_options(RunOptions::default())
    }
}
