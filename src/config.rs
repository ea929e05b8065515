//! Run options for a sort operation

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions of the JPEG family, all of which may carry EXIF metadata.
/// Lower case, with the leading dot; matching is case-insensitive.
pub const JPEG_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".jif", ".jpe", ".jfif", ".jfi", ".jp2", ".jpx",
];

/// Configuration snapshot for one sort run.
///
/// Immutable for the duration of a run; the [`crate::Sorter`] takes a copy
/// at construction time so mid-run edits from a front-end cannot skew the
/// classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOptions {
    /// Sort the JPEG family (jpg, jpeg, jif, jpe, jfif, jfi, jp2, jpx)
    #[serde(default = "default_true")]
    pub sort_jpeg: bool,

    /// Sort PNG files
    #[serde(default)]
    pub sort_png: bool,

    /// Sort GIF files
    #[serde(default)]
    pub sort_gif: bool,

    /// Sort MP4 files
    #[serde(default)]
    pub sort_mp4: bool,

    /// Copy files whose extension was not requested into `other_files/`
    #[serde(default)]
    pub copy_unmatched: bool,

    /// Rename files sharing a capture timestamp with a `_NNN` suffix
    /// instead of letting them overwrite each other at the destination
    #[serde(default)]
    pub rename_duplicates: bool,

    /// Worker pool size for extraction and copying (0 = auto:
    /// half the logical CPUs, minimum 1)
    #[serde(default)]
    pub threads: usize,
}

fn default_true() -> bool {
    true
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            sort_jpeg: true,
            sort_png: false,
            sort_gif: false,
            sort_mp4: false,
            copy_unmatched: false,
            rename_duplicates: false,
            threads: 0,
        }
    }
}

impl RunOptions {
    /// The extension set requested for sorting, lower case with leading dot.
    pub fn requested_extensions(&self) -> Vec<String> {
        let mut exts = Vec::new();
        if self.sort_jpeg {
            exts.extend(JPEG_EXTENSIONS.iter().map(|e| e.to_string()));
        }
        if self.sort_png {
            exts.push(".png".to_string());
        }
        if self.sort_gif {
            exts.push(".gif".to_string());
        }
        if self.sort_mp4 {
            exts.push(".mp4".to_string());
        }
        exts
    }

    /// Check whether a lower-cased extension (with leading dot) is requested.
    pub fn is_requested(&self, extension: &str) -> bool {
        (self.sort_jpeg && JPEG_EXTENSIONS.contains(&extension))
            || (self.sort_png && extension == ".png")
            || (self.sort_gif && extension == ".gif")
            || (self.sort_mp4 && extension == ".mp4")
    }

    /// Effective worker pool size.
    ///
    /// Storage I/O, not CPU, is the usual bottleneck, so the default is
    /// half the logical CPU count, never less than one worker.
    pub fn worker_count(&self) -> usize {
        if self.threads > 0 {
            return self.threads;
        }
        std::thread::available_parallelism()
            .map(|n| (n.get() / 2).max(1))
            .unwrap_or(1)
    }

    /// Load options from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Save options to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# Snapsort configuration file (TOML)

# Extension groups to sort. JPEG covers: jpg, jpeg, jif, jpe, jfif, jfi, jp2, jpx
sort_jpeg = true
sort_png = false
sort_gif = false
sort_mp4 = false

# Copy files of unrequested types into other_files/
copy_unmatched = false

# Give files with colliding capture timestamps a _001/_002/... suffix
# instead of letting the last copy win
rename_duplicates = false

# Worker pool size (0 = auto: half the logical CPUs, minimum 1)
threads = 0
"#
        .to_string()
    }
}

/// Errors that can occur when loading or saving a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to write config file '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
}
