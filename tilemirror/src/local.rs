//! On-disk layout of a mirrored dataset.
//!
//! ```text
//! {root}/
//!   {type}/
//!     tmp/
//!       manifest.csv.gz
//!       {yyyymmdd}-delta.csv.gz
//!     {z}/{x}/{y}.{ext}
//!   {type}_jpg/
//!     {z}/{x}/{y}.jpg
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::remote::yyyymmdd;
use crate::tile::DatasetType;

/// Name of the cache directory inside a dataset root.
pub const CACHE_DIR_NAME: &str = "tmp";

/// File name of the cached manifest.
pub const MANIFEST_FILE_NAME: &str = "manifest.csv.gz";

/// Suffix of cached delta files, after the `yyyymmdd` date.
pub const DELTA_FILE_SUFFIX: &str = "-delta.csv.gz";

/// Default suffix appended to the dataset directory for transcoded output.
pub const DEFAULT_TRANSCODE_SUFFIX: &str = "_jpg";

/// Paths for one dataset type under a mirror root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalLayout {
    root: PathBuf,
    dataset: DatasetType,
}

impl LocalLayout {
    /// Layout of `dataset` under `root`.
    pub fn new(root: impl Into<PathBuf>, dataset: DatasetType) -> Self {
        Self {
            root: root.into(),
            dataset,
        }
    }

    /// The dataset type this layout belongs to.
    pub fn dataset(&self) -> &DatasetType {
        &self.dataset
    }

    /// Directory holding the tile tree, `{root}/{type}`.
    pub fn tile_root(&self) -> PathBuf {
        self.root.join(self.dataset.as_str())
    }

    /// Directory for cached catalog files, `{root}/{type}/tmp`.
    pub fn cache_dir(&self) -> PathBuf {
        self.tile_root().join(CACHE_DIR_NAME)
    }

    /// Cached manifest path.
    pub fn manifest_cache(&self) -> PathBuf {
        self.cache_dir().join(MANIFEST_FILE_NAME)
    }

    /// Cached delta path for a date.
    pub fn delta_cache(&self, date: NaiveDate) -> PathBuf {
        self.cache_dir()
            .join(format!("{}{}", yyyymmdd(date), DELTA_FILE_SUFFIX))
    }

    /// Glob pattern matching every cached delta file.
    pub fn delta_cache_pattern(&self) -> String {
        glob_pattern(&self.cache_dir(), &format!("*{}", DELTA_FILE_SUFFIX))
    }

    /// Output tree for transcoded tiles, `{root}/{type}{suffix}`.
    pub fn transcode_root(&self, suffix: &str) -> PathBuf {
        self.root.join(format!("{}{}", self.dataset.as_str(), suffix))
    }
}

/// Build a glob pattern rooted at `dir`, escaping glob metacharacters in the
/// directory part.
pub fn glob_pattern(dir: &Path, tail: &str) -> String {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    format!("{}/{}", escaped, tail)
}
