//! Tile addressing.
//!
//! A mirrored dataset is a tree of tiles addressed by zoom/x/y. This module
//! provides the dataset type label and the canonical [`TileLocator`].

mod path;

pub use path::{parse_labeled_path, split_tile_path, TileLocator, TilePathError};

use std::fmt;
use std::str::FromStr;

/// Highest zoom level that can be selected for mirroring.
pub const MAX_ZOOM: u8 = 24;

/// Named variant of a tiled dataset, e.g. `std` or `pale`.
///
/// Each dataset type has its own remote namespace and local directory root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(transparent)]
pub struct DatasetType(String);

/// Error for dataset type labels that cannot name a directory.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid dataset type '{0}': expected a directory name that is not all digits")]
pub struct InvalidDatasetType(pub String);

impl DatasetType {
    /// Create a dataset type, validating the label.
    pub fn new(label: impl Into<String>) -> Result<Self, InvalidDatasetType> {
        let label = label.into();
        let trimmed = label.trim();
        let valid = !trimmed.is_empty()
            && !trimmed.contains(['/', '\\'])
            && !trimmed.chars().all(|c| c.is_ascii_digit())
            && trimmed != "."
            && trimmed != "..";
        if valid {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(InvalidDatasetType(label))
        }
    }

    /// The label as used in URLs and directory names.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DatasetType {
    type Err = InvalidDatasetType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Default for DatasetType {
    fn default() -> Self {
        Self("std".to_string())
    }
}
