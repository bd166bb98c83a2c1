//! Download jobs and their outcomes.

use std::path::PathBuf;

use serde::Serialize;

use crate::tile::TileLocator;

/// One pending fetch-and-write for a single tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadJob {
    /// Tile being fetched.
    pub locator: TileLocator,
    /// Source URL.
    pub url: String,
    /// File the body is written to.
    pub destination: PathBuf,
}

impl DownloadJob {
    pub fn new(locator: TileLocator, url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            locator,
            url: url.into(),
            destination: destination.into(),
        }
    }
}

/// Result of running one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Body fetched and written to the destination.
    Written { bytes: u64 },
    /// Remote object doesn't exist. Not an error.
    NotFound,
    /// Transport failure, unexpected status or write failure.
    Failed { reason: String },
}

impl DownloadOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written { .. })
    }
}
