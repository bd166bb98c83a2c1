//! Per-dataset results of a mirror run.

use serde::Serialize;

use crate::download::DownloadReport;
use crate::reconcile::PlanStats;
use crate::tile::DatasetType;
use crate::transcode::TranscodeReport;

/// Catalog and index sizes seen while planning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    /// Tiles found on disk.
    pub local_tiles: usize,
    /// Local files skipped as non-canonical or unreadable.
    pub local_skipped: usize,
    /// Manifest entries read.
    pub manifest_entries: usize,
    /// Manifest rows skipped as malformed.
    pub manifest_skipped: usize,
    /// Days in the delta window.
    pub delta_days: usize,
    /// Delta entries for this dataset type across the window.
    pub delta_entries: usize,
    /// Delta rows skipped as malformed.
    pub delta_skipped: usize,
}

/// Cached catalog files removed after a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupSummary {
    pub manifest_removed: bool,
    pub deltas_removed: usize,
}

/// Everything that happened to one dataset type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetReport {
    pub dataset: DatasetType,
    pub catalog: CatalogSummary,
    pub plan: PlanStats,
    pub download: DownloadReport,
    pub cleanup: CleanupSummary,
    /// Present when the transcode pass ran.
    pub transcode: Option<TranscodeReport>,
}

impl DatasetReport {
    /// Whether every planned download completed without failure.
    pub fn is_clean(&self) -> bool {
        self.download.is_clean()
            && self
                .transcode
                .as_ref()
                .map_or(true, |t| t.failed.is_empty() && t.missing.is_empty())
    }
}
