//! Mirror pipeline.
//!
//! Runs the full sequence for each dataset type:
//!
//! ```text
//! prepare dirs → local index → manifest → delta window → reconcile
//!     → dispatch (reporter polls) → cleanup cached catalogs → transcode
//! ```
//!
//! Setup failures (directories, cached catalog I/O) abort the run with a
//! [`MirrorError`]. Everything after planning is best effort and lands in
//! the [`DatasetReport`].

mod config;
mod error;
mod report;

pub use config::MirrorConfig;
pub use error::{MirrorError, MirrorResult};
pub use report::{CatalogSummary, CleanupSummary, DatasetReport};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::{DeltaSource, ManifestSource};
use crate::download::{Dispatcher, ProgressCallback};
use crate::index::LocalIndex;
use crate::local::{LocalLayout, DEFAULT_TRANSCODE_SUFFIX};
use crate::reconcile::{ReconcilePlan, Reconciler};
use crate::remote::{HttpClient, OfflineClient};
use crate::tile::DatasetType;
use crate::transcode::{TranscodeReport, Transcoder};

/// Reconciled plan for one dataset type, before any download.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedDataset {
    pub dataset: DatasetType,
    pub catalog: CatalogSummary,
    pub plan: ReconcilePlan,
}

/// Mirrors one or more dataset types into a local root.
pub struct Mirror {
    config: MirrorConfig,
    client: Arc<dyn HttpClient>,
}

impl Mirror {
    /// Create a mirror, validating the configuration.
    pub fn new(config: MirrorConfig, client: Arc<dyn HttpClient>) -> MirrorResult<Self> {
        if config.datasets.is_empty() {
            return Err(MirrorError::InvalidConfig(
                "no dataset types selected".to_string(),
            ));
        }
        if config.zoom_levels.is_empty() {
            return Err(MirrorError::InvalidConfig(
                "no zoom levels selected".to_string(),
            ));
        }
        if config.workers == 0 {
            return Err(MirrorError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }
        Ok(Self { config, client })
    }

    /// Create a mirror that never touches the network.
    ///
    /// For local operations such as [`Mirror::clean_dataset`] and
    /// [`Mirror::transcode_dataset`]. Catalog and tile requests fail like
    /// any unreachable server would.
    pub fn offline(config: MirrorConfig) -> MirrorResult<Self> {
        Self::new(config, Arc::new(OfflineClient))
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Local layout of a dataset type under the configured root.
    pub fn layout(&self, dataset: &DatasetType) -> LocalLayout {
        LocalLayout::new(&self.config.root_dir, dataset.clone())
    }

    /// Last day of the delta window.
    pub fn today(&self) -> NaiveDate {
        self.config
            .today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Mirror every configured dataset type in order.
    ///
    /// Stops at the first setup failure.
    pub fn run(&self, on_progress: Option<ProgressCallback>) -> MirrorResult<Vec<DatasetReport>> {
        self.config
            .datasets
            .iter()
            .map(|dataset| self.sync_dataset(dataset, on_progress.clone()))
            .collect()
    }

    /// Build the index, load catalogs and reconcile, without downloading.
    pub fn plan_dataset(&self, dataset: &DatasetType) -> MirrorResult<PlannedDataset> {
        let layout = self.layout(dataset);
        self.prepare_dirs(&layout)?;
        let tile_root = layout.tile_root();

        info!(dataset = %dataset, root = %tile_root.display(), "Building local index");
        let local = LocalIndex::scan(&tile_root, &self.config.tile_extension);

        let manifest = self.manifest_source(&layout).fetch()?;
        let deltas = self.delta_source(&layout).fetch_window(self.today())?;

        let catalog = CatalogSummary {
            local_tiles: local.len(),
            local_skipped: local.skipped(),
            manifest_entries: manifest.len(),
            manifest_skipped: manifest.skipped,
            delta_days: deltas.len(),
            delta_entries: deltas.iter().map(|b| b.entries.len()).sum(),
            delta_skipped: deltas.iter().map(|b| b.skipped).sum(),
        };

        let reconciler = Reconciler::new(
            dataset.clone(),
            self.config.remote.clone(),
            tile_root,
            self.config.zoom_levels.iter().copied(),
        )
        .with_delta_only(self.config.delta_only);
        let plan = reconciler.reconcile(&manifest.entries, &deltas, &local);

        Ok(PlannedDataset {
            dataset: dataset.clone(),
            catalog,
            plan,
        })
    }

    /// Plan, download, clean up and optionally transcode one dataset type.
    pub fn sync_dataset(
        &self,
        dataset: &DatasetType,
        on_progress: Option<ProgressCallback>,
    ) -> MirrorResult<DatasetReport> {
        let planned = self.plan_dataset(dataset)?;
        let stats = planned.plan.stats;

        let download = self.dispatcher().run(planned.plan.jobs, on_progress);

        let cleanup = self.cleanup(dataset);

        let transcode = self
            .config
            .transcode_quality
            .map(|quality| self.transcode_dataset(dataset, &download.written_paths, quality));

        Ok(DatasetReport {
            dataset: dataset.clone(),
            catalog: planned.catalog,
            plan: stats,
            download,
            cleanup,
            transcode,
        })
    }

    /// Delete every cached catalog file of a dataset type.
    pub fn clean_dataset(&self, dataset: &DatasetType) -> MirrorResult<CleanupSummary> {
        let layout = self.layout(dataset);
        let summary = CleanupSummary {
            manifest_removed: self.manifest_source(&layout).remove_cached()?,
            deltas_removed: self.delta_source(&layout).remove_cached()?,
        };
        // Leave the directory behind if anything else lives there
        let _ = fs::remove_dir(layout.cache_dir());
        Ok(summary)
    }

    /// Convert unconverted and `fresh` tiles of a dataset type to JPEG.
    pub fn transcode_dataset(
        &self,
        dataset: &DatasetType,
        fresh: &[PathBuf],
        quality: u8,
    ) -> TranscodeReport {
        let layout = self.layout(dataset);
        Transcoder::new(
            layout.tile_root(),
            layout.transcode_root(DEFAULT_TRANSCODE_SUFFIX),
        )
        .with_source_ext(self.config.tile_extension.clone())
        .with_quality(quality)
        .convert(fresh)
    }

    /// Remove cached catalogs according to the cleanup settings.
    ///
    /// Failures here are reported but don't fail the run.
    fn cleanup(&self, dataset: &DatasetType) -> CleanupSummary {
        let layout = self.layout(dataset);
        let mut summary = CleanupSummary::default();

        if self.config.remove_manifest {
            match self.manifest_source(&layout).remove_cached() {
                Ok(removed) => summary.manifest_removed = removed,
                Err(e) => warn!(error = %e, "Failed to remove cached manifest"),
            }
        }
        if self.config.remove_delta {
            match self.delta_source(&layout).remove_cached() {
                Ok(removed) => summary.deltas_removed = removed,
                Err(e) => warn!(error = %e, "Failed to remove cached deltas"),
            }
        }
        summary
    }

    fn prepare_dirs(&self, layout: &LocalLayout) -> MirrorResult<()> {
        create_dir(&layout.tile_root())?;
        create_dir(&layout.cache_dir())
    }

    fn manifest_source(&self, layout: &LocalLayout) -> ManifestSource {
        ManifestSource::new(
            Arc::clone(&self.client),
            self.config.remote.clone(),
            layout.clone(),
            self.config.force_download,
        )
    }

    fn delta_source(&self, layout: &LocalLayout) -> DeltaSource {
        DeltaSource::new(
            Arc::clone(&self.client),
            self.config.remote.clone(),
            layout.clone(),
            self.config.force_download,
        )
    }

    fn dispatcher(&self) -> Dispatcher {
        if self.config.sequential {
            Dispatcher::sequential(Arc::clone(&self.client))
        } else {
            Dispatcher::new(Arc::clone(&self.client), self.config.workers)
        }
    }
}

fn create_dir(path: &Path) -> MirrorResult<()> {
    fs::create_dir_all(path).map_err(|source| MirrorError::CreateDirFailed {
        path: path.to_path_buf(),
        source,
    })
}
