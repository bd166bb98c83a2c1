//! Configuration for a mirror run.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::config::ConfigFile;
use crate::download::DEFAULT_WORKERS;
use crate::reconcile::DeltaOnlyPolicy;
use crate::remote::RemoteLayout;
use crate::tile::DatasetType;

/// Configuration for a mirror run.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Directory holding one subdirectory per dataset type.
    pub root_dir: PathBuf,

    /// Dataset types to mirror, in order.
    pub datasets: Vec<DatasetType>,

    /// Zoom levels to mirror.
    pub zoom_levels: Vec<u8>,

    /// Number of download worker threads.
    pub workers: usize,

    /// Run downloads on the calling thread instead of a worker pool.
    pub sequential: bool,

    /// Re-download cached manifest and delta files.
    pub force_download: bool,

    /// Delete the cached manifest after the run.
    pub remove_manifest: bool,

    /// Delete cached delta files after the run.
    pub remove_delta: bool,

    /// Handling of tiles listed only in deltas.
    pub delta_only: DeltaOnlyPolicy,

    /// Extension of tiles on disk.
    pub tile_extension: String,

    /// JPEG quality of the transcode pass, `None` to skip it.
    pub transcode_quality: Option<u8>,

    /// Remote URL templates.
    pub remote: RemoteLayout,

    /// Last day of the delta window. Defaults to the local date.
    pub today: Option<NaiveDate>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            datasets: vec![DatasetType::default()],
            zoom_levels: vec![8, 12, 14],
            workers: DEFAULT_WORKERS,
            sequential: false,
            force_download: false,
            remove_manifest: true,
            remove_delta: true,
            delta_only: DeltaOnlyPolicy::Ignore,
            tile_extension: "png".to_string(),
            transcode_quality: None,
            remote: RemoteLayout::default(),
            today: None,
        }
    }
}

impl MirrorConfig {
    /// Create a configuration mirroring into `root_dir`.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            ..Default::default()
        }
    }

    /// Build a configuration from the user's config file.
    pub fn from_config_file(config: &ConfigFile) -> Self {
        Self {
            root_dir: config.mirror.root_dir.clone(),
            datasets: config.mirror.datasets.clone(),
            zoom_levels: config.mirror.zoom_levels.clone(),
            workers: config.mirror.workers,
            sequential: false,
            force_download: config.mirror.force_download,
            remove_manifest: config.cleanup.remove_manifest,
            remove_delta: config.cleanup.remove_delta,
            delta_only: if config.mirror.include_delta_only {
                DeltaOnlyPolicy::Include
            } else {
                DeltaOnlyPolicy::Ignore
            },
            tile_extension: config.mirror.tile_extension.clone(),
            transcode_quality: config
                .transcode
                .enabled
                .then_some(config.transcode.quality),
            remote: config.remote_layout(),
            today: None,
        }
    }

    /// Set the dataset types.
    pub fn with_datasets(mut self, datasets: Vec<DatasetType>) -> Self {
        self.datasets = datasets;
        self
    }

    /// Set the zoom levels.
    pub fn with_zoom_levels(mut self, zoom_levels: Vec<u8>) -> Self {
        self.zoom_levels = zoom_levels;
        self
    }

    /// Set the number of worker threads.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Run downloads sequentially.
    pub fn with_sequential(mut self, sequential: bool) -> Self {
        self.sequential = sequential;
        self
    }

    /// Enable or disable forced catalog downloads.
    pub fn with_force_download(mut self, force: bool) -> Self {
        self.force_download = force;
        self
    }

    /// Choose which cached catalogs are deleted after the run.
    pub fn with_cleanup(mut self, remove_manifest: bool, remove_delta: bool) -> Self {
        self.remove_manifest = remove_manifest;
        self.remove_delta = remove_delta;
        self
    }

    /// Set the delta-only policy.
    pub fn with_delta_only(mut self, policy: DeltaOnlyPolicy) -> Self {
        self.delta_only = policy;
        self
    }

    /// Set the tile extension.
    pub fn with_tile_extension(mut self, ext: impl Into<String>) -> Self {
        self.tile_extension = ext.into();
        self
    }

    /// Enable the transcode pass at `quality`, or disable it with `None`.
    pub fn with_transcode(mut self, quality: Option<u8>) -> Self {
        self.transcode_quality = quality;
        self
    }

    /// Set the remote URL templates.
    pub fn with_remote(mut self, remote: RemoteLayout) -> Self {
        self.remote = remote;
        self
    }

    /// Pin the last day of the delta window.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MirrorConfig::default();
        assert_eq!(config.datasets, vec![DatasetType::default()]);
        assert_eq!(config.zoom_levels, vec![8, 12, 14]);
        assert_eq!(config.workers, 10);
        assert!(config.remove_manifest);
        assert!(config.remove_delta);
        assert_eq!(config.delta_only, DeltaOnlyPolicy::Ignore);
        assert!(config.transcode_quality.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let config = MirrorConfig::new("/srv/tiles")
            .with_zoom_levels(vec![16])
            .with_workers(2)
            .with_cleanup(false, true)
            .with_delta_only(DeltaOnlyPolicy::Include)
            .with_transcode(Some(70))
            .with_today(today);

        assert_eq!(config.root_dir, PathBuf::from("/srv/tiles"));
        assert_eq!(config.zoom_levels, vec![16]);
        assert_eq!(config.workers, 2);
        assert!(!config.remove_manifest);
        assert_eq!(config.delta_only, DeltaOnlyPolicy::Include);
        assert_eq!(config.transcode_quality, Some(70));
        assert_eq!(config.today, Some(today));
    }

    #[test]
    fn test_from_config_file() {
        let mut file = ConfigFile::default();
        file.mirror.include_delta_only = true;
        file.transcode.enabled = true;
        file.transcode.quality = 40;
        file.cleanup.remove_manifest = false;

        let config = MirrorConfig::from_config_file(&file);

        assert_eq!(config.delta_only, DeltaOnlyPolicy::Include);
        assert_eq!(config.transcode_quality, Some(40));
        assert!(!config.remove_manifest);
        assert_eq!(config.remote, RemoteLayout::default());
    }
}
