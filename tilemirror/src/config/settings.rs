//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.

use std::path::PathBuf;

use super::defaults::*;
use crate::remote::RemoteLayout;
use crate::tile::DatasetType;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    /// What to mirror and where
    pub mirror: MirrorSettings,
    /// Remote URL templates and transport
    pub remote: RemoteSettings,
    /// Cached catalog cleanup after a run
    pub cleanup: CleanupSettings,
    /// JPEG post-pass
    pub transcode: TranscodeSettings,
    /// Logging
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Remote layout built from the `[remote]` templates.
    pub fn remote_layout(&self) -> RemoteLayout {
        RemoteLayout {
            manifest_url: self.remote.manifest_url.clone(),
            delta_url: self.remote.delta_url.clone(),
            tile_url: self.remote.tile_url.clone(),
        }
    }
}

/// `[mirror]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorSettings {
    /// Directory holding one subdirectory per dataset type
    pub root_dir: PathBuf,
    /// Dataset types to mirror
    pub datasets: Vec<DatasetType>,
    /// Zoom levels to mirror
    pub zoom_levels: Vec<u8>,
    /// Number of download workers
    pub workers: usize,
    /// Re-download cached manifest and delta files
    pub force_download: bool,
    /// Also fetch tiles that appear only in deltas
    pub include_delta_only: bool,
    /// Extension of source tiles
    pub tile_extension: String,
}

impl Default for MirrorSettings {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from(DEFAULT_ROOT_DIR),
            datasets: vec![DatasetType::default()],
            zoom_levels: DEFAULT_ZOOM_LEVELS.to_vec(),
            workers: DEFAULT_WORKERS,
            force_download: false,
            include_delta_only: false,
            tile_extension: DEFAULT_TILE_EXTENSION.to_string(),
        }
    }
}

/// `[remote]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSettings {
    pub manifest_url: String,
    pub delta_url: String,
    pub tile_url: String,
    /// Per-request timeout in seconds
    pub timeout: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            manifest_url: DEFAULT_MANIFEST_URL.to_string(),
            delta_url: DEFAULT_DELTA_URL.to_string(),
            tile_url: DEFAULT_TILE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// `[cleanup]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupSettings {
    pub remove_manifest: bool,
    pub remove_delta: bool,
}

impl Default for CleanupSettings {
    fn default() -> Self {
        Self {
            remove_manifest: true,
            remove_delta: true,
        }
    }
}

/// `[transcode]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeSettings {
    pub enabled: bool,
    /// JPEG quality, 1-100
    pub quality: u8,
}

impl Default for TranscodeSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            quality: DEFAULT_QUALITY,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub file: PathBuf,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: default_log_file(),
        }
    }
}
