//! Default values for every configuration key.

use std::path::PathBuf;

pub use crate::download::DEFAULT_WORKERS;
pub use crate::remote::{
    DEFAULT_DELTA_URL, DEFAULT_MANIFEST_URL, DEFAULT_TILE_URL, DEFAULT_TIMEOUT_SECS,
};
pub use crate::transcode::DEFAULT_QUALITY;

/// Default mirror root, the working directory.
pub const DEFAULT_ROOT_DIR: &str = ".";

/// Default dataset type.
pub const DEFAULT_DATASET: &str = "std";

/// Default zoom levels to mirror.
pub const DEFAULT_ZOOM_LEVELS: &[u8] = &[8, 12, 14];

/// Default extension of source tiles.
pub const DEFAULT_TILE_EXTENSION: &str = "png";

/// Name of the configuration directory under the home directory.
pub const CONFIG_DIR_NAME: &str = ".tilemirror";

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Get the path to the config directory (~/.tilemirror).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Get the path to the config file (~/.tilemirror/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

/// Default log file (~/.tilemirror/logs/tilemirror.log).
pub fn default_log_file() -> PathBuf {
    config_directory().join("logs").join("tilemirror.log")
}
