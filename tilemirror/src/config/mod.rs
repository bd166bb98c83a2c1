//! User configuration.
//!
//! The configuration lives in `~/.tilemirror/config.ini`:
//!
//! ```ini
//! [mirror]
//! root_dir = /srv/gsi
//! datasets = std,pale
//! zoom_levels = 8,12,14
//! workers = 10
//!
//! [transcode]
//! enabled = true
//! quality = 85
//! ```
//!
//! A missing file yields defaults. Command-line flags override file values.

mod defaults;
mod file;
mod keys;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::ConfigFileError;
pub use keys::{ConfigKey, ConfigKeyError};
pub use parser::{expand_tilde, parse_bool, parse_datasets, parse_zoom_levels};
pub use settings::{
    CleanupSettings, ConfigFile, LoggingSettings, MirrorSettings, RemoteSettings,
    TranscodeSettings,
};
