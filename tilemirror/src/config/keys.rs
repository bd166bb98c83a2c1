//! Configuration key access and validation.
//!
//! Type-safe get/set of configuration values by `section.key` name, used by
//! the `config` CLI commands.

use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use super::parser::{
    expand_tilde, parse_bool, parse_datasets, parse_extension, parse_quality, parse_timeout,
    parse_url_template, parse_workers, parse_zoom_levels,
};
use super::settings::ConfigFile;

/// Errors that can occur when getting or setting configuration values.
#[derive(Debug, Error)]
pub enum ConfigKeyError {
    /// Unknown configuration key.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    /// Validation failed for the value.
    #[error("Invalid value for {key}: {reason}")]
    ValidationFailed { key: String, reason: String },
}

/// Supported configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    // Mirror settings
    MirrorRootDir,
    MirrorDatasets,
    MirrorZoomLevels,
    MirrorWorkers,
    MirrorForceDownload,
    MirrorIncludeDeltaOnly,
    MirrorTileExtension,

    // Remote settings
    RemoteManifestUrl,
    RemoteDeltaUrl,
    RemoteTileUrl,
    RemoteTimeout,

    // Cleanup settings
    CleanupRemoveManifest,
    CleanupRemoveDelta,

    // Transcode settings
    TranscodeEnabled,
    TranscodeQuality,

    // Logging settings
    LoggingFile,
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|key| key.name() == s.to_lowercase())
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}

impl ConfigKey {
    /// Get the canonical key name (e.g., "mirror.zoom_levels").
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::MirrorRootDir => "mirror.root_dir",
            ConfigKey::MirrorDatasets => "mirror.datasets",
            ConfigKey::MirrorZoomLevels => "mirror.zoom_levels",
            ConfigKey::MirrorWorkers => "mirror.workers",
            ConfigKey::MirrorForceDownload => "mirror.force_download",
            ConfigKey::MirrorIncludeDeltaOnly => "mirror.include_delta_only",
            ConfigKey::MirrorTileExtension => "mirror.tile_extension",
            ConfigKey::RemoteManifestUrl => "remote.manifest_url",
            ConfigKey::RemoteDeltaUrl => "remote.delta_url",
            ConfigKey::RemoteTileUrl => "remote.tile_url",
            ConfigKey::RemoteTimeout => "remote.timeout",
            ConfigKey::CleanupRemoveManifest => "cleanup.remove_manifest",
            ConfigKey::CleanupRemoveDelta => "cleanup.remove_delta",
            ConfigKey::TranscodeEnabled => "transcode.enabled",
            ConfigKey::TranscodeQuality => "transcode.quality",
            ConfigKey::LoggingFile => "logging.file",
        }
    }

    /// Get the section name (e.g., "mirror").
    pub fn section(&self) -> &'static str {
        self.name().split('.').next().unwrap_or("")
    }

    /// Get the key name within the section (e.g., "zoom_levels").
    pub fn key_name(&self) -> &'static str {
        self.name().split('.').nth(1).unwrap_or(self.name())
    }

    /// Get the value from a config file as a string.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::MirrorRootDir => path_to_display(&config.mirror.root_dir),
            ConfigKey::MirrorDatasets => config
                .mirror
                .datasets
                .iter()
                .map(|d| d.as_str())
                .collect::<Vec<_>>()
                .join(","),
            ConfigKey::MirrorZoomLevels => config
                .mirror
                .zoom_levels
                .iter()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join(","),
            ConfigKey::MirrorWorkers => config.mirror.workers.to_string(),
            ConfigKey::MirrorForceDownload => config.mirror.force_download.to_string(),
            ConfigKey::MirrorIncludeDeltaOnly => config.mirror.include_delta_only.to_string(),
            ConfigKey::MirrorTileExtension => config.mirror.tile_extension.clone(),
            ConfigKey::RemoteManifestUrl => config.remote.manifest_url.clone(),
            ConfigKey::RemoteDeltaUrl => config.remote.delta_url.clone(),
            ConfigKey::RemoteTileUrl => config.remote.tile_url.clone(),
            ConfigKey::RemoteTimeout => config.remote.timeout.to_string(),
            ConfigKey::CleanupRemoveManifest => config.cleanup.remove_manifest.to_string(),
            ConfigKey::CleanupRemoveDelta => config.cleanup.remove_delta.to_string(),
            ConfigKey::TranscodeEnabled => config.transcode.enabled.to_string(),
            ConfigKey::TranscodeQuality => config.transcode.quality.to_string(),
            ConfigKey::LoggingFile => path_to_display(&config.logging.file),
        }
    }

    /// Set the value in a config file.
    ///
    /// The value is validated with the same rules as the INI parser; the
    /// config is left untouched when validation fails.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        let fail = |reason: String| ConfigKeyError::ValidationFailed {
            key: self.name().to_string(),
            reason,
        };
        let value = value.trim();

        match self {
            ConfigKey::MirrorRootDir => {
                if value.is_empty() {
                    return Err(fail("must not be empty".to_string()));
                }
                config.mirror.root_dir = expand_tilde(value);
            }
            ConfigKey::MirrorDatasets => {
                config.mirror.datasets = parse_datasets(value).map_err(fail)?;
            }
            ConfigKey::MirrorZoomLevels => {
                config.mirror.zoom_levels = parse_zoom_levels(value).map_err(fail)?;
            }
            ConfigKey::MirrorWorkers => {
                config.mirror.workers = parse_workers(value).map_err(fail)?;
            }
            ConfigKey::MirrorForceDownload => {
                config.mirror.force_download = parse_bool(value).map_err(fail)?;
            }
            ConfigKey::MirrorIncludeDeltaOnly => {
                config.mirror.include_delta_only = parse_bool(value).map_err(fail)?;
            }
            ConfigKey::MirrorTileExtension => {
                config.mirror.tile_extension = parse_extension(value).map_err(fail)?;
            }
            ConfigKey::RemoteManifestUrl => {
                config.remote.manifest_url =
                    parse_url_template(value, &["{type}"]).map_err(fail)?;
            }
            ConfigKey::RemoteDeltaUrl => {
                config.remote.delta_url = parse_url_template(value, &["{date}"]).map_err(fail)?;
            }
            ConfigKey::RemoteTileUrl => {
                config.remote.tile_url =
                    parse_url_template(value, &["{z}", "{x}", "{y}"]).map_err(fail)?;
            }
            ConfigKey::RemoteTimeout => {
                config.remote.timeout = parse_timeout(value).map_err(fail)?;
            }
            ConfigKey::CleanupRemoveManifest => {
                config.cleanup.remove_manifest = parse_bool(value).map_err(fail)?;
            }
            ConfigKey::CleanupRemoveDelta => {
                config.cleanup.remove_delta = parse_bool(value).map_err(fail)?;
            }
            ConfigKey::TranscodeEnabled => {
                config.transcode.enabled = parse_bool(value).map_err(fail)?;
            }
            ConfigKey::TranscodeQuality => {
                config.transcode.quality = parse_quality(value).map_err(fail)?;
            }
            ConfigKey::LoggingFile => {
                if value.is_empty() {
                    return Err(fail("must not be empty".to_string()));
                }
                config.logging.file = expand_tilde(value);
            }
        }
        Ok(())
    }

    /// Every key, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::MirrorRootDir,
            ConfigKey::MirrorDatasets,
            ConfigKey::MirrorZoomLevels,
            ConfigKey::MirrorWorkers,
            ConfigKey::MirrorForceDownload,
            ConfigKey::MirrorIncludeDeltaOnly,
            ConfigKey::MirrorTileExtension,
            ConfigKey::RemoteManifestUrl,
            ConfigKey::RemoteDeltaUrl,
            ConfigKey::RemoteTileUrl,
            ConfigKey::RemoteTimeout,
            ConfigKey::CleanupRemoveManifest,
            ConfigKey::CleanupRemoveDelta,
            ConfigKey::TranscodeEnabled,
            ConfigKey::TranscodeQuality,
            ConfigKey::LoggingFile,
        ]
    }
}

fn path_to_display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_round_trip() {
        for key in ConfigKey::all() {
            let parsed: ConfigKey = key.name().parse().unwrap();
            assert_eq!(parsed, *key);
        }
    }

    #[test]
    fn test_key_parse_is_case_insensitive() {
        let key: ConfigKey = "Mirror.Workers".parse().unwrap();
        assert_eq!(key, ConfigKey::MirrorWorkers);
    }

    #[test]
    fn test_unknown_key() {
        let result: Result<ConfigKey, _> = "mirror.nope".parse();
        assert!(matches!(result, Err(ConfigKeyError::UnknownKey(_))));
    }

    #[test]
    fn test_section_and_key_name() {
        assert_eq!(ConfigKey::RemoteTileUrl.section(), "remote");
        assert_eq!(ConfigKey::RemoteTileUrl.key_name(), "tile_url");
    }

    #[test]
    fn test_set_then_get() {
        let mut config = ConfigFile::default();
        let cases = [
            (ConfigKey::MirrorDatasets, "std,pale", "std,pale"),
            (ConfigKey::MirrorZoomLevels, "16 14", "14,16"),
            (ConfigKey::MirrorWorkers, "32", "32"),
            (ConfigKey::MirrorForceDownload, "yes", "true"),
            (ConfigKey::MirrorTileExtension, "JPG", "jpg"),
            (ConfigKey::RemoteTimeout, "30", "30"),
            (ConfigKey::CleanupRemoveDelta, "false", "false"),
            (ConfigKey::TranscodeQuality, "90", "90"),
        ];

        for (key, input, expected) in cases {
            key.set(&mut config, input).unwrap();
            assert_eq!(key.get(&config), expected, "{}", key.name());
        }
    }

    #[test]
    fn test_set_rejects_invalid_and_keeps_value() {
        let mut config = ConfigFile::default();

        let result = ConfigKey::MirrorWorkers.set(&mut config, "-1");

        assert!(matches!(result, Err(ConfigKeyError::ValidationFailed { .. })));
        assert_eq!(config.mirror.workers, ConfigFile::default().mirror.workers);
    }

    #[test]
    fn test_every_key_has_a_value() {
        let config = ConfigFile::default();
        for key in ConfigKey::all() {
            assert!(!key.get(&config).is_empty(), "{} is empty", key.name());
        }
    }
}
