//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let datasets = config
        .mirror
        .datasets
        .iter()
        .map(|d| d.as_str())
        .collect::<Vec<_>>()
        .join(",");

    format!(
        r#"[mirror]
; Directory holding one subdirectory per dataset type
root_dir = {}
; Dataset types to mirror, comma separated (e.g. std,pale,seamlessphoto)
datasets = {}
; Zoom levels to mirror, comma separated
zoom_levels = {}
; Number of concurrent download workers
workers = {}
; Re-download cached manifest and delta files even if present
force_download = {}
; Also download tiles listed only in daily deltas, not in the manifest
include_delta_only = {}
; Extension of tiles in the dataset
tile_extension = {}

[remote]
; URL templates. Placeholders: {{type}}, {{date}} (yyyymmdd), {{z}}, {{x}}, {{y}}, {{ext}}
manifest_url = {}
delta_url = {}
tile_url = {}
; Per-request timeout in seconds
timeout = {}

[cleanup]
; Delete the cached manifest after a run
remove_manifest = {}
; Delete cached delta files after a run
remove_delta = {}

[transcode]
; Convert tiles to JPEG into <root_dir>/<type>_jpg after a run
enabled = {}
; JPEG quality, 1-100
quality = {}

[logging]
; Log file, truncated at the start of each session
file = {}
"#,
        path_to_string(&config.mirror.root_dir),
        datasets,
        config
            .mirror
            .zoom_levels
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(","),
        config.mirror.workers,
        config.mirror.force_download,
        config.mirror.include_delta_only,
        config.mirror.tile_extension,
        config.remote.manifest_url,
        config.remote.delta_url,
        config.remote.tile_url,
        config.remote.timeout,
        config.cleanup.remove_manifest,
        config.cleanup.remove_delta,
        config.transcode.enabled,
        config.transcode.quality,
        path_to_string(&config.logging.file),
    )
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
