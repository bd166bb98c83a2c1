//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module is the single place where INI key names are mapped to struct
//! fields. The value parsers are shared with [`super::keys`].

use ini::{Ini, Properties};
use std::path::PathBuf;

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::tile::{DatasetType, MAX_ZOOM};

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [mirror] section
    if let Some(section) = ini.section(Some("mirror")) {
        let read = SectionReader::new("mirror", section);
        if let Some(v) = read.non_empty("root_dir") {
            config.mirror.root_dir = expand_tilde(v);
        }
        if let Some(v) = read.value("datasets", parse_datasets)? {
            config.mirror.datasets = v;
        }
        if let Some(v) = read.value("zoom_levels", parse_zoom_levels)? {
            config.mirror.zoom_levels = v;
        }
        if let Some(v) = read.value("workers", parse_workers)? {
            config.mirror.workers = v;
        }
        if let Some(v) = read.value("force_download", parse_bool)? {
            config.mirror.force_download = v;
        }
        if let Some(v) = read.value("include_delta_only", parse_bool)? {
            config.mirror.include_delta_only = v;
        }
        if let Some(v) = read.value("tile_extension", parse_extension)? {
            config.mirror.tile_extension = v;
        }
    }

    // [remote] section
    if let Some(section) = ini.section(Some("remote")) {
        let read = SectionReader::new("remote", section);
        if let Some(v) = read.value("manifest_url", |v| parse_url_template(v, &["{type}"]))? {
            config.remote.manifest_url = v;
        }
        if let Some(v) = read.value("delta_url", |v| parse_url_template(v, &["{date}"]))? {
            config.remote.delta_url = v;
        }
        if let Some(v) = read.value("tile_url", |v| {
            parse_url_template(v, &["{z}", "{x}", "{y}"])
        })? {
            config.remote.tile_url = v;
        }
        if let Some(v) = read.value("timeout", parse_timeout)? {
            config.remote.timeout = v;
        }
    }

    // [cleanup] section
    if let Some(section) = ini.section(Some("cleanup")) {
        let read = SectionReader::new("cleanup", section);
        if let Some(v) = read.value("remove_manifest", parse_bool)? {
            config.cleanup.remove_manifest = v;
        }
        if let Some(v) = read.value("remove_delta", parse_bool)? {
            config.cleanup.remove_delta = v;
        }
    }

    // [transcode] section
    if let Some(section) = ini.section(Some("transcode")) {
        let read = SectionReader::new("transcode", section);
        if let Some(v) = read.value("enabled", parse_bool)? {
            config.transcode.enabled = v;
        }
        if let Some(v) = read.value("quality", parse_quality)? {
            config.transcode.quality = v;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        let read = SectionReader::new("logging", section);
        if let Some(v) = read.non_empty("file") {
            config.logging.file = expand_tilde(v);
        }
    }

    Ok(config)
}

/// Reads keys of one section, attaching section/key context to errors.
struct SectionReader<'a> {
    name: &'static str,
    section: &'a Properties,
}

impl<'a> SectionReader<'a> {
    fn new(name: &'static str, section: &'a Properties) -> Self {
        Self { name, section }
    }

    fn non_empty(&self, key: &str) -> Option<&'a str> {
        self.section
            .get(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    fn value<T>(
        &self,
        key: &str,
        parse: impl Fn(&str) -> Result<T, String>,
    ) -> Result<Option<T>, ConfigFileError> {
        let Some(raw) = self.non_empty(key) else {
            return Ok(None);
        };
        parse(raw)
            .map(Some)
            .map_err(|reason| ConfigFileError::InvalidValue {
                section: self.name.to_string(),
                key: key.to_string(),
                value: raw.to_string(),
                reason,
            })
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

pub fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err("must be true or false".to_string()),
    }
}

/// Parse a comma- or space-separated list of zoom levels, each at most
/// [`MAX_ZOOM`].
///
/// The result is sorted and deduplicated.
pub fn parse_zoom_levels(value: &str) -> Result<Vec<u8>, String> {
    let mut levels = value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u8>()
                .ok()
                .filter(|zoom| *zoom <= MAX_ZOOM)
                .ok_or_else(|| format!("'{}' is not a zoom level (0-{})", s, MAX_ZOOM))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if levels.is_empty() {
        return Err("at least one zoom level is required".to_string());
    }
    levels.sort_unstable();
    levels.dedup();
    Ok(levels)
}

/// Parse a comma- or space-separated list of dataset types.
pub fn parse_datasets(value: &str) -> Result<Vec<DatasetType>, String> {
    let mut datasets: Vec<DatasetType> = Vec::new();
    for label in value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
    {
        let dataset = DatasetType::new(label).map_err(|e| e.to_string())?;
        if !datasets.contains(&dataset) {
            datasets.push(dataset);
        }
    }

    if datasets.is_empty() {
        return Err("at least one dataset type is required".to_string());
    }
    Ok(datasets)
}

pub fn parse_workers(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err("must be a positive integer".to_string()),
    }
}

pub fn parse_timeout(value: &str) -> Result<u64, String> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err("must be a positive integer (seconds)".to_string()),
    }
}

pub fn parse_quality(value: &str) -> Result<u8, String> {
    match value.trim().parse::<u8>() {
        Ok(n) if (1..=100).contains(&n) => Ok(n),
        _ => Err("must be an integer between 1 and 100".to_string()),
    }
}

pub fn parse_extension(value: &str) -> Result<String, String> {
    let ext = value.trim().trim_start_matches('.').to_lowercase();
    if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(ext)
    } else {
        Err("must be a file extension such as 'png'".to_string())
    }
}

/// Check that a URL template is http(s) and has the required placeholders.
pub fn parse_url_template(value: &str, required: &[&str]) -> Result<String, String> {
    let value = value.trim();
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err("must start with http:// or https://".to_string());
    }
    if let Some(missing) = required.iter().find(|p| !value.contains(**p)) {
        return Err(format!("must contain the {} placeholder", missing));
    }
    Ok(value.to_string())
}
