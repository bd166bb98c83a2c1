//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;

use clap::Args;
use tilemirror::config::{expand_tilde, ConfigFile};
use tilemirror::mirror::MirrorConfig;
use tilemirror::reconcile::DeltaOnlyPolicy;
use tilemirror::tile::{DatasetType, MAX_ZOOM};

use crate::error::CliError;

/// Which part of the mirror a command works on.
#[derive(Debug, Clone, Default, Args)]
pub struct SelectionArgs {
    /// Dataset type to process, repeatable (default: mirror.datasets)
    #[arg(long = "type", value_name = "TYPE")]
    pub types: Vec<DatasetType>,

    /// Zoom level to mirror, repeatable (default: mirror.zoom_levels)
    #[arg(long = "zoom", value_name = "Z", value_parser = clap::value_parser!(u8).range(0..=MAX_ZOOM as i64))]
    pub zooms: Vec<u8>,

    /// Mirror root directory (default: mirror.root_dir)
    #[arg(long, value_name = "DIR")]
    pub root: Option<String>,
}

/// Flags shared by commands that fetch catalogs.
#[derive(Debug, Clone, Default, Args)]
pub struct FetchArgs {
    /// Re-download cached manifest and delta files
    #[arg(long)]
    pub force: bool,

    /// Also fetch tiles that appear only in deltas
    #[arg(long)]
    pub include_delta_only: bool,
}

/// Build the mirror configuration from the config file and CLI flags.
///
/// CLI flags take precedence over the config file.
pub fn resolve_mirror_config(
    config: &ConfigFile,
    selection: &SelectionArgs,
    fetch: &FetchArgs,
) -> Result<MirrorConfig, CliError> {
    let mut mirror = MirrorConfig::from_config_file(config);

    if !selection.types.is_empty() {
        mirror = mirror.with_datasets(dedup(selection.types.clone()));
    }
    if !selection.zooms.is_empty() {
        let mut zooms = selection.zooms.clone();
        zooms.sort_unstable();
        zooms.dedup();
        mirror = mirror.with_zoom_levels(zooms);
    }
    if let Some(ref root) = selection.root {
        mirror.root_dir = resolve_root(root)?;
    }
    if fetch.force {
        mirror = mirror.with_force_download(true);
    }
    if fetch.include_delta_only {
        mirror = mirror.with_delta_only(DeltaOnlyPolicy::Include);
    }

    Ok(mirror)
}

/// Datasets and root for commands that never touch the network.
pub fn resolve_local(
    config: &ConfigFile,
    selection: &SelectionArgs,
) -> Result<(PathBuf, Vec<DatasetType>), CliError> {
    let root = match selection.root {
        Some(ref root) => resolve_root(root)?,
        None => config.mirror.root_dir.clone(),
    };
    let datasets = if selection.types.is_empty() {
        config.mirror.datasets.clone()
    } else {
        dedup(selection.types.clone())
    };
    Ok((root, datasets))
}

fn resolve_root(root: &str) -> Result<PathBuf, CliError> {
    if root.trim().is_empty() {
        return Err(CliError::Config("--root must not be empty".to_string()));
    }
    Ok(expand_tilde(root.trim()))
}

/// Keep the first occurrence of each dataset type.
fn dedup(types: Vec<DatasetType>) -> Vec<DatasetType> {
    let mut seen = Vec::with_capacity(types.len());
    for t in types {
        if !seen.contains(&t) {
            seen.push(t);
        }
    }
    seen
}
