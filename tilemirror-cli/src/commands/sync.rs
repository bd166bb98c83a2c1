//! Sync command - bring the local mirror up to date.

use clap::Args;
use tilemirror::config::DEFAULT_QUALITY;
use tilemirror::mirror::Mirror;

use super::common::{resolve_mirror_config, FetchArgs, SelectionArgs};
use crate::error::CliError;
use crate::runner::CliRunner;
use crate::ui::summary::render_dataset;
use crate::ui::DownloadProgress;

/// Arguments for the sync command.
#[derive(Debug, Clone, Args)]
pub struct SyncArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    #[command(flatten)]
    pub fetch: FetchArgs,

    /// Number of download workers (default: mirror.workers)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=256))]
    pub workers: Option<u64>,

    /// Download on a single thread
    #[arg(long)]
    pub sequential: bool,

    /// Keep the cached manifest after the run
    #[arg(long)]
    pub keep_manifest: bool,

    /// Keep cached delta files after the run
    #[arg(long)]
    pub keep_delta: bool,

    /// Convert tiles to JPEG after downloading
    #[arg(long)]
    pub transcode: bool,

    /// JPEG quality for --transcode, 1-100 (default: transcode.quality)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the sync command.
pub fn run(args: SyncArgs, debug: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(debug)?;
    runner.log_startup("sync");
    let config = runner.config();

    let mut mirror_config = resolve_mirror_config(config, &args.selection, &args.fetch)?;
    if let Some(workers) = args.workers {
        mirror_config = mirror_config.with_workers(workers as usize);
    }
    let remove_manifest = mirror_config.remove_manifest && !args.keep_manifest;
    let remove_delta = mirror_config.remove_delta && !args.keep_delta;
    mirror_config = mirror_config
        .with_sequential(args.sequential)
        .with_cleanup(remove_manifest, remove_delta);
    if args.transcode || args.quality.is_some() {
        let quality = args
            .quality
            .or(mirror_config.transcode_quality)
            .unwrap_or(DEFAULT_QUALITY);
        mirror_config = mirror_config.with_transcode(Some(quality));
    }

    let datasets = mirror_config.datasets.clone();
    let mirror = Mirror::new(mirror_config, runner.create_client()?)?;
    let show_progress = !args.json && DownloadProgress::terminal_available();

    let mut reports = Vec::with_capacity(datasets.len());
    for dataset in &datasets {
        let progress = DownloadProgress::new(dataset.as_str(), show_progress);
        let report = mirror.sync_dataset(dataset, Some(progress.callback()));
        progress.finish();
        reports.push(report?);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{}", render_dataset(report));
        }
    }

    Ok(())
}
