//! Transcode command - convert mirrored tiles to JPEG.

use clap::Args;
use tilemirror::local::{LocalLayout, DEFAULT_TRANSCODE_SUFFIX};
use tilemirror::transcode::Transcoder;

use super::common::{resolve_local, SelectionArgs};
use crate::error::CliError;
use crate::runner::CliRunner;
use crate::ui::summary::render_transcode;

/// Arguments for the transcode command.
#[derive(Debug, Clone, Args)]
pub struct TranscodeArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// JPEG quality, 1-100 (default: transcode.quality)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the transcode command.
///
/// Only tiles without a JPEG counterpart are converted.
pub fn run(args: TranscodeArgs, debug: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(debug)?;
    runner.log_startup("transcode");
    let config = runner.config();

    let (root, datasets) = resolve_local(config, &args.selection)?;
    let quality = args.quality.unwrap_or(config.transcode.quality);

    let mut reports = Vec::with_capacity(datasets.len());
    for dataset in datasets {
        let layout = LocalLayout::new(&root, dataset.clone());
        let report = Transcoder::new(
            layout.tile_root(),
            layout.transcode_root(DEFAULT_TRANSCODE_SUFFIX),
        )
        .with_source_ext(config.mirror.tile_extension.clone())
        .with_quality(quality)
        .convert(&[]);
        reports.push((dataset, report));
    }

    if args.json {
        let json: Vec<_> = reports
            .iter()
            .map(|(dataset, report)| serde_json::json!({ "dataset": dataset, "transcode": report }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        for (dataset, report) in &reports {
            println!("[{}]", dataset);
            print!("{}", render_transcode(report));
        }
    }

    Ok(())
}
