//! Clean command - delete cached catalog files.

use clap::Args;
use tilemirror::mirror::{Mirror, MirrorConfig};

use super::common::{resolve_local, SelectionArgs};
use crate::error::CliError;
use crate::runner::CliRunner;
use crate::ui::summary::render_cleanup;

/// Arguments for the clean command.
#[derive(Debug, Clone, Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,
}

/// Run the clean command.
pub fn run(args: CleanArgs, debug: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(debug)?;
    runner.log_startup("clean");

    let (root, datasets) = resolve_local(runner.config(), &args.selection)?;
    let mirror_config = MirrorConfig::from_config_file(runner.config())
        .with_datasets(datasets.clone());
    let mirror_config = MirrorConfig {
        root_dir: root,
        ..mirror_config
    };
    let mirror = Mirror::offline(mirror_config)?;

    for dataset in &datasets {
        let summary = mirror.clean_dataset(dataset)?;
        println!("[{}]", dataset);
        print!("{}", render_cleanup(&summary));
    }

    Ok(())
}
