//! Plan command - show what a sync would download.

use clap::Args;
use tilemirror::mirror::Mirror;

use super::common::{resolve_mirror_config, FetchArgs, SelectionArgs};
use crate::error::CliError;
use crate::runner::CliRunner;
use crate::ui::summary::render_plan;

/// Arguments for the plan command.
#[derive(Debug, Clone, Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    #[command(flatten)]
    pub fetch: FetchArgs,

    /// List every job, not only the totals
    #[arg(long)]
    pub jobs: bool,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the plan command.
///
/// Catalogs fetched here stay cached for the next sync.
pub fn run(args: PlanArgs, debug: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(debug)?;
    runner.log_startup("plan");

    let mirror_config = resolve_mirror_config(runner.config(), &args.selection, &args.fetch)?;
    let datasets = mirror_config.datasets.clone();
    let mirror = Mirror::new(mirror_config, runner.create_client()?)?;

    let planned = datasets
        .iter()
        .map(|dataset| mirror.plan_dataset(dataset))
        .collect::<Result<Vec<_>, _>>()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&planned)?);
        return Ok(());
    }

    for dataset in &planned {
        print!(
            "{}",
            render_plan(
                dataset.dataset.as_str(),
                &dataset.catalog,
                &dataset.plan.stats,
                dataset.plan.len()
            )
        );
        if args.jobs {
            for job in &dataset.plan.jobs {
                println!("    {} -> {}", job.url, job.destination.display());
            }
        }
        println!();
    }

    Ok(())
}
