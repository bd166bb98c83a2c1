//! tilemirror CLI - Command-line interface
//!
//! This binary provides a command-line interface to the tilemirror library.

mod commands;
mod error;
mod runner;
mod ui;

use clap::{Parser, Subcommand};

use commands::clean::CleanArgs;
use commands::config::ConfigCommands;
use commands::plan::PlanArgs;
use commands::sync::SyncArgs;
use commands::transcode::TranscodeArgs;

#[derive(Parser)]
#[command(name = "tilemirror")]
#[command(version = tilemirror::VERSION)]
#[command(about = "Incremental mirror for XYZ map tile datasets", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level unless RUST_LOG is set
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Download missing and changed tiles
    Sync(SyncArgs),

    /// Show what a sync would download without downloading
    Plan(PlanArgs),

    /// Convert mirrored tiles to JPEG
    Transcode(TranscodeArgs),

    /// Delete cached manifest and delta files
    Clean(CleanArgs),

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sync(args) => commands::sync::run(args, cli.debug),
        Commands::Plan(args) => commands::plan::run(args, cli.debug),
        Commands::Transcode(args) => commands::transcode::run(args, cli.debug),
        Commands::Clean(args) => commands::clean::run(args, cli.debug),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sync_flags() {
        let cli = Cli::try_parse_from([
            "tilemirror",
            "sync",
            "--type",
            "std",
            "--type",
            "pale",
            "--zoom",
            "12",
            "--workers",
            "4",
            "--keep-delta",
            "--transcode",
            "--quality",
            "70",
            "--json",
        ])
        .unwrap();

        let Commands::Sync(args) = cli.command else {
            panic!("expected sync");
        };
        assert_eq!(args.selection.types.len(), 2);
        assert_eq!(args.selection.zooms, vec![12]);
        assert_eq!(args.workers, Some(4));
        assert!(args.keep_delta);
        assert!(!args.keep_manifest);
        assert!(args.transcode);
        assert_eq!(args.quality, Some(70));
        assert!(args.json);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        assert!(Cli::try_parse_from(["tilemirror", "sync", "--quality", "0"]).is_err());
        assert!(Cli::try_parse_from(["tilemirror", "sync", "--zoom", "99"]).is_err());
        assert!(Cli::try_parse_from(["tilemirror", "sync", "--zoom", "25"]).is_err());
        assert!(Cli::try_parse_from(["tilemirror", "sync", "--zoom", "24"]).is_ok());
        assert!(Cli::try_parse_from(["tilemirror", "plan", "--type", "../etc"]).is_err());
    }

    #[test]
    fn test_global_debug_flag() {
        let cli = Cli::try_parse_from(["tilemirror", "clean", "--debug"]).unwrap();
        assert!(cli.debug);
        assert!(matches!(cli.command, Commands::Clean(_)));
    }
}
