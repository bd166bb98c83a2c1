//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes. Only setup failures end up here; per-tile
//! failures are part of the run report and never change the exit status.

use std::fmt;
use std::process;

use tilemirror::config::ConfigFileError;
use tilemirror::mirror::MirrorError;
use tilemirror::remote::FetchError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to build the HTTP client
    HttpClient(FetchError),
    /// Mirror setup failed
    Mirror(MirrorError),
    /// Failed to render command output
    Output(String),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Mirror(MirrorError::CreateDirFailed { .. }) => {
                eprintln!();
                eprintln!("Check that the mirror root is writable, or choose another");
                eprintln!("one with --root or 'tilemirror config set mirror.root_dir <dir>'.");
            }
            CliError::Config(_) => {
                eprintln!();
                eprintln!("Run 'tilemirror config list' to review the current settings.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::HttpClient(e) => write!(f, "{}", e),
            CliError::Mirror(e) => write!(f, "Mirror setup failed: {}", e),
            CliError::Output(msg) => write!(f, "Failed to write output: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::HttpClient(e) => Some(e),
            CliError::Mirror(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<MirrorError> for CliError {
    fn from(e: MirrorError) -> Self {
        CliError::Mirror(e)
    }
}

impl From<FetchError> for CliError {
    fn from(e: FetchError) -> Self {
        CliError::HttpClient(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e.to_string())
    }
}
