//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and HTTP client
//! creation to reduce duplication across command handlers.

use std::sync::Arc;

use tracing::info;
use tilemirror::config::ConfigFile;
use tilemirror::logging::{default_log_file, init_logging, LoggingGuard};
use tilemirror::remote::{HttpClient, ReqwestClient};

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// Console logging goes to stderr and is disabled when stderr is a TTY,
    /// where the progress bar lives.
    ///
    /// # Arguments
    ///
    /// * `debug_mode` - When true, enables debug-level logging unless RUST_LOG is set
    pub fn new(debug_mode: bool) -> Result<Self, CliError> {
        // Load config file (or use defaults if not present)
        let config = ConfigFile::load()?;

        let log_path = &config.logging.file;
        let log_dir = log_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| ".".into());
        let log_file = log_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| default_log_file().to_string());

        let console_enabled = !atty::is(atty::Stream::Stderr);

        let logging_guard = init_logging(&log_dir, &log_file, console_enabled, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("tilemirror v{}", tilemirror::VERSION);
        info!("tilemirror CLI: {} command", command);
    }

    /// Create the HTTP client with the configured timeout.
    pub fn create_client(&self) -> Result<Arc<dyn HttpClient>, CliError> {
        let client = ReqwestClient::with_timeout(self.config.remote.timeout)?;
        info!(timeout_secs = self.config.remote.timeout, "HTTP client created");
        Ok(Arc::new(client))
    }
}
