//! Error types for mirror runs.
//!
//! Only setup failures surface here. Per-tile failures are counted in the
//! report and never abort a run.

use std::io;
use std::path::PathBuf;

use crate::catalog::CatalogError;

/// Result type for mirror operations.
pub type MirrorResult<T> = Result<T, MirrorError>;

/// Setup failures that abort a mirror run.
#[derive(Debug)]
pub enum MirrorError {
    /// Failed to create a directory.
    CreateDirFailed { path: PathBuf, source: io::Error },

    /// Cached catalog couldn't be read or written.
    Catalog(CatalogError),

    /// Invalid configuration.
    InvalidConfig(String),
}

impl std::fmt::Display for MirrorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateDirFailed { path, source } => {
                write!(
                    f,
                    "failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::Catalog(e) => write!(f, "{}", e),
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for MirrorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CreateDirFailed { source, .. } => Some(source),
            Self::Catalog(e) => Some(e),
            Self::InvalidConfig(_) => None,
        }
    }
}

impl From<CatalogError> for MirrorError {
    fn from(e: CatalogError) -> Self {
        Self::Catalog(e)
    }
}
