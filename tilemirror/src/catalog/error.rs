//! Error types for catalog sources.

use std::io;
use std::path::PathBuf;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog failures that abort a run.
///
/// Missing remote objects and malformed rows are not errors; they are
/// reported and skipped inside the sources.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A cached catalog file exists but cannot be opened.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading or decompressing a catalog file failed part way.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A downloaded catalog could not be stored in the cache directory.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Removing a cached catalog file failed.
    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::Open {
            path: PathBuf::from("std/tmp/manifest.csv.gz"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("std/tmp/manifest.csv.gz"));
        assert!(msg.contains("denied"));
    }
}
