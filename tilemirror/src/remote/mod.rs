//! Remote object access.
//!
//! The mirror only ever issues plain GET requests. A 200 response carries an
//! object, a 404 means "no data for this key", anything else is reported by
//! the caller and treated as absent for the current run.
//!
//! # Example
//!
//! ```ignore
//! use tilemirror::remote::{download_to, ReqwestClient};
//!
//! let client = ReqwestClient::new()?;
//! let written = download_to(&client, url, &path, true)?;
//! ```

mod http;
mod layout;

pub use http::{
    FetchError, Fetched, HttpClient, OfflineClient, ReqwestClient, DEFAULT_TIMEOUT_SECS,
};
pub use layout::{
    yyyymmdd, RemoteLayout, DEFAULT_DELTA_URL, DEFAULT_MANIFEST_URL, DEFAULT_TILE_URL,
};

#[cfg(test)]
pub use http::tests::MockHttpClient;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors from fetching an object into a local file.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The GET request failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The body could not be written to disk.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Fetch `url` into `path`.
///
/// When `overwrite` is false and `path` already exists nothing is requested.
/// Returns `Ok(true)` when a file was written and `Ok(false)` when the file
/// was kept or the remote object doesn't exist.
pub fn download_to<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
    path: &Path,
    overwrite: bool,
) -> Result<bool, TransferError> {
    if !overwrite && path.is_file() {
        return Ok(false);
    }

    match client.get(url)? {
        Fetched::Body(bytes) => {
            write_atomic(path, &bytes).map_err(|source| TransferError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(true)
        }
        Fetched::NotFound => Ok(false),
    }
}

/// Write `bytes` to `path` through a sibling temporary file.
///
/// Parent directories are created as needed; concurrent callers creating
/// overlapping parents is fine. Readers never observe a truncated file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut part_name = path.file_name().unwrap_or_default().to_os_string();
    part_name.push(".part");
    let part_path = path.with_file_name(part_name);

    fs::write(&part_path, bytes)?;
    fs::rename(&part_path, path).inspect_err(|_| {
        let _ = fs::remove_file(&part_path);
    })
}
