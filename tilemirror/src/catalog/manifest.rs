//! Full catalog snapshot of a dataset type.
//!
//! The manifest lists every remote tile with its content hash. It is cached
//! at `{root}/{type}/tmp/manifest.csv.gz` and re-downloaded when forced or
//! when no cached copy exists.

use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use super::error::{CatalogError, CatalogResult};
use super::rows::{open_gzip_rows, Row, Rows};
use crate::local::LocalLayout;
use crate::remote::{download_to, HttpClient, RemoteLayout, TransferError};
use crate::tile::TileLocator;

/// One row of the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub locator: TileLocator,
    /// Path text as listed, used to address the remote tile.
    pub listed_path: String,
    /// Lowercase hex content hash.
    pub content_hash: String,
    /// Remote modification time (unix seconds), when parseable.
    pub last_modified: Option<i64>,
    /// Remote object size in bytes, when parseable.
    pub size: Option<u64>,
}

/// Parsed manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Entries in file order.
    pub entries: Vec<ManifestEntry>,
    /// Rows that were reported and skipped.
    pub skipped: usize,
}

impl Manifest {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Supplies the manifest for one dataset type.
pub struct ManifestSource {
    client: Arc<dyn HttpClient>,
    remote: RemoteLayout,
    local: LocalLayout,
    force_download: bool,
}

impl ManifestSource {
    /// Create a manifest source.
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for the download
    /// * `remote` - Remote URL templates
    /// * `local` - Local layout of the dataset
    /// * `force_download` - Re-download even when a cached copy exists
    pub fn new(
        client: Arc<dyn HttpClient>,
        remote: RemoteLayout,
        local: LocalLayout,
        force_download: bool,
    ) -> Self {
        Self {
            client,
            remote,
            local,
            force_download,
        }
    }

    /// Fetch the manifest, downloading it first when needed.
    ///
    /// A manifest that is absent remotely (or whose download fails) with no
    /// cached copy yields an empty manifest.
    pub fn fetch(&self) -> CatalogResult<Manifest> {
        let path = self.local.manifest_cache();
        let dataset = self.local.dataset();

        if self.force_download || !path.is_file() {
            let url = self.remote.manifest_url(dataset);
            info!(url = %url, "Downloading manifest");
            match download_to(self.client.as_ref(), &url, &path, true) {
                Ok(true) => {}
                Ok(false) => warn!(url = %url, "Manifest not found on server"),
                Err(TransferError::Fetch(e)) => warn!(error = %e, "Manifest download failed"),
                Err(TransferError::Write { path, source }) => {
                    return Err(CatalogError::Write { path, source })
                }
            }
        }

        if !path.is_file() {
            warn!(dataset = %dataset, "No manifest available, nothing to mirror");
            return Ok(Manifest::default());
        }

        let manifest = read_manifest(&path)?;
        info!(
            dataset = %dataset,
            entries = manifest.len(),
            skipped = manifest.skipped,
            "Manifest loaded"
        );
        Ok(manifest)
    }

    /// Delete the cached manifest. Returns whether a file was removed.
    pub fn remove_cached(&self) -> CatalogResult<bool> {
        remove_if_exists(&self.local.manifest_cache())
    }
}

/// Read a gzip-compressed manifest file.
pub fn read_manifest(path: &Path) -> CatalogResult<Manifest> {
    let rows = open_gzip_rows(path)?;
    collect_manifest(rows).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse manifest rows from an uncompressed reader.
pub fn parse_manifest<R: BufRead>(reader: R) -> std::io::Result<Manifest> {
    collect_manifest(Rows::new(reader))
}

fn collect_manifest<R: BufRead>(rows: Rows<R>) -> std::io::Result<Manifest> {
    let mut manifest = Manifest::default();
    for row in rows {
        let row = row?;
        match parse_manifest_row(&row) {
            Some(entry) => manifest.entries.push(entry),
            None => manifest.skipped += 1,
        }
    }
    Ok(manifest)
}

/// Parse `path,lastModified,size,contentHash`.
fn parse_manifest_row(row: &Row) -> Option<ManifestEntry> {
    let (Some(path), Some(modified), Some(size), Some(hash)) =
        (row.field(0), row.field(1), row.field(2), row.field(3))
    else {
        warn!(line = row.line, row = %row.raw(), "Invalid manifest row: expected 4 fields");
        return None;
    };

    let locator = match TileLocator::parse(path) {
        Ok(locator) => locator,
        Err(e) => {
            warn!(line = row.line, error = %e, "Invalid path");
            return None;
        }
    };

    if hash.is_empty() {
        warn!(line = row.line, path, "Manifest row has no content hash");
        return None;
    }

    Some(ManifestEntry {
        locator,
        listed_path: path.to_string(),
        content_hash: hash.to_ascii_lowercase(),
        last_modified: modified.parse().ok(),
        size: size.parse().ok(),
    })
}

pub(super) fn remove_if_exists(path: &Path) -> CatalogResult<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(CatalogError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::rows::tests::gzip;
    use crate::remote::{FetchError, MockHttpClient};
    use crate::tile::DatasetType;
    use std::io::Cursor;
    use tempfile::TempDir;

    const MANIFEST_URL: &str = "https://cyberjapandata.gsi.go.jp/xyz/std/mokuroku.csv.gz";

    fn source(temp: &TempDir, client: MockHttpClient, force: bool) -> ManifestSource {
        ManifestSource::new(
            Arc::new(client),
            RemoteLayout::default(),
            LocalLayout::new(temp.path(), DatasetType::new("std").unwrap()),
            force,
        )
    }

    #[test]
    fn test_parse_manifest_rows() {
        let input = "8/227/100.png,1700000000,1234,ABCDEF\n12/3637/1612.png,x,y,0123\n";
        let manifest = parse_manifest(Cursor::new(input)).unwrap();

        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.skipped, 0);

        let first = &manifest.entries[0];
        assert_eq!(first.locator, TileLocator::new(8, 227, 100, "png"));
        assert_eq!(first.content_hash, "abcdef");
        assert_eq!(first.last_modified, Some(1_700_000_000));
        assert_eq!(first.size, Some(1234));

        // Metadata is optional, hash and path are not
        let second = &manifest.entries[1];
        assert_eq!(second.last_modified, None);
        assert_eq!(second.size, None);
    }

    #[test]
    fn test_parse_manifest_keeps_listed_path() {
        let manifest = parse_manifest(Cursor::new("08/1/1.PNG,1,2,h1\n")).unwrap();

        let entry = &manifest.entries[0];
        assert_eq!(entry.locator, TileLocator::new(8, 1, 1, "png"));
        assert_eq!(entry.listed_path, "08/1/1.PNG");
    }

    #[test]
    fn test_parse_manifest_skips_malformed_path() {
        let input = "abc.png,1,2,h0\n8/1/1.png,1,2,h1\n";
        let manifest = parse_manifest(Cursor::new(input)).unwrap();

        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.skipped, 1);
        assert_eq!(manifest.entries[0].locator.relative_path(), "8/1/1.png");
    }

    #[test]
    fn test_parse_manifest_skips_short_rows_and_empty_hash() {
        let input = "8/1/1.png,1,2\n8/1/2.png,1,2,\n8/1/3.png,1,2,h3\n";
        let manifest = parse_manifest(Cursor::new(input)).unwrap();

        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.skipped, 2);
    }

    #[test]
    fn test_fetch_downloads_when_no_cache() {
        let temp = TempDir::new().unwrap();
        let client = MockHttpClient::new().with_body(MANIFEST_URL, gzip("8/1/1.png,1,2,h1\n"));

        let manifest = source(&temp, client, false).fetch().unwrap();

        assert_eq!(manifest.len(), 1);
        assert!(temp.path().join("std/tmp/manifest.csv.gz").is_file());
    }

    #[test]
    fn test_fetch_uses_cache_without_force() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("std/tmp/manifest.csv.gz");
        std::fs::create_dir_all(cache.parent().unwrap()).unwrap();
        std::fs::write(&cache, gzip("8/1/1.png,1,2,cached\n")).unwrap();

        let client = MockHttpClient::new().with_body(MANIFEST_URL, gzip("8/1/1.png,1,2,fresh\n"));
        let source = source(&temp, client, false);
        let manifest = source.fetch().unwrap();

        assert_eq!(manifest.entries[0].content_hash, "cached");
    }

    #[test]
    fn test_fetch_redownloads_with_force() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("std/tmp/manifest.csv.gz");
        std::fs::create_dir_all(cache.parent().unwrap()).unwrap();
        std::fs::write(&cache, gzip("8/1/1.png,1,2,cached\n")).unwrap();

        let client = MockHttpClient::new().with_body(MANIFEST_URL, gzip("8/1/1.png,1,2,fresh\n"));
        let manifest = source(&temp, client, true).fetch().unwrap();

        assert_eq!(manifest.entries[0].content_hash, "fresh");
    }

    #[test]
    fn test_fetch_missing_remote_yields_empty() {
        let temp = TempDir::new().unwrap();
        let manifest = source(&temp, MockHttpClient::new(), true).fetch().unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_fetch_failure_falls_back_to_cache() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("std/tmp/manifest.csv.gz");
        std::fs::create_dir_all(cache.parent().unwrap()).unwrap();
        std::fs::write(&cache, gzip("8/1/1.png,1,2,cached\n")).unwrap();

        let client = MockHttpClient::new().with_error(
            MANIFEST_URL,
            FetchError::UnexpectedStatus {
                url: MANIFEST_URL.to_string(),
                status: 503,
            },
        );
        let manifest = source(&temp, client, true).fetch().unwrap();

        assert_eq!(manifest.entries[0].content_hash, "cached");
    }

    #[test]
    fn test_remove_cached() {
        let temp = TempDir::new().unwrap();
        let client = MockHttpClient::new().with_body(MANIFEST_URL, gzip("8/1/1.png,1,2,h1\n"));
        let source = source(&temp, client, false);
        source.fetch().unwrap();

        assert!(source.remove_cached().unwrap());
        assert!(!source.remove_cached().unwrap());
    }
}
