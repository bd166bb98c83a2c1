//! Local content-hash index.
//!
//! Walks the tile tree of a dataset and hashes every tile file present, keyed
//! by its canonical `zoom/x/y.ext` path. The index is rebuilt from scratch on
//! every run; nothing is persisted.

mod checksum;

pub use checksum::{calculate_file_md5, md5_hex};

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use crate::local::glob_pattern;
use crate::tile::TileLocator;

/// Callback receiving the number of files hashed so far.
pub type ScanObserver<'a> = &'a (dyn Fn(usize) + Sync);

/// Content hashes of the tiles currently on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalIndex {
    records: HashMap<TileLocator, String>,
    skipped: usize,
}

impl LocalIndex {
    /// Empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `root` for `*.{ext}` tiles and hash each one.
    ///
    /// Files whose path relative to `root` isn't canonical, and files that
    /// can't be read, are reported and skipped.
    pub fn scan(root: &Path, ext: &str) -> Self {
        Self::scan_with_observer(root, ext, None)
    }

    /// Like [`LocalIndex::scan`], reporting progress to `observer`.
    pub fn scan_with_observer(root: &Path, ext: &str, observer: Option<ScanObserver<'_>>) -> Self {
        let mut index = Self::new();
        let pattern = glob_pattern(root, &format!("**/*.{}", ext));

        let paths = match glob::glob(&pattern) {
            Ok(paths) => paths,
            Err(e) => {
                warn!(pattern = %pattern, error = %e, "Invalid scan pattern");
                return index;
            }
        };

        let mut seen = 0usize;
        for entry in paths {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!(error = %e, "Unreadable directory entry");
                    index.skipped += 1;
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }

            seen += 1;
            if let Some(observe) = observer {
                observe(seen);
            }

            let locator = match path
                .strip_prefix(root)
                .map_err(|_| ())
                .and_then(|rel| TileLocator::from_relative_path(rel).map_err(|_| ()))
            {
                Ok(locator) => locator,
                Err(()) => {
                    warn!(path = %path.display(), "Invalid path");
                    index.skipped += 1;
                    continue;
                }
            };

            match calculate_file_md5(&path) {
                Ok(hash) => {
                    index.records.insert(locator, hash);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to hash local tile");
                    index.skipped += 1;
                }
            }
        }

        info!(
            root = %root.display(),
            tiles = index.len(),
            skipped = index.skipped,
            "Local index built"
        );
        index
    }

    /// Record a hash for a tile.
    pub fn insert(&mut self, locator: TileLocator, hash: impl Into<String>) {
        self.records
            .insert(locator, hash.into().to_ascii_lowercase());
    }

    /// Hash of a tile, if present locally.
    pub fn get(&self, locator: &TileLocator) -> Option<&str> {
        self.records.get(locator).map(String::as_str)
    }

    /// Whether the local copy of `locator` has exactly `hash`.
    pub fn is_current(&self, locator: &TileLocator, hash: &str) -> bool {
        self.get(locator) == Some(hash)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Files that were reported and skipped during the scan.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Iterate over `(locator, hash)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&TileLocator, &str)> {
        self.records.iter().map(|(k, v)| (k, v.as_str()))
    }
}

impl FromIterator<(TileLocator, String)> for LocalIndex {
    fn from_iter<I: IntoIterator<Item = (TileLocator, String)>>(iter: I) -> Self {
        let mut index = Self::new();
        for (locator, hash) in iter {
            index.insert(locator, hash);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, body: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn test_scan_hashes_canonical_tiles() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "8/227/100.png", b"tile-a");
        write(temp.path(), "12/3637/1612.png", b"tile-b");

        let index = LocalIndex::scan(temp.path(), "png");

        assert_eq!(index.len(), 2);
        assert_eq!(
            index.get(&TileLocator::new(8, 227, 100, "png")),
            Some(md5_hex(b"tile-a").as_str())
        );
        assert_eq!(index.skipped(), 0);
    }

    #[test]
    fn test_scan_skips_non_canonical_paths() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "8/1/1.png", b"ok");
        write(temp.path(), "abc.png", b"bad");
        write(temp.path(), "extra/8/1/2.png", b"bad");

        let index = LocalIndex::scan(temp.path(), "png");

        assert_eq!(index.len(), 1);
        assert_eq!(index.skipped(), 2);
    }

    #[test]
    fn test_scan_ignores_other_extensions_and_catalog_cache() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "8/1/1.png", b"ok");
        write(temp.path(), "8/1/2.png.part", b"partial");
        write(temp.path(), "tmp/manifest.csv.gz", b"gz");

        let index = LocalIndex::scan(temp.path(), "png");

        assert_eq!(index.len(), 1);
        assert_eq!(index.skipped(), 0);
    }

    #[test]
    fn test_scan_missing_root_is_empty() {
        let temp = TempDir::new().unwrap();
        let index = LocalIndex::scan(&temp.path().join("nope"), "png");
        assert!(index.is_empty());
    }

    #[test]
    fn test_scan_reports_progress() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "8/1/1.png", b"a");
        write(temp.path(), "8/1/2.png", b"b");
        write(temp.path(), "8/1/3.png", b"c");

        let last = AtomicUsize::new(0);
        let observer = |n: usize| last.store(n, Ordering::SeqCst);
        LocalIndex::scan_with_observer(temp.path(), "png", Some(&observer));

        assert_eq!(last.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_is_current() {
        let tile = TileLocator::new(8, 1, 1, "png");
        let index: LocalIndex = [(tile.clone(), "ABC".to_string())].into_iter().collect();

        assert!(index.is_current(&tile, "abc"));
        assert!(!index.is_current(&tile, "def"));
        assert!(!index.is_current(&TileLocator::new(8, 1, 2, "png"), "abc"));
    }
}
