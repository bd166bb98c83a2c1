//! Daily delta patches.
//!
//! Each day the server publishes a patch listing tiles changed that day,
//! across every dataset type. Rows look like
//! `{type}/{z}/{x}/{y}.{ext},{timestamp},{size},{hash}`. The mirror reads a
//! rolling window from the first day of the previous calendar month through
//! today, oldest first, so later patches override earlier ones.

use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use chrono::{Datelike, Months, NaiveDate};
use tracing::{debug, info, warn};

use super::error::{CatalogError, CatalogResult};
use super::manifest::remove_if_exists;
use super::rows::{open_gzip_rows, Row, Rows};
use crate::local::LocalLayout;
use crate::remote::{download_to, HttpClient, RemoteLayout, TransferError};
use crate::tile::{parse_labeled_path, DatasetType, TileLocator};

/// One row of a daily patch for a single dataset type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaEntry {
    pub locator: TileLocator,
    /// Path text after the dataset label, used to address the remote tile.
    pub listed_path: String,
    /// Lowercase hex content hash.
    pub content_hash: String,
}

/// All entries of one day's patch for a dataset type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaBatch {
    pub date: NaiveDate,
    pub entries: Vec<DeltaEntry>,
    /// Malformed rows that were reported and skipped.
    pub skipped: usize,
}

impl DeltaBatch {
    /// A batch with no entries.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            entries: Vec::new(),
            skipped: 0,
        }
    }
}

/// Dates covered by the delta window for `today`, oldest first.
///
/// The window starts on day 1 of the previous calendar month and ends on
/// `today` inclusive, so it grows through the month and resets on the 1st.
pub fn dates_in_window(today: NaiveDate) -> Vec<NaiveDate> {
    let first_of_month = today.with_day(1).unwrap_or(today);
    let start = first_of_month
        .checked_sub_months(Months::new(1))
        .unwrap_or(first_of_month);

    start.iter_days().take_while(|d| *d <= today).collect()
}

/// Supplies daily patches for one dataset type.
pub struct DeltaSource {
    client: Arc<dyn HttpClient>,
    remote: RemoteLayout,
    local: LocalLayout,
    force_download: bool,
}

impl DeltaSource {
    /// Create a delta source.
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

    /// Fetch the patch for `date`, downloading it if missing or forced.
    ///
    /// A patch that doesn't exist remotely (future date, no activity) or
    /// that fails to download yields an empty batch.
    pub fn fetch(&self, date: NaiveDate) -> CatalogResult<DeltaBatch> {
        let path = self.local.delta_cache(date);
        let dataset = self.local.dataset();

        if self.force_download || !path.is_file() {
            let url = self.remote.delta_url(dataset, date);
            match download_to(self.client.as_ref(), &url, &path, true) {
                Ok(true) => debug!(url = %url, "Downloaded delta"),
                Ok(false) => debug!(url = %url, "No delta published"),
                Err(TransferError::Fetch(e)) => warn!(error = %e, "Delta download failed"),
                Err(TransferError::Write { path, source }) => {
                    return Err(CatalogError::Write { path, source })
                }
            }
        }

        if !path.is_file() {
            return Ok(DeltaBatch::empty(date));
        }

        read_delta(&path, dataset, date)
    }

    /// Fetch every patch in the window ending at `today`, oldest first.
    pub fn fetch_window(&self, today: NaiveDate) -> CatalogResult<Vec<DeltaBatch>> {
        let dates = dates_in_window(today);
        if let (Some(first), Some(last)) = (dates.first(), dates.last()) {
            info!(from = %first, to = %last, "Preparing delta files");
        }

        let batches = dates
            .into_iter()
            .map(|date| self.fetch(date))
            .collect::<CatalogResult<Vec<_>>>()?;

        let entries: usize = batches.iter().map(|b| b.entries.len()).sum();
        info!(dataset = %self.local.dataset(), entries, "Delta window loaded");
        Ok(batches)
    }

    /// Delete every cached delta file. Returns the number removed.
    pub fn remove_cached(&self) -> CatalogResult<usize> {
        let pattern = self.local.delta_cache_pattern();
        let mut removed = 0;
        // Pattern is escaped, so a parse failure can't happen in practice
        let Ok(paths) = glob::glob(&pattern) else {
            return Ok(0);
        };
        for path in paths.flatten() {
            if remove_if_exists(&path)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// Read a gzip-compressed delta file, keeping rows for `dataset` only.
pub fn read_delta(path: &Path, dataset: &DatasetType, date: NaiveDate) -> CatalogResult<DeltaBatch> {
    let rows = open_gzip_rows(path)?;
    collect_delta(rows, dataset, date).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse delta rows from an uncompressed reader.
pub fn parse_delta<R: BufRead>(
    reader: R,
    dataset: &DatasetType,
    date: NaiveDate,
) -> std::io::Result<DeltaBatch> {
    collect_delta(Rows::new(reader), dataset, date)
}

fn collect_delta<R: BufRead>(
    rows: Rows<R>,
    dataset: &DatasetType,
    date: NaiveDate,
) -> std::io::Result<DeltaBatch> {
    let mut batch = DeltaBatch::empty(date);
    for row in rows {
        let row = row?;
        match parse_delta_row(&row) {
            Some((label, entry)) if label == dataset.as_str() => batch.entries.push(entry),
            Some(_) => {}
            None => batch.skipped += 1,
        }
    }
    Ok(batch)
}

/// Parse `typeLabel/path,timestamp,size,contentHash`.
fn parse_delta_row(row: &Row) -> Option<(String, DeltaEntry)> {
    let (Some(labeled), Some(hash)) = (row.field(0), row.field(3)) else {
        warn!(line = row.line, row = %row.raw(), "Invalid delta row: expected 4 fields");
        return None;
    };

    let (label, locator) = match parse_labeled_path(labeled) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(line = row.line, error = %e, "Invalid path");
            return None;
        }
    };

    if hash.is_empty() {
        warn!(line = row.line, path = labeled, "Delta row has no content hash");
        return None;
    }

    let listed_path = labeled
        .get(label.len() + 1..)
        .unwrap_or_default()
        .to_string();

    Some((
        label,
        DeltaEntry {
            locator,
            listed_path,
            content_hash: hash.to_ascii_lowercase(),
        },
    ))
}
