//! Remote catalog sources.
//!
//! Two catalogs describe the remote state of a dataset:
//! - the manifest (`manifest`), a full snapshot of every tile and its hash
//! - daily deltas (`delta`), patches that override the manifest per tile
//!
//! Both are gzip-compressed CSV files (`rows`) cached under the dataset's
//! `tmp` directory between runs.

mod delta;
mod error;
mod manifest;
mod rows;

pub use delta::{dates_in_window, parse_delta, read_delta, DeltaBatch, DeltaEntry, DeltaSource};
pub use error::{CatalogError, CatalogResult};
pub use manifest::{parse_manifest, read_manifest, Manifest, ManifestEntry, ManifestSource};
pub use rows::{open_gzip_rows, Row, Rows};

#[cfg(test)]
pub(crate) use rows::tests::gzip;
