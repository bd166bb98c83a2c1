//! Row reader for gzip-compressed comma-separated catalog files.
//!
//! Catalog files are plain unquoted CSV: one row per line, fields separated
//! by commas. Blank lines are skipped, surrounding whitespace and double
//! quotes are trimmed from each field.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;

use super::error::{CatalogError, CatalogResult};

/// One parsed row with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub line: usize,
    pub fields: Vec<String>,
}

impl Row {
    /// Field at `index`, if present.
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// The row joined back together, for diagnostics.
    pub fn raw(&self) -> String {
        self.fields.join(",")
    }
}

/// Iterator over the rows of a catalog.
pub struct Rows<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> Rows<R> {
    /// Read rows from an uncompressed reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for Rows<R> {
    type Item = std::io::Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line += 1;
                    let text = self.buf.trim_end_matches(['\r', '\n']);
                    if text.trim().is_empty() {
                        continue;
                    }
                    let fields = text
                        .split(',')
                        .map(|f| f.trim().trim_matches('"').to_string())
                        .collect();
                    return Some(Ok(Row {
                        line: self.line,
                        fields,
                    }));
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Open a gzip-compressed catalog file for row iteration.
///
/// Failing to open an existing file is fatal for the run.
pub fn open_gzip_rows(path: &Path) -> CatalogResult<Rows<BufReader<GzDecoder<File>>>> {
    let file = File::open(path).map_err(|source| CatalogError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "Reading gzip catalog");
    Ok(Rows::new(BufReader::new(GzDecoder::new(file))))
}
