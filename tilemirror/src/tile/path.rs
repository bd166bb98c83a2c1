//! Canonical tile path parsing.
//!
//! Every tile in a dataset is addressed by a relative path of the form
//! `{zoom}/{x}/{y}.{ext}`, for example `8/227/100.png`. Manifest rows, delta
//! rows and files found on disk all go through [`TileLocator::parse`]; rows
//! that do not match are reported by the caller and skipped.

use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Address of one tile within a dataset type.
///
/// Ordering is by zoom, then x, then y, then extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct TileLocator {
    /// Zoom level
    pub zoom: u8,
    /// Column (increases eastward)
    pub x: u32,
    /// Row (increases southward)
    pub y: u32,
    /// File extension without the dot, lowercase (e.g. "png")
    pub ext: String,
}

/// Error parsing a tile path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TilePathError {
    /// Path doesn't match `zoom/x/y.ext`
    #[error("path '{0}' doesn't match zoom/x/y.ext")]
    InvalidPattern(String),

    /// Zoom level doesn't fit the supported range
    #[error("invalid zoom level '{zoom}' in '{path}'")]
    InvalidZoom { path: String, zoom: String },

    /// Column or row overflowed
    #[error("invalid tile coordinate '{value}' in '{path}'")]
    InvalidCoordinate { path: String, value: String },

    /// Delta row has no dataset type label in front of the path
    #[error("missing dataset label in '{0}'")]
    MissingLabel(String),
}

/// Pattern for a canonical relative tile path.
///
/// - Group 1: zoom
/// - Group 2: x
/// - Group 3: y
/// - Group 4: extension
fn tile_path_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+)/(\d+)/(\d+)\.([A-Za-z0-9]+)$").expect("tile path pattern is valid")
    })
}

impl TileLocator {
    /// Create a locator from its parts.
    pub fn new(zoom: u8, x: u32, y: u32, ext: impl Into<String>) -> Self {
        Self {
            zoom,
            x,
            y,
            ext: ext.into().to_ascii_lowercase(),
        }
    }

    /// Parse a canonical relative path such as `"12/3637/1612.png"`.
    ///
    /// The whole string must match; leading directories, backslashes and
    /// missing extensions are rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use tilemirror::tile::TileLocator;
    ///
    /// let tile = TileLocator::parse("8/227/100.png").unwrap();
    /// assert_eq!((tile.zoom, tile.x, tile.y), (8, 227, 100));
    /// assert_eq!(tile.ext, "png");
    ///
    /// assert!(TileLocator::parse("abc.png").is_err());
    /// ```
    pub fn parse(path: &str) -> Result<Self, TilePathError> {
        let [zoom, x, y, ext] = split_tile_path(path)
            .ok_or_else(|| TilePathError::InvalidPattern(path.to_string()))?;

        let zoom = zoom
            .parse::<u8>()
            .map_err(|_| TilePathError::InvalidZoom {
                path: path.to_string(),
                zoom: zoom.to_string(),
            })?;

        let coordinate = |value: &str| {
            value
                .parse::<u32>()
                .map_err(|_| TilePathError::InvalidCoordinate {
                    path: path.to_string(),
                    value: value.to_string(),
                })
        };
        let x = coordinate(x)?;
        let y = coordinate(y)?;

        Ok(Self::new(zoom, x, y, ext))
    }

    /// Parse a filesystem path relative to a dataset root.
    ///
    /// Separators are normalized to `/` before matching so the same rules
    /// apply on every platform.
    pub fn from_relative_path(path: &Path) -> Result<Self, TilePathError> {
        let joined = path
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        Self::parse(&joined)
    }

    /// Canonical relative path, `zoom/x/y.ext`.
    pub fn relative_path(&self) -> String {
        format!("{}/{}/{}.{}", self.zoom, self.x, self.y, self.ext)
    }

    /// Location of this tile under a dataset root.
    pub fn local_path(&self, root: &Path) -> PathBuf {
        root.join(self.zoom.to_string())
            .join(self.x.to_string())
            .join(format!("{}.{}", self.y, self.ext))
    }

    /// Same tile with a different extension.
    pub fn with_ext(&self, ext: &str) -> Self {
        Self::new(self.zoom, self.x, self.y, ext)
    }
}

impl fmt::Display for TileLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}.{}", self.zoom, self.x, self.y, self.ext)
    }
}

/// Split `zoom/x/y.ext` into its four textual parts, exactly as written.
///
/// Leading zeros and extension case are kept, which is what a remote server
/// expects when asked for the path it listed.
pub fn split_tile_path(path: &str) -> Option<[&str; 4]> {
    let captures = tile_path_pattern().captures(path)?;
    let part = |i: usize| captures.get(i).map(|m| m.as_str());
    Some([part(1)?, part(2)?, part(3)?, part(4)?])
}

/// Split a delta row path such as `"std/8/227/100.png"` into its dataset
/// label and tile locator.
///
/// The label is the leading run of characters that are neither digits nor
/// `/`; everything after the following `/` must be a canonical tile path.
pub fn parse_labeled_path(raw: &str) -> Result<(String, TileLocator), TilePathError> {
    let label_len = raw
        .find(|c: char| c.is_ascii_digit() || c == '/')
        .unwrap_or(raw.len());

    if label_len == 0 {
        return Err(TilePathError::MissingLabel(raw.to_string()));
    }

    let (label, rest) = raw.split_at(label_len);
    let rest = rest
        .strip_prefix('/')
        .ok_or_else(|| TilePathError::InvalidPattern(raw.to_string()))?;

    let locator = TileLocator::parse(rest)?;
    Ok((label.to_string(), locator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_canonical_path() {
        let tile = TileLocator::parse("14/14552/6451.png").unwrap();
        assert_eq!(tile.zoom, 14);
        assert_eq!(tile.x, 14552);
        assert_eq!(tile.y, 6451);
        assert_eq!(tile.ext, "png");
    }

    #[test]
    fn test_parse_lowercases_extension() {
        let tile = TileLocator::parse("8/1/1.PNG").unwrap();
        assert_eq!(tile.ext, "png");
        assert_eq!(tile.relative_path(), "8/1/1.png");
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        let result = TileLocator::parse("abc.png");
        assert!(matches!(result, Err(TilePathError::InvalidPattern(_))));
    }

    #[test]
    fn test_parse_rejects_leading_directory() {
        // Only the canonical suffix is accepted; callers strip roots first
        assert!(TileLocator::parse("std/8/1/1.png").is_err());
        assert!(TileLocator::parse("/8/1/1.png").is_err());
    }

    #[test]
    fn test_parse_rejects_missing_extension() {
        assert!(TileLocator::parse("8/1/1").is_err());
        assert!(TileLocator::parse("8/1/1.").is_err());
    }

    #[test]
    fn test_parse_rejects_zoom_overflow() {
        let result = TileLocator::parse("300/1/1.png");
        assert!(matches!(result, Err(TilePathError::InvalidZoom { .. })));
    }

    #[test]
    fn test_parse_rejects_coordinate_overflow() {
        let result = TileLocator::parse("8/99999999999/1.png");
        assert!(matches!(
            result,
            Err(TilePathError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn test_from_relative_path() {
        let path = Path::new("12").join("3637").join("1612.png");
        let tile = TileLocator::from_relative_path(&path).unwrap();
        assert_eq!(tile, TileLocator::new(12, 3637, 1612, "png"));
    }

    #[test]
    fn test_local_path() {
        let tile = TileLocator::new(8, 227, 100, "png");
        assert_eq!(
            tile.local_path(Path::new("std")),
            PathBuf::from("std/8/227/100.png")
        );
    }

    #[test]
    fn test_with_ext() {
        let tile = TileLocator::new(8, 227, 100, "png").with_ext("jpg");
        assert_eq!(tile.to_string(), "8/227/100.jpg");
    }

    #[test]
    fn test_split_tile_path_keeps_listed_text() {
        assert_eq!(split_tile_path("08/1/01.PNG"), Some(["08", "1", "01", "PNG"]));
        assert_eq!(split_tile_path("std/8/1/1.png"), None);
    }

    #[test]
    fn test_parse_labeled_path() {
        let (label, tile) = parse_labeled_path("std/8/227/100.png").unwrap();
        assert_eq!(label, "std");
        assert_eq!(tile, TileLocator::new(8, 227, 100, "png"));
    }

    #[test]
    fn test_parse_labeled_path_with_hyphenated_label() {
        let (label, tile) = parse_labeled_path("seamless-photo/18/1/2.jpg").unwrap();
        assert_eq!(label, "seamless-photo");
        assert_eq!(tile.ext, "jpg");
    }

    #[test]
    fn test_parse_labeled_path_without_label() {
        let result = parse_labeled_path("8/227/100.png");
        assert!(matches!(result, Err(TilePathError::MissingLabel(_))));
    }

    #[test]
    fn test_parse_labeled_path_with_bad_tail() {
        assert!(parse_labeled_path("std/abc.png").is_err());
        assert!(parse_labeled_path("std").is_err());
    }

    proptest! {
        #[test]
        fn prop_relative_path_parses_back(zoom in 0u8..=24, x in any::<u32>(), y in any::<u32>()) {
            let tile = TileLocator::new(zoom, x, y, "png");
            let parsed = TileLocator::parse(&tile.relative_path()).unwrap();
            prop_assert_eq!(parsed, tile);
        }

        #[test]
        fn prop_parse_never_panics(s in "\\PC*") {
            let _ = TileLocator::parse(&s);
        }
    }
}
