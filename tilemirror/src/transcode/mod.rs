//! JPEG transcoding of mirrored tiles.
//!
//! Runs after downloads finish. Converts every tile whose JPEG counterpart
//! is missing, plus every freshly downloaded tile, into a mirrored output
//! tree. Sequential by design; nothing here touches the download queue.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::local::glob_pattern;
use crate::remote::write_atomic;
use crate::tile::TileLocator;

/// Default JPEG quality.
pub const DEFAULT_QUALITY: u8 = 85;

/// Extension of transcoded tiles.
pub const OUTPUT_EXTENSION: &str = "jpg";

/// Errors converting one tile.
#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    /// Path isn't a canonical tile under the source root
    #[error("invalid path: {0}")]
    InvalidPath(PathBuf),

    /// Source image couldn't be decoded
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// JPEG encoding failed
    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Output couldn't be written
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A tile that failed to convert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedTranscode {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a transcode pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TranscodeReport {
    /// Tiles written to the output tree.
    pub converted: usize,
    /// Referenced tiles missing on disk.
    pub missing: Vec<PathBuf>,
    /// Tiles that failed to convert.
    pub failed: Vec<FailedTranscode>,
}

/// Converts a dataset tile tree to JPEG.
#[derive(Debug, Clone)]
pub struct Transcoder {
    source_root: PathBuf,
    output_root: PathBuf,
    source_ext: String,
    quality: u8,
}

impl Transcoder {
    /// Transcoder from `source_root` into `output_root`.
    pub fn new(source_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            output_root: output_root.into(),
            source_ext: "png".to_string(),
            quality: DEFAULT_QUALITY,
        }
    }

    /// Set the JPEG quality, clamped to 1-100.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    /// Set the extension of source tiles.
    pub fn with_source_ext(mut self, ext: impl Into<String>) -> Self {
        self.source_ext = ext.into().to_ascii_lowercase();
        self
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Mirrored output path for a source tile.
    pub fn output_path(&self, source: &Path) -> Result<PathBuf, TranscodeError> {
        let locator = source
            .strip_prefix(&self.source_root)
            .ok()
            .and_then(|rel| TileLocator::from_relative_path(rel).ok())
            .ok_or_else(|| TranscodeError::InvalidPath(source.to_path_buf()))?;

        Ok(locator
            .with_ext(OUTPUT_EXTENSION)
            .local_path(&self.output_root))
    }

    /// Source tiles with no converted counterpart, plus `fresh`.
    pub fn pending(&self, fresh: &[PathBuf]) -> BTreeSet<PathBuf> {
        let mut pending: BTreeSet<PathBuf> = fresh.iter().cloned().collect();

        let pattern = glob_pattern(&self.source_root, &format!("**/*.{}", self.source_ext));
        let Ok(paths) = glob::glob(&pattern) else {
            return pending;
        };

        for path in paths.flatten() {
            match self.output_path(&path) {
                Ok(output) if !output.is_file() => {
                    pending.insert(path);
                }
                Ok(_) => {}
                Err(_) => debug!(path = %path.display(), "Skipping non-tile file"),
            }
        }
        pending
    }

    /// Convert every pending tile.
    pub fn convert(&self, fresh: &[PathBuf]) -> TranscodeReport {
        let pending = self.pending(fresh);
        info!(
            tiles = pending.len(),
            output = %self.output_root.display(),
            quality = self.quality,
            "Transcoding tiles"
        );

        let mut report = TranscodeReport::default();
        for source in pending {
            if !source.is_file() {
                warn!(path = %source.display(), "File does not exist");
                report.missing.push(source);
                continue;
            }

            match self.transcode_file(&source) {
                Ok(output) => {
                    debug!(output = %output.display(), "Tile transcoded");
                    report.converted += 1;
                }
                Err(e) => {
                    warn!(error = %e, "Transcode failed");
                    report.failed.push(FailedTranscode {
                        path: source,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            converted = report.converted,
            missing = report.missing.len(),
            failed = report.failed.len(),
            "Transcoding finished"
        );
        report
    }

    /// Convert one tile, returning the output path.
    pub fn transcode_file(&self, source: &Path) -> Result<PathBuf, TranscodeError> {
        let output = self.output_path(source)?;

        let rgb = image::open(source)
            .map_err(|e| TranscodeError::Decode {
                path: source.to_path_buf(),
                source: e,
            })?
            .to_rgb8();

        let mut encoded = Vec::new();
        JpegEncoder::new_with_quality(&mut encoded, self.quality)
            .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
            .map_err(|e| TranscodeError::Encode {
                path: source.to_path_buf(),
                source: e,
            })?;

        write_atomic(&output, &encoded).map_err(|e| TranscodeError::Write {
            path: output.clone(),
            source: e,
        })?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::fs;
    use tempfile::TempDir;

    fn write_png(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let img = RgbaImage::from_pixel(4, 4, Rgba([200, 40, 40, 128]));
        img.save(path).unwrap();
    }

    fn transcoder(temp: &TempDir) -> Transcoder {
        Transcoder::new(temp.path().join("std"), temp.path().join("std_jpg"))
    }

    #[test]
    fn test_output_path_mirrors_tree() {
        let temp = TempDir::new().unwrap();
        let t = transcoder(&temp);

        let output = t
            .output_path(&temp.path().join("std/8/227/100.png"))
            .unwrap();
        assert_eq!(output, temp.path().join("std_jpg/8/227/100.jpg"));

        assert!(matches!(
            t.output_path(&temp.path().join("other/8/1/1.png")),
            Err(TranscodeError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_convert_writes_jpeg() {
        let temp = TempDir::new().unwrap();
        write_png(&temp.path().join("std/8/1/1.png"));

        let report = transcoder(&temp).with_quality(70).convert(&[]);

        assert_eq!(report.converted, 1);
        let output = temp.path().join("std_jpg/8/1/1.jpg");
        let decoded = image::open(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 4));
        assert_eq!(image::ImageFormat::from_path(&output).unwrap(), image::ImageFormat::Jpeg);
    }

    #[test]
    fn test_pending_skips_converted_unless_fresh() {
        let temp = TempDir::new().unwrap();
        let done = temp.path().join("std/8/1/1.png");
        let todo = temp.path().join("std/8/1/2.png");
        write_png(&done);
        write_png(&todo);
        let t = transcoder(&temp);
        t.transcode_file(&done).unwrap();

        let pending = t.pending(&[]);
        assert_eq!(pending.into_iter().collect::<Vec<_>>(), vec![todo.clone()]);

        // A fresh download is converted again even if an old output exists
        let pending = t.pending(&[done.clone()]);
        assert_eq!(pending.len(), 2);
        assert!(pending.contains(&done));
    }

    #[test]
    fn test_convert_reports_missing_fresh_file() {
        let temp = TempDir::new().unwrap();
        let gone = temp.path().join("std/8/1/9.png");

        let report = transcoder(&temp).convert(&[gone.clone()]);

        assert_eq!(report.converted, 0);
        assert_eq!(report.missing, vec![gone]);
    }

    #[test]
    fn test_convert_reports_undecodable_file() {
        let temp = TempDir::new().unwrap();
        let broken = temp.path().join("std/8/1/1.png");
        fs::create_dir_all(broken.parent().unwrap()).unwrap();
        fs::write(&broken, b"not a png").unwrap();

        let report = transcoder(&temp).convert(&[]);

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].path, broken);
        assert!(!temp.path().join("std_jpg/8/1/1.jpg").exists());
    }

    #[test]
    fn test_quality_is_clamped() {
        let temp = TempDir::new().unwrap();
        assert_eq!(transcoder(&temp).with_quality(0).quality(), 1);
        assert_eq!(transcoder(&temp).with_quality(255).quality(), 100);
    }
}
