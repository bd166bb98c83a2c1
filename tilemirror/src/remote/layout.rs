//! URL templates for remote catalog and tile objects.
//!
//! Templates use `{placeholder}` substitution:
//!
//! | placeholder | meaning                       |
//! |-------------|-------------------------------|
//! | `{type}`    | dataset type label            |
//! | `{date}`    | delta date as `yyyymmdd`      |
//! | `{z}`       | zoom                          |
//! | `{x}`       | column                        |
//! | `{y}`       | row                           |
//! | `{ext}`     | tile file extension           |

use chrono::NaiveDate;

use crate::tile::{split_tile_path, DatasetType, TileLocator};

/// Default manifest URL (one full catalog per dataset type).
pub const DEFAULT_MANIFEST_URL: &str = "https://cyberjapandata.gsi.go.jp/xyz/{type}/mokuroku.csv.gz";

/// Default delta URL (one patch per day, rows labeled with the dataset type).
pub const DEFAULT_DELTA_URL: &str = "https://cyberjapandata.gsi.go.jp/nippo/{date}-nippo.csv.gz";

/// Default tile URL.
pub const DEFAULT_TILE_URL: &str = "https://cyberjapandata.gsi.go.jp/xyz/{type}/{z}/{x}/{y}.{ext}";

/// Where the manifest, delta and tile objects live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLayout {
    pub manifest_url: String,
    pub delta_url: String,
    pub tile_url: String,
}

impl Default for RemoteLayout {
    fn default() -> Self {
        Self {
            manifest_url: DEFAULT_MANIFEST_URL.to_string(),
            delta_url: DEFAULT_DELTA_URL.to_string(),
            tile_url: DEFAULT_TILE_URL.to_string(),
        }
    }
}

impl RemoteLayout {
    /// URL of the full manifest for a dataset type.
    pub fn manifest_url(&self, dataset: &DatasetType) -> String {
        self.manifest_url.replace("{type}", dataset.as_str())
    }

    /// URL of the delta patch for a date.
    pub fn delta_url(&self, dataset: &DatasetType, date: NaiveDate) -> String {
        self.delta_url
            .replace("{type}", dataset.as_str())
            .replace("{date}", &yyyymmdd(date))
    }

    /// URL of a single tile.
    pub fn tile_url(&self, dataset: &DatasetType, tile: &TileLocator) -> String {
        self.fill_tile_url(
            dataset,
            &tile.zoom.to_string(),
            &tile.x.to_string(),
            &tile.y.to_string(),
            &tile.ext,
        )
    }

    /// URL of a tile as a catalog listed it, e.g. `"08/1/1.PNG"`.
    ///
    /// The path text is used verbatim. Returns `None` when `listed` isn't a
    /// `zoom/x/y.ext` path.
    pub fn listed_tile_url(&self, dataset: &DatasetType, listed: &str) -> Option<String> {
        let [zoom, x, y, ext] = split_tile_path(listed)?;
        Some(self.fill_tile_url(dataset, zoom, x, y, ext))
    }

    fn fill_tile_url(&self, dataset: &DatasetType, zoom: &str, x: &str, y: &str, ext: &str) -> String {
        self.tile_url
            .replace("{type}", dataset.as_str())
            .replace("{z}", zoom)
            .replace("{x}", x)
            .replace("{y}", y)
            .replace("{ext}", ext)
    }
}

/// Format a date as `yyyymmdd`.
pub fn yyyymmdd(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn std_type() -> DatasetType {
        DatasetType::new("std").unwrap()
    }

    #[test]
    fn test_default_manifest_url() {
        let layout = RemoteLayout::default();
        assert_eq!(
            layout.manifest_url(&std_type()),
            "https://cyberjapandata.gsi.go.jp/xyz/std/mokuroku.csv.gz"
        );
    }

    #[test]
    fn test_default_delta_url() {
        let layout = RemoteLayout::default();
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(
            layout.delta_url(&std_type(), date),
            "https://cyberjapandata.gsi.go.jp/nippo/20240305-nippo.csv.gz"
        );
    }

    #[test]
    fn test_default_tile_url() {
        let layout = RemoteLayout::default();
        let tile = TileLocator::new(8, 227, 100, "png");
        assert_eq!(
            layout.tile_url(&std_type(), &tile),
            "https://cyberjapandata.gsi.go.jp/xyz/std/8/227/100.png"
        );
    }

    #[test]
    fn test_listed_tile_url_is_verbatim() {
        let layout = RemoteLayout::default();
        assert_eq!(
            layout.listed_tile_url(&std_type(), "08/227/0100.PNG").as_deref(),
            Some("https://cyberjapandata.gsi.go.jp/xyz/std/08/227/0100.PNG")
        );
        assert_eq!(layout.listed_tile_url(&std_type(), "abc/1/x.png"), None);
    }

    #[test]
    fn test_custom_templates() {
        let layout = RemoteLayout {
            manifest_url: "http://mirror.local/{type}/index.gz".to_string(),
            delta_url: "http://mirror.local/{type}/delta/{date}.gz".to_string(),
            tile_url: "http://mirror.local/{type}/{z}-{x}-{y}.{ext}".to_string(),
        };
        let pale = DatasetType::new("pale").unwrap();
        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();

        assert_eq!(layout.manifest_url(&pale), "http://mirror.local/pale/index.gz");
        assert_eq!(
            layout.delta_url(&pale, date),
            "http://mirror.local/pale/delta/20231231.gz"
        );
        assert_eq!(
            layout.tile_url(&pale, &TileLocator::new(3, 1, 2, "png")),
            "http://mirror.local/pale/3-1-2.png"
        );
    }
}
