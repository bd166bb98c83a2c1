//! Terminal output for tilemirror.
//!
//! - `progress` - Download progress bar
//! - `summary` - Human-readable run reports

pub mod progress;
pub mod summary;

pub use progress::DownloadProgress;
