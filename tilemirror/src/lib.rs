//! tilemirror - Incremental mirror for XYZ map tile datasets
//!
//! Keeps a local copy of a remote tile tree in sync by comparing content
//! hashes from the remote manifest and its daily deltas against the MD5 of
//! every tile on disk, then downloading only what is missing or changed.
//!
//! # Pipeline
//!
//! ```text
//! LocalIndex ─┐
//! Manifest ───┼─► Reconciler ─► Dispatcher (worker pool) ─► Transcoder
//! Deltas ─────┘                      │
//!                              ProgressReporter
//! ```
//!
//! The [`mirror::Mirror`] type drives the whole sequence for each dataset
//! type; the individual stages are usable on their own.

pub mod catalog;
pub mod config;
pub mod download;
pub mod index;
pub mod local;
pub mod logging;
pub mod mirror;
pub mod reconcile;
pub mod remote;
pub mod tile;
pub mod transcode;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
