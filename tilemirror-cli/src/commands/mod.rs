//! CLI command handlers.

pub mod clean;
pub mod common;
pub mod config;
pub mod plan;
pub mod sync;
pub mod transcode;
