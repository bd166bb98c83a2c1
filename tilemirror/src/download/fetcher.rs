//! Fetch-and-write of a single tile.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, warn};

use super::job::{DownloadJob, DownloadOutcome};
use crate::remote::{write_atomic, Fetched, HttpClient};

/// Runs one [`DownloadJob`] against an HTTP client.
///
/// Cheap to clone; every worker holds its own handle to the shared client.
#[derive(Clone)]
pub struct TileFetcher {
    client: Arc<dyn HttpClient>,
}

impl TileFetcher {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self { client }
    }

    /// Fetch `job.url` and write the body to `job.destination`.
    ///
    /// An existing destination is overwritten. Nothing here escalates: every
    /// failure becomes [`DownloadOutcome::Failed`] after being logged, and so
    /// does a panic raised by the client.
    pub fn fetch(&self, job: &DownloadJob) -> DownloadOutcome {
        match panic::catch_unwind(AssertUnwindSafe(|| self.fetch_inner(job))) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(url = %job.url, panic = %message, "Tile download panicked");
                DownloadOutcome::Failed {
                    reason: format!("download panicked: {}", message),
                }
            }
        }
    }

    fn fetch_inner(&self, job: &DownloadJob) -> DownloadOutcome {
        match self.client.get(&job.url) {
            Ok(Fetched::Body(bytes)) => match write_atomic(&job.destination, &bytes) {
                Ok(()) => {
                    debug!(url = %job.url, bytes = bytes.len(), "Tile written");
                    DownloadOutcome::Written {
                        bytes: bytes.len() as u64,
                    }
                }
                Err(e) => {
                    warn!(
                        path = %job.destination.display(),
                        error = %e,
                        "Failed to write tile"
                    );
                    DownloadOutcome::Failed {
                        reason: format!("failed to write {}: {}", job.destination.display(), e),
                    }
                }
            },
            Ok(Fetched::NotFound) => {
                debug!(url = %job.url, "Tile not found on server");
                DownloadOutcome::NotFound
            }
            Err(e) => {
                warn!(error = %e, "Tile download failed");
                DownloadOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl std::fmt::Debug for TileFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileFetcher").finish_non_exhaustive()
    }
}
