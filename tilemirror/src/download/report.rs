//! Aggregate result of a dispatch run.

use std::path::PathBuf;

use serde::Serialize;

use super::job::{DownloadJob, DownloadOutcome};

/// A job that failed, with enough context to diagnose it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDownload {
    pub url: String,
    pub destination: PathBuf,
    pub reason: String,
}

/// Counts of written, not-found and failed jobs.
///
/// Failures never abort a run; this report is how callers find out about
/// them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadReport {
    /// Jobs handed to the dispatcher.
    pub total: usize,
    /// Jobs whose body was written.
    pub written: usize,
    /// Jobs whose remote object didn't exist.
    pub not_found: usize,
    /// Jobs that failed.
    pub failed: Vec<FailedDownload>,
    /// Bytes written.
    pub bytes: u64,
    /// Destinations written, sorted.
    pub written_paths: Vec<PathBuf>,
}

impl DownloadReport {
    /// Empty report for `total` jobs.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Record the outcome of one job.
    pub fn record(&mut self, job: DownloadJob, outcome: DownloadOutcome) {
        match outcome {
            DownloadOutcome::Written { bytes } => {
                self.written += 1;
                self.bytes += bytes;
                self.written_paths.push(job.destination);
            }
            DownloadOutcome::NotFound => self.not_found += 1,
            DownloadOutcome::Failed { reason } => self.failed.push(FailedDownload {
                url: job.url,
                destination: job.destination,
                reason,
            }),
        }
    }

    /// Jobs with a recorded outcome.
    pub fn completed(&self) -> usize {
        self.written + self.not_found + self.failed.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    /// Whether every job completed without failure.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.completed() == self.total
    }

    /// Sort collected paths so the report doesn't depend on worker timing.
    pub(crate) fn finish(mut self) -> Self {
        self.written_paths.sort();
        self.failed.sort_by(|a, b| a.url.cmp(&b.url));
        self
    }
}
