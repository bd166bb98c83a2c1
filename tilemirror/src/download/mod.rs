//! Concurrent tile download dispatch.
//!
//! This module runs the job list produced by the reconciler:
//! - Joinable FIFO work queue (`queue`)
//! - Fetch-and-write of a single tile (`fetcher`)
//! - Aggregate outcome counts (`report`)
//! - Queue-depth progress sampling (`progress`)
//! - Thread pool and sequential strategies (`strategy`)
//!
//! # Architecture
//!
//! ```text
//! Dispatcher
//!     │
//!     ├── DispatchStrategy (trait)
//!     │       ├── ThreadPoolStrategy ── JoinableQueue ── N workers
//!     │       └── SequentialStrategy
//!     │
//!     ├── TileFetcher (one GET + atomic write)
//!     │
//!     └── ProgressReporter (samples queue depth)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tilemirror::download::Dispatcher;
//!
//! let dispatcher = Dispatcher::new(client, 10);
//! let report = dispatcher.run(plan.jobs, None);
//! println!("{} written, {} failed", report.written, report.failure_count());
//! ```

mod fetcher;
mod job;
mod progress;
mod queue;
mod report;
mod strategy;

pub use fetcher::TileFetcher;
pub use job::{DownloadJob, DownloadOutcome};
pub use progress::{
    ProgressCallback, ProgressCounters, ProgressReporter, ProgressSnapshot, DEFAULT_POLL_INTERVAL,
};
pub use queue::JoinableQueue;
pub use report::{DownloadReport, FailedDownload};
pub use strategy::{DispatchStrategy, SequentialStrategy, ThreadPoolStrategy, DEFAULT_WORKERS};

use std::sync::Arc;

use tracing::{info, warn};

use crate::remote::HttpClient;

/// Runs download jobs with a swappable scheduling strategy.
pub struct Dispatcher {
    fetcher: TileFetcher,
    strategy: Box<dyn DispatchStrategy>,
}

impl Dispatcher {
    /// Dispatcher backed by a pool of `workers` threads.
    pub fn new(client: Arc<dyn HttpClient>, workers: usize) -> Self {
        Self::with_strategy(client, Box::new(ThreadPoolStrategy::new(workers)))
    }

    /// Dispatcher running every job on the calling thread.
    pub fn sequential(client: Arc<dyn HttpClient>) -> Self {
        Self::with_strategy(client, Box::new(SequentialStrategy::new()))
    }

    /// Dispatcher with a custom strategy.
    pub fn with_strategy(client: Arc<dyn HttpClient>, strategy: Box<dyn DispatchStrategy>) -> Self {
        Self {
            fetcher: TileFetcher::new(client),
            strategy,
        }
    }

    /// Run every job and wait for all of them to finish.
    ///
    /// Per-job failures are logged and counted; they never abort the run.
    pub fn run(&self, jobs: Vec<DownloadJob>, on_progress: Option<ProgressCallback>) -> DownloadReport {
        info!(jobs = jobs.len(), "Dispatching downloads");
        let report = self.strategy.execute(jobs, &self.fetcher, on_progress);

        info!(
            written = report.written,
            not_found = report.not_found,
            failed = report.failure_count(),
            bytes = report.bytes,
            "Downloads finished"
        );
        if !report.failed.is_empty() {
            warn!(
                failed = report.failure_count(),
                "Some tiles could not be downloaded and will be retried next run"
            );
        }
        report
    }
}
